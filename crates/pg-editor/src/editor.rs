//! The editor controller.
//!
//! Turns input into state transitions and owns the commit protocol:
//! plugins' before-hooks, store write, change event, plugins'
//! after-hooks. The renderer is subscribed to the store and redraws on
//! every state change.
//!
//! Every method takes `&self`. Hosts keep the editor behind an `Rc` and
//! event handlers may call back into it while a commit is in flight; state
//! lives in cells that are never borrowed across a commit.

use crate::commands::{Command, History};
use crate::config::EditorConfig;
use crate::events::{EditorEvent, Emitter, EventKind, ListenerId};
use crate::input::{InputEvent, Modifiers};
use crate::plugins::{CommitReason, Hook, Plugin, PluginContext};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::store::{EditorState, Selection, Store, SubscriptionId};
use pg_core::math::wheel_zoom_factor;
use pg_core::{Document, Node, NodeId, Point, Viewport, emit_document};
use pg_render::{SceneRenderer, hit_test};
use smallvec::smallvec;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

/// Pointer interaction state.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Moving the selection. Positions are computed from the gesture's
    /// origin and the pre-drag nodes, never incrementally.
    Dragging {
        /// World point under the pointer at pointer-down.
        origin: Point,
        /// Selected nodes as they were at pointer-down.
        originals: Vec<(NodeId, Arc<Node>)>,
    },
}

/// State shared between the editor and plugin contexts.
pub(crate) struct Shared {
    pub(crate) store: Store<EditorState>,
    pub(crate) events: Emitter<EditorEvent>,
    history: RefCell<History>,
    plugins: Vec<Rc<dyn Plugin>>,
}

impl Shared {
    pub(crate) fn state(&self) -> Rc<EditorState> {
        self.store.get()
    }

    /// Write `doc` to the store and fire `Change`. With `run_plugins`, the
    /// document first goes through every before-hook and the after-hooks
    /// run once the change event has been delivered.
    pub(crate) fn commit(&self, doc: Document, reason: &CommitReason, run_plugins: bool) {
        let mut doc = doc;
        if run_plugins {
            for plugin in &self.plugins {
                if let Hook::Handled(next) = plugin.on_before_commit(&doc, reason) {
                    doc = next;
                }
            }
        }

        if reason.is_continuous() {
            log::trace!("commit {reason}: {} nodes", doc.len());
        } else {
            log::debug!("commit {reason}: {} nodes", doc.len());
        }

        let stored = doc.clone();
        self.store.patch(move |s| EditorState {
            doc: stored,
            selection: s.selection.clone(),
            viewport: s.viewport,
        });
        self.events.emit(&EditorEvent::Change(doc.clone()));

        if run_plugins {
            for plugin in &self.plugins {
                plugin.on_after_commit(&doc, reason);
            }
        }
    }

    /// Record `before → after` as one undoable step and commit `after`.
    pub(crate) fn commit_with_history(&self, reason: CommitReason, before: Document, after: Document) {
        self.history
            .borrow_mut()
            .push(Command::snapshot(reason.as_str(), before, after.clone()));
        self.commit(after, &reason, true);
    }

    pub(crate) fn set_selection(&self, ids: Selection) {
        let stored = ids.clone();
        self.store.patch(move |s| EditorState {
            doc: s.doc.clone(),
            selection: stored,
            viewport: s.viewport,
        });
        self.events.emit(&EditorEvent::Selection(ids));
    }

    pub(crate) fn set_viewport(&self, viewport: Viewport) {
        self.store.patch(move |s| EditorState {
            doc: s.doc.clone(),
            selection: s.selection.clone(),
            viewport,
        });
        self.events.emit(&EditorEvent::Viewport(viewport));
    }
}

/// Direct-manipulation scene editor.
pub struct Editor {
    shared: Rc<Shared>,
    config: EditorConfig,
    gesture: RefCell<Gesture>,
    renderer: Rc<RefCell<dyn SceneRenderer>>,
    render_subscription: Cell<Option<SubscriptionId>>,
    destroyed: Cell<bool>,
}

impl Editor {
    /// Build an editor over an empty default document.
    ///
    /// Plugins run in the given order. Each gets `on_init` once, after the
    /// renderer is attached, and the initial state is drawn after that.
    pub fn new<R: SceneRenderer + 'static>(
        renderer: R,
        plugins: Vec<Rc<dyn Plugin>>,
        config: EditorConfig,
    ) -> Self {
        let history = match config.history_limit {
            Some(limit) => History::with_limit(limit),
            None => History::new(),
        };
        let shared = Rc::new(Shared {
            store: Store::new(EditorState::default()),
            events: Emitter::new(),
            history: RefCell::new(history),
            plugins,
        });

        let renderer: Rc<RefCell<dyn SceneRenderer>> = Rc::new(RefCell::new(renderer));
        let sink = Rc::clone(&renderer);
        let subscription = shared.store.subscribe(move |s: &EditorState| {
            match sink.try_borrow_mut() {
                Ok(mut r) => r.render(&s.doc, &s.viewport, &s.selection),
                Err(_) => log::warn!("renderer busy, frame dropped"),
            }
        });

        for plugin in &shared.plugins {
            let ctx = PluginContext::new(Rc::downgrade(&shared));
            if plugin.on_init(ctx).is_handled() {
                log::debug!("plugin {} initialized", plugin.name());
            }
        }

        let editor = Self {
            shared,
            config,
            gesture: RefCell::new(Gesture::Idle),
            renderer,
            render_subscription: Cell::new(Some(subscription)),
            destroyed: Cell::new(false),
        };
        editor.render_now();
        editor
    }

    fn render_now(&self) {
        let s = self.shared.state();
        if let Ok(mut r) = self.renderer.try_borrow_mut() {
            r.render(&s.doc, &s.viewport, &s.selection);
        }
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Listen for `change`, `selection` or `viewport` events.
    pub fn on(&self, kind: EventKind, f: impl Fn(&EditorEvent) + 'static) -> ListenerId {
        self.shared.events.on(kind, f)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.shared.events.off(id)
    }

    // ─── State access ────────────────────────────────────────────────────

    pub fn state(&self) -> Rc<EditorState> {
        self.shared.state()
    }

    pub fn doc(&self) -> Document {
        self.shared.state().doc.clone()
    }

    pub fn selection(&self) -> Selection {
        self.shared.state().selection.clone()
    }

    pub fn viewport(&self) -> Viewport {
        self.shared.state().viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current document as canonical JSON.
    pub fn serialize(&self) -> String {
        emit_document(&self.shared.state().doc)
    }

    // ─── Operations ──────────────────────────────────────────────────────

    /// Replace the whole document and clear the selection.
    ///
    /// Not undoable, and plugins do not see it. History is kept; call
    /// `clear_history` for a hard reset.
    pub fn load(&self, doc: Document) {
        log::debug!("load: {} nodes", doc.len());
        *self.gesture.borrow_mut() = Gesture::Idle;
        let stored = doc.clone();
        self.shared.store.patch(move |s| EditorState {
            doc: stored,
            selection: Selection::new(),
            viewport: s.viewport,
        });
        self.shared.events.emit(&EditorEvent::Change(doc));
        self.shared
            .events
            .emit(&EditorEvent::Selection(Selection::new()));
    }

    /// Step back one history entry. Returns `false` if there was none.
    pub fn undo(&self) -> bool {
        let current = self.shared.state().doc.clone();
        let step = self.shared.history.borrow_mut().undo(&current);
        let Some(name) = step.name else {
            log::debug!("undo: nothing to undo");
            return false;
        };
        self.shared.commit(step.doc, &CommitReason::undo(&name), false);
        true
    }

    /// Re-apply the last undone entry. Returns `false` if there was none.
    pub fn redo(&self) -> bool {
        let current = self.shared.state().doc.clone();
        let step = self.shared.history.borrow_mut().redo(&current);
        let Some(name) = step.name else {
            log::debug!("redo: nothing to redo");
            return false;
        };
        self.shared.commit(step.doc, &CommitReason::redo(&name), false);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.shared.history.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.shared.history.borrow().can_redo()
    }

    pub fn clear_history(&self) {
        self.shared.history.borrow_mut().clear();
    }

    /// Append `node` as an undoable step and select it.
    /// A node whose id is already in the document is ignored.
    pub fn add_node(&self, node: Node) -> bool {
        let before = self.shared.state().doc.clone();
        if before.contains(node.id) {
            log::warn!("add_node: id `{}` already exists, ignoring", node.id);
            return false;
        }
        let id = node.id;
        let mut after = before.clone();
        after.push(node);
        self.shared
            .commit_with_history(CommitReason::ADD_NODE, before, after);
        self.shared.set_selection(smallvec![id]);
        true
    }

    /// Remove every selected node as one undoable step, then clear the
    /// selection. Returns `false` if nothing was selected.
    pub fn delete_selection(&self) -> bool {
        let state = self.shared.state();
        if state.selection.is_empty() {
            return false;
        }
        let mut after = state.doc.clone();
        let removed = after.remove_where(|n| state.selection.contains(&n.id));
        log::debug!("delete: {removed} nodes");
        self.shared
            .commit_with_history(CommitReason::DELETE, state.doc.clone(), after);
        self.shared.set_selection(Selection::new());
        true
    }

    pub fn set_selection(&self, ids: impl IntoIterator<Item = NodeId>) {
        self.shared.set_selection(ids.into_iter().collect());
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.shared.set_viewport(viewport);
    }

    /// Detach the renderer and release its resources. Input is ignored
    /// from now on.
    pub fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        *self.gesture.borrow_mut() = Gesture::Idle;
        if let Some(id) = self.render_subscription.take() {
            self.shared.store.unsubscribe(id);
        }
        match self.renderer.try_borrow_mut() {
            Ok(mut r) => r.destroy(),
            Err(_) => log::warn!("renderer busy during destroy"),
        }
        log::debug!("editor destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn is_dragging(&self) -> bool {
        matches!(*self.gesture.borrow(), Gesture::Dragging { .. })
    }

    /// Feed one input event through the state machine.
    ///
    /// Returns whether the editor acted on it; hosts use this to decide
    /// whether to suppress the platform default (page scroll, browser undo).
    pub fn handle_input(&self, event: &InputEvent) -> bool {
        if self.destroyed.get() {
            return false;
        }
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(Point::new(*x, *y)),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { .. } | InputEvent::PointerCancel => self.pointer_up(),
            InputEvent::Wheel {
                x,
                y,
                delta_y,
                modifiers,
            } => self.wheel(Point::new(*x, *y), *delta_y, *modifiers),
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers),
        }
    }

    fn pointer_down(&self, screen: Point) -> bool {
        let state = self.shared.state();
        let world = state.viewport.screen_to_world(screen);

        // A locked node still occludes what lies beneath it.
        let hit = hit_test(&state.doc, world.x, world.y)
            .filter(|n| !n.locked)
            .map(|n| n.id);
        let Some(id) = hit else {
            *self.gesture.borrow_mut() = Gesture::Idle;
            self.shared.set_selection(Selection::new());
            return true;
        };

        if !state.selection.contains(&id) {
            self.shared.set_selection(smallvec![id]);
        }
        let selection = self.shared.state().selection.clone();
        let originals = selection
            .iter()
            .filter_map(|sid| state.doc.get(*sid).map(|n| (*sid, Arc::clone(n))))
            .collect();
        *self.gesture.borrow_mut() = Gesture::Dragging {
            origin: world,
            originals,
        };
        log::trace!("drag start on {id:?}");
        true
    }

    fn pointer_move(&self, screen: Point) -> bool {
        let next = {
            let gesture = self.gesture.borrow();
            let Gesture::Dragging { origin, originals } = &*gesture else {
                return false;
            };
            let state = self.shared.state();
            if state.selection.is_empty() {
                return false;
            }
            let world = state.viewport.screen_to_world(screen);
            let (dx, dy) = (world.x - origin.x, world.y - origin.y);

            let mut next = state.doc.clone();
            for id in &state.selection {
                let Some((_, base)) = originals.iter().find(|(oid, _)| oid == id) else {
                    continue;
                };
                if let Some(node) = next.node_mut(*id) {
                    node.x = base.x + dx;
                    node.y = base.y + dy;
                }
            }
            next
        };
        self.shared.commit(next, &CommitReason::DRAG_MOVE, true);
        true
    }

    fn pointer_up(&self) -> bool {
        let Gesture::Dragging { originals, .. } = self.gesture.replace(Gesture::Idle) else {
            return false;
        };
        if originals.is_empty() {
            return true;
        }
        let after = self.shared.state().doc.clone();
        let mut before = after.clone();
        for (_, node) in originals {
            before.restore(node);
        }
        if before != after {
            self.shared.commit_with_history(CommitReason::MOVE, before, after);
        } else {
            log::trace!("drag released without movement");
        }
        true
    }

    fn wheel(&self, screen: Point, delta_y: f32, modifiers: Modifiers) -> bool {
        if self.config.zoom_requires_modifier && !modifiers.ctrl {
            return false;
        }
        let viewport = self.shared.state().viewport;
        let factor = wheel_zoom_factor(delta_y, self.config.wheel_zoom_speed);
        let next = viewport.zoomed_at(screen, factor, self.config.zoom_min, self.config.zoom_max);
        self.shared.set_viewport(next);
        true
    }

    fn key(&self, key: &str, modifiers: Modifiers) -> bool {
        match ShortcutMap::resolve(key, modifiers) {
            Some(ShortcutAction::Undo) => {
                self.undo();
                true
            }
            Some(ShortcutAction::Redo) => {
                self.redo();
                true
            }
            Some(ShortcutAction::Delete) => self.delete_selection(),
            None => false,
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.destroy();
    }
}
