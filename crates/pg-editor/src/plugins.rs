//! Plugin pipeline.
//!
//! Plugins are the single extension point of the editor. Every commit
//! passes through `on_before_commit` of each plugin in registration order,
//! each one seeing the previous plugin's output. After the result is
//! stored and the change event fired, `on_after_commit` runs in the same
//! order. A hook that does nothing returns `Hook::Unhandled`.
//!
//! `on_before_commit` must be a pure function of its inputs: during a drag
//! it runs once per pointer frame with the same reason.

use crate::editor::Shared;
use crate::events::{EditorEvent, EventKind, ListenerId};
use crate::store::Selection;
use pg_core::{Document, Viewport};
use std::borrow::Cow;
use std::fmt;
use std::rc::Weak;

/// Why a commit happened.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitReason(Cow<'static, str>);

impl CommitReason {
    /// One pointer frame of a drag. Not recorded in history.
    pub const DRAG_MOVE: CommitReason = CommitReason(Cow::Borrowed("drag(move)"));
    /// A finished drag gesture.
    pub const MOVE: CommitReason = CommitReason(Cow::Borrowed("move"));
    pub const ADD_NODE: CommitReason = CommitReason(Cow::Borrowed("addNode"));
    pub const DELETE: CommitReason = CommitReason(Cow::Borrowed("delete"));

    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self(tag.into())
    }

    pub fn undo(name: &str) -> Self {
        Self(Cow::Owned(format!("undo:{name}")))
    }

    pub fn redo(name: &str) -> Self {
        Self(Cow::Owned(format!("redo:{name}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the commit moves nodes (continuous or discrete).
    pub fn is_move(&self) -> bool {
        self.0.contains("move")
    }

    /// Whether the commit is one frame of an ongoing gesture.
    pub fn is_continuous(&self) -> bool {
        *self == Self::DRAG_MOVE
    }
}

impl fmt::Display for CommitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a plugin hook.
#[derive(Debug, Clone, PartialEq)]
pub enum Hook<T> {
    /// The plugin does not act on this call.
    Unhandled,
    Handled(T),
}

impl<T> Hook<T> {
    pub fn is_handled(&self) -> bool {
        matches!(self, Hook::Handled(_))
    }
}

/// Editor extension.
pub trait Plugin {
    fn name(&self) -> &str;

    /// Called once when the editor is built.
    fn on_init(&self, _ctx: PluginContext) -> Hook<()> {
        Hook::Unhandled
    }

    /// Rewrite the document about to be committed.
    fn on_before_commit(&self, _doc: &Document, _reason: &CommitReason) -> Hook<Document> {
        Hook::Unhandled
    }

    /// Observe the document that was committed.
    fn on_after_commit(&self, _doc: &Document, _reason: &CommitReason) -> Hook<()> {
        Hook::Unhandled
    }
}

/// Access to editor state handed to plugins at init.
///
/// Holds a weak reference: once the editor is dropped every getter returns
/// `None` and every setter does nothing.
#[derive(Clone)]
pub struct PluginContext {
    shared: Weak<Shared>,
}

impl PluginContext {
    pub(crate) fn new(shared: Weak<Shared>) -> Self {
        Self { shared }
    }

    fn with<T>(&self, f: impl FnOnce(&Shared) -> T) -> Option<T> {
        self.shared.upgrade().map(|shared| f(&shared))
    }

    pub fn doc(&self) -> Option<Document> {
        self.with(|s| s.store.get().doc.clone())
    }

    /// Commit `doc` through the full plugin pipeline. Not recorded in history.
    pub fn set_doc(&self, doc: Document, reason: CommitReason) {
        self.with(|s| s.commit(doc, &reason, true));
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.with(|s| s.store.get().viewport)
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.with(|s| s.set_viewport(viewport));
    }

    pub fn selection(&self) -> Option<Selection> {
        self.with(|s| s.store.get().selection.clone())
    }

    pub fn set_selection(&self, ids: Selection) {
        self.with(|s| s.set_selection(ids));
    }

    /// Fire an editor event to host listeners.
    pub fn emit(&self, event: EditorEvent) {
        self.with(|s| s.events.emit(&event));
    }

    /// Listen to editor events.
    pub fn on(&self, kind: EventKind, f: impl Fn(&EditorEvent) + 'static) -> Option<ListenerId> {
        self.with(|s| s.events.on(kind, f))
    }
}

// ─── Built-in plugins ────────────────────────────────────────────────────

/// Rounds node positions to a grid on every move commit.
/// Locked and hidden nodes are left where they are.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnap {
    size: f32,
}

impl GridSnap {
    /// Grid of `size` world units, floored to a whole number of at least 1.
    pub fn new(size: f32) -> Self {
        Self {
            size: size.floor().max(1.0),
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    fn snap(&self, v: f32) -> f32 {
        // Halves round up, including negative halves (-4.5 → -4).
        (v / self.size + 0.5).floor() * self.size
    }
}

impl Plugin for GridSnap {
    fn name(&self) -> &str {
        "gridSnap"
    }

    fn on_before_commit(&self, doc: &Document, reason: &CommitReason) -> Hook<Document> {
        if !reason.is_move() {
            return Hook::Unhandled;
        }
        let mut next = doc.clone();
        next.update_each(|n| {
            if n.locked || n.hidden {
                return None;
            }
            let (x, y) = (self.snap(n.x), self.snap(n.y));
            if x == n.x && y == n.y {
                return None;
            }
            let mut snapped = n.clone();
            snapped.x = x;
            snapped.y = y;
            Some(snapped)
        });
        Hook::Handled(next)
    }
}
