//! Typed event emitter.
//!
//! Listeners register for one event kind and are called synchronously, in
//! registration order, for every emitted event of that kind. The listener
//! list is snapshotted before dispatch, so a handler may register, remove
//! or emit without invalidating the loop it is called from.

use crate::store::Selection;
use pg_core::{Document, Viewport};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// An event that can be routed by kind.
pub trait Event {
    type Kind: Copy + Eq;

    fn kind(&self) -> Self::Kind;
}

/// Handle returned by `Emitter::on`, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Rc<dyn Fn(&E)>;

pub struct Emitter<E: Event> {
    listeners: RefCell<Vec<(ListenerId, E::Kind, Listener<E>)>>,
    next_id: Cell<u64>,
}

impl<E: Event> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<E: Event> Emitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` for events of `kind`.
    pub fn on(&self, kind: E::Kind, f: impl Fn(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, kind, Rc::new(f)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _, _)| *lid != id);
        listeners.len() != before
    }

    /// Call every listener registered for the event's kind.
    pub fn emit(&self, event: &E) {
        let kind = event.kind();
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, f)| Rc::clone(f))
            .collect();
        for f in snapshot {
            f(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

// ─── Editor events ───────────────────────────────────────────────────────

/// Events the editor fires after each corresponding commit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The committed document.
    Change(Document),
    /// The new selection, in order.
    Selection(Selection),
    /// The new viewport.
    Viewport(Viewport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Change,
    Selection,
    Viewport,
}

impl EventKind {
    /// Parse a host event name (`"change"`, `"selection"`, `"viewport"`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "change" => Some(Self::Change),
            "selection" => Some(Self::Selection),
            "viewport" => Some(Self::Viewport),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Selection => "selection",
            Self::Viewport => "viewport",
        }
    }
}

impl Event for EditorEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            Self::Change(_) => EventKind::Change,
            Self::Selection(_) => EventKind::Selection,
            Self::Viewport(_) => EventKind::Viewport,
        }
    }
}
