//! Editor state store.
//!
//! Holds one immutable state snapshot at a time. `set`/`patch` replace it
//! wholesale and synchronously notify subscribers in registration order.
//!
//! Updates requested while subscribers are being notified (a subscriber
//! calling `set` again) are not applied recursively. They are queued and
//! drained in FIFO order once the current notification cycle finishes, so
//! every subscriber sees every state in the same order.

use pg_core::{Document, NodeId, Viewport};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Ordered list of selected node ids. Usually 0 to a handful.
pub type Selection = SmallVec<[NodeId; 4]>;

/// Everything the editor tracks between events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorState {
    pub doc: Document,
    pub selection: Selection,
    pub viewport: Viewport,
}

/// Handle returned by `Store::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Update<S> = Box<dyn FnOnce(&S) -> S>;
type Subscriber<S> = Rc<dyn Fn(&S)>;

pub struct Store<S> {
    state: RefCell<Rc<S>>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber<S>)>>,
    pending: RefCell<VecDeque<Update<S>>>,
    notifying: Cell<bool>,
    next_id: Cell<u64>,
}

impl<S: 'static> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: RefCell::new(Rc::new(initial)),
            subscribers: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            notifying: Cell::new(false),
            next_id: Cell::new(0),
        }
    }

    /// Current snapshot. Cheap: a reference-count bump.
    pub fn get(&self) -> Rc<S> {
        Rc::clone(&self.state.borrow())
    }

    /// Replace the state.
    pub fn set(&self, next: S) {
        self.enqueue(Box::new(move |_| next));
    }

    /// Replace the state with `f(current)`.
    pub fn patch(&self, f: impl FnOnce(&S) -> S + 'static) {
        self.enqueue(Box::new(f));
    }

    pub fn subscribe(&self, f: impl Fn(&S) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(f)));
        id
    }

    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() != before
    }

    fn enqueue(&self, update: Update<S>) {
        self.pending.borrow_mut().push_back(update);
        if self.notifying.get() {
            return;
        }
        self.notifying.set(true);
        while let Some(update) = self.next_pending() {
            let next = Rc::new(update(&self.get()));
            *self.state.borrow_mut() = Rc::clone(&next);
            let subs: Vec<Subscriber<S>> = self
                .subscribers
                .borrow()
                .iter()
                .map(|(_, f)| Rc::clone(f))
                .collect();
            for f in subs {
                f(&next);
            }
        }
        self.notifying.set(false);
    }

    fn next_pending(&self) -> Option<Update<S>> {
        self.pending.borrow_mut().pop_front()
    }
}
