//! Event Targets
//!
//! Per-object listener registries. Listeners are invoked synchronously, in
//! registration order; the listener list may be mutated from inside a
//! callback without affecting the dispatch already in flight.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::event::{Event, EventKind};

/// Process-unique identity of an event-bearing object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

static NEXT_TARGET: AtomicU64 = AtomicU64::new(1);

impl TargetId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        Self(NEXT_TARGET.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

struct Listener {
    kind: EventKind,
    id: ListenerId,
    callback: Rc<dyn Fn(&Event)>,
}

/// Listener registry embedded in every state owner
pub struct EventTarget {
    id: TargetId,
    listeners: RefCell<Vec<Listener>>,
    next_listener: Cell<u64>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self {
            id: TargetId::next(),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
        }
    }

    /// Identity of the owning object
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Register a listener for one event kind
    pub fn add_listener(&self, kind: EventKind, callback: Rc<dyn Fn(&Event)>) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push(Listener { kind, id, callback });
        id
    }

    /// Deregister a listener; returns false if it was already gone
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    /// Number of listeners registered for a kind
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }

    /// Dispatch an event to every matching listener
    pub fn dispatch(&self, event: &Event) {
        // Snapshot first so callbacks can add/remove listeners freely.
        let matching: Vec<Rc<dyn Fn(&Event)>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == event.kind)
            .map(|l| Rc::clone(&l.callback))
            .collect();
        for callback in matching {
            callback(event);
        }
    }

    /// Fire an event of the given kind with this object as target
    pub fn fire(&self, kind: EventKind) {
        self.dispatch(&Event::on(kind, self.id));
    }
}

impl Default for EventTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTarget")
            .field("id", &self.id)
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
