//! Remote Playback
//!
//! Cast-style remote playback. Availability is exposed through a
//! watch/cancel protocol of its own rather than `addEventListener`, which is
//! why the store reaches it through an owner-update handler.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use strand_events::{EventKind, EventTarget};

use crate::MediaError;

/// Remote connection state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemoteState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Handle to an availability watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchId(pub u64);

/// Remote playback surface
pub struct RemotePlayback {
    events: EventTarget,
    state: Cell<RemoteState>,
    available: Cell<bool>,
    watchers: RefCell<Vec<(WatchId, Rc<dyn Fn(bool)>)>>,
    next_watch: Cell<u64>,
}

impl RemotePlayback {
    pub fn new() -> Self {
        Self {
            events: EventTarget::new(),
            state: Cell::new(RemoteState::Disconnected),
            available: Cell::new(false),
            watchers: RefCell::new(Vec::new()),
            next_watch: Cell::new(1),
        }
    }

    pub fn events(&self) -> &EventTarget {
        &self.events
    }

    pub fn state(&self) -> RemoteState {
        self.state.get()
    }

    pub fn availability(&self) -> bool {
        self.available.get()
    }

    /// Register an availability watcher; the callback is invoked immediately
    /// with the current availability and again on every change.
    pub fn watch_availability(&self, callback: Rc<dyn Fn(bool)>) -> WatchId {
        let id = WatchId(self.next_watch.get());
        self.next_watch.set(id.0 + 1);
        callback(self.available.get());
        self.watchers.borrow_mut().push((id, callback));
        id
    }

    pub fn cancel_watch(&self, id: WatchId) -> bool {
        let mut watchers = self.watchers.borrow_mut();
        let before = watchers.len();
        watchers.retain(|(w, _)| *w != id);
        watchers.len() != before
    }

    /// Number of live watchers (teardown hygiene checks)
    pub fn watcher_count(&self) -> usize {
        self.watchers.borrow().len()
    }

    /// Device availability changed (driven by the platform / tests)
    pub fn set_availability(&self, available: bool) {
        if self.available.get() == available {
            return;
        }
        self.available.set(available);
        let watchers: Vec<Rc<dyn Fn(bool)>> = self
            .watchers
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in watchers {
            callback(available);
        }
    }

    /// Open the device picker. Toggles the connection: a disconnected
    /// surface connects, a connected one disconnects.
    pub fn prompt(&self) -> Result<(), MediaError> {
        if !self.available.get() {
            return Err(MediaError::NotSupported(
                "no remote playback devices available".into(),
            ));
        }
        match self.state.get() {
            RemoteState::Disconnected => {
                self.state.set(RemoteState::Connecting);
                self.events.fire(EventKind::Connecting);
                self.state.set(RemoteState::Connected);
                self.events.fire(EventKind::Connect);
            }
            RemoteState::Connecting | RemoteState::Connected => {
                self.state.set(RemoteState::Disconnected);
                self.events.fire(EventKind::Disconnect);
            }
        }
        Ok(())
    }
}

impl Default for RemotePlayback {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RemotePlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemotePlayback")
            .field("state", &self.state.get())
            .field("available", &self.available.get())
            .field("watchers", &self.watcher_count())
            .finish()
    }
}
