//! State Mediator
//!
//! A pure, per-key table of state descriptors: how to read each piece of
//! media state from the state owners, how to write it back when it is
//! mutable, and which owner events should trigger a re-read.
//!
//! The table is declarative and never changes at runtime. Every getter and
//! setter is total over absent owners; that contract is enforced by tests
//! that run the whole table against empty owners.

use std::rc::Rc;
use std::sync::OnceLock;

use strand_events::{Event, EventKind};

use crate::owners::StateOwners;
use crate::state::StateKey;
use crate::value::StateValue;

mod audio;
mod live;
mod playback;
mod presentation;
mod tracks;

pub(crate) use live::seek_to_live;

/// Read the current value of a key; the event, when present, may carry
/// disambiguating detail
pub type GetFn = fn(&StateOwners, Option<&Event>) -> StateValue;

/// Translate an intended value into imperative calls on the owners
pub type SetFn = fn(&StateValue, &StateOwners);

/// Cleanup returned by an owner-update handler
pub type Teardown = Box<dyn FnOnce()>;

/// Escape hatch for state that cannot be modeled as "read + listen to named
/// events": runs once whenever any state owner changes, may push values and
/// may return a teardown
pub type OwnerUpdateFn = fn(&StateOwners, &StateSink) -> Option<Teardown>;

/// Pushes recomputed values for one key back into the store
#[derive(Clone)]
pub struct StateSink {
    key: StateKey,
    push: Rc<dyn Fn(StateKey, StateValue)>,
}

impl StateSink {
    pub fn new(key: StateKey, push: Rc<dyn Fn(StateKey, StateValue)>) -> Self {
        Self { key, push }
    }

    pub fn key(&self) -> StateKey {
        self.key
    }

    pub fn push(&self, value: StateValue) {
        (self.push)(self.key, value);
    }
}

/// One entry of the mediator table
pub struct StateDescriptor {
    pub key: StateKey,
    pub get: GetFn,
    pub set: Option<SetFn>,
    pub media_events: &'static [EventKind],
    pub text_track_events: &'static [EventKind],
    pub audio_track_events: &'static [EventKind],
    pub rendition_events: &'static [EventKind],
    pub remote_events: &'static [EventKind],
    pub root_events: &'static [EventKind],
    pub owner_update: Option<OwnerUpdateFn>,
}

impl StateDescriptor {
    fn reader(key: StateKey, get: GetFn) -> Self {
        Self {
            key,
            get,
            set: None,
            media_events: &[],
            text_track_events: &[],
            audio_track_events: &[],
            rendition_events: &[],
            remote_events: &[],
            root_events: &[],
            owner_update: None,
        }
    }

    fn writer(mut self, set: SetFn) -> Self {
        self.set = Some(set);
        self
    }

    fn on_media(mut self, events: &'static [EventKind]) -> Self {
        self.media_events = events;
        self
    }

    fn on_text_tracks(mut self, events: &'static [EventKind]) -> Self {
        self.text_track_events = events;
        self
    }

    fn on_audio_tracks(mut self, events: &'static [EventKind]) -> Self {
        self.audio_track_events = events;
        self
    }

    fn on_renditions(mut self, events: &'static [EventKind]) -> Self {
        self.rendition_events = events;
        self
    }

    fn on_remote(mut self, events: &'static [EventKind]) -> Self {
        self.remote_events = events;
        self
    }

    fn on_root(mut self, events: &'static [EventKind]) -> Self {
        self.root_events = events;
        self
    }

    fn on_owner_change(mut self, handler: OwnerUpdateFn) -> Self {
        self.owner_update = Some(handler);
        self
    }
}

/// The full mediator table
pub struct Mediator {
    descriptors: Vec<StateDescriptor>,
}

impl Mediator {
    /// The process-wide standard table
    pub fn standard() -> &'static Mediator {
        static TABLE: OnceLock<Mediator> = OnceLock::new();
        TABLE.get_or_init(Mediator::build)
    }

    fn build() -> Self {
        let mut descriptors = Vec::new();
        playback::install(&mut descriptors);
        audio::install(&mut descriptors);
        live::install(&mut descriptors);
        presentation::install(&mut descriptors);
        tracks::install(&mut descriptors);
        Self { descriptors }
    }

    pub fn descriptors(&self) -> &[StateDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, key: StateKey) -> Option<&StateDescriptor> {
        self.descriptors.iter().find(|d| d.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_events::Event;

    #[test]
    fn test_table_covers_every_non_preview_key() {
        let mediator = Mediator::standard();
        assert_eq!(mediator.descriptors().len(), 32);
        for key in StateKey::ALL {
            let preview = StateKey::PREVIEW.contains(&key);
            assert_eq!(
                mediator.descriptor(key).is_some(),
                !preview,
                "descriptor presence mismatch for {key:?}"
            );
        }
    }

    #[test]
    fn test_every_getter_total_over_empty_owners() {
        let owners = StateOwners::default();
        let event = Event::new(EventKind::TimeUpdate);
        for descriptor in Mediator::standard().descriptors() {
            // must never panic, with or without an event
            let _ = (descriptor.get)(&owners, None);
            let _ = (descriptor.get)(&owners, Some(&event));
        }
    }

    #[test]
    fn test_every_setter_total_over_empty_owners() {
        let owners = StateOwners::default();
        for descriptor in Mediator::standard().descriptors() {
            if let Some(set) = descriptor.set {
                set(&StateValue::Null, &owners);
                set(&StateValue::Bool(true), &owners);
                set(&StateValue::Number(0.5), &owners);
            }
        }
    }

    #[test]
    fn test_owner_update_total_over_empty_owners() {
        let owners = StateOwners::default();
        for descriptor in Mediator::standard().descriptors() {
            if let Some(handler) = descriptor.owner_update {
                let sink = StateSink::new(descriptor.key, Rc::new(|_, _| {}));
                if let Some(teardown) = handler(&owners, &sink) {
                    teardown();
                }
            }
        }
    }
}
