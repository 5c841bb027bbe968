//! strand Store
//!
//! Reactive media state for player UIs: a declarative mediator table maps
//! each piece of state to the owner objects it is read from and the events
//! that invalidate it, and the store turns that table into immutable
//! snapshots published to subscribers.
//!
//! Features:
//! - `MediaStore`: dispatch requests in, subscribe to snapshots out
//! - `Mediator`: the pure per-key descriptor table
//! - `StateValue`/`MediaState`: JSON-like values with NaN-tolerant equality
//! - preference persistence for volume, mute, and subtitle language

pub mod mediator;
pub mod owners;
pub mod prefs;
pub mod requests;
pub mod state;
pub mod store;
pub mod track_utils;
pub mod value;

pub use mediator::{Mediator, StateDescriptor, StateSink};
pub use owners::{OptionsPatch, Platform, StateOwners, StoreOptions};
pub use prefs::PreferenceStore;
pub use requests::MediaRequest;
pub use state::{Availability, MediaState, StateKey, VolumeLevel};
pub use store::{MediaStore, MonitorPolicy, Subscription};
pub use track_utils::TrackSpec;
pub use value::StateValue;
