//! strand Events
//!
//! Event types and listener registries shared by every strand state owner.
//!
//! Features:
//! - `EventKind`, the closed set of native event types owners can fire
//! - `Event`, the payload handed to listeners
//! - `EventTarget`, a per-object listener registry with stable ids

pub mod event;
pub mod target;

pub use event::{Event, EventKind};
pub use target::{EventTarget, ListenerId, TargetId};
