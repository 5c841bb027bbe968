//! Events
//!
//! Native event types fired by media, track-list, remote-playback and
//! root-node owners.

use crate::target::TargetId;

/// Native event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // Media element lifecycle
    LoadStart,
    LoadedMetadata,
    CanPlay,
    Emptied,

    // Playback
    Play,
    Playing,
    Pause,
    Waiting,
    Seeking,
    Seeked,
    Ended,
    TimeUpdate,
    Progress,

    // Properties
    DurationChange,
    RateChange,
    VolumeChange,

    // Live streams
    StreamTypeChange,
    TargetLiveWindowChange,

    // Picture-in-picture
    EnterPictureInPicture,
    LeavePictureInPicture,

    // Presentation surface (inline/fullscreen mode, wireless targets)
    PresentationModeChange,
    TargetAvailabilityChange,

    // Track and rendition lists
    AddTrack,
    RemoveTrack,
    Change,
    AddRendition,
    RemoveRendition,

    // Remote playback connection
    Connect,
    Connecting,
    Disconnect,

    // Root node
    FullscreenChange,
}

impl EventKind {
    /// DOM-style event type name
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::LoadStart => "loadstart",
            EventKind::LoadedMetadata => "loadedmetadata",
            EventKind::CanPlay => "canplay",
            EventKind::Emptied => "emptied",
            EventKind::Play => "play",
            EventKind::Playing => "playing",
            EventKind::Pause => "pause",
            EventKind::Waiting => "waiting",
            EventKind::Seeking => "seeking",
            EventKind::Seeked => "seeked",
            EventKind::Ended => "ended",
            EventKind::TimeUpdate => "timeupdate",
            EventKind::Progress => "progress",
            EventKind::DurationChange => "durationchange",
            EventKind::RateChange => "ratechange",
            EventKind::VolumeChange => "volumechange",
            EventKind::StreamTypeChange => "streamtypechange",
            EventKind::TargetLiveWindowChange => "targetlivewindowchange",
            EventKind::EnterPictureInPicture => "enterpictureinpicture",
            EventKind::LeavePictureInPicture => "leavepictureinpicture",
            EventKind::PresentationModeChange => "presentationmodechange",
            EventKind::TargetAvailabilityChange => "targetavailabilitychange",
            EventKind::AddTrack => "addtrack",
            EventKind::RemoveTrack => "removetrack",
            EventKind::Change => "change",
            EventKind::AddRendition => "addrendition",
            EventKind::RemoveRendition => "removerendition",
            EventKind::Connect => "connect",
            EventKind::Connecting => "connecting",
            EventKind::Disconnect => "disconnect",
            EventKind::FullscreenChange => "fullscreenchange",
        }
    }
}

/// An event as delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: Option<TargetId>,
}

impl Event {
    /// Event with no target attribution
    pub fn new(kind: EventKind) -> Self {
        Self { kind, target: None }
    }

    /// Event fired on a specific target
    pub fn on(kind: EventKind, target: TargetId) -> Self {
        Self {
            kind,
            target: Some(target),
        }
    }
}
