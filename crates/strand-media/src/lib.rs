//! strand Media
//!
//! The state-owner surfaces the strand store mediates: a playback element
//! contract with a scripted reference implementation, track and rendition
//! lists, remote playback, the presentation (inline/fullscreen/wireless)
//! surface, and the document-like root node.
//!
//! Every optional surface is exactly that: absent surfaces degrade to
//! documented defaults and never panic.

pub mod element;
pub mod presentation;
pub mod remote;
pub mod root;
pub mod tracks;

pub use element::{MediaApi, MediaElement, PreloadHint, ReadyState, StreamType, TimeRanges};
pub use presentation::{Presentation, PresentationMode};
pub use remote::{RemotePlayback, RemoteState, WatchId};
pub use root::RootNode;
pub use tracks::{
    AudioTrack, AudioTrackList, Rendition, RenditionList, TextCue, TextTrack, TextTrackKind,
    TextTrackList, TextTrackMode,
};

/// Media error
#[derive(Debug, Clone, thiserror::Error)]
pub enum MediaError {
    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}
