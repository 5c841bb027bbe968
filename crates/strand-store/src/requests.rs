//! Request vocabulary accepted by [`MediaStore::dispatch`].
//!
//! Requests are intents, not state writes: the store routes them to the
//! media, root, or options owners and lets the resulting events drive the
//! published state. [`MediaRequest::from_parts`] is the permissive string
//! boundary for event-style dispatch; unknown kinds simply parse to `None`.
//!
//! [`MediaStore::dispatch`]: crate::MediaStore

use std::rc::Rc;

use strand_events::TargetId;
use strand_media::{MediaApi, RootNode};

use crate::owners::OptionsPatch;
use crate::track_utils::TrackSpec;
use crate::value::StateValue;

/// A request dispatched into the store.
#[derive(Clone)]
pub enum MediaRequest {
    Play,
    Pause,
    /// Seek to an absolute time in seconds
    Seek(f64),
    SeekToLive,
    Volume(f64),
    Mute,
    Unmute,
    PlaybackRate(f64),
    EnterFullscreen,
    ExitFullscreen,
    EnterPip,
    ExitPip,
    EnterCast,
    ExitCast,
    EnterAirplay,
    /// Show exactly these subtitle tracks
    ShowSubtitles(Vec<TrackSpec>),
    /// Disable these subtitle tracks, leaving others alone
    DisableSubtitles(Vec<TrackSpec>),
    /// Toggle subtitles on or off; `None` flips the current state
    ToggleSubtitles(Option<bool>),
    /// Select a rendition by id; `None` returns to automatic quality
    Rendition(Option<String>),
    /// Enable an audio track by id
    AudioTrack(String),
    /// Update the preview state for a hover position; `None` clears it
    Preview(Option<f64>),
    /// Swap the monitored media element
    MediaElementChange(Option<Rc<dyn MediaApi>>),
    /// Swap the element used for fullscreen requests
    FullscreenElementChange(Option<TargetId>),
    /// Swap the root node owning fullscreen and picture-in-picture slots
    RootNodeChange(Option<Rc<RootNode>>),
    /// Patch store options in place
    OptionsChange(OptionsPatch),
}

impl std::fmt::Debug for MediaRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaRequest::Play => write!(f, "Play"),
            MediaRequest::Pause => write!(f, "Pause"),
            MediaRequest::Seek(t) => write!(f, "Seek({t})"),
            MediaRequest::SeekToLive => write!(f, "SeekToLive"),
            MediaRequest::Volume(v) => write!(f, "Volume({v})"),
            MediaRequest::Mute => write!(f, "Mute"),
            MediaRequest::Unmute => write!(f, "Unmute"),
            MediaRequest::PlaybackRate(r) => write!(f, "PlaybackRate({r})"),
            MediaRequest::EnterFullscreen => write!(f, "EnterFullscreen"),
            MediaRequest::ExitFullscreen => write!(f, "ExitFullscreen"),
            MediaRequest::EnterPip => write!(f, "EnterPip"),
            MediaRequest::ExitPip => write!(f, "ExitPip"),
            MediaRequest::EnterCast => write!(f, "EnterCast"),
            MediaRequest::ExitCast => write!(f, "ExitCast"),
            MediaRequest::EnterAirplay => write!(f, "EnterAirplay"),
            MediaRequest::ShowSubtitles(specs) => write!(f, "ShowSubtitles({specs:?})"),
            MediaRequest::DisableSubtitles(specs) => write!(f, "DisableSubtitles({specs:?})"),
            MediaRequest::ToggleSubtitles(force) => write!(f, "ToggleSubtitles({force:?})"),
            MediaRequest::Rendition(id) => write!(f, "Rendition({id:?})"),
            MediaRequest::AudioTrack(id) => write!(f, "AudioTrack({id:?})"),
            MediaRequest::Preview(time) => write!(f, "Preview({time:?})"),
            MediaRequest::MediaElementChange(media) => {
                write!(f, "MediaElementChange({})", if media.is_some() { "Some" } else { "None" })
            }
            MediaRequest::FullscreenElementChange(id) => {
                write!(f, "FullscreenElementChange({id:?})")
            }
            MediaRequest::RootNodeChange(root) => {
                write!(f, "RootNodeChange({})", if root.is_some() { "Some" } else { "None" })
            }
            MediaRequest::OptionsChange(_) => write!(f, "OptionsChange"),
        }
    }
}

impl MediaRequest {
    /// Parse an event-style request from its type string and optional
    /// detail. Unknown kinds and malformed details return `None`; the
    /// owner-swap requests have no string form.
    pub fn from_parts(kind: &str, detail: Option<&StateValue>) -> Option<MediaRequest> {
        let number = || detail.and_then(StateValue::as_f64);
        let specs = || -> Vec<TrackSpec> {
            detail
                .and_then(StateValue::as_list)
                .map(|items| items.iter().filter_map(TrackSpec::from_value).collect())
                .unwrap_or_default()
        };
        match kind {
            "mediaplayrequest" => Some(MediaRequest::Play),
            "mediapauserequest" => Some(MediaRequest::Pause),
            "mediaseekrequest" => number().map(MediaRequest::Seek),
            "mediaseektoliverequest" => Some(MediaRequest::SeekToLive),
            "mediavolumerequest" => number().map(MediaRequest::Volume),
            "mediamuterequest" => Some(MediaRequest::Mute),
            "mediaunmuterequest" => Some(MediaRequest::Unmute),
            "mediaplaybackraterequest" => number().map(MediaRequest::PlaybackRate),
            "mediaenterfullscreenrequest" => Some(MediaRequest::EnterFullscreen),
            "mediaexitfullscreenrequest" => Some(MediaRequest::ExitFullscreen),
            "mediaenterpiprequest" => Some(MediaRequest::EnterPip),
            "mediaexitpiprequest" => Some(MediaRequest::ExitPip),
            "mediaentercastrequest" => Some(MediaRequest::EnterCast),
            "mediaexitcastrequest" => Some(MediaRequest::ExitCast),
            "mediaairplayrequest" => Some(MediaRequest::EnterAirplay),
            "mediashowsubtitlesrequest" => Some(MediaRequest::ShowSubtitles(specs())),
            "mediadisablesubtitlesrequest" => Some(MediaRequest::DisableSubtitles(specs())),
            "mediatogglesubtitlesrequest" => Some(MediaRequest::ToggleSubtitles(
                detail.and_then(StateValue::as_bool),
            )),
            "mediarenditionrequest" => Some(MediaRequest::Rendition(
                detail.and_then(StateValue::as_str).map(str::to_string),
            )),
            "mediaaudiotrackrequest" => detail
                .and_then(StateValue::as_str)
                .map(|id| MediaRequest::AudioTrack(id.to_string())),
            "mediapreviewrequest" => Some(MediaRequest::Preview(number())),
            _ => None,
        }
    }
}
