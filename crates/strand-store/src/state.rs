//! Media State
//!
//! The closed set of state keys, the immutable snapshot type, and the small
//! semantic enums (volume level, availability) published as state values.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::value::{values_eq, StateValue};

/// State keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKey {
    MediaPaused,
    MediaHasPlayed,
    MediaEnded,
    MediaLoading,
    MediaCurrentTime,
    MediaDuration,
    MediaSeekable,
    MediaBuffered,
    MediaPlaybackRate,
    MediaMuted,
    MediaVolume,
    MediaVolumeLevel,
    MediaVolumeUnavailable,
    MediaIsPip,
    MediaPipUnavailable,
    MediaIsFullscreen,
    MediaFullscreenUnavailable,
    MediaIsCasting,
    MediaCastUnavailable,
    MediaAirplayUnavailable,
    MediaStreamType,
    MediaTargetLiveWindow,
    MediaTimeIsLive,
    MediaSubtitlesList,
    MediaSubtitlesShowing,
    MediaChaptersCues,
    MediaRenditionList,
    MediaRenditionSelected,
    MediaRenditionUnavailable,
    MediaAudioTrackList,
    MediaAudioTrackEnabled,
    MediaAudioTrackUnavailable,
    MediaPreviewTime,
    MediaPreviewImage,
    MediaPreviewCoords,
    MediaPreviewChapter,
}

impl StateKey {
    /// Every key, mediator-backed and store-managed alike
    pub const ALL: [StateKey; 36] = [
        StateKey::MediaPaused,
        StateKey::MediaHasPlayed,
        StateKey::MediaEnded,
        StateKey::MediaLoading,
        StateKey::MediaCurrentTime,
        StateKey::MediaDuration,
        StateKey::MediaSeekable,
        StateKey::MediaBuffered,
        StateKey::MediaPlaybackRate,
        StateKey::MediaMuted,
        StateKey::MediaVolume,
        StateKey::MediaVolumeLevel,
        StateKey::MediaVolumeUnavailable,
        StateKey::MediaIsPip,
        StateKey::MediaPipUnavailable,
        StateKey::MediaIsFullscreen,
        StateKey::MediaFullscreenUnavailable,
        StateKey::MediaIsCasting,
        StateKey::MediaCastUnavailable,
        StateKey::MediaAirplayUnavailable,
        StateKey::MediaStreamType,
        StateKey::MediaTargetLiveWindow,
        StateKey::MediaTimeIsLive,
        StateKey::MediaSubtitlesList,
        StateKey::MediaSubtitlesShowing,
        StateKey::MediaChaptersCues,
        StateKey::MediaRenditionList,
        StateKey::MediaRenditionSelected,
        StateKey::MediaRenditionUnavailable,
        StateKey::MediaAudioTrackList,
        StateKey::MediaAudioTrackEnabled,
        StateKey::MediaAudioTrackUnavailable,
        StateKey::MediaPreviewTime,
        StateKey::MediaPreviewImage,
        StateKey::MediaPreviewCoords,
        StateKey::MediaPreviewChapter,
    ];

    /// The four preview keys are fed by preview requests, not the mediator
    pub const PREVIEW: [StateKey; 4] = [
        StateKey::MediaPreviewTime,
        StateKey::MediaPreviewImage,
        StateKey::MediaPreviewCoords,
        StateKey::MediaPreviewChapter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::MediaPaused => "mediaPaused",
            StateKey::MediaHasPlayed => "mediaHasPlayed",
            StateKey::MediaEnded => "mediaEnded",
            StateKey::MediaLoading => "mediaLoading",
            StateKey::MediaCurrentTime => "mediaCurrentTime",
            StateKey::MediaDuration => "mediaDuration",
            StateKey::MediaSeekable => "mediaSeekable",
            StateKey::MediaBuffered => "mediaBuffered",
            StateKey::MediaPlaybackRate => "mediaPlaybackRate",
            StateKey::MediaMuted => "mediaMuted",
            StateKey::MediaVolume => "mediaVolume",
            StateKey::MediaVolumeLevel => "mediaVolumeLevel",
            StateKey::MediaVolumeUnavailable => "mediaVolumeUnavailable",
            StateKey::MediaIsPip => "mediaIsPip",
            StateKey::MediaPipUnavailable => "mediaPipUnavailable",
            StateKey::MediaIsFullscreen => "mediaIsFullscreen",
            StateKey::MediaFullscreenUnavailable => "mediaFullscreenUnavailable",
            StateKey::MediaIsCasting => "mediaIsCasting",
            StateKey::MediaCastUnavailable => "mediaCastUnavailable",
            StateKey::MediaAirplayUnavailable => "mediaAirplayUnavailable",
            StateKey::MediaStreamType => "mediaStreamType",
            StateKey::MediaTargetLiveWindow => "mediaTargetLiveWindow",
            StateKey::MediaTimeIsLive => "mediaTimeIsLive",
            StateKey::MediaSubtitlesList => "mediaSubtitlesList",
            StateKey::MediaSubtitlesShowing => "mediaSubtitlesShowing",
            StateKey::MediaChaptersCues => "mediaChaptersCues",
            StateKey::MediaRenditionList => "mediaRenditionList",
            StateKey::MediaRenditionSelected => "mediaRenditionSelected",
            StateKey::MediaRenditionUnavailable => "mediaRenditionUnavailable",
            StateKey::MediaAudioTrackList => "mediaAudioTrackList",
            StateKey::MediaAudioTrackEnabled => "mediaAudioTrackEnabled",
            StateKey::MediaAudioTrackUnavailable => "mediaAudioTrackUnavailable",
            StateKey::MediaPreviewTime => "mediaPreviewTime",
            StateKey::MediaPreviewImage => "mediaPreviewImage",
            StateKey::MediaPreviewCoords => "mediaPreviewCoords",
            StateKey::MediaPreviewChapter => "mediaPreviewChapter",
        }
    }
}

impl Serialize for StateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Volume level bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Off,
    Low,
    Medium,
    High,
}

impl VolumeLevel {
    /// Pure function of (muted, volume)
    pub fn from_volume(muted: bool, volume: f64) -> Self {
        if muted || volume == 0.0 {
            VolumeLevel::Off
        } else if volume < 0.5 {
            VolumeLevel::Low
        } else if volume < 0.75 {
            VolumeLevel::Medium
        } else {
            VolumeLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeLevel::Off => "off",
            VolumeLevel::Low => "low",
            VolumeLevel::Medium => "medium",
            VolumeLevel::High => "high",
        }
    }
}

/// Three-valued availability: a `Null` state value means available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Feature exists but is not usable right now
    Unavailable,
    /// Platform cannot do this at all
    Unsupported,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Unavailable => "unavailable",
            Availability::Unsupported => "unsupported",
        }
    }

    pub fn into_value(self) -> StateValue {
        StateValue::Text(self.as_str().to_string())
    }
}

/// Immutable state snapshot.
///
/// The store hands out `Rc<MediaState>`; a snapshot is never mutated after
/// publication, every change produces a new one via [`MediaState::merged`].
#[derive(Debug, Clone, Default)]
pub struct MediaState {
    entries: BTreeMap<StateKey, StateValue>,
}

impl MediaState {
    pub fn new(entries: BTreeMap<StateKey, StateValue>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: StateKey) -> &StateValue {
        static NULL: StateValue = StateValue::Null;
        self.entries.get(&key).unwrap_or(&NULL)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateKey, &StateValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// New snapshot with the given keys replaced
    pub fn merged<I>(&self, changes: I) -> MediaState
    where
        I: IntoIterator<Item = (StateKey, StateValue)>,
    {
        let mut entries = self.entries.clone();
        for (key, value) in changes {
            entries.insert(key, value);
        }
        MediaState { entries }
    }

    /// Keys in `changes` whose value differs structurally from this snapshot
    pub fn changed_keys<'a>(&self, changes: &'a [(StateKey, StateValue)]) -> Vec<&'a (StateKey, StateValue)> {
        changes
            .iter()
            .filter(|(key, value)| !values_eq(self.get(*key), value))
            .collect()
    }

    // Typed accessors for the common cases

    pub fn is_true(&self, key: StateKey) -> bool {
        self.get(key).as_bool().unwrap_or(false)
    }

    pub fn number(&self, key: StateKey) -> Option<f64> {
        self.get(key).as_f64()
    }

    pub fn text(&self, key: StateKey) -> Option<&str> {
        self.get(key).as_str()
    }
}

impl Serialize for MediaState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}
