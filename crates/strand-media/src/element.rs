//! Media Elements
//!
//! The playback-element contract (`MediaApi`) and a scripted reference
//! element (`MediaElement`) that fires the matching events whenever its
//! state is mutated.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use strand_events::{EventKind, EventTarget, TargetId};

use crate::presentation::Presentation;
use crate::remote::RemotePlayback;
use crate::tracks::{AudioTrackList, RenditionList, TextTrackList};
use crate::MediaError;

/// Ready state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

/// Preload hint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PreloadHint {
    None,
    #[default]
    Metadata,
    Auto,
}

/// Stream type as reported by a playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Live,
    OnDemand,
    Unknown,
}

impl StreamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamType::Live => "live",
            StreamType::OnDemand => "on-demand",
            StreamType::Unknown => "unknown",
        }
    }
}

/// Time ranges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeRanges {
    ranges: Vec<(f64, f64)>,
}

impl TimeRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, start: f64, end: f64) {
        self.ranges.push((start, end));
    }

    pub fn length(&self) -> usize {
        self.ranges.len()
    }

    pub fn start(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(s, _)| *s)
    }

    pub fn end(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(_, e)| *e)
    }

    /// End of the last range, if any
    pub fn last_end(&self) -> Option<f64> {
        self.ranges.last().map(|(_, e)| *e)
    }

    /// Start of the first range, if any
    pub fn first_start(&self) -> Option<f64> {
        self.ranges.first().map(|(s, _)| *s)
    }
}

/// Minimal contract every playback element must satisfy, plus optional
/// surfaces that default to absent.
///
/// Absence of an optional surface degrades to the documented default and
/// never panics; the store relies on this.
pub trait MediaApi {
    /// Listener registry for native media events (required)
    fn events(&self) -> &EventTarget;

    /// Begin playback (required); failures are logged by callers, never
    /// propagated
    fn play(&self) -> Result<(), MediaError>;

    /// Pause playback (required)
    fn pause(&self);

    /// Paused flag (required)
    fn paused(&self) -> bool;

    /// Identity, shared with the event target
    fn id(&self) -> TargetId {
        self.events().id()
    }

    fn current_time(&self) -> f64 {
        0.0
    }

    fn set_current_time(&self, _time: f64) {}

    fn duration(&self) -> f64 {
        f64::NAN
    }

    fn ended(&self) -> bool {
        false
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::HaveNothing
    }

    /// Seekable ranges; `None` means the element does not report seekability
    fn seekable(&self) -> Option<TimeRanges> {
        None
    }

    fn buffered(&self) -> TimeRanges {
        TimeRanges::new()
    }

    fn playback_rate(&self) -> f64 {
        1.0
    }

    fn set_playback_rate(&self, _rate: f64) {}

    fn volume(&self) -> f64 {
        1.0
    }

    fn set_volume(&self, _volume: f64) {}

    fn muted(&self) -> bool {
        false
    }

    fn set_muted(&self, _muted: bool) {}

    /// Declaratively muted (the markup asked for it); gates mute persistence
    fn default_muted(&self) -> bool {
        false
    }

    fn preload(&self) -> PreloadHint {
        PreloadHint::Metadata
    }

    fn set_preload(&self, _hint: PreloadHint) {}

    /// Element opted out of picture-in-picture
    fn pip_disabled(&self) -> bool {
        false
    }

    /// Stream type reported by the playback engine, if any
    fn stream_type_hint(&self) -> Option<StreamType> {
        None
    }

    /// DVR window length hint in seconds (0 means no DVR)
    fn target_live_window_hint(&self) -> Option<f64> {
        None
    }

    /// Engine-computed start of the live edge region
    fn live_edge_start(&self) -> Option<f64> {
        None
    }

    fn text_tracks(&self) -> Option<Rc<TextTrackList>> {
        None
    }

    fn audio_tracks(&self) -> Option<Rc<AudioTrackList>> {
        None
    }

    fn video_renditions(&self) -> Option<Rc<RenditionList>> {
        None
    }

    fn remote(&self) -> Option<Rc<RemotePlayback>> {
        None
    }

    /// iOS-style presentation surface (inline/fullscreen mode, wireless
    /// targets); checked before the standard root-node fullscreen path
    fn presentation(&self) -> Option<Rc<Presentation>> {
        None
    }
}

#[derive(Debug)]
struct ElementState {
    current_time: f64,
    duration: f64,
    paused: bool,
    ended: bool,
    volume: f64,
    muted: bool,
    default_muted: bool,
    playback_rate: f64,
    ready_state: ReadyState,
    preload: PreloadHint,
    seekable: Option<TimeRanges>,
    buffered: TimeRanges,
    stream_type: Option<StreamType>,
    target_live_window: Option<f64>,
    live_edge_start: Option<f64>,
    pip_disabled: bool,
    volume_fixed: bool,
    play_blocked: bool,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: f64::NAN,
            paused: true,
            ended: false,
            volume: 1.0,
            muted: false,
            default_muted: false,
            playback_rate: 1.0,
            ready_state: ReadyState::HaveNothing,
            preload: PreloadHint::Metadata,
            seekable: None,
            buffered: TimeRanges::new(),
            stream_type: None,
            target_live_window: None,
            live_edge_start: None,
            pip_disabled: false,
            volume_fixed: false,
            play_blocked: false,
        }
    }
}

/// Scripted HTML5-like media element.
///
/// Mutators fire the events a real element would, which makes this both the
/// reference owner implementation and the test harness for the store.
pub struct MediaElement {
    events: Rc<EventTarget>,
    state: RefCell<ElementState>,
    text_tracks: Rc<TextTrackList>,
    audio_tracks: Option<Rc<AudioTrackList>>,
    renditions: Option<Rc<RenditionList>>,
    remote: Option<Rc<RemotePlayback>>,
    presentation: Option<Rc<Presentation>>,
    play_calls: Cell<u32>,
}

impl MediaElement {
    pub fn new() -> Self {
        Self {
            events: Rc::new(EventTarget::new()),
            state: RefCell::new(ElementState::default()),
            text_tracks: Rc::new(TextTrackList::new()),
            audio_tracks: None,
            renditions: None,
            remote: None,
            presentation: None,
            play_calls: Cell::new(0),
        }
    }

    /// Attach an audio-track list surface
    pub fn with_audio_tracks(mut self) -> Self {
        self.audio_tracks = Some(Rc::new(AudioTrackList::new()));
        self
    }

    /// Attach a rendition list surface
    pub fn with_renditions(mut self) -> Self {
        self.renditions = Some(Rc::new(RenditionList::new()));
        self
    }

    /// Attach a remote-playback surface
    pub fn with_remote(mut self) -> Self {
        self.remote = Some(Rc::new(RemotePlayback::new()));
        self
    }

    /// Attach an iOS-style presentation surface
    pub fn with_presentation(mut self) -> Self {
        self.presentation = Some(Rc::new(Presentation::new(Rc::clone(&self.events))));
        self
    }

    /// Number of times `play()` was invoked
    pub fn play_call_count(&self) -> u32 {
        self.play_calls.get()
    }

    /// Start a load cycle: nothing buffered, metadata gone
    pub fn begin_load(&self) {
        {
            let mut s = self.state.borrow_mut();
            s.ready_state = ReadyState::HaveNothing;
            s.duration = f64::NAN;
            s.current_time = 0.0;
            s.ended = false;
        }
        self.events.fire(EventKind::LoadStart);
    }

    /// Metadata arrived
    pub fn finish_load(&self, duration: f64) {
        {
            let mut s = self.state.borrow_mut();
            s.duration = duration;
            s.ready_state = ReadyState::HaveMetadata;
        }
        self.events.fire(EventKind::DurationChange);
        self.events.fire(EventKind::LoadedMetadata);
    }

    /// Enough data to play through
    pub fn make_ready(&self) {
        self.state.borrow_mut().ready_state = ReadyState::HaveEnoughData;
        self.events.fire(EventKind::CanPlay);
    }

    pub fn set_ready_state(&self, ready: ReadyState) {
        let crossed = {
            let mut s = self.state.borrow_mut();
            let crossed = s.ready_state < ReadyState::HaveMetadata && ready >= ReadyState::HaveMetadata;
            s.ready_state = ready;
            crossed
        };
        if crossed {
            self.events.fire(EventKind::LoadedMetadata);
        }
    }

    pub fn set_duration(&self, duration: f64) {
        self.state.borrow_mut().duration = duration;
        self.events.fire(EventKind::DurationChange);
    }

    pub fn set_seekable(&self, ranges: Option<TimeRanges>) {
        self.state.borrow_mut().seekable = ranges;
        self.events.fire(EventKind::Progress);
    }

    pub fn set_buffered(&self, ranges: TimeRanges) {
        self.state.borrow_mut().buffered = ranges;
        self.events.fire(EventKind::Progress);
    }

    pub fn set_stream_type(&self, stream_type: Option<StreamType>) {
        self.state.borrow_mut().stream_type = stream_type;
        self.events.fire(EventKind::StreamTypeChange);
    }

    pub fn set_target_live_window(&self, window: Option<f64>) {
        self.state.borrow_mut().target_live_window = window;
        self.events.fire(EventKind::TargetLiveWindowChange);
    }

    pub fn set_live_edge_start(&self, start: Option<f64>) {
        self.state.borrow_mut().live_edge_start = start;
    }

    pub fn set_default_muted(&self, default_muted: bool) {
        self.state.borrow_mut().default_muted = default_muted;
    }

    pub fn set_pip_disabled(&self, disabled: bool) {
        self.state.borrow_mut().pip_disabled = disabled;
    }

    /// Emulate a platform with a fixed system volume (assignments ignored)
    pub fn set_volume_fixed(&self, fixed: bool) {
        self.state.borrow_mut().volume_fixed = fixed;
    }

    /// Emulate an autoplay-policy block: `play()` fails without state change
    pub fn set_play_blocked(&self, blocked: bool) {
        self.state.borrow_mut().play_blocked = blocked;
    }

    /// Finish playback
    pub fn end_playback(&self) {
        {
            let mut s = self.state.borrow_mut();
            s.ended = true;
            s.paused = true;
            if s.duration.is_finite() {
                s.current_time = s.duration;
            }
        }
        self.events.fire(EventKind::TimeUpdate);
        self.events.fire(EventKind::Ended);
    }
}

impl Default for MediaElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaApi for MediaElement {
    fn events(&self) -> &EventTarget {
        &self.events
    }

    fn play(&self) -> Result<(), MediaError> {
        self.play_calls.set(self.play_calls.get() + 1);
        let ready = {
            let mut s = self.state.borrow_mut();
            if s.play_blocked {
                return Err(MediaError::InvalidState("playback was blocked".into()));
            }
            s.paused = false;
            s.ended = false;
            s.ready_state
        };
        self.events.fire(EventKind::Play);
        if ready >= ReadyState::HaveFutureData {
            self.events.fire(EventKind::Playing);
        } else {
            self.events.fire(EventKind::Waiting);
        }
        Ok(())
    }

    fn pause(&self) {
        self.state.borrow_mut().paused = true;
        self.events.fire(EventKind::Pause);
    }

    fn paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&self, time: f64) {
        {
            let mut s = self.state.borrow_mut();
            let max = if s.duration.is_finite() {
                s.duration
            } else if let Some(end) = s.seekable.as_ref().and_then(|r| r.last_end()) {
                end
            } else {
                f64::INFINITY
            };
            s.current_time = time.clamp(0.0, max);
            s.ended = false;
        }
        self.events.fire(EventKind::Seeking);
        self.events.fire(EventKind::Seeked);
        self.events.fire(EventKind::TimeUpdate);
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn ended(&self) -> bool {
        self.state.borrow().ended
    }

    fn ready_state(&self) -> ReadyState {
        self.state.borrow().ready_state
    }

    fn seekable(&self) -> Option<TimeRanges> {
        self.state.borrow().seekable.clone()
    }

    fn buffered(&self) -> TimeRanges {
        self.state.borrow().buffered.clone()
    }

    fn playback_rate(&self) -> f64 {
        self.state.borrow().playback_rate
    }

    fn set_playback_rate(&self, rate: f64) {
        self.state.borrow_mut().playback_rate = rate;
        self.events.fire(EventKind::RateChange);
    }

    fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    fn set_volume(&self, volume: f64) {
        let changed = {
            let mut s = self.state.borrow_mut();
            if s.volume_fixed {
                false
            } else {
                let next = volume.clamp(0.0, 1.0);
                let changed = next != s.volume;
                s.volume = next;
                changed
            }
        };
        if changed {
            self.events.fire(EventKind::VolumeChange);
        }
    }

    fn muted(&self) -> bool {
        self.state.borrow().muted
    }

    fn set_muted(&self, muted: bool) {
        let changed = {
            let mut s = self.state.borrow_mut();
            let changed = s.muted != muted;
            s.muted = muted;
            changed
        };
        if changed {
            self.events.fire(EventKind::VolumeChange);
        }
    }

    fn default_muted(&self) -> bool {
        self.state.borrow().default_muted
    }

    fn preload(&self) -> PreloadHint {
        self.state.borrow().preload
    }

    fn set_preload(&self, hint: PreloadHint) {
        self.state.borrow_mut().preload = hint;
    }

    fn pip_disabled(&self) -> bool {
        self.state.borrow().pip_disabled
    }

    fn stream_type_hint(&self) -> Option<StreamType> {
        self.state.borrow().stream_type
    }

    fn target_live_window_hint(&self) -> Option<f64> {
        self.state.borrow().target_live_window
    }

    fn live_edge_start(&self) -> Option<f64> {
        self.state.borrow().live_edge_start
    }

    fn text_tracks(&self) -> Option<Rc<TextTrackList>> {
        Some(Rc::clone(&self.text_tracks))
    }

    fn audio_tracks(&self) -> Option<Rc<AudioTrackList>> {
        self.audio_tracks.as_ref().map(Rc::clone)
    }

    fn video_renditions(&self) -> Option<Rc<RenditionList>> {
        self.renditions.as_ref().map(Rc::clone)
    }

    fn remote(&self) -> Option<Rc<RemotePlayback>> {
        self.remote.as_ref().map(Rc::clone)
    }

    fn presentation(&self) -> Option<Rc<Presentation>> {
        self.presentation.as_ref().map(Rc::clone)
    }
}

impl std::fmt::Debug for MediaElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.state.borrow();
        f.debug_struct("MediaElement")
            .field("id", &self.events.id())
            .field("paused", &s.paused)
            .field("current_time", &s.current_time)
            .field("duration", &s.duration)
            .field("ready_state", &s.ready_state)
            .finish()
    }
}
