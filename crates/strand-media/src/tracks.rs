//! Media Tracks
//!
//! Text tracks, audio tracks and video renditions, each wrapped in a list
//! that fires `addtrack`/`removetrack`/`change` style events so the store
//! can watch membership and mode changes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use strand_events::{EventKind, EventTarget};

/// Text track kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextTrackKind {
    Subtitles,
    #[default]
    Captions,
    Descriptions,
    Chapters,
    Metadata,
}

impl TextTrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextTrackKind::Subtitles => "subtitles",
            TextTrackKind::Captions => "captions",
            TextTrackKind::Descriptions => "descriptions",
            TextTrackKind::Chapters => "chapters",
            TextTrackKind::Metadata => "metadata",
        }
    }

    /// Subtitles and captions are interchangeable for selection purposes
    pub fn is_subtitles(&self) -> bool {
        matches!(self, TextTrackKind::Subtitles | TextTrackKind::Captions)
    }
}

/// Text track mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextTrackMode {
    #[default]
    Disabled,
    Hidden,
    Showing,
}

/// Text track cue
#[derive(Debug, Clone, PartialEq)]
pub struct TextCue {
    pub id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

/// Text track
#[derive(Debug)]
pub struct TextTrack {
    pub kind: TextTrackKind,
    pub label: String,
    pub language: String,
    mode: Cell<TextTrackMode>,
    cues: RefCell<Vec<TextCue>>,
}

impl TextTrack {
    pub fn new(kind: TextTrackKind, label: &str, language: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            language: language.to_string(),
            mode: Cell::new(TextTrackMode::Disabled),
            cues: RefCell::new(Vec::new()),
        }
    }

    pub fn mode(&self) -> TextTrackMode {
        self.mode.get()
    }

    pub fn add_cue(&self, cue: TextCue) {
        self.cues.borrow_mut().push(cue);
    }

    pub fn cues(&self) -> Vec<TextCue> {
        self.cues.borrow().clone()
    }

    /// Cue active at the given time, if any
    pub fn cue_at(&self, time: f64) -> Option<TextCue> {
        self.cues
            .borrow()
            .iter()
            .find(|c| c.start_time <= time && time < c.end_time)
            .cloned()
    }
}

/// Text track list
pub struct TextTrackList {
    events: EventTarget,
    tracks: RefCell<Vec<Rc<TextTrack>>>,
}

impl TextTrackList {
    pub fn new() -> Self {
        Self {
            events: EventTarget::new(),
            tracks: RefCell::new(Vec::new()),
        }
    }

    pub fn events(&self) -> &EventTarget {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.tracks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.borrow().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Rc<TextTrack>> {
        self.tracks.borrow().clone()
    }

    pub fn add(&self, track: TextTrack) -> Rc<TextTrack> {
        let track = Rc::new(track);
        self.tracks.borrow_mut().push(Rc::clone(&track));
        self.events.fire(EventKind::AddTrack);
        track
    }

    pub fn remove_where<F: Fn(&TextTrack) -> bool>(&self, pred: F) -> usize {
        let removed = {
            let mut tracks = self.tracks.borrow_mut();
            let before = tracks.len();
            tracks.retain(|t| !pred(t));
            before - tracks.len()
        };
        if removed > 0 {
            self.events.fire(EventKind::RemoveTrack);
        }
        removed
    }

    /// Set the mode of every track matching the predicate; fires a single
    /// `change` event if anything actually changed. Returns the number of
    /// tracks whose mode changed.
    pub fn set_mode<F: Fn(&TextTrack) -> bool>(&self, pred: F, mode: TextTrackMode) -> usize {
        let changed = {
            let tracks = self.tracks.borrow();
            let mut changed = 0;
            for track in tracks.iter() {
                if pred(track) && track.mode.get() != mode {
                    track.mode.set(mode);
                    changed += 1;
                }
            }
            changed
        };
        if changed > 0 {
            self.events.fire(EventKind::Change);
        }
        changed
    }

    /// Tracks currently in showing mode with a subtitle-ish kind
    pub fn showing_subtitles(&self) -> Vec<Rc<TextTrack>> {
        self.tracks
            .borrow()
            .iter()
            .filter(|t| t.kind.is_subtitles() && t.mode.get() == TextTrackMode::Showing)
            .cloned()
            .collect()
    }
}

impl Default for TextTrackList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextTrackList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextTrackList")
            .field("len", &self.len())
            .finish()
    }
}

/// Audio track
#[derive(Debug)]
pub struct AudioTrack {
    pub id: String,
    pub kind: String,
    pub label: String,
    pub language: String,
    enabled: Cell<bool>,
}

impl AudioTrack {
    pub fn new(id: &str, label: &str, language: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: "main".to_string(),
            label: label.to_string(),
            language: language.to_string(),
            enabled: Cell::new(false),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.get()
    }
}

/// Audio track list; at most one track is enabled at a time
pub struct AudioTrackList {
    events: EventTarget,
    tracks: RefCell<Vec<Rc<AudioTrack>>>,
}

impl AudioTrackList {
    pub fn new() -> Self {
        Self {
            events: EventTarget::new(),
            tracks: RefCell::new(Vec::new()),
        }
    }

    pub fn events(&self) -> &EventTarget {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.tracks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.borrow().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Rc<AudioTrack>> {
        self.tracks.borrow().clone()
    }

    pub fn add(&self, track: AudioTrack) -> Rc<AudioTrack> {
        let track = Rc::new(track);
        let first = self.tracks.borrow().is_empty();
        if first {
            track.enabled.set(true);
        }
        self.tracks.borrow_mut().push(Rc::clone(&track));
        self.events.fire(EventKind::AddTrack);
        track
    }

    /// Currently enabled track id, if any
    pub fn enabled_id(&self) -> Option<String> {
        self.tracks
            .borrow()
            .iter()
            .find(|t| t.enabled.get())
            .map(|t| t.id.clone())
    }

    /// Enable the track with the given id, disabling the rest. Returns false
    /// when no track matches.
    pub fn enable(&self, id: &str) -> bool {
        let changed = {
            let tracks = self.tracks.borrow();
            if !tracks.iter().any(|t| t.id == id) {
                return false;
            }
            let mut changed = false;
            for track in tracks.iter() {
                let want = track.id == id;
                if track.enabled.get() != want {
                    track.enabled.set(want);
                    changed = true;
                }
            }
            changed
        };
        if changed {
            self.events.fire(EventKind::Change);
        }
        true
    }
}

impl Default for AudioTrackList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AudioTrackList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioTrackList")
            .field("len", &self.len())
            .finish()
    }
}

/// Video rendition (one quality level)
#[derive(Debug, Clone, PartialEq)]
pub struct Rendition {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub bitrate: Option<f64>,
}

impl Rendition {
    pub fn new(id: &str, width: u32, height: u32) -> Self {
        Self {
            id: id.to_string(),
            width,
            height,
            bitrate: None,
        }
    }
}

/// Rendition list; `None` selection means automatic quality
pub struct RenditionList {
    events: EventTarget,
    renditions: RefCell<Vec<Rendition>>,
    selected: RefCell<Option<String>>,
}

impl RenditionList {
    pub fn new() -> Self {
        Self {
            events: EventTarget::new(),
            renditions: RefCell::new(Vec::new()),
            selected: RefCell::new(None),
        }
    }

    pub fn events(&self) -> &EventTarget {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.renditions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.renditions.borrow().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Rendition> {
        self.renditions.borrow().clone()
    }

    pub fn add(&self, rendition: Rendition) {
        self.renditions.borrow_mut().push(rendition);
        self.events.fire(EventKind::AddRendition);
    }

    pub fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut renditions = self.renditions.borrow_mut();
            let before = renditions.len();
            renditions.retain(|r| r.id != id);
            before != renditions.len()
        };
        if removed {
            if self.selected.borrow().as_deref() == Some(id) {
                *self.selected.borrow_mut() = None;
            }
            self.events.fire(EventKind::RemoveRendition);
        }
        removed
    }

    pub fn selected(&self) -> Option<String> {
        self.selected.borrow().clone()
    }

    /// Select a rendition by id, or `None` for automatic. Returns false when
    /// the id does not name a known rendition.
    pub fn select(&self, id: Option<&str>) -> bool {
        if let Some(id) = id {
            if !self.renditions.borrow().iter().any(|r| r.id == id) {
                return false;
            }
        }
        let changed = {
            let mut selected = self.selected.borrow_mut();
            let next = id.map(|s| s.to_string());
            let changed = *selected != next;
            *selected = next;
            changed
        };
        if changed {
            self.events.fire(EventKind::Change);
        }
        true
    }
}

impl Default for RenditionList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenditionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenditionList")
            .field("len", &self.len())
            .field("selected", &self.selected.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_text_track_cue_lookup() {
        let track = TextTrack::new(TextTrackKind::Chapters, "Chapters", "en");
        track.add_cue(TextCue {
            id: "1".into(),
            start_time: 0.0,
            end_time: 5.0,
            text: "Intro".into(),
        });
        track.add_cue(TextCue {
            id: "2".into(),
            start_time: 5.0,
            end_time: 10.0,
            text: "Middle".into(),
        });

        assert_eq!(track.cue_at(2.5).unwrap().text, "Intro");
        assert_eq!(track.cue_at(5.0).unwrap().text, "Middle");
        assert!(track.cue_at(10.0).is_none());
    }

    #[test]
    fn test_set_mode_fires_one_change() {
        let list = TextTrackList::new();
        list.add(TextTrack::new(TextTrackKind::Subtitles, "English", "en"));
        list.add(TextTrack::new(TextTrackKind::Subtitles, "Deutsch", "de"));

        let changes = Rc::new(Cell::new(0));
        let c = Rc::clone(&changes);
        list.events()
            .add_listener(EventKind::Change, Rc::new(move |_| c.set(c.get() + 1)));

        let changed = list.set_mode(|t| t.language == "en", TextTrackMode::Showing);
        assert_eq!(changed, 1);
        assert_eq!(changes.get(), 1);

        // Same mode again changes nothing and stays silent
        let changed = list.set_mode(|t| t.language == "en", TextTrackMode::Showing);
        assert_eq!(changed, 0);
        assert_eq!(changes.get(), 1);

        assert_eq!(list.showing_subtitles().len(), 1);
    }

    #[test]
    fn test_audio_track_exclusive_enable() {
        let list = AudioTrackList::new();
        list.add(AudioTrack::new("a", "Main", "en"));
        list.add(AudioTrack::new("b", "Commentary", "en"));

        // First added track is enabled by default
        assert_eq!(list.enabled_id().as_deref(), Some("a"));

        assert!(list.enable("b"));
        assert_eq!(list.enabled_id().as_deref(), Some("b"));
        assert!(!list.snapshot()[0].enabled());

        assert!(!list.enable("missing"));
    }

    #[test]
    fn test_rendition_selection() {
        let list = RenditionList::new();
        list.add(Rendition::new("720", 1280, 720));
        list.add(Rendition::new("1080", 1920, 1080));

        assert_eq!(list.selected(), None);
        assert!(list.select(Some("1080")));
        assert_eq!(list.selected().as_deref(), Some("1080"));
        assert!(!list.select(Some("4k")));

        assert!(list.remove("1080"));
        assert_eq!(list.selected(), None);
    }
}
