//! Track Utilities
//!
//! Subtitle selection, language preference ordering, and the cue parsing
//! used for preview thumbnails.

use std::rc::Rc;

use strand_media::{TextTrack, TextTrackKind, TextTrackList, TextTrackMode};

use crate::owners::StoreOptions;
use crate::prefs::{PreferenceStore, SUBTITLES_LANG_PREF_KEY};
use crate::value::StateValue;

/// Identifies a text track in request details and state values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSpec {
    pub kind: TextTrackKind,
    pub label: String,
    pub language: String,
}

impl TrackSpec {
    pub fn of(track: &TextTrack) -> Self {
        Self {
            kind: track.kind,
            label: track.label.clone(),
            language: track.language.clone(),
        }
    }

    /// Subtitles and captions are interchangeable; label and language must
    /// match exactly
    pub fn matches(&self, track: &TextTrack) -> bool {
        let kind_ok = if self.kind.is_subtitles() {
            track.kind.is_subtitles()
        } else {
            track.kind == self.kind
        };
        kind_ok && self.label == track.label && self.language == track.language
    }

    pub fn into_value(self) -> StateValue {
        StateValue::record([
            ("kind", StateValue::from(self.kind.as_str())),
            ("label", StateValue::from(self.label)),
            ("language", StateValue::from(self.language)),
        ])
    }

    /// Parse from a request-detail record; `None` when required fields are
    /// missing or mistyped
    pub fn from_value(value: &StateValue) -> Option<Self> {
        let record = value.as_record()?;
        let kind = match record.get("kind").and_then(|v| v.as_str()) {
            Some("subtitles") | None => TextTrackKind::Subtitles,
            Some("captions") => TextTrackKind::Captions,
            Some(_) => return None,
        };
        Some(Self {
            kind,
            label: record.get("label")?.as_str()?.to_string(),
            language: record.get("language")?.as_str()?.to_string(),
        })
    }
}

/// All subtitle/caption tracks as state records
pub fn subtitle_list_value(tracks: &TextTrackList) -> StateValue {
    StateValue::List(
        tracks
            .snapshot()
            .iter()
            .filter(|t| t.kind.is_subtitles())
            .map(|t| TrackSpec::of(t).into_value())
            .collect(),
    )
}

/// Currently showing subtitle/caption tracks as state records
pub fn showing_value(tracks: &TextTrackList) -> StateValue {
    StateValue::List(
        tracks
            .showing_subtitles()
            .iter()
            .map(|t| TrackSpec::of(t).into_value())
            .collect(),
    )
}

/// Show exactly the given tracks; every other subtitle/caption track is
/// disabled
pub fn show_tracks(tracks: &TextTrackList, specs: &[TrackSpec]) {
    tracks.set_mode(
        |t| t.kind.is_subtitles() && !specs.iter().any(|s| s.matches(t)),
        TextTrackMode::Disabled,
    );
    tracks.set_mode(
        |t| specs.iter().any(|s| s.matches(t)),
        TextTrackMode::Showing,
    );
}

/// Disable the given tracks, leaving the rest alone
pub fn disable_tracks(tracks: &TextTrackList, specs: &[TrackSpec]) {
    tracks.set_mode(
        |t| specs.iter().any(|s| s.matches(t)),
        TextTrackMode::Disabled,
    );
}

/// True when a track language satisfies a wanted language: exact match or
/// same primary subtag, case-insensitive
pub fn language_matches(track_lang: &str, wanted: &str) -> bool {
    if track_lang.is_empty() || wanted.is_empty() {
        return false;
    }
    let track = track_lang.to_ascii_lowercase();
    let want = wanted.to_ascii_lowercase();
    if track == want {
        return true;
    }
    let track_primary = track.split('-').next().unwrap_or(&track);
    let want_primary = want.split('-').next().unwrap_or(&want);
    track_primary == want_primary
}

/// Preferred subtitle languages, most preferred first: the stored
/// preference (unless opted out), the configured media language, then the
/// process locale.
pub fn preferred_languages(prefs: &PreferenceStore, options: &StoreOptions) -> Vec<String> {
    let mut langs = Vec::new();
    if !options.no_subtitles_lang_pref {
        if let Some(stored) = prefs.get(SUBTITLES_LANG_PREF_KEY) {
            langs.push(stored);
        }
    }
    if let Some(lang) = &options.media_lang {
        langs.push(lang.clone());
    }
    if let Some(locale) = locale_language() {
        langs.push(locale);
    }
    langs
}

/// Primary language from the `LANG` environment variable
/// (`en_US.UTF-8` -> `en-US`)
fn locale_language() -> Option<String> {
    let lang = std::env::var("LANG").ok()?;
    let base = lang.split('.').next()?.trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

/// First subtitle track matching the language preference list, falling back
/// to the first subtitle track
pub fn pick_default_subtitle(
    tracks: &TextTrackList,
    langs: &[String],
) -> Option<Rc<TextTrack>> {
    let candidates: Vec<Rc<TextTrack>> = tracks
        .snapshot()
        .into_iter()
        .filter(|t| t.kind.is_subtitles())
        .collect();
    for lang in langs {
        if let Some(track) = candidates
            .iter()
            .find(|t| language_matches(&t.language, lang))
        {
            return Some(Rc::clone(track));
        }
    }
    candidates.first().cloned()
}

/// Split a thumbnail cue into an image reference and optional
/// `#xywh=x,y,w,h` sprite coordinates
pub fn parse_image_cue(text: &str) -> (String, Option<[f64; 4]>) {
    let Some((url, fragment)) = text.split_once('#') else {
        return (text.to_string(), None);
    };
    let Some(raw) = fragment.strip_prefix("xywh=") else {
        return (url.to_string(), None);
    };
    let parts: Vec<f64> = raw.split(',').filter_map(|p| p.trim().parse().ok()).collect();
    if parts.len() == 4 {
        (url.to_string(), Some([parts[0], parts[1], parts[2], parts[3]]))
    } else {
        (url.to_string(), None)
    }
}
