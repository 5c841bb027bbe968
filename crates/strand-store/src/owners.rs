//! State Owners
//!
//! The mutable record of external objects the store mediates, plus the
//! options record and the platform capability probe results.

use std::rc::Rc;

use strand_events::TargetId;
use strand_media::{MediaApi, RootNode, StreamType};

use crate::prefs::PreferenceStore;

/// Pre-computed platform capability probes consulted by the availability
/// getters. Defaults to everything supported.
#[derive(Debug, Clone, Copy)]
pub struct Platform {
    pub fullscreen: bool,
    pub pip: bool,
    pub cast: bool,
    pub airplay: bool,
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            fullscreen: true,
            pip: true,
            cast: true,
            airplay: true,
        }
    }
}

/// Store configuration.
///
/// Mutated in place by options-change requests; read lazily the next time a
/// getter runs, never itself triggering a recompute.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Turn on a matching subtitle track as soon as one is available
    pub default_subtitles: bool,
    /// Stream type to assume when the media cannot tell
    pub default_stream_type: Option<StreamType>,
    /// Duration to report while the media has none
    pub default_duration: Option<f64>,
    /// Distance from the seekable end still considered "at the live edge"
    pub live_edge_offset: f64,
    /// Seek target distance from the seekable end; defaults to
    /// `live_edge_offset`
    pub seek_to_live_offset: Option<f64>,
    /// Do not snap to the live edge when resuming a live stream
    pub no_auto_seek_to_live: bool,
    pub no_volume_pref: bool,
    pub no_muted_pref: bool,
    pub no_subtitles_lang_pref: bool,
    /// Language of the surrounding UI, used for subtitle selection
    pub media_lang: Option<String>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            default_subtitles: false,
            default_stream_type: None,
            default_duration: None,
            live_edge_offset: 10.0,
            seek_to_live_offset: None,
            no_auto_seek_to_live: false,
            no_volume_pref: false,
            no_muted_pref: false,
            no_subtitles_lang_pref: false,
            media_lang: None,
        }
    }
}

impl StoreOptions {
    pub fn seek_to_live_offset(&self) -> f64 {
        self.seek_to_live_offset.unwrap_or(self.live_edge_offset)
    }
}

/// Partial options update; `Some` fields overwrite, `None` fields keep
#[derive(Debug, Clone, Default)]
pub struct OptionsPatch {
    pub default_subtitles: Option<bool>,
    pub default_stream_type: Option<Option<StreamType>>,
    pub default_duration: Option<Option<f64>>,
    pub live_edge_offset: Option<f64>,
    pub seek_to_live_offset: Option<Option<f64>>,
    pub no_auto_seek_to_live: Option<bool>,
    pub no_volume_pref: Option<bool>,
    pub no_muted_pref: Option<bool>,
    pub no_subtitles_lang_pref: Option<bool>,
    pub media_lang: Option<Option<String>>,
}

impl OptionsPatch {
    pub fn apply(&self, options: &mut StoreOptions) {
        if let Some(v) = self.default_subtitles {
            options.default_subtitles = v;
        }
        if let Some(v) = self.default_stream_type {
            options.default_stream_type = v;
        }
        if let Some(v) = self.default_duration {
            options.default_duration = v;
        }
        if let Some(v) = self.live_edge_offset {
            options.live_edge_offset = v;
        }
        if let Some(v) = self.seek_to_live_offset {
            options.seek_to_live_offset = v;
        }
        if let Some(v) = self.no_auto_seek_to_live {
            options.no_auto_seek_to_live = v;
        }
        if let Some(v) = self.no_volume_pref {
            options.no_volume_pref = v;
        }
        if let Some(v) = self.no_muted_pref {
            options.no_muted_pref = v;
        }
        if let Some(v) = self.no_subtitles_lang_pref {
            options.no_subtitles_lang_pref = v;
        }
        if let Some(v) = &self.media_lang {
            options.media_lang = v.clone();
        }
    }
}

/// The external objects that are sources of truth for media state.
///
/// Owned by the store; fields are swapped over time through structural
/// requests. Every getter must tolerate every field being absent.
#[derive(Clone)]
pub struct StateOwners {
    pub media: Option<Rc<dyn MediaApi>>,
    pub root: Option<Rc<RootNode>>,
    /// Fullscreen target element; defaults to the media element when unset
    pub fullscreen_target: Option<TargetId>,
    pub options: StoreOptions,
    pub platform: Platform,
    pub prefs: Rc<PreferenceStore>,
}

impl Default for StateOwners {
    fn default() -> Self {
        Self {
            media: None,
            root: None,
            fullscreen_target: None,
            options: StoreOptions::default(),
            platform: Platform::default(),
            prefs: Rc::new(PreferenceStore::memory()),
        }
    }
}

impl StateOwners {
    /// The element fullscreen checks compare against
    pub fn fullscreen_target_id(&self) -> Option<TargetId> {
        self.fullscreen_target
            .or_else(|| self.media.as_ref().map(|m| m.id()))
    }
}

impl std::fmt::Debug for StateOwners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateOwners")
            .field("media", &self.media.as_ref().map(|m| m.id()))
            .field("root", &self.root.is_some())
            .field("fullscreen_target", &self.fullscreen_target)
            .field("options", &self.options)
            .finish()
    }
}
