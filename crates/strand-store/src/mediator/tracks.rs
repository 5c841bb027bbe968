//! Track descriptors: subtitles, chapters, renditions, audio tracks.

use std::cell::Cell;
use std::rc::Rc;

use strand_events::{Event, EventKind, ListenerId};
use strand_media::TextTrackKind;

use crate::mediator::{StateDescriptor, StateSink, Teardown};
use crate::owners::StateOwners;
use crate::state::{Availability, StateKey};
use crate::track_utils::{
    pick_default_subtitle, preferred_languages, show_tracks, showing_value, subtitle_list_value,
    TrackSpec,
};
use crate::value::StateValue;

pub(super) fn install(table: &mut Vec<StateDescriptor>) {
    table.push(
        StateDescriptor::reader(StateKey::MediaSubtitlesList, get_subtitles_list)
            .on_text_tracks(&[EventKind::AddTrack, EventKind::RemoveTrack]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaSubtitlesShowing, get_subtitles_showing)
            .writer(set_subtitles_showing)
            .on_text_tracks(&[
                EventKind::AddTrack,
                EventKind::RemoveTrack,
                EventKind::Change,
            ])
            .on_owner_change(watch_default_subtitles),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaChaptersCues, get_chapters_cues)
            .on_media(&[EventKind::LoadStart])
            .on_text_tracks(&[
                EventKind::AddTrack,
                EventKind::RemoveTrack,
                EventKind::Change,
            ]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaRenditionList, get_rendition_list)
            .on_renditions(&[EventKind::AddRendition, EventKind::RemoveRendition]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaRenditionSelected, get_rendition_selected)
            .writer(set_rendition_selected)
            .on_renditions(&[EventKind::Change]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaRenditionUnavailable, get_rendition_unavailable)
            .on_renditions(&[EventKind::AddRendition, EventKind::RemoveRendition]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaAudioTrackList, get_audio_track_list)
            .on_audio_tracks(&[EventKind::AddTrack, EventKind::RemoveTrack]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaAudioTrackEnabled, get_audio_track_enabled)
            .writer(set_audio_track_enabled)
            .on_audio_tracks(&[EventKind::Change]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaAudioTrackUnavailable, get_audio_track_unavailable)
            .on_audio_tracks(&[EventKind::AddTrack, EventKind::RemoveTrack]),
    );
}

fn get_subtitles_list(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    match owners.media.as_ref().and_then(|m| m.text_tracks()) {
        Some(tracks) => subtitle_list_value(&tracks),
        None => StateValue::List(Vec::new()),
    }
}

fn get_subtitles_showing(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    match owners.media.as_ref().and_then(|m| m.text_tracks()) {
        Some(tracks) => showing_value(&tracks),
        None => StateValue::List(Vec::new()),
    }
}

fn set_subtitles_showing(value: &StateValue, owners: &StateOwners) {
    let Some(items) = value.as_list() else { return };
    let Some(tracks) = owners.media.as_ref().and_then(|m| m.text_tracks()) else {
        return;
    };
    let specs: Vec<TrackSpec> = items.iter().filter_map(TrackSpec::from_value).collect();
    show_tracks(&tracks, &specs);
}

fn get_chapters_cues(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    let Some(tracks) = owners.media.as_ref().and_then(|m| m.text_tracks()) else {
        return StateValue::List(Vec::new());
    };
    let chapters = tracks
        .snapshot()
        .into_iter()
        .find(|t| t.kind == TextTrackKind::Chapters);
    let Some(chapters) = chapters else {
        return StateValue::List(Vec::new());
    };
    StateValue::List(
        chapters
            .cues()
            .into_iter()
            .map(|cue| {
                StateValue::record([
                    ("startTime", cue.start_time.into()),
                    ("endTime", cue.end_time.into()),
                    ("text", cue.text.as_str().into()),
                ])
            })
            .collect(),
    )
}

/// With `default_subtitles` on, pick and show a subtitle track for the
/// current preferred languages as soon as one is available. The add-track
/// watcher removes itself after the first successful selection.
fn watch_default_subtitles(owners: &StateOwners, _sink: &StateSink) -> Option<Teardown> {
    if !owners.options.default_subtitles {
        return None;
    }
    let media = Rc::clone(owners.media.as_ref()?);
    let tracks = media.text_tracks()?;
    let langs = preferred_languages(&owners.prefs, &owners.options);

    let try_select: Rc<dyn Fn() -> bool> = {
        let tracks = Rc::downgrade(&tracks);
        Rc::new(move || {
            let Some(tracks) = tracks.upgrade() else {
                return true;
            };
            if !tracks.showing_subtitles().is_empty() {
                return true;
            }
            match pick_default_subtitle(&tracks, &langs) {
                Some(track) => {
                    show_tracks(&tracks, &[TrackSpec::of(&track)]);
                    true
                }
                None => false,
            }
        })
    };

    let watcher_slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
    let install_watcher: Rc<dyn Fn()> = {
        let tracks = Rc::downgrade(&tracks);
        let slot = Rc::clone(&watcher_slot);
        let try_select = Rc::clone(&try_select);
        Rc::new(move || {
            if slot.get().is_some() {
                return;
            }
            let Some(tracks) = tracks.upgrade() else { return };
            let id = tracks.events().add_listener(EventKind::AddTrack, {
                let tracks = Rc::downgrade(&tracks);
                let slot = Rc::clone(&slot);
                let try_select = Rc::clone(&try_select);
                Rc::new(move |_| {
                    if try_select() {
                        if let (Some(tracks), Some(id)) = (tracks.upgrade(), slot.take()) {
                            tracks.events().remove_listener(id);
                        }
                    }
                })
            });
            slot.set(Some(id));
        })
    };

    if !try_select() {
        install_watcher();
    }

    // each new load starts from no selection
    let load_listener = media.events().add_listener(EventKind::LoadStart, {
        let try_select = Rc::clone(&try_select);
        let install_watcher = Rc::clone(&install_watcher);
        Rc::new(move |_| {
            if !try_select() {
                install_watcher();
            }
        })
    });

    Some(Box::new(move || {
        media.events().remove_listener(load_listener);
        if let Some(id) = watcher_slot.take() {
            tracks.events().remove_listener(id);
        }
    }))
}

fn get_rendition_list(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    let Some(renditions) = owners.media.as_ref().and_then(|m| m.video_renditions()) else {
        return StateValue::List(Vec::new());
    };
    StateValue::List(
        renditions
            .snapshot()
            .into_iter()
            .map(|r| {
                StateValue::record([
                    ("id", r.id.as_str().into()),
                    ("width", f64::from(r.width).into()),
                    ("height", f64::from(r.height).into()),
                    ("bitrate", r.bitrate.into()),
                ])
            })
            .collect(),
    )
}

fn get_rendition_selected(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    owners
        .media
        .as_ref()
        .and_then(|m| m.video_renditions())
        .and_then(|r| r.selected())
        .into()
}

fn set_rendition_selected(value: &StateValue, owners: &StateOwners) {
    let Some(renditions) = owners.media.as_ref().and_then(|m| m.video_renditions()) else {
        tracing::warn!("rendition selection is not supported by this media");
        return;
    };
    match value.as_str() {
        Some(id) => {
            if !renditions.select(Some(id)) {
                tracing::warn!(rendition = id, "rendition not found");
            }
        }
        None => {
            renditions.select(None);
        }
    }
}

fn get_rendition_unavailable(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    match owners.media.as_ref().and_then(|m| m.video_renditions()) {
        None => Availability::Unsupported.into_value(),
        Some(renditions) if renditions.len() < 2 => Availability::Unavailable.into_value(),
        Some(_) => StateValue::Null,
    }
}

fn get_audio_track_list(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    let Some(tracks) = owners.media.as_ref().and_then(|m| m.audio_tracks()) else {
        return StateValue::List(Vec::new());
    };
    StateValue::List(
        tracks
            .snapshot()
            .into_iter()
            .map(|t| {
                StateValue::record([
                    ("id", t.id.as_str().into()),
                    ("kind", t.kind.as_str().into()),
                    ("label", t.label.as_str().into()),
                    ("language", t.language.as_str().into()),
                    ("enabled", t.enabled().into()),
                ])
            })
            .collect(),
    )
}

fn get_audio_track_enabled(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    owners
        .media
        .as_ref()
        .and_then(|m| m.audio_tracks())
        .and_then(|t| t.enabled_id())
        .into()
}

fn set_audio_track_enabled(value: &StateValue, owners: &StateOwners) {
    let Some(id) = value.as_str() else { return };
    let Some(tracks) = owners.media.as_ref().and_then(|m| m.audio_tracks()) else {
        tracing::warn!("audio track selection is not supported by this media");
        return;
    };
    if !tracks.enable(id) {
        tracing::warn!(track = id, "audio track not found");
    }
}

fn get_audio_track_unavailable(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    match owners.media.as_ref().and_then(|m| m.audio_tracks()) {
        None => Availability::Unsupported.into_value(),
        Some(tracks) if tracks.len() < 2 => Availability::Unavailable.into_value(),
        Some(_) => StateValue::Null,
    }
}
