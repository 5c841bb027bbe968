//! Playback state descriptors: paused, progress, duration, rate.

use strand_events::EventKind;

use crate::mediator::StateDescriptor;
use crate::owners::StateOwners;
use crate::state::StateKey;
use crate::value::StateValue;

pub(super) fn install(table: &mut Vec<StateDescriptor>) {
    table.push(
        StateDescriptor::reader(StateKey::MediaPaused, get_paused)
            .writer(set_paused)
            .on_media(&[
                EventKind::Play,
                EventKind::Playing,
                EventKind::Pause,
                EventKind::Emptied,
            ]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaHasPlayed, get_has_played)
            .on_media(&[EventKind::Playing, EventKind::Emptied]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaEnded, get_ended).on_media(&[
            EventKind::Seeked,
            EventKind::Ended,
            EventKind::Emptied,
        ]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaLoading, get_loading).on_media(&[
            EventKind::LoadStart,
            EventKind::Waiting,
            EventKind::CanPlay,
            EventKind::Playing,
            EventKind::Emptied,
        ]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaCurrentTime, get_current_time)
            .writer(set_current_time)
            .on_media(&[
                EventKind::TimeUpdate,
                EventKind::LoadedMetadata,
                EventKind::Seeking,
                EventKind::Seeked,
                EventKind::Emptied,
            ]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaDuration, get_duration).on_media(&[
            EventKind::DurationChange,
            EventKind::LoadedMetadata,
            EventKind::Emptied,
        ]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaSeekable, get_seekable).on_media(&[
            EventKind::LoadedMetadata,
            EventKind::Progress,
            EventKind::Emptied,
        ]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaBuffered, get_buffered)
            .on_media(&[EventKind::Progress, EventKind::Emptied]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaPlaybackRate, get_playback_rate)
            .writer(set_playback_rate)
            .on_media(&[EventKind::RateChange, EventKind::LoadedMetadata]),
    );
}

fn get_paused(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    owners
        .media
        .as_ref()
        .map(|m| m.paused())
        .unwrap_or(true)
        .into()
}

fn set_paused(value: &StateValue, owners: &StateOwners) {
    let Some(pause) = value.as_bool() else { return };
    let Some(media) = &owners.media else { return };
    if pause {
        media.pause();
    } else if let Err(err) = media.play() {
        tracing::warn!("play request failed: {err}");
    }
}

fn get_has_played(owners: &StateOwners, event: Option<&strand_events::Event>) -> StateValue {
    match event.map(|e| e.kind) {
        Some(EventKind::Playing) => true.into(),
        Some(EventKind::Emptied) => false.into(),
        _ => owners
            .media
            .as_ref()
            .map(|m| !m.paused())
            .unwrap_or(false)
            .into(),
    }
}

fn get_ended(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    owners
        .media
        .as_ref()
        .map(|m| m.ended())
        .unwrap_or(false)
        .into()
}

fn get_loading(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    owners
        .media
        .as_ref()
        .map(|m| m.ready_state() < strand_media::ReadyState::HaveFutureData && !m.paused())
        .unwrap_or(false)
        .into()
}

fn get_current_time(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    owners
        .media
        .as_ref()
        .map(|m| m.current_time())
        .unwrap_or(0.0)
        .into()
}

fn set_current_time(value: &StateValue, owners: &StateOwners) {
    let Some(time) = value.as_f64() else { return };
    let Some(media) = &owners.media else { return };
    media.set_current_time(time);
}

fn get_duration(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    let known = owners
        .media
        .as_ref()
        .map(|m| m.duration())
        .filter(|d| !d.is_nan());
    match known {
        Some(duration) => duration.into(),
        None => owners.options.default_duration.unwrap_or(f64::NAN).into(),
    }
}

fn get_seekable(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    let ranges = owners.media.as_ref().and_then(|m| m.seekable());
    match ranges {
        Some(ranges) if ranges.length() > 0 => StateValue::List(vec![
            ranges.first_start().unwrap_or(0.0).into(),
            ranges.last_end().unwrap_or(0.0).into(),
        ]),
        _ => StateValue::Null,
    }
}

fn get_buffered(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    let Some(media) = &owners.media else {
        return StateValue::List(Vec::new());
    };
    let buffered = media.buffered();
    StateValue::List(
        (0..buffered.length())
            .map(|i| {
                StateValue::List(vec![
                    buffered.start(i).unwrap_or(0.0).into(),
                    buffered.end(i).unwrap_or(0.0).into(),
                ])
            })
            .collect(),
    )
}

fn get_playback_rate(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    owners
        .media
        .as_ref()
        .map(|m| m.playback_rate())
        .unwrap_or(1.0)
        .into()
}

fn set_playback_rate(value: &StateValue, owners: &StateOwners) {
    let Some(rate) = value.as_f64() else { return };
    let Some(media) = &owners.media else { return };
    media.set_playback_rate(rate);
}
