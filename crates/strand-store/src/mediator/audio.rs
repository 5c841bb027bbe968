//! Volume and mute descriptors, including the volume-support probe and
//! preference restore on media attach.

use std::cell::Cell;
use std::rc::Rc;

use strand_events::EventKind;
use strand_media::MediaApi;

use crate::mediator::{StateDescriptor, StateSink, Teardown};
use crate::owners::StateOwners;
use crate::prefs::{MUTED_PREF_KEY, VOLUME_PREF_KEY};
use crate::state::{Availability, StateKey, VolumeLevel};
use crate::value::StateValue;

pub(super) fn install(table: &mut Vec<StateDescriptor>) {
    table.push(
        StateDescriptor::reader(StateKey::MediaMuted, get_muted)
            .writer(set_muted)
            .on_media(&[EventKind::VolumeChange])
            .on_owner_change(restore_muted_pref),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaVolume, get_volume)
            .writer(set_volume)
            .on_media(&[EventKind::VolumeChange])
            .on_owner_change(restore_volume_pref),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaVolumeLevel, get_volume_level)
            .on_media(&[EventKind::VolumeChange]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaVolumeUnavailable, get_volume_unavailable)
            .on_owner_change(probe_volume_support),
    );
}

fn get_muted(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    owners
        .media
        .as_ref()
        .map(|m| m.muted())
        .unwrap_or(false)
        .into()
}

fn set_muted(value: &StateValue, owners: &StateOwners) {
    let Some(muted) = value.as_bool() else { return };
    let Some(media) = &owners.media else { return };
    media.set_muted(muted);
    // Persist the choice unless preferences are disabled or the element is
    // muted by default (autoplay setups should not pin the user to muted).
    if owners.options.no_muted_pref || media.default_muted() {
        return;
    }
    owners
        .prefs
        .set(MUTED_PREF_KEY, if muted { "true" } else { "false" });
}

fn restore_muted_pref(owners: &StateOwners, _sink: &StateSink) -> Option<Teardown> {
    if owners.options.no_muted_pref {
        return None;
    }
    let media = owners.media.as_ref()?;
    if media.default_muted() {
        return None;
    }
    if let Some(stored) = owners.prefs.get(MUTED_PREF_KEY) {
        media.set_muted(stored == "true");
    }
    None
}

fn get_volume(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    owners
        .media
        .as_ref()
        .map(|m| m.volume())
        .unwrap_or(1.0)
        .into()
}

fn set_volume(value: &StateValue, owners: &StateOwners) {
    let Some(volume) = value.as_f64() else { return };
    let Some(media) = &owners.media else { return };
    let volume = volume.clamp(0.0, 1.0);
    media.set_volume(volume);
    if owners.options.no_volume_pref {
        return;
    }
    owners.prefs.set(VOLUME_PREF_KEY, &volume.to_string());
}

fn restore_volume_pref(owners: &StateOwners, _sink: &StateSink) -> Option<Teardown> {
    if owners.options.no_volume_pref {
        return None;
    }
    let media = owners.media.as_ref()?;
    if let Some(volume) = owners.prefs.get(VOLUME_PREF_KEY).and_then(|v| v.parse::<f64>().ok()) {
        media.set_volume(volume.clamp(0.0, 1.0));
    }
    None
}

fn get_volume_level(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    let level = match &owners.media {
        Some(media) => VolumeLevel::from_volume(media.muted(), media.volume()),
        None => VolumeLevel::High,
    };
    level.as_str().into()
}

thread_local! {
    // Result of the one-shot volume probe. iOS-style elements report volume
    // assignments back unchanged, so the answer holds for the whole session.
    static VOLUME_SETTABLE: Cell<Option<bool>> = const { Cell::new(None) };
}

fn get_volume_unavailable(
    _owners: &StateOwners,
    _event: Option<&strand_events::Event>,
) -> StateValue {
    match VOLUME_SETTABLE.with(Cell::get) {
        Some(false) => Availability::Unsupported.into_value(),
        _ => StateValue::Null,
    }
}

fn probe_volume_support(owners: &StateOwners, sink: &StateSink) -> Option<Teardown> {
    let media = owners.media.as_ref()?;
    if VOLUME_SETTABLE.with(Cell::get).is_none() {
        let settable = volume_is_settable(Rc::clone(media));
        VOLUME_SETTABLE.with(|cell| cell.set(Some(settable)));
    }
    sink.push(get_volume_unavailable(owners, None));
    None
}

/// Nudge the volume and see whether the assignment sticks, restoring the
/// original value either way.
fn volume_is_settable(media: Rc<dyn MediaApi>) -> bool {
    let original = media.volume();
    let test = if original < 0.5 {
        original + 0.1
    } else {
        original - 0.1
    };
    media.set_volume(test);
    let settable = (media.volume() - test).abs() < 1e-9;
    media.set_volume(original);
    settable
}

#[cfg(test)]
pub(crate) fn reset_volume_probe() {
    VOLUME_SETTABLE.with(|cell| cell.set(None));
}
