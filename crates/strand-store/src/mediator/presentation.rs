//! Display-surface descriptors: fullscreen, picture-in-picture, cast, airplay.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use strand_events::{Event, EventKind, ListenerId};
use strand_media::{MediaApi, PresentationMode, ReadyState};

use crate::mediator::{StateDescriptor, StateSink, Teardown};
use crate::owners::StateOwners;
use crate::state::{Availability, StateKey};
use crate::value::StateValue;

/// How long to wait for metadata before giving up on a deferred
/// picture-in-picture request.
const PIP_METADATA_TIMEOUT: Duration = Duration::from_millis(1000);

pub(super) fn install(table: &mut Vec<StateDescriptor>) {
    table.push(
        StateDescriptor::reader(StateKey::MediaIsFullscreen, get_is_fullscreen)
            .writer(set_fullscreen)
            .on_media(&[EventKind::PresentationModeChange])
            .on_root(&[EventKind::FullscreenChange]),
    );
    table.push(StateDescriptor::reader(
        StateKey::MediaFullscreenUnavailable,
        get_fullscreen_unavailable,
    ));
    table.push(
        StateDescriptor::reader(StateKey::MediaIsPip, get_is_pip)
            .writer(set_pip)
            .on_media(&[
                EventKind::EnterPictureInPicture,
                EventKind::LeavePictureInPicture,
                EventKind::PresentationModeChange,
            ])
            .on_owner_change(watch_deferred_pip),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaPipUnavailable, get_pip_unavailable)
            .on_media(&[EventKind::LoadStart]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaIsCasting, get_is_casting)
            .writer(set_casting)
            .on_remote(&[
                EventKind::Connect,
                EventKind::Connecting,
                EventKind::Disconnect,
            ]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaCastUnavailable, get_cast_unavailable)
            .on_owner_change(watch_cast_availability),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaAirplayUnavailable, get_airplay_unavailable)
            .on_media(&[EventKind::TargetAvailabilityChange]),
    );
}

fn get_is_fullscreen(owners: &StateOwners, event: Option<&Event>) -> StateValue {
    let Some(media) = &owners.media else {
        return false.into();
    };
    // iOS-style elements expose a presentation mode instead of a root slot
    if let Some(presentation) = media.presentation() {
        return presentation.displaying_fullscreen().into();
    }
    let Some(root) = &owners.root else {
        return false.into();
    };
    let Some(current) = root.fullscreen_element() else {
        return false.into();
    };
    let Some(target) = owners.fullscreen_target_id() else {
        return false.into();
    };
    // A fullscreenchange event carries the element that changed, which can be
    // deeper than what the root reports across shadow boundaries.
    let element = match event {
        Some(e) if e.kind == EventKind::FullscreenChange => e
            .target
            .filter(|t| *t != root.events().id())
            .unwrap_or(current),
        _ => current,
    };
    (element == target || root.contains_through_hosts(element, target)).into()
}

fn set_fullscreen(value: &StateValue, owners: &StateOwners) {
    let Some(enter) = value.as_bool() else { return };
    let Some(media) = &owners.media else { return };
    if let Some(presentation) = media.presentation() {
        presentation.set_mode(if enter {
            PresentationMode::Fullscreen
        } else {
            PresentationMode::Inline
        });
        return;
    }
    let Some(root) = &owners.root else {
        tracing::warn!("fullscreen is not enabled");
        return;
    };
    if enter {
        if let Some(target) = owners.fullscreen_target_id() {
            root.request_fullscreen(target);
        }
    } else {
        root.exit_fullscreen();
    }
}

fn get_fullscreen_unavailable(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    if owners.platform.fullscreen {
        return StateValue::Null;
    }
    // A presentation surface works even where element fullscreen does not
    let has_presentation = owners
        .media
        .as_ref()
        .is_some_and(|m| m.presentation().is_some());
    if has_presentation {
        StateValue::Null
    } else {
        Availability::Unsupported.into_value()
    }
}

fn get_is_pip(owners: &StateOwners, event: Option<&Event>) -> StateValue {
    match event.map(|e| e.kind) {
        Some(EventKind::EnterPictureInPicture) => return true.into(),
        Some(EventKind::LeavePictureInPicture) => return false.into(),
        _ => {}
    }
    let Some(media) = &owners.media else {
        return false.into();
    };
    if let Some(presentation) = media.presentation() {
        if presentation.mode() == PresentationMode::PictureInPicture {
            return true.into();
        }
    }
    owners
        .root
        .as_ref()
        .is_some_and(|root| root.pip_element() == Some(media.id()))
        .into()
}

fn set_pip(value: &StateValue, owners: &StateOwners) {
    let Some(enter) = value.as_bool() else { return };
    let Some(media) = owners.media.clone() else { return };
    if !enter {
        if let Some(root) = &owners.root {
            root.exit_pip(&*media);
        } else if let Some(presentation) = media.presentation() {
            presentation.set_mode(PresentationMode::Inline);
        }
        return;
    }
    if media.pip_disabled() {
        tracing::warn!("picture-in-picture is disabled for this media");
        return;
    }
    let Some(root) = owners.root.clone() else {
        if let Some(presentation) = media.presentation() {
            presentation.set_mode(PresentationMode::PictureInPicture);
        } else {
            tracing::warn!("picture-in-picture is not enabled");
        }
        return;
    };
    if media.ready_state() == ReadyState::HaveNothing {
        defer_pip_until_metadata(media, root);
    } else {
        root.enter_pip(&*media);
    }
}

/// A deferred picture-in-picture request waiting for metadata. At most one
/// exists at a time; a newer request or an owner change cancels it.
struct DeferredPip {
    media: Weak<dyn MediaApi>,
    listener: ListenerId,
    restore_preload: strand_media::PreloadHint,
}

thread_local! {
    static DEFERRED_PIP: RefCell<Option<DeferredPip>> = const { RefCell::new(None) };
}

fn cancel_deferred_pip() {
    let Some(pending) = DEFERRED_PIP.with(|slot| slot.borrow_mut().take()) else {
        return;
    };
    if let Some(media) = pending.media.upgrade() {
        media.events().remove_listener(pending.listener);
        media.set_preload(pending.restore_preload);
    }
}

/// Nothing is loaded yet, so nudge the load along and enter
/// picture-in-picture once metadata arrives, bounded by
/// [`PIP_METADATA_TIMEOUT`]. The listener only holds weak references, and
/// [`watch_deferred_pip`] removes it again if the owners change first.
fn defer_pip_until_metadata(media: Rc<dyn MediaApi>, root: Rc<strand_media::RootNode>) {
    cancel_deferred_pip();
    let previous_preload = media.preload();
    media.set_preload(strand_media::PreloadHint::Metadata);
    let deadline = Instant::now() + PIP_METADATA_TIMEOUT;

    let listener = {
        let media = Rc::downgrade(&media);
        let root = Rc::downgrade(&root);
        move |_: &Event| {
            let pending = DEFERRED_PIP.with(|slot| slot.borrow_mut().take());
            let Some(media) = media.upgrade() else { return };
            if let Some(pending) = pending {
                media.events().remove_listener(pending.listener);
            }
            media.set_preload(previous_preload);
            if Instant::now() > deadline {
                tracing::warn!("timed out waiting for metadata; not entering picture-in-picture");
                return;
            }
            if let Some(root) = root.upgrade() {
                root.enter_pip(&*media);
            }
        }
    };
    let id = media
        .events()
        .add_listener(EventKind::LoadedMetadata, Rc::new(listener));
    DEFERRED_PIP.with(|slot| {
        *slot.borrow_mut() = Some(DeferredPip {
            media: Rc::downgrade(&media),
            listener: id,
            restore_preload: previous_preload,
        });
    });
}

fn watch_deferred_pip(owners: &StateOwners, _sink: &StateSink) -> Option<Teardown> {
    owners.media.as_ref()?;
    Some(Box::new(cancel_deferred_pip))
}

fn get_pip_unavailable(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    if !owners.platform.pip {
        return Availability::Unsupported.into_value();
    }
    match &owners.media {
        Some(media) if media.pip_disabled() => Availability::Unavailable.into_value(),
        _ => StateValue::Null,
    }
}

fn get_is_casting(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    owners
        .media
        .as_ref()
        .and_then(|m| m.remote())
        .is_some_and(|r| r.state() != strand_media::RemoteState::Disconnected)
        .into()
}

fn set_casting(value: &StateValue, owners: &StateOwners) {
    let Some(cast) = value.as_bool() else { return };
    let Some(remote) = owners.media.as_ref().and_then(|m| m.remote()) else {
        tracing::warn!("casting is not enabled");
        return;
    };
    let connected = remote.state() != strand_media::RemoteState::Disconnected;
    // prompt() toggles, so only call it when the request changes the state
    if cast != connected {
        if let Err(err) = remote.prompt() {
            tracing::warn!("cast prompt failed: {err}");
        }
    }
}

fn get_cast_unavailable(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    if !owners.platform.cast {
        return Availability::Unsupported.into_value();
    }
    let Some(remote) = owners.media.as_ref().and_then(|m| m.remote()) else {
        return Availability::Unsupported.into_value();
    };
    if remote.availability() {
        StateValue::Null
    } else {
        Availability::Unavailable.into_value()
    }
}

fn watch_cast_availability(owners: &StateOwners, sink: &StateSink) -> Option<Teardown> {
    if !owners.platform.cast {
        return None;
    }
    let remote = owners.media.as_ref()?.remote()?;
    let watch = remote.watch_availability({
        let sink = sink.clone();
        Rc::new(move |available| {
            sink.push(if available {
                StateValue::Null
            } else {
                Availability::Unavailable.into_value()
            });
        })
    });
    Some(Box::new(move || {
        remote.cancel_watch(watch);
    }))
}

fn get_airplay_unavailable(owners: &StateOwners, _event: Option<&Event>) -> StateValue {
    if !owners.platform.airplay {
        return Availability::Unsupported.into_value();
    }
    let Some(presentation) = owners.media.as_ref().and_then(|m| m.presentation()) else {
        return Availability::Unsupported.into_value();
    };
    if presentation.wireless_target_available() {
        StateValue::Null
    } else {
        Availability::Unavailable.into_value()
    }
}
