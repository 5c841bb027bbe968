//! Edge case tests - absent owners, preference persistence, odd media.

use std::rc::Rc;

use strand_media::{MediaApi, MediaElement};
use strand_store::{
    MediaRequest, MediaStore, StateKey, StateOwners, StateValue, VolumeLevel,
};

// ============================================================================
// ABSENT OWNERS
// ============================================================================

#[test]
fn test_empty_store_has_total_defaults() {
    let store = MediaStore::new(StateOwners::default());
    let state = store.state();

    assert!(state.is_true(StateKey::MediaPaused));
    assert!(!state.is_true(StateKey::MediaHasPlayed));
    assert_eq!(state.number(StateKey::MediaCurrentTime), Some(0.0));
    assert!(state.number(StateKey::MediaDuration).unwrap().is_nan());
    assert_eq!(state.number(StateKey::MediaVolume), Some(1.0));
    assert_eq!(state.text(StateKey::MediaVolumeLevel), Some("high"));
    assert!(state.get(StateKey::MediaStreamType).is_null());
    assert!(state.get(StateKey::MediaSeekable).is_null());
    assert_eq!(
        state.get(StateKey::MediaSubtitlesList),
        &StateValue::List(Vec::new())
    );
    assert_eq!(
        state.text(StateKey::MediaRenditionUnavailable),
        Some("unsupported")
    );
}

#[test]
fn test_every_request_is_safe_without_owners() {
    let store = MediaStore::new(StateOwners::default());

    store.dispatch(MediaRequest::Play);
    store.dispatch(MediaRequest::Pause);
    store.dispatch(MediaRequest::Seek(10.0));
    store.dispatch(MediaRequest::SeekToLive);
    store.dispatch(MediaRequest::Volume(0.5));
    store.dispatch(MediaRequest::Mute);
    store.dispatch(MediaRequest::Unmute);
    store.dispatch(MediaRequest::PlaybackRate(2.0));
    store.dispatch(MediaRequest::EnterFullscreen);
    store.dispatch(MediaRequest::ExitFullscreen);
    store.dispatch(MediaRequest::EnterPip);
    store.dispatch(MediaRequest::ExitPip);
    store.dispatch(MediaRequest::EnterCast);
    store.dispatch(MediaRequest::ExitCast);
    store.dispatch(MediaRequest::EnterAirplay);
    store.dispatch(MediaRequest::ToggleSubtitles(None));
    store.dispatch(MediaRequest::Rendition(Some("hd".to_string())));
    store.dispatch(MediaRequest::AudioTrack("main".to_string()));
    store.dispatch(MediaRequest::Preview(Some(1.0)));
    store.dispatch(MediaRequest::Preview(None));

    // the store is still consistent
    assert!(store.state().is_true(StateKey::MediaPaused));
}

// ============================================================================
// PREFERENCES
// ============================================================================

#[test]
fn test_volume_pref_survives_media_swap() {
    let media = Rc::new(MediaElement::new());
    let store = MediaStore::new(StateOwners {
        media: Some(Rc::clone(&media) as Rc<dyn MediaApi>),
        ..Default::default()
    });
    store.dispatch(MediaRequest::Volume(0.3));
    assert_eq!(store.state().number(StateKey::MediaVolume), Some(0.3));

    // the stored preference is applied to the replacement element
    let replacement = Rc::new(MediaElement::new());
    store.dispatch(MediaRequest::MediaElementChange(Some(
        Rc::clone(&replacement) as Rc<dyn MediaApi>,
    )));
    assert_eq!(replacement.volume(), 0.3);
    assert_eq!(store.state().number(StateKey::MediaVolume), Some(0.3));
}

#[test]
fn test_muted_pref_restored_on_attach() {
    let owners = StateOwners::default();
    let prefs = Rc::clone(&owners.prefs);
    let store = MediaStore::new(owners);
    prefs.set("media-chrome-pref-muted", "true");

    let media = Rc::new(MediaElement::new());
    store.dispatch(MediaRequest::MediaElementChange(Some(
        Rc::clone(&media) as Rc<dyn MediaApi>,
    )));
    assert!(media.muted());
    assert!(store.state().is_true(StateKey::MediaMuted));
}

// ============================================================================
// ODD MEDIA
// ============================================================================

#[test]
fn test_volume_clamped_to_unit_range() {
    let media = Rc::new(MediaElement::new());
    let store = MediaStore::new(StateOwners {
        media: Some(Rc::clone(&media) as Rc<dyn MediaApi>),
        ..Default::default()
    });

    store.dispatch(MediaRequest::Volume(7.5));
    assert_eq!(store.state().number(StateKey::MediaVolume), Some(1.0));

    store.dispatch(MediaRequest::Volume(-2.0));
    assert_eq!(store.state().number(StateKey::MediaVolume), Some(0.0));
    assert_eq!(
        store.state().text(StateKey::MediaVolumeLevel),
        Some(VolumeLevel::Off.as_str())
    );
}

#[test]
fn test_blocked_play_keeps_paused_state() {
    let media = Rc::new(MediaElement::new());
    media.set_play_blocked(true);
    media.finish_load(30.0);
    media.make_ready();
    let store = MediaStore::new(StateOwners {
        media: Some(Rc::clone(&media) as Rc<dyn MediaApi>),
        ..Default::default()
    });

    store.dispatch(MediaRequest::Play);
    assert!(store.state().is_true(StateKey::MediaPaused));
    assert!(!store.state().is_true(StateKey::MediaHasPlayed));
}

#[test]
fn test_casting_without_remote_is_inert() {
    let media = Rc::new(MediaElement::new());
    let store = MediaStore::new(StateOwners {
        media: Some(Rc::clone(&media) as Rc<dyn MediaApi>),
        ..Default::default()
    });
    assert_eq!(
        store.state().text(StateKey::MediaCastUnavailable),
        Some("unsupported")
    );
    store.dispatch(MediaRequest::EnterCast);
    assert!(!store.state().is_true(StateKey::MediaIsCasting));
}

// ============================================================================
// SNAPSHOT EXPORT
// ============================================================================

#[test]
fn test_snapshot_serializes_to_json() {
    let media = Rc::new(MediaElement::new());
    media.finish_load(60.0);
    let store = MediaStore::new(StateOwners {
        media: Some(Rc::clone(&media) as Rc<dyn MediaApi>),
        ..Default::default()
    });

    let json = serde_json::to_value(&*store.state()).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.get("mediaPaused"), Some(&serde_json::json!(true)));
    assert_eq!(object.get("mediaDuration"), Some(&serde_json::json!(60.0)));
    assert_eq!(object.get("mediaVolume"), Some(&serde_json::json!(1.0)));
}
