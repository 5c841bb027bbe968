//! Integration tests - Full store pipeline from requests to snapshots
//!
//! Tests the complete workflow: dispatch → owners → events → mediator →
//! published state.

use std::cell::RefCell;
use std::rc::Rc;

use strand_events::EventKind;
use strand_media::{
    MediaApi, MediaElement, Rendition, RootNode, StreamType, TextCue, TextTrack, TextTrackKind,
    TimeRanges,
};
use strand_store::{
    MediaRequest, MediaStore, MonitorPolicy, StateKey, StateOwners, StateValue, StoreOptions,
};

fn element() -> Rc<MediaElement> {
    Rc::new(MediaElement::new())
}

fn store_for(media: Rc<MediaElement>) -> MediaStore {
    MediaStore::new(StateOwners {
        media: Some(media as Rc<dyn MediaApi>),
        ..Default::default()
    })
}

fn record_states(store: &MediaStore) -> (Rc<RefCell<Vec<Rc<strand_store::MediaState>>>>, strand_store::Subscription) {
    let seen: Rc<RefCell<Vec<Rc<strand_store::MediaState>>>> = Rc::default();
    let sub = store.subscribe({
        let seen = Rc::clone(&seen);
        move |state| seen.borrow_mut().push(Rc::new(state.clone()))
    });
    (seen, sub)
}

// ============================================================================
// PLAYBACK
// ============================================================================

#[test]
fn test_play_request_reaches_element_once() {
    let media = element();
    media.finish_load(60.0);
    media.make_ready();
    let store = store_for(Rc::clone(&media));

    assert!(store.state().is_true(StateKey::MediaPaused));
    store.dispatch(MediaRequest::Play);

    assert_eq!(media.play_call_count(), 1);
    let state = store.state();
    assert!(!state.is_true(StateKey::MediaPaused));
    assert!(state.is_true(StateKey::MediaHasPlayed));
}

#[test]
fn test_pause_after_play() {
    let media = element();
    media.finish_load(60.0);
    media.make_ready();
    let store = store_for(Rc::clone(&media));

    store.dispatch(MediaRequest::Play);
    store.dispatch(MediaRequest::Pause);

    let state = store.state();
    assert!(state.is_true(StateKey::MediaPaused));
    // has-played sticks after the first playing event
    assert!(state.is_true(StateKey::MediaHasPlayed));
}

#[test]
fn test_seek_updates_current_time() {
    let media = element();
    media.finish_load(120.0);
    let store = store_for(Rc::clone(&media));

    store.dispatch(MediaRequest::Seek(42.0));
    assert_eq!(store.state().number(StateKey::MediaCurrentTime), Some(42.0));
}

#[test]
fn test_ended_clears_on_seek_back() {
    let media = element();
    media.finish_load(10.0);
    media.make_ready();
    let store = store_for(Rc::clone(&media));

    store.dispatch(MediaRequest::Play);
    media.end_playback();
    assert!(store.state().is_true(StateKey::MediaEnded));

    store.dispatch(MediaRequest::Seek(2.0));
    assert!(!store.state().is_true(StateKey::MediaEnded));
}

// ============================================================================
// SUBSCRIPTIONS AND DIFFING
// ============================================================================

#[test]
fn test_subscriber_gets_immediate_replay() {
    let media = element();
    media.finish_load(30.0);
    let store = store_for(media);

    let (seen, _sub) = record_states(&store);
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0].number(StateKey::MediaDuration), Some(30.0));
}

#[test]
fn test_no_notification_without_change() {
    let media = element();
    let store = store_for(Rc::clone(&media));
    let (seen, _sub) = record_states(&store);
    let baseline = seen.borrow().len();

    // same values recomputed: diffing suppresses the publish
    media.events().fire(EventKind::VolumeChange);
    media.events().fire(EventKind::TimeUpdate);
    assert_eq!(seen.borrow().len(), baseline);

    // a real change notifies (volume and volume level each publish)
    media.set_volume(0.4);
    assert!(seen.borrow().len() > baseline);
}

#[test]
fn test_nan_duration_does_not_thrash() {
    let media = element();
    let store = store_for(Rc::clone(&media));
    let (seen, _sub) = record_states(&store);
    let baseline = seen.borrow().len();

    // duration stays NaN; NaN == NaN for state diffing
    media.events().fire(EventKind::DurationChange);
    assert_eq!(seen.borrow().len(), baseline);
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let media = element();
    let store = store_for(Rc::clone(&media));
    let (seen, sub) = record_states(&store);
    let baseline = seen.borrow().len();

    sub.cancel();
    media.set_volume(0.2);
    assert_eq!(seen.borrow().len(), baseline);
}

// ============================================================================
// MONITOR POLICY AND OWNER SWAPS
// ============================================================================

#[test]
fn test_while_subscribed_lifecycle() {
    let media = element();
    let store = MediaStore::with_policy(
        StateOwners {
            media: Some(Rc::clone(&media) as Rc<dyn MediaApi>),
            ..Default::default()
        },
        MonitorPolicy::WhileSubscribed,
    );
    assert!(!store.monitoring());

    let first = store.subscribe(|_| {});
    let second = store.subscribe(|_| {});
    assert!(store.monitoring());

    drop(first);
    assert!(store.monitoring());
    drop(second);
    assert!(!store.monitoring());
    assert_eq!(media.events().listener_count(EventKind::Play), 0);
}

#[test]
fn test_media_swap_moves_listeners() {
    let old = element();
    let store = store_for(Rc::clone(&old));
    assert!(old.events().listener_count(EventKind::TimeUpdate) > 0);

    let new = element();
    new.finish_load(90.0);
    store.dispatch(MediaRequest::MediaElementChange(Some(
        Rc::clone(&new) as Rc<dyn MediaApi>
    )));

    assert_eq!(old.events().listener_count(EventKind::TimeUpdate), 0);
    assert_eq!(store.state().number(StateKey::MediaDuration), Some(90.0));

    // detaching entirely falls back to defaults
    store.dispatch(MediaRequest::MediaElementChange(None));
    assert!(store.state().is_true(StateKey::MediaPaused));
    assert!(store
        .state()
        .number(StateKey::MediaDuration)
        .unwrap()
        .is_nan());
}

// ============================================================================
// FULLSCREEN AND PICTURE-IN-PICTURE
// ============================================================================

fn store_with_root() -> (MediaStore, Rc<MediaElement>, Rc<RootNode>) {
    let media = element();
    media.finish_load(60.0);
    media.make_ready();
    let root = Rc::new(RootNode::new());
    let store = MediaStore::new(StateOwners {
        media: Some(Rc::clone(&media) as Rc<dyn MediaApi>),
        root: Some(Rc::clone(&root)),
        ..Default::default()
    });
    (store, media, root)
}

#[test]
fn test_fullscreen_round_trip() {
    let (store, _media, root) = store_with_root();

    store.dispatch(MediaRequest::EnterFullscreen);
    assert!(store.state().is_true(StateKey::MediaIsFullscreen));
    assert!(root.fullscreen_element().is_some());

    store.dispatch(MediaRequest::ExitFullscreen);
    assert!(!store.state().is_true(StateKey::MediaIsFullscreen));
    assert!(root.fullscreen_element().is_none());
}

#[test]
fn test_fullscreen_and_pip_are_exclusive() {
    let (store, _media, _root) = store_with_root();

    store.dispatch(MediaRequest::EnterPip);
    assert!(store.state().is_true(StateKey::MediaIsPip));

    store.dispatch(MediaRequest::EnterFullscreen);
    let state = store.state();
    assert!(state.is_true(StateKey::MediaIsFullscreen));
    assert!(!state.is_true(StateKey::MediaIsPip));

    store.dispatch(MediaRequest::EnterPip);
    let state = store.state();
    assert!(state.is_true(StateKey::MediaIsPip));
    assert!(!state.is_true(StateKey::MediaIsFullscreen));
}

#[test]
fn test_deferred_pip_dropped_on_media_swap() {
    let old = element();
    let root = Rc::new(RootNode::new());
    let store = MediaStore::new(StateOwners {
        media: Some(Rc::clone(&old) as Rc<dyn MediaApi>),
        root: Some(Rc::clone(&root)),
        ..Default::default()
    });

    // nothing loaded yet, so entry waits for metadata
    store.dispatch(MediaRequest::EnterPip);
    assert!(old.events().listener_count(EventKind::LoadedMetadata) > 0);

    let new = element();
    store.dispatch(MediaRequest::MediaElementChange(Some(
        Rc::clone(&new) as Rc<dyn MediaApi>
    )));

    // metadata arriving on the detached element must not enter pip
    assert_eq!(old.events().listener_count(EventKind::LoadedMetadata), 0);
    old.finish_load(60.0);
    assert_eq!(root.pip_element(), None);
    assert!(!store.state().is_true(StateKey::MediaIsPip));
}

// ============================================================================
// LIVE STREAMS
// ============================================================================

#[test]
fn test_live_play_snaps_to_live_edge() {
    let media = element();
    media.set_stream_type(Some(StreamType::Live));
    media.finish_load(f64::INFINITY);
    media.make_ready();
    let mut ranges = TimeRanges::new();
    ranges.add(0.0, 300.0);
    media.set_seekable(Some(ranges));
    media.set_current_time(10.0);

    let store = store_for(Rc::clone(&media));
    assert!(!store.state().is_true(StateKey::MediaTimeIsLive));

    store.dispatch(MediaRequest::Play);
    assert!(store.state().is_true(StateKey::MediaTimeIsLive));
    assert!(media.current_time() >= 290.0 - 1e-9);
}

#[test]
fn test_dvr_stream_does_not_auto_seek() {
    let media = element();
    media.set_stream_type(Some(StreamType::Live));
    media.set_target_live_window(Some(600.0));
    media.finish_load(f64::INFINITY);
    media.make_ready();
    let mut ranges = TimeRanges::new();
    ranges.add(0.0, 300.0);
    media.set_seekable(Some(ranges));
    media.set_current_time(10.0);

    let store = store_for(Rc::clone(&media));
    store.dispatch(MediaRequest::Play);
    assert!(media.current_time() < 20.0);
}

#[test]
fn test_no_auto_seek_option() {
    let media = element();
    media.set_stream_type(Some(StreamType::Live));
    media.finish_load(f64::INFINITY);
    media.make_ready();
    let mut ranges = TimeRanges::new();
    ranges.add(0.0, 300.0);
    media.set_seekable(Some(ranges));
    media.set_current_time(10.0);

    let store = MediaStore::new(StateOwners {
        media: Some(Rc::clone(&media) as Rc<dyn MediaApi>),
        options: StoreOptions {
            no_auto_seek_to_live: true,
            ..Default::default()
        },
        ..Default::default()
    });
    store.dispatch(MediaRequest::Play);
    assert!(media.current_time() < 20.0);
}

// ============================================================================
// SUBTITLES
// ============================================================================

#[test]
fn test_default_subtitles_select_on_late_add() {
    let media = element();
    let store = MediaStore::new(StateOwners {
        media: Some(Rc::clone(&media) as Rc<dyn MediaApi>),
        options: StoreOptions {
            default_subtitles: true,
            media_lang: Some("en".to_string()),
            ..Default::default()
        },
        ..Default::default()
    });
    assert_eq!(
        store.state().get(StateKey::MediaSubtitlesShowing),
        &StateValue::List(Vec::new())
    );

    let tracks = media.text_tracks().unwrap();
    tracks.add(TextTrack::new(TextTrackKind::Subtitles, "English", "en"));

    let showing = store.state();
    let list = showing.get(StateKey::MediaSubtitlesShowing).as_list().unwrap();
    assert_eq!(list.len(), 1);

    // the one-shot watcher is gone; adding more tracks changes nothing
    tracks.add(TextTrack::new(TextTrackKind::Subtitles, "Deutsch", "de"));
    let list_len = store
        .state()
        .get(StateKey::MediaSubtitlesShowing)
        .as_list()
        .unwrap()
        .len();
    assert_eq!(list_len, 1);
}

#[test]
fn test_toggle_subtitles() {
    let media = element();
    let tracks = media.text_tracks().unwrap();
    tracks.add(TextTrack::new(TextTrackKind::Subtitles, "English", "en"));
    let store = store_for(Rc::clone(&media));

    store.dispatch(MediaRequest::ToggleSubtitles(None));
    assert_eq!(
        store
            .state()
            .get(StateKey::MediaSubtitlesShowing)
            .as_list()
            .unwrap()
            .len(),
        1
    );

    store.dispatch(MediaRequest::ToggleSubtitles(None));
    assert_eq!(
        store
            .state()
            .get(StateKey::MediaSubtitlesShowing)
            .as_list()
            .unwrap()
            .len(),
        0
    );
}

// ============================================================================
// PREVIEW
// ============================================================================

#[test]
fn test_preview_derives_image_and_chapter() {
    let media = element();
    let tracks = media.text_tracks().unwrap();
    let thumbs = tracks.add(TextTrack::new(TextTrackKind::Metadata, "thumbnails", ""));
    thumbs.add_cue(TextCue {
        id: "t1".to_string(),
        start_time: 0.0,
        end_time: 10.0,
        text: "sprite.jpg#xywh=0,0,160,90".to_string(),
    });
    let chapters = tracks.add(TextTrack::new(TextTrackKind::Chapters, "chapters", ""));
    chapters.add_cue(TextCue {
        id: "c1".to_string(),
        start_time: 0.0,
        end_time: 30.0,
        text: "Opening".to_string(),
    });
    let store = store_for(media);

    store.dispatch(MediaRequest::Preview(Some(5.0)));
    let state = store.state();
    assert_eq!(state.number(StateKey::MediaPreviewTime), Some(5.0));
    assert_eq!(state.text(StateKey::MediaPreviewImage), Some("sprite.jpg"));
    assert_eq!(
        state.get(StateKey::MediaPreviewCoords),
        &StateValue::List(vec![0.0.into(), 0.0.into(), 160.0.into(), 90.0.into()])
    );
    assert_eq!(state.text(StateKey::MediaPreviewChapter), Some("Opening"));

    store.dispatch(MediaRequest::Preview(None));
    let state = store.state();
    assert!(state.get(StateKey::MediaPreviewTime).is_null());
    assert!(state.get(StateKey::MediaPreviewImage).is_null());
}

#[test]
fn test_preview_survives_unrelated_updates() {
    let media = element();
    let tracks = media.text_tracks().unwrap();
    let thumbs = tracks.add(TextTrack::new(TextTrackKind::Metadata, "thumbnails", ""));
    thumbs.add_cue(TextCue {
        id: "t1".to_string(),
        start_time: 0.0,
        end_time: 10.0,
        text: "sprite.jpg".to_string(),
    });
    let store = store_for(Rc::clone(&media));

    store.dispatch(MediaRequest::Preview(Some(3.0)));
    media.set_volume(0.6);
    assert_eq!(store.state().number(StateKey::MediaPreviewTime), Some(3.0));
}

// ============================================================================
// RENDITIONS AND STRING DISPATCH
// ============================================================================

#[test]
fn test_rendition_request_by_name() {
    let media = Rc::new(MediaElement::new().with_renditions());
    let renditions = media.video_renditions().unwrap();
    renditions.add(Rendition::new("sd", 640, 360));
    renditions.add(Rendition::new("hd", 1920, 1080));
    let store = store_for(Rc::clone(&media));

    store.dispatch_named("mediarenditionrequest", Some(&"hd".into()));
    assert_eq!(store.state().text(StateKey::MediaRenditionSelected), Some("hd"));

    store.dispatch_named("mediarenditionrequest", None);
    assert!(store.state().get(StateKey::MediaRenditionSelected).is_null());
}

#[test]
fn test_unknown_request_kind_is_ignored() {
    let media = element();
    let store = store_for(media);
    let before = store.state();
    store.dispatch_named("mediawarpspeedrequest", Some(&StateValue::Number(9.0)));
    assert!(Rc::ptr_eq(&before, &store.state()));
}
