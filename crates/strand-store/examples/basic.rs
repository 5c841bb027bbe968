//! Example: Basic usage of the strand media store

use std::rc::Rc;

use strand_media::{MediaApi, MediaElement};
use strand_store::{MediaRequest, MediaStore, StateKey, StateOwners};

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // A scripted media element standing in for a real playback engine
    let media = Rc::new(MediaElement::new());
    media.finish_load(120.0);
    media.make_ready();

    let store = MediaStore::new(StateOwners {
        media: Some(Rc::clone(&media) as Rc<dyn MediaApi>),
        ..Default::default()
    });

    let _sub = store.subscribe(|state| {
        println!(
            "paused={} time={:.1} volume={:.2}",
            state.is_true(StateKey::MediaPaused),
            state.number(StateKey::MediaCurrentTime).unwrap_or(0.0),
            state.number(StateKey::MediaVolume).unwrap_or(1.0),
        );
    });

    store.dispatch(MediaRequest::Play);
    store.dispatch(MediaRequest::Seek(30.0));
    store.dispatch(MediaRequest::Volume(0.5));
    store.dispatch(MediaRequest::Pause);

    let snapshot = store.state();
    println!(
        "final: paused={} time={:?}",
        snapshot.is_true(StateKey::MediaPaused),
        snapshot.number(StateKey::MediaCurrentTime),
    );
}
