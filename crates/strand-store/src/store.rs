//! Media Store
//!
//! Owns the state owners, wires the mediator table to their event targets,
//! and publishes immutable state snapshots to subscribers. Requests go in
//! through [`MediaStore::dispatch`]; state comes out through
//! [`MediaStore::state`] and [`MediaStore::subscribe`].

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use strand_events::{Event, EventTarget, ListenerId};
use strand_media::{MediaApi, TextTrackKind};

use crate::mediator::{Mediator, StateSink, Teardown};
use crate::owners::StateOwners;
use crate::prefs::SUBTITLES_LANG_PREF_KEY;
use crate::requests::MediaRequest;
use crate::state::{MediaState, StateKey};
use crate::track_utils::{
    disable_tracks, parse_image_cue, pick_default_subtitle, preferred_languages, show_tracks,
    TrackSpec,
};
use crate::value::StateValue;

/// When the store listens to owner events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorPolicy {
    /// Listen from construction until the store is dropped
    #[default]
    Always,
    /// Listen only while at least one subscriber exists
    WhileSubscribed,
}

/// Handle to an active subscription; dropping it unsubscribes.
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
}

impl Subscription {
    /// Explicit form of dropping the handle
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.remove_subscriber(self.id);
        }
    }
}

/// The reactive store. Cheap to clone; clones share state and subscribers.
#[derive(Clone)]
pub struct MediaStore {
    inner: Rc<StoreInner>,
}

impl MediaStore {
    /// A store monitoring its owners from the start
    pub fn new(owners: StateOwners) -> Self {
        Self::with_policy(owners, MonitorPolicy::Always)
    }

    pub fn with_policy(owners: StateOwners, policy: MonitorPolicy) -> Self {
        let inner = Rc::new(StoreInner {
            mediator: Mediator::standard(),
            owners: RefCell::new(owners),
            state: RefCell::new(Rc::new(MediaState::new(Default::default()))),
            subscribers: RefCell::new(Vec::new()),
            next_subscriber: Cell::new(0),
            bindings: RefCell::new(Vec::new()),
            teardowns: RefCell::new(Vec::new()),
            policy,
            wired: Cell::new(false),
        });
        if inner.should_wire() {
            StoreInner::wire(&inner);
        } else {
            inner.recompute();
        }
        Self { inner }
    }

    /// The latest published snapshot
    pub fn state(&self) -> Rc<MediaState> {
        Rc::clone(&self.inner.state.borrow())
    }

    /// Register a callback for every future snapshot. The current snapshot
    /// is replayed synchronously before this returns.
    pub fn subscribe(&self, callback: impl Fn(&MediaState) + 'static) -> Subscription {
        let id = self.inner.next_subscriber.get();
        self.inner.next_subscriber.set(id + 1);
        let callback: Rc<dyn Fn(&MediaState)> = Rc::new(callback);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::clone(&callback)));
        if self.inner.should_wire() && !self.inner.wired.get() {
            StoreInner::wire(&self.inner);
        }
        let current = self.state();
        callback(&current);
        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Route a typed request to the owners
    pub fn dispatch(&self, request: MediaRequest) {
        StoreInner::dispatch(&self.inner, request);
    }

    /// Event-style dispatch. Unknown request kinds are logged and ignored.
    pub fn dispatch_named(&self, kind: &str, detail: Option<&StateValue>) {
        match MediaRequest::from_parts(kind, detail) {
            Some(request) => self.dispatch(request),
            None => tracing::debug!(kind, "ignoring unknown media request"),
        }
    }

    /// Whether owner events are currently being monitored
    pub fn monitoring(&self) -> bool {
        self.inner.wired.get()
    }
}

/// One attached listener, kept so it can be detached on unwire
struct Binding {
    target: BoundTarget,
    listener: ListenerId,
}

/// An event target a descriptor listens to, with whatever keeps it alive
enum BoundTarget {
    Media(Rc<dyn MediaApi>),
    TextTracks(Rc<strand_media::TextTrackList>),
    AudioTracks(Rc<strand_media::AudioTrackList>),
    Renditions(Rc<strand_media::RenditionList>),
    Remote(Rc<strand_media::RemotePlayback>),
    Root(Rc<strand_media::RootNode>),
}

impl BoundTarget {
    fn events(&self) -> &EventTarget {
        match self {
            BoundTarget::Media(m) => m.events(),
            BoundTarget::TextTracks(t) => t.events(),
            BoundTarget::AudioTracks(t) => t.events(),
            BoundTarget::Renditions(r) => r.events(),
            BoundTarget::Remote(r) => r.events(),
            BoundTarget::Root(r) => r.events(),
        }
    }
}

struct StoreInner {
    mediator: &'static Mediator,
    owners: RefCell<StateOwners>,
    state: RefCell<Rc<MediaState>>,
    subscribers: RefCell<Vec<(u64, Rc<dyn Fn(&MediaState)>)>>,
    next_subscriber: Cell<u64>,
    bindings: RefCell<Vec<Binding>>,
    teardowns: RefCell<Vec<Teardown>>,
    policy: MonitorPolicy,
    wired: Cell<bool>,
}

impl StoreInner {
    fn should_wire(&self) -> bool {
        match self.policy {
            MonitorPolicy::Always => true,
            MonitorPolicy::WhileSubscribed => !self.subscribers.borrow().is_empty(),
        }
    }

    /// A detached copy of the owners, so listeners firing mid-call never hit
    /// an outstanding borrow
    fn owners_snapshot(&self) -> StateOwners {
        self.owners.borrow().clone()
    }

    /// Attach listeners and owner-update handlers for every descriptor, then
    /// publish a full recompute.
    fn wire(self: &Rc<Self>) {
        if self.wired.get() {
            return;
        }
        self.wired.set(true);
        let owners = self.owners_snapshot();

        let mut bindings = Vec::new();
        for descriptor in self.mediator.descriptors() {
            let key = descriptor.key;
            let mut bind = |target: BoundTarget, kinds: &[strand_events::EventKind]| {
                for &kind in kinds {
                    let store = Rc::downgrade(self);
                    let listener = target.events().add_listener(
                        kind,
                        Rc::new(move |event: &Event| {
                            if let Some(store) = store.upgrade() {
                                store.handle_event(key, event);
                            }
                        }),
                    );
                    bindings.push(Binding {
                        target: match &target {
                            BoundTarget::Media(m) => BoundTarget::Media(Rc::clone(m)),
                            BoundTarget::TextTracks(t) => BoundTarget::TextTracks(Rc::clone(t)),
                            BoundTarget::AudioTracks(t) => BoundTarget::AudioTracks(Rc::clone(t)),
                            BoundTarget::Renditions(r) => BoundTarget::Renditions(Rc::clone(r)),
                            BoundTarget::Remote(r) => BoundTarget::Remote(Rc::clone(r)),
                            BoundTarget::Root(r) => BoundTarget::Root(Rc::clone(r)),
                        },
                        listener,
                    });
                }
            };

            if let Some(media) = &owners.media {
                bind(BoundTarget::Media(Rc::clone(media)), descriptor.media_events);
                if let Some(tracks) = media.text_tracks() {
                    bind(BoundTarget::TextTracks(tracks), descriptor.text_track_events);
                }
                if let Some(tracks) = media.audio_tracks() {
                    bind(BoundTarget::AudioTracks(tracks), descriptor.audio_track_events);
                }
                if let Some(renditions) = media.video_renditions() {
                    bind(BoundTarget::Renditions(renditions), descriptor.rendition_events);
                }
                if let Some(remote) = media.remote() {
                    bind(BoundTarget::Remote(remote), descriptor.remote_events);
                }
            }
            if let Some(root) = &owners.root {
                bind(BoundTarget::Root(Rc::clone(root)), descriptor.root_events);
            }
        }
        self.bindings.borrow_mut().extend(bindings);

        let mut teardowns = Vec::new();
        for descriptor in self.mediator.descriptors() {
            if let Some(handler) = descriptor.owner_update {
                let store = Rc::downgrade(self);
                let sink = StateSink::new(
                    descriptor.key,
                    Rc::new(move |key, value| {
                        if let Some(store) = store.upgrade() {
                            store.publish(vec![(key, value)]);
                        }
                    }),
                );
                if let Some(teardown) = handler(&owners, &sink) {
                    teardowns.push(teardown);
                }
            }
        }
        self.teardowns.borrow_mut().extend(teardowns);

        self.recompute();
    }

    /// Detach every listener and run every owner-update teardown. Owners and
    /// the last published snapshot are kept.
    fn unwire(&self) {
        if !self.wired.get() {
            return;
        }
        self.wired.set(false);
        for binding in self.bindings.borrow_mut().drain(..) {
            binding.target.events().remove_listener(binding.listener);
        }
        let teardowns: Vec<Teardown> = self.teardowns.borrow_mut().drain(..).collect();
        for teardown in teardowns {
            teardown();
        }
    }

    fn handle_event(&self, key: StateKey, event: &Event) {
        let Some(descriptor) = self.mediator.descriptor(key) else {
            return;
        };
        let owners = self.owners_snapshot();
        let value = (descriptor.get)(&owners, Some(event));
        self.publish(vec![(key, value)]);
    }

    /// Re-read every descriptor key and publish whatever changed. Preview
    /// keys are request-driven and survive untouched.
    fn recompute(&self) {
        let owners = self.owners_snapshot();
        let changes: Vec<(StateKey, StateValue)> = self
            .mediator
            .descriptors()
            .iter()
            .map(|d| (d.key, (d.get)(&owners, None)))
            .collect();
        self.publish(changes);
    }

    /// Diff candidate changes against the current snapshot; publish a new
    /// snapshot and notify subscribers only when something actually changed.
    fn publish(&self, changes: Vec<(StateKey, StateValue)>) {
        let next = {
            let current = self.state.borrow();
            let changed = current.changed_keys(&changes);
            if changed.is_empty() {
                return;
            }
            Rc::new(current.merged(changed.into_iter().cloned()))
        };
        *self.state.borrow_mut() = Rc::clone(&next);
        // snapshot the list first; callbacks may subscribe or unsubscribe
        let subscribers: Vec<Rc<dyn Fn(&MediaState)>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in subscribers {
            callback(&next);
        }
    }

    fn remove_subscriber(&self, id: u64) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
        if !self.should_wire() {
            self.unwire();
        }
    }

    /// Run a key's setter against a detached owners copy
    fn set_key(&self, key: StateKey, value: StateValue) {
        let Some(set) = self.mediator.descriptor(key).and_then(|d| d.set) else {
            return;
        };
        let owners = self.owners_snapshot();
        set(&value, &owners);
    }

    /// Swap an owner: listeners come off the old owners, the mutation runs,
    /// and listeners go onto the new ones.
    fn swap_owners(self: &Rc<Self>, mutate: impl FnOnce(&mut StateOwners)) {
        let was_wired = self.wired.get();
        if was_wired {
            self.unwire();
        }
        mutate(&mut *self.owners.borrow_mut());
        if was_wired {
            self.wire();
        } else {
            self.recompute();
        }
    }

    fn dispatch(self: &Rc<Self>, request: MediaRequest) {
        match request {
            MediaRequest::Play => {
                self.seek_to_live_if_needed();
                self.set_key(StateKey::MediaPaused, false.into());
            }
            MediaRequest::Pause => self.set_key(StateKey::MediaPaused, true.into()),
            MediaRequest::Seek(time) => self.set_key(StateKey::MediaCurrentTime, time.into()),
            MediaRequest::SeekToLive => {
                crate::mediator::seek_to_live(&self.owners_snapshot());
            }
            MediaRequest::Volume(volume) => self.set_key(StateKey::MediaVolume, volume.into()),
            MediaRequest::Mute => self.set_key(StateKey::MediaMuted, true.into()),
            MediaRequest::Unmute => self.set_key(StateKey::MediaMuted, false.into()),
            MediaRequest::PlaybackRate(rate) => {
                self.set_key(StateKey::MediaPlaybackRate, rate.into());
            }
            MediaRequest::EnterFullscreen => {
                // the two exclusive surfaces never overlap
                if self.state.borrow().is_true(StateKey::MediaIsPip) {
                    self.set_key(StateKey::MediaIsPip, false.into());
                }
                self.set_key(StateKey::MediaIsFullscreen, true.into());
            }
            MediaRequest::ExitFullscreen => {
                self.set_key(StateKey::MediaIsFullscreen, false.into());
            }
            MediaRequest::EnterPip => {
                if self.state.borrow().is_true(StateKey::MediaIsFullscreen) {
                    self.set_key(StateKey::MediaIsFullscreen, false.into());
                }
                self.set_key(StateKey::MediaIsPip, true.into());
            }
            MediaRequest::ExitPip => self.set_key(StateKey::MediaIsPip, false.into()),
            MediaRequest::EnterCast => {
                if self.state.borrow().is_true(StateKey::MediaIsFullscreen) {
                    self.set_key(StateKey::MediaIsFullscreen, false.into());
                }
                self.set_key(StateKey::MediaIsCasting, true.into());
            }
            MediaRequest::ExitCast => self.set_key(StateKey::MediaIsCasting, false.into()),
            MediaRequest::EnterAirplay => {
                if self.state.borrow().is_true(StateKey::MediaIsFullscreen) {
                    self.set_key(StateKey::MediaIsFullscreen, false.into());
                }
                self.enter_airplay();
            }
            MediaRequest::ShowSubtitles(specs) => self.show_subtitles(specs),
            MediaRequest::DisableSubtitles(specs) => {
                let owners = self.owners_snapshot();
                if let Some(tracks) = owners.media.as_ref().and_then(|m| m.text_tracks()) {
                    disable_tracks(&tracks, &specs);
                }
            }
            MediaRequest::ToggleSubtitles(force) => self.toggle_subtitles(force),
            MediaRequest::Rendition(id) => {
                self.set_key(StateKey::MediaRenditionSelected, id.into());
            }
            MediaRequest::AudioTrack(id) => {
                self.set_key(StateKey::MediaAudioTrackEnabled, id.as_str().into());
            }
            MediaRequest::Preview(time) => self.update_preview(time),
            MediaRequest::MediaElementChange(media) => {
                self.swap_owners(|owners| owners.media = media);
            }
            MediaRequest::FullscreenElementChange(target) => {
                self.swap_owners(|owners| owners.fullscreen_target = target);
            }
            MediaRequest::RootNodeChange(root) => {
                self.swap_owners(|owners| owners.root = root);
            }
            MediaRequest::OptionsChange(patch) => {
                // options are read lazily; applying one is never observable
                // until the next recompute
                patch.apply(&mut self.owners.borrow_mut().options);
                return;
            }
        }
        if !self.wired.get() {
            self.recompute();
        }
    }

    /// Resuming a live stream with no DVR window snaps back to the live
    /// edge first, unless the option turns that off.
    fn seek_to_live_if_needed(&self) {
        let owners = self.owners_snapshot();
        if owners.options.no_auto_seek_to_live {
            return;
        }
        let state = Rc::clone(&self.state.borrow());
        let live = state.text(StateKey::MediaStreamType) == Some("live");
        let no_dvr = state.number(StateKey::MediaTargetLiveWindow) == Some(0.0);
        if live && no_dvr {
            crate::mediator::seek_to_live(&owners);
        }
    }

    fn enter_airplay(&self) {
        let owners = self.owners_snapshot();
        let Some(presentation) = owners.media.as_ref().and_then(|m| m.presentation()) else {
            tracing::warn!("airplay is not enabled");
            return;
        };
        presentation.show_target_picker();
    }

    fn show_subtitles(&self, specs: Vec<TrackSpec>) {
        let owners = self.owners_snapshot();
        if !owners.options.no_subtitles_lang_pref {
            if let Some(first) = specs.first() {
                owners.prefs.set(SUBTITLES_LANG_PREF_KEY, &first.language);
            }
        }
        let value = StateValue::List(specs.into_iter().map(TrackSpec::into_value).collect());
        self.set_key(StateKey::MediaSubtitlesShowing, value);
    }

    fn toggle_subtitles(&self, force: Option<bool>) {
        let owners = self.owners_snapshot();
        let Some(tracks) = owners.media.as_ref().and_then(|m| m.text_tracks()) else {
            return;
        };
        let showing = tracks.showing_subtitles();
        let turn_on = force.unwrap_or(showing.is_empty());
        if !turn_on {
            let specs: Vec<TrackSpec> = showing.iter().map(|t| TrackSpec::of(t)).collect();
            disable_tracks(&tracks, &specs);
            return;
        }
        if !showing.is_empty() {
            return;
        }
        let langs = preferred_languages(&owners.prefs, &owners.options);
        let Some(track) = pick_default_subtitle(&tracks, &langs) else {
            return;
        };
        if !owners.options.no_subtitles_lang_pref {
            owners.prefs.set(SUBTITLES_LANG_PREF_KEY, &track.language);
        }
        show_tracks(&tracks, &[TrackSpec::of(&track)]);
    }

    /// Derive the preview keys for a hover time from the thumbnail and
    /// chapter tracks; `None` clears them.
    fn update_preview(&self, time: Option<f64>) {
        let Some(time) = time else {
            self.publish(vec![
                (StateKey::MediaPreviewTime, StateValue::Null),
                (StateKey::MediaPreviewImage, StateValue::Null),
                (StateKey::MediaPreviewCoords, StateValue::Null),
                (StateKey::MediaPreviewChapter, StateValue::Null),
            ]);
            return;
        };
        let owners = self.owners_snapshot();
        let tracks = owners.media.as_ref().and_then(|m| m.text_tracks());

        let mut image = StateValue::Null;
        let mut coords = StateValue::Null;
        let mut chapter = StateValue::Null;
        if let Some(tracks) = &tracks {
            let thumbnails = tracks.snapshot().into_iter().find(|t| {
                t.kind == TextTrackKind::Metadata && t.label.eq_ignore_ascii_case("thumbnails")
            });
            if let Some(cue) = thumbnails.and_then(|t| t.cue_at(time)) {
                let (url, xywh) = parse_image_cue(&cue.text);
                image = url.into();
                if let Some([x, y, w, h]) = xywh {
                    coords = StateValue::List(vec![x.into(), y.into(), w.into(), h.into()]);
                }
            }
            let chapters = tracks
                .snapshot()
                .into_iter()
                .find(|t| t.kind == TextTrackKind::Chapters);
            if let Some(cue) = chapters.and_then(|t| t.cue_at(time)) {
                chapter = cue.text.into();
            }
        }
        self.publish(vec![
            (StateKey::MediaPreviewTime, time.into()),
            (StateKey::MediaPreviewImage, image),
            (StateKey::MediaPreviewCoords, coords),
            (StateKey::MediaPreviewChapter, chapter),
        ]);
    }
}
