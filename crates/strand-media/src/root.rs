//! Root Node
//!
//! Document-like state owner: it holds the fullscreen and
//! picture-in-picture element slots, fires root-level events, and knows the
//! shadow-host chain so fullscreen checks work from nested shadow trees.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use strand_events::{EventKind, EventTarget, TargetId};

use crate::element::MediaApi;

/// Document-like root owner
pub struct RootNode {
    events: EventTarget,
    fullscreen_element: Cell<Option<TargetId>>,
    pip_element: Cell<Option<TargetId>>,
    // element living in a shadow tree -> host element of that tree
    hosts: RefCell<HashMap<TargetId, TargetId>>,
}

impl RootNode {
    pub fn new() -> Self {
        Self {
            events: EventTarget::new(),
            fullscreen_element: Cell::new(None),
            pip_element: Cell::new(None),
            hosts: RefCell::new(HashMap::new()),
        }
    }

    pub fn events(&self) -> &EventTarget {
        &self.events
    }

    pub fn fullscreen_element(&self) -> Option<TargetId> {
        self.fullscreen_element.get()
    }

    pub fn pip_element(&self) -> Option<TargetId> {
        self.pip_element.get()
    }

    /// Record that `element` lives in a shadow tree hosted by `host`
    pub fn register_host(&self, element: TargetId, host: TargetId) {
        self.hosts.borrow_mut().insert(element, host);
    }

    /// Walk the host chain outward from `element`, inclusive
    pub fn host_chain(&self, element: TargetId) -> Vec<TargetId> {
        let hosts = self.hosts.borrow();
        let mut chain = vec![element];
        let mut current = element;
        while let Some(&host) = hosts.get(&current) {
            // Defensive against accidental cycles in test wiring
            if chain.contains(&host) {
                break;
            }
            chain.push(host);
            current = host;
        }
        chain
    }

    /// True when `outer` is `inner` itself or a shadow host of it
    pub fn contains_through_hosts(&self, outer: TargetId, inner: TargetId) -> bool {
        self.host_chain(inner).contains(&outer)
    }

    pub fn request_fullscreen(&self, target: TargetId) {
        if self.fullscreen_element.get() == Some(target) {
            return;
        }
        self.fullscreen_element.set(Some(target));
        self.events.fire(EventKind::FullscreenChange);
    }

    pub fn exit_fullscreen(&self) {
        if self.fullscreen_element.get().is_none() {
            return;
        }
        self.fullscreen_element.set(None);
        self.events.fire(EventKind::FullscreenChange);
    }

    /// Put a media element into picture-in-picture; fires the enter event on
    /// the media target, mirroring the native split between document state
    /// and media events.
    pub fn enter_pip(&self, media: &dyn MediaApi) {
        if self.pip_element.get() == Some(media.id()) {
            return;
        }
        self.pip_element.set(Some(media.id()));
        media.events().fire(EventKind::EnterPictureInPicture);
    }

    pub fn exit_pip(&self, media: &dyn MediaApi) {
        if self.pip_element.get().is_none() {
            return;
        }
        self.pip_element.set(None);
        media.events().fire(EventKind::LeavePictureInPicture);
    }
}

impl Default for RootNode {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RootNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootNode")
            .field("fullscreen_element", &self.fullscreen_element.get())
            .field("pip_element", &self.pip_element.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MediaElement;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_fullscreen_round_trip() {
        let root = RootNode::new();
        let target = TargetId::next();

        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        root.events().add_listener(
            EventKind::FullscreenChange,
            Rc::new(move |_| f.set(f.get() + 1)),
        );

        root.request_fullscreen(target);
        assert_eq!(root.fullscreen_element(), Some(target));
        root.request_fullscreen(target); // no-op
        root.exit_fullscreen();
        assert_eq!(root.fullscreen_element(), None);
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_host_chain_walk() {
        let root = RootNode::new();
        let inner = TargetId::next();
        let mid = TargetId::next();
        let outer = TargetId::next();
        root.register_host(inner, mid);
        root.register_host(mid, outer);

        assert_eq!(root.host_chain(inner), vec![inner, mid, outer]);
        assert!(root.contains_through_hosts(outer, inner));
        assert!(!root.contains_through_hosts(inner, outer));
    }

    #[test]
    fn test_pip_fires_on_media_target() {
        let root = RootNode::new();
        let media = MediaElement::new();

        let entered = Rc::new(Cell::new(false));
        let e = Rc::clone(&entered);
        media.events().add_listener(
            EventKind::EnterPictureInPicture,
            Rc::new(move |_| e.set(true)),
        );

        root.enter_pip(&media);
        assert!(entered.get());
        assert_eq!(root.pip_element(), Some(media.id()));

        root.exit_pip(&media);
        assert_eq!(root.pip_element(), None);
    }
}
