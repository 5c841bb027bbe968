//! Presentation Surface
//!
//! The iOS-style presentation surface some playback elements expose:
//! an inline/fullscreen/picture-in-picture mode that bypasses the root-node
//! fullscreen API, plus wireless playback-target availability. Events fire on
//! the owning media element's target.

use std::cell::Cell;
use std::rc::Rc;

use strand_events::{EventKind, EventTarget};

/// Presentation mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PresentationMode {
    #[default]
    Inline,
    Fullscreen,
    PictureInPicture,
}

/// Per-element presentation surface
pub struct Presentation {
    media_events: Rc<EventTarget>,
    mode: Cell<PresentationMode>,
    wireless_available: Cell<bool>,
}

impl Presentation {
    pub fn new(media_events: Rc<EventTarget>) -> Self {
        Self {
            media_events,
            mode: Cell::new(PresentationMode::Inline),
            wireless_available: Cell::new(false),
        }
    }

    pub fn mode(&self) -> PresentationMode {
        self.mode.get()
    }

    /// Element-level fullscreen flag, independent of the root node
    pub fn displaying_fullscreen(&self) -> bool {
        self.mode.get() == PresentationMode::Fullscreen
    }

    pub fn set_mode(&self, mode: PresentationMode) {
        if self.mode.get() == mode {
            return;
        }
        self.mode.set(mode);
        self.media_events.fire(EventKind::PresentationModeChange);
    }

    pub fn wireless_target_available(&self) -> bool {
        self.wireless_available.get()
    }

    pub fn set_wireless_target_available(&self, available: bool) {
        if self.wireless_available.get() == available {
            return;
        }
        self.wireless_available.set(available);
        self.media_events.fire(EventKind::TargetAvailabilityChange);
    }

    /// Open the wireless target picker
    pub fn show_target_picker(&self) -> bool {
        if !self.wireless_available.get() {
            tracing::warn!("no wireless playback targets available");
            return false;
        }
        true
    }
}

impl std::fmt::Debug for Presentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("mode", &self.mode.get())
            .field("wireless_available", &self.wireless_available.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_mode_change_fires_on_media_target() {
        let events = Rc::new(EventTarget::new());
        let presentation = Presentation::new(Rc::clone(&events));

        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        events.add_listener(
            EventKind::PresentationModeChange,
            Rc::new(move |_| f.set(f.get() + 1)),
        );

        presentation.set_mode(PresentationMode::Fullscreen);
        presentation.set_mode(PresentationMode::Fullscreen); // no-op
        assert_eq!(fired.get(), 1);
        assert!(presentation.displaying_fullscreen());
    }
}
