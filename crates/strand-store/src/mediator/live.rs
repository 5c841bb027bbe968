//! Live streaming descriptors: stream type, target live window, live edge.

use strand_events::EventKind;
use strand_media::StreamType;

use crate::mediator::StateDescriptor;
use crate::owners::StateOwners;
use crate::state::StateKey;
use crate::value::StateValue;

pub(super) fn install(table: &mut Vec<StateDescriptor>) {
    table.push(
        StateDescriptor::reader(StateKey::MediaStreamType, get_stream_type).on_media(&[
            EventKind::DurationChange,
            EventKind::LoadedMetadata,
            EventKind::StreamTypeChange,
            EventKind::Emptied,
        ]),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaTargetLiveWindow, get_target_live_window).on_media(
            &[
                EventKind::DurationChange,
                EventKind::LoadedMetadata,
                EventKind::StreamTypeChange,
                EventKind::TargetLiveWindowChange,
                EventKind::Emptied,
            ],
        ),
    );
    table.push(
        StateDescriptor::reader(StateKey::MediaTimeIsLive, get_time_is_live).on_media(&[
            EventKind::TimeUpdate,
            EventKind::Playing,
            EventKind::LoadedMetadata,
            EventKind::StreamTypeChange,
            EventKind::Emptied,
        ]),
    );
}

/// Resolve the effective stream type: an explicit hint from the media wins,
/// then an infinite duration implies live, a finite one on-demand, and the
/// `default_stream_type` option is the fallback before the type is known.
pub(crate) fn computed_stream_type(owners: &StateOwners) -> Option<StreamType> {
    let fallback = owners.options.default_stream_type;
    let Some(media) = &owners.media else {
        return fallback;
    };
    if let Some(hint) = media.stream_type_hint() {
        if hint != StreamType::Unknown {
            return Some(hint);
        }
    }
    let duration = media.duration();
    if duration.is_infinite() {
        Some(StreamType::Live)
    } else if !duration.is_nan() {
        Some(StreamType::OnDemand)
    } else {
        fallback
    }
}

fn get_stream_type(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    match computed_stream_type(owners) {
        Some(stream_type) => stream_type.as_str().into(),
        None => StateValue::Null,
    }
}

fn get_target_live_window(
    owners: &StateOwners,
    _event: Option<&strand_events::Event>,
) -> StateValue {
    if let Some(window) = owners.media.as_ref().and_then(|m| m.target_live_window_hint()) {
        return window.into();
    }
    // Plain live streams have no DVR window
    match computed_stream_type(owners) {
        Some(StreamType::Live) => 0.0.into(),
        _ => StateValue::Null,
    }
}

fn get_time_is_live(owners: &StateOwners, _event: Option<&strand_events::Event>) -> StateValue {
    let Some(media) = &owners.media else {
        return false.into();
    };
    // A player-provided live edge beats the seekable heuristic
    if let Some(edge) = media.live_edge_start() {
        if edge.is_finite() {
            return (media.current_time() >= edge).into();
        }
    }
    if computed_stream_type(owners) != Some(StreamType::Live) {
        return false.into();
    }
    match media.seekable() {
        // No seekable ranges reported at all: nothing to lag behind
        None => true.into(),
        Some(ranges) => match ranges.last_end() {
            None => false.into(),
            Some(end) => {
                let edge = end - owners.options.live_edge_offset;
                (media.current_time() >= edge).into()
            }
        },
    }
}

/// Jump playback to the live edge, at the configured offset back from the end
/// of the seekable range.
pub(crate) fn seek_to_live(owners: &StateOwners) {
    let Some(media) = &owners.media else { return };
    let Some(end) = media.seekable().and_then(|r| r.last_end()) else {
        tracing::warn!("seekable range unknown; cannot seek to live");
        return;
    };
    let target = (end - owners.options.seek_to_live_offset()).max(0.0);
    media.set_current_time(target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use strand_media::{MediaApi, MediaElement, TimeRanges};

    fn owners_with(media: MediaElement) -> StateOwners {
        StateOwners {
            media: Some(Rc::new(media)),
            ..Default::default()
        }
    }

    #[test]
    fn test_stream_type_from_duration() {
        let media = MediaElement::new();
        media.finish_load(f64::INFINITY);
        let owners = owners_with(media);
        assert_eq!(get_stream_type(&owners, None), "live".into());

        let media = MediaElement::new();
        media.finish_load(30.0);
        let owners = owners_with(media);
        assert_eq!(get_stream_type(&owners, None), "on-demand".into());
    }

    #[test]
    fn test_stream_type_option_fallback() {
        let mut owners = StateOwners::default();
        assert!(get_stream_type(&owners, None).is_null());
        owners.options.default_stream_type = Some(StreamType::Live);
        assert_eq!(get_stream_type(&owners, None), "live".into());
    }

    #[test]
    fn test_target_live_window_zero_for_plain_live() {
        let media = MediaElement::new();
        media.set_stream_type(Some(StreamType::Live));
        let owners = owners_with(media);
        assert_eq!(get_target_live_window(&owners, None), StateValue::Number(0.0));
    }

    #[test]
    fn test_time_is_live_without_seekable() {
        let media = MediaElement::new();
        media.set_stream_type(Some(StreamType::Live));
        let owners = owners_with(media);
        assert_eq!(get_time_is_live(&owners, None), true.into());
    }

    #[test]
    fn test_time_is_live_against_seekable_edge() {
        let media = MediaElement::new();
        media.set_stream_type(Some(StreamType::Live));
        media.finish_load(f64::INFINITY);
        let mut ranges = TimeRanges::new();
        ranges.add(0.0, 100.0);
        media.set_seekable(Some(ranges));
        media.set_current_time(50.0);
        let owners = owners_with(media);
        // live_edge_offset defaults to 10, edge is 90
        assert_eq!(get_time_is_live(&owners, None), false.into());

        if let Some(media) = &owners.media {
            media.set_current_time(95.0);
        }
        assert_eq!(get_time_is_live(&owners, None), true.into());
    }

    #[test]
    fn test_empty_seekable_is_not_live() {
        let media = MediaElement::new();
        media.set_stream_type(Some(StreamType::Live));
        media.set_seekable(Some(TimeRanges::new()));
        let owners = owners_with(media);
        assert_eq!(get_time_is_live(&owners, None), false.into());
    }

    #[test]
    fn test_seek_to_live_uses_offset() {
        let media = MediaElement::new();
        media.finish_load(f64::INFINITY);
        let mut ranges = TimeRanges::new();
        ranges.add(0.0, 200.0);
        media.set_seekable(Some(ranges));
        let owners = owners_with(media);

        seek_to_live(&owners);
        let time = owners.media.as_ref().map(|m| m.current_time()).unwrap();
        assert!((time - 200.0).abs() <= owners.options.seek_to_live_offset() + 1e-9);
        assert!(time > 180.0);
    }
}
