//! The contract the counting pipeline relies on from a multi-object tracker.

use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;

/// A confirmed object reported by a [`TrackRegistry`] for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    /// Stable identity, never reused by the registry that issued it.
    pub id: u64,
    pub bbox: Rect,
}

impl Track {
    pub fn new(id: u64, bbox: Rect) -> Self {
        Self { id, bbox }
    }
}

/// Stateful identity service turning per-frame detections into stable tracks.
///
/// Implementations must:
/// - be called exactly once per frame, including frames with no detections,
///   so that unmatched tracks age out;
/// - only report a new object after it has been matched on consecutive frames
///   (debounced creation);
/// - retire tracks left unmatched past a bounded age and never hand out a
///   retired ID again;
/// - produce identical output for identical detection sequences.
///
/// Callers treat `Track::id` as an opaque key and never infer identity from
/// box geometry.
pub trait TrackRegistry {
    fn update(&mut self, detections: &[Detection]) -> Vec<Track>;
}
