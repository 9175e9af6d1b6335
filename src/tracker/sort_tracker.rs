//! SORT (Simple Online and Realtime Tracking) multi-object tracker.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::tracker::box_track::BoxTrack;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::rect::{Rect, iou_batch};
use crate::tracker::registry::{Track, TrackRegistry};

/// Configuration for the SortTracker.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Frames a track may go unmatched before it is retired
    pub max_age: u32,
    /// Consecutive matches before a new track is reported
    pub min_hits: u32,
    /// Minimum IoU for a track/detection pairing to be accepted
    pub iou_threshold: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 20,
            min_hits: 3,
            iou_threshold: 0.3,
        }
    }
}

/// Kalman prediction + IoU assignment tracker.
///
/// IDs start at 1 and are issued per tracker instance in creation order, so
/// two trackers fed the same detections agree on every ID.
///
/// New tracks are not debounced during the first `min_hits` frames: anything
/// matched or seeded then is reported at once, including a detection seen in
/// only one frame. After warm-up a track needs `min_hits` consecutive matches.
#[derive(Debug, Clone)]
pub struct SortTracker {
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
    tracks: BTreeMap<u64, BoxTrack>,
    next_id: u64,
    frame_count: u32,
}

impl SortTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            kalman_filter: KalmanFilter::default(),
            tracks: BTreeMap::new(),
            next_id: 1,
            frame_count: 0,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of `update` calls since creation or the last `reset`.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Live tracks, including ones not yet reported.
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Drop every track and restart ID assignment at 1.
    pub fn reset(&mut self) {
        self.tracks.clear();
        self.next_id = 1;
        self.frame_count = 0;
    }

    pub fn update(&mut self, detections: &[Detection]) -> Vec<Track> {
        self.frame_count += 1;

        // Step 1: Predict every track forward, dropping degenerate ones
        let mut track_ids = Vec::with_capacity(self.tracks.len());
        let mut predicted = Vec::with_capacity(self.tracks.len());
        let mut degenerate = Vec::new();
        for (&id, track) in self.tracks.iter_mut() {
            let rect = track.predict(&self.kalman_filter);
            if rect.is_valid() {
                track_ids.push(id);
                predicted.push(rect);
            } else {
                degenerate.push(id);
            }
        }
        for id in degenerate {
            debug!(track_id = id, "dropping track with degenerate prediction");
            self.tracks.remove(&id);
        }

        // Step 2: Associate predictions with detections
        let det_rects: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
        let ious = iou_batch(&predicted, &det_rects);

        let AssignmentResult {
            matches,
            unmatched_detections,
            ..
        } = matching::linear_assignment(&ious, self.config.iou_threshold);

        // Step 3: Correct matched tracks
        let mut failed = Vec::new();
        for (itrack, idet) in matches {
            let id = track_ids[itrack];
            if let Some(track) = self.tracks.get_mut(&id) {
                if let Err(err) = track.update(&detections[idet].bbox, &self.kalman_filter) {
                    warn!(track_id = id, error = %err, "dropping track after failed correction");
                    failed.push(id);
                }
            }
        }
        for id in failed {
            self.tracks.remove(&id);
        }

        // Step 4: Seed new tracks from unmatched detections
        for idet in unmatched_detections {
            let id = self.next_id;
            self.next_id += 1;
            self.tracks
                .insert(id, BoxTrack::new(id, &detections[idet].bbox, &self.kalman_filter));
            debug!(track_id = id, "new candidate track");
        }

        // Step 5: Retire stale tracks
        let max_age = self.config.max_age;
        self.tracks.retain(|&id, track| {
            let alive = track.time_since_update <= max_age;
            if !alive {
                debug!(track_id = id, "retiring track");
            }
            alive
        });

        // Step 6: Report confirmed tracks seen this frame. During the first
        // `min_hits` frames everything seen is reported.
        let min_hits = self.config.min_hits;
        let warming_up = self.frame_count <= min_hits;
        self.tracks
            .values()
            .filter(|t| t.time_since_update == 0 && (warming_up || t.hit_streak >= min_hits))
            .map(|t| Track::new(t.id, t.rect()))
            .collect()
    }
}

impl Default for SortTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl TrackRegistry for SortTracker {
    fn update(&mut self, detections: &[Detection]) -> Vec<Track> {
        SortTracker::update(self, detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection::new(x1, y1, x2, y2, 0.9, "car")
    }

    #[test]
    fn test_first_frame_reports_during_warm_up() {
        let mut tracker = SortTracker::default();
        let tracks = tracker.update(&[det(0.0, 0.0, 50.0, 50.0), det(100.0, 100.0, 150.0, 150.0)]);
        let ids: Vec<u64> = tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_empty_update_ages_tracks() {
        let mut tracker = SortTracker::new(TrackerConfig {
            max_age: 1,
            ..TrackerConfig::default()
        });
        tracker.update(&[det(0.0, 0.0, 50.0, 50.0)]);
        assert_eq!(tracker.num_tracks(), 1);

        assert!(tracker.update(&[]).is_empty());
        assert_eq!(tracker.num_tracks(), 1);
        assert!(tracker.update(&[]).is_empty());
        assert_eq!(tracker.num_tracks(), 0);
        assert_eq!(tracker.frame_count(), 3);
    }

    #[test]
    fn test_reset_restarts_ids() {
        let mut tracker = SortTracker::default();
        tracker.update(&[det(0.0, 0.0, 50.0, 50.0)]);
        tracker.reset();
        assert_eq!(tracker.num_tracks(), 0);
        let tracks = tracker.update(&[det(300.0, 300.0, 350.0, 350.0)]);
        assert_eq!(tracks[0].id, 1);
    }

    #[test]
    fn test_non_overlapping_detection_starts_new_track() {
        let mut tracker = SortTracker::default();
        tracker.update(&[det(0.0, 0.0, 50.0, 50.0)]);
        let tracks = tracker.update(&[det(400.0, 400.0, 450.0, 450.0)]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, 2);
        assert_eq!(tracker.num_tracks(), 2);
    }
}
