//! Matching utilities for multi-object tracking.

use crate::tracker::rect::Rect;
use ndarray::Array2;

/// A filtered detection handed to the tracker for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in TLBR format (x1, y1, x2, y2)
    pub bbox: Rect,
    /// Detection confidence, in (0, 1]
    pub confidence: f32,
    /// Resolved class label, e.g. "car"
    pub class_label: String,
}

impl Detection {
    pub fn new(
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        confidence: f32,
        class_label: impl Into<String>,
    ) -> Self {
        Self {
            bbox: Rect::new(x1, y1, x2, y2),
            confidence,
            class_label: class_label.into(),
        }
    }

    pub fn from_rect(bbox: Rect, confidence: f32, class_label: impl Into<String>) -> Self {
        Self {
            bbox,
            confidence,
            class_label: class_label.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// `(track_index, detection_index)` pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Solve the track/detection assignment on an IoU matrix of shape
/// (tracks, detections).
///
/// The assignment maximises total IoU; any assigned pair whose IoU falls
/// below `iou_threshold` is split back into an unmatched track and an
/// unmatched detection.
pub fn linear_assignment(ious: &Array2<f32>, iou_threshold: f32) -> AssignmentResult {
    let (num_rows, num_cols) = ious.dim();

    if num_rows == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: vec![],
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    if num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: vec![],
        };
    }

    // lapjv needs a square matrix; padding cells cost more than any real pair.
    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), 1e6);

    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = 1.0 - ious[[i, j]] as f64;
        }
    }

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row_idx, &col_idx) in row_to_col.iter().enumerate() {
                if row_idx >= num_rows {
                    continue;
                }
                if col_idx >= num_cols {
                    unmatched_tracks.push(row_idx);
                } else if ious[[row_idx, col_idx]] >= iou_threshold {
                    matches.push((row_idx, col_idx));
                    unmatched_detections_mask[col_idx] = false;
                } else {
                    unmatched_tracks.push(row_idx);
                }
            }
        }
        Err(err) => {
            tracing::warn!(error = ?err, "assignment solver failed, leaving frame unmatched");
            unmatched_tracks = (0..num_rows).collect();
        }
    }

    let unmatched_detections: Vec<usize> = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}
