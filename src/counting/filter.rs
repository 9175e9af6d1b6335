//! Turns raw detector output into the vehicle detections the tracker sees.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::tracker::{Detection, Rect};

/// Class table of the detector's output indices.
pub const DEFAULT_CLASS_NAMES: [&str; 8] = [
    "person",
    "bicycle",
    "car",
    "motorbike",
    "aeroplane",
    "bus",
    "train",
    "truck",
];

pub const DEFAULT_TARGET_CLASSES: [&str; 3] = ["car", "truck", "bus"];

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;

// Slack, in hundredths, for f64 rounding of the decimal value. It is far
// below any difference an f32 can express.
const QUANTIZE_SLACK: f64 = 1e-9;

/// One box exactly as the detector emitted it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Index into the detector's class table
    pub class_id: usize,
    /// Confidence in [0, 1]
    pub confidence: f32,
}

/// Round a confidence up to the next hundredth: `0.301 -> 0.31`, `0.30 -> 0.30`.
///
/// Works from the shortest decimal that round-trips to the same `f32`, so
/// `0.30f32` (stored as 0.3000000119...) stays 0.30 while the next
/// representable value above it becomes 0.31.
pub fn quantize_confidence(confidence: f32) -> f32 {
    let decimal = confidence
        .to_string()
        .parse::<f64>()
        .unwrap_or(confidence as f64);
    let hundredths = (decimal * 100.0 - QUANTIZE_SLACK).ceil();
    hundredths as f32 / 100.0
}

/// Keeps detections of the target classes whose quantized confidence is
/// strictly above the threshold.
///
/// Overlapping boxes of the same object are passed through untouched;
/// resolving them is the tracker's job.
#[derive(Debug, Clone)]
pub struct DetectionFilter {
    class_names: Vec<String>,
    target_classes: HashSet<String>,
    confidence_threshold: f32,
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            DEFAULT_TARGET_CLASSES.iter().map(|s| s.to_string()).collect(),
            DEFAULT_CONFIDENCE_THRESHOLD,
        )
    }
}

impl DetectionFilter {
    pub fn new(
        class_names: Vec<String>,
        target_classes: HashSet<String>,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            class_names,
            target_classes,
            confidence_threshold,
        }
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn target_classes(&self) -> &HashSet<String> {
        &self.target_classes
    }

    /// Resolve a class index to its label, `None` if outside the table.
    pub fn label(&self, class_id: usize) -> Option<&str> {
        self.class_names.get(class_id).map(String::as_str)
    }

    /// Apply the policy to a single raw box.
    pub fn accept(&self, raw: &RawBox) -> Option<Detection> {
        let label = self.label(raw.class_id)?;
        if !self.target_classes.contains(label) {
            return None;
        }

        let confidence = quantize_confidence(raw.confidence);
        if confidence <= self.confidence_threshold {
            return None;
        }

        let bbox = Rect::new(raw.x1, raw.y1, raw.x2, raw.y2).truncated();
        Some(Detection::from_rect(bbox, confidence, label))
    }

    pub fn filter(&self, raw: &[RawBox]) -> Vec<Detection> {
        raw.iter().filter_map(|r| self.accept(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(class_id: usize, confidence: f32) -> RawBox {
        RawBox {
            x1: 10.7,
            y1: 20.2,
            x2: 110.9,
            y2: 80.5,
            class_id,
            confidence,
        }
    }

    #[test]
    fn test_quantize_rounds_up_to_hundredths() {
        assert_eq!(quantize_confidence(0.301), 0.31);
        assert_eq!(quantize_confidence(0.30), 0.30);
        assert_eq!(quantize_confidence(0.999), 1.0);
        assert_eq!(quantize_confidence(0.0), 0.0);
        assert_eq!(quantize_confidence(0.42), 0.42);
    }

    #[test]
    fn test_quantize_rounds_up_just_above_a_hundredth() {
        assert_eq!(quantize_confidence(0.300001), 0.31);
        assert_eq!(quantize_confidence(0.3000005), 0.31);
        assert_eq!(quantize_confidence(0.4200005), 0.43);
        // Next representable f32 after 0.30
        assert_eq!(quantize_confidence(f32::from_bits(0.30f32.to_bits() + 1)), 0.31);
        assert_eq!(quantize_confidence(0.07), 0.07);
        assert_eq!(quantize_confidence(0.57), 0.57);
        assert_eq!(quantize_confidence(1.0), 1.0);
    }

    #[test]
    fn test_confidence_just_above_threshold_is_kept() {
        let filter = DetectionFilter::default();
        let out = filter.filter(&[raw(2, 0.300001)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].confidence, 0.31);
    }

    #[test]
    fn test_threshold_is_strict_after_quantization() {
        let filter = DetectionFilter::default();
        // 0.301 ceils to 0.31 and clears 0.3
        assert_eq!(filter.filter(&[raw(2, 0.301)]).len(), 1);
        // 0.30 stays 0.30 and is not strictly greater
        assert!(filter.filter(&[raw(2, 0.30)]).is_empty());
        // 0.291 ceils to 0.30, still excluded
        assert!(filter.filter(&[raw(2, 0.291)]).is_empty());
    }

    #[test]
    fn test_non_target_class_is_dropped() {
        let filter = DetectionFilter::default();
        assert!(filter.filter(&[raw(0, 0.99)]).is_empty()); // person
        assert!(filter.filter(&[raw(6, 0.99)]).is_empty()); // train
    }

    #[test]
    fn test_unknown_class_index_is_dropped() {
        let filter = DetectionFilter::default();
        assert!(filter.filter(&[raw(42, 0.99)]).is_empty());
    }

    #[test]
    fn test_accepted_detection_carries_label_and_pixels() {
        let filter = DetectionFilter::default();
        let out = filter.filter(&[raw(7, 0.874), raw(5, 0.5), raw(2, 0.9)]);
        let labels: Vec<&str> = out.iter().map(|d| d.class_label.as_str()).collect();
        assert_eq!(labels, vec!["truck", "bus", "car"]);
        assert_eq!(out[0].confidence, 0.88);
        assert_eq!(out[0].bbox.to_tlbr(), [10.0, 20.0, 110.0, 80.0]);
    }

    #[test]
    fn test_duplicates_are_not_merged() {
        let filter = DetectionFilter::default();
        assert_eq!(filter.filter(&[raw(2, 0.9), raw(2, 0.8)]).len(), 2);
    }
}
