//! Trait for object detection inference backends.

use image::RgbImage;
use ndarray::Array2;

use crate::counting::RawBox;

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the counting
/// pipeline. The pipeline calls `detect` once per (masked) frame and never
/// retries or edits the output beyond the detection filter.
///
/// # Example
///
/// ```ignore
/// use linecount_rs::{DetectionSource, RawBox};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &image::RgbImage) -> Result<Vec<RawBox>, Self::Error> {
///         // Run inference and return raw boxes
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run inference on one frame and return every raw box.
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<RawBox>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to `RawBox`.
pub trait IntoRawBoxes {
    /// Convert the output into a vector of raw boxes.
    fn into_raw_boxes(self) -> Vec<RawBox>;
}

impl IntoRawBoxes for Vec<RawBox> {
    fn into_raw_boxes(self) -> Vec<RawBox> {
        self
    }
}

/// YOLO-style post-NMS table, one row per box:
/// `[x1, y1, x2, y2, confidence, class_id]`. Rows with fewer than six
/// columns or a negative class are skipped.
impl IntoRawBoxes for Array2<f32> {
    fn into_raw_boxes(self) -> Vec<RawBox> {
        if self.ncols() < 6 {
            return Vec::new();
        }
        self.rows()
            .into_iter()
            .filter(|row| row[5] >= 0.0 && row[5].is_finite())
            .map(|row| RawBox {
                x1: row[0],
                y1: row[1],
                x2: row[2],
                y2: row[3],
                confidence: row[4],
                class_id: row[5] as usize,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_array_rows_become_raw_boxes() {
        let table = array![
            [10.0_f32, 20.0, 50.0, 80.0, 0.9, 2.0],
            [0.0, 0.0, 5.0, 5.0, 0.4, -1.0],
            [1.0, 2.0, 3.0, 4.0, 0.5, 7.0],
        ];
        let boxes = table.into_raw_boxes();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].class_id, 2);
        assert_eq!(boxes[1].class_id, 7);
        assert_eq!(boxes[1].x2, 3.0);
    }

    #[test]
    fn test_narrow_table_is_empty() {
        let table = Array2::<f32>::zeros((3, 5));
        assert!(table.into_raw_boxes().is_empty());
    }
}
