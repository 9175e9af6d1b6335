//! Builder for creating RawBox objects from various box formats.

use crate::counting::RawBox;

/// Builder for creating `RawBox` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct RawBoxBuilder {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    class_id: usize,
    confidence: f32,
}

impl RawBoxBuilder {
    /// Create a new raw box builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - w / 2.0;
        self.y1 = cy - h / 2.0;
        self.x2 = cx + w / 2.0;
        self.y2 = cy + h / 2.0;
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.x1 = x;
        self.y1 = y;
        self.x2 = x + w;
        self.y2 = y + h;
        self
    }

    /// Set the detector class index.
    pub fn class_id(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    /// Set the confidence score.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Build the final `RawBox`.
    pub fn build(self) -> RawBox {
        RawBox {
            x1: self.x1,
            y1: self.y1,
            x2: self.x2,
            y2: self.y2,
            class_id: self.class_id,
            confidence: self.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_box_builder() {
        let raw = RawBoxBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .class_id(2)
            .confidence(0.95)
            .build();

        assert_eq!(raw.confidence, 0.95);
        assert_eq!(raw.class_id, 2);
        assert_eq!(raw.x2, 50.0);
    }

    #[test]
    fn test_xywh_and_tlwh_agree() {
        let a = RawBoxBuilder::new().xywh(30.0, 50.0, 40.0, 60.0).build();
        let b = RawBoxBuilder::new().tlwh(10.0, 20.0, 40.0, 60.0).build();
        assert_eq!((a.x1, a.y1, a.x2, a.y2), (b.x1, b.y1, b.x2, b.y2));
    }
}
