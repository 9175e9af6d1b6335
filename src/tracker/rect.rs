/// Axis-aligned bounding box stored as corners.
///
/// Supports the formats the tracking pipeline moves between:
/// - TLBR: Top-Left X, Top-Left Y, Bottom-Right X, Bottom-Right Y
/// - Z: Center X, Center Y, Area (w*h), Aspect Ratio (w/h), the SORT measurement
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x1: f32,
    /// Top-left y coordinate
    pub y1: f32,
    /// Bottom-right x coordinate
    pub x2: f32,
    /// Bottom-right y coordinate
    pub y2: f32,
}

impl Rect {
    /// Create a new Rect from corner coordinates (TLBR format).
    #[inline]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a Rect from the SORT measurement `[cx, cy, area, ratio]`.
    ///
    /// A negative area or ratio yields NaN corners, which `is_valid` rejects.
    pub fn from_z(z: [f64; 4]) -> Self {
        let width = (z[2] * z[3]).sqrt();
        let height = z[2] / width;
        Self {
            x1: (z[0] - width / 2.0) as f32,
            y1: (z[1] - height / 2.0) as f32,
            x2: (z[0] + width / 2.0) as f32,
            y2: (z[1] + height / 2.0) as f32,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Convert to the SORT measurement: (center_x, center_y, area, aspect_ratio).
    pub fn to_z(&self) -> [f64; 4] {
        let w = self.width() as f64;
        let h = self.height() as f64;
        let (cx, cy) = self.center();
        let ratio = if h > 0.0 { w / h } else { 0.0 };
        [cx as f64, cy as f64, w * h, ratio]
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (
            self.x1 + self.width() / 2.0,
            self.y1 + self.height() / 2.0,
        )
    }

    /// Get the area of the bounding box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Corners are finite and the box has positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        self.to_tlbr().iter().all(|v| v.is_finite()) && self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Snap all corners toward zero onto the integer pixel grid.
    pub fn truncated(&self) -> Self {
        Self {
            x1: self.x1.trunc(),
            y1: self.y1.trunc(),
            x2: self.x2.trunc(),
            y2: self.y2.trunc(),
        }
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    pub fn iou(&self, other: &Rect) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }
}

use ndarray::Array2;

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[Rect], boxes_b: &[Rect]) -> Array2<f32> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b);
        }
    }
    ious
}
