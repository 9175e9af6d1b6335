//! Geometry of the counting line.

use crate::tracker::{Rect, Track};

pub const DEFAULT_LINE_TOLERANCE: i32 = 15;

/// Counting line with a horizontal tolerance band of `±tolerance` around `y1`.
///
/// Only `x1`, `x2` and `y1` take part in the crossing test; `y2` is kept so the
/// line can be drawn as configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountingLine {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub tolerance: i32,
}

impl CountingLine {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            tolerance: DEFAULT_LINE_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: i32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Strictly inside `(x1, x2) x (y1 - tolerance, y1 + tolerance)`.
    pub fn contains(&self, cx: i32, cy: i32) -> bool {
        self.x1 < cx
            && cx < self.x2
            && self.y1 - self.tolerance < cy
            && cy < self.y1 + self.tolerance
    }
}

impl From<[i32; 4]> for CountingLine {
    fn from(v: [i32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// Center of a box on the integer pixel grid, halving width and height with
/// floor division.
pub fn pixel_center(bbox: &Rect) -> (i32, i32) {
    let x1 = bbox.x1 as i32;
    let y1 = bbox.y1 as i32;
    let w = bbox.x2 as i32 - x1;
    let h = bbox.y2 as i32 - y1;
    (x1 + w.div_euclid(2), y1 + h.div_euclid(2))
}

/// Whether the track's center lies in the line's band this frame.
///
/// Stateless: a track sitting in the band for many frames is reported every
/// frame, and deduplication is left to the ledger.
pub fn crossed(track: &Track, line: &CountingLine) -> bool {
    let (cx, cy) = pixel_center(&track.bbox);
    line.contains(cx, cy)
}
