//! Counting layer: raw-detection filtering, line geometry and the count ledger.

mod crossing;
mod filter;
mod ledger;

pub use crossing::{CountingLine, DEFAULT_LINE_TOLERANCE, crossed, pixel_center};
pub use filter::{
    DEFAULT_CLASS_NAMES, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_TARGET_CLASSES, DetectionFilter,
    RawBox, quantize_confidence,
};
pub use ledger::{CountLedger, RecordOutcome};
