//! Line-crossing vehicle counter.
//!
//! Per-frame detections are filtered to vehicle classes, associated across
//! frames by a SORT tracker into stable track IDs, and each ID is counted at
//! most once when its box center enters the band around a counting line.

pub mod config;
pub mod counting;
pub mod integration;
pub mod tracker;

pub use config::{ConfigError, CounterConfig};
pub use counting::{CountLedger, CountingLine, DetectionFilter, RawBox, RecordOutcome};
pub use integration::{
    AnnotatedFrameWriter, CountingPipeline, DetectionSource, FrameReport, FrameSource,
    ImageDirSource, Mask, NullSink, PipelineError, RenderSink, ReplayDetector, RunSummary,
};
pub use tracker::{Detection, Rect, SortTracker, Track, TrackRegistry, TrackerConfig};
