//! Integration module connecting frame sources, detection backends and
//! render sinks to the counting core.
//!
//! This module provides the traits at each external seam plus the
//! `CountingPipeline` that drives one frame at a time through them.

mod builder;
mod detector;
mod frame_source;
mod mask;
mod pipeline;
mod render;
mod replay;

pub use builder::RawBoxBuilder;
pub use detector::{DetectionSource, IntoRawBoxes};
pub use frame_source::{FrameError, FrameSource, ImageDirSource, IterSource};
pub use mask::{Mask, MaskError};
pub use pipeline::{CountingPipeline, FrameReport, PipelineError, RunSummary};
pub use render::{AnnotatedFrameWriter, NullSink, RenderError, RenderSink};
pub use replay::{ReplayDetector, ReplayError};
