//! CountingPipeline driving mask → detect → filter → track → cross → count.

use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{DetectionSource, FrameSource, Mask, MaskError, RenderError, RenderSink};
use crate::config::CounterConfig;
use crate::counting::{CountLedger, CountingLine, DetectionFilter, crossed};
use crate::tracker::{SortTracker, Track, TrackRegistry};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("detector failed: {0}")]
    Detector(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    Mask(#[from] MaskError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

/// What happened in one processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Zero-based index of the frame in the run
    pub frame_index: u64,
    /// Detections that passed the filter
    pub detections: usize,
    /// Tracks reported by the registry this frame
    pub tracks: Vec<Track>,
    /// Track IDs counted for the first time this frame
    pub crossings: Vec<u64>,
    /// Running total after this frame
    pub total: usize,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub total: usize,
}

/// Frame-synchronous counting pipeline.
///
/// Owns the count ledger, the line and the track registry; every frame is
/// fully processed before the next one is pulled.
pub struct CountingPipeline<D: DetectionSource, R: TrackRegistry = SortTracker> {
    detector: D,
    registry: R,
    filter: DetectionFilter,
    line: CountingLine,
    ledger: CountLedger,
    mask: Option<Mask>,
    frame_limit: Option<u64>,
    frame_index: u64,
}

impl<D: DetectionSource> CountingPipeline<D, SortTracker> {
    /// Build a pipeline with a SORT tracker configured from `config`.
    pub fn from_config(detector: D, config: &CounterConfig) -> Self {
        Self::new(
            detector,
            SortTracker::new(config.tracker_config()),
            config.detection_filter(),
            config.counting_line(),
        )
    }
}

impl<D: DetectionSource, R: TrackRegistry> CountingPipeline<D, R> {
    pub fn new(detector: D, registry: R, filter: DetectionFilter, line: CountingLine) -> Self {
        Self {
            detector,
            registry,
            filter,
            line,
            ledger: CountLedger::new(),
            mask: None,
            frame_limit: None,
            frame_index: 0,
        }
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Stop `run` after this many frames.
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn ledger(&self) -> &CountLedger {
        &self.ledger
    }

    pub fn total(&self) -> usize {
        self.ledger.total()
    }

    pub fn line(&self) -> &CountingLine {
        &self.line
    }

    /// Frames processed so far.
    pub fn frames_processed(&self) -> u64 {
        self.frame_index
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Process a single frame.
    ///
    /// The registry is updated even when nothing is detected so that
    /// unmatched tracks keep aging.
    pub fn process_frame(&mut self, frame: &RgbImage) -> Result<FrameReport, PipelineError> {
        let raw = match &self.mask {
            Some(mask) => {
                let masked = mask.apply(frame)?;
                self.detector.detect(&masked)
            }
            None => self.detector.detect(frame),
        }
        .map_err(|e| PipelineError::Detector(Box::new(e)))?;

        let detections = self.filter.filter(&raw);
        let tracks = self.registry.update(&detections);

        let mut crossings = Vec::new();
        for track in &tracks {
            let outcome = self.ledger.record(track.id, crossed(track, &self.line));
            if outcome.counted {
                info!(
                    track_id = track.id,
                    total = outcome.total,
                    frame = self.frame_index,
                    "vehicle counted"
                );
                crossings.push(track.id);
            }
        }

        let report = FrameReport {
            frame_index: self.frame_index,
            detections: detections.len(),
            tracks,
            crossings,
            total: self.ledger.total(),
        };
        debug!(
            frame = report.frame_index,
            raw = raw.len(),
            detections = report.detections,
            tracks = report.tracks.len(),
            "frame processed"
        );
        self.frame_index += 1;
        Ok(report)
    }

    /// Pull and process frames until the stream ends, a frame fails to read,
    /// the frame limit is hit or `stop` is raised.
    ///
    /// `stop` is polled once per frame boundary, never mid-frame.
    pub fn run<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        stop: &AtomicBool,
    ) -> Result<RunSummary, PipelineError>
    where
        S: FrameSource + ?Sized,
        K: RenderSink + ?Sized,
    {
        let mut frames = 0u64;
        loop {
            if stop.load(Ordering::SeqCst) {
                info!("stop requested, shutting down");
                break;
            }
            if self.frame_limit.is_some_and(|limit| frames >= limit) {
                info!(frames, "frame limit reached");
                break;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("end of stream");
                    break;
                }
                Err(err) => {
                    warn!(error = %err, "failed to read frame, treating as end of stream");
                    break;
                }
            };

            let report = self.process_frame(&frame)?;
            sink.render(&frame, &report, &self.line)?;
            frames += 1;
        }

        let summary = RunSummary {
            frames,
            total: self.ledger.total(),
        };
        info!(frames = summary.frames, total = summary.total, "run finished");
        Ok(summary)
    }
}
