//! Detector that replays detections recorded to a JSON Lines file.
//!
//! Line N holds a JSON array of raw boxes for frame N. Blank lines and
//! frames past the end of the file have no detections.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use image::RgbImage;
use thiserror::Error;
use tracing::debug;

use super::DetectionSource;
use crate::counting::RawBox;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed detections on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub struct ReplayDetector<R: BufRead = BufReader<File>> {
    lines: Lines<R>,
    line_no: usize,
    exhausted: bool,
}

impl ReplayDetector {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplayDetector<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            exhausted: false,
        }
    }
}

impl<R: BufRead> DetectionSource for ReplayDetector<R> {
    type Error = ReplayError;

    fn detect(&mut self, _frame: &RgbImage) -> Result<Vec<RawBox>, Self::Error> {
        if self.exhausted {
            return Ok(Vec::new());
        }
        let Some(line) = self.lines.next().transpose()? else {
            debug!(line = self.line_no, "detection log exhausted");
            self.exhausted = true;
            return Ok(Vec::new());
        };
        self.line_no += 1;

        let line = line.trim();
        if line.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(line).map_err(|source| ReplayError::Parse {
            line: self.line_no,
            source,
        })
    }
}
