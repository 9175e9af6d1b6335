//! Run configuration, loadable from a JSON file.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::counting::{
    CountingLine, DEFAULT_CLASS_NAMES, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_LINE_TOLERANCE,
    DEFAULT_TARGET_CLASSES, DetectionFilter,
};
use crate::tracker::TrackerConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Every recognised option. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Detector class table, indexed by class id
    pub class_names: Vec<String>,
    pub target_classes: Vec<String>,
    pub confidence_threshold: f32,
    /// `[x1, y1, x2, y2]`
    pub line: [i32; 4],
    pub line_tolerance: i32,
    pub max_age: u32,
    pub min_hits: u32,
    pub iou_threshold: f32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        let tracker = TrackerConfig::default();
        Self {
            class_names: DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            target_classes: DEFAULT_TARGET_CLASSES.iter().map(|s| s.to_string()).collect(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            line: [450, 600, 1450, 600],
            line_tolerance: DEFAULT_LINE_TOLERANCE,
            max_age: tracker.max_age,
            min_hits: tracker.min_hits,
            iou_threshold: tracker.iou_threshold,
        }
    }
}

impl CounterConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "confidence_threshold {} outside [0, 1]",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ConfigError::Invalid(format!(
                "iou_threshold {} outside [0, 1]",
                self.iou_threshold
            )));
        }
        let [x1, _, x2, _] = self.line;
        if x1 >= x2 {
            return Err(ConfigError::Invalid(format!(
                "line must run left to right, got x1={x1} x2={x2}"
            )));
        }
        if self.line_tolerance < 0 {
            return Err(ConfigError::Invalid(format!(
                "line_tolerance {} is negative",
                self.line_tolerance
            )));
        }
        if self.target_classes.is_empty() {
            return Err(ConfigError::Invalid("target_classes is empty".into()));
        }
        Ok(())
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            max_age: self.max_age,
            min_hits: self.min_hits,
            iou_threshold: self.iou_threshold,
        }
    }

    pub fn detection_filter(&self) -> DetectionFilter {
        DetectionFilter::new(
            self.class_names.clone(),
            self.target_classes.iter().cloned().collect::<HashSet<_>>(),
            self.confidence_threshold,
        )
    }

    pub fn counting_line(&self) -> CountingLine {
        CountingLine::from(self.line).with_tolerance(self.line_tolerance)
    }
}
