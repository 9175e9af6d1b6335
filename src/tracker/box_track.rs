//! Single Kalman-filtered box track, the unit of state inside the SORT tracker.

use ndarray::{Array1, Array2};

use crate::tracker::kalman_filter::{KalmanFilter, MatrixError};
use crate::tracker::rect::Rect;

/// Single object track.
#[derive(Debug, Clone)]
pub struct BoxTrack {
    /// Unique track identifier
    pub id: u64,
    /// Number of predict steps run for this track
    pub age: u32,
    /// Total number of matched detections
    pub hits: u32,
    /// Consecutive matched frames, reset by the first missed frame
    pub hit_streak: u32,
    /// Consecutive predict steps without a matched detection
    pub time_since_update: u32,
    /// Kalman filter state mean (7-dim)
    mean: Array1<f64>,
    /// Kalman filter state covariance (7x7)
    covariance: Array2<f64>,
}

impl BoxTrack {
    /// Seed a new track from an unmatched detection box.
    pub fn new(id: u64, bbox: &Rect, kalman_filter: &KalmanFilter) -> Self {
        let (mean, covariance) = kalman_filter.initiate(bbox.to_z());
        Self {
            id,
            age: 0,
            hits: 0,
            hit_streak: 0,
            time_since_update: 0,
            mean,
            covariance,
        }
    }

    /// Current box estimate from the filter state.
    pub fn rect(&self) -> Rect {
        Rect::from_z([self.mean[0], self.mean[1], self.mean[2], self.mean[3]])
    }

    /// Advance the state one frame and return the predicted box.
    pub fn predict(&mut self, kalman_filter: &KalmanFilter) -> Rect {
        // Keep the predicted area from going negative.
        if self.mean[6] + self.mean[2] <= 0.0 {
            self.mean[6] = 0.0;
        }

        let (mean, covariance) = kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;

        self.age += 1;
        if self.time_since_update > 0 {
            self.hit_streak = 0;
        }
        self.time_since_update += 1;

        self.rect()
    }

    /// Correct the state with a matched detection box.
    pub fn update(&mut self, bbox: &Rect, kalman_filter: &KalmanFilter) -> Result<(), MatrixError> {
        let (mean, covariance) = kalman_filter.update(&self.mean, &self.covariance, bbox.to_z())?;
        self.mean = mean;
        self.covariance = covariance;

        self.time_since_update = 0;
        self.hits += 1;
        self.hit_streak += 1;
        Ok(())
    }
}
