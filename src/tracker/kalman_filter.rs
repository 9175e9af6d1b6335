//! Constant-velocity Kalman filter over the SORT box state, using ndarray with
//! a nalgebra-based 4x4 inverse.
//!
//! State (7-dim): `[cx, cy, s, r, vx, vy, vs]` where `s` is the box area and
//! `r` the aspect ratio. The aspect ratio is treated as constant.

use ndarray::{Array1, Array2};
use thiserror::Error;

const DIM_X: usize = 7;
const DIM_Z: usize = 4;

/// The innovation covariance could not be inverted.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("innovation covariance matrix is singular")]
pub struct MatrixError;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    /// Diagonal of the initial state covariance
    initial_var: [f64; DIM_X],
    /// Diagonal of the process noise covariance
    process_var: [f64; DIM_X],
    /// Diagonal of the measurement noise covariance
    measurement_var: [f64; DIM_Z],
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        // cx, cy and s advance by their velocities; r has none.
        let mut motion_mat = Array2::eye(DIM_X);
        for i in 0..3 {
            motion_mat[[i, DIM_Z + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((DIM_Z, DIM_X));
        for i in 0..DIM_Z {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            initial_var: [10.0, 10.0, 10.0, 10.0, 10_000.0, 10_000.0, 10_000.0],
            process_var: [1.0, 1.0, 1.0, 1.0, 0.01, 0.01, 0.0001],
            measurement_var: [1.0, 1.0, 10.0, 10.0],
        }
    }

    /// Create a track state from an unassociated measurement.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(DIM_X);
        for i in 0..DIM_Z {
            mean[i] = measurement[i];
        }
        (mean, diagonal(&self.initial_var))
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let new_mean = self.motion_mat.dot(mean);
        let new_covariance = self.motion_mat.dot(covariance).dot(&self.motion_mat.t())
            + diagonal(&self.process_var);

        (new_mean, new_covariance)
    }

    /// Project the state distribution into measurement space.
    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj = self.update_mat.dot(covariance).dot(&self.update_mat.t())
            + diagonal(&self.measurement_var);

        (mean_proj, covariance_proj)
    }

    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Result<(Array1<f64>, Array2<f64>), MatrixError> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let measurement_arr = Array1::from_vec(measurement.to_vec());
        let innovation = measurement_arr - projected_mean;

        // K = P * H^T * S^-1, with S the projected covariance (4x4).
        let s_inv = invert_4x4(&projected_cov)?;

        let pht = covariance.dot(&self.update_mat.t()); // 7x4
        let kalman_gain = pht.dot(&s_inv); // 7x4

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&self.update_mat).dot(covariance);

        Ok((new_mean, new_covariance))
    }
}

fn diagonal<const N: usize>(values: &[f64; N]) -> Array2<f64> {
    Array2::from_diag(&Array1::from_vec(values.to_vec()))
}

/// Invert a 4x4 matrix using nalgebra (pure Rust).
fn invert_4x4(m: &Array2<f64>) -> Result<Array2<f64>, MatrixError> {
    let mut nm = nalgebra::Matrix4::zeros();
    for i in 0..4 {
        for j in 0..4 {
            nm[(i, j)] = m[[i, j]];
        }
    }
    let inv = nm.try_inverse().ok_or(MatrixError)?;
    let mut res = Array2::zeros((4, 4));
    for i in 0..4 {
        for j in 0..4 {
            res[[i, j]] = inv[(i, j)];
        }
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_initiate() {
        let kf = KalmanFilter::new();
        let (mean, cov) = kf.initiate([100.0, 200.0, 5000.0, 0.5]);
        assert_eq!(mean[0], 100.0);
        assert_eq!(mean[3], 0.5);
        assert_eq!(mean[4], 0.0);
        assert_eq!(cov[[4, 4]], 10_000.0);
    }

    #[test]
    fn test_predict_applies_velocity() {
        let kf = KalmanFilter::new();
        let (mut mean, cov) = kf.initiate([100.0, 200.0, 5000.0, 0.5]);
        mean[4] = 7.0;
        mean[6] = -10.0;
        let (predicted, _) = kf.predict(&mean, &cov);
        assert_eq!(predicted[0], 107.0);
        assert_eq!(predicted[2], 4990.0);
        assert_eq!(predicted[3], 0.5);
    }

    #[test]
    fn test_update_moves_toward_measurement() {
        let kf = KalmanFilter::new();
        let (mean, cov) = kf.initiate([100.0, 100.0, 400.0, 1.0]);
        let (mean, cov) = kf.predict(&mean, &cov);
        let (updated, _) = kf.update(&mean, &cov, [110.0, 100.0, 400.0, 1.0]).unwrap();

        // Position variance dwarfs measurement noise, so the fix nearly snaps.
        assert!(updated[0] > 109.0 && updated[0] <= 110.0);
        // Velocity picks up most of the displacement.
        assert!(updated[4] > 9.0);
        assert_abs_diff_eq!(updated[1], 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_singular_matrix_is_reported() {
        let m = Array2::<f64>::zeros((4, 4));
        assert_eq!(invert_4x4(&m), Err(MatrixError));
    }
}
