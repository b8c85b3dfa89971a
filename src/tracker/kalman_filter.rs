//! Constant-velocity Kalman filter over bounding boxes.
//!
//! The state is `[cx, cy, a, h, vcx, vcy, va, vh]`; measurements are the first
//! four components. Noise is scaled by the box height so precision follows the
//! object's apparent size.

use nalgebra::{Matrix4, Vector4};
use ndarray::{Array1, Array2};

use crate::error::KalmanError;

/// 0.95 quantile of the chi-square distribution with 4 degrees of freedom.
pub const CHI2INV95_4DOF: f64 = 9.4877;

const STATE_DIM: usize = 8;
const MEASUREMENT_DIM: usize = 4;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    std_weight_position: f64,
    std_weight_velocity: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let mut motion_mat = Array2::eye(STATE_DIM);
        for i in 0..MEASUREMENT_DIM {
            motion_mat[[i, MEASUREMENT_DIM + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((MEASUREMENT_DIM, STATE_DIM));
        for i in 0..MEASUREMENT_DIM {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
        }
    }

    /// Track state for an unassociated measurement: zero velocity, wide
    /// velocity uncertainty.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(STATE_DIM);
        for (i, value) in measurement.iter().enumerate() {
            mean[i] = *value;
        }

        let h = measurement[3];
        let (wp, wv) = (self.std_weight_position, self.std_weight_velocity);
        let std = [
            2.0 * wp * h,
            2.0 * wp * h,
            1e-2,
            2.0 * wp * h,
            10.0 * wv * h,
            10.0 * wv * h,
            1e-5,
            10.0 * wv * h,
        ];

        (mean, diag(&std))
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let h = mean[3];
        let (wp, wv) = (self.std_weight_position, self.std_weight_velocity);
        let motion_cov = diag(&[wp * h, wp * h, 1e-2, wp * h, wv * h, wv * h, 1e-5, wv * h]);

        let new_mean = self.motion_mat.dot(mean);
        let new_covariance =
            self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + motion_cov;

        (new_mean, new_covariance)
    }

    /// Project the state distribution into measurement space. Measurement
    /// noise uses the height of the given (predicted) mean.
    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let h = mean[3];
        let wp = self.std_weight_position;
        let innovation_cov = diag(&[wp * h, wp * h, 1e-1, wp * h]);

        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + innovation_cov;

        (mean_proj, covariance_proj)
    }

    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Result<(Array1<f64>, Array2<f64>), KalmanError> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        let innovation = Array1::from_vec(measurement.to_vec()) - projected_mean;

        // K = P H^T S^-1, with H = [I 0] so P H^T is the left 8x4 block of P.
        let s_inv = from_matrix4(&to_matrix4(&projected_cov).try_inverse().ok_or(KalmanError)?);
        let kalman_gain = covariance.dot(&self.update_mat.t()).dot(&s_inv);

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        Ok((new_mean, new_covariance))
    }

    /// Squared Mahalanobis distance between the projected state and each
    /// measurement. Compare against [`CHI2INV95_4DOF`].
    pub fn gating_distance(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurements: &[[f64; 4]],
    ) -> Result<Vec<f64>, KalmanError> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        let cholesky = to_matrix4(&projected_cov).cholesky().ok_or(KalmanError)?;

        Ok(measurements
            .iter()
            .map(|m| {
                let d = Vector4::from_fn(|i, _| m[i] - projected_mean[i]);
                d.dot(&cholesky.solve(&d))
            })
            .collect())
    }

    /// Whether the state can still be gated and updated: every entry is
    /// finite and the projected covariance is positive definite.
    pub fn is_well_conditioned(&self, mean: &Array1<f64>, covariance: &Array2<f64>) -> bool {
        if mean.iter().chain(covariance.iter()).any(|v| !v.is_finite()) {
            return false;
        }
        let (_, projected_cov) = self.project(mean, covariance);
        to_matrix4(&projected_cov).cholesky().is_some()
    }
}

fn diag(std: &[f64]) -> Array2<f64> {
    let mut cov = Array2::zeros((std.len(), std.len()));
    for (i, s) in std.iter().enumerate() {
        cov[[i, i]] = s * s;
    }
    cov
}

fn to_matrix4(m: &Array2<f64>) -> Matrix4<f64> {
    Matrix4::from_fn(|i, j| m[[i, j]])
}

fn from_matrix4(m: &Matrix4<f64>) -> Array2<f64> {
    Array2::from_shape_fn((MEASUREMENT_DIM, MEASUREMENT_DIM), |(i, j)| m[(i, j)])
}
