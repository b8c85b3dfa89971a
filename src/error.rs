//! Error types for the tracker.

use thiserror::Error;

/// Reasons a single detection is rejected before it enters matching.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("box has non-finite coordinates")]
    NonFiniteBox,
    #[error("degenerate box: width {width}, height {height}")]
    DegenerateBox { width: f32, height: f32 },
    #[error("embedding has {actual} dimensions, expected {expected}")]
    EmbeddingLength { expected: usize, actual: usize },
    #[error("embedding contains non-finite values")]
    NonFiniteEmbedding,
}

/// Failure of a whole tracking cycle. The tracker state is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    #[error("innovation covariance of track {track_id} is not invertible")]
    SingularInnovation { track_id: u64 },
    #[error("no unused track ids left")]
    IdsExhausted,
}

/// Motion model failure, mapped to [`TrackerError`] by the caller who knows the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("projected covariance is not positive definite")]
pub struct KalmanError;
