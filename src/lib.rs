//! DeepSORT multi-object tracking.
//!
//! The [`tracker`] module holds the tracking engine: a per-track Kalman filter,
//! appearance/motion association with a recency cascade, and the track
//! lifecycle. The [`integration`] module connects external detector and
//! appearance-encoder backends to it.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::{DetectionError, TrackerError};
pub use integration::{
    DetectionBuilder, DetectionFilter, DetectionSource, PipelineError, TrackerPipeline,
};
pub use tracker::{
    DeepSortTracker, Detection, Rect, Track, TrackReport, TrackState, TrackerConfig,
};
