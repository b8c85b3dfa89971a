//! Integration module for connecting detection and appearance backends with the tracker.
//!
//! The detector and the appearance encoder are external collaborators: this
//! module defines the seam they plug into, the preprocessing applied to their
//! output, and a pipeline that runs both against a [`DeepSortTracker`].
//!
//! [`DeepSortTracker`]: crate::tracker::DeepSortTracker

mod builder;
mod detector;
mod pipeline;
mod preprocessing;

pub use builder::DetectionBuilder;
pub use detector::DetectionSource;
pub use pipeline::{PipelineError, TrackerPipeline};
pub use preprocessing::{DetectionFilter, non_max_suppression};
