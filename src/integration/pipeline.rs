//! TrackerPipeline for combining detection with tracking.

use thiserror::Error;

use crate::error::TrackerError;
use crate::tracker::{DeepSortTracker, TrackReport, TrackerConfig};

use super::{DetectionFilter, DetectionSource};

/// Failure while processing one frame through the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError<E: std::error::Error + 'static> {
    #[error("detection failed: {0}")]
    Detection(#[source] E),
    #[error("tracking failed: {0}")]
    Tracking(#[source] TrackerError),
}

/// Runs a [`DetectionSource`], filters its output and feeds the tracker.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    filter: DetectionFilter,
    tracker: DeepSortTracker,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    /// Create a new pipeline.
    ///
    /// # Arguments
    /// * `detector` - Detection and appearance backend
    /// * `filter` - Class allow-list and overlap suppression applied to its output
    /// * `config` - Tracker configuration
    pub fn new(detector: D, filter: DetectionFilter, config: TrackerConfig) -> Self {
        Self {
            detector,
            filter,
            tracker: DeepSortTracker::new(config),
        }
    }

    /// Pipeline with no class filtering, no suppression and default tracker settings.
    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, DetectionFilter::default(), TrackerConfig::default())
    }

    /// Process a single frame and return the tracks to display.
    ///
    /// On error the tracker keeps its state from the previous frame.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes, passed through to the detector
    /// * `width` - Frame width in pixels
    /// * `height` - Frame height in pixels
    ///
    /// # Returns
    /// Confirmed tracks matched on this or the previous frame
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<TrackReport>, PipelineError<D::Error>> {
        let detections = self
            .detector
            .detect(input, width, height)
            .map_err(PipelineError::Detection)?;
        let detections = self.filter.apply(detections);
        let reports = self
            .tracker
            .update(detections)
            .map_err(PipelineError::Tracking)?;

        log::debug!(
            "frame {}: {} objects being tracked",
            self.tracker.frame_id(),
            reports.len()
        );
        Ok(reports)
    }

    /// Get a reference to the detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get the preprocessing filter.
    pub fn filter(&self) -> &DetectionFilter {
        &self.filter
    }

    /// Get a reference to the tracker.
    pub fn tracker(&self) -> &DeepSortTracker {
        &self.tracker
    }

    /// Get a mutable reference to the tracker.
    pub fn tracker_mut(&mut self) -> &mut DeepSortTracker {
        &mut self.tracker
    }
}
