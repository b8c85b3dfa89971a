//! A single maintained object identity.

use ndarray::{Array1, Array2};

use crate::error::KalmanError;
use crate::tracker::detection::Detection;
use crate::tracker::gallery::Gallery;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Single object track with state space `(cx, cy, a, h)` and their velocities.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track identifier, never reused
    pub track_id: u64,
    pub state: TrackState,
    /// Number of successful matches, including the detection that created the track
    pub hits: u32,
    /// Frames since creation
    pub age: u32,
    /// Frames since the last successful match
    pub time_since_update: u32,
    /// Class of the most recently matched detection
    pub class_label: String,
    /// Confidence of the most recently matched detection
    pub confidence: f32,
    /// Kalman filter state mean (8-dim)
    pub mean: Array1<f64>,
    /// Kalman filter state covariance (8x8)
    pub covariance: Array2<f64>,
    pub gallery: Gallery,
}

impl Track {
    /// Start a tentative track from an unmatched detection.
    pub fn new(
        track_id: u64,
        detection: Detection,
        kalman_filter: &KalmanFilter,
        gallery_capacity: usize,
    ) -> Self {
        let (mean, covariance) = kalman_filter.initiate(detection.to_xyah());
        let mut gallery = Gallery::new(gallery_capacity);
        gallery.push(detection.embedding);

        Self {
            track_id,
            state: TrackState::Tentative,
            hits: 1,
            age: 1,
            time_since_update: 0,
            class_label: detection.class_label,
            confidence: detection.confidence,
            mean,
            covariance,
            gallery,
        }
    }

    /// Current box estimate from the filter mean.
    pub fn rect(&self) -> Rect {
        Rect::from_xyah(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    pub fn tlbr(&self) -> [f32; 4] {
        self.rect().to_tlbr()
    }

    /// Advance the state one frame.
    pub fn predict(&mut self, kalman_filter: &KalmanFilter) {
        let (mean, covariance) = kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
        self.age += 1;
        self.time_since_update += 1;
    }

    /// Correct the state with a matched detection and absorb its appearance.
    pub fn update(
        &mut self,
        detection: Detection,
        kalman_filter: &KalmanFilter,
        n_init: u32,
    ) -> Result<(), KalmanError> {
        let (mean, covariance) =
            kalman_filter.update(&self.mean, &self.covariance, detection.to_xyah())?;
        self.mean = mean;
        self.covariance = covariance;

        self.gallery.push(detection.embedding);
        self.class_label = detection.class_label;
        self.confidence = detection.confidence;
        self.hits += 1;
        self.time_since_update = 0;

        if self.state == TrackState::Tentative && self.hits >= n_init {
            self.state = TrackState::Confirmed;
        }
        Ok(())
    }

    /// Record a frame without an associated detection.
    ///
    /// Tentative tracks die on their first miss. Confirmed tracks die once
    /// they have gone unmatched for more than `max_age` frames, or when the
    /// predicted box has left the frame.
    pub fn mark_missed(&mut self, max_age: u32, frame_size: Option<(f32, f32)>) {
        let left_frame = frame_size.is_some_and(|(w, h)| self.rect().is_outside_frame(w, h));
        if self.state == TrackState::Tentative || self.time_since_update > max_age || left_frame {
            self.state = TrackState::Deleted;
        }
    }

    #[inline]
    pub fn is_tentative(&self) -> bool {
        self.state == TrackState::Tentative
    }

    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.state == TrackState::Deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn detection(x: f32, y: f32) -> Detection {
        Detection::new(Rect::new(x, y, 50.0, 100.0), 0.9, "person", array![1.0, 0.0])
    }

    #[test]
    fn test_new_track() {
        let kf = KalmanFilter::new();
        let track = Track::new(7, detection(10.0, 20.0), &kf, 4);

        assert_eq!(track.track_id, 7);
        assert!(track.is_tentative());
        assert_eq!((track.hits, track.age, track.time_since_update), (1, 1, 0));
        assert_eq!(track.gallery.len(), 1);
        let [x1, y1, x2, y2] = track.tlbr();
        assert!((x1 - 10.0).abs() < 1e-3 && (y1 - 20.0).abs() < 1e-3);
        assert!((x2 - 60.0).abs() < 1e-3 && (y2 - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_confirmation_after_n_init() {
        let kf = KalmanFilter::new();
        let mut track = Track::new(1, detection(10.0, 20.0), &kf, 4);

        for frame in 1..3 {
            track.predict(&kf);
            assert_eq!(track.time_since_update, 1);
            track.update(detection(10.0 + frame as f32, 20.0), &kf, 3).unwrap();
            assert_eq!(track.time_since_update, 0);
        }
        assert!(track.is_confirmed());
        assert_eq!(track.hits, 3);
        assert_eq!(track.age, 3);
    }

    #[test]
    fn test_tentative_dies_on_miss() {
        let kf = KalmanFilter::new();
        let mut track = Track::new(1, detection(10.0, 20.0), &kf, 4);
        track.predict(&kf);
        track.mark_missed(30, None);
        assert!(track.is_deleted());
    }

    #[test]
    fn test_confirmed_survives_until_max_age() {
        let kf = KalmanFilter::new();
        let mut track = Track::new(1, detection(10.0, 20.0), &kf, 4);
        track.state = TrackState::Confirmed;

        for _ in 0..3 {
            track.predict(&kf);
            track.mark_missed(3, None);
            assert!(track.is_confirmed());
        }
        track.predict(&kf);
        track.mark_missed(3, None);
        assert!(track.is_deleted());
    }

    #[test]
    fn test_confirmed_deleted_when_leaving_frame() {
        let kf = KalmanFilter::new();
        let mut track = Track::new(1, detection(700.0, 20.0), &kf, 4);
        track.state = TrackState::Confirmed;
        track.predict(&kf);

        track.mark_missed(30, Some((1920.0, 1080.0)));
        assert!(track.is_confirmed());
        track.mark_missed(30, Some((640.0, 480.0)));
        assert!(track.is_deleted());
    }
}
