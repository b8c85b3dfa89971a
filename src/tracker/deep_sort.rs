//! Multi-target tracker driving one predict/associate/update cycle per frame.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::tracker::detection::Detection;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, AssignmentResult};
use crate::tracker::track::Track;
use crate::tracker::track_state::TrackState;

/// Configuration for the DeepSortTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Largest cosine distance accepted for an appearance match
    pub max_cosine_distance: f32,
    /// Largest `1 - IOU` accepted for an overlap match
    pub max_iou_distance: f32,
    /// Consecutive misses before a confirmed track is deleted
    pub max_age: u32,
    /// Consecutive hits before a track is confirmed
    pub n_init: u32,
    /// Embeddings kept per track
    pub gallery_capacity: usize,
    /// Expected embedding length
    pub embedding_dim: usize,
    /// Frame `(width, height)`; confirmed tracks predicted fully outside it are deleted
    pub frame_size: Option<(f32, f32)>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_cosine_distance: 0.4,
            max_iou_distance: 0.7,
            max_age: 30,
            n_init: 3,
            gallery_capacity: 100,
            embedding_dim: 128,
            frame_size: None,
        }
    }
}

/// Per-frame output for one visible confirmed track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackReport {
    pub track_id: u64,
    /// (x_min, y_min, x_max, y_max) in pixels
    pub tlbr: [f32; 4],
    pub class_label: String,
}

impl From<&Track> for TrackReport {
    fn from(track: &Track) -> Self {
        Self {
            track_id: track.track_id,
            tlbr: track.tlbr(),
            class_label: track.class_label.clone(),
        }
    }
}

pub struct DeepSortTracker {
    tracks: Vec<Track>,
    next_id: u64,
    frame_id: u64,
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
}

impl DeepSortTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 1,
            frame_id: 0,
            config,
            kalman_filter: KalmanFilter::default(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// All live tracks, tentative ones included.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of frames processed successfully.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Run one full cycle on the frame's detections and report the visible
    /// confirmed tracks.
    ///
    /// Invalid detections are dropped with a warning. Tracks whose motion
    /// state can no longer be gated are deleted with a warning instead of
    /// failing the frame. If the cycle fails, the tracker is left exactly as
    /// it was after the previous frame.
    pub fn update(&mut self, detections: Vec<Detection>) -> Result<Vec<TrackReport>, TrackerError> {
        let detections = self.accept_detections(detections);
        let kf = &self.kalman_filter;

        // Work on a copy and commit only once the whole cycle succeeded.
        let mut tracks = self.tracks.clone();
        for track in tracks.iter_mut() {
            track.predict(kf);
            if !kf.is_well_conditioned(&track.mean, &track.covariance) {
                log::warn!(
                    "frame {}: track {} has an unusable motion state, deleting it",
                    self.frame_id + 1,
                    track.track_id
                );
                track.state = TrackState::Deleted;
            }
        }
        tracks.retain(|t| !t.is_deleted());

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::associate(kf, &self.config, &tracks, &detections);

        let mut detections: Vec<Option<Detection>> = detections.into_iter().map(Some).collect();

        for (track_idx, det_idx) in matches {
            let Some(detection) = detections[det_idx].take() else {
                unreachable!("detection {det_idx} matched twice");
            };
            let track = &mut tracks[track_idx];
            let was_tentative = track.is_tentative();
            track
                .update(detection, kf, self.config.n_init)
                .map_err(|_| TrackerError::SingularInnovation {
                    track_id: track.track_id,
                })?;
            if was_tentative && track.is_confirmed() {
                log::debug!("track {} confirmed", track.track_id);
            }
        }

        for track_idx in unmatched_tracks {
            let track = &mut tracks[track_idx];
            track.mark_missed(self.config.max_age, self.config.frame_size);
            if track.is_deleted() {
                log::debug!(
                    "track {} deleted after {} missed frames",
                    track.track_id,
                    track.time_since_update
                );
            }
        }

        let mut next_id = self.next_id;
        for det_idx in unmatched_detections {
            let Some(detection) = detections[det_idx].take() else {
                unreachable!("detection {det_idx} both matched and unmatched");
            };
            let track_id = next_id;
            next_id = next_id.checked_add(1).ok_or(TrackerError::IdsExhausted)?;
            log::debug!("track {track_id} created ({})", detection.class_label);
            tracks.push(Track::new(
                track_id,
                detection,
                kf,
                self.config.gallery_capacity,
            ));
        }

        tracks.retain(|t| !t.is_deleted());
        check_bookkeeping(&tracks, next_id);

        self.tracks = tracks;
        self.next_id = next_id;
        self.frame_id += 1;

        Ok(self.reports())
    }

    /// Confirmed tracks matched on this or the previous frame.
    pub fn reports(&self) -> Vec<TrackReport> {
        self.tracks
            .iter()
            .filter(|t| t.is_confirmed() && t.time_since_update <= 1)
            .map(TrackReport::from)
            .collect()
    }

    fn accept_detections(&self, detections: Vec<Detection>) -> Vec<Detection> {
        detections
            .into_iter()
            .filter(|det| match det.validate(self.config.embedding_dim) {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("frame {}: dropping detection: {err}", self.frame_id + 1);
                    false
                }
            })
            .collect()
    }
}

/// Ids must be unique and below the next id to be handed out.
fn check_bookkeeping(tracks: &[Track], next_id: u64) {
    let mut seen = HashSet::with_capacity(tracks.len());
    for track in tracks {
        assert!(
            seen.insert(track.track_id),
            "duplicate track id {}",
            track.track_id
        );
        assert!(track.track_id < next_id, "track id {} not yet issued", track.track_id);
    }
}
