//! Association of predicted tracks with the current frame's detections.
//!
//! Confirmed tracks are matched first on appearance, gated by motion, in a
//! cascade ordered by how recently each track was last matched. Whatever is
//! left, plus the tentative tracks, is matched on box overlap.

use std::collections::HashSet;

use ndarray::Array2;

use crate::tracker::deep_sort::TrackerConfig;
use crate::tracker::detection::Detection;
use crate::tracker::kalman_filter::{CHI2INV95_4DOF, KalmanFilter};
use crate::tracker::track::Track;

/// Cost assigned to pairs that must never be matched.
pub const INFTY_COST: f32 = 1e5;

/// Partition of one association step. Indices refer to the slices passed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Solve a rectangular cost matrix and keep pairs whose cost is at most `thresh`.
/// Indices in the result are row/column positions of `cost_matrix`.
pub fn linear_assignment(cost_matrix: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), 1e6);
    for ((i, j), &cost) in cost_matrix.indexed_iter() {
        padded[[i, j]] = cost as f64;
    }

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask = vec![true; num_cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row_idx, &col_idx) in row_to_col.iter().enumerate().take(num_rows) {
                if col_idx < num_cols && cost_matrix[[row_idx, col_idx]] <= thresh {
                    matches.push((row_idx, col_idx));
                    unmatched_detections_mask[col_idx] = false;
                } else {
                    unmatched_tracks.push(row_idx);
                }
            }
        }
        Err(err) => {
            log::warn!("assignment solver failed on {num_rows}x{num_cols} matrix: {err:?}");
            unmatched_tracks = (0..num_rows).collect();
        }
    }

    let unmatched_detections = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &unmatched)| unmatched.then_some(i))
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

/// Minimum-cost matching over a subset of tracks and detections.
///
/// `cost_matrix` has one row per entry of `track_indices` and one column per
/// entry of `detection_indices`. Entries above `max_distance` are never matched.
pub fn min_cost_matching(
    mut cost_matrix: Array2<f32>,
    max_distance: f32,
    track_indices: &[usize],
    detection_indices: &[usize],
) -> AssignmentResult {
    debug_assert_eq!(cost_matrix.dim(), (track_indices.len(), detection_indices.len()));

    cost_matrix.mapv_inplace(|c| if c > max_distance { max_distance + 1e-5 } else { c });
    let local = linear_assignment(&cost_matrix, max_distance);

    AssignmentResult {
        matches: local
            .matches
            .into_iter()
            .map(|(row, col)| (track_indices[row], detection_indices[col]))
            .collect(),
        unmatched_tracks: local
            .unmatched_tracks
            .into_iter()
            .map(|row| track_indices[row])
            .collect(),
        unmatched_detections: local
            .unmatched_detections
            .into_iter()
            .map(|col| detection_indices[col])
            .collect(),
    }
}

/// Nearest-neighbour cosine distance between each track's gallery and each detection.
pub fn appearance_cost(
    tracks: &[Track],
    detections: &[Detection],
    track_indices: &[usize],
    detection_indices: &[usize],
) -> Array2<f32> {
    Array2::from_shape_fn(
        (track_indices.len(), detection_indices.len()),
        |(row, col)| {
            let track = &tracks[track_indices[row]];
            let detection = &detections[detection_indices[col]];
            track
                .gallery
                .min_cosine_distance(&detection.embedding)
                .unwrap_or(INFTY_COST)
        },
    )
}

/// Invalidate entries whose detection is implausible under the track's motion model.
///
/// A track whose gating distance cannot be computed is gated against every
/// detection.
pub fn gate_cost_matrix(
    kalman_filter: &KalmanFilter,
    cost_matrix: &mut Array2<f32>,
    tracks: &[Track],
    detections: &[Detection],
    track_indices: &[usize],
    detection_indices: &[usize],
) {
    let measurements: Vec<[f64; 4]> = detection_indices
        .iter()
        .map(|&j| detections[j].to_xyah())
        .collect();

    for (row, &track_idx) in track_indices.iter().enumerate() {
        let track = &tracks[track_idx];
        match kalman_filter.gating_distance(&track.mean, &track.covariance, &measurements) {
            Ok(distances) => {
                for (col, distance) in distances.into_iter().enumerate() {
                    if distance > CHI2INV95_4DOF {
                        cost_matrix[[row, col]] = INFTY_COST;
                    }
                }
            }
            Err(err) => {
                log::warn!("track {}: {err}, gating out all detections", track.track_id);
                cost_matrix.row_mut(row).fill(INFTY_COST);
            }
        }
    }
}

/// `1 - IOU` between predicted track boxes and detections. Tracks that
/// missed more than the previous frame are excluded.
pub fn iou_cost(
    tracks: &[Track],
    detections: &[Detection],
    track_indices: &[usize],
    detection_indices: &[usize],
) -> Array2<f32> {
    let mut cost = Array2::zeros((track_indices.len(), detection_indices.len()));
    for (row, &track_idx) in track_indices.iter().enumerate() {
        let track = &tracks[track_idx];
        if track.time_since_update > 1 {
            cost.row_mut(row).fill(INFTY_COST);
            continue;
        }
        let predicted = track.rect();
        for (col, &det_idx) in detection_indices.iter().enumerate() {
            cost[[row, col]] = 1.0 - predicted.iou(&detections[det_idx].bbox);
        }
    }
    cost
}

fn gated_appearance_matching(
    kalman_filter: &KalmanFilter,
    max_distance: f32,
    tracks: &[Track],
    detections: &[Detection],
    track_indices: &[usize],
    detection_indices: &[usize],
) -> AssignmentResult {
    let mut cost = appearance_cost(tracks, detections, track_indices, detection_indices);
    gate_cost_matrix(
        kalman_filter,
        &mut cost,
        tracks,
        detections,
        track_indices,
        detection_indices,
    );
    min_cost_matching(cost, max_distance, track_indices, detection_indices)
}

/// Appearance matching in rounds of increasing `time_since_update`.
///
/// Each round only sees the detections left over by the rounds before it, so
/// recently seen tracks get first claim. Tracks are expected to have been
/// predicted already this frame, so the freshest round is `time_since_update == 1`.
pub fn matching_cascade(
    kalman_filter: &KalmanFilter,
    max_distance: f32,
    cascade_depth: u32,
    tracks: &[Track],
    detections: &[Detection],
    track_indices: &[usize],
    detection_indices: &[usize],
) -> AssignmentResult {
    let (matches, unmatched_detections) = (1..=cascade_depth).fold(
        (Vec::new(), detection_indices.to_vec()),
        |(mut matches, pool): (Vec<(usize, usize)>, Vec<usize>), level| {
            if pool.is_empty() {
                return (matches, pool);
            }
            let bucket: Vec<usize> = track_indices
                .iter()
                .copied()
                .filter(|&k| tracks[k].time_since_update == level)
                .collect();
            if bucket.is_empty() {
                return (matches, pool);
            }

            let step = gated_appearance_matching(
                kalman_filter,
                max_distance,
                tracks,
                detections,
                &bucket,
                &pool,
            );
            matches.extend(step.matches);
            (matches, step.unmatched_detections)
        },
    );

    let matched: HashSet<usize> = matches.iter().map(|&(t, _)| t).collect();
    let unmatched_tracks = track_indices
        .iter()
        .copied()
        .filter(|k| !matched.contains(k))
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}

/// Full association for one frame: appearance cascade over confirmed tracks,
/// then overlap matching for tentative tracks and cascade leftovers that
/// were matched on the previous frame.
pub fn associate(
    kalman_filter: &KalmanFilter,
    config: &TrackerConfig,
    tracks: &[Track],
    detections: &[Detection],
) -> AssignmentResult {
    let (confirmed, unconfirmed): (Vec<usize>, Vec<usize>) =
        (0..tracks.len()).partition(|&i| tracks[i].is_confirmed());
    let all_detections: Vec<usize> = (0..detections.len()).collect();

    let cascade = matching_cascade(
        kalman_filter,
        config.max_cosine_distance,
        config.max_age,
        tracks,
        detections,
        &confirmed,
        &all_detections,
    );

    let (recent, stale): (Vec<usize>, Vec<usize>) = cascade
        .unmatched_tracks
        .iter()
        .partition(|&&k| tracks[k].time_since_update == 1);
    let overlap_candidates: Vec<usize> = unconfirmed.into_iter().chain(recent).collect();

    let overlap = min_cost_matching(
        iou_cost(
            tracks,
            detections,
            &overlap_candidates,
            &cascade.unmatched_detections,
        ),
        config.max_iou_distance,
        &overlap_candidates,
        &cascade.unmatched_detections,
    );

    log::debug!(
        "association: {} appearance matches, {} overlap matches, {} tracks and {} detections unmatched",
        cascade.matches.len(),
        overlap.matches.len(),
        stale.len() + overlap.unmatched_tracks.len(),
        overlap.unmatched_detections.len()
    );

    AssignmentResult {
        matches: cascade.matches.into_iter().chain(overlap.matches).collect(),
        unmatched_tracks: stale.into_iter().chain(overlap.unmatched_tracks).collect(),
        unmatched_detections: overlap.unmatched_detections,
    }
}
