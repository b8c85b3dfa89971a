use std::collections::HashSet;

use deepsort_rs::{DeepSortTracker, Detection, Rect, TrackState, TrackerConfig};
use ndarray::Array1;

const DIM: usize = 128;

fn look(i: usize) -> Array1<f32> {
    let mut e = Array1::zeros(DIM);
    e[i] = 1.0;
    e
}

fn det(x: f32, y: f32, w: f32, h: f32, appearance: usize) -> Detection {
    Detection::new(Rect::new(x, y, w, h), 0.9, "horse", look(appearance))
}

/// Feed the same box for `n_init` frames so the track is confirmed.
fn confirmed_tracker(x: f32, y: f32, w: f32, h: f32) -> DeepSortTracker {
    let mut tracker = DeepSortTracker::new(TrackerConfig::default());
    for _ in 0..3 {
        tracker.update(vec![det(x, y, w, h, 0)]).unwrap();
    }
    assert_eq!(tracker.tracks()[0].state, TrackState::Confirmed);
    tracker
}

#[test]
fn test_basic_tracking() {
    let mut tracker = DeepSortTracker::new(TrackerConfig::default());

    let mut id = None;
    for frame in 0..10 {
        let x = 100.0 + 3.0 * frame as f32;
        let reports = tracker.update(vec![det(x, 100.0, 50.0, 100.0, 0)]).unwrap();
        if frame < 2 {
            assert!(reports.is_empty());
            continue;
        }
        assert_eq!(reports.len(), 1);
        let track_id = *id.get_or_insert(reports[0].track_id);
        assert_eq!(reports[0].track_id, track_id);
        assert!((reports[0].tlbr[0] - x).abs() < 3.0);
    }
}

#[test]
fn test_time_since_update_bookkeeping() {
    let mut tracker = confirmed_tracker(0.0, 0.0, 50.0, 50.0);

    for expected in 1..=4 {
        tracker.update(vec![]).unwrap();
        assert_eq!(tracker.tracks()[0].time_since_update, expected);
    }
    tracker.update(vec![det(0.0, 0.0, 50.0, 50.0, 0)]).unwrap();
    assert_eq!(tracker.tracks()[0].time_since_update, 0);
}

#[test]
fn test_small_move_is_matched() {
    let mut tracker = confirmed_tracker(0.0, 0.0, 50.0, 50.0);
    let before = tracker.tracks()[0].clone();
    assert_eq!(before.time_since_update, 0);

    let reports = tracker.update(vec![det(2.0, 2.0, 51.0, 51.0, 0)]).unwrap();

    let after = &tracker.tracks()[0];
    assert_eq!(tracker.tracks().len(), 1);
    assert_eq!(after.track_id, before.track_id);
    assert_eq!(after.time_since_update, 0);
    assert_eq!(after.hits, before.hits + 1);
    assert_eq!(reports[0].track_id, before.track_id);
}

#[test]
fn test_confirmed_track_deleted_after_max_age() {
    let mut tracker = confirmed_tracker(200.0, 200.0, 50.0, 100.0);

    for miss in 1..=30 {
        tracker.update(vec![]).unwrap();
        assert_eq!(tracker.tracks().len(), 1, "track lost after {miss} misses");
        assert_eq!(tracker.tracks()[0].state, TrackState::Confirmed);
    }
    tracker.update(vec![]).unwrap();
    assert!(tracker.tracks().is_empty());
}

#[test]
fn test_reported_only_while_recent() {
    let mut tracker = confirmed_tracker(200.0, 200.0, 50.0, 100.0);
    assert_eq!(tracker.update(vec![]).unwrap().len(), 1);
    assert!(tracker.update(vec![]).unwrap().is_empty());
}

#[test]
fn test_overlap_fallback_after_appearance_mismatch() {
    let mut tracker = confirmed_tracker(100.0, 100.0, 50.0, 100.0);
    let id = tracker.tracks()[0].track_id;

    // Orthogonal embedding: appearance distance 1.0, IOU about 0.9.
    let reports = tracker.update(vec![det(102.0, 101.0, 50.0, 100.0, 7)]).unwrap();

    assert_eq!(tracker.tracks().len(), 1);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].track_id, id);
}

#[test]
fn test_overlap_fallback_after_motion_gate() {
    let mut tracker = confirmed_tracker(100.0, 100.0, 400.0, 100.0);
    let id = tracker.tracks()[0].track_id;
    let hits = tracker.tracks()[0].hits;

    // Same look and center, but the aspect ratio jumps from 4.0 to 4.4, which
    // is well outside the motion gate. IOU with the prediction is 400/440.
    let reports = tracker.update(vec![det(80.0, 100.0, 440.0, 100.0, 0)]).unwrap();

    assert_eq!(tracker.tracks().len(), 1);
    assert_eq!(tracker.tracks()[0].hits, hits + 1);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].track_id, id);
}

#[test]
fn test_disjoint_tracks_keep_identities() {
    let mut tracker = DeepSortTracker::new(TrackerConfig::default());
    for _ in 0..3 {
        tracker
            .update(vec![
                det(0.0, 0.0, 50.0, 100.0, 0),
                det(400.0, 300.0, 50.0, 100.0, 0),
            ])
            .unwrap();
    }
    let left = tracker.tracks()[0].track_id;
    let right = tracker.tracks()[1].track_id;

    let reports = tracker
        .update(vec![
            det(400.0, 300.0, 50.0, 100.0, 0),
            det(0.0, 0.0, 50.0, 100.0, 0),
        ])
        .unwrap();

    assert_eq!(reports.len(), 2);
    for report in reports {
        if report.track_id == left {
            assert!(report.tlbr[0] < 10.0);
        } else {
            assert_eq!(report.track_id, right);
            assert!(report.tlbr[0] > 390.0);
        }
    }
}

#[test]
fn test_reidentified_after_occlusion() {
    let mut tracker = confirmed_tracker(100.0, 100.0, 50.0, 100.0);
    let id = tracker.tracks()[0].track_id;

    for _ in 0..5 {
        tracker.update(vec![]).unwrap();
    }
    let reports = tracker.update(vec![det(104.0, 100.0, 50.0, 100.0, 0)]).unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].track_id, id);
    assert_eq!(tracker.tracks()[0].time_since_update, 0);
}

#[test]
fn test_ids_never_reused() {
    let mut tracker = DeepSortTracker::new(TrackerConfig::default());
    let mut issued = HashSet::new();

    for frame in 0..6 {
        // Alternating spurious detections: every tentative track dies next frame.
        let detections = if frame % 2 == 0 {
            vec![det(0.0, 0.0, 20.0, 20.0, 0), det(300.0, 0.0, 20.0, 20.0, 1)]
        } else {
            vec![]
        };
        tracker.update(detections).unwrap();

        let live: Vec<u64> = tracker.tracks().iter().map(|t| t.track_id).collect();
        let unique: HashSet<u64> = live.iter().copied().collect();
        assert_eq!(unique.len(), live.len());
        for id in live {
            if frame % 2 == 0 {
                assert!(issued.insert(id), "id {id} reused");
            }
        }
    }
    assert_eq!(issued.len(), 6);
}

#[test]
fn test_confirmed_never_reverts() {
    let mut tracker = confirmed_tracker(100.0, 100.0, 50.0, 100.0);
    let pattern = [true, false, false, true, false, true, true];
    for present in pattern {
        let detections = if present {
            vec![det(100.0, 100.0, 50.0, 100.0, 0)]
        } else {
            vec![]
        };
        tracker.update(detections).unwrap();
        assert!(tracker
            .tracks()
            .iter()
            .all(|t| t.track_id != 1 || t.state == TrackState::Confirmed));
    }
}

#[test]
fn test_track_leaving_frame_is_deleted() {
    let config = TrackerConfig {
        frame_size: Some((640.0, 480.0)),
        ..TrackerConfig::default()
    };
    let mut tracker = DeepSortTracker::new(config);
    for frame in 0..4 {
        let x = 560.0 + 10.0 * frame as f32;
        tracker.update(vec![det(x, 100.0, 40.0, 80.0, 0)]).unwrap();
    }
    assert_eq!(tracker.tracks()[0].state, TrackState::Confirmed);

    // Keeps moving right with no detections until it is past the edge.
    for _ in 0..10 {
        tracker.update(vec![]).unwrap();
    }
    assert!(tracker.tracks().is_empty());
}
