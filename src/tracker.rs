mod deep_sort;
mod detection;
mod gallery;
mod kalman_filter;
mod matching;
mod rect;
mod track;
mod track_state;

pub use deep_sort::{DeepSortTracker, TrackReport, TrackerConfig};
pub use detection::Detection;
pub use gallery::Gallery;
pub use kalman_filter::{CHI2INV95_4DOF, KalmanFilter};
pub use matching::{
    AssignmentResult, INFTY_COST, appearance_cost, associate, gate_cost_matrix, iou_cost,
    linear_assignment, matching_cascade, min_cost_matching,
};
pub use rect::Rect;
pub use track::Track;
pub use track_state::TrackState;
