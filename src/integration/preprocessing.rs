//! Filtering applied to backend detections before they reach the tracker.

use serde::{Deserialize, Serialize};

use crate::tracker::Detection;

/// Class allow-list and overlap suppression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionFilter {
    /// Classes to keep; `None` keeps every class
    pub allowed_classes: Option<Vec<String>>,
    /// Overlap ratio above which a lower-confidence box is suppressed; 1.0 disables suppression
    pub nms_max_overlap: f32,
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self {
            allowed_classes: None,
            nms_max_overlap: 1.0,
        }
    }
}

impl DetectionFilter {
    pub fn allow_only<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_classes: Some(classes.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn is_allowed(&self, class_label: &str) -> bool {
        self.allowed_classes
            .as_ref()
            .is_none_or(|allowed| allowed.iter().any(|c| c == class_label))
    }

    pub fn apply(&self, detections: Vec<Detection>) -> Vec<Detection> {
        let total = detections.len();
        let allowed: Vec<Detection> = detections
            .into_iter()
            .filter(|det| self.is_allowed(&det.class_label))
            .collect();
        let kept = non_max_suppression(allowed, self.nms_max_overlap);

        if kept.len() != total {
            log::debug!("preprocessing kept {} of {} detections", kept.len(), total);
        }
        kept
    }
}

/// Greedy suppression over all classes.
///
/// Boxes are visited from the most to the least confident. A box is dropped
/// when its intersection with an already kept box covers more than
/// `max_overlap` of its own area. Survivors keep their input order.
pub fn non_max_suppression(detections: Vec<Detection>, max_overlap: f32) -> Vec<Detection> {
    if detections.len() < 2 || max_overlap >= 1.0 {
        return detections;
    }

    let mut order: Vec<usize> = (0..detections.len()).collect();
    order.sort_by(|&a, &b| detections[b].confidence.total_cmp(&detections[a].confidence));

    let mut kept: Vec<usize> = Vec::new();
    for idx in order {
        let candidate = &detections[idx].bbox;
        let suppressed = kept.iter().any(|&k| {
            let area = candidate.area();
            area <= 0.0 || detections[k].bbox.intersection_area(candidate) / area > max_overlap
        });
        if !suppressed {
            kept.push(idx);
        }
    }

    let mut keep_mask = vec![false; detections.len()];
    for idx in kept {
        keep_mask[idx] = true;
    }
    detections
        .into_iter()
        .zip(keep_mask)
        .filter_map(|(det, keep)| keep.then_some(det))
        .collect()
}
