//! Builder for creating Detection objects from various box formats.

use ndarray::Array1;

use crate::tracker::{Detection, Rect};

/// Builder for [`Detection`]s coming out of detector/encoder backends.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: Rect,
    confidence: f32,
    class_label: String,
    embedding: Array1<f32>,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the box as (x_min, y_min, x_max, y_max).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Set the box as (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(cx - w / 2.0, cy - h / 2.0, w, h);
        self
    }

    /// Set the box as (x_min, y_min, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::new(x, y, w, h);
        self
    }

    /// Set the box from normalized (y_min, x_min, y_max, x_max), as emitted by
    /// TensorFlow-style detection heads, scaled to a frame of the given size.
    pub fn normalized_yxyx(mut self, yxyx: [f32; 4], frame_width: u32, frame_height: u32) -> Self {
        let (w, h) = (frame_width as f32, frame_height as f32);
        self.bbox = Rect::from_tlbr(yxyx[1] * w, yxyx[0] * h, yxyx[3] * w, yxyx[2] * h);
        self
    }

    /// Set the detector confidence score.
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Set the class label.
    pub fn class_label(mut self, class_label: impl Into<String>) -> Self {
        self.class_label = class_label.into();
        self
    }

    /// Set the appearance embedding. It should already be unit-normalized.
    pub fn embedding(mut self, embedding: impl Into<Array1<f32>>) -> Self {
        self.embedding = embedding.into();
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection::new(self.bbox, self.confidence, self.class_label, self.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .confidence(0.95)
            .class_label("person")
            .embedding(vec![0.6_f32, 0.8])
            .build();

        assert_eq!(det.confidence, 0.95);
        assert_eq!(det.class_label, "person");
        assert_eq!(det.bbox.to_tlwh(), [10.0, 20.0, 40.0, 60.0]);
        assert_eq!(det.validate(2), Ok(()));
    }

    #[test]
    fn test_box_formats_agree() {
        let from_center = DetectionBuilder::new().xywh(30.0, 50.0, 40.0, 60.0).build();
        let from_corner = DetectionBuilder::new().tlwh(10.0, 20.0, 40.0, 60.0).build();
        assert_eq!(from_center.bbox, from_corner.bbox);

        let from_normalized = DetectionBuilder::new()
            .normalized_yxyx([0.25, 0.5, 0.75, 1.0], 200, 100)
            .build();
        assert_eq!(from_normalized.bbox.to_tlbr(), [100.0, 25.0, 200.0, 75.0]);
    }
}
