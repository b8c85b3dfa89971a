//! Per-frame observation handed to the tracker.

use ndarray::Array1;

use crate::error::DetectionError;
use crate::tracker::rect::Rect;

/// One object observation from the upstream detector and appearance encoder.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Bounding box in TLWH pixel coordinates
    pub bbox: Rect,
    /// Detection confidence score
    pub confidence: f32,
    /// Class name, passed through to the track untouched
    pub class_label: String,
    /// Unit-normalized appearance embedding
    pub embedding: Array1<f32>,
}

impl Detection {
    pub fn new(
        bbox: Rect,
        confidence: f32,
        class_label: impl Into<String>,
        embedding: Array1<f32>,
    ) -> Self {
        Self {
            bbox,
            confidence,
            class_label: class_label.into(),
            embedding,
        }
    }

    /// Convenience constructor from (x_min, y_min, x_max, y_max).
    pub fn from_tlbr(
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        confidence: f32,
        class_label: impl Into<String>,
        embedding: Array1<f32>,
    ) -> Self {
        Self::new(Rect::from_tlbr(x1, y1, x2, y2), confidence, class_label, embedding)
    }

    /// Kalman measurement for this detection.
    pub fn to_xyah(&self) -> [f64; 4] {
        self.bbox.to_xyah().map(f64::from)
    }

    /// Checks whether the detection may enter matching.
    pub fn validate(&self, embedding_dim: usize) -> Result<(), DetectionError> {
        if !self.bbox.is_finite() {
            return Err(DetectionError::NonFiniteBox);
        }
        if self.bbox.is_degenerate() {
            return Err(DetectionError::DegenerateBox {
                width: self.bbox.width,
                height: self.bbox.height,
            });
        }
        if self.embedding.len() != embedding_dim {
            return Err(DetectionError::EmbeddingLength {
                expected: embedding_dim,
                actual: self.embedding.len(),
            });
        }
        if self.embedding.iter().any(|v| !v.is_finite()) {
            return Err(DetectionError::NonFiniteEmbedding);
        }
        Ok(())
    }
}
