//! Trait for detection plus appearance-encoding backends.

use crate::tracker::Detection;

/// A backend that turns a frame into detections with appearance embeddings.
///
/// Implementations usually chain an object detector and a re-identification
/// encoder. Boxes must be in pixel TLWH coordinates and embeddings
/// unit-normalized; the tracker never re-normalizes them.
///
/// # Example
///
/// ```
/// use deepsort_rs::{DetectionBuilder, DetectionSource, Detection};
///
/// struct MyDetector {
///     // Detector and encoder models here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, _input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         let whole_frame = DetectionBuilder::new()
///             .tlwh(0.0, 0.0, width as f32, height as f32)
///             .confidence(0.5)
///             .class_label("person")
///             .embedding(vec![1.0_f32, 0.0])
///             .build();
///         Ok(vec![whole_frame])
///     }
/// }
///
/// let detections = MyDetector {}.detect(&[], 640, 480).unwrap();
/// assert_eq!(detections[0].bbox.to_tlbr(), [0.0, 0.0, 640.0, 480.0]);
/// ```
pub trait DetectionSource {
    type Error: std::error::Error + 'static;

    /// Run detection and encoding on raw image data.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes in whatever layout the backend expects
    /// * `width` - Frame width in pixels
    /// * `height` - Frame height in pixels
    ///
    /// # Returns
    /// Detections in pixel coordinates, each carrying its appearance embedding
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}
