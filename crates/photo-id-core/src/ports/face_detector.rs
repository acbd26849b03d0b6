//! Face detector port.

use crate::detection::DetectorOutput;
use crate::domain::PixelBuffer;

/// External face detection service.
///
/// Implementations return the backend's native result; the detection
/// adapter turns it into a canonical face.
pub trait FaceDetector: Send + Sync {
    /// Runs detection on `pixels`.
    ///
    /// # Errors
    ///
    /// Returns an error if the detector could not be invoked.
    fn detect(&self, pixels: &PixelBuffer) -> anyhow::Result<DetectorOutput>;
}
