//! Detector payloads stored as JSON files.
//!
//! A payload is either passed explicitly or found next to the image as a
//! sidecar named `<stem>.faces.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use photo_id_core::detection::{DetectorKind, DetectorOutput};
use photo_id_core::domain::PixelBuffer;
use photo_id_core::ports::FaceDetector;
use tracing::debug;

/// Suffix appended to an image's file stem to find its detector sidecar.
pub const SIDECAR_SUFFIX: &str = ".faces.json";

/// Path of the detector sidecar for `image`.
#[must_use]
pub fn sidecar_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    image.with_file_name(format!("{stem}{SIDECAR_SUFFIX}"))
}

/// Loads the sidecar for `image`, if one exists.
///
/// A malformed sidecar yields an output with no detections.
///
/// # Errors
///
/// Returns an error if the sidecar exists but cannot be read.
pub fn load_sidecar(
    image: &Path,
    kind: DetectorKind,
    width: u32,
    height: u32,
) -> Result<Option<DetectorOutput>> {
    let path = sidecar_path(image);
    if !path.is_file() {
        return Ok(None);
    }
    debug!("Using detector sidecar {}", path.display());
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read detector sidecar: {}", path.display()))?;
    Ok(Some(DetectorOutput::from_json(kind, &json, width, height)))
}

/// Face detector that replays one stored payload for every image.
///
/// Normalized payloads are scaled to the dimensions of each image passed in.
#[derive(Debug, Clone)]
pub struct JsonFaceDetector {
    kind: DetectorKind,
    payload: String,
}

impl JsonFaceDetector {
    /// Wraps an in-memory payload.
    #[must_use]
    pub fn new(kind: DetectorKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Reads a payload file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(kind: DetectorKind, path: &Path) -> Result<Self> {
        let payload = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read detector payload: {}", path.display()))?;
        Ok(Self::new(kind, payload))
    }
}

impl FaceDetector for JsonFaceDetector {
    fn detect(&self, pixels: &PixelBuffer) -> Result<DetectorOutput> {
        Ok(DetectorOutput::from_json(
            self.kind,
            &self.payload,
            pixels.width(),
            pixels.height(),
        ))
    }
}
