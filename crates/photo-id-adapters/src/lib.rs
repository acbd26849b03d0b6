//! Photo ID Adapters - External adapters for photo-id.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - Detector payloads stored as JSON (explicit files or sidecars)
//! - Writing rendered photos and sheets

pub mod detections;
pub mod fs;
pub mod writer;

pub use detections::{load_sidecar, sidecar_path, JsonFaceDetector, SIDECAR_SUFFIX};
pub use fs::{load_image, FsImageSource};
pub use writer::save_pixels;
