//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external
//! collaborators: detectors, classifiers, models, image sources and sinks.

mod background_remover;
mod content_classifier;
mod face_detector;
mod image_source;
mod pixel_source;
mod progress;
mod result_output;

pub use background_remover::BackgroundRemover;
pub use content_classifier::{ContentCategory, ContentClassifier, ContentLabel};
pub use face_detector::FaceDetector;
pub use image_source::ImageSource;
pub use pixel_source::PixelSource;
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
