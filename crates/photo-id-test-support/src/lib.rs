//! Test support utilities for photo-id.
//!
//! Provides synthetic images and mock implementations of the core ports.
//!
//! # Example
//!
//! ```
//! use photo_id_test_support::{MockImageSource, SyntheticImageBuilder};
//!
//! let white = SyntheticImageBuilder::white(600, 600);
//! let portrait = SyntheticImageBuilder::portrait(600, 600, [240, 240, 240]);
//!
//! let source = MockImageSource::new(vec![white, portrait.image]);
//! ```

mod builders;
mod mocks;

pub use builders::{Portrait, SyntheticImageBuilder};
pub use mocks::{
    sample_report, MockBackgroundRemover, MockContentClassifier, MockFaceDetector,
    MockImageSource, MockProgressSink, MockResultOutput,
};
