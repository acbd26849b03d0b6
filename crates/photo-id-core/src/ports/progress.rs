//! Progress reporting port for UI integration.

use crate::domain::PipelineReport;

/// Events emitted during a batch run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Processing started for an image.
    Started {
        /// Path to the image.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total images in batch, if known.
        total: Option<usize>,
    },
    /// Processing completed for an image.
    Completed {
        /// The pipeline report.
        report: Box<PipelineReport>,
    },
    /// An image was skipped because it could not be loaded.
    Skipped {
        /// Path to the image.
        path: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All images have been processed.
    Finished {
        /// Images processed successfully.
        processed: usize,
        /// Images skipped.
        skipped: usize,
    },
}

/// Receives progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
