//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;
use photo_id_core::detection::DetectorOutput;
use photo_id_core::domain::{ImageInfo, PipelineReport, PixelBuffer};
use photo_id_core::ports::{
    BackgroundRemover, ContentClassifier, ContentLabel, FaceDetector, ImageSource, ProgressEvent,
    ProgressSink, ResultOutput,
};

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images and tracks iteration for assertions.
pub struct MockImageSource {
    images: Vec<Result<ImageInfo, String>>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<ImageInfo>) -> Self {
        Self {
            images: images.into_iter().map(Ok).collect(),
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Appends an entry that fails to load with `reason`.
    #[must_use]
    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.images.push(Err(reason.into()));
        self
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_> {
        let count = Arc::clone(&self.iteration_count);
        if let Ok(mut c) = count.lock() {
            *c += 1;
        }
        Box::new(
            self.images
                .iter()
                .map(|entry| entry.clone().map_err(|reason| anyhow!(reason))),
        )
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.images.len())
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockResultOutput {
    reports: Arc<Mutex<Vec<PipelineReport>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<PipelineReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, report: &PipelineReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns whether a `Finished` event was received.
    #[must_use]
    pub fn has_finished(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Finished { .. }))
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { processed, skipped } => Some((*processed, *skipped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Face detector returning a fixed result, or failing.
pub struct MockFaceDetector {
    output: Option<DetectorOutput>,
    calls: Arc<Mutex<usize>>,
}

impl MockFaceDetector {
    /// Always returns `output`.
    #[must_use]
    pub fn returning(output: DetectorOutput) -> Self {
        Self {
            output: Some(output),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Always fails, as an unreachable detection service would.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            output: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns the number of `detect` calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FaceDetector for MockFaceDetector {
    fn detect(&self, _pixels: &PixelBuffer) -> anyhow::Result<DetectorOutput> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.output
            .clone()
            .ok_or_else(|| anyhow!("mock detector unavailable"))
    }
}

/// Content classifier returning fixed labels, or failing.
pub struct MockContentClassifier {
    labels: Option<Vec<ContentLabel>>,
}

impl MockContentClassifier {
    /// Always returns `labels`.
    #[must_use]
    pub const fn returning(labels: Vec<ContentLabel>) -> Self {
        Self {
            labels: Some(labels),
        }
    }

    /// Always fails.
    #[must_use]
    pub const fn failing() -> Self {
        Self { labels: None }
    }
}

impl ContentClassifier for MockContentClassifier {
    fn classify(&self, _pixels: &PixelBuffer) -> anyhow::Result<Vec<ContentLabel>> {
        self.labels
            .clone()
            .ok_or_else(|| anyhow!("mock classifier unavailable"))
    }
}

/// Background remover that makes every pixel brighter than a threshold transparent.
///
/// Stands in for a segmentation model on synthetic portraits with light backdrops.
pub struct MockBackgroundRemover {
    threshold: u8,
    fail_load: bool,
    loads: Arc<Mutex<usize>>,
}

impl MockBackgroundRemover {
    /// Clears pixels whose every channel is at least `threshold`.
    #[must_use]
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold,
            fail_load: false,
            loads: Arc::new(Mutex::new(0)),
        }
    }

    /// A remover whose model never loads.
    #[must_use]
    pub fn broken() -> Self {
        Self {
            fail_load: true,
            ..Self::new(0)
        }
    }

    /// Returns the number of `load` calls.
    #[must_use]
    pub fn load_count(&self) -> usize {
        *self.loads.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shared handle to the load counter, for use after the remover is boxed.
    #[must_use]
    pub fn load_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.loads)
    }
}

impl BackgroundRemover for MockBackgroundRemover {
    fn load(&mut self) -> anyhow::Result<()> {
        *self.loads.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        if self.fail_load {
            anyhow::bail!("mock model missing");
        }
        Ok(())
    }

    fn remove(&self, pixels: &PixelBuffer) -> anyhow::Result<PixelBuffer> {
        let t = self.threshold;
        Ok(pixels.map_pixels(|[r, g, b, a]| {
            if r >= t && g >= t && b >= t {
                [r, g, b, 0]
            } else {
                [r, g, b, a]
            }
        }))
    }
}

/// A report produced by running the default pipeline over a blank image.
#[must_use]
pub fn sample_report(path: &str) -> PipelineReport {
    let image = crate::SyntheticImageBuilder::white(600, 600);
    let image = ImageInfo { path: path.to_string(), ..image };
    let request = photo_id_core::RunRequest {
        standard: &photo_id_core::domain::standards()[0],
        adjustment: photo_id_core::CropAdjustment::default(),
        bg_removed: false,
        detection: None,
        generation: photo_id_core::GenerationCounter::new().next(),
        timestamp: "2024-01-01T00:00:00Z".into(),
    };
    photo_id_core::Pipeline::default().run(&image, &request)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use photo_id_core::background::{remove_background, ModelHandle};
    use photo_id_core::ports::ContentCategory;

    use crate::SyntheticImageBuilder;

    #[test]
    fn test_mock_image_source_empty() {
        let source = MockImageSource::empty();
        assert_eq!(source.count_hint(), Some(0));
        assert_eq!(source.images().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_image_source_with_failure() {
        let source = MockImageSource::new(vec![SyntheticImageBuilder::white(10, 10)])
            .with_failure("corrupt header");

        let items: Vec<_> = source.images().collect();
        assert_eq!(source.count_hint(), Some(2));
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }

    #[test]
    fn test_mock_result_output() {
        let output = MockResultOutput::new();
        output.write(&sample_report("test.jpg")).unwrap();
        output.flush().unwrap();

        assert_eq!(output.reports().len(), 1);
        assert_eq!(output.reports()[0].path, "test.jpg");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::Started {
            path: "test.jpg".into(),
            index: 0,
            total: Some(1),
        });

        sink.on_event(ProgressEvent::Finished {
            processed: 1,
            skipped: 0,
        });

        assert_eq!(sink.started_count(), 1);
        assert!(sink.has_finished());
        assert_eq!(sink.finished_counts(), Some((1, 0)));
    }

    #[test]
    fn test_mock_detector() {
        let pixels = SyntheticImageBuilder::white(10, 10).pixels;
        let ok = MockFaceDetector::returning(DetectorOutput::empty());
        assert!(ok.detect(&pixels).is_ok());
        assert_eq!(ok.call_count(), 1);
        assert!(MockFaceDetector::failing().detect(&pixels).is_err());
    }

    #[test]
    fn test_mock_classifier() {
        let pixels = SyntheticImageBuilder::white(10, 10).pixels;
        let labels = vec![ContentLabel {
            category: ContentCategory::Weapon,
            confidence: 0.5,
        }];
        let classifier = MockContentClassifier::returning(labels.clone());
        assert_eq!(classifier.classify(&pixels).unwrap(), labels);
        assert!(MockContentClassifier::failing().classify(&pixels).is_err());
    }

    #[test]
    fn test_mock_remover_through_handle() {
        let portrait = SyntheticImageBuilder::portrait(100, 100, [250, 250, 250]);
        let mut handle = ModelHandle::new(Box::new(MockBackgroundRemover::new(240)));
        let out = remove_background(&mut handle, &portrait.image.pixels).unwrap();
        assert_eq!(out.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(out.pixel(50, 99), portrait.image.pixels.pixel(50, 99));
    }

    #[test]
    fn test_broken_remover_loads_once() {
        let remover = MockBackgroundRemover::broken();
        let loads = remover.load_counter();
        let mut handle = ModelHandle::new(Box::new(remover));
        let pixels = SyntheticImageBuilder::white(4, 4).pixels;

        assert!(remove_background(&mut handle, &pixels).is_none());
        assert!(remove_background(&mut handle, &pixels).is_none());
        assert_eq!(*loads.lock().unwrap(), 1);
        assert!(handle.error().is_some());
    }
}
