//! Background removal through an explicitly owned model handle.
//!
//! The removal model is loaded lazily and reused. Its lifecycle lives in a
//! [`ModelHandle`] passed by the caller rather than in global state.

use tracing::{info, warn};

use crate::domain::PixelBuffer;
use crate::ports::BackgroundRemover;

/// Lifecycle state of a removal model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelState {
    /// Not loaded yet.
    #[default]
    Uninitialized,
    /// Loaded and usable.
    Ready,
    /// Loading failed.
    Failed(String),
}

/// Owns a background removal model and tracks whether it is loaded.
pub struct ModelHandle {
    remover: Box<dyn BackgroundRemover>,
    state: ModelState,
}

impl ModelHandle {
    /// Wraps a model without loading it.
    #[must_use]
    pub fn new(remover: Box<dyn BackgroundRemover>) -> Self {
        Self {
            remover,
            state: ModelState::Uninitialized,
        }
    }

    /// Loads the model unless it is already ready. Returns readiness.
    ///
    /// A failed load is not retried until [`reset`](Self::reset) is called.
    pub fn init(&mut self) -> bool {
        if self.state == ModelState::Uninitialized {
            self.state = match self.remover.load() {
                Ok(()) => {
                    info!("Background removal model loaded");
                    ModelState::Ready
                }
                Err(e) => {
                    warn!("Background removal model failed to load: {e:#}");
                    ModelState::Failed(format!("{e:#}"))
                }
            };
        }
        self.is_ready()
    }

    /// Whether the model is loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == ModelState::Ready
    }

    /// Load error, if the last load failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ModelState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ModelState {
        &self.state
    }

    /// Forgets the loaded model so the next use loads it again.
    pub fn reset(&mut self) {
        self.state = ModelState::Uninitialized;
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Removes the background and flattens the result onto white.
///
/// Returns `None` when the model is unavailable or inference fails; the
/// caller keeps the original image and the background stays "not removed".
pub fn remove_background(handle: &mut ModelHandle, pixels: &PixelBuffer) -> Option<PixelBuffer> {
    if !handle.init() {
        return None;
    }
    match handle.remover.remove(pixels) {
        Ok(cutout) if cutout.width() == pixels.width() && cutout.height() == pixels.height() => {
            Some(composite_on_white(&cutout))
        }
        Ok(cutout) => {
            warn!(
                expected = ?(pixels.width(), pixels.height()),
                actual = ?(cutout.width(), cutout.height()),
                "Background removal returned a different size, ignoring"
            );
            None
        }
        Err(e) => {
            warn!("Background removal failed: {e:#}");
            None
        }
    }
}

/// Flattens RGBA onto an opaque white canvas.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn composite_on_white(pixels: &PixelBuffer) -> PixelBuffer {
    pixels.map_pixels(|[r, g, b, a]| {
        let a = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * a + 255 * (255 - a) + 127) / 255) as u8;
        [blend(r), blend(g), blend(b), 255]
    })
}
