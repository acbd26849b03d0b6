//! Background removal model port.

use crate::domain::PixelBuffer;

/// External background removal model.
pub trait BackgroundRemover: Send + Sync {
    /// Loads the model. Called once before the first removal, and again after a reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    fn load(&mut self) -> anyhow::Result<()>;

    /// Returns the image with background pixels made transparent.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    fn remove(&self, pixels: &PixelBuffer) -> anyhow::Result<PixelBuffer>;
}
