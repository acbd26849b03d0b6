//! Readable pixel surface port.

use crate::domain::{ImageInfo, PixelBuffer};

/// Something pixels can be read back from.
///
/// `None` models a drawing surface that has no readable context.
pub trait PixelSource {
    /// Borrowed pixels, if readable.
    fn pixels(&self) -> Option<&PixelBuffer>;
}

impl PixelSource for PixelBuffer {
    fn pixels(&self) -> Option<&PixelBuffer> {
        Some(self)
    }
}

impl PixelSource for ImageInfo {
    fn pixels(&self) -> Option<&PixelBuffer> {
        Some(&self.pixels)
    }
}

impl PixelSource for Option<PixelBuffer> {
    fn pixels(&self) -> Option<&PixelBuffer> {
        self.as_ref()
    }
}
