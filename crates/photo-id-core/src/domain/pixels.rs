//! Raw pixel storage shared by every pipeline stage.

use image::{DynamicImage, RgbaImage};
use thiserror::Error;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Errors raised when constructing a [`PixelBuffer`] from raw parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PixelBufferError {
    /// Width or height is zero.
    #[error("image dimensions are zero ({width}x{height})")]
    ZeroDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The sample slice does not hold exactly `width * height * 4` bytes.
    #[error("expected {expected} RGBA bytes, got {actual}")]
    LengthMismatch {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },
}

/// Row-major RGBA image, 8 bits per channel.
///
/// Immutable once constructed; stages borrow it and never write into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA samples.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the sample count
    /// does not match the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PixelBufferError> {
        if width == 0 || height == 0 {
            return Err(PixelBufferError::ZeroDimensions { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(PixelBufferError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a buffer filled with a single RGBA colour.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, PixelBufferError> {
        let count = width as usize * height as usize;
        let data = rgba.iter().copied().cycle().take(count * CHANNELS).collect();
        Self::new(width, height, data)
    }

    /// Converts a decoded image into an RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the image has a zero dimension.
    pub fn from_image(image: &DynamicImage) -> Result<Self, PixelBufferError> {
        Self::from_rgba(image.to_rgba8())
    }

    /// Takes ownership of an `RgbaImage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image has a zero dimension.
    pub fn from_rgba(image: RgbaImage) -> Result<Self, PixelBufferError> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGBA samples.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// RGBA value at `(x, y)`. Coordinates must be in bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Integer channel sum `R + G + B` at `(x, y)`.
    #[must_use]
    pub fn channel_sum(&self, x: u32, y: u32) -> u32 {
        let [r, g, b, _] = self.pixel(x, y);
        u32::from(r) + u32::from(g) + u32::from(b)
    }

    /// Applies `f` to every pixel, keeping the dimensions.
    #[must_use]
    pub fn map_pixels(&self, mut f: impl FnMut([u8; 4]) -> [u8; 4]) -> Self {
        let data = self
            .data
            .chunks_exact(CHANNELS)
            .flat_map(|p| f([p[0], p[1], p[2], p[3]]))
            .collect();
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Copies the samples into an `RgbaImage`.
    #[must_use]
    pub fn to_rgba_image(&self) -> RgbaImage {
        // Dimensions and length were validated at construction.
        RgbaImage::from_fn(self.width, self.height, |x, y| image::Rgba(self.pixel(x, y)))
    }

    /// Luma plane using the `(R + G + B) / 3` definition, rounded.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_luma(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            let sum = self.channel_sum(x, y);
            image::Luma([((sum + 1) / 3) as u8])
        })
    }
}

/// A decoded image together with where it came from.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Origin of the image (file path or synthetic label).
    pub path: String,
    /// Decoded RGBA samples.
    pub pixels: PixelBuffer,
}

impl ImageInfo {
    /// Decodes a `DynamicImage` into an `ImageInfo`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image has a zero dimension.
    pub fn new(path: impl Into<String>, image: &DynamicImage) -> Result<Self, PixelBufferError> {
        let pixels = PixelBuffer::from_image(image)?;
        Ok(Self::from_pixels(path, pixels))
    }

    /// Wraps an existing buffer.
    #[must_use]
    pub fn from_pixels(path: impl Into<String>, pixels: PixelBuffer) -> Self {
        Self {
            path: path.into(),
            pixels,
        }
    }

    /// Image width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Image height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.pixels.height()
    }
}
