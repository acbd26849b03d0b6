//! Writing rendered photos and sheets to disk.

use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;
use photo_id_core::domain::PixelBuffer;
use tracing::info;

/// Saves `pixels`, choosing the format from the extension.
///
/// JPEG output drops the alpha channel; other formats keep it.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_pixels(pixels: &PixelBuffer, path: &Path) -> Result<()> {
    let image = DynamicImage::ImageRgba8(pixels.to_rgba_image());
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));

    let written = if is_jpeg {
        DynamicImage::ImageRgb8(image.to_rgb8()).save(path)
    } else {
        image.save(path)
    };
    written.with_context(|| format!("Failed to write image: {}", path.display()))?;

    info!(
        width = pixels.width(),
        height = pixels.height(),
        "Wrote {}",
        path.display()
    );
    Ok(())
}
