//! Rendering of single photos and print sheets.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

use super::{LayoutError, MixedSheetLayout, SheetLayout};
use crate::domain::{CropResult, PhotoStandard, PixelBuffer};

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Diagonal stripe period of the preview watermark, in pixels.
const WATERMARK_PERIOD: u32 = 48;
/// Stripe thickness within each period.
const WATERMARK_BAND: u32 = 12;
/// Stripe opacity out of 255.
const WATERMARK_ALPHA: u32 = 90;
/// Stripe colour.
const WATERMARK_SHADE: u32 = 96;

/// Crops `source`, resizes it to the standard's size at its DPI and applies brightness.
///
/// # Errors
///
/// Returns an error if the output buffer cannot be constructed.
pub fn render_passport_photo(
    source: &PixelBuffer,
    crop: &CropResult,
    standard: &PhotoStandard,
    brightness: i32,
) -> Result<PixelBuffer, LayoutError> {
    let (x, y, w, h) = crop.pixel_rect(source.width(), source.height());
    let (out_w, out_h) = standard.pixel_size();

    let rgba = source.to_rgba_image();
    let cropped = imageops::crop_imm(&rgba, x, y, w, h).to_image();
    let mut photo = imageops::resize(&cropped, out_w, out_h, FilterType::Lanczos3);
    let delta = brightness.clamp(-100, 100) * 255 / 100;
    if delta != 0 {
        photo = imageops::colorops::brighten(&photo, delta);
    }
    debug!(x, y, w, h, out_w, out_h, brightness, "Rendered photo");
    Ok(PixelBuffer::from_rgba(photo)?)
}

/// Tiles copies of `photo` onto the standard's print sheet.
///
/// With `watermark`, stripes are drawn on the sheet only; `photo` is
/// borrowed and never modified.
///
/// # Errors
///
/// Returns an error if the photo does not fit on the sheet.
pub fn render_sheet(
    photo: &PixelBuffer,
    standard: &PhotoStandard,
    watermark: bool,
) -> Result<PixelBuffer, LayoutError> {
    let layout = SheetLayout::for_standard(standard)?;
    let tile = fit_tile(photo, layout.photo_width, layout.photo_height);

    let mut sheet = RgbaImage::from_pixel(layout.sheet_width, layout.sheet_height, WHITE);
    for &(x, y) in &layout.positions {
        imageops::replace(&mut sheet, &tile, i64::from(x), i64::from(y));
    }
    if watermark {
        apply_watermark(&mut sheet);
    }
    debug!(copies = layout.copies(), watermark, "Rendered sheet");
    Ok(PixelBuffer::from_rgba(sheet)?)
}

/// Draws photos onto a mixed sheet; `photos[i]` fills placements of item `i`.
///
/// Placements whose item has no photo are left blank.
///
/// # Errors
///
/// Returns an error if the output buffer cannot be constructed.
pub fn render_mixed_sheet(
    photos: &[PixelBuffer],
    layout: &MixedSheetLayout,
    watermark: bool,
) -> Result<PixelBuffer, LayoutError> {
    let mut sheet = RgbaImage::from_pixel(layout.sheet_width, layout.sheet_height, WHITE);
    for p in &layout.placements {
        let Some(photo) = photos.get(p.item) else {
            continue;
        };
        let tile = fit_tile(photo, p.width, p.height);
        imageops::replace(&mut sheet, &tile, i64::from(p.x), i64::from(p.y));
    }
    if watermark {
        apply_watermark(&mut sheet);
    }
    Ok(PixelBuffer::from_rgba(sheet)?)
}

/// Overlays translucent diagonal stripes.
#[allow(clippy::cast_possible_truncation)]
pub fn apply_watermark(image: &mut RgbaImage) {
    for (x, y, px) in image.enumerate_pixels_mut() {
        if (x + y) % WATERMARK_PERIOD >= WATERMARK_BAND {
            continue;
        }
        for c in &mut px.0[..3] {
            let v = u32::from(*c);
            *c = ((v * (255 - WATERMARK_ALPHA) + WATERMARK_SHADE * WATERMARK_ALPHA) / 255) as u8;
        }
    }
}

fn fit_tile(photo: &PixelBuffer, width: u32, height: u32) -> RgbaImage {
    let rgba = photo.to_rgba_image();
    if rgba.dimensions() == (width, height) {
        rgba
    } else {
        imageops::resize(&rgba, width, height, FilterType::Lanczos3)
    }
}
