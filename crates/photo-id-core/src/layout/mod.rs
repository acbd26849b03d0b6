//! Crop window and print sheet layout.

mod crop;
mod render;
mod sheet;

use thiserror::Error;

use crate::domain::PixelBufferError;

pub use crop::{calculate_crop, CropConfig};
pub use render::{apply_watermark, render_mixed_sheet, render_passport_photo, render_sheet};
pub use sheet::{
    pack_mixed_sheet, MixedSheetLayout, Placement, SheetItem, SheetLayout, DEFAULT_GUTTER_MM,
};

/// Errors from layout and rendering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// Not even one photo fits on the sheet.
    #[error("a {photo_width}x{photo_height} photo does not fit on a {sheet_width}x{sheet_height} sheet")]
    DoesNotFit {
        /// Photo width in pixels.
        photo_width: u32,
        /// Photo height in pixels.
        photo_height: u32,
        /// Sheet width in pixels.
        sheet_width: u32,
        /// Sheet height in pixels.
        sheet_height: u32,
    },

    /// The sheet ran out of room before every requested photo was placed.
    #[error("sheet is full after placing {placed} of {requested} photos")]
    SheetFull {
        /// Photos placed.
        placed: usize,
        /// Photos requested.
        requested: usize,
    },

    /// A rendered buffer could not be constructed.
    #[error(transparent)]
    Pixels(#[from] PixelBufferError),
}
