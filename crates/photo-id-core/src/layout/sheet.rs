//! Print sheet layout.

use serde::Serialize;

use super::LayoutError;
use crate::domain::{mm_to_pixels, PhotoStandard, PhysicalSize};

/// Space between neighbouring photos.
pub const DEFAULT_GUTTER_MM: f64 = 2.0;

/// Grid of identical photos on one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetLayout {
    /// Sheet width in pixels.
    pub sheet_width: u32,
    /// Sheet height in pixels.
    pub sheet_height: u32,
    /// Photo width in pixels.
    pub photo_width: u32,
    /// Photo height in pixels.
    pub photo_height: u32,
    /// Columns used.
    pub columns: u32,
    /// Rows used.
    pub rows: u32,
    /// Gap between photos in pixels.
    pub gutter: u32,
    /// Top-left corner of each copy, row-major.
    pub positions: Vec<(u32, u32)>,
}

impl SheetLayout {
    /// Lays out the standard's copies on its sheet with the default gutter.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DoesNotFit`] if not even one photo fits.
    pub fn for_standard(standard: &PhotoStandard) -> Result<Self, LayoutError> {
        Self::with_gutter(standard, DEFAULT_GUTTER_MM)
    }

    /// Lays out the standard's copies with a custom gutter.
    ///
    /// Fits as many copies as possible up to the configured count and
    /// centres the block, so opposite margins are equal.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DoesNotFit`] if not even one photo fits.
    pub fn with_gutter(standard: &PhotoStandard, gutter_mm: f64) -> Result<Self, LayoutError> {
        let (sheet_width, sheet_height) = standard.sheet.size.to_pixels(standard.dpi);
        let (photo_width, photo_height) = standard.pixel_size();
        let gutter = mm_to_pixels(gutter_mm, standard.dpi);

        let fit = |sheet: u32, photo: u32| (sheet + gutter) / (photo + gutter);
        let max_columns = fit(sheet_width, photo_width);
        let max_rows = fit(sheet_height, photo_height);
        if max_columns == 0 || max_rows == 0 {
            return Err(LayoutError::DoesNotFit {
                photo_width,
                photo_height,
                sheet_width,
                sheet_height,
            });
        }

        let copies = standard.sheet.copies.clamp(1, max_columns * max_rows);
        let columns = max_columns.min(copies);
        let rows = copies.div_ceil(columns);

        let block = |n: u32, photo: u32| n * photo + (n - 1) * gutter;
        let margin_x = (sheet_width - block(columns, photo_width)) / 2;
        let margin_y = (sheet_height - block(rows, photo_height)) / 2;

        let positions = (0..copies)
            .map(|i| {
                let (col, row) = (i % columns, i / columns);
                (
                    margin_x + col * (photo_width + gutter),
                    margin_y + row * (photo_height + gutter),
                )
            })
            .collect();

        Ok(Self {
            sheet_width,
            sheet_height,
            photo_width,
            photo_height,
            columns,
            rows,
            gutter,
            positions,
        })
    }

    /// Number of copies placed.
    #[must_use]
    pub fn copies(&self) -> usize {
        self.positions.len()
    }
}

/// One kind of photo on a mixed sheet.
#[derive(Debug, Clone, Copy)]
pub struct SheetItem<'a> {
    /// Standard that defines the photo size.
    pub standard: &'a PhotoStandard,
    /// How many copies to place.
    pub copies: u32,
}

/// Position of one photo on a mixed sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// Index into the item list.
    pub item: usize,
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Photos of several sizes packed onto one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MixedSheetLayout {
    /// Sheet width in pixels.
    pub sheet_width: u32,
    /// Sheet height in pixels.
    pub sheet_height: u32,
    /// Placed photos.
    pub placements: Vec<Placement>,
}

/// Shelf-packs photos of different standards onto one sheet at `dpi`.
///
/// Photos are placed left to right in the given order, starting a new
/// shelf when a row is full. The gutter doubles as the outer margin.
///
/// # Errors
///
/// Returns [`LayoutError::DoesNotFit`] if a photo is larger than the sheet
/// and [`LayoutError::SheetFull`] if the sheet runs out of room.
pub fn pack_mixed_sheet(
    items: &[SheetItem<'_>],
    sheet: PhysicalSize,
    dpi: u32,
) -> Result<MixedSheetLayout, LayoutError> {
    let (sheet_width, sheet_height) = sheet.to_pixels(dpi);
    let gutter = mm_to_pixels(DEFAULT_GUTTER_MM, dpi);
    let requested: usize = items.iter().map(|i| i.copies as usize).sum();

    let mut placements = Vec::with_capacity(requested);
    let (mut x, mut y, mut shelf_height) = (gutter, gutter, 0u32);

    for (index, item) in items.iter().enumerate() {
        let (width, height) = item.standard.size.to_pixels(dpi);
        if width + 2 * gutter > sheet_width || height + 2 * gutter > sheet_height {
            return Err(LayoutError::DoesNotFit {
                photo_width: width,
                photo_height: height,
                sheet_width,
                sheet_height,
            });
        }
        for _ in 0..item.copies {
            if x + width + gutter > sheet_width {
                x = gutter;
                y += shelf_height + gutter;
                shelf_height = 0;
            }
            if y + height + gutter > sheet_height {
                return Err(LayoutError::SheetFull {
                    placed: placements.len(),
                    requested,
                });
            }
            placements.push(Placement {
                item: index,
                x,
                y,
                width,
                height,
            });
            x += width + gutter;
            shelf_height = shelf_height.max(height);
        }
    }

    Ok(MixedSheetLayout {
        sheet_width,
        sheet_height,
        placements,
    })
}
