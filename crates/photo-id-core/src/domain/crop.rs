//! Crop window and user adjustments.

use serde::{Deserialize, Serialize};

/// User-controlled framing tweaks applied on top of the automatic crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropAdjustment {
    /// Magnification, `1.0` keeps the automatic framing.
    pub zoom: f64,
    /// Horizontal shift as a fraction of half the crop width.
    pub offset_x: f64,
    /// Vertical shift as a fraction of half the crop height.
    pub offset_y: f64,
    /// Brightness change applied when rendering, `-100..=100`.
    pub brightness: i32,
}

impl CropAdjustment {
    /// Smallest accepted zoom.
    pub const MIN_ZOOM: f64 = 0.1;

    /// Returns a copy with every field forced into its valid range.
    #[must_use]
    pub fn clamped(self) -> Self {
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Self {
            zoom: finite(self.zoom, 1.0).max(Self::MIN_ZOOM),
            offset_x: finite(self.offset_x, 0.0).clamp(-1.0, 1.0),
            offset_y: finite(self.offset_y, 0.0).clamp(-1.0, 1.0),
            brightness: self.brightness.clamp(-100, 100),
        }
    }
}

impl Default for CropAdjustment {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            brightness: 0,
        }
    }
}

/// Rectangle to extract from the source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropResult {
    /// Left edge.
    pub crop_x: f64,
    /// Top edge.
    pub crop_y: f64,
    /// Width.
    pub crop_w: f64,
    /// Height.
    pub crop_h: f64,
    /// Zoom that was applied.
    pub zoom: f64,
    /// Horizontal offset that was applied.
    pub offset_x: f64,
    /// Vertical offset that was applied.
    pub offset_y: f64,
}

impl CropResult {
    /// `crop_w / crop_h`.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.crop_w / self.crop_h
    }

    /// Whether the window lies inside a `width × height` frame.
    #[must_use]
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        const EPS: f64 = 1e-6;
        self.crop_x >= -EPS
            && self.crop_y >= -EPS
            && self.crop_w > 0.0
            && self.crop_h > 0.0
            && self.crop_x + self.crop_w <= f64::from(width) + EPS
            && self.crop_y + self.crop_h <= f64::from(height) + EPS
    }

    /// Integer rectangle `(x, y, w, h)` inside a `width × height` frame, at least 1×1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_rect(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let x = (self.crop_x.round().max(0.0) as u32).min(width.saturating_sub(1));
        let y = (self.crop_y.round().max(0.0) as u32).min(height.saturating_sub(1));
        let w = (self.crop_w.round().max(1.0) as u32).min(width - x);
        let h = (self.crop_h.round().max(1.0) as u32).min(height - y);
        (x, y, w, h)
    }
}
