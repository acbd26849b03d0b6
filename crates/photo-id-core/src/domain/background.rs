//! Background scoring result.

use serde::{Deserialize, Serialize};

/// Reason reported when pixels could not be read.
pub const UNREADABLE_REASON: &str = "Could not analyze background";

/// Mean colour of a sampled region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AverageRgb {
    /// Red channel mean.
    pub r: f64,
    /// Green channel mean.
    pub g: f64,
    /// Blue channel mean.
    pub b: f64,
}

impl AverageRgb {
    /// Formats the colour as uppercase `#RRGGBB`, rounding each channel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_hex(&self) -> String {
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

/// Verdict on whether the background needs automated removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BgAnalysis {
    /// 0-100, higher is whiter and flatter.
    pub score: f32,
    /// Mean background colour.
    pub average_rgb: AverageRgb,
    /// Whether removal is recommended.
    pub needs_removal: bool,
    /// Human-readable cause.
    pub reason: String,
}

impl BgAnalysis {
    /// Fallback returned when the pixel source cannot be read.
    #[must_use]
    pub fn unreadable() -> Self {
        Self {
            score: 0.0,
            average_rgb: AverageRgb::default(),
            needs_removal: true,
            reason: UNREADABLE_REASON.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rounds_and_uppercases() {
        let rgb = AverageRgb {
            r: 254.6,
            g: 10.4,
            b: 171.0,
        };
        assert_eq!(rgb.to_hex(), "#FF0AAB");
    }

    #[test]
    fn test_unreadable_fallback() {
        let bg = BgAnalysis::unreadable();
        assert!(bg.needs_removal);
        assert!(bg.score.abs() < f32::EPSILON);
        assert_eq!(bg.reason, UNREADABLE_REASON);
    }
}
