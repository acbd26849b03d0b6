//! Per-country document photo standards.
//!
//! The table is reference data: every rule and layout computation is generic
//! over it, so adding a document is a one-entry change.

use serde::Serialize;

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

/// Unit of a physical dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Millimetres.
    Mm,
    /// Inches.
    Inch,
}

/// A physical width × height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicalSize {
    /// Width in `unit`.
    pub width: f64,
    /// Height in `unit`.
    pub height: f64,
    /// Unit of both dimensions.
    pub unit: Unit,
}

impl PhysicalSize {
    /// Size in millimetres.
    #[must_use]
    pub const fn mm(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            unit: Unit::Mm,
        }
    }

    /// Size in inches.
    #[must_use]
    pub const fn inches(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            unit: Unit::Inch,
        }
    }

    /// Width in inches.
    #[must_use]
    pub fn width_in(&self) -> f64 {
        match self.unit {
            Unit::Inch => self.width,
            Unit::Mm => self.width / MM_PER_INCH,
        }
    }

    /// Height in inches.
    #[must_use]
    pub fn height_in(&self) -> f64 {
        match self.unit {
            Unit::Inch => self.height,
            Unit::Mm => self.height / MM_PER_INCH,
        }
    }

    /// `width / height`.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Pixel dimensions at `dpi`, rounded, at least 1×1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_pixels(&self, dpi: u32) -> (u32, u32) {
        let dpi = f64::from(dpi);
        let w = (self.width_in() * dpi).round().max(1.0) as u32;
        let h = (self.height_in() * dpi).round().max(1.0) as u32;
        (w, h)
    }
}

/// Converts millimetres to pixels at `dpi`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn mm_to_pixels(mm: f64, dpi: u32) -> u32 {
    (mm / MM_PER_INCH * f64::from(dpi)).round().max(0.0) as u32
}

/// Inclusive percentage range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl PercentRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Centre of the range.
    #[must_use]
    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) / 2.0
    }

    /// Whether `value` is inside the range.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Distance from `value` to the nearest bound, 0 when inside.
    #[must_use]
    pub fn distance(&self, value: f32) -> f32 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }
}

/// Required background.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundClass {
    /// Plain white.
    White,
    /// Light grey or off-white accepted.
    LightGrey,
}

impl BackgroundClass {
    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::LightGrey => "light grey",
        }
    }
}

/// Print sheet for multiple copies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SheetSpec {
    /// Sheet size.
    pub size: PhysicalSize,
    /// Number of copies to tile.
    pub copies: u32,
}

/// Standard 4×6 inch photo print.
const SHEET_4X6: PhysicalSize = PhysicalSize::inches(4.0, 6.0);

/// Geometric and photometric specification for one country/document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhotoStandard {
    /// Lookup identifier, e.g. `us-passport`.
    pub id: &'static str,
    /// Country name.
    pub country: &'static str,
    /// Document name.
    pub document: &'static str,
    /// Printed photo size.
    pub size: PhysicalSize,
    /// Accepted crown-to-chin height, percent of photo height.
    pub head_height: PercentRange,
    /// Accepted eye line height from the bottom, percent of photo height.
    pub eye_line: PercentRange,
    /// Required background.
    pub background: BackgroundClass,
    /// Output resolution.
    pub dpi: u32,
    /// Whether a colour photo is mandatory.
    pub requires_color: bool,
    /// Print sheet layout.
    pub sheet: SheetSpec,
}

impl PhotoStandard {
    /// Required `width / height` of the photo.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.size.aspect_ratio()
    }

    /// Output pixel dimensions.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        self.size.to_pixels(self.dpi)
    }
}

static STANDARDS: [PhotoStandard; 9] = [
    PhotoStandard {
        id: "us-passport",
        country: "United States",
        document: "Passport",
        size: PhysicalSize::inches(2.0, 2.0),
        head_height: PercentRange::new(50.0, 69.0),
        eye_line: PercentRange::new(56.0, 69.0),
        background: BackgroundClass::White,
        dpi: 300,
        requires_color: true,
        sheet: SheetSpec {
            size: SHEET_4X6,
            copies: 2,
        },
    },
    PhotoStandard {
        id: "us-visa",
        country: "United States",
        document: "Visa",
        size: PhysicalSize::inches(2.0, 2.0),
        head_height: PercentRange::new(50.0, 69.0),
        eye_line: PercentRange::new(56.0, 69.0),
        background: BackgroundClass::White,
        dpi: 300,
        requires_color: true,
        sheet: SheetSpec {
            size: SHEET_4X6,
            copies: 2,
        },
    },
    PhotoStandard {
        id: "uk-passport",
        country: "United Kingdom",
        document: "Passport",
        size: PhysicalSize::mm(35.0, 45.0),
        head_height: PercentRange::new(64.0, 76.0),
        eye_line: PercentRange::new(50.0, 66.0),
        background: BackgroundClass::LightGrey,
        dpi: 300,
        requires_color: true,
        sheet: SheetSpec {
            size: SHEET_4X6,
            copies: 6,
        },
    },
    PhotoStandard {
        id: "schengen-visa",
        country: "Schengen Area",
        document: "Visa",
        size: PhysicalSize::mm(35.0, 45.0),
        head_height: PercentRange::new(71.0, 80.0),
        eye_line: PercentRange::new(50.0, 65.0),
        background: BackgroundClass::LightGrey,
        dpi: 300,
        requires_color: true,
        sheet: SheetSpec {
            size: SHEET_4X6,
            copies: 6,
        },
    },
    PhotoStandard {
        id: "ca-passport",
        country: "Canada",
        document: "Passport",
        size: PhysicalSize::mm(50.0, 70.0),
        head_height: PercentRange::new(44.0, 52.0),
        eye_line: PercentRange::new(55.0, 70.0),
        background: BackgroundClass::White,
        dpi: 300,
        requires_color: true,
        sheet: SheetSpec {
            size: SHEET_4X6,
            copies: 2,
        },
    },
    PhotoStandard {
        id: "au-passport",
        country: "Australia",
        document: "Passport",
        size: PhysicalSize::mm(35.0, 45.0),
        head_height: PercentRange::new(71.0, 80.0),
        eye_line: PercentRange::new(50.0, 65.0),
        background: BackgroundClass::LightGrey,
        dpi: 300,
        requires_color: true,
        sheet: SheetSpec {
            size: SHEET_4X6,
            copies: 6,
        },
    },
    PhotoStandard {
        id: "in-passport",
        country: "India",
        document: "Passport",
        size: PhysicalSize::inches(2.0, 2.0),
        head_height: PercentRange::new(50.0, 69.0),
        eye_line: PercentRange::new(56.0, 69.0),
        background: BackgroundClass::White,
        dpi: 300,
        requires_color: true,
        sheet: SheetSpec {
            size: SHEET_4X6,
            copies: 2,
        },
    },
    PhotoStandard {
        id: "cn-visa",
        country: "China",
        document: "Visa",
        size: PhysicalSize::mm(33.0, 48.0),
        head_height: PercentRange::new(58.0, 69.0),
        eye_line: PercentRange::new(50.0, 66.0),
        background: BackgroundClass::White,
        dpi: 300,
        requires_color: true,
        sheet: SheetSpec {
            size: SHEET_4X6,
            copies: 6,
        },
    },
    PhotoStandard {
        id: "jp-passport",
        country: "Japan",
        document: "Passport",
        size: PhysicalSize::mm(35.0, 45.0),
        head_height: PercentRange::new(71.0, 80.0),
        eye_line: PercentRange::new(50.0, 65.0),
        background: BackgroundClass::White,
        dpi: 300,
        requires_color: true,
        sheet: SheetSpec {
            size: SHEET_4X6,
            copies: 6,
        },
    },
];

/// All known standards, in display order.
#[must_use]
pub fn standards() -> &'static [PhotoStandard] {
    &STANDARDS
}

/// Finds a standard by identifier, ignoring case and punctuation.
#[must_use]
pub fn standard_by_id(id: &str) -> Option<&'static PhotoStandard> {
    let key = normalize_id(id);
    standards().iter().find(|s| normalize_id(s.id) == key)
}

fn normalize_id(id: &str) -> String {
    id.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
