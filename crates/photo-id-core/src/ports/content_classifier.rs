//! Content classifier port.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::PixelBuffer;

/// Categories a content classifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    /// Nudity or sexual content.
    Explicit,
    /// Revealing but not explicit.
    Suggestive,
    /// Gore or violence.
    Violence,
    /// Visible weapon.
    Weapon,
    /// Hate symbols.
    HateSymbol,
    /// Drugs or paraphernalia.
    Drugs,
}

impl ContentCategory {
    /// Every category, in code order.
    pub const ALL: [Self; 6] = [
        Self::Explicit,
        Self::Suggestive,
        Self::Violence,
        Self::Weapon,
        Self::HateSymbol,
        Self::Drugs,
    ];

    /// Stable machine code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Suggestive => "suggestive",
            Self::Violence => "violence",
            Self::Weapon => "weapon",
            Self::HateSymbol => "hate_symbol",
            Self::Drugs => "drugs",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Explicit => "Explicit content",
            Self::Suggestive => "Suggestive content",
            Self::Violence => "Violent content",
            Self::Weapon => "Weapon visible",
            Self::HateSymbol => "Hate symbol",
            Self::Drugs => "Drug-related content",
        }
    }

    /// Whether a confident detection blocks the image outright.
    #[must_use]
    pub const fn can_block(self) -> bool {
        matches!(self, Self::Explicit | Self::Violence | Self::HateSymbol)
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentLabel {
    /// Category.
    pub category: ContentCategory,
    /// Confidence in `0..=1`.
    pub confidence: f32,
}

/// External content classification service.
pub trait ContentClassifier: Send + Sync {
    /// Classifies `pixels`.
    ///
    /// # Errors
    ///
    /// Returns an error if the classifier is unavailable.
    fn classify(&self, pixels: &PixelBuffer) -> anyhow::Result<Vec<ContentLabel>>;
}
