//! Generation tokens for stale-result suppression.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Marker identifying which input image a result was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationToken(u64);

impl GenerationToken {
    /// Wraps a value read back from a report.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tokens. Shareable across threads.
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: AtomicU64,
}

impl GenerationCounter {
    /// Creates a counter whose first token is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: AtomicU64::new(0),
        }
    }

    /// Starts a new generation, superseding every earlier token.
    pub fn next(&self) -> GenerationToken {
        GenerationToken(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// The latest issued token.
    #[must_use]
    pub fn current(&self) -> GenerationToken {
        GenerationToken(self.current.load(Ordering::Acquire))
    }

    /// Whether `token` belongs to the latest generation.
    #[must_use]
    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.current() == token
    }
}
