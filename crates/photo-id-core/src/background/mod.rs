//! Background analysis and removal.

mod analyzer;
mod removal;

pub use analyzer::{BackgroundAnalyzer, BackgroundConfig};
pub use removal::{composite_on_white, remove_background, ModelHandle, ModelState};
