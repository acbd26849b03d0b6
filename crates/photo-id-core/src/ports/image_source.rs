//! Batch image source port.

use crate::domain::ImageInfo;

/// Supplies decoded images for a batch run.
pub trait ImageSource: Send + Sync {
    /// Iterates over the source's images.
    ///
    /// Items that fail to decode are yielded as errors so the batch can skip
    /// them and continue.
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_>;

    /// Number of images, if known up front.
    fn count_hint(&self) -> Option<usize>;
}
