//! Where the batch runner gets its images from.

use crate::domain::ImageInfo;

/// An ordered supply of decoded (or undecodable) images.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over images from this source.
    ///
    /// # Errors
    ///
    /// Individual items are errors if an image cannot be read at all. Images
    /// that are read but fail to decode are yielded as `Ok` with a failed
    /// [`ImageInfo::pixels`].
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_>;

    /// Returns the total number of images, if known.
    fn count_hint(&self) -> Option<usize>;
}
