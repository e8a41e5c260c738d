//! Focus QA Adapters - External adapters for focus-qa.
//!
//! This crate provides adapters for:
//! - Filesystem image source
//! - Per-request upload sessions with a sharp set
//! - ZIP archiving of the sharp set
//! - Cleanup of transient upload files

pub mod archive;
pub mod cleanup;
pub mod fs;
pub mod session;

pub use archive::{build_sharp_archive, ARCHIVE_NAME};
pub use cleanup::{clear_transient, spawn_delayed_cleanup};
pub use fs::FsImageSource;
pub use session::{SharpSetOutput, StoredImage, UploadSession};
