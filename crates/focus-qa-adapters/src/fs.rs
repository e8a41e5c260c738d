//! Image discovery and decoding on the local filesystem.

use anyhow::{Context, Result};
use focus_qa_core::{ImageInfo, ImageSource};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Raster formats the decoder is built for, compared case-insensitively.
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif"];

/// Images named on the command line, expanded from files and directories.
///
/// Discovery order is stable: arguments in the order given, directory
/// entries by path.
pub struct FsImageSource {
    roots: Vec<PathBuf>,
    recursive: bool,
}

impl FsImageSource {
    /// Scans `roots`; subdirectories of a directory root are only entered when
    /// `recursive` is set.
    #[must_use]
    pub const fn new(roots: Vec<PathBuf>, recursive: bool) -> Self {
        Self { roots, recursive }
    }

    /// Every supported image reachable from the roots, in discovery order.
    #[must_use]
    pub fn collect_files(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for root in &self.roots {
            match classify_root(root) {
                Root::File => found.push(root.clone()),
                Root::Directory => self.walk(root, &mut found),
                Root::Unsupported => warn!("Not a supported image: {}", root.display()),
                Root::Missing => warn!("No such file or directory: {}", root.display()),
            }
        }
        found
    }

    /// Depth-first walk with an explicit stack; entries pushed in reverse so
    /// they pop in sorted order.
    fn walk(&self, dir: &Path, found: &mut Vec<PathBuf>) {
        let mut pending = sorted_entries(dir);
        pending.reverse();

        while let Some(entry) = pending.pop() {
            if entry.is_dir() {
                if self.recursive {
                    pending.extend(sorted_entries(&entry).into_iter().rev());
                }
            } else if entry.is_file() && is_supported_image(&entry) {
                found.push(entry);
            }
        }
    }
}

enum Root {
    File,
    Directory,
    Unsupported,
    Missing,
}

fn classify_root(path: &Path) -> Root {
    if path.is_dir() {
        Root::Directory
    } else if !path.is_file() {
        Root::Missing
    } else if is_supported_image(path) {
        Root::File
    } else {
        Root::Unsupported
    }
}

fn sorted_entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
            paths.sort();
            paths
        }
        Err(e) => {
            warn!("Cannot list {}: {e}", dir.display());
            Vec::new()
        }
    }
}

impl ImageSource for FsImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo>> + Send + '_> {
        let files = self.collect_files();
        debug!(count = files.len(), "Discovered images");
        Box::new(files.into_iter().map(|path| load_image(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Whether the file extension names a decodable raster format.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    RASTER_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

/// Reads and decodes an image file.
///
/// # Errors
///
/// Returns an error only if the file cannot be read. Undecodable contents
/// produce an [`ImageInfo`] carrying the decode failure.
pub fn load_image(path: &Path) -> Result<ImageInfo> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(decode_image(path, &bytes))
}

/// Decodes in-memory image bytes, sniffing the format from the content.
#[must_use]
pub fn decode_image(path: &Path, bytes: &[u8]) -> ImageInfo {
    let path_str = path.to_string_lossy().into_owned();
    match image::load_from_memory(bytes) {
        Ok(image) => ImageInfo::new(path_str, image),
        Err(e) => {
            warn!("Failed to decode {}: {e}", path.display());
            ImageInfo::undecodable(path_str, e.to_string())
        }
    }
}
