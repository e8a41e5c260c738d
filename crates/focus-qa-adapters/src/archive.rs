//! ZIP archive of the sharp set.

use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::session::UploadSession;

/// File name of the archive inside `temp/`.
pub const ARCHIVE_NAME: &str = "sharp_images.zip";

/// Writes `temp/sharp_images.zip` with every sharp-set file.
///
/// Entries are named after the original upload name, falling back to the
/// stored name when the original is unknown or already used by another
/// entry.
///
/// # Errors
///
/// Returns an error if the sharp set cannot be read or the archive written.
pub fn build_sharp_archive(session: &UploadSession) -> Result<PathBuf> {
    let zip_path = session.temp_dir().join(ARCHIVE_NAME);
    let file = std::fs::File::create(&zip_path)
        .with_context(|| format!("Failed to create {}", zip_path.display()))?;

    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut used = HashSet::new();
    let mut count = 0usize;

    for path in session.sharp_files()? {
        let stored_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut entry_name = session
            .original_name(&stored_name)
            .unwrap_or(&stored_name)
            .to_string();
        if !used.insert(entry_name.clone()) {
            warn!("Duplicate archive name {entry_name}, using {stored_name}");
            entry_name.clone_from(&stored_name);
            used.insert(entry_name.clone());
        }

        let bytes =
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        writer
            .start_file(entry_name.as_str(), options)
            .with_context(|| format!("Failed to add {entry_name} to archive"))?;
        writer.write_all(&bytes)?;
        count += 1;
    }

    writer.finish().context("Failed to finalize archive")?;
    info!("Archived {count} sharp images to {}", zip_path.display());
    Ok(zip_path)
}
