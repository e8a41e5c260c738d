//! Removal of transient upload files.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::archive::ARCHIVE_NAME;
use crate::session::{SHARP_DIR, TEMP_DIR};

/// Removes regular files from `temp/` and `temp/sharp/` under `root`.
///
/// The sharp archive in `temp/` is kept so a finished download survives the
/// next request; any other file, uploaded ZIPs included, is removed.
/// Missing directories count as already clean.
///
/// # Errors
///
/// Returns an error if a directory exists but cannot be listed, or a file
/// cannot be removed.
pub fn clear_transient(root: &Path) -> Result<usize> {
    let temp = root.join(TEMP_DIR);
    let mut removed = 0;

    for dir in [temp.join(SHARP_DIR), temp] {
        if !dir.is_dir() {
            continue;
        }
        let entries = std::fs::read_dir(&dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || is_archive(&path) {
                continue;
            }
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            debug!("Removed {}", path.display());
            removed += 1;
        }
    }

    info!("Cleared {removed} transient files under {}", root.display());
    Ok(removed)
}

/// Runs [`clear_transient`] on a background thread after `delay`.
///
/// Failures are logged; join the handle to wait for completion.
#[must_use]
pub fn spawn_delayed_cleanup(root: PathBuf, delay: Duration) -> JoinHandle<usize> {
    std::thread::spawn(move || {
        std::thread::sleep(delay);
        match clear_transient(&root) {
            Ok(count) => count,
            Err(e) => {
                warn!("Delayed cleanup of {} failed: {e:#}", root.display());
                0
            }
        }
    })
}

fn is_archive(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == ARCHIVE_NAME)
}
