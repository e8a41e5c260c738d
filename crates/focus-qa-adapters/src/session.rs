//! Per-request upload session.
//!
//! A session owns a workspace root with two directories: `temp/` holds every
//! uploaded file under a collision-free stored name, `temp/sharp/` holds the
//! copies retained as sharp. The stored-name to original-name mapping lives
//! in the session itself, so concurrent sessions over different roots never
//! share state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{bail, Context, Result};
use focus_qa_core::{AnalysisResult, ImageInfo, ImageSource, ResultOutput};
use tracing::{debug, info};
use uuid::Uuid;

use crate::cleanup::clear_transient;
use crate::fs::decode_image;

/// Directory under the root holding uploaded files.
pub const TEMP_DIR: &str = "temp";
/// Directory under `temp/` holding the sharp set.
pub const SHARP_DIR: &str = "sharp";

/// An upload stored in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// `<uuid-hex>_<original name>`.
    pub stored_name: String,
    /// Name the file was uploaded under.
    pub original_name: String,
    /// Location of the stored copy.
    pub path: PathBuf,
}

/// Upload workspace for a single request.
#[derive(Debug)]
pub struct UploadSession {
    root: PathBuf,
    stored: Vec<StoredImage>,
    names: HashMap<String, String>,
}

impl UploadSession {
    /// Opens a session on `root`, creating its directories and clearing
    /// transient files left by a previous request.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created or cleared.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let sharp = root.join(TEMP_DIR).join(SHARP_DIR);
        std::fs::create_dir_all(&sharp)
            .with_context(|| format!("Failed to create {}", sharp.display()))?;

        let cleared = clear_transient(&root)?;
        info!(
            "Opened upload session at {} ({cleared} stale files removed)",
            root.display()
        );

        Ok(Self {
            root,
            stored: Vec::new(),
            names: HashMap::new(),
        })
    }

    /// Workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding uploaded files.
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.root.join(TEMP_DIR)
    }

    /// Directory holding the sharp set.
    #[must_use]
    pub fn sharp_dir(&self) -> PathBuf {
        self.temp_dir().join(SHARP_DIR)
    }

    /// Stores an upload under a fresh unique name.
    ///
    /// Only the final path component of `original_name` is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or the file cannot be written.
    pub fn ingest(&mut self, original_name: &str, bytes: &[u8]) -> Result<StoredImage> {
        let original_name = sanitize_name(original_name)
            .with_context(|| format!("Invalid upload name: {original_name:?}"))?;
        let stored_name = format!("{}_{original_name}", Uuid::new_v4().simple());
        let path = self.temp_dir().join(&stored_name);

        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to store upload {}", path.display()))?;
        debug!("Stored {original_name} as {stored_name}");

        let stored = StoredImage {
            stored_name: stored_name.clone(),
            original_name: original_name.clone(),
            path,
        };
        self.names.insert(stored_name, original_name);
        self.stored.push(stored.clone());
        Ok(stored)
    }

    /// Reads a local file and stores it under its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or stored.
    pub fn ingest_file(&mut self, path: &Path) -> Result<StoredImage> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.ingest(&name, &bytes)
    }

    /// Everything stored so far, in upload order.
    #[must_use]
    pub fn stored(&self) -> &[StoredImage] {
        &self.stored
    }

    /// Original name of a stored file, if it belongs to this session.
    #[must_use]
    pub fn original_name(&self, stored_name: &str) -> Option<&str> {
        self.names.get(stored_name).map(String::as_str)
    }

    /// Path of a stored file, if it belongs to this session.
    #[must_use]
    pub fn resolve(&self, stored_name: &str) -> Option<PathBuf> {
        self.names
            .contains_key(stored_name)
            .then(|| self.temp_dir().join(stored_name))
    }

    /// Copies a stored file into the sharp set.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the copy fails.
    pub fn retain_sharp(&self, stored_name: &str) -> Result<PathBuf> {
        let Some(source) = self.resolve(stored_name) else {
            bail!("Unknown stored image: {stored_name}");
        };
        let target = self.sharp_dir().join(stored_name);
        std::fs::copy(&source, &target).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                source.display(),
                target.display()
            )
        })?;
        debug!("Retained {stored_name} as sharp");
        Ok(target)
    }

    /// Files currently in the sharp set, sorted by stored name.
    ///
    /// # Errors
    ///
    /// Returns an error if the sharp directory cannot be listed.
    pub fn sharp_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self.sharp_dir();
        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files)
    }
}

impl ImageSource for UploadSession {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo>> + Send + '_> {
        Box::new(self.stored.iter().map(|stored| {
            let bytes = std::fs::read(&stored.path)
                .with_context(|| format!("Failed to read {}", stored.path.display()))?;
            Ok(decode_image(&stored.path, &bytes).with_original_name(&stored.original_name))
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.stored.len())
    }
}

/// Result consumer that copies every sharp image into the session's sharp set.
pub struct SharpSetOutput<'a> {
    session: &'a UploadSession,
    retained: Mutex<usize>,
}

impl<'a> SharpSetOutput<'a> {
    /// Creates an output feeding `session`.
    #[must_use]
    pub const fn new(session: &'a UploadSession) -> Self {
        Self {
            session,
            retained: Mutex::new(0),
        }
    }

    /// Number of images retained so far.
    #[must_use]
    pub fn retained(&self) -> usize {
        *self.retained.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultOutput for SharpSetOutput<'_> {
    fn write(&self, result: &AnalysisResult) -> Result<()> {
        if result.is_blurry {
            return Ok(());
        }
        let stored_name = Path::new(&result.path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.session.retain_sharp(&stored_name)?;
        *self.retained.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        Ok(())
    }
}

fn sanitize_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Some(last.to_string())
}
