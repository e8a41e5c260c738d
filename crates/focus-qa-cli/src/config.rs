//! Layered TOML configuration.
//!
//! Layers, lowest priority first: `~/.config/focus-qa/config.toml`, the
//! nearest `.focus-qa.toml` above the working directory, then command-line
//! flags (applied by the commands).

use std::path::{Path, PathBuf};

use focus_qa_core::{FocusConfig, PatchGrid};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Classifier tuning.
    pub focus: FocusSection,
    /// Output formatting settings.
    pub output: OutputConfig,
    /// Upload workspace settings for `sort` and `clean`.
    pub workspace: WorkspaceConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
    /// Worker threads (0 = one per CPU core).
    pub jobs: Option<usize>,
}

/// Classifier tuning; unset fields keep the built-in defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FocusSection {
    /// Base threshold for the combined global score.
    pub global_threshold: Option<f64>,
    /// Base threshold for a patch's Laplacian variance.
    pub local_threshold: Option<f64>,
    /// Fraction of blurry patches above which the image is blurry.
    pub fraction_blurry: Option<f64>,
    /// Patch grid rows.
    pub patch_rows: Option<usize>,
    /// Patch grid columns.
    pub patch_cols: Option<usize>,
    /// Weight of the multi-scale Laplacian variance.
    pub laplacian_weight: Option<f64>,
    /// Weight of the Tenengrad measure.
    pub tenengrad_weight: Option<f64>,
    /// Weight of the FFT measure.
    pub fft_weight: Option<f64>,
    /// Suppressed low-frequency fraction.
    pub fft_high_pass_fraction: Option<f64>,
    /// Scales of the multi-scale Laplacian.
    pub laplacian_levels: Option<usize>,
    /// Width above which images are downsized.
    pub max_width: Option<usize>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
    /// Include per-measure details.
    pub details: Option<bool>,
}

/// Upload workspace configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Workspace root holding `temp/` and `temp/sharp/`.
    pub dir: Option<PathBuf>,
    /// Seconds to wait before clearing transient files after `sort`.
    pub cleanup_delay_secs: Option<u64>,
}

impl FocusSection {
    /// Overlays the values present in this section onto `base`.
    #[must_use]
    pub fn apply(&self, mut base: FocusConfig) -> FocusConfig {
        if let Some(v) = self.global_threshold {
            base.global_threshold = v;
        }
        if let Some(v) = self.local_threshold {
            base.local_threshold = v;
        }
        if let Some(v) = self.fraction_blurry {
            base.fraction_blurry = v;
        }
        base.patch_grid = PatchGrid::new(
            self.patch_rows.unwrap_or(base.patch_grid.rows),
            self.patch_cols.unwrap_or(base.patch_grid.cols),
        );
        if let Some(v) = self.laplacian_weight {
            base.weights.laplacian = v;
        }
        if let Some(v) = self.tenengrad_weight {
            base.weights.tenengrad = v;
        }
        if let Some(v) = self.fft_weight {
            base.weights.fft = v;
        }
        if let Some(v) = self.fft_high_pass_fraction {
            base.fft_high_pass_fraction = v;
        }
        if let Some(v) = self.laplacian_levels {
            base.laplacian_levels = v;
        }
        if let Some(v) = self.max_width {
            base.max_width = v;
        }
        base
    }

    fn merge(&mut self, other: &Self) {
        self.global_threshold = other.global_threshold.or(self.global_threshold);
        self.local_threshold = other.local_threshold.or(self.local_threshold);
        self.fraction_blurry = other.fraction_blurry.or(self.fraction_blurry);
        self.patch_rows = other.patch_rows.or(self.patch_rows);
        self.patch_cols = other.patch_cols.or(self.patch_cols);
        self.laplacian_weight = other.laplacian_weight.or(self.laplacian_weight);
        self.tenengrad_weight = other.tenengrad_weight.or(self.tenengrad_weight);
        self.fft_weight = other.fft_weight.or(self.fft_weight);
        self.fft_high_pass_fraction = other.fft_high_pass_fraction.or(self.fft_high_pass_fraction);
        self.laplacian_levels = other.laplacian_levels.or(self.laplacian_levels);
        self.max_width = other.max_width.or(self.max_width);
    }
}

impl AppConfig {
    /// Reads every config layer that exists, later layers overriding earlier
    /// ones, and prints a warning for out-of-range values.
    ///
    /// Unreadable or unparseable files are skipped with a logged warning.
    pub fn load() -> Self {
        let layers = [xdg_config_path(), find_project_config()];
        let config = layers
            .into_iter()
            .flatten()
            .filter_map(|path| {
                info!("Loading config layer: {}", path.display());
                load_file(&path)
            })
            .fold(Self::default(), |mut acc, layer| {
                acc.merge(layer);
                acc
            });

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }
        config
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        self.focus
            .apply(FocusConfig::default())
            .validate()
            .map_err(|e| format!("[focus] {e}"))?;

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                return Err(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);
        self.general.jobs = other.general.jobs.or(self.general.jobs);

        self.focus.merge(&other.focus);

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
        self.output.details = other.output.details.or(self.output.details);

        self.workspace.dir = other.workspace.dir.or_else(|| self.workspace.dir.take());
        self.workspace.cleanup_delay_secs = other
            .workspace
            .cleanup_delay_secs
            .or(self.workspace.cleanup_delay_secs);
    }
}

const PROJECT_FILE: &str = ".focus-qa.toml";

/// `<config dir>/focus-qa/config.toml`, if it exists.
fn xdg_config_path() -> Option<PathBuf> {
    let path = dirs::config_dir()?.join("focus-qa").join("config.toml");
    if path.is_file() {
        Some(path)
    } else {
        debug!("No user config at {}", path.display());
        None
    }
}

fn find_project_config() -> Option<PathBuf> {
    find_config_in_parents(&std::env::current_dir().ok()?)
}

/// Nearest `.focus-qa.toml` in `start` or one of its ancestors.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_FILE))
        .find(|candidate| candidate.is_file())
}

fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| warn!("Failed to read config file {}: {e}", path.display()))
        .ok()?;
    toml::from_str(&content)
        .map_err(|e| warn!("Failed to parse config file {}: {e}", path.display()))
        .ok()
}
