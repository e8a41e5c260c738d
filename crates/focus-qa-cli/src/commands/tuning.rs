//! Classifier tuning flags shared by `check` and `sort`.

use clap::Args;
use focus_qa_core::{FocusConfig, PatchGrid};

use crate::config::AppConfig;

/// Parse a fraction in (0.0, 1.0].
fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!("{value} is not in (0.0, 1.0]"))
    }
}

/// Parse a patch grid written as `ROWSxCOLS`.
fn parse_grid(s: &str) -> Result<PatchGrid, String> {
    let (rows, cols) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("'{s}' is not of the form ROWSxCOLS"))?;
    let rows: usize = rows
        .trim()
        .parse()
        .map_err(|_| format!("'{rows}' is not a valid row count"))?;
    let cols: usize = cols
        .trim()
        .parse()
        .map_err(|_| format!("'{cols}' is not a valid column count"))?;
    if rows == 0 || cols == 0 {
        return Err(format!("grid {rows}x{cols} has no cells"));
    }
    Ok(PatchGrid::new(rows, cols))
}

/// Parse a strictly positive integer.
fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(v) => Ok(v),
        Err(_) => Err(format!("'{s}' is not a valid positive integer")),
    }
}

/// Threshold and geometry overrides.
#[derive(Args, Clone, Debug, Default)]
pub struct TuningArgs {
    /// Base threshold for the combined global focus score
    #[arg(long)]
    pub global_threshold: Option<f64>,

    /// Base threshold for a patch's Laplacian variance
    #[arg(long)]
    pub local_threshold: Option<f64>,

    /// Fraction of blurry patches above which an image is blurry (0.0-1.0]
    #[arg(long, value_parser = parse_fraction)]
    pub fraction_blurry: Option<f64>,

    /// Patch grid, e.g. 5x5
    #[arg(long, value_name = "ROWSxCOLS", value_parser = parse_grid)]
    pub patch_grid: Option<PatchGrid>,

    /// Downsize images wider than this before scoring
    #[arg(long, value_parser = parse_positive)]
    pub max_width: Option<usize>,

    /// Scales of the multi-scale Laplacian
    #[arg(long, value_parser = parse_positive)]
    pub levels: Option<usize>,

    /// Worker threads (0 = one per CPU core)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

impl TuningArgs {
    /// Resolves the classifier configuration.
    ///
    /// Layering priority (lowest to highest): built-in defaults, config
    /// file `[focus]` section, CLI flags.
    #[must_use]
    pub fn focus_config(&self, config: &AppConfig) -> FocusConfig {
        let mut focus = config.focus.apply(FocusConfig::default());
        if let Some(v) = self.global_threshold {
            focus.global_threshold = v;
        }
        if let Some(v) = self.local_threshold {
            focus.local_threshold = v;
        }
        if let Some(v) = self.fraction_blurry {
            focus.fraction_blurry = v;
        }
        if let Some(grid) = self.patch_grid {
            focus.patch_grid = grid;
        }
        if let Some(v) = self.max_width {
            focus.max_width = v;
        }
        if let Some(v) = self.levels {
            focus.laplacian_levels = v;
        }
        focus
    }

    /// Worker threads: CLI, then config, then automatic.
    #[must_use]
    pub fn jobs(&self, config: &AppConfig) -> usize {
        self.jobs.or(config.general.jobs).unwrap_or(0)
    }
}
