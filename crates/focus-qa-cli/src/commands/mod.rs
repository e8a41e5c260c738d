//! CLI command definitions and handlers.

pub mod check;
pub mod clean;
pub mod sort;
pub mod tuning;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Focus QA - Sort photos into sharp and blurry
#[derive(Parser)]
#[command(name = "focus-qa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (paths, thresholds, flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Classify images as sharp or blurry
    Check(Box<check::CheckArgs>),
    /// Store uploads, keep the sharp ones and archive them
    Sort(Box<sort::SortArgs>),
    /// Clear transient files from the upload workspace
    Clean(clean::CleanArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every image is sharp.
    Success = 0,
    /// At least one image is blurry.
    BlurryFound = 1,
    /// The command failed.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

/// Workspace root: CLI flag, then config, then the user cache directory.
pub fn workspace_root(cli: Option<&PathBuf>, config: &AppConfig) -> PathBuf {
    cli.cloned()
        .or_else(|| config.workspace.dir.clone())
        .or_else(|| dirs::cache_dir().map(|d| d.join("focus-qa")))
        .unwrap_or_else(|| std::env::temp_dir().join("focus-qa"))
}
