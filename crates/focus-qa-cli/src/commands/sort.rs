//! Sort command - keep the sharp images of a batch and archive them.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use focus_qa_adapters::{
    build_sharp_archive, clear_transient, spawn_delayed_cleanup, FsImageSource, SharpSetOutput,
    UploadSession,
};
use focus_qa_core::{BatchRunner, FocusClassifier};
use serde::Serialize;
use tracing::{info, warn};

use super::tuning::TuningArgs;
use super::{workspace_root, ExitCode};
use crate::config::AppConfig;
use crate::output::{JsonOutput, OutputFormat, ProgressBar};

/// Arguments of the sort command.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct SortArgs {
    /// Files or directories to sort
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Classifier tuning.
    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Upload workspace (holds temp/ and temp/sharp/)
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Copy the archive of sharp images to this path
    #[arg(long, value_name = "FILE")]
    pub archive: Option<PathBuf>,

    /// Wait this many seconds after printing the summary before clearing
    /// transient files; the command stays running until the files are gone
    #[arg(long, value_name = "SECS")]
    pub cleanup_delay: Option<u64>,

    /// Keep transient files instead of clearing them
    #[arg(long)]
    pub keep: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Pretty-print the summary
    #[arg(long)]
    pub pretty: bool,
}

/// Per-image entry of the sort summary.
#[derive(Debug, Serialize)]
pub struct SortedImage {
    /// Stored (unique) file name.
    pub filename: String,
    /// Name the file was supplied under.
    pub original_filename: String,
    /// Combined focus score.
    pub blur_score: f64,
    /// Whether the image was classified as blurry.
    pub is_blurry: bool,
}

/// Summary printed after sorting.
#[derive(Debug, Serialize)]
pub struct SortSummary {
    /// Images classified.
    pub total: usize,
    /// Sharp images retained.
    pub sharp: usize,
    /// Blurry images.
    pub blurry: usize,
    /// Where the archive of sharp images was written.
    pub archive: PathBuf,
    /// Per-image verdicts, in input order.
    pub images: Vec<SortedImage>,
}

/// Run the sort command.
pub fn run(args: &SortArgs, config: &AppConfig) -> Result<ExitCode> {
    let classifier = FocusClassifier::new(args.tuning.focus_config(config))
        .context("Invalid focus configuration")?;
    let runner = BatchRunner::new(classifier, args.tuning.jobs(config));

    let root = workspace_root(args.workspace.as_ref(), config);
    let mut session = UploadSession::open(&root)?;

    let recursive = args.recursive || config.general.recursive.unwrap_or(false);
    for path in FsImageSource::new(args.paths.clone(), recursive).collect_files() {
        if let Err(e) = session.ingest_file(&path) {
            warn!("Skipping {}: {e:#}", path.display());
        }
    }
    info!(
        "Ingested {} images into {}",
        session.stored().len(),
        root.display()
    );

    let show_progress = !args.quiet
        && (args.progress
            || config.output.progress.unwrap_or(false)
            || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(
        Some(session.stored().len() as u64),
        args.quiet,
        show_progress,
    );

    let sharp_set = SharpSetOutput::new(&session);
    let summary = runner.run(&session, &sharp_set, &progress_bar)?;

    let mut archive = build_sharp_archive(&session)?;
    if let Some(dest) = &args.archive {
        std::fs::copy(&archive, dest)
            .with_context(|| format!("Failed to copy archive to {}", dest.display()))?;
        archive.clone_from(dest);
    }

    let images = summary
        .results
        .iter()
        .map(|result| SortedImage {
            filename: PathBuf::from(&result.path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            original_filename: result.original_name.clone(),
            blur_score: result.blur_score,
            is_blurry: result.is_blurry,
        })
        .collect();

    let report = SortSummary {
        total: summary.processed,
        sharp: sharp_set.retained(),
        blurry: summary.blurry,
        archive,
        images,
    };
    JsonOutput::stdout(OutputFormat::Json, args.pretty).write_value(&report)?;

    if !args.keep {
        let delay = args
            .cleanup_delay
            .or(config.workspace.cleanup_delay_secs)
            .unwrap_or(0);
        if delay == 0 {
            clear_transient(&root)?;
        } else {
            info!("Waiting {delay}s before clearing transient files");
            spawn_delayed_cleanup(root, Duration::from_secs(delay))
                .join()
                .map_err(|_| anyhow::anyhow!("Cleanup thread panicked"))?;
        }
    }

    Ok(ExitCode::Success)
}
