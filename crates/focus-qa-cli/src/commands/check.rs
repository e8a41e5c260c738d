//! `check`: classify images and report a verdict per file.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use focus_qa_adapters::FsImageSource;
use focus_qa_core::{BatchRunner, FocusClassifier, ImageSource};
use tracing::info;

use super::tuning::TuningArgs;
use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, OutputFormat, ProgressBar};

/// Arguments of `check`, also accepted without the subcommand name.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Files or directories to analyze
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Classifier tuning.
    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Include per-measure scores in output
    #[arg(long)]
    pub details: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl CheckArgs {
    /// Fills every option the command line left unset from `config`.
    ///
    /// Boolean flags can only be switched on by a config layer, never off.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        let general = &config.general;
        let output = &config.output;

        args.recursive |= general.recursive.unwrap_or(false);
        args.pretty |= output.pretty.unwrap_or(false);
        args.progress |= output.progress.unwrap_or(false);
        args.details |= output.details.unwrap_or(false);
        args.format = args
            .format
            .or_else(|| output.format.as_deref().and_then(OutputFormat::from_config));

        // Focus tuning is resolved against the config when the run starts.
        args.config = Some(config.clone());
        args
    }

    fn app_config(&self) -> AppConfig {
        self.config.clone().unwrap_or_default()
    }

    fn show_bar(&self) -> bool {
        !self.quiet && (self.progress || std::io::stderr().is_terminal())
    }
}

/// Classifies every image under `args.paths` and streams one record per image.
///
/// Returns [`ExitCode::BlurryFound`] when any image was judged blurry.
///
/// # Errors
///
/// Fails on an invalid focus configuration or when output cannot be written.
pub fn run(args: &CheckArgs) -> Result<ExitCode> {
    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }
    info!(paths = args.paths.len(), "Checking images");

    let config = args.app_config();
    let classifier = FocusClassifier::new(args.tuning.focus_config(&config))
        .context("Invalid focus configuration")?;
    let runner =
        BatchRunner::new(classifier, args.tuning.jobs(&config)).with_details(args.details);

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let progress = ProgressBar::new(
        source.count_hint().map(|n| n as u64),
        args.quiet,
        args.show_bar(),
    );
    let output = JsonOutput::stdout(args.format.unwrap_or_default(), args.pretty);

    let summary = runner.run(&source, &output, &progress)?;
    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        blurry = summary.blurry,
        "Check finished"
    );

    Ok(if summary.blurry > 0 {
        ExitCode::BlurryFound
    } else {
        ExitCode::Success
    })
}
