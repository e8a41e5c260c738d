//! `focus-qa`: sort photos into sharp and blurry.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{check::CheckArgs, Cli, Commands, ExitCode};
use config::AppConfig;

fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::new(level)
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(cli.verbose))
        .init();

    let config = AppConfig::load();

    let outcome = match cli.command {
        Some(Commands::Check(args)) => {
            commands::check::run(&CheckArgs::with_config(*args, &config))
        }
        Some(Commands::Sort(args)) => commands::sort::run(&args, &config),
        Some(Commands::Clean(args)) => {
            commands::clean::run(&args, &config).map(|_| ExitCode::Success)
        }
        None if cli.check.paths.is_empty() => {
            Err(anyhow::anyhow!("No paths specified. Use --help for usage information."))
        }
        None => commands::check::run(&CheckArgs::with_config(cli.check, &config)),
    };

    exit_with(outcome).into()
}

fn exit_with(outcome: Result<ExitCode>) -> ExitCode {
    outcome.unwrap_or_else(|e| {
        eprintln!("error: {e:#}");
        ExitCode::Error
    })
}
