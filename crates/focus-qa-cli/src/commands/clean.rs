//! Clean command - clear transient upload files.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use focus_qa_adapters::clear_transient;

use super::workspace_root;
use crate::config::AppConfig;

/// Arguments of the clean command.
#[derive(Args, Clone)]
pub struct CleanArgs {
    /// Upload workspace to clear
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,
}

/// Run the clean command, returning the number of files removed.
pub fn run(args: &CleanArgs, config: &AppConfig) -> Result<usize> {
    let root = workspace_root(args.workspace.as_ref(), config);
    let removed = clear_transient(&root)?;
    println!("{}", serde_json::json!({ "removed": removed }));
    Ok(removed)
}
