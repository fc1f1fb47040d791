use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed todo-list manager.
/// Storage defaults to ~/.todomanager/tasks.json or a path passed via --file.
#[derive(Parser)]
#[command(name = "todo", version, about = "Todo lists with audited task states")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Author recorded on every change. Falls back to $TODOMANAGER_AUTHOR, then $USER.
    #[arg(long, global = true)]
    pub author: Option<String>,

    /// Overwrite the task file without keeping a .backup copy.
    #[arg(long, global = true)]
    pub no_backup: bool,

    /// Log debug output to stderr.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}
