//! # todo - todo lists with audited task states
//!
//! Command-line front end for the `todomanager` library.
//!
//! ```bash
//! todo init
//! todo add "Write report" --priority high
//! todo add "Collect numbers" --parent 000000
//! todo set 000001 working --reason "starting today"
//! todo ask 000000 done
//! todo view 000000
//! ```
//!
//! Data lives in `~/.todomanager/tasks.json` unless `--file` says otherwise. Every write keeps
//! the previous version as `tasks.json.backup`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use todomanager::paths::default_task_file;
use todomanager::TaskManager;

mod cli;
mod cmd;

use cli::Cli;
use cmd::*;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// `--author`, else `$TODOMANAGER_AUTHOR`, else `$USER`.
fn resolve_author(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("TODOMANAGER_AUTHOR").ok())
        .or_else(|| std::env::var("USER").ok())
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn resolve_task_file(flag: Option<PathBuf>) -> Result<PathBuf> {
    let path = flag.unwrap_or_else(default_task_file);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    Ok(path)
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let task_file = resolve_task_file(cli.file)?;
    let _lock = if cli.command.is_mutating() {
        Some(FileLock::acquire(&task_file)?)
    } else {
        None
    };

    let mut manager = TaskManager::new(&task_file);
    if task_file.exists() {
        manager.read_tasks()?;
    } else if !matches!(cli.command, Commands::Init) {
        log::info!("no task file at {}, starting empty", task_file.display());
    }

    let mut session = Session {
        manager,
        author: resolve_author(cli.author),
        backup: !cli.no_backup,
    };

    match cli.command {
        Commands::Init => cmd_init(&session),
        Commands::Add { name, desc, priority, parent } =>
            cmd_add(&mut session, name, desc, priority, parent),
        Commands::List { priority } => {
            cmd_list(&session, priority);
            Ok(())
        }
        Commands::View { id } => cmd_view(&session, &id),
        Commands::Ask { id, state } => cmd_ask(&session, &id, state),
        Commands::Set { id, state, reason, force } =>
            cmd_set(&mut session, &id, state, reason, force),
        Commands::Edit { id, name, desc, reason } =>
            cmd_edit(&mut session, &id, name, desc, reason),
        Commands::Priority { id, priority, reason } =>
            cmd_priority(&mut session, &id, priority, reason),
        Commands::Move { id, delta } => cmd_move(&mut session, &id, delta),
        Commands::Delete { id } => cmd_delete(&mut session, &id),
        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
