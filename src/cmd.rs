//! Command implementations for the CLI interface.
//!
//! Each handler is a thin collaborator over the library: it locates tasks through the
//! [`TaskManager`], asks before changing state, and reports what happened.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use log::{debug, info};

use todomanager::paths::lock_path;
use todomanager::{English, Priority, State, Task, TaskManager, Translate};

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty task file if there is none yet.
    Init,

    /// Add a new task, as a root of a bucket or as a subtask.
    Add {
        /// Short name for the task.
        name: String,
        /// Optional longer description.
        #[arg(long, default_value = "")]
        desc: String,
        /// Bucket for a root task: high | med | low.
        #[arg(long, value_enum, default_value_t = Priority::Med)]
        priority: Priority,
        /// Make the new task a subtask of this id.
        #[arg(long, conflicts_with = "priority")]
        parent: Option<String>,
    },

    /// Show every bucket as a tree.
    List {
        /// Only show one bucket.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },

    /// Show one task and its full history.
    View {
        /// Task id.
        id: String,
    },

    /// Explain whether a state change would be clean, without applying it.
    Ask {
        id: String,
        #[arg(value_enum)]
        state: State,
    },

    /// Change the state of a task; qualifying subtasks follow.
    Set {
        id: String,
        #[arg(value_enum)]
        state: State,
        /// Why the state changes.
        #[arg(long)]
        reason: Option<String>,
        /// Apply the change even if the preconditions are not met.
        #[arg(long)]
        force: bool,
    },

    /// Change name and/or description of a task.
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Move a root task to another bucket.
    Priority {
        id: String,
        #[arg(value_enum)]
        priority: Priority,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Move a task up (negative) or down (positive) among its siblings.
    Move {
        id: String,
        #[arg(allow_hyphen_values = true)]
        delta: isize,
    },

    /// Delete a task and everything below it.
    Delete {
        id: String,
    },

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Commands {
    /// Commands that rewrite the task file and therefore need the lock.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Commands::Init
                | Commands::Add { .. }
                | Commands::Set { .. }
                | Commands::Edit { .. }
                | Commands::Priority { .. }
                | Commands::Move { .. }
                | Commands::Delete { .. }
        )
    }
}

/// Settings every handler may need.
pub struct Session {
    pub manager: TaskManager,
    pub author: String,
    pub backup: bool,
}

impl Session {
    fn save(&self) -> Result<()> {
        self.manager
            .write_tasks(self.backup)
            .context("failed to save tasks")
    }

    fn task(&self, id: &str) -> Result<&Task> {
        match self.manager.get_task(id) {
            Some(t) => Ok(t),
            None => bail!("Task {id} not found."),
        }
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task> {
        match self.manager.get_task_mut(id) {
            Some(t) => Ok(t),
            None => bail!("Task {id} not found."),
        }
    }
}

/// Advisory `<file>.lock`, held while a command rewrites the task file.
pub struct FileLock {
    path: PathBuf,
}

impl FileLock {
    pub fn acquire(task_file: &Path) -> Result<Self> {
        let path = lock_path(task_file);
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| {
                format!(
                    "task file is locked by another process (remove {} if it is stale)",
                    path.display()
                )
            })?;
        debug!("acquired lock {}", path.display());
        Ok(FileLock { path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Write an empty task file unless one exists.
pub fn cmd_init(session: &Session) -> Result<()> {
    let path = session.manager.task_file();
    if path.exists() {
        println!("Task file {} already exists.", path.display());
        return Ok(());
    }
    session.manager.write_tasks(false)?;
    println!("Created {}", path.display());
    Ok(())
}

pub fn cmd_add(
    session: &mut Session,
    name: String,
    desc: String,
    priority: Priority,
    parent: Option<String>,
) -> Result<()> {
    let task = session.manager.new_task(&session.author, &name, &desc);
    let id = task.id().to_string();
    match parent {
        Some(parent_id) => {
            if session.manager.add_subtask(&parent_id, task).is_err() {
                bail!("Parent task {parent_id} not found.");
            }
            println!("Added subtask {id} under {parent_id}");
        }
        None => {
            session.manager.insert_task(priority, 0, task);
            println!("Added task {id} ({priority} priority)");
        }
    }
    session.save()
}

pub fn cmd_list(session: &Session, only: Option<Priority>) {
    let tr = English;
    for priority in Priority::SEARCH_ORDER {
        if only.is_some_and(|p| p != priority) {
            continue;
        }
        let bucket = session.manager.bucket(priority);
        println!("{} priority ({})", capitalise(priority.as_str()), bucket.len());
        for t in bucket {
            print_tree(t, 1, &tr);
        }
    }
}

fn print_tree(task: &Task, depth: usize, tr: &dyn Translate) {
    println!(
        "{}{:<8} {:<18} {}",
        "  ".repeat(depth),
        task.id(),
        tr.state_name(task.current_state().state()),
        task.name
    );
    for sub in task.subtasks() {
        print_tree(sub, depth + 1, tr);
    }
}

fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn cmd_view(session: &Session, id: &str) -> Result<()> {
    let tr = English;
    let t = session.task(id)?;
    println!("Id:          {}", t.id());
    println!("Name:        {}", t.name);
    println!("Author:      {}", t.creator());
    println!("Created:     {}", t.created_pretty_date());
    println!("State:       {}", tr.state_name(t.current_state().state()));
    if let Some(p) = session.manager.priority_of(id) {
        println!("Priority:    {p}");
    }
    if let Some(parent) = t.parent_id() {
        println!("Subtask of:  {parent}");
    }
    if !t.description.is_empty() {
        println!("Description:\n  {}", t.description);
    }
    if !t.subtasks().is_empty() {
        println!("Subtasks:");
        for sub in t.subtasks() {
            println!(
                "  {} {} [{}]",
                sub.id(),
                sub.name,
                tr.state_name(sub.current_state().state())
            );
        }
    }
    println!("History:");
    print!("{}", t.changes_to_string(&tr));
    Ok(())
}

pub fn cmd_ask(session: &Session, id: &str, state: State) -> Result<()> {
    let diagnostic = session.task(id)?.ask_change_state(state);
    if diagnostic.is_empty() {
        println!("Task {id} can be set to {state}.");
    } else {
        print!("{diagnostic}");
    }
    Ok(())
}

pub fn cmd_set(
    session: &mut Session,
    id: &str,
    state: State,
    reason: Option<String>,
    force: bool,
) -> Result<()> {
    if state == State::Edited {
        bail!("Use `edit` to change a task's name or description.");
    }
    if state == State::AddedSubtask {
        bail!("Use `add --parent` to add a subtask.");
    }
    let author = session.author.clone();
    let task = session.task_mut(id)?;
    let diagnostic = task.ask_change_state(state);
    if !diagnostic.is_empty() {
        if !force {
            eprint!("{diagnostic}");
            bail!("Can't change the state of task {id}. Use --force to do it anyway.");
        }
        info!("forcing {state} on task {id} despite failed preconditions");
    }
    task.change_state(&author, reason.as_deref(), state);
    println!("Task {id} set to {state}.");
    session.save()
}

pub fn cmd_edit(
    session: &mut Session,
    id: &str,
    name: Option<String>,
    desc: Option<String>,
    reason: Option<String>,
) -> Result<()> {
    if name.is_none() && desc.is_none() {
        bail!("Nothing to edit: pass --name and/or --desc.");
    }
    let author = session.author.clone();
    let task = session.task_mut(id)?;
    let prev_name = task.name.clone();
    let prev_desc = task.description.clone();
    if let Some(n) = name {
        task.name = n;
    }
    if let Some(d) = desc {
        task.description = d;
    }
    task.task_was_edited(&author, reason.as_deref(), &prev_name, &prev_desc);
    println!("Edited task {id}");
    session.save()
}

pub fn cmd_priority(
    session: &mut Session,
    id: &str,
    priority: Priority,
    reason: Option<String>,
) -> Result<()> {
    session.task(id)?;
    if !session
        .manager
        .change_priority(id, priority, &session.author, reason.as_deref())
    {
        bail!("Only root tasks can change priority; {id} is a subtask.");
    }
    println!("Task {id} moved to {priority} priority.");
    session.save()
}

pub fn cmd_move(session: &mut Session, id: &str, delta: isize) -> Result<()> {
    let parent = session.task(id)?.parent_id().map(str::to_string);
    let moved = match parent {
        Some(parent_id) => session.task_mut(&parent_id)?.move_subtask_by(id, delta),
        None => session.manager.move_root_by(id, delta),
    };
    if !moved {
        bail!("Could not move task {id}.");
    }
    println!("Moved task {id} by {delta}.");
    session.save()
}

pub fn cmd_delete(session: &mut Session, id: &str) -> Result<()> {
    let below = session.task(id)?.descendant_ids().len();
    if !session.manager.delete_task(id) {
        bail!("Task {id} not found.");
    }
    if below > 0 {
        println!("Deleted task {id} and {below} subtask(s).");
    } else {
        println!("Deleted task {id}.");
    }
    session.save()
}

pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
