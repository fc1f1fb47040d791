//! # todomanager
//!
//! Core of a todo-list manager: tasks nested into subtasks, three priority buckets, an
//! append-only history of every state change, and JSON persistence.
//!
//! The interesting part is the lifecycle of a task. A caller first asks whether a change is
//! sound, then commits it:
//!
//! ```
//! use todomanager::{Priority, State, TaskManager};
//!
//! let mut tm = TaskManager::new("tasks.json");
//! let mut task = tm.new_task("ana", "Write report", "Quarterly numbers");
//! assert!(!task.ask_change_state(State::Done).is_empty());
//! task.change_state("ana", None, State::Working);
//! assert_eq!(task.ask_change_state(State::Done), "");
//! tm.insert_task(Priority::High, 0, task);
//! ```
//!
//! Committing a change also applies it to every subtask whose current state qualifies,
//! recursively. The tables in [`rules`] decide which subtasks are flagged by the question
//! and which receive the cascade.

pub mod db;
pub mod error;
pub mod fields;
pub mod paths;
pub mod rules;
pub mod task;
pub mod task_state;
pub mod translate;

pub use db::{Forest, TaskManager};
pub use error::PersistError;
pub use fields::{Priority, State};
pub use rules::StateSet;
pub use task::Task;
pub use task_state::{Stamp, TaskState};
pub use translate::{English, Translate};
