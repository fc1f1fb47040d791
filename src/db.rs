//! The task manager: priority buckets, id allocation and persistence.
//!
//! A [`TaskManager`] owns three ordered forests of root tasks, one per [`Priority`]. Tasks do
//! not know which bucket holds them; moving a task between buckets is a removal from one
//! list and an insertion into another.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::fields::{Priority, State};
use crate::paths::{backup_path, lock_path, temp_path};
use crate::task::{move_by, Task};
use crate::task_state::Stamp;

/// The three buckets exactly as they are stored on disk.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forest {
    #[serde(rename = "low_prior_tasks")]
    pub low: Vec<Task>,
    #[serde(rename = "med_prior_tasks")]
    pub med: Vec<Task>,
    #[serde(rename = "high_prior_tasks")]
    pub high: Vec<Task>,
}

impl Forest {
    pub fn bucket(&self, priority: Priority) -> &Vec<Task> {
        match priority {
            Priority::High => &self.high,
            Priority::Med => &self.med,
            Priority::Low => &self.low,
        }
    }

    fn bucket_mut(&mut self, priority: Priority) -> &mut Vec<Task> {
        match priority {
            Priority::High => &mut self.high,
            Priority::Med => &mut self.med,
            Priority::Low => &mut self.low,
        }
    }

    /// Every root task, in search order.
    pub fn roots(&self) -> impl Iterator<Item = &Task> {
        Priority::SEARCH_ORDER
            .into_iter()
            .flat_map(move |p| self.bucket(p).iter())
    }

    fn relink_parents(&mut self) {
        for p in Priority::SEARCH_ORDER {
            for t in self.bucket_mut(p).iter_mut() {
                t.clear_parent();
                t.relink_parents();
            }
        }
    }

    fn first_without_lifecycle(&self) -> Option<&str> {
        self.roots().find_map(Task::first_without_lifecycle)
    }

    fn max_numeric_id(&self) -> Option<u64> {
        self.roots().filter_map(Task::max_numeric_id).max()
    }
}

/// Owner of every task, plus the file they are persisted to.
#[derive(Debug)]
pub struct TaskManager {
    task_file: PathBuf,
    forest: Forest,
    num_tasks: u64,
}

impl TaskManager {
    pub fn new(task_file: impl Into<PathBuf>) -> Self {
        TaskManager {
            task_file: task_file.into(),
            forest: Forest::default(),
            num_tasks: 0,
        }
    }

    pub fn task_file(&self) -> &Path {
        &self.task_file
    }

    pub fn set_task_file(&mut self, path: impl Into<PathBuf>) {
        self.task_file = path.into();
    }

    /// Advisory lock path for the current task file.
    pub fn lock_file(&self) -> PathBuf {
        lock_path(&self.task_file)
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn bucket(&self, priority: Priority) -> &[Task] {
        self.forest.bucket(priority)
    }

    /// Zero-padded id for the next task, e.g. `000042`.
    fn make_id(&self) -> String {
        format!("{:06}", self.num_tasks)
    }

    /// Create a task with the next id. It is not placed in any bucket.
    pub fn new_task(&mut self, author: &str, name: &str, description: &str) -> Task {
        self.new_task_at(&Stamp::now(), author, name, description)
    }

    pub fn new_task_at(
        &mut self,
        stamp: &Stamp,
        author: &str,
        name: &str,
        description: &str,
    ) -> Task {
        let task = Task::new(&self.make_id(), author, name, description, stamp);
        self.num_tasks = self.num_tasks.saturating_add(1);
        task
    }

    /// Find a task anywhere in the forest, searching high, then medium, then low.
    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.forest.roots().find_map(|t| t.find(id))
    }

    pub fn get_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        let bucket = self.priority_of(id)?;
        self.forest
            .bucket_mut(bucket)
            .iter_mut()
            .find_map(|t| t.find_mut(id))
    }

    /// Bucket whose forest contains `id`, at any depth.
    pub fn priority_of(&self, id: &str) -> Option<Priority> {
        Priority::SEARCH_ORDER
            .into_iter()
            .find(|p| self.bucket(*p).iter().any(|t| t.find(id).is_some()))
    }

    pub fn parent_of(&self, id: &str) -> Option<&Task> {
        let parent = self.get_task(id)?.parent_id()?;
        self.get_task(parent)
    }

    /// Total number of tasks across all buckets.
    pub fn task_count(&self) -> usize {
        self.forest.roots().map(Task::count).sum()
    }

    /// Remove `id`, with its subtree, from the first bucket that has it.
    pub fn delete_task(&mut self, id: &str) -> bool {
        Priority::SEARCH_ORDER
            .into_iter()
            .any(|p| self.delete_in(p, id))
    }

    /// Remove `id` from one bucket only. A root is removed along with any of its
    /// descendants that also appear as roots of the same bucket.
    pub fn delete_in(&mut self, priority: Priority, id: &str) -> bool {
        let bucket = self.forest.bucket_mut(priority);
        if let Some(i) = bucket.iter().position(|t| t.id() == id) {
            let removed = bucket.remove(i);
            let below = removed.descendant_ids();
            bucket.retain(|t| !below.iter().any(|d| d == t.id()));
            return true;
        }
        bucket
            .iter_mut()
            .any(|t| t.remove_descendant(id).is_some())
    }

    /// Insert a root task into `priority` at `index`, clamped to the bucket length.
    /// Returns the index actually used.
    pub fn insert_task(&mut self, priority: Priority, index: usize, mut task: Task) -> usize {
        task.clear_parent();
        let bucket = self.forest.bucket_mut(priority);
        let index = index.min(bucket.len());
        bucket.insert(index, task);
        index
    }

    /// Add `task` as the newest subtask of `parent_id`. Hands the task back if there is no
    /// such parent.
    pub fn add_subtask(&mut self, parent_id: &str, task: Task) -> Result<(), Task> {
        match self.get_task_mut(parent_id) {
            Some(parent) => {
                parent.add_subtask(task);
                Ok(())
            }
            None => Err(task),
        }
    }

    /// Move the root task `id` to the front of bucket `to` and note the change in its
    /// history. Subtasks follow their root and cannot change bucket on their own.
    pub fn change_priority(
        &mut self,
        id: &str,
        to: Priority,
        author: &str,
        reason: Option<&str>,
    ) -> bool {
        let Some(from) = Priority::SEARCH_ORDER
            .into_iter()
            .find(|p| self.bucket(*p).iter().any(|t| t.id() == id))
        else {
            return false;
        };
        if from == to {
            return true;
        }
        let bucket = self.forest.bucket_mut(from);
        let Some(i) = bucket.iter().position(|t| t.id() == id) else {
            return false;
        };
        let mut task = bucket.remove(i);
        task.change_state(author, reason, State::PriorityChanged);
        self.forest.bucket_mut(to).insert(0, task);
        true
    }

    /// Move the root task `id` within its bucket, clamping at the ends.
    pub fn move_root_by(&mut self, id: &str, delta: isize) -> bool {
        Priority::SEARCH_ORDER
            .into_iter()
            .any(|p| move_by(self.forest.bucket_mut(p), id, delta))
    }

    /// Replace the buckets with the contents of the task file.
    ///
    /// On any failure the current buckets are kept as they are.
    pub fn read_tasks(&mut self) -> Result<(), PersistError> {
        let path = self.task_file.clone();
        info!("Reading tasks from file '{}'.", path.display());
        let forest = load_forest(&path).inspect_err(|e| error!("{e}"))?;
        if let Some(max) = forest.max_numeric_id() {
            self.num_tasks = self.num_tasks.max(max.saturating_add(1));
        }
        self.forest = forest;
        Ok(())
    }

    /// Write all buckets to the task file, optionally copying the old file to its backup
    /// path first. The old file is only replaced once the new contents are fully written.
    pub fn write_tasks(&self, do_backup: bool) -> Result<(), PersistError> {
        info!("Writing tasks into file '{}'.", self.task_file.display());
        save_forest(&self.forest, &self.task_file, do_backup).inspect_err(|e| error!("{e}"))
    }
}

fn parse_forest(text: &str, path: &Path) -> Result<Forest, PersistError> {
    let mut forest: Forest = serde_json::from_str(text).map_err(|source| PersistError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(id) = forest.first_without_lifecycle() {
        return Err(PersistError::Invalid {
            path: path.to_path_buf(),
            id: id.to_string(),
        });
    }
    forest.relink_parents();
    Ok(forest)
}

fn load_forest(path: &Path) -> Result<Forest, PersistError> {
    let mut file = File::open(path).map_err(|source| PersistError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut buf = String::new();
    file.read_to_string(&mut buf)
        .map_err(|source| PersistError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_forest(&buf, path)
}

fn save_forest(forest: &Forest, path: &Path, do_backup: bool) -> Result<(), PersistError> {
    let write_err = |source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };
    let data = serde_json::to_string_pretty(forest)
        .map_err(|e| write_err(std::io::Error::other(e)))?;

    if do_backup && path.exists() {
        let backup = backup_path(path);
        info!("    Backing up to '{}'.", backup.display());
        fs::copy(path, &backup).map_err(|source| PersistError::Backup {
            path: path.to_path_buf(),
            backup,
            source,
        })?;
    }

    // Write-then-rename so a failed write never truncates the previous file.
    let tmp = temp_path(path);
    let mut f = File::create(&tmp).map_err(|source| PersistError::Open {
        path: tmp.clone(),
        source,
    })?;
    let written = f.write_all(data.as_bytes()).and_then(|()| f.sync_all());
    drop(f);
    let written = written.and_then(|()| fs::rename(&tmp, path));
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(source));
    }
    Ok(())
}
