//! Task data structure and the state transition protocol.
//!
//! A [`Task`] owns its subtasks outright. The link back to the parent is only the parent's
//! id, rebuilt by [`Task::relink_parents`] after loading and never written to disk.
//!
//! Changing state is a two step affair for the caller: [`Task::ask_change_state`] explains
//! what, if anything, is wrong with the request, and [`Task::change_state`] commits it,
//! cascading to the subtasks that qualify.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::fields::State;
use crate::rules::{
    current_task_precondition, subtask_precondition_for_cascade, subtask_precondition_for_query,
    StateSet,
};
use crate::task_state::{EditDiff, Stamp, TaskState, NO_REASON};
use crate::translate::Translate;

const OPENED_REASON: &str = "Opened task";
const SUBTASK_ADDED_REASON: &str = "A subtask was added.";

/// A node in a priority bucket's forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "comparable_date")]
    created_comparable_date: String,
    #[serde(rename = "pretty_date")]
    created_pretty_date: String,
    changes: Vec<TaskState>,
    subtasks: Vec<Task>,
    #[serde(skip)]
    parent: Option<String>,
}

impl Task {
    /// Create a task whose log starts with an `Opened` record stamped at creation time.
    pub fn new(id: &str, author: &str, name: &str, description: &str, stamp: &Stamp) -> Self {
        Task {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            created_comparable_date: stamp.comparable.clone(),
            created_pretty_date: stamp.pretty.clone(),
            changes: vec![TaskState::new(stamp, author, OPENED_REASON, State::Opened)],
            subtasks: Vec::new(),
            parent: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_comparable_date(&self) -> &str {
        &self.created_comparable_date
    }

    pub fn created_pretty_date(&self) -> &str {
        &self.created_pretty_date
    }

    /// Author of the first record, i.e. whoever created the task.
    pub fn creator(&self) -> &str {
        self.changes.first().map(TaskState::author).unwrap_or_default()
    }

    /// The full change log, oldest first.
    pub fn changes(&self) -> &[TaskState] {
        &self.changes
    }

    /// Direct subtasks, newest first.
    pub fn subtasks(&self) -> &[Task] {
        &self.subtasks
    }

    /// Id of the task this one is a subtask of, if any.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The latest record that sets a lifecycle position. Annotation records are skipped.
    ///
    /// # Panics
    ///
    /// If the log holds no primary record. Construction and loading both rule that out.
    pub fn current_state(&self) -> &TaskState {
        self.changes
            .iter()
            .rev()
            .find(|c| c.state().is_primary())
            .expect("task change log has no lifecycle record")
    }

    pub fn is_one_of_state(&self, states: StateSet) -> bool {
        states.contains(self.current_state().state())
    }

    /// Whether every direct subtask is in one of `states`. Vacuously true without subtasks.
    pub fn subtasks_state_is_one_of(&self, states: StateSet) -> bool {
        self.subtasks.iter().all(|t| t.is_one_of_state(states))
    }

    pub fn is_done(&self) -> bool {
        self.current_state().state() == State::Done
    }

    /// Explain why moving to `target` would be a problem. An empty string means the
    /// transition is fully permitted.
    ///
    /// If the task's own state is wrong only that is reported. Otherwise every direct
    /// subtask outside the advisory set gets its own line.
    pub fn ask_change_state(&self, target: State) -> String {
        if target.is_annotation() {
            return String::new();
        }

        let own = current_task_precondition(target);
        if !self.is_one_of_state(own) {
            let r = format!(
                "The state of task {} is none of: {}. Its state is: {}.\n",
                self.id,
                own,
                self.current_state().state()
            );
            warn!("{}", r.trim_end());
            return r;
        }

        let sub = subtask_precondition_for_query(target);
        let mut reason = String::new();
        for t in self.subtasks.iter().filter(|t| !t.is_one_of_state(sub)) {
            let r = format!(
                "Task {} (subtask of {}), is not in any of the states: {}. Its state is: {}.\n",
                t.id,
                self.id,
                sub,
                t.current_state().state()
            );
            warn!("{}", r.trim_end());
            reason.push_str(&r);
        }
        reason
    }

    /// Record a change to `target` now. See [`Task::change_state_at`].
    pub fn change_state(&mut self, author: &str, reason: Option<&str>, target: State) {
        self.change_state_at(&Stamp::now(), author, reason, target);
    }

    /// Append a record for `target` and, for primary targets, repeat the change on each
    /// direct subtask whose current state is in the cascade table, all the way down.
    ///
    /// Preconditions are not checked here; that is what [`Task::ask_change_state`] is for.
    pub fn change_state_at(
        &mut self,
        stamp: &Stamp,
        author: &str,
        reason: Option<&str>,
        target: State,
    ) {
        let reason = reason.unwrap_or(NO_REASON);
        if target == State::Edited {
            let diff = EditDiff {
                prev_name: self.name.clone(),
                next_name: self.name.clone(),
                prev_description: self.description.clone(),
                next_description: self.description.clone(),
            };
            self.changes.push(TaskState::edited(stamp, author, reason, diff));
            return;
        }
        self.cascade(stamp, author, reason, target);
    }

    fn cascade(&mut self, stamp: &Stamp, author: &str, reason: &str, target: State) {
        self.changes.push(TaskState::new(stamp, author, reason, target));
        if target.is_annotation() {
            return;
        }

        let eligible = subtask_precondition_for_cascade(target);
        for t in self.subtasks.iter_mut() {
            if t.is_one_of_state(eligible) {
                debug!("cascading {} from task {} to subtask {}", target, self.id, t.id);
                t.cascade(stamp, author, reason, target);
            }
        }
    }

    /// Record that the name and/or description were changed. The new values are the
    /// task's current ones; the previous ones are supplied by the caller.
    pub fn task_was_edited(
        &mut self,
        author: &str,
        reason: Option<&str>,
        prev_name: &str,
        prev_description: &str,
    ) {
        self.task_was_edited_at(&Stamp::now(), author, reason, prev_name, prev_description);
    }

    pub fn task_was_edited_at(
        &mut self,
        stamp: &Stamp,
        author: &str,
        reason: Option<&str>,
        prev_name: &str,
        prev_description: &str,
    ) {
        let diff = EditDiff {
            prev_name: prev_name.to_string(),
            next_name: self.name.clone(),
            prev_description: prev_description.to_string(),
            next_description: self.description.clone(),
        };
        self.changes.push(TaskState::edited(
            stamp,
            author,
            reason.unwrap_or(NO_REASON),
            diff,
        ));
    }

    /// Insert `subtask` at the front and point it back at this task.
    ///
    /// A `Done` task gets an `AddedSubtask` note stamped with the subtask's creation time.
    /// It stays `Done`.
    pub fn add_subtask(&mut self, mut subtask: Task) {
        if self.is_done() {
            let stamp = Stamp {
                comparable: subtask.created_comparable_date.clone(),
                pretty: subtask.created_pretty_date.clone(),
            };
            self.changes.push(TaskState::new(
                &stamp,
                subtask.creator(),
                SUBTASK_ADDED_REASON,
                State::AddedSubtask,
            ));
        }
        subtask.parent = Some(self.id.clone());
        self.subtasks.insert(0, subtask);
    }

    /// Move the direct subtask `id` by `delta` positions. The destination is clamped to
    /// the ends of the list. Returns `false` when no direct subtask has that id.
    pub fn move_subtask_by(&mut self, id: &str, delta: isize) -> bool {
        move_by(&mut self.subtasks, id, delta)
    }

    /// Remove the direct subtask `id` together with its own subtree.
    pub fn delete_subtask(&mut self, id: &str) -> bool {
        match self.subtasks.iter().position(|t| t.id == id) {
            Some(i) => {
                self.subtasks.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove every subtask, recursively.
    pub fn delete_subtasks(&mut self) {
        for t in self.subtasks.iter_mut() {
            t.delete_subtasks();
        }
        self.subtasks.clear();
    }

    /// The whole audit log, oldest first.
    pub fn changes_to_string(&self, tr: &dyn Translate) -> String {
        self.changes.iter().map(|c| c.render(tr)).collect()
    }

    /// Find `id` in this subtree, this task included.
    pub fn find(&self, id: &str) -> Option<&Task> {
        if self.id == id {
            return Some(self);
        }
        self.subtasks.iter().find_map(|t| t.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        if self.id == id {
            return Some(self);
        }
        self.subtasks.iter_mut().find_map(|t| t.find_mut(id))
    }

    /// Detach the descendant `id` from wherever it sits below this task.
    pub fn remove_descendant(&mut self, id: &str) -> Option<Task> {
        if let Some(i) = self.subtasks.iter().position(|t| t.id == id) {
            let mut removed = self.subtasks.remove(i);
            removed.parent = None;
            return Some(removed);
        }
        self.subtasks.iter_mut().find_map(|t| t.remove_descendant(id))
    }

    /// Ids of every task strictly below this one, depth first.
    pub fn descendant_ids(&self) -> Vec<String> {
        let mut out = Vec::new();
        for t in &self.subtasks {
            out.push(t.id.clone());
            out.extend(t.descendant_ids());
        }
        out
    }

    /// Number of tasks in this subtree, this task included.
    pub fn count(&self) -> usize {
        1 + self.subtasks.iter().map(Task::count).sum::<usize>()
    }

    /// Re-establish every parent link below this task from the subtask lists.
    pub fn relink_parents(&mut self) {
        let id = self.id.clone();
        for t in self.subtasks.iter_mut() {
            t.parent = Some(id.clone());
            t.relink_parents();
        }
    }

    pub(crate) fn clear_parent(&mut self) {
        self.parent = None;
    }

    /// First task in this subtree whose log has no lifecycle record.
    pub(crate) fn first_without_lifecycle(&self) -> Option<&str> {
        if !self.changes.iter().any(|c| c.state().is_primary()) {
            return Some(self.id.as_str());
        }
        self.subtasks
            .iter()
            .find_map(Task::first_without_lifecycle)
    }

    /// Largest numeric id in this subtree.
    pub(crate) fn max_numeric_id(&self) -> Option<u64> {
        let own = self.id.parse::<u64>().ok();
        self.subtasks
            .iter()
            .filter_map(Task::max_numeric_id)
            .chain(own)
            .max()
    }
}

/// Move the element with `id` by `delta` positions within `tasks`, clamping at the ends.
pub(crate) fn move_by(tasks: &mut Vec<Task>, id: &str, delta: isize) -> bool {
    let Some(from) = tasks.iter().position(|t| t.id == id) else {
        return false;
    };
    let task = tasks.remove(from);
    let last = tasks.len() as isize;
    let to = (from as isize).saturating_add(delta).clamp(0, last) as usize;
    tasks.insert(to, task);
    true
}
