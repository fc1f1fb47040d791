//! Display text for states and history lines.
//!
//! The core never loads locale data itself. Whoever renders a history passes in a
//! [`Translate`] implementation; [`English`] is the built-in one.

use crate::fields::State;

/// Text a renderer needs to turn change records into sentences.
pub trait Translate {
    /// Short human name of a state, e.g. "On hold".
    fn state_name(&self, state: State) -> &str;

    /// Sentence describing a change to `state`, with `{author}` as a placeholder.
    fn state_change(&self, state: State) -> &str;

    /// Prefix for the date line.
    fn date_label(&self) -> &str;

    /// Prefix for the "state set to" line of primary changes.
    fn state_set_to_label(&self) -> &str;

    /// Prefix for the reason line.
    fn reason_label(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct English;

impl Translate for English {
    fn state_name(&self, state: State) -> &str {
        match state {
            State::Opened => "Opened",
            State::Working => "Working",
            State::PutOnHold => "On hold",
            State::OnRevision => "On revision",
            State::PendingRevision => "Pending revision",
            State::Done => "Done",
            State::Cancelled => "Cancelled",
            State::Deleted => "Deleted",
            State::Edited => "Edited",
            State::PriorityChanged => "Priority changed",
            State::AddedSubtask => "Subtask added",
        }
    }

    fn state_change(&self, state: State) -> &str {
        match state {
            State::Opened => "{author} opened the task.",
            State::Working => "{author} started working on the task.",
            State::PutOnHold => "{author} put the task on hold.",
            State::OnRevision => "{author} started revising the task.",
            State::PendingRevision => "{author} asked for the task to be revised.",
            State::Done => "{author} finished the task.",
            State::Cancelled => "{author} cancelled the task.",
            State::Deleted => "{author} deleted the task.",
            State::Edited => "{author} edited the task's name or description.",
            State::PriorityChanged => "{author} changed the task's priority.",
            State::AddedSubtask => "{author} added a subtask.",
        }
    }

    fn date_label(&self) -> &str {
        "Date:"
    }

    fn state_set_to_label(&self) -> &str {
        "State of task set to:"
    }

    fn reason_label(&self) -> &str {
        "Reason:"
    }
}
