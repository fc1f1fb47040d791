//! Enumerations shared across the task model.
//!
//! This module defines the lifecycle [`State`] a task change record carries and the
//! [`Priority`] bucket a root task lives in.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Every kind of change a task can record.
///
/// The first eight variants are *primary* states: they say where the task actually stands.
/// The last three are *annotations*: they are logged for history but leave the lifecycle
/// position untouched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
pub enum State {
    Opened,
    Working,
    PutOnHold,
    OnRevision,
    PendingRevision,
    Done,
    Cancelled,
    Deleted,
    Edited,
    PriorityChanged,
    #[serde(alias = "SubtaskAdded")]
    #[value(alias = "SubtaskAdded")]
    AddedSubtask,
}

impl State {
    pub const ALL: [State; 11] = [
        State::Opened,
        State::Working,
        State::PutOnHold,
        State::OnRevision,
        State::PendingRevision,
        State::Done,
        State::Cancelled,
        State::Deleted,
        State::Edited,
        State::PriorityChanged,
        State::AddedSubtask,
    ];

    pub const PRIMARY: [State; 8] = [
        State::Opened,
        State::Working,
        State::PutOnHold,
        State::OnRevision,
        State::PendingRevision,
        State::Done,
        State::Cancelled,
        State::Deleted,
    ];

    /// `true` for states that represent a lifecycle position.
    pub const fn is_primary(self) -> bool {
        !self.is_annotation()
    }

    /// `true` for history-only events (`Edited`, `PriorityChanged`, `AddedSubtask`).
    pub const fn is_annotation(self) -> bool {
        matches!(
            self,
            State::Edited | State::PriorityChanged | State::AddedSubtask
        )
    }

    /// The identifier used in the JSON file.
    pub const fn as_str(self) -> &'static str {
        match self {
            State::Opened => "Opened",
            State::Working => "Working",
            State::PutOnHold => "PutOnHold",
            State::OnRevision => "OnRevision",
            State::PendingRevision => "PendingRevision",
            State::Done => "Done",
            State::Cancelled => "Cancelled",
            State::Deleted => "Deleted",
            State::Edited => "Edited",
            State::PriorityChanged => "PriorityChanged",
            State::AddedSubtask => "AddedSubtask",
        }
    }

    pub(crate) const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text does not name any [`State`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task state '{0}'")]
pub struct UnknownState(pub String);

impl FromStr for State {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "SubtaskAdded" {
            return Ok(State::AddedSubtask);
        }
        State::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

/// Priority bucket of a root task. A task has no stored priority; it is whatever bucket
/// currently holds it.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    #[value(alias = "medium")]
    Med,
    Low,
}

impl Priority {
    /// Lookup order used by every forest-wide search.
    pub const SEARCH_ORDER: [Priority; 3] = [Priority::High, Priority::Med, Priority::Low];

    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Med => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
