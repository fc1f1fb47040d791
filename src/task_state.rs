//! Immutable change records and their timestamps.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::fields::State;
use crate::translate::Translate;

/// Sentinel stored when a change is committed without a reason.
pub const NO_REASON: &str = "null";

const COMPARABLE_FORMAT: &str = "%Y.%m.%d.%H.%M.%S";
const PRETTY_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// A point in time in both of the forms the task file stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// Sorts lexicographically in chronological order.
    pub comparable: String,
    pub pretty: String,
}

impl Stamp {
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz>(dt: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Stamp {
            comparable: dt.format(COMPARABLE_FORMAT).to_string(),
            pretty: dt.format(PRETTY_FORMAT).to_string(),
        }
    }
}

/// Name and description before and after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDiff {
    pub prev_name: String,
    pub next_name: String,
    pub prev_description: String,
    pub next_description: String,
}

/// One entry of a task's change log. Never modified once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    comparable_date: String,
    pretty_date: String,
    #[serde(alias = "reason_state")]
    reason: String,
    state: State,
    #[serde(default)]
    author: String,
    #[serde(rename = "pTN", default, skip_serializing_if = "Option::is_none")]
    prev_name: Option<String>,
    #[serde(rename = "nTN", default, skip_serializing_if = "Option::is_none")]
    next_name: Option<String>,
    #[serde(rename = "pTD", default, skip_serializing_if = "Option::is_none")]
    prev_description: Option<String>,
    #[serde(rename = "nTD", default, skip_serializing_if = "Option::is_none")]
    next_description: Option<String>,
}

impl TaskState {
    pub fn new(stamp: &Stamp, author: &str, reason: &str, state: State) -> Self {
        TaskState {
            comparable_date: stamp.comparable.clone(),
            pretty_date: stamp.pretty.clone(),
            reason: reason.to_string(),
            state,
            author: author.to_string(),
            prev_name: None,
            next_name: None,
            prev_description: None,
            next_description: None,
        }
    }

    /// An `Edited` record carrying the before/after text.
    pub fn edited(stamp: &Stamp, author: &str, reason: &str, diff: EditDiff) -> Self {
        TaskState {
            prev_name: Some(diff.prev_name),
            next_name: Some(diff.next_name),
            prev_description: Some(diff.prev_description),
            next_description: Some(diff.next_description),
            ..TaskState::new(stamp, author, reason, State::Edited)
        }
    }

    pub fn comparable_date(&self) -> &str {
        &self.comparable_date
    }

    pub fn pretty_date(&self) -> &str {
        &self.pretty_date
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn prev_name(&self) -> Option<&str> {
        self.prev_name.as_deref()
    }

    pub fn next_name(&self) -> Option<&str> {
        self.next_name.as_deref()
    }

    pub fn prev_description(&self) -> Option<&str> {
        self.prev_description.as_deref()
    }

    pub fn next_description(&self) -> Option<&str> {
        self.next_description.as_deref()
    }

    /// Whether the rendered line for this record includes the reason.
    fn shows_reason(&self) -> bool {
        matches!(
            self.state,
            State::Deleted | State::PutOnHold | State::Cancelled | State::PendingRevision
        )
    }

    /// Render the record as a block of history lines, each ending in a newline.
    pub fn render(&self, tr: &dyn Translate) -> String {
        let sentence = tr.state_change(self.state).replace("{author}", &self.author);
        let mut out = format!("{} {}\n    {}\n", tr.date_label(), self.pretty_date, sentence);
        if self.state.is_annotation() {
            return out;
        }
        out.push_str(&format!(
            "    {} {}\n",
            tr.state_set_to_label(),
            tr.state_name(self.state)
        ));
        if self.shows_reason() {
            out.push_str(&format!("    {} {}\n", tr.reason_label(), self.reason));
        }
        out
    }
}
