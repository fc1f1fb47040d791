//! Precondition tables for task state transitions.
//!
//! Each table maps a requested target state to the set of states that must currently hold,
//! either for the task itself or for each of its direct subtasks. The tables are constant
//! data; nothing is built per call.

use std::fmt;

use crate::fields::State;

/// A compact, immutable set of [`State`] values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateSet(u16);

impl StateSet {
    pub const EMPTY: StateSet = StateSet(0);
    pub const ANY: StateSet = StateSet::of(&State::ALL);

    /// Build a set from a slice of states.
    pub const fn of(states: &[State]) -> StateSet {
        let mut bits = 0;
        let mut i = 0;
        while i < states.len() {
            bits |= states[i].bit();
            i += 1;
        }
        StateSet(bits)
    }

    pub const fn contains(self, state: State) -> bool {
        self.0 & state.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in declaration order of [`State`].
    pub fn iter(self) -> impl Iterator<Item = State> {
        State::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(State::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

use State::*;

/// States the task itself must be in before it may move to `target`.
///
/// Annotation targets are always allowed.
pub const fn current_task_precondition(target: State) -> StateSet {
    match target {
        Done => StateSet::of(&[Working, OnRevision]),
        Working => StateSet::of(&[Opened, OnRevision, PutOnHold, Done]),
        PutOnHold => StateSet::of(&[Working]),
        Deleted => StateSet::of(&[Done]),
        Cancelled => StateSet::of(&[Opened, Working, OnRevision]),
        OnRevision => StateSet::of(&[PendingRevision, Working]),
        PendingRevision => StateSet::of(&[Working]),
        Opened => StateSet::of(&[Done]),
        Edited | PriorityChanged | AddedSubtask => StateSet::ANY,
    }
}

/// States each direct subtask should be in for a request to `target` to be clean.
///
/// Advisory only: a subtask outside this set produces a diagnostic but does not block the
/// write.
pub const fn subtask_precondition_for_query(target: State) -> StateSet {
    match target {
        Done => StateSet::of(&[Done, Cancelled, Deleted]),
        Working => StateSet::of(&[Done, Opened, Working, OnRevision, PutOnHold]),
        PutOnHold => StateSet::of(&[Working, PutOnHold]),
        Deleted => StateSet::of(&[Done, Deleted]),
        Cancelled => StateSet::of(&[Opened, Cancelled, Working, OnRevision]),
        OnRevision => StateSet::of(&[OnRevision, PendingRevision, Working]),
        PendingRevision => StateSet::of(&[Working, PendingRevision]),
        Opened => StateSet::ANY,
        Edited | PriorityChanged | AddedSubtask => StateSet::ANY,
    }
}

/// States a direct subtask must be in to receive a change to `target` automatically.
///
/// Differs from the query table in two rows: reopening never cascades, and a finished
/// subtask is never pulled back into `Working`.
pub const fn subtask_precondition_for_cascade(target: State) -> StateSet {
    match target {
        Done => StateSet::of(&[Done, Cancelled, Deleted]),
        Working => StateSet::of(&[Opened, Working, OnRevision, PutOnHold]),
        PutOnHold => StateSet::of(&[Working, PutOnHold]),
        Deleted => StateSet::of(&[Done, Deleted]),
        Cancelled => StateSet::of(&[Opened, Cancelled, Working, OnRevision]),
        OnRevision => StateSet::of(&[OnRevision, PendingRevision, Working]),
        PendingRevision => StateSet::of(&[Working, PendingRevision]),
        Opened => StateSet::EMPTY,
        Edited | PriorityChanged | AddedSubtask => StateSet::EMPTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::State::*;

    #[test]
    fn every_primary_target_has_a_task_precondition() {
        for target in State::PRIMARY {
            assert!(
                !current_task_precondition(target).is_empty(),
                "{target} is reachable unconditionally"
            );
        }
    }

    #[test]
    fn annotations_are_always_allowed() {
        for target in [Edited, PriorityChanged, AddedSubtask] {
            assert_eq!(current_task_precondition(target), StateSet::ANY);
            assert_eq!(subtask_precondition_for_query(target), StateSet::ANY);
            assert!(subtask_precondition_for_cascade(target).is_empty());
        }
    }

    #[test]
    fn task_table_is_pinned() {
        let expected = [
            (Done, StateSet::of(&[Working, OnRevision])),
            (Working, StateSet::of(&[Opened, OnRevision, PutOnHold, Done])),
            (PutOnHold, StateSet::of(&[Working])),
            (Deleted, StateSet::of(&[Done])),
            (Cancelled, StateSet::of(&[Opened, Working, OnRevision])),
            (OnRevision, StateSet::of(&[PendingRevision, Working])),
            (PendingRevision, StateSet::of(&[Working])),
            (Opened, StateSet::of(&[Done])),
        ];
        for (target, set) in expected {
            assert_eq!(current_task_precondition(target), set, "target {target}");
        }
    }

    #[test]
    fn query_table_is_pinned() {
        let expected = [
            (Done, StateSet::of(&[Done, Cancelled, Deleted])),
            (Working, StateSet::of(&[Done, Opened, Working, OnRevision, PutOnHold])),
            (PutOnHold, StateSet::of(&[Working, PutOnHold])),
            (Deleted, StateSet::of(&[Done, Deleted])),
            (Cancelled, StateSet::of(&[Opened, Cancelled, Working, OnRevision])),
            (OnRevision, StateSet::of(&[OnRevision, PendingRevision, Working])),
            (PendingRevision, StateSet::of(&[Working, PendingRevision])),
            (Opened, StateSet::ANY),
        ];
        for (target, set) in expected {
            assert_eq!(subtask_precondition_for_query(target), set, "target {target}");
        }
    }

    #[test]
    fn cascade_table_is_pinned() {
        let expected = [
            (Done, StateSet::of(&[Done, Cancelled, Deleted])),
            (Working, StateSet::of(&[Opened, Working, OnRevision, PutOnHold])),
            (PutOnHold, StateSet::of(&[Working, PutOnHold])),
            (Deleted, StateSet::of(&[Done, Deleted])),
            (Cancelled, StateSet::of(&[Opened, Cancelled, Working, OnRevision])),
            (OnRevision, StateSet::of(&[OnRevision, PendingRevision, Working])),
            (PendingRevision, StateSet::of(&[Working, PendingRevision])),
            (Opened, StateSet::EMPTY),
        ];
        for (target, set) in expected {
            assert_eq!(subtask_precondition_for_cascade(target), set, "target {target}");
        }
    }

    #[test]
    fn query_and_cascade_differ_only_in_opened_and_working_rows() {
        for target in State::PRIMARY {
            let query = subtask_precondition_for_query(target);
            let cascade = subtask_precondition_for_cascade(target);
            match target {
                Opened => {
                    assert_eq!(query, StateSet::ANY);
                    assert_eq!(cascade, StateSet::EMPTY);
                }
                Working => {
                    assert!(query.contains(Done));
                    assert!(!cascade.contains(Done));
                    assert_eq!(query.len(), cascade.len() + 1);
                    assert!(cascade.iter().all(|s| query.contains(s)));
                }
                _ => assert_eq!(query, cascade, "target {target}"),
            }
        }
    }

    #[test]
    fn put_on_hold_cascades_only_to_working_or_held() {
        let cascade = subtask_precondition_for_cascade(PutOnHold);
        assert!(cascade.contains(Working));
        assert!(cascade.contains(PutOnHold));
        assert!(!cascade.contains(Opened));
        assert!(!cascade.contains(OnRevision));
    }

    #[test]
    fn display_lists_members_in_order() {
        assert_eq!(
            current_task_precondition(Cancelled).to_string(),
            "[Opened, Working, OnRevision]"
        );
        assert_eq!(StateSet::EMPTY.to_string(), "[]");
    }
}
