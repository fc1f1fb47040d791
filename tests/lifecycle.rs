use todomanager::rules::{
    current_task_precondition, subtask_precondition_for_cascade, subtask_precondition_for_query,
};
use todomanager::{English, Priority, Stamp, State, StateSet, TaskManager};

fn stamp(sec: u32) -> Stamp {
    Stamp {
        comparable: format!("2024.07.01.12.00.{sec:02}"),
        pretty: format!("Mon Jul 01 12:00:{sec:02} 2024"),
    }
}

#[test]
fn ask_then_commit_through_the_manager() {
    let mut tm = TaskManager::new("unused.json");
    let parent = tm.new_task_at(&stamp(0), "ana", "Move house", "");
    let pid = parent.id().to_string();
    tm.insert_task(Priority::High, 0, parent);
    for (i, name) in ["Pack", "Book van"].into_iter().enumerate() {
        let t = tm.new_task_at(&stamp(i as u32 + 1), "ana", name, "");
        tm.add_subtask(&pid, t).unwrap();
    }

    let diag = tm.get_task(&pid).unwrap().ask_change_state(State::Done);
    assert!(diag.contains("Its state is: Opened"));

    let parent = tm.get_task_mut(&pid).unwrap();
    assert_eq!(parent.ask_change_state(State::Working), "");
    parent.change_state_at(&stamp(5), "ana", Some("moving day"), State::Working);
    assert!(parent
        .subtasks()
        .iter()
        .all(|t| t.current_state().state() == State::Working));

    for sub in ["000001", "000002"] {
        let t = tm.get_task_mut(sub).unwrap();
        t.change_state_at(&stamp(6), "bo", None, State::Done);
    }
    let parent = tm.get_task_mut(&pid).unwrap();
    assert!(parent.subtasks_state_is_one_of(subtask_precondition_for_query(State::Done)));
    assert_eq!(parent.ask_change_state(State::Done), "");
    parent.change_state_at(&stamp(7), "ana", None, State::Done);
    assert!(parent.is_done());

    // Finished subtasks accept the cascade to Deleted.
    parent.change_state_at(&stamp(8), "ana", Some("archived"), State::Deleted);
    assert!(tm
        .get_task(&pid)
        .unwrap()
        .subtasks()
        .iter()
        .all(|t| t.current_state().state() == State::Deleted));
}

#[test]
fn history_renders_every_record() {
    let mut tm = TaskManager::new("unused.json");
    let mut t = tm.new_task_at(&stamp(0), "ana", "Paint fence", "");
    t.change_state_at(&stamp(1), "ana", None, State::Working);
    t.change_state_at(&stamp(2), "ana", Some("rain"), State::PutOnHold);
    t.change_state_at(&stamp(3), "ana", None, State::PriorityChanged);

    let log = t.changes_to_string(&English);
    assert_eq!(log.matches("Date: ").count(), 4);
    assert!(log.contains("Reason: rain"));
    assert!(log.ends_with("    ana changed the task's priority.\n"));
    assert_eq!(t.current_state().state(), State::PutOnHold);
}

#[test]
fn first_primary_record_is_always_opened() {
    let mut tm = TaskManager::new("unused.json");
    for _ in 0..3 {
        let t = tm.new_task("ana", "n", "");
        let first = t.changes().iter().find(|c| c.state().is_primary()).unwrap();
        assert_eq!(first.state(), State::Opened);
    }
}

#[test]
fn only_reopen_has_an_empty_cascade() {
    for target in State::PRIMARY {
        assert!(!current_task_precondition(target).is_empty());
        let cascade = subtask_precondition_for_cascade(target);
        assert_eq!(cascade.is_empty(), target == State::Opened, "{target}");
    }
    assert_eq!(subtask_precondition_for_query(State::Opened), StateSet::ANY);
}
