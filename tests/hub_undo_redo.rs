//! Undo/redo and branch behavior of the hub, driven through the library API.

use repohub::session::{SessionFile, load_or_new, save};
use repohub_core::oplog::{OpKind, Outcome};
use repohub_core::{CoreError, ErrorKind, Hub, RedoPolicy};

const U: &str = "alice";

fn content(hub: &Hub, repo: &str, file: &str) -> Option<String> {
    hub.read_file(repo, file).ok().map(|f| f.content.clone())
}

fn branch_content(hub: &Hub, repo: &str, branch: &str, file: &str) -> Option<String> {
    hub.repository(repo)
        .ok()?
        .branches()
        .branch(branch)?
        .files
        .find_by_name(file)
        .map(|f| f.content.clone())
}

#[test]
fn create_file_then_undo_restores_empty_store() {
    let mut hub = Hub::default();
    hub.create_repository(U, "R").unwrap();
    let before = hub.active_store("R").unwrap().clone();

    hub.create_file(U, "R", "a.txt", "x").unwrap();
    hub.undo(U).unwrap();
    assert_eq!(hub.active_store("R").unwrap(), &before);
}

#[test]
fn delete_file_undo_keeps_file_order() {
    let mut hub = Hub::default();
    hub.create_repository(U, "R").unwrap();
    for name in ["a", "b", "c"] {
        hub.create_file(U, "R", name, name).unwrap();
    }

    hub.delete_file(U, "R", "a").unwrap();
    assert_eq!(hub.list_files("R").unwrap(), vec!["b", "c"]);
    hub.undo(U).unwrap();
    assert_eq!(hub.list_files("R").unwrap(), vec!["a", "b", "c"]);

    hub.delete_file(U, "R", "b").unwrap();
    hub.undo(U).unwrap();
    assert_eq!(hub.list_files("R").unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn create_file_undo_then_redo_keeps_file_order() {
    let mut hub = Hub::new(RedoPolicy::Retain);
    hub.create_repository(U, "R").unwrap();
    hub.create_file(U, "R", "a", "").unwrap();
    hub.create_file(U, "R", "b", "").unwrap();
    hub.delete_file(U, "R", "a").unwrap();
    hub.undo(U).unwrap(); // a back at the front
    hub.undo(U).unwrap(); // b removed
    hub.create_file(U, "R", "c", "").unwrap();

    hub.redo(U).unwrap(); // b returns to position 1
    assert_eq!(hub.list_files("R").unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn branch_edit_merge_undo_scenario() {
    let mut hub = Hub::default();
    hub.create_repository(U, "R").unwrap();
    hub.create_file(U, "R", "a.txt", "1").unwrap();
    hub.create_branch(U, "R", "main", "b1").unwrap();
    hub.switch_branch(U, "R", "b1").unwrap();
    hub.edit_file(U, "R", "a.txt", "2").unwrap();

    assert_eq!(branch_content(&hub, "R", "main", "a.txt").as_deref(), Some("1"));
    assert_eq!(branch_content(&hub, "R", "b1", "a.txt").as_deref(), Some("2"));

    let summary = hub.merge_branch(U, "R", "b1", "main").unwrap();
    assert_eq!(summary.overwritten, vec!["a.txt"]);
    assert_eq!(branch_content(&hub, "R", "main", "a.txt").as_deref(), Some("2"));

    // Merges are not recorded: undo reverts the edit on b1.
    let replay = hub.undo(U).unwrap();
    assert_eq!(replay.record.kind(), OpKind::EditFile);
    assert_eq!(branch_content(&hub, "R", "b1", "a.txt").as_deref(), Some("1"));
    assert_eq!(branch_content(&hub, "R", "main", "a.txt").as_deref(), Some("2"));
}

#[test]
fn merge_brings_missing_files_and_leaves_source_alone() {
    let mut hub = Hub::default();
    hub.create_repository(U, "R").unwrap();
    hub.create_file(U, "R", "shared", "main").unwrap();
    hub.create_branch(U, "R", "main", "feature").unwrap();
    hub.switch_branch(U, "R", "feature").unwrap();
    hub.edit_file(U, "R", "shared", "feature").unwrap();
    hub.create_file(U, "R", "new", "n").unwrap();

    let summary = hub.merge_branch(U, "R", "feature", "main").unwrap();
    assert_eq!(summary.added, vec!["new"]);
    assert_eq!(branch_content(&hub, "R", "main", "new").as_deref(), Some("n"));
    assert_eq!(branch_content(&hub, "R", "feature", "shared").as_deref(), Some("feature"));

    let main_log = hub.branch_history("R", Some("main")).unwrap();
    assert_eq!(main_log.last().unwrap().action, "Merged branch feature into main");
}

#[test]
fn clear_policy_drops_redo_on_new_action() {
    let mut hub = Hub::new(RedoPolicy::Clear);
    hub.create_repository(U, "R").unwrap();
    hub.create_file(U, "R", "a", "1").unwrap();
    hub.undo(U).unwrap();
    hub.add_task(U, "R", "t").unwrap();
    assert!(hub.redo_stack().is_empty());
    assert_eq!(hub.redo(U).unwrap_err(), CoreError::NothingToRedo);
}

#[test]
fn retain_policy_keeps_redo_on_new_action() {
    let mut hub = Hub::new(RedoPolicy::Retain);
    hub.create_repository(U, "R").unwrap();
    hub.create_file(U, "R", "a", "1").unwrap();
    hub.undo(U).unwrap();
    hub.add_task(U, "R", "t").unwrap();
    assert_eq!(hub.redo_stack().len(), 1);

    let replay = hub.redo(U).unwrap();
    assert_eq!(replay.outcome, Outcome::Applied);
    assert_eq!(content(&hub, "R", "a").as_deref(), Some("1"));
}

#[test]
fn retained_redo_that_collides_is_skipped() {
    let mut hub = Hub::new(RedoPolicy::Retain);
    hub.create_repository(U, "R").unwrap();
    hub.create_file(U, "R", "a", "old").unwrap();
    hub.undo(U).unwrap();
    hub.create_file(U, "R", "a", "new").unwrap();

    let replay = hub.redo(U).unwrap();
    assert!(matches!(replay.outcome, Outcome::Skipped { .. }));
    assert_eq!(content(&hub, "R", "a").as_deref(), Some("new"));
    assert!(hub.redo_stack().is_empty(), "skipped record is still consumed");
}

#[test]
fn skipped_redo_is_marked_in_history() {
    let mut hub = Hub::new(RedoPolicy::Retain);
    hub.create_repository(U, "R").unwrap();
    hub.create_file(U, "R", "a", "old").unwrap();
    hub.undo(U).unwrap();
    hub.create_file(U, "R", "a", "new").unwrap();
    let branch_log_len = hub.branch_history("R", None).unwrap().len();

    let replay = hub.redo(U).unwrap();
    let last = hub.history().last().unwrap();
    assert_eq!(last.action, replay.summary());
    assert!(
        last.action.starts_with("Redo: Created file a (skipped: "),
        "{}",
        last.action
    );
    assert_eq!(
        hub.branch_history("R", None).unwrap().len(),
        branch_log_len,
        "nothing applied, so the branch log is unchanged"
    );
    assert_eq!(content(&hub, "R", "a").as_deref(), Some("new"));
}

#[test]
fn delete_repository_undo_is_lossless() {
    let mut hub = Hub::default();
    hub.create_repository(U, "R").unwrap();
    hub.create_file(U, "R", "a.txt", "1").unwrap();
    hub.create_branch(U, "R", "main", "dev").unwrap();
    hub.switch_branch(U, "R", "dev").unwrap();
    hub.create_file(U, "R", "dev.txt", "d").unwrap();
    hub.add_task(U, "R", "first").unwrap();
    hub.add_task(U, "R", "second").unwrap();
    let before = hub.repository("R").unwrap().clone();

    hub.delete_repository(U, "R").unwrap();
    assert_eq!(hub.repository("R").unwrap_err().kind(), ErrorKind::NotFound);

    hub.undo(U).unwrap();
    assert_eq!(hub.repository("R").unwrap(), &before);
    assert_eq!(hub.tasks("R").unwrap(), vec!["first", "second"]);
    assert_eq!(hub.repository("R").unwrap().branches().active_name(), "dev");

    hub.redo(U).unwrap();
    assert!(hub.repository("R").is_err());
}

#[test]
fn redo_into_a_vanished_repository_is_skipped_and_consumed() {
    let mut hub = Hub::new(RedoPolicy::Retain);
    hub.create_repository(U, "R").unwrap();
    hub.create_file(U, "R", "a", "1").unwrap();
    hub.undo(U).unwrap(); // a removed; create_file on redo stack
    hub.delete_repository(U, "R").unwrap();
    hub.undo(U).unwrap(); // R restored
    hub.undo(U).unwrap(); // create_repo undone: R gone

    // Redo stack (oldest first): create_file, delete_repo, create_repo.
    hub.redo(U).unwrap(); // R re-created
    hub.redo(U).unwrap(); // R deleted again
    let replay = hub.redo(U).unwrap();
    assert_eq!(replay.record.kind(), OpKind::CreateFile);
    assert!(matches!(replay.outcome, Outcome::Skipped { .. }));
    assert!(hub.redo_stack().is_empty());
    assert_eq!(hub.undo_stack().last().unwrap().kind(), OpKind::CreateFile);
}

#[test]
fn task_queue_undo_redo() {
    let mut hub = Hub::default();
    hub.create_repository(U, "R").unwrap();
    hub.add_task(U, "R", "one").unwrap();
    hub.add_task(U, "R", "two").unwrap();
    assert_eq!(hub.remove_task(U, "R").unwrap(), "one");

    hub.undo(U).unwrap();
    assert_eq!(hub.tasks("R").unwrap(), vec!["one", "two"]);
    hub.undo(U).unwrap();
    assert_eq!(hub.tasks("R").unwrap(), vec!["one"]);
    hub.redo(U).unwrap();
    hub.redo(U).unwrap();
    assert_eq!(hub.tasks("R").unwrap(), vec!["two"]);
}

#[test]
fn empty_stacks_and_queues_report_kinds() {
    let mut hub = Hub::default();
    assert_eq!(hub.undo(U).unwrap_err().kind(), ErrorKind::EmptyStack);
    assert_eq!(hub.redo(U).unwrap_err().kind(), ErrorKind::EmptyStack);
    hub.create_repository(U, "R").unwrap();
    assert_eq!(hub.remove_task(U, "R").unwrap_err().kind(), ErrorKind::EmptyQueue);
    assert_eq!(
        hub.create_repository(U, "r").unwrap_err().kind(),
        ErrorKind::AlreadyExists
    );
    assert_eq!(
        hub.switch_branch(U, "R", "nope").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn session_round_trip_resumes_undo_and_redo() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut hub = Hub::default();
    hub.create_repository(U, "R").unwrap();
    hub.create_file(U, "R", "f", "orig").unwrap();
    hub.edit_file(U, "R", "f", "A").unwrap();
    hub.edit_file(U, "R", "f", "B").unwrap();
    hub.undo(U).unwrap();
    save(&path, &hub).unwrap();

    let mut resumed = load_or_new(&path, RedoPolicy::Retain).unwrap();
    assert_eq!(resumed, hub);
    assert_eq!(resumed.redo_policy(), RedoPolicy::Clear, "stored policy wins");
    assert!(resumed.search_repositories("r").contains(&"R".to_owned()));

    resumed.undo(U).unwrap();
    assert_eq!(content(&resumed, "R", "f").as_deref(), Some("orig"));
    resumed.redo(U).unwrap();
    resumed.redo(U).unwrap();
    assert_eq!(content(&resumed, "R", "f").as_deref(), Some("B"));

    let file = SessionFile::read(&path).unwrap();
    assert_eq!(file.hub.undo_stack().len(), 3);
}
