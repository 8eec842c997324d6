#![cfg(feature = "sqlite")]

use chrono::{NaiveTime, TimeZone, Utc, Weekday};
use study_planner::{
    KeyValueStore, NewSchedule, NewSubject, NewTask, PlannerStore, SqliteStore, TaskType,
};
use tempfile::NamedTempFile;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn sqlite_store_round_trips_across_connections() {
    let file = NamedTempFile::new().unwrap();

    let (subject_id, task_id) = {
        let mut store = PlannerStore::new(SqliteStore::new(file.path()).unwrap());
        let subject = store.add_subject(NewSubject::new("Biology")).unwrap();
        store
            .add_schedule(NewSchedule::new(&subject.id, Weekday::Fri, t(8, 0), t(9, 30)))
            .unwrap();
        let deadline = Utc.with_ymd_and_hms(2026, 11, 2, 23, 59, 0).unwrap();
        let task = store
            .add_task(NewTask::new(&subject.id, "Lab notes", TaskType::Assignment, deadline))
            .unwrap();
        store.toggle_task_complete(&task.id).unwrap();
        (subject.id, task.id)
    };

    let store = PlannerStore::new(SqliteStore::new(file.path()).unwrap());
    assert_eq!(store.subject_by_id(&subject_id).unwrap().unwrap().name, "Biology");
    assert_eq!(store.schedules().unwrap().len(), 1);
    let task = store.task_by_id(&task_id).unwrap().unwrap();
    assert!(task.completed);
    assert_eq!(task.deadline, Utc.with_ymd_and_hms(2026, 11, 2, 23, 59, 0).unwrap());
}

#[test]
fn upsert_replaces_and_remove_deletes() {
    let mut store = SqliteStore::in_memory().unwrap();
    store.set("k", "one").unwrap();
    store.set("k", "two").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    store.remove("k").unwrap();
    assert!(store.get("k").unwrap().is_none());
}

#[test]
fn cascade_runs_as_one_batch() {
    let mut store = PlannerStore::new(SqliteStore::in_memory().unwrap());
    let keep = store.add_subject(NewSubject::new("Keep")).unwrap();
    let drop = store.add_subject(NewSubject::new("Drop")).unwrap();
    store
        .add_schedule(NewSchedule::new(&drop.id, Weekday::Mon, t(9, 0), t(10, 0)))
        .unwrap();
    store
        .add_schedule(NewSchedule::new(&keep.id, Weekday::Mon, t(10, 0), t(11, 0)))
        .unwrap();

    let summary = store.delete_subject(&drop.id).unwrap();
    assert!(summary.subject_removed);
    assert_eq!(summary.schedules_removed, 1);
    assert_eq!(summary.tasks_removed, 0);

    let remaining = store.schedules().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].subject_id, keep.id);
}
