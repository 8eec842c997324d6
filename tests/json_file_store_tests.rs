use chrono::{NaiveTime, Weekday};
use study_planner::{
    JsonFileStore, KeyValueStore, NewSchedule, NewSubject, PersistenceError, PlannerStore,
    SettingsPatch, Theme,
};
use tempfile::tempdir;

#[test]
fn data_survives_reopening_the_directory() {
    let dir = tempdir().unwrap();

    let subject_id = {
        let mut store = PlannerStore::new(JsonFileStore::open(dir.path()).unwrap());
        let subject = store.add_subject(NewSubject::new("Chemistry")).unwrap();
        store
            .add_schedule(NewSchedule::new(
                &subject.id,
                Weekday::Thu,
                NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            ))
            .unwrap();
        store.update_settings(SettingsPatch::theme(Theme::Dark)).unwrap();
        subject.id
    };

    assert!(dir.path().join("studyPlanner_subjects.json").exists());

    let reopened = PlannerStore::new(JsonFileStore::open(dir.path()).unwrap());
    let subject = reopened.subject_by_id(&subject_id).unwrap().unwrap();
    assert_eq!(subject.name, "Chemistry");
    assert_eq!(reopened.schedules_by_day(Weekday::Thu).unwrap().len(), 1);
    assert_eq!(reopened.settings().unwrap().theme, Theme::Dark);
}

#[test]
fn missing_keys_read_as_absent_and_remove_is_quiet() {
    let dir = tempdir().unwrap();
    let mut store = JsonFileStore::open(dir.path().join("nested")).unwrap();
    assert!(store.get("studyPlanner_tasks").unwrap().is_none());
    store.remove("studyPlanner_tasks").unwrap();

    store.set("studyPlanner_tasks", "[]").unwrap();
    assert_eq!(store.get("studyPlanner_tasks").unwrap().as_deref(), Some("[]"));
    store.remove("studyPlanner_tasks").unwrap();
    assert!(store.get("studyPlanner_tasks").unwrap().is_none());
}

#[test]
fn keys_that_escape_the_directory_are_rejected() {
    let dir = tempdir().unwrap();
    let mut store = JsonFileStore::open(dir.path()).unwrap();
    assert!(matches!(
        store.set("../outside", "{}"),
        Err(PersistenceError::InvalidData(_))
    ));
}

#[test]
fn corrupt_blob_surfaces_a_serialization_error() {
    let dir = tempdir().unwrap();
    let mut medium = JsonFileStore::open(dir.path()).unwrap();
    medium.set("studyPlanner_subjects", "not json").unwrap();

    let store = PlannerStore::new(medium);
    assert!(matches!(
        store.subjects(),
        Err(PersistenceError::Serialization(_))
    ));
}
