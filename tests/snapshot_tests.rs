use chrono::{NaiveTime, TimeZone, Utc, Weekday};
use study_planner::{
    ClassType, MemoryStore, PersistenceError, PlannerSnapshot, PlannerStore, Schedule,
    SettingsPatch, Theme, load_snapshot_from_json, save_snapshot_to_json, validate_snapshot,
};
use tempfile::NamedTempFile;

fn seeded_store() -> PlannerStore<MemoryStore> {
    let mut store = PlannerStore::new(MemoryStore::new());
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
    store.seed_sample_data(now).unwrap();
    store.update_settings(SettingsPatch::theme(Theme::Dark)).unwrap();
    store
}

fn extra_slot(id: &str, subject_id: &str, start: (u32, u32), end: (u32, u32)) -> Schedule {
    Schedule {
        id: id.to_string(),
        subject_id: subject_id.to_string(),
        day: Weekday::Mon,
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        location: None,
        class_type: ClassType::Tutorial,
        created_at: Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap(),
    }
}

#[test]
fn export_then_import_restores_every_collection() {
    let source = seeded_store();
    let snapshot = source.snapshot().unwrap();
    let file = NamedTempFile::new().unwrap();
    save_snapshot_to_json(&snapshot, file.path()).unwrap();

    let loaded = load_snapshot_from_json(file.path()).unwrap();
    assert_eq!(loaded, snapshot);

    let mut target = PlannerStore::new(MemoryStore::new());
    target.restore(&loaded).unwrap();
    assert_eq!(target.snapshot().unwrap(), snapshot);
    assert_eq!(target.settings().unwrap().theme, Theme::Dark);
}

#[test]
fn snapshot_with_overlapping_classes_is_rejected() {
    let mut snapshot = seeded_store().snapshot().unwrap();
    let math_id = snapshot.subjects[0].id.clone();
    snapshot
        .schedules
        .push(extra_slot("clash", &math_id, (10, 0), (11, 0)));

    let err = validate_snapshot(&snapshot).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(ref msg) if msg.contains("clash")));

    let mut target = PlannerStore::new(MemoryStore::new());
    assert!(target.restore(&snapshot).is_err());
    assert!(target.medium().is_empty());
}

#[test]
fn snapshot_with_orphaned_records_is_rejected() {
    let mut snapshot = seeded_store().snapshot().unwrap();
    snapshot
        .schedules
        .push(extra_slot("orphan", "no-such-subject", (18, 0), (19, 0)));
    assert!(validate_snapshot(&snapshot).is_err());

    let mut snapshot = seeded_store().snapshot().unwrap();
    snapshot.tasks[0].subject_id = "no-such-subject".into();
    assert!(validate_snapshot(&snapshot).is_err());
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut snapshot = seeded_store().snapshot().unwrap();
    let copy = snapshot.tasks[0].clone();
    snapshot.tasks.push(copy);
    assert!(matches!(
        validate_snapshot(&snapshot),
        Err(PersistenceError::InvalidData(msg)) if msg.contains("duplicate task id")
    ));
}

#[test]
fn missing_sections_default_to_empty() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), r#"{"subjects": []}"#).unwrap();
    let loaded = load_snapshot_from_json(file.path()).unwrap();
    assert_eq!(loaded, PlannerSnapshot::default());
}
