use study_planner::{
    Collection, KeyValueStore, MemoryStore, PlannerStore, Settings, SettingsPatch, Theme,
};

#[test]
fn unset_settings_read_as_defaults() {
    let store = PlannerStore::new(MemoryStore::new());
    let settings = store.settings().unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.theme, Theme::Light);
    assert!(settings.notifications);
    assert!(store.medium().is_empty());
}

#[test]
fn partial_updates_keep_the_other_field() {
    let mut store = PlannerStore::new(MemoryStore::new());

    let after_theme = store.update_settings(SettingsPatch::theme(Theme::Dark)).unwrap();
    assert_eq!(after_theme.theme, Theme::Dark);
    assert!(after_theme.notifications);

    let after_toggle = store
        .update_settings(SettingsPatch::notifications(false))
        .unwrap();
    assert_eq!(after_toggle.theme, Theme::Dark);
    assert!(!after_toggle.notifications);

    assert_eq!(store.settings().unwrap(), after_toggle);
}

#[test]
fn settings_blob_is_a_single_record() {
    let mut store = PlannerStore::new(MemoryStore::new());
    store.update_settings(SettingsPatch::theme(Theme::Dark)).unwrap();

    let raw = store
        .medium()
        .get(&Collection::Settings.key(store.prefix()))
        .unwrap()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value, serde_json::json!({"theme": "dark", "notifications": true}));
}

#[test]
fn prefixes_isolate_planners_sharing_a_medium() {
    let mut first = PlannerStore::new(MemoryStore::new()).with_prefix("alice_");
    first.update_settings(SettingsPatch::theme(Theme::Dark)).unwrap();

    let second = PlannerStore::new(first.into_medium()).with_prefix("bob_");
    assert_eq!(second.settings().unwrap().theme, Theme::Light);
}

#[test]
fn stored_settings_missing_a_field_fall_back_to_its_default() {
    let mut medium = MemoryStore::new();
    medium
        .set(&Collection::Settings.key("studyPlanner_"), r#"{"theme":"dark"}"#)
        .unwrap();

    let store = PlannerStore::new(medium);
    let settings = store.settings().unwrap();
    assert_eq!(settings.theme, Theme::Dark);
    assert!(settings.notifications);
}
