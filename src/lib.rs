pub mod config;
pub mod ids;
pub mod persistence;
pub mod rules;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod subject;
pub mod task;
pub mod views;

pub use config::{Backend, PlannerConfig};
pub use ids::{IdGenerator, SequentialIds, TimeRandomIds};
#[cfg(feature = "sqlite")]
pub use persistence::SqliteStore;
pub use persistence::{
    Collection, JsonFileStore, KeyValueStore, MemoryStore, PersistenceError, PersistenceResult,
    PlannerSnapshot, load_snapshot_from_json, save_snapshot_to_json, validate_snapshot,
};
pub use rules::{
    ScheduleRuleError, TimeSlot, by_day, find_conflict, has_conflict, parse_time_of_day,
    sorted_by_start_time, time_to_minutes, validate_slot, week_view,
};
pub use schedule::{ClassType, NewSchedule, Schedule, SchedulePatch};
pub use settings::{Settings, SettingsPatch, Theme};
pub use store::{CascadeSummary, PlannerStore, StoreError, StoreResult};
pub use subject::{NewSubject, Priority, Subject, SubjectPatch};
pub use task::{NewTask, Task, TaskPatch, TaskType};
pub use views::{Analytics, Dashboard, Section, ScheduleView, TaskFilter, ViewState};
