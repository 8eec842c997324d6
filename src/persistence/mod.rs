use crate::rules;
use crate::{Schedule, Settings, Subject, Task};
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use std::collections::HashSet;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("storage quota exceeded writing '{key}' ({required} bytes needed, limit {limit})")]
    QuotaExceeded {
        key: String,
        required: usize,
        limit: usize,
    },
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Synchronous whole-value key-value medium. Each key holds one JSON blob
/// that is replaced in full on every write.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()>;
    fn remove(&mut self, key: &str) -> PersistenceResult<()>;

    /// Writes several keys in the given order. Media with transactions
    /// override this to make the batch atomic.
    fn set_many(&mut self, entries: &[(String, String)]) -> PersistenceResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> PersistenceResult<()> {
        (**self).remove(key)
    }

    fn set_many(&mut self, entries: &[(String, String)]) -> PersistenceResult<()> {
        (**self).set_many(entries)
    }
}

pub const DEFAULT_KEY_PREFIX: &str = "studyPlanner_";

/// The four logical blobs of the persisted layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Subjects,
    Schedules,
    Tasks,
    Settings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Subjects => "subjects",
            Collection::Schedules => "schedules",
            Collection::Tasks => "tasks",
            Collection::Settings => "settings",
        }
    }

    pub fn key(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.as_str())
    }
}

/// Every collection at once, as written to backup files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerSnapshot {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub settings: Settings,
}

fn check_unique_ids<'a, I>(kind: &str, ids: I) -> PersistenceResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate {kind} id {id}"
            )));
        }
    }
    Ok(())
}

/// Unique ids, well-formed non-overlapping class slots and no dangling
/// subject references.
pub fn validate_snapshot(snapshot: &PlannerSnapshot) -> PersistenceResult<()> {
    check_unique_ids("subject", snapshot.subjects.iter().map(|s| s.id.as_str()))?;
    check_unique_ids("schedule", snapshot.schedules.iter().map(|s| s.id.as_str()))?;
    check_unique_ids("task", snapshot.tasks.iter().map(|t| t.id.as_str()))?;

    let subject_ids: HashSet<&str> = snapshot.subjects.iter().map(|s| s.id.as_str()).collect();

    for (idx, schedule) in snapshot.schedules.iter().enumerate() {
        if !subject_ids.contains(schedule.subject_id.as_str()) {
            return Err(PersistenceError::InvalidData(format!(
                "schedule {} references unknown subject {}",
                schedule.id, schedule.subject_id
            )));
        }
        // Only earlier slots are scanned so each clashing pair is reported once.
        rules::validate_slot(&snapshot.schedules[..idx], schedule, None).map_err(|err| {
            PersistenceError::InvalidData(format!("schedule {}: {err}", schedule.id))
        })?;
    }

    for task in &snapshot.tasks {
        if !subject_ids.contains(task.subject_id.as_str()) {
            return Err(PersistenceError::InvalidData(format!(
                "task {} references unknown subject {}",
                task.id, task.subject_id
            )));
        }
    }
    Ok(())
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{JsonFileStore, load_snapshot_from_json, save_snapshot_to_json};
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
