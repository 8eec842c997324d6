use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::persistence::{
    DEFAULT_KEY_PREFIX, JsonFileStore, KeyValueStore, MemoryStore, PersistenceResult,
};

pub const BACKEND_VAR: &str = "STUDY_PLANNER_BACKEND";
pub const DATA_DIR_VAR: &str = "STUDY_PLANNER_DATA_DIR";
pub const KEY_PREFIX_VAR: &str = "STUDY_PLANNER_KEY_PREFIX";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Json,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "json" => Ok(Backend::Json),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(format!("unsupported storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub backend: Backend,
    pub data_dir: PathBuf,
    pub key_prefix: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Json,
            data_dir: PathBuf::from("study-planner-data"),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl PlannerConfig {
    /// Defaults overridden by `STUDY_PLANNER_*` environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(BACKEND_VAR) {
            config.backend = raw.parse()?;
        }
        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup(KEY_PREFIX_VAR) {
            config.key_prefix = prefix;
        }
        Ok(config)
    }

    pub fn open_medium(&self) -> PersistenceResult<Box<dyn KeyValueStore>> {
        match self.backend {
            Backend::Memory => Ok(Box::new(MemoryStore::new())),
            Backend::Json => Ok(Box::new(JsonFileStore::open(&self.data_dir)?)),
            #[cfg(feature = "sqlite")]
            Backend::Sqlite => {
                std::fs::create_dir_all(&self.data_dir)?;
                let path = self.data_dir.join("planner.sqlite3");
                Ok(Box::new(crate::persistence::SqliteStore::new(path)?))
            }
        }
    }
}
