use super::{KeyValueStore, PersistenceError, PersistenceResult};
use std::collections::HashMap;

/// In-process medium. With a quota it behaves like browser storage: a write
/// that would push the total size of keys and values past the limit fails and
/// leaves the previous value in place.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        if let Some(limit) = self.quota_bytes {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let required = self.used_bytes() - replaced + key.len() + value.len();
            if required > limit {
                return Err(PersistenceError::QuotaExceeded {
                    key: key.to_string(),
                    required,
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> PersistenceResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    /// All-or-nothing: the whole batch is checked against the quota first.
    fn set_many(&mut self, entries: &[(String, String)]) -> PersistenceResult<()> {
        let mut staged = self.entries.clone();
        for (key, value) in entries {
            staged.insert(key.clone(), value.clone());
        }
        if let Some(limit) = self.quota_bytes {
            let required: usize = staged.iter().map(|(k, v)| k.len() + v.len()).sum();
            if required > limit {
                let key = entries.first().map(|(k, _)| k.clone()).unwrap_or_default();
                return Err(PersistenceError::QuotaExceeded {
                    key,
                    required,
                    limit,
                });
            }
        }
        self.entries = staged;
        Ok(())
    }
}
