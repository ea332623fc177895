//! In-memory storage backend using DashMap.
//!
//! State is lost when the process ends; useful for tests, demos, and hosts
//! that supply their own persistence at a higher level.

use dashmap::DashMap;

use super::StorageBackend;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("missing"), None);

        storage.set("k", "v1");
        assert_eq!(storage.get("k"), Some("v1".to_string()));

        storage.set("k", "v2");
        assert_eq!(storage.get("k"), Some("v2".to_string()));
    }
}
