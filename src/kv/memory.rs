use std::collections::HashMap;

use super::{check_quota, KeyValueStore, Result};

/// In-process key-value store
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota_bytes: Option<u64>,
    available: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            quota_bytes: None,
            available: true,
        }
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::new()
        }
    }

    /// A store that reports itself as unavailable, e.g. when no substrate exists
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    fn used_bytes(&self) -> u64 {
        self.entries.values().map(|v| v.len() as u64).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn is_available(&self) -> bool {
        self.available
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.entries.get(key).map_or(0, |v| v.len() as u64);
        check_quota(key, self.used_bytes(), previous, value.len() as u64, self.quota_bytes)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::KvError;

    #[test]
    fn test_set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.entries.len(), 1);

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.entries.is_empty());
    }

    #[test]
    fn test_quota_keeps_previous_value() {
        let mut store = MemoryStore::with_quota(8);
        store.set("a", "1234").unwrap();
        store.set("b", "5678").unwrap();

        let result = store.set("b", "56789");
        assert!(matches!(result, Err(KvError::QuotaExceeded { .. })));
        assert_eq!(store.get("b").unwrap().as_deref(), Some("5678"));

        // Shrinking a value is always allowed
        store.set("a", "1").unwrap();
        store.set("b", "56789").unwrap();
    }

    #[test]
    fn test_unavailable_flag() {
        assert!(MemoryStore::new().is_available());
        assert!(!MemoryStore::unavailable().is_available());
    }
}
