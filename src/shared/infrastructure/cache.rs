use crate::log_debug;
use crate::shared::errors::{AppError, AppResult};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Process-local key-value cache for query results
///
/// Values are stored as JSON so heterogeneous payloads can share one map.
/// The administrative clear operation empties the cache entirely and is
/// independent of any running job.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.entries.get(key) {
            Some(entry) => {
                let value = serde_json::from_value(entry.value().clone())
                    .map_err(|e| AppError::CacheError(format!("Corrupt entry '{}': {}", key, e)))?;
                log_debug!("Cache hit for '{}'", key);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn insert<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_value(value)?;
        self.entries.insert(key.to_string(), json);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Empty the cache entirely, returning the number of evicted entries
    pub fn clear(&self) -> usize {
        let evicted = self.entries.len();
        self.entries.clear();
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get_roundtrip() {
        let cache = MemoryCache::new();
        cache.insert("answer", &42u32).unwrap();

        let value: Option<u32> = cache.get("answer").unwrap();
        assert_eq!(value, Some(42));
    }

    #[test]
    fn test_get_missing_key_returns_none() {
        let cache = MemoryCache::new();
        let value: Option<String> = cache.get("missing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_clear_reports_evicted_count() {
        let cache = MemoryCache::new();
        cache.insert("a", &1u8).unwrap();
        cache.insert("b", &2u8).unwrap();

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.clear(), 0);
    }

    #[test]
    fn test_remove_single_entry() {
        let cache = MemoryCache::new();
        cache.insert("a", &1u8).unwrap();

        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
    }
}
