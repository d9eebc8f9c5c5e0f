use dashmap::DashMap;

/// String key-value persistence for widget data that outlives a page.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// Process-local [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Read a JSON string list stored under `key`. Missing or corrupt data reads as empty.
pub fn read_list(store: &dyn KeyValueStore, key: &str) -> Vec<String> {
    store
        .get(key)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

/// Store `items` under `key` as a JSON array.
pub fn write_list(store: &dyn KeyValueStore, key: &str, items: &[String]) {
    match serde_json::to_string(items) {
        Ok(raw) => store.set(key, raw),
        Err(e) => tracing::warn!(key, error = %e, "Failed to encode stored list"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v".to_string());
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k");
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_corrupt_list_reads_empty() {
        let store = MemoryStore::new();
        store.set("list", "{not json".to_string());
        assert!(read_list(&store, "list").is_empty());

        write_list(&store, "list", &["a".to_string(), "b".to_string()]);
        assert_eq!(read_list(&store, "list"), vec!["a", "b"]);
    }
}
