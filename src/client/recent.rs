use std::sync::Arc;

use super::storage::{KeyValueStore, read_list, write_list};

pub const STORAGE_KEY: &str = "recentSearches";
/// Entries kept in storage.
pub const MAX_RECENT: usize = 10;
/// Entries shown in the panel.
pub const SHOWN_RECENT: usize = 5;

/// Most-recent-first, deduplicated list of submitted queries.
#[derive(Clone)]
pub struct RecentSearches {
    store: Arc<dyn KeyValueStore>,
}

impl RecentSearches {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Every stored entry, newest first.
    #[must_use]
    pub fn all(&self) -> Vec<String> {
        read_list(self.store.as_ref(), STORAGE_KEY)
    }

    /// The entries the panel displays.
    #[must_use]
    pub fn shown(&self) -> Vec<String> {
        let mut entries = self.all();
        entries.truncate(SHOWN_RECENT);
        entries
    }

    /// Move `query` to the front, dropping any older copy and the overflow.
    pub fn record(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() {
            return self.all();
        }
        let mut entries = self.all();
        entries.retain(|entry| entry != query);
        entries.insert(0, query.to_string());
        entries.truncate(MAX_RECENT);
        write_list(self.store.as_ref(), STORAGE_KEY, &entries);
        entries
    }

    pub fn clear(&self) {
        self.store.remove(STORAGE_KEY);
    }
}
