use super::{IKeyValueRepo, KeyListPage};
use crate::system::ISys;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const DEFAULT_LIST_LIMIT: usize = 1000;

#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    expires_at_millis: Option<i64>,
}

pub struct InMemoryKeyValueRepo {
    entries: Mutex<HashMap<String, StoredEntry>>,
    sys: Arc<dyn ISys>,
    list_limit: usize,
}

impl InMemoryKeyValueRepo {
    pub fn new(sys: Arc<dyn ISys>) -> Self {
        Self::with_list_limit(sys, DEFAULT_LIST_LIMIT)
    }

    pub fn with_list_limit(sys: Arc<dyn ISys>, list_limit: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            sys,
            list_limit,
        }
    }

    fn is_expired(&self, entry: &StoredEntry) -> bool {
        match entry.expires_at_millis {
            Some(expires_at) => expires_at <= self.sys.get_timestamp_millis(),
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl IKeyValueRepo for InMemoryKeyValueRepo {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|entry| !self.is_expired(entry))
            .map(|entry| entry.value.clone())
    }

    async fn put(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> anyhow::Result<()> {
        let expires_at_millis =
            ttl_seconds.map(|ttl| self.sys.get_timestamp_millis() + ttl as i64 * 1000);
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.into(),
            StoredEntry {
                value: value.into(),
                expires_at_millis,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str, cursor: Option<&str>) -> anyhow::Result<KeyListPage> {
        let entries = self.entries.lock().unwrap();
        let mut keys = entries
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && !self.is_expired(entry))
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();
        keys.sort();

        if let Some(cursor) = cursor {
            keys.retain(|key| key.as_str() > cursor);
        }

        let complete = keys.len() <= self.list_limit;
        keys.truncate(self.list_limit);
        let next_cursor = if complete { None } else { keys.last().cloned() };

        Ok(KeyListPage {
            keys,
            cursor: next_cursor,
            complete,
        })
    }
}
