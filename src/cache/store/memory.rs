use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::KvStore;
use crate::error::StoreError;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process store used when no Redis URL is configured, and in tests.
///
/// Expiry is checked lazily on access against the tokio clock, so paused-time
/// tests can advance past a TTL.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut HashMap<String, Entry>) -> R) -> R {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        f(&mut entries)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.with_entries(|entries| entries.get(key).map(|e| e.value.clone())))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = Instant::now() + ttl;
        self.with_entries(|entries| {
            entries.insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at,
                },
            );
        });
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let expires_at = Instant::now() + ttl;
        Ok(self.with_entries(|entries| {
            if entries.contains_key(key) {
                return false;
            }
            entries.insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at,
                },
            );
            true
        }))
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.with_entries(|entries| entries.remove(key).is_some()))
    }

    async fn incr(&self, key: &str, ttl: Duration) -> Result<i64, StoreError> {
        let expires_at = Instant::now() + ttl;
        self.with_entries(|entries| {
            let current = match entries.get(key) {
                Some(entry) => entry.value.parse::<i64>().map_err(|_| {
                    StoreError::Unavailable(format!("value at {} is not an integer", key))
                })?,
                None => 0,
            };
            let next = current + 1;
            entries.insert(
                key.to_string(),
                Entry {
                    value: next.to_string(),
                    expires_at,
                },
            );
            Ok(next)
        })
    }
}
