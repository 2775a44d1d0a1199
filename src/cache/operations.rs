use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use super::store::KvStore;
use crate::error::StoreError;

/// Outcome of a cache-aside read, surfaced as the `X-Cache` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_header_value(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Runs the logging contract for side effects that must never fail a request:
/// failures are logged at `warn` under target `cache` with `operation`, `key`
/// and `error`, then dropped.
pub fn best_effort<T>(operation: &'static str, key: &str, result: Result<T, StoreError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(target: "cache", operation, key, error = %error, "best-effort cache operation failed");
            None
        }
    }
}

/// TTL cache of JSON payloads in front of slow upstream calls.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KvStore>,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Store errors and undecodable payloads are both reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = best_effort("get", key, self.store.get(key).await)??;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!("Cache hit: {}", key);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(target: "cache", key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }

    fn encode<T: Serialize>(key: &str, value: &T) -> Option<String> {
        match serde_json::to_string(value) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!(target: "cache", operation = "put", key, error = %e, "failed to serialize cache entry");
                None
            }
        }
    }

    async fn write(&self, key: &str, json: &str, ttl: Duration) {
        if best_effort("put", key, self.store.put(key, json, ttl).await).is_some() {
            tracing::debug!("Cached {} for {}s", key, ttl.as_secs());
        }
    }

    /// Serializes `value` immediately and writes it from a spawned task.
    pub fn put_in_background<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(json) = Self::encode(key, value) else {
            return;
        };
        let cache = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            cache.write(&key, &json, ttl).await;
        });
    }

    pub async fn clear(&self, key: &str) {
        best_effort("clear", key, self.store.delete(key).await);
    }

    /// Cache-aside: serve from cache, otherwise call `fetch` and populate in
    /// the background. Fetch errors are returned untouched and nothing is
    /// cached.
    pub async fn get_or_fetch<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<(T, CacheStatus), E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok((cached, CacheStatus::Hit));
        }
        let value = fetch().await?;
        self.put_in_background(key, &value, ttl);
        Ok((value, CacheStatus::Miss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::MemoryStore;

    #[tokio::test]
    async fn get_or_fetch_populates_then_hits() {
        let cache = ResponseCache::new(Arc::new(MemoryStore::new()));
        let ttl = Duration::from_secs(60);

        let (first, status) = cache
            .get_or_fetch("stats:test", ttl, || async { Ok::<_, ()>(vec![1, 2, 3]) })
            .await
            .unwrap();
        assert_eq!(status, CacheStatus::Miss);
        tokio::task::yield_now().await;

        let (second, status) = cache
            .get_or_fetch("stats:test", ttl, || async { Err::<Vec<i32>, _>(()) })
            .await
            .unwrap();
        assert_eq!(status, CacheStatus::Hit);
        assert_eq!(first, second);
    }

    /// Accepts reads but never finishes a write.
    struct StalledWrites;

    #[async_trait::async_trait]
    impl KvStore for StalledWrites {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }
        async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
            std::future::pending().await
        }
        async fn put_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<bool, StoreError> {
            std::future::pending().await
        }
        async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn incr(&self, _key: &str, _ttl: Duration) -> Result<i64, StoreError> {
            Ok(1)
        }
    }

    #[tokio::test]
    async fn slow_writes_do_not_hold_up_a_miss() {
        let cache = ResponseCache::new(Arc::new(StalledWrites));
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            cache.get_or_fetch("stats:github", Duration::from_secs(60), || async {
                Ok::<_, ()>(7u32)
            }),
        )
        .await
        .expect("miss waited on the cache write");
        assert_eq!(result, Ok((7, CacheStatus::Miss)));
    }

    #[tokio::test]
    async fn fetch_errors_are_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let cache = ResponseCache::new(store.clone());
        let result = cache
            .get_or_fetch("stats:broken", Duration::from_secs(60), || async {
                Err::<u32, _>("upstream down")
            })
            .await;
        assert_eq!(result, Err("upstream down"));
        assert_eq!(store.get("stats:broken").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_entries_read_as_miss() {
        let store = Arc::new(MemoryStore::new());
        store
            .put("blog_post:x", "{not json", Duration::from_secs(60))
            .await
            .unwrap();
        let cache = ResponseCache::new(store);
        assert_eq!(cache.get::<serde_json::Value>("blog_post:x").await, None);
    }
}
