//! Key-value store used for rate-limit counters, cached payloads and dedupe flags.

mod memory;
mod redis_store;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

pub use self::memory::MemoryStore;
pub use self::redis_store::RedisStore;

/// Every write carries a TTL; nothing in this service stores keys forever.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Writes only when the key is absent. Returns `true` if this call created it.
    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration)
    -> Result<bool, StoreError>;

    /// Returns `true` if a key was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Atomically adds one and re-arms the TTL to `ttl` from now.
    async fn incr(&self, key: &str, ttl: Duration) -> Result<i64, StoreError>;
}
