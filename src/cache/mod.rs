// 缓存模块
// 包含键值存储、缓存键和缓存操作

pub mod keys;
pub mod operations;
pub mod store;

pub use operations::{CacheStatus, ResponseCache, best_effort};
pub use store::{KvStore, MemoryStore, RedisStore};
