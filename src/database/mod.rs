// 数据库模块
// 计数器与联系表单的持久化

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;

pub use memory::MemoryCounterStore;
pub use models::{ContactStats, NewContact, ProjectStats};
pub use postgres::PgCounterStore;

/// Relational persistence for view counts, like counts and contact submissions.
///
/// Increments are single atomic statements; callers handle per-client dedupe
/// through the key-value store.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn view_count(&self, slug: &str) -> Result<i64, StoreError>;

    /// Upserts the row and returns the count after the increment.
    async fn increment_view_count(&self, slug: &str) -> Result<i64, StoreError>;

    async fn project_stats(&self, project_id: &str) -> Result<ProjectStats, StoreError>;

    async fn increment_project_views(&self, project_id: &str) -> Result<i64, StoreError>;

    async fn increment_likes(&self, project_id: &str) -> Result<i64, StoreError>;

    /// Never goes below zero.
    async fn decrement_likes(&self, project_id: &str) -> Result<i64, StoreError>;

    /// Returns the new submission id.
    async fn insert_contact(&self, contact: &NewContact) -> Result<i64, StoreError>;

    async fn contact_stats(&self) -> Result<ContactStats, StoreError>;
}
