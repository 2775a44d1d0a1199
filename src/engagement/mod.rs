// 互动计数模块
// 浏览去重、点赞和联系表单节流

use std::sync::Arc;

use crate::{
    cache::{
        KvStore, best_effort,
        keys::{self, ViewResource},
    },
    config::CacheTtls,
    database::{CounterStore, ProjectStats},
    error::{AppError, StoreError},
};

/// Counter updates guarded by per-client flags in the key-value store.
#[derive(Clone)]
pub struct Engagement {
    kv: Arc<dyn KvStore>,
    counters: Arc<dyn CounterStore>,
    ttls: CacheTtls,
}

impl Engagement {
    pub fn new(kv: Arc<dyn KvStore>, counters: Arc<dyn CounterStore>, ttls: CacheTtls) -> Self {
        Self { kv, counters, ttls }
    }

    pub async fn view_count(&self, resource: ViewResource, id: &str) -> Result<i64, StoreError> {
        match resource {
            ViewResource::Blog => self.counters.view_count(id).await,
            ViewResource::Work => Ok(self.counters.project_stats(id).await?.views),
        }
    }

    pub async fn project_stats(&self, project_id: &str) -> Result<ProjectStats, StoreError> {
        self.counters.project_stats(project_id).await
    }

    /// Counts at most one view per client per dedupe window and returns the
    /// resulting count. Never fails: on store errors the stored count (or 0)
    /// is returned.
    pub async fn record_view(&self, resource: ViewResource, id: &str, ip: &str) -> i64 {
        match self.try_record_view(resource, id, ip).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("Failed to record view for {}: {}", id, e);
                self.view_count(resource, id).await.unwrap_or_else(|e| {
                    tracing::error!("Failed to read view count for {}: {}", id, e);
                    0
                })
            }
        }
    }

    async fn try_record_view(
        &self,
        resource: ViewResource,
        id: &str,
        ip: &str,
    ) -> Result<i64, StoreError> {
        let key = keys::view_dedupe_key(resource, id, ip);
        let claimed = self
            .kv
            .put_if_absent(&key, "1", self.ttls.view_dedupe())
            .await?;
        if !claimed {
            return self.view_count(resource, id).await;
        }
        match resource {
            ViewResource::Blog => self.counters.increment_view_count(id).await,
            ViewResource::Work => self.counters.increment_project_views(id).await,
        }
    }

    /// One like per client; a second like is a 400 "Already liked". Store
    /// failures never fail the request: an unreadable flag lets the like
    /// through and a failed increment answers with the stored count.
    pub async fn like(&self, project_id: &str, ip: &str) -> Result<i64, AppError> {
        let key = keys::project_like_key(project_id, ip);
        match self.kv.put_if_absent(&key, "1", self.ttls.like_flag()).await {
            Ok(true) => {}
            Ok(false) => return Err(AppError::BadRequest("Already liked".into())),
            Err(e) => tracing::error!("Failed to check like flag for {}: {}", project_id, e),
        }
        match self.counters.increment_likes(project_id).await {
            Ok(likes) => Ok(likes),
            Err(e) => {
                tracing::error!("Failed to increment likes for {}: {}", project_id, e);
                // release the flag so the client can retry
                best_effort("delete", &key, self.kv.delete(&key).await);
                Ok(self.current_likes(project_id).await)
            }
        }
    }

    pub async fn unlike(&self, project_id: &str, ip: &str) -> Result<i64, AppError> {
        let key = keys::project_like_key(project_id, ip);
        match self.kv.delete(&key).await {
            Ok(true) => {}
            Ok(false) => return Err(AppError::BadRequest("Not liked yet".into())),
            Err(e) => tracing::error!("Failed to clear like flag for {}: {}", project_id, e),
        }
        match self.counters.decrement_likes(project_id).await {
            Ok(likes) => Ok(likes),
            Err(e) => {
                tracing::error!("Failed to decrement likes for {}: {}", project_id, e);
                Ok(self.current_likes(project_id).await)
            }
        }
    }

    async fn current_likes(&self, project_id: &str) -> i64 {
        match self.counters.project_stats(project_id).await {
            Ok(stats) => stats.likes,
            Err(e) => {
                tracing::error!("Failed to read likes for {}: {}", project_id, e);
                0
            }
        }
    }

    /// Claims the contact throttle slot for `ip`. Returns `true` when a
    /// submission was already made inside the throttle window. Store failures
    /// let the submission through.
    pub async fn has_recent_submission(&self, ip: &str) -> bool {
        let key = keys::contact_submission_key(ip);
        match self
            .kv
            .put_if_absent(&key, "1", self.ttls.contact_throttle())
            .await
        {
            Ok(claimed) => !claimed,
            Err(e) => {
                tracing::error!("Failed to check recent submission for {}: {}", ip, e);
                false
            }
        }
    }
}
