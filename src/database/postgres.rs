use async_trait::async_trait;
use sqlx::PgPool;

use super::CounterStore;
use super::models::{ContactStats, NewContact, ProjectStats};
use crate::error::StoreError;

#[derive(Clone)]
pub struct PgCounterStore {
    pool: PgPool,
}

impl PgCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterStore for PgCounterStore {
    async fn view_count(&self, slug: &str) -> Result<i64, StoreError> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT view_count FROM blog_views WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
        Ok(count.unwrap_or(0))
    }

    async fn increment_view_count(&self, slug: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO blog_views (slug, view_count, last_viewed_at)
            VALUES ($1, 1, NOW())
            ON CONFLICT (slug) DO UPDATE SET
                view_count = blog_views.view_count + 1,
                last_viewed_at = NOW()
            RETURNING view_count
            "#,
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn project_stats(&self, project_id: &str) -> Result<ProjectStats, StoreError> {
        let stats = sqlx::query_as::<_, ProjectStats>(
            "SELECT likes, views FROM project_stats WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stats.unwrap_or_default())
    }

    async fn increment_project_views(&self, project_id: &str) -> Result<i64, StoreError> {
        let views: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO project_stats (project_id, views, last_interacted_at)
            VALUES ($1, 1, NOW())
            ON CONFLICT (project_id) DO UPDATE SET
                views = project_stats.views + 1,
                last_interacted_at = NOW()
            RETURNING views
            "#,
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(views)
    }

    async fn increment_likes(&self, project_id: &str) -> Result<i64, StoreError> {
        let likes: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO project_stats (project_id, likes, last_interacted_at)
            VALUES ($1, 1, NOW())
            ON CONFLICT (project_id) DO UPDATE SET
                likes = project_stats.likes + 1,
                last_interacted_at = NOW()
            RETURNING likes
            "#,
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(likes)
    }

    async fn decrement_likes(&self, project_id: &str) -> Result<i64, StoreError> {
        let likes: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE project_stats
            SET likes = GREATEST(0, likes - 1),
                last_interacted_at = NOW()
            WHERE project_id = $1
            RETURNING likes
            "#,
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(likes.unwrap_or(0))
    }

    async fn insert_contact(&self, contact: &NewContact) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO contacts (name, email, message, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.message)
        .bind(&contact.ip_address)
        .bind(&contact.user_agent)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn contact_stats(&self) -> Result<ContactStats, StoreError> {
        let stats = sqlx::query_as::<_, ContactStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'unread') AS unread,
                COUNT(*) FILTER (WHERE created_at::date = CURRENT_DATE) AS today,
                COUNT(*) FILTER (WHERE created_at::date >= CURRENT_DATE - 7) AS this_week
            FROM contacts
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
