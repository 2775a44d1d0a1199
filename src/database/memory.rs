use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::CounterStore;
use super::models::{ContactStats, NewContact, ProjectStats};
use crate::error::StoreError;

#[derive(Default)]
struct Tables {
    blog_views: HashMap<String, i64>,
    project_stats: HashMap<String, ProjectStats>,
    contacts: Vec<(NewContact, DateTime<Utc>)>,
}

/// Counter store kept in process memory, used when no database is configured.
#[derive(Default)]
pub struct MemoryCounterStore {
    tables: Mutex<Tables>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted contact submissions.
    pub fn contact_count(&self) -> usize {
        self.with_tables(|t| t.contacts.len())
    }

    fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut tables)
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn view_count(&self, slug: &str) -> Result<i64, StoreError> {
        Ok(self.with_tables(|t| t.blog_views.get(slug).copied().unwrap_or(0)))
    }

    async fn increment_view_count(&self, slug: &str) -> Result<i64, StoreError> {
        Ok(self.with_tables(|t| {
            let count = t.blog_views.entry(slug.to_string()).or_insert(0);
            *count += 1;
            *count
        }))
    }

    async fn project_stats(&self, project_id: &str) -> Result<ProjectStats, StoreError> {
        Ok(self.with_tables(|t| t.project_stats.get(project_id).copied().unwrap_or_default()))
    }

    async fn increment_project_views(&self, project_id: &str) -> Result<i64, StoreError> {
        Ok(self.with_tables(|t| {
            let stats = t.project_stats.entry(project_id.to_string()).or_default();
            stats.views += 1;
            stats.views
        }))
    }

    async fn increment_likes(&self, project_id: &str) -> Result<i64, StoreError> {
        Ok(self.with_tables(|t| {
            let stats = t.project_stats.entry(project_id.to_string()).or_default();
            stats.likes += 1;
            stats.likes
        }))
    }

    async fn decrement_likes(&self, project_id: &str) -> Result<i64, StoreError> {
        Ok(self.with_tables(|t| match t.project_stats.get_mut(project_id) {
            Some(stats) => {
                stats.likes = (stats.likes - 1).max(0);
                stats.likes
            }
            None => 0,
        }))
    }

    async fn insert_contact(&self, contact: &NewContact) -> Result<i64, StoreError> {
        Ok(self.with_tables(|t| {
            t.contacts.push((contact.clone(), Utc::now()));
            t.contacts.len() as i64
        }))
    }

    async fn contact_stats(&self) -> Result<ContactStats, StoreError> {
        let now = Utc::now();
        let today = now.date_naive();
        let week_start = today - Duration::days(7);
        Ok(self.with_tables(|t| {
            let total = t.contacts.len() as i64;
            let today_count = t
                .contacts
                .iter()
                .filter(|(_, at)| at.date_naive() == today)
                .count() as i64;
            let this_week = t
                .contacts
                .iter()
                .filter(|(_, at)| at.date_naive() >= week_start)
                .count() as i64;
            // status changes are not modelled in memory; everything stays unread
            ContactStats {
                total,
                unread: total,
                today: today_count,
                this_week,
            }
        }))
    }
}
