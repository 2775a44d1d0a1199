use serde::Serialize;

use crate::{database::ProjectStats, models::Work};

/// Catalog entry joined with its counters.
#[derive(Debug, Clone, Serialize)]
pub struct WorkWithStats {
    #[serde(flatten)]
    pub work: Work,
    pub likes: i64,
    pub views: i64,
}

impl WorkWithStats {
    pub fn new(work: &Work, stats: ProjectStats) -> Self {
        Self {
            work: work.clone(),
            likes: stats.likes,
            views: stats.views,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WorkList {
    pub works: Vec<WorkWithStats>,
}

#[derive(Debug, Serialize)]
pub struct LikeCount {
    pub likes: i64,
}

/// Most viewed first; ties keep catalog order.
pub fn sort_by_views(works: &mut [WorkWithStats]) {
    works.sort_by(|a, b| b.views.cmp(&a.views));
}
