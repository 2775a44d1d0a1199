use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectStats {
    pub likes: i64,
    pub views: i64,
}

/// A contact form submission that passed validation and the spam heuristic.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
    pub ip_address: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactStats {
    pub total: i64,
    pub unread: i64,
    pub today: i64,
    pub this_week: i64,
}
