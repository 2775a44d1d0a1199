use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

/// Status filter for listing; `All` disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Published,
    Draft,
}

impl StatusFilter {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(StatusFilter::All),
            "published" => Some(StatusFilter::Published),
            "draft" => Some(StatusFilter::Draft),
            _ => None,
        }
    }

    pub fn as_notion_value(self) -> Option<&'static str> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Published => Some("published"),
            StatusFilter::Draft => Some("draft"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub published_at: Option<String>,
    pub updated_at: String,
    pub status: PostStatus,
    pub tags: Vec<String>,
    /// Markdown body; only present on single-post reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PostQuery {
    pub page: u32,
    pub limit: u32,
    pub status: StatusFilter,
    pub tag: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostPage {
    pub posts: Vec<BlogPost>,
    pub total: u64,
}
