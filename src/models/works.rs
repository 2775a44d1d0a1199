use std::path::Path;

use serde::{Deserialize, Serialize};

/// Catalog metadata for a portfolio project. Counters are joined at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
    pub thumbnail_url: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct WorksCatalog {
    works: Vec<Work>,
}

impl WorksCatalog {
    pub fn new(works: Vec<Work>) -> Self {
        Self { works }
    }

    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let raw = std::fs::read_to_string(path)?;
        let works: Vec<Work> = serde_json::from_str(&raw)?;
        Ok(Self::new(works))
    }

    pub fn builtin() -> Self {
        Self::new(vec![Work {
            id: "portfolio-site".into(),
            title: "Portfolio site".into(),
            description: "Full-stack portfolio with a Next.js frontend and a Rust API".into(),
            tech_stack: vec![
                "Next.js".into(),
                "TypeScript".into(),
                "Rust".into(),
                "axum".into(),
                "Tailwind CSS".into(),
            ],
            demo_url: Some("https://portfolio.example.com".into()),
            github_url: Some("https://github.com/username/portfolio".into()),
            thumbnail_url: "/images/works/portfolio.png".into(),
            created_at: "2024-01-01".into(),
        }])
    }

    pub fn all(&self) -> &[Work] {
        &self.works
    }

    pub fn find(&self, id: &str) -> Option<&Work> {
        self.works.iter().find(|w| w.id == id)
    }
}
