use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_json::json;

use super::GithubSource;
use crate::config::GithubConfig;
use crate::error::UpstreamError;
use crate::models::stats::round1;
use crate::models::{GitHubStats, LanguageShare};

const SERVICE: &str = "github";
const TOP_LANGUAGES: usize = 10;

const USER_STATS_QUERY: &str = r#"
query($username: String!) {
  user(login: $username) {
    contributionsCollection {
      contributionCalendar {
        totalContributions
      }
    }
    repositories(first: 100, ownerAffiliations: OWNER, privacy: PUBLIC) {
      totalCount
      nodes {
        stargazerCount
        languages(first: 10) {
          edges {
            size
            node { name color }
          }
        }
      }
    }
    followers { totalCount }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    contributions_collection: ContributionsCollection,
    repositories: Repositories,
    followers: Count,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionCalendar {
    total_contributions: u64,
}

#[derive(Debug, Deserialize)]
struct Repositories {
    nodes: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Repository {
    stargazer_count: u64,
    languages: LanguageConnection,
}

#[derive(Debug, Deserialize)]
struct LanguageConnection {
    edges: Vec<LanguageEdge>,
}

#[derive(Debug, Deserialize)]
struct LanguageEdge {
    size: u64,
    node: LanguageNode,
}

#[derive(Debug, Deserialize)]
struct LanguageNode {
    name: String,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Count {
    total_count: u64,
}

pub struct GithubClient {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubClient {
    pub fn new(http: reqwest::Client, config: GithubConfig) -> Self {
        Self { http, config }
    }
}

/// Sums language bytes across repositories and returns the top ten shares.
pub(crate) fn language_shares(repositories: &[Repository]) -> Vec<LanguageShare> {
    let mut sizes: HashMap<&str, (u64, &str)> = HashMap::new();
    for edge in repositories.iter().flat_map(|r| &r.languages.edges) {
        let color = edge.node.color.as_deref().unwrap_or_default();
        let entry = sizes.entry(edge.node.name.as_str()).or_insert((0, color));
        entry.0 += edge.size;
        entry.1 = color;
    }

    let mut sorted: Vec<_> = sizes.into_iter().collect();
    sorted.sort_by(|a, b| b.1.0.cmp(&a.1.0).then_with(|| a.0.cmp(b.0)));
    sorted.truncate(TOP_LANGUAGES);

    let total: u64 = sorted.iter().map(|(_, (size, _))| size).sum();
    if total == 0 {
        return Vec::new();
    }
    sorted
        .into_iter()
        .map(|(name, (size, color))| LanguageShare {
            name: name.to_string(),
            percentage: round1(size as f64 / total as f64 * 100.0),
            color: color.to_string(),
        })
        .collect()
}

#[async_trait]
impl GithubSource for GithubClient {
    async fn user_stats(&self) -> Result<GitHubStats, UpstreamError> {
        let response = self
            .http
            .post(&self.config.graphql_url)
            .bearer_auth(&self.config.token)
            .header(USER_AGENT, "Portfolio-API")
            .json(&json!({
                "query": USER_STATS_QUERY,
                "variables": { "username": self.config.username },
            }))
            .send()
            .await
            .map_err(UpstreamError::http(SERVICE))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body: GraphQlResponse = response.json().await.map_err(UpstreamError::http(SERVICE))?;
        let user = body
            .data
            .and_then(|d| d.user)
            .ok_or_else(|| UpstreamError::Malformed {
                service: SERVICE,
                message: format!("user {} not found", self.config.username),
            })?;

        let repositories = &user.repositories.nodes;
        Ok(GitHubStats {
            username: self.config.username.clone(),
            total_contributions: user
                .contributions_collection
                .contribution_calendar
                .total_contributions,
            total_stars: repositories.iter().map(|r| r.stargazer_count).sum(),
            followers: user.followers.total_count,
            languages: language_shares(repositories),
        })
    }
}
