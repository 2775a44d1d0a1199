//! Thin HTTP clients for the third-party services the API fronts.

pub mod github;
pub mod notifier;
pub mod notion;
pub mod wakatime;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::UpstreamError;
use crate::models::{BlogPost, GitHubStats, PostPage, PostQuery, WakaTimeStats};

pub use github::GithubClient;
pub use notifier::{ContactNotice, SlackNotifier};
pub use notion::NotionClient;
pub use wakatime::WakaTimeClient;

#[async_trait]
pub trait BlogSource: Send + Sync {
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, UpstreamError>;

    /// `Ok(None)` when no post has the slug.
    async fn get_post(&self, slug: &str) -> Result<Option<BlogPost>, UpstreamError>;

    /// Distinct tags of published posts, sorted.
    async fn all_tags(&self) -> Result<Vec<String>, UpstreamError>;
}

#[async_trait]
pub trait GithubSource: Send + Sync {
    async fn user_stats(&self) -> Result<GitHubStats, UpstreamError>;
}

#[async_trait]
pub trait WakaTimeSource: Send + Sync {
    async fn weekly_stats(&self) -> Result<WakaTimeStats, UpstreamError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_contact(&self, notice: &ContactNotice) -> Result<(), UpstreamError>;
}

/// The set of upstream clients a running service talks to.
#[derive(Clone)]
pub struct Upstreams {
    pub blog: Arc<dyn BlogSource>,
    pub github: Arc<dyn GithubSource>,
    /// `None` when no WakaTime key is configured.
    pub wakatime: Option<Arc<dyn WakaTimeSource>>,
    /// Only wired up in production with a webhook configured.
    pub notifier: Option<Arc<dyn Notifier>>,
}

impl Upstreams {
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        let wakatime = config.wakatime_api_key.clone().map(|key| {
            Arc::new(WakaTimeClient::new(http.clone(), key)) as Arc<dyn WakaTimeSource>
        });
        let notifier = config
            .slack_webhook_url
            .clone()
            .filter(|_| !config.environment.is_development())
            .map(|url| Arc::new(SlackNotifier::new(http.clone(), url)) as Arc<dyn Notifier>);

        Self {
            blog: Arc::new(NotionClient::new(http.clone(), config.notion.clone())),
            github: Arc::new(GithubClient::new(http, config.github.clone())),
            wakatime,
            notifier,
        }
    }
}
