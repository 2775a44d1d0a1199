use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

/// Fixed re-armed window limiter settings.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u32,
    pub exclude_paths: Vec<String>,
    /// Header set by the trusted edge proxy, checked before `X-Forwarded-For`.
    pub client_ip_header: String,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_paths.iter().any(|p| p == path)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 60,
            exclude_paths: vec!["/health".into(), "/api".into()],
            client_ip_header: "cf-connecting-ip".into(),
        }
    }
}

/// TTLs for cached payloads and dedupe keys, in seconds.
#[derive(Debug, Clone)]
pub struct CacheTtls {
    pub blog_post_secs: u64,
    pub github_stats_secs: u64,
    pub wakatime_stats_secs: u64,
    pub view_dedupe_secs: u64,
    pub like_flag_secs: u64,
    pub contact_throttle_secs: u64,
}

impl CacheTtls {
    pub fn blog_post(&self) -> Duration {
        Duration::from_secs(self.blog_post_secs)
    }

    pub fn github_stats(&self) -> Duration {
        Duration::from_secs(self.github_stats_secs)
    }

    pub fn wakatime_stats(&self) -> Duration {
        Duration::from_secs(self.wakatime_stats_secs)
    }

    pub fn view_dedupe(&self) -> Duration {
        Duration::from_secs(self.view_dedupe_secs)
    }

    pub fn like_flag(&self) -> Duration {
        Duration::from_secs(self.like_flag_secs)
    }

    pub fn contact_throttle(&self) -> Duration {
        Duration::from_secs(self.contact_throttle_secs)
    }
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            blog_post_secs: 3600,
            github_stats_secs: 86400,
            wakatime_stats_secs: 3600,
            view_dedupe_secs: 3600,
            like_flag_secs: 60 * 60 * 24 * 365,
            contact_throttle_secs: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_key: String,
    pub database_id: String,
    pub api_version: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub token: String,
    pub username: String,
    pub graphql_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub server_host: String,
    pub server_port: u16,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheTtls,
    pub pagination: PaginationConfig,
    pub notion: NotionConfig,
    pub github: GithubConfig,
    pub wakatime_api_key: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub admin_token: Option<String>,
    pub cors_origins: Vec<String>,
    pub works_catalog_path: Option<String>,
}

const PRODUCTION_ORIGINS: &[&str] = &["https://portfolio.example.com"];
const DEVELOPMENT_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:3001"];

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let environment = match optional("ENVIRONMENT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "ENVIRONMENT",
                value,
            })?,
            None => Environment::Development,
        };

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            window_secs: parse_or("RATE_LIMIT_WINDOW", defaults.window_secs)?,
            max_requests: parse_or("RATE_LIMIT_REQUESTS", defaults.max_requests)?,
            exclude_paths: optional("RATE_LIMIT_EXCLUDE_PATHS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.exclude_paths),
            client_ip_header: optional("CLIENT_IP_HEADER")
                .map(|h| h.to_ascii_lowercase())
                .unwrap_or(defaults.client_ip_header),
        };

        let ttl = CacheTtls::default();
        let cache = CacheTtls {
            blog_post_secs: parse_or("BLOG_POST_TTL", ttl.blog_post_secs)?,
            github_stats_secs: parse_or("GITHUB_STATS_TTL", ttl.github_stats_secs)?,
            wakatime_stats_secs: parse_or("WAKATIME_STATS_TTL", ttl.wakatime_stats_secs)?,
            ..ttl
        };

        let cors_origins = optional("CORS_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|| default_origins(environment));

        Ok(Config {
            environment,
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or("SERVER_PORT", 8787)?,
            database_url: optional("DATABASE_URL"),
            redis_url: optional("REDIS_URL"),
            rate_limit,
            cache,
            pagination: PaginationConfig::default(),
            notion: NotionConfig {
                api_key: required("NOTION_API_KEY")?,
                database_id: required("NOTION_BLOG_DATABASE_ID")?,
                api_version: optional("NOTION_API_VERSION").unwrap_or_else(|| "2022-06-28".into()),
                base_url: "https://api.notion.com/v1".into(),
            },
            github: GithubConfig {
                token: required("GITHUB_TOKEN")?,
                username: required("GITHUB_USERNAME")?,
                graphql_url: "https://api.github.com/graphql".into(),
            },
            wakatime_api_key: optional("WAKATIME_API_KEY"),
            slack_webhook_url: optional("SLACK_WEBHOOK_URL"),
            admin_token: optional("ADMIN_TOKEN"),
            cors_origins,
            works_catalog_path: optional("WORKS_CATALOG_PATH"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            server_host: "127.0.0.1".into(),
            server_port: 8787,
            database_url: None,
            redis_url: None,
            rate_limit: RateLimitConfig::default(),
            cache: CacheTtls::default(),
            pagination: PaginationConfig::default(),
            notion: NotionConfig {
                api_key: String::new(),
                database_id: String::new(),
                api_version: "2022-06-28".into(),
                base_url: "https://api.notion.com/v1".into(),
            },
            github: GithubConfig {
                token: String::new(),
                username: "octocat".into(),
                graphql_url: "https://api.github.com/graphql".into(),
            },
            wakatime_api_key: None,
            slack_webhook_url: None,
            admin_token: None,
            cors_origins: default_origins(Environment::Development),
            works_catalog_path: None,
        }
    }
}

fn default_origins(environment: Environment) -> Vec<String> {
    let mut origins: Vec<String> = PRODUCTION_ORIGINS.iter().map(|o| o.to_string()).collect();
    if environment.is_development() {
        origins.extend(DEVELOPMENT_ORIGINS.iter().map(|o| o.to_string()));
    }
    origins
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
