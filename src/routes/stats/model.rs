use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{GitHubStats, WakaTimeStats, stats::round1};

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubSummary {
    pub contributions: u64,
    pub stars: u64,
    pub followers: u64,
    pub top_language: String,
}

impl From<&GitHubStats> for GithubSummary {
    fn from(stats: &GitHubStats) -> Self {
        Self {
            contributions: stats.total_contributions,
            stars: stats.total_stars,
            followers: stats.followers,
            top_language: stats
                .languages
                .first()
                .map(|l| l.name.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WakaTimeSummary {
    pub weekly_hours: i64,
    pub daily_average: f64,
    pub top_language: String,
}

impl From<&WakaTimeStats> for WakaTimeSummary {
    fn from(stats: &WakaTimeStats) -> Self {
        Self {
            weekly_hours: stats.total_hours_this_week.round() as i64,
            daily_average: round1(stats.daily_average),
            top_language: stats
                .languages
                .first()
                .map(|l| l.name.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub github: GithubSummary,
    /// `null` when WakaTime is not configured or unreachable.
    pub wakatime: Option<WakaTimeSummary>,
    pub last_updated: DateTime<Utc>,
}

/// Sources whose payloads are cached under `stats:{source}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsSource {
    Github,
    WakaTime,
}

impl StatsSource {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "github" => Some(StatsSource::Github),
            "wakatime" => Some(StatsSource::WakaTime),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatsSource::Github => "github",
            StatsSource::WakaTime => "wakatime",
        }
    }
}
