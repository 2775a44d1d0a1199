use async_trait::async_trait;
use serde::Deserialize;

use super::WakaTimeSource;
use crate::error::UpstreamError;
use crate::models::stats::round1;
use crate::models::{TimeShare, WakaTimeStats};

const SERVICE: &str = "wakatime";
const API_URL: &str = "https://wakatime.com/api/v1";

#[derive(Debug, Deserialize)]
struct StatsResponse {
    data: StatsData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatsData {
    total_seconds: f64,
    daily_average: f64,
    #[serde(default)]
    languages: Vec<Usage>,
    #[serde(default)]
    editors: Vec<Usage>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    name: String,
    total_seconds: f64,
    percent: f64,
}

fn hours(seconds: f64) -> f64 {
    round1(seconds / 3600.0)
}

fn top(usages: &[Usage], n: usize) -> Vec<TimeShare> {
    usages
        .iter()
        .take(n)
        .map(|u| TimeShare {
            name: u.name.clone(),
            hours: hours(u.total_seconds),
            percentage: round1(u.percent),
        })
        .collect()
}

impl From<StatsData> for WakaTimeStats {
    fn from(data: StatsData) -> Self {
        WakaTimeStats {
            total_hours_this_week: hours(data.total_seconds),
            daily_average: hours(data.daily_average),
            languages: top(&data.languages, 5),
            editors: top(&data.editors, 3),
        }
    }
}

pub struct WakaTimeClient {
    http: reqwest::Client,
    api_key: String,
}

impl WakaTimeClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl WakaTimeSource for WakaTimeClient {
    async fn weekly_stats(&self) -> Result<WakaTimeStats, UpstreamError> {
        let response = self
            .http
            .get(format!("{}/users/current/stats/last_7_days", API_URL))
            .bearer_auth(&self.api_key)
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

        let body: StatsResponse = response.json().await.map_err(UpstreamError::http(SERVICE))?;
        Ok(body.data.into())
    }
}
