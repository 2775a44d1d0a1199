use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageShare {
    pub name: String,
    pub percentage: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubStats {
    pub username: String,
    pub total_contributions: u64,
    pub total_stars: u64,
    pub followers: u64,
    pub languages: Vec<LanguageShare>,
}

impl GitHubStats {
    /// Payload served when GitHub cannot be reached.
    pub fn empty(username: &str) -> Self {
        Self {
            username: username.to_string(),
            total_contributions: 0,
            total_stars: 0,
            followers: 0,
            languages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeShare {
    pub name: String,
    pub hours: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WakaTimeStats {
    pub total_hours_this_week: f64,
    pub daily_average: f64,
    pub languages: Vec<TimeShare>,
    pub editors: Vec<TimeShare>,
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
