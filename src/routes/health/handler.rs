use axum::{Json, extract::State, http::Uri};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{AppState, error::AppError};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub environment: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub blog: &'static str,
    pub works: &'static str,
    pub contact: &'static str,
    pub stats: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
}

pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        timestamp: Utc::now(),
        environment: state.config.environment.as_str(),
    })
}

pub async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        name: "Portfolio API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            blog: "/api/blog",
            works: "/api/works",
            contact: "/api/contact",
            stats: "/api/stats",
        },
    })
}

/// Fallback for unmatched routes. The error middleware stamps the `path`.
pub async fn not_found(uri: Uri) -> AppError {
    tracing::debug!("No route for {}", uri.path());
    AppError::RouteNotFound
}
