use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    cache::{CacheStatus, keys},
    error::{AppError, UpstreamError},
    models::{GitHubStats, WakaTimeStats},
    routes::stats::model::{GithubSummary, StatsSource, StatsSummary, WakaTimeSummary},
};

async fn github_stats(state: &AppState) -> Result<(GitHubStats, CacheStatus), UpstreamError> {
    let github = state.upstreams.github.clone();
    state
        .cache
        .get_or_fetch(
            &keys::stats_key(StatsSource::Github.as_str()),
            state.config.cache.github_stats(),
            || async move { github.user_stats().await },
        )
        .await
}

/// `Ok(None)` when no WakaTime key is configured.
async fn wakatime_stats(
    state: &AppState,
) -> Result<Option<(WakaTimeStats, CacheStatus)>, UpstreamError> {
    let Some(wakatime) = state.upstreams.wakatime.clone() else {
        return Ok(None);
    };
    state
        .cache
        .get_or_fetch(
            &keys::stats_key(StatsSource::WakaTime.as_str()),
            state.config.cache.wakatime_stats(),
            || async move { wakatime.weekly_stats().await },
        )
        .await
        .map(Some)
}

fn with_cache_status<T: serde::Serialize>(payload: T, status: Option<CacheStatus>) -> Response {
    let mut response = Json(payload).into_response();
    if let Some(status) = status {
        response.headers_mut().insert(
            "x-cache",
            HeaderValue::from_static(status.as_header_value()),
        );
    }
    response
}

// GitHub统计，失败时返回空数据
pub async fn get_github_stats(State(state): State<AppState>) -> Response {
    match github_stats(&state).await {
        Ok((stats, status)) => with_cache_status(stats, Some(status)),
        Err(e) => {
            tracing::error!("Failed to fetch GitHub stats: {}", e);
            with_cache_status(GitHubStats::empty(&state.config.github.username), None)
        }
    }
}

pub async fn get_wakatime_stats(State(state): State<AppState>) -> Response {
    match wakatime_stats(&state).await {
        Ok(Some((stats, status))) => with_cache_status(stats, Some(status)),
        Ok(None) => with_cache_status(WakaTimeStats::default(), None),
        Err(e) => {
            tracing::error!("Failed to fetch WakaTime stats: {}", e);
            with_cache_status(WakaTimeStats::default(), None)
        }
    }
}

// 汇总统计，各数据源独立降级
pub async fn get_summary(State(state): State<AppState>) -> Json<StatsSummary> {
    let (github, wakatime) = tokio::join!(github_stats(&state), wakatime_stats(&state));

    let github = match github {
        Ok((stats, _)) => GithubSummary::from(&stats),
        Err(e) => {
            tracing::error!("Failed to fetch GitHub stats for summary: {}", e);
            GithubSummary::from(&GitHubStats::empty(&state.config.github.username))
        }
    };
    let wakatime = match wakatime {
        Ok(stats) => stats.map(|(stats, _)| WakaTimeSummary::from(&stats)),
        Err(e) => {
            tracing::error!("Failed to fetch WakaTime stats for summary: {}", e);
            None
        }
    };

    Json(StatsSummary {
        github,
        wakatime,
        last_updated: chrono::Utc::now(),
    })
}

pub async fn clear_stats_cache(
    State(state): State<AppState>,
    Path(source): Path<String>,
) -> Result<StatusCode, AppError> {
    let source = StatsSource::parse(&source)
        .ok_or_else(|| AppError::NotFound("Unknown stats source".into()))?;
    state.cache.clear(&keys::stats_key(source.as_str())).await;
    tracing::info!("Cleared cached {} stats", source.as_str());
    Ok(StatusCode::NO_CONTENT)
}
