use axum::{
    Json,
    extract::{Path, State},
};
use futures_util::future::join_all;

use crate::{
    AppState,
    cache::keys::ViewResource,
    database::ProjectStats,
    error::AppError,
    models::Work,
    routes::works::model::{LikeCount, WorkList, WorkWithStats, sort_by_views},
    utils::ClientIp,
};

fn find_work<'a>(state: &'a AppState, id: &str) -> Result<&'a Work, AppError> {
    state
        .works
        .find(id)
        .ok_or_else(|| AppError::NotFound("Work not found".into()))
}

async fn stats_or_default(state: &AppState, id: &str) -> ProjectStats {
    state.engagement.project_stats(id).await.unwrap_or_else(|e| {
        tracing::error!("Failed to read project stats for {}: {}", id, e);
        ProjectStats::default()
    })
}

// 获取作品列表，按浏览量排序
pub async fn list_works(State(state): State<AppState>) -> Json<WorkList> {
    let state_ref = &state;
    let mut works = join_all(state.works.all().iter().map(move |work| async move {
        WorkWithStats::new(work, stats_or_default(state_ref, &work.id).await)
    }))
    .await;
    sort_by_views(&mut works);
    Json(WorkList { works })
}

// 获取作品详情并计一次浏览
pub async fn get_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ClientIp(ip): ClientIp,
) -> Result<Json<WorkWithStats>, AppError> {
    let work = find_work(&state, &id)?;
    let views = state.engagement.record_view(ViewResource::Work, &id, &ip).await;
    let stats = stats_or_default(&state, &id).await;
    Ok(Json(WorkWithStats::new(
        work,
        ProjectStats {
            likes: stats.likes,
            views,
        },
    )))
}

pub async fn like_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ClientIp(ip): ClientIp,
) -> Result<Json<LikeCount>, AppError> {
    find_work(&state, &id)?;
    let likes = state.engagement.like(&id, &ip).await?;
    Ok(Json(LikeCount { likes }))
}

pub async fn unlike_work(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ClientIp(ip): ClientIp,
) -> Result<Json<LikeCount>, AppError> {
    find_work(&state, &id)?;
    let likes = state.engagement.unlike(&id, &ip).await?;
    Ok(Json(LikeCount { likes }))
}
