use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::future::join_all;

use crate::{
    AppState,
    cache::keys::{self, ViewResource},
    error::{AppError, UpstreamError},
    models::BlogPost,
    routes::blog::model::{ListQuery, Pagination, PostList, TagList, ViewCount},
    utils::ClientIp,
};

const NOTION: &str = "Notion";

fn notion_failure(context: &'static str) -> impl FnOnce(UpstreamError) -> AppError {
    move |e| {
        tracing::error!("Failed to {}: {}", context, e);
        AppError::Upstream(NOTION)
    }
}

// 获取文章列表
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let query = query.validate(&state.config.pagination)?;
    let page = state
        .upstreams
        .blog
        .list_posts(&query)
        .await
        .map_err(notion_failure("fetch blog posts"))?;

    let engagement = &state.engagement;
    let posts = join_all(page.posts.into_iter().map(move |mut post| async move {
        let views = engagement
            .view_count(ViewResource::Blog, &post.slug)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Failed to read view count for {}: {}", post.slug, e);
                0
            });
        post.view_count = Some(views);
        post
    }))
    .await;

    let pagination = Pagination::new(query.page, query.limit, page.total);
    let headers = [
        ("x-total-count", pagination.total.to_string()),
        ("x-total-pages", pagination.total_pages.to_string()),
    ];
    Ok((headers, Json(PostList { posts, pagination })))
}

// 获取单篇文章，带缓存
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = keys::blog_post_key(&slug);
    let (post, status) = state
        .cache
        .get_or_fetch(&key, state.config.cache.blog_post(), || async {
            let post = state
                .upstreams
                .blog
                .get_post(&slug)
                .await
                .map_err(notion_failure("fetch blog post"))?
                .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
            let view_count = state
                .engagement
                .view_count(ViewResource::Blog, &slug)
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("Failed to read view count for {}: {}", slug, e);
                    0
                });
            Ok::<_, AppError>(BlogPost {
                view_count: Some(view_count),
                ..post
            })
        })
        .await?;

    Ok(([("x-cache", status.as_header_value())], Json(post)))
}

pub async fn record_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ClientIp(ip): ClientIp,
) -> Json<ViewCount> {
    let view_count = state
        .engagement
        .record_view(ViewResource::Blog, &slug, &ip)
        .await;
    Json(ViewCount { view_count })
}

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<TagList>, AppError> {
    let tags = state
        .upstreams
        .blog
        .all_tags()
        .await
        .map_err(notion_failure("fetch tags"))?;
    Ok(Json(TagList { tags }))
}

pub async fn clear_post_cache(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> StatusCode {
    state.cache.clear(&keys::blog_post_key(&slug)).await;
    tracing::info!("Cleared cached blog post {}", slug);
    StatusCode::NO_CONTENT
}
