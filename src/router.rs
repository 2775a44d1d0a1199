use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    config::Config,
    middleware::{RateLimiter, log_errors, rate_limit, require_admin, security_headers},
    routes::{blog, contact, csp_report, health, stats, works},
};

const EXPOSED_HEADERS: [&str; 6] = [
    "x-total-count",
    "x-total-pages",
    "x-cache",
    "x-ratelimit-limit",
    "x-ratelimit-remaining",
    "x-ratelimit-reset",
];

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers(EXPOSED_HEADERS.map(HeaderName::from_static))
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60 * 24))
}

// 公开路由
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/api", get(health::api_info))
        // 博客
        .route("/api/blog", get(blog::list_posts))
        .route("/api/blog/tags", get(blog::list_tags))
        .route("/api/blog/{slug}", get(blog::get_post))
        .route("/api/blog/{slug}/view", post(blog::record_view))
        // 作品
        .route("/api/works", get(works::list_works))
        .route("/api/works/{id}", get(works::get_work))
        .route(
            "/api/works/{id}/like",
            post(works::like_work).delete(works::unlike_work),
        )
        // 联系表单
        .route("/api/contact", post(contact::submit_contact))
        // 统计
        .route("/api/stats/github", get(stats::get_github_stats))
        .route("/api/stats/wakatime", get(stats::get_wakatime_stats))
        .route("/api/stats/summary", get(stats::get_summary))
        .route("/api/csp-report", post(csp_report::csp_report))
}

// 需要管理员令牌的路由
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/blog/{slug}/cache", delete(blog::clear_post_cache))
        .route("/api/contact/status", get(contact::contact_status))
        .route("/api/stats/{source}/cache", delete(stats::clear_stats_cache))
        .route_layer(from_fn_with_state(state, require_admin))
}

/// Full application: routes, 404 fallback and the global middleware chain
/// (trace, CORS, security headers, error logging, rate limiting; outermost
/// first).
pub fn build_router(state: AppState) -> Router {
    let environment = state.config.environment;
    let limiter = Arc::new(RateLimiter::new(
        state.kv.clone(),
        state.config.rate_limit.clone(),
    ));

    Router::new()
        .merge(public_routes())
        .merge(admin_routes(state.clone()))
        .fallback(health::not_found)
        .layer(from_fn_with_state(limiter, rate_limit))
        .layer(from_fn_with_state(environment, log_errors))
        .layer(from_fn_with_state(environment, security_headers))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
