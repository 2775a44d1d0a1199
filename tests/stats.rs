mod common;

use axum::http::{Method, StatusCode, header::AUTHORIZATION};
use common::{ADMIN_TOKEN, TestAppBuilder, request};

#[tokio::test]
async fn github_stats_are_cached() {
    let app = TestAppBuilder::new().build();

    let first = app.get("/api/stats/github", "1.1.1.1").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header("x-cache"), Some("MISS"));
    assert_eq!(first.body["totalStars"], 42);

    let second = app.get("/api/stats/github", "1.1.1.1").await;
    assert_eq!(second.header("x-cache"), Some("HIT"));
    assert_eq!(second.body, first.body);
}

#[tokio::test]
async fn github_failure_degrades_to_zeros() {
    let app = TestAppBuilder::new().github_fails().build();

    let res = app.get("/api/stats/github", "1.1.1.1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.header("x-cache").is_none());
    assert_eq!(res.body["username"], "octocat");
    assert_eq!(res.body["totalContributions"], 0);
    assert_eq!(res.body["languages"], serde_json::json!([]));
}

#[tokio::test]
async fn wakatime_without_key_returns_zero_payload() {
    let app = TestAppBuilder::new().wakatime(None).build();

    let res = app.get("/api/stats/wakatime", "1.1.1.1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["totalHoursThisWeek"], 0.0);
    assert_eq!(res.body["editors"], serde_json::json!([]));
}

#[tokio::test]
async fn summary_combines_both_sources() {
    let app = TestAppBuilder::new().build();

    let res = app.get("/api/stats/summary", "1.1.1.1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["github"]["stars"], 42);
    assert_eq!(res.body["github"]["topLanguage"], "Rust");
    assert_eq!(res.body["wakatime"]["weeklyHours"], 20);
    assert_eq!(res.body["wakatime"]["dailyAverage"], 2.9);
    assert_eq!(res.body["wakatime"]["topLanguage"], "N/A");
    assert!(res.body["lastUpdated"].is_string());
}

#[tokio::test]
async fn summary_degrades_each_source_independently() {
    let app = TestAppBuilder::new()
        .github_fails()
        .wakatime(Some(true))
        .build();

    let res = app.get("/api/stats/summary", "1.1.1.1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["github"]["contributions"], 0);
    assert_eq!(res.body["github"]["topLanguage"], "N/A");
    assert!(res.body["wakatime"].is_null());
}

#[tokio::test]
async fn admin_can_clear_stats_cache() {
    let app = TestAppBuilder::new().build();
    app.get("/api/stats/github", "1.1.1.1").await;

    let bearer = format!("Bearer {}", ADMIN_TOKEN);
    let mut req = request(Method::DELETE, "/api/stats/github/cache", "1.1.1.1", None);
    req.headers_mut()
        .insert(AUTHORIZATION, bearer.parse().unwrap());
    assert_eq!(app.send(req).await.status, StatusCode::NO_CONTENT);
    assert_eq!(
        app.get("/api/stats/github", "1.1.1.1").await.header("x-cache"),
        Some("MISS")
    );

    let mut req = request(Method::DELETE, "/api/stats/twitter/cache", "1.1.1.1", None);
    req.headers_mut()
        .insert(AUTHORIZATION, bearer.parse().unwrap());
    assert_eq!(app.send(req).await.status, StatusCode::NOT_FOUND);
}
