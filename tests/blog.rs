mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::http::{Method, StatusCode, header::AUTHORIZATION};
use common::{ADMIN_TOKEN, FakeBlog, ReadOnlyCacheStore, TestAppBuilder, request};

#[tokio::test]
async fn list_reports_pagination_in_body_and_headers() {
    let app = TestAppBuilder::new()
        .blog(FakeBlog::with_posts(&["a", "b", "c"]))
        .build();

    let res = app.get("/api/blog?page=2&limit=2", "1.1.1.1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("x-total-count"), Some("3"));
    assert_eq!(res.header("x-total-pages"), Some("2"));
    assert_eq!(res.body["pagination"]["page"], 2);
    assert_eq!(res.body["pagination"]["totalPages"], 2);
    let posts = res.body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["slug"], "c");
    assert_eq!(posts[0]["viewCount"], 0);
}

#[tokio::test]
async fn list_rejects_bad_query_params() {
    let app = TestAppBuilder::new().build();

    for uri in [
        "/api/blog?page=abc",
        "/api/blog?limit=500",
        "/api/blog?status=archived",
    ] {
        let res = app.get(uri, "1.1.1.1").await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(res.body["error"], "Validation Error");
    }
}

#[tokio::test]
async fn post_is_served_from_cache_on_second_read() {
    let app = TestAppBuilder::new().build();

    let first = app.get("/api/blog/hello-world", "1.1.1.1").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header("x-cache"), Some("MISS"));
    assert_eq!(first.body["slug"], "hello-world");
    assert_eq!(first.body["viewCount"], 0);

    let second = app.get("/api/blog/hello-world", "1.1.1.1").await;
    assert_eq!(second.header("x-cache"), Some("HIT"));
    assert_eq!(second.body, first.body);
    assert_eq!(app.blog.get_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_cache_writes_do_not_affect_the_response() {
    let app = TestAppBuilder::new()
        .kv(Arc::new(ReadOnlyCacheStore::default()))
        .build();

    for _ in 0..2 {
        let res = app.get("/api/blog/hello-world", "1.1.1.1").await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.header("x-cache"), Some("MISS"));
        assert_eq!(res.body["title"], "Post hello-world");
    }
    assert_eq!(app.blog.get_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unknown_post_is_not_found() {
    let app = TestAppBuilder::new().build();

    let res = app.get("/api/blog/missing", "1.1.1.1").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "Post not found");
    assert_eq!(res.body["path"], "/api/blog/missing");
}

#[tokio::test]
async fn notion_failure_is_a_service_unavailable() {
    let app = TestAppBuilder::new()
        .blog(FakeBlog {
            fail: true,
            ..FakeBlog::with_posts(&["hello-world"])
        })
        .build();

    let res = app.get("/api/blog/hello-world", "1.1.1.1").await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.body["error"], "External API Error");

    let res = app.get("/api/blog", "1.1.1.1").await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn tags_are_distinct_and_sorted() {
    let app = TestAppBuilder::new().build();

    let res = app.get("/api/blog/tags", "1.1.1.1").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["tags"], serde_json::json!(["rust"]));
}

#[tokio::test]
async fn admin_can_clear_a_cached_post() {
    let app = TestAppBuilder::new().build();
    app.get("/api/blog/hello-world", "1.1.1.1").await;

    let res = app.delete("/api/blog/hello-world/cache", "1.1.1.1").await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let mut req = request(Method::DELETE, "/api/blog/hello-world/cache", "1.1.1.1", None);
    req.headers_mut().insert(
        AUTHORIZATION,
        format!("Bearer {}", ADMIN_TOKEN).parse().unwrap(),
    );
    assert_eq!(app.send(req).await.status, StatusCode::NO_CONTENT);

    let res = app.get("/api/blog/hello-world", "1.1.1.1").await;
    assert_eq!(res.header("x-cache"), Some("MISS"));
}
