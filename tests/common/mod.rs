//! Shared fixtures for router-level integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode},
};
use portfolio_api::{
    AppState,
    cache::{KvStore, MemoryStore},
    config::Config,
    database::{ContactStats, CounterStore, MemoryCounterStore, NewContact, ProjectStats},
    error::{StoreError, UpstreamError},
    infrastructure::{BlogSource, GithubSource, Upstreams, WakaTimeSource},
    models::{
        BlogPost, GitHubStats, LanguageShare, PostPage, PostQuery, PostStatus, WakaTimeStats,
        WorksCatalog,
    },
    router::build_router,
};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub fn post(slug: &str) -> BlogPost {
    BlogPost {
        id: format!("page-{}", slug),
        slug: slug.to_string(),
        title: format!("Post {}", slug),
        description: "A test post".into(),
        published_at: Some("2024-01-01".into()),
        updated_at: "2024-01-02T00:00:00.000Z".into(),
        status: PostStatus::Published,
        tags: vec!["rust".into()],
        content: None,
        view_count: None,
    }
}

/// In-memory blog source that counts calls and can be switched to fail.
#[derive(Default)]
pub struct FakeBlog {
    pub posts: Vec<BlogPost>,
    pub fail: bool,
    pub get_calls: AtomicUsize,
}

impl FakeBlog {
    pub fn with_posts(slugs: &[&str]) -> Self {
        Self {
            posts: slugs.iter().map(|s| post(s)).collect(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), UpstreamError> {
        if self.fail {
            return Err(UpstreamError::Status {
                service: "notion",
                status: 502,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlogSource for FakeBlog {
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, UpstreamError> {
        self.check()?;
        let start = ((query.page - 1) * query.limit) as usize;
        let posts = self
            .posts
            .iter()
            .skip(start)
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok(PostPage {
            posts,
            total: self.posts.len() as u64,
        })
    }

    async fn get_post(&self, slug: &str) -> Result<Option<BlogPost>, UpstreamError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.posts.iter().find(|p| p.slug == slug).cloned().map(|p| BlogPost {
            content: Some(format!("# {}", p.title)),
            ..p
        }))
    }

    async fn all_tags(&self) -> Result<Vec<String>, UpstreamError> {
        self.check()?;
        let mut tags: Vec<String> = self.posts.iter().flat_map(|p| p.tags.clone()).collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }
}

pub struct FakeGithub {
    pub fail: bool,
}

#[async_trait]
impl GithubSource for FakeGithub {
    async fn user_stats(&self) -> Result<GitHubStats, UpstreamError> {
        if self.fail {
            return Err(UpstreamError::Status {
                service: "github",
                status: 500,
            });
        }
        Ok(GitHubStats {
            username: "octocat".into(),
            total_contributions: 120,
            total_stars: 42,
            followers: 7,
            languages: vec![LanguageShare {
                name: "Rust".into(),
                percentage: 75.0,
                color: "#dea584".into(),
            }],
        })
    }
}

pub struct FakeWakaTime {
    pub fail: bool,
}

#[async_trait]
impl WakaTimeSource for FakeWakaTime {
    async fn weekly_stats(&self) -> Result<WakaTimeStats, UpstreamError> {
        if self.fail {
            return Err(UpstreamError::Malformed {
                service: "wakatime",
                message: "missing data".into(),
            });
        }
        Ok(WakaTimeStats {
            total_hours_this_week: 20.4,
            daily_average: 2.91,
            languages: Vec::new(),
            editors: Vec::new(),
        })
    }
}

/// Store whose every operation fails, as when Redis is unreachable.
pub struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn put_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn incr(&self, _key: &str, _ttl: Duration) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

/// Reads and counters work; plain `put` writes fail.
#[derive(Default)]
pub struct ReadOnlyCacheStore {
    inner: MemoryStore,
}

#[async_trait]
impl KvStore for ReadOnlyCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only replica".into()))
    }

    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.inner.put_if_absent(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.delete(key).await
    }

    async fn incr(&self, key: &str, ttl: Duration) -> Result<i64, StoreError> {
        self.inner.incr(key, ttl).await
    }
}

/// Counter store whose every operation fails, as when Postgres is down.
pub struct FailingCounterStore;

fn database_down<T>() -> Result<T, StoreError> {
    Err(StoreError::Unavailable("database is down".into()))
}

#[async_trait]
impl CounterStore for FailingCounterStore {
    async fn view_count(&self, _slug: &str) -> Result<i64, StoreError> {
        database_down()
    }

    async fn increment_view_count(&self, _slug: &str) -> Result<i64, StoreError> {
        database_down()
    }

    async fn project_stats(&self, _project_id: &str) -> Result<ProjectStats, StoreError> {
        database_down()
    }

    async fn increment_project_views(&self, _project_id: &str) -> Result<i64, StoreError> {
        database_down()
    }

    async fn increment_likes(&self, _project_id: &str) -> Result<i64, StoreError> {
        database_down()
    }

    async fn decrement_likes(&self, _project_id: &str) -> Result<i64, StoreError> {
        database_down()
    }

    async fn insert_contact(&self, _contact: &NewContact) -> Result<i64, StoreError> {
        database_down()
    }

    async fn contact_stats(&self) -> Result<ContactStats, StoreError> {
        database_down()
    }
}

pub struct TestApp {
    pub router: Router,
    pub counters: Arc<MemoryCounterStore>,
    pub blog: Arc<FakeBlog>,
}

pub struct TestAppBuilder {
    config: Config,
    kv: Arc<dyn KvStore>,
    counters: Option<Arc<dyn CounterStore>>,
    blog: FakeBlog,
    github_fails: bool,
    wakatime: Option<bool>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        let config = Config {
            admin_token: Some(ADMIN_TOKEN.into()),
            ..Config::default()
        };
        Self {
            config,
            kv: Arc::new(MemoryStore::new()),
            counters: None,
            blog: FakeBlog::with_posts(&["hello-world", "second-post"]),
            github_fails: false,
            wakatime: Some(false),
        }
    }

    pub fn config(mut self, f: impl FnOnce(&mut Config)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn kv(mut self, kv: Arc<dyn KvStore>) -> Self {
        self.kv = kv;
        self
    }

    /// Replaces the in-memory counter store. `TestApp::counters` then stays
    /// empty.
    pub fn counters(mut self, counters: Arc<dyn CounterStore>) -> Self {
        self.counters = Some(counters);
        self
    }

    pub fn blog(mut self, blog: FakeBlog) -> Self {
        self.blog = blog;
        self
    }

    pub fn github_fails(mut self) -> Self {
        self.github_fails = true;
        self
    }

    /// `None` leaves WakaTime unconfigured.
    pub fn wakatime(mut self, fails: Option<bool>) -> Self {
        self.wakatime = fails;
        self
    }

    pub fn build(self) -> TestApp {
        let counters = Arc::new(MemoryCounterStore::new());
        let blog = Arc::new(self.blog);
        let upstreams = Upstreams {
            blog: blog.clone(),
            github: Arc::new(FakeGithub {
                fail: self.github_fails,
            }),
            wakatime: self
                .wakatime
                .map(|fail| Arc::new(FakeWakaTime { fail }) as Arc<dyn WakaTimeSource>),
            notifier: None,
        };
        let state = AppState::new(
            self.config,
            self.kv,
            self.counters
                .unwrap_or_else(|| counters.clone() as Arc<dyn CounterStore>),
            upstreams,
            WorksCatalog::builtin(),
        );
        TestApp {
            router: build_router(state),
            counters,
            blog,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // let spawned cache writes land before the next request
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, ip: &str) -> TestResponse {
        self.send(request(Method::GET, uri, ip, None)).await
    }

    pub async fn post(&self, uri: &str, ip: &str, body: Option<Value>) -> TestResponse {
        self.send(request(Method::POST, uri, ip, body)).await
    }

    pub async fn delete(&self, uri: &str, ip: &str) -> TestResponse {
        self.send(request(Method::DELETE, uri, ip, None)).await
    }
}

pub fn request(method: Method, uri: &str, ip: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("cf-connecting-ip", ip);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
