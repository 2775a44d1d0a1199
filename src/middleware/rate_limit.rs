use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{
    cache::{KvStore, keys},
    config::RateLimitConfig,
    error::{AppError, StoreError},
    utils::client_ip,
};

/// Result of one admission check, rendered as `X-RateLimit-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Epoch milliseconds at which the window is expected to lapse.
    pub reset_at_ms: i64,
}

impl RateLimitDecision {
    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert("x-ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(self.remaining));
        headers.insert("x-ratelimit-reset", HeaderValue::from(self.reset_at_ms));
    }
}

/// Per-client fixed window whose expiry is re-armed by every admitted request.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    config: Arc<RateLimitConfig>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KvStore>, config: RateLimitConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Reads the count first so rejected requests neither increment nor
    /// extend the window.
    pub async fn check(&self, ip: &str) -> Result<RateLimitDecision, StoreError> {
        let key = keys::rate_limit_key(ip);
        let limit = self.config.max_requests;
        let window = self.config.window();
        let reset_at_ms = chrono::Utc::now().timestamp_millis() + window.as_millis() as i64;

        let current = self
            .store
            .get(&key)
            .await?
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);

        if current >= i64::from(limit) {
            return Ok(RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_at_ms,
            });
        }

        let count = self.store.incr(&key, window).await?;
        let remaining = (i64::from(limit) - count).max(0) as u32;
        Ok(RateLimitDecision {
            allowed: true,
            limit,
            remaining,
            reset_at_ms,
        })
    }

    pub async fn check_rate_limit(self: Arc<Self>, req: Request<Body>, next: Next) -> Response {
        if self.config.is_excluded(req.uri().path()) {
            return next.run(req).await;
        }

        let ip = client_ip(req.headers(), &self.config.client_ip_header);
        let decision = match self.check(&ip).await {
            Ok(decision) => decision,
            Err(e) => {
                // 存储不可用时放行
                tracing::error!("Rate limiter store error for {}: {}", ip, e);
                return next.run(req).await;
            }
        };

        let mut response = if decision.allowed {
            next.run(req).await
        } else {
            tracing::warn!("Rate limit exceeded for {} on {}", ip, req.uri().path());
            AppError::TooManyRequests("Too many requests. Please try again later.".into())
                .into_response()
        };
        decision.apply(response.headers_mut());
        response
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    limiter.check_rate_limit(req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use std::time::Duration;

    fn limiter(max_requests: u32) -> (RateLimiter, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = RateLimitConfig {
            max_requests,
            ..RateLimitConfig::default()
        };
        (RateLimiter::new(store.clone(), config), store)
    }

    #[tokio::test]
    async fn admits_up_to_max_then_rejects() {
        let (limiter, _) = limiter(3);
        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check("1.2.3.4").await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }
        let decision = limiter.check("1.2.3.4").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.limit, 3);

        // other clients have their own window
        assert!(limiter.check("5.6.7.8").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn rejected_requests_do_not_increment() {
        let (limiter, store) = limiter(1);
        assert!(limiter.check("ip").await.unwrap().allowed);
        assert!(!limiter.check("ip").await.unwrap().allowed);
        assert!(!limiter.check("ip").await.unwrap().allowed);
        assert_eq!(store.get("rate_limit:ip").await.unwrap().as_deref(), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn window_is_rearmed_by_admitted_requests() {
        let (limiter, _) = limiter(2);
        assert!(limiter.check("ip").await.unwrap().allowed);
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(limiter.check("ip").await.unwrap().allowed);

        // the first request's window would have ended here, but the key was re-armed
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!limiter.check("ip").await.unwrap().allowed);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(limiter.check("ip").await.unwrap().allowed);
    }
}
