//! Fixed-window rate limiting for the contact endpoint.
//!
//! Two stores implement `RateLimiter`: an in-process map (default) and a
//! Redis counter for deployments running more than one instance.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Window length and request ceiling shared by every store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(15 * 60),
            max_requests: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: Duration },
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Counts one request against `key` and decides whether it may proceed.
    async fn check(&self, key: &str) -> RateLimitDecision;

    /// Drops records whose window has ended. Returns how many were removed.
    async fn sweep_expired(&self) -> usize {
        0
    }
}

/// Derives the limiter key from proxy headers.
///
/// First `X-Forwarded-For` hop, else `X-Real-IP`, else a shared `unknown` bucket.
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let ip = forwarded
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
        })
        .unwrap_or("unknown");

    format!("contact:{ip}")
}

#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    count: u32,
    reset_at: Instant,
}

/// Per-process limiter backed by a mutex-guarded map.
pub struct InMemoryRateLimiter {
    policy: RateLimitPolicy,
    records: Mutex<HashMap<String, WindowRecord>>,
}

impl InMemoryRateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            records: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub async fn tracked_keys(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();
        let mut records = self.records.lock().await;

        match records.get_mut(key) {
            Some(record) if now < record.reset_at => {
                if record.count >= self.policy.max_requests {
                    return RateLimitDecision::Limited {
                        retry_after: record.reset_at - now,
                    };
                }
                record.count += 1;
                RateLimitDecision::Allowed
            }
            // No record, or the previous window is over: start a new one.
            _ => {
                records.insert(
                    key.to_string(),
                    WindowRecord {
                        count: 1,
                        reset_at: now + self.policy.window,
                    },
                );
                RateLimitDecision::Allowed
            }
        }
    }

    async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| now < record.reset_at);
        before - records.len()
    }
}

/// Shared counter behind `RedisRateLimiter`.
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Increments `key`, starting a `window`-long expiry on the first hit.
    /// Returns the new count and the seconds left in the window.
    async fn hit(&self, key: &str, window: Duration) -> redis::RedisResult<(u64, i64)>;
}

/// `INCR`, then `EXPIRE` on the first hit, then `TTL`.
#[async_trait]
impl WindowStore for MultiplexedConnection {
    async fn hit(&self, key: &str, window: Duration) -> redis::RedisResult<(u64, i64)> {
        let mut conn = self.clone();
        let window_secs = window.as_secs().max(1);

        let count: u64 = redis::cmd("INCR").arg(key).query_async(&mut conn).await?;
        if count == 1 {
            redis::cmd("EXPIRE")
                .arg(key)
                .arg(window_secs)
                .query_async::<_, ()>(&mut conn)
                .await?;
        }
        let mut ttl: i64 = redis::cmd("TTL").arg(key).query_async(&mut conn).await?;
        if ttl < 0 {
            // Key lost its expiry (e.g. EXPIRE failed after INCR); restore it.
            redis::cmd("EXPIRE")
                .arg(key)
                .arg(window_secs)
                .query_async::<_, ()>(&mut conn)
                .await?;
            ttl = i64::try_from(window_secs).unwrap_or(i64::MAX);
        }
        Ok((count, ttl))
    }
}

/// Maps a window count and its remaining TTL to a decision.
/// A limited client is always told to wait at least one second.
pub fn decide(count: u64, ttl: i64, policy: &RateLimitPolicy) -> RateLimitDecision {
    if count <= u64::from(policy.max_requests) {
        return RateLimitDecision::Allowed;
    }
    let secs = u64::try_from(ttl).unwrap_or(0).max(1);
    RateLimitDecision::Limited {
        retry_after: Duration::from_secs(secs),
    }
}

/// Fixed-window limiter over a shared store, normally Redis.
///
/// Fails open: if the store is unreachable the request is allowed and a
/// warning is logged.
pub struct RedisRateLimiter<S = MultiplexedConnection> {
    store: S,
    policy: RateLimitPolicy,
}

impl<S: WindowStore> RedisRateLimiter<S> {
    pub fn new(store: S, policy: RateLimitPolicy) -> Self {
        Self { store, policy }
    }
}

#[async_trait]
impl<S: WindowStore> RateLimiter for RedisRateLimiter<S> {
    async fn check(&self, key: &str) -> RateLimitDecision {
        match self.store.hit(key, self.policy.window).await {
            Ok((count, ttl)) => decide(count, ttl, &self.policy),
            Err(e) => {
                warn!("Rate limit store unavailable, allowing request: {e}");
                RateLimitDecision::Allowed
            }
        }
    }
}

/// Periodically sweeps expired records so the map stays bounded.
/// Runs until the runtime shuts down.
pub fn spawn_sweeper(limiter: Arc<dyn RateLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.sweep_expired().await;
            if removed > 0 {
                debug!("Swept {removed} expired rate-limit record(s)");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn limiter() -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitPolicy::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_fourth_request_in_window_limited() {
        let limiter = limiter();
        for _ in 0..3 {
            assert_eq!(limiter.check("contact:1.2.3.4").await, RateLimitDecision::Allowed);
        }
        match limiter.check("contact:1.2.3.4").await {
            RateLimitDecision::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(900));
            }
            other => panic!("expected limit, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_counts_down() {
        let limiter = limiter();
        for _ in 0..3 {
            limiter.check("k").await;
        }
        tokio::time::advance(Duration::from_secs(600)).await;
        assert_eq!(
            limiter.check("k").await,
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs(300)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_window_after_reset() {
        let limiter = limiter();
        for _ in 0..4 {
            limiter.check("k").await;
        }
        tokio::time::advance(Duration::from_secs(900)).await;
        assert_eq!(limiter.check("k").await, RateLimitDecision::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let limiter = limiter();
        for _ in 0..3 {
            limiter.check("contact:a").await;
        }
        assert!(matches!(
            limiter.check("contact:a").await,
            RateLimitDecision::Limited { .. }
        ));
        assert_eq!(limiter.check("contact:b").await, RateLimitDecision::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_only_expired_records() {
        let limiter = limiter();
        limiter.check("old").await;
        tokio::time::advance(Duration::from_secs(600)).await;
        limiter.check("recent").await;
        tokio::time::advance(Duration::from_secs(300)).await;

        assert_eq!(limiter.sweep_expired().await, 1);
        assert_eq!(limiter.tracked_keys().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_task_runs_on_interval() {
        let limiter = Arc::new(limiter());
        limiter.check("k").await;
        let handle = spawn_sweeper(limiter.clone(), Duration::from_secs(3600));

        tokio::time::sleep(Duration::from_secs(3601)).await;
        assert_eq!(limiter.tracked_keys().await, 0);
        handle.abort();
    }

    #[test]
    fn test_decide_allows_up_to_max() {
        let policy = RateLimitPolicy::default();
        assert_eq!(decide(1, 900, &policy), RateLimitDecision::Allowed);
        assert_eq!(decide(3, 120, &policy), RateLimitDecision::Allowed);
        assert_eq!(
            decide(4, 120, &policy),
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs(120)
            }
        );
    }

    #[test]
    fn test_decide_floors_retry_after_at_one_second() {
        let policy = RateLimitPolicy::default();
        for ttl in [-2, -1, 0] {
            assert_eq!(
                decide(4, ttl, &policy),
                RateLimitDecision::Limited {
                    retry_after: Duration::from_secs(1)
                },
                "ttl {ttl}"
            );
        }
    }

    /// Counts in memory and reports a fixed TTL, like a Redis window would.
    #[derive(Default)]
    struct CountingStore {
        counts: std::sync::Mutex<HashMap<String, u64>>,
    }

    #[async_trait]
    impl WindowStore for CountingStore {
        async fn hit(&self, key: &str, window: Duration) -> redis::RedisResult<(u64, i64)> {
            let mut counts = self.counts.lock().unwrap();
            let count = counts.entry(key.to_string()).or_default();
            *count += 1;
            Ok((*count, window.as_secs() as i64 - 60))
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl WindowStore for UnreachableStore {
        async fn hit(&self, _key: &str, _window: Duration) -> redis::RedisResult<(u64, i64)> {
            Err(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            )))
        }
    }

    #[tokio::test]
    async fn test_shared_store_limits_after_max() {
        let limiter = RedisRateLimiter::new(CountingStore::default(), RateLimitPolicy::default());
        for _ in 0..3 {
            assert_eq!(limiter.check("contact:a").await, RateLimitDecision::Allowed);
        }
        assert_eq!(
            limiter.check("contact:a").await,
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs(840)
            }
        );
        assert_eq!(limiter.check("contact:b").await, RateLimitDecision::Allowed);
    }

    #[tokio::test]
    async fn test_store_error_fails_open() {
        let limiter = RedisRateLimiter::new(UnreachableStore, RateLimitPolicy::default());
        for _ in 0..10 {
            assert_eq!(limiter.check("contact:a").await, RateLimitDecision::Allowed);
        }
    }

    #[test]
    fn test_client_key_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_key(&headers), "contact:203.0.113.7");
    }

    #[test]
    fn test_client_key_falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_key(&headers), "contact:198.51.100.2");
    }

    #[test]
    fn test_client_key_unknown_without_headers() {
        assert_eq!(client_key(&HeaderMap::new()), "contact:unknown");
    }
}
