use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::utils::header_utils::{extract_api_key, extract_client_ip, hash_api_key};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: String,
    error: String,
}

/// Token bucket parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests per second refilled into the bucket
    pub per_second: u32,
    /// Bucket capacity
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 10,
            burst_size: 20,
        }
    }
}

struct Bucket {
    limiter: Arc<DirectLimiter>,
    last_seen: Instant,
}

/// One governor bucket per client key (API key or IP)
#[derive(Clone)]
pub struct KeyedRateLimiter {
    limiters: Arc<DashMap<String, Bucket>>,
    config: RateLimitConfig,
    clock: DefaultClock,
}

impl KeyedRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiters: Arc::new(DashMap::new()),
            config,
            clock: DefaultClock::default(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    // Zero in either knob degrades to one request, never to a panic
    fn per_second(&self) -> NonZeroU32 {
        NonZeroU32::new(self.config.per_second).unwrap_or(NonZeroU32::MIN)
    }

    fn burst(&self) -> NonZeroU32 {
        NonZeroU32::new(self.config.burst_size).unwrap_or(NonZeroU32::MIN)
    }

    fn limiter_for(&self, key: &str) -> Arc<DirectLimiter> {
        let now = Instant::now();
        let mut bucket = self
            .limiters
            .entry(key.to_string())
            .or_insert_with(|| Bucket {
                limiter: Arc::new(RateLimiter::direct(
                    Quota::per_second(self.per_second()).allow_burst(self.burst()),
                )),
                last_seen: now,
            });
        bucket.last_seen = now;
        bucket.limiter.clone()
    }

    /// `Err` carries how long the client should wait
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.limiter_for(key)
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    pub fn tracked_keys(&self) -> usize {
        self.limiters.len()
    }

    /// Time for an emptied bucket to refill completely
    pub fn refill_time(&self) -> Duration {
        Duration::from_nanos(
            u64::from(self.burst().get()) * 1_000_000_000 / u64::from(self.per_second().get()),
        )
    }

    /// Drop buckets untouched for at least a full refill; they are full again,
    /// so a fresh bucket behaves the same. Returns how many were removed.
    pub fn prune_idle(&self) -> usize {
        let idle_after = self.refill_time();
        let before = self.limiters.len();
        self.limiters
            .retain(|_, bucket| bucket.last_seen.elapsed() < idle_after);
        before.saturating_sub(self.limiters.len())
    }

    /// Run `prune_idle` every `every` on the current tokio runtime
    pub fn spawn_pruning(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = limiter.prune_idle();
                if removed > 0 {
                    tracing::debug!(
                        removed,
                        remaining = limiter.tracked_keys(),
                        "Pruned idle rate limit buckets"
                    );
                }
            }
        })
    }
}

/// How requests are grouped into buckets
#[derive(Clone)]
pub enum RateLimiterMode {
    PerKey(KeyedRateLimiter),
    PerIp(KeyedRateLimiter),
}

impl RateLimiterMode {
    pub fn limiter(&self) -> &KeyedRateLimiter {
        match self {
            RateLimiterMode::PerKey(limiter) | RateLimiterMode::PerIp(limiter) => limiter,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        self.limiter().config()
    }

    pub fn mode_description(&self) -> &'static str {
        match self {
            RateLimiterMode::PerKey(_) => "per API key",
            RateLimiterMode::PerIp(_) => "per client IP",
        }
    }

    /// Bucket key for a request
    fn bucket_key(&self, req: &Request) -> String {
        let by_ip = || {
            extract_client_ip(req)
                .map(|ip| format!("ip:{}", ip))
                .unwrap_or_else(|| "ip:unknown".to_string())
        };

        match self {
            RateLimiterMode::PerKey(_) => extract_api_key(req.headers())
                .map(|key| format!("key:{}", key))
                .unwrap_or_else(by_ip),
            RateLimiterMode::PerIp(_) => by_ip(),
        }
    }
}

pub async fn rate_limit_middleware(
    State(mode): State<RateLimiterMode>,
    request: Request,
    next: Next,
) -> Response {
    let key = mode.bucket_key(&request);

    match mode.limiter().check(&key) {
        Ok(()) => next.run(request).await,
        Err(wait) => {
            // Round up so clients never retry too early
            let retry_after = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);

            let who = match key.strip_prefix("key:") {
                Some(api_key) => format!("key {}", hash_api_key(api_key)),
                None => key.clone(),
            };
            tracing::warn!(
                client = %who,
                retry_after_secs = retry_after,
                "Rate limit exceeded"
            );

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse {
                    status: "error".to_string(),
                    error: format!(
                        "Rate limit exceeded. Please retry after {} seconds.",
                        retry_after
                    ),
                }),
            )
                .into_response();

            response.headers_mut().insert(
                "Retry-After",
                HeaderValue::from(retry_after),
            );

            response
        }
    }
}
