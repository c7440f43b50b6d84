use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use showcase_server::auth::ApiKeys;
use showcase_server::catalog::MemoryCatalog;
use showcase_server::rate_limit::{KeyedRateLimiter, RateLimitConfig, RateLimiterMode};
use showcase_server::server::{create_router, AppState};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_app(rate_config: RateLimitConfig, with_auth: bool) -> axum::Router {
    let mut state = AppState::new(Arc::new(MemoryCatalog::seeded()));

    if with_auth {
        let keys: HashSet<String> = ["key1", "key2"].iter().map(|k| k.to_string()).collect();
        state.api_keys = ApiKeys::from_keys(keys);
        state.rate_limiter = Some(RateLimiterMode::PerKey(KeyedRateLimiter::new(rate_config)));
    } else {
        state.rate_limiter = Some(RateLimiterMode::PerIp(KeyedRateLimiter::new(rate_config)));
    }

    create_router(state)
}

fn list_request(api_key: Option<&str>, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/audio");
    if let Some(key) = api_key {
        builder = builder.header("X-API-Key", key);
    }
    if let Some(ip) = forwarded_for {
        builder = builder.header("X-Forwarded-For", ip);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_rate_limit_allows_requests_within_limit() {
    let config = RateLimitConfig {
        per_second: 1,
        burst_size: 3,
    };
    let app = create_test_app(config, true);

    for i in 0..3 {
        let response = app
            .clone()
            .oneshot(list_request(Some("key1"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "request {} should pass", i);
    }
}

#[tokio::test]
async fn test_rate_limit_blocks_requests_over_limit() {
    let config = RateLimitConfig {
        per_second: 1,
        burst_size: 2,
    };
    let app = create_test_app(config, true);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(list_request(Some("key1"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(list_request(Some("key1"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .expect("Retry-After header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "error");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Rate limit exceeded"));
}

#[tokio::test]
async fn test_rate_limit_is_independent_per_key() {
    let config = RateLimitConfig {
        per_second: 1,
        burst_size: 1,
    };
    let app = create_test_app(config, true);

    let response = app
        .clone()
        .oneshot(list_request(Some("key1"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(list_request(Some("key1"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different key has its own bucket
    let response = app
        .oneshot(list_request(Some("key2"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_per_ip_mode_uses_forwarded_address() {
    let config = RateLimitConfig {
        per_second: 1,
        burst_size: 1,
    };
    let app = create_test_app(config, false);

    let response = app
        .clone()
        .oneshot(list_request(None, Some("203.0.113.7")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(list_request(None, Some("203.0.113.7, 10.0.0.1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app
        .oneshot(list_request(None, Some("198.51.100.2")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_requests_still_carry_request_id() {
    let config = RateLimitConfig {
        per_second: 1,
        burst_size: 1,
    };
    let app = create_test_app(config, false);

    let _ = app
        .clone()
        .oneshot(list_request(None, Some("192.0.2.1")))
        .await
        .unwrap();
    let response = app
        .oneshot(list_request(None, Some("192.0.2.1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("x-request-id"));
}
