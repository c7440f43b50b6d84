use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use crate::auth::ApiKeys;
use crate::catalog::AudioCatalog;
use crate::error::{CatalogError, Result};
use crate::logging::{
    access_log_middleware, request_id_middleware, SlowRequestThreshold,
};
use crate::models::{
    AudioFile, AudioFileCreate, AudioFileUpdate, HealthResponse, MessageResponse, StatsResponse,
};
use crate::rate_limit::{rate_limit_middleware, RateLimiterMode};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn AudioCatalog>,
    pub api_keys: ApiKeys,
    pub rate_limiter: Option<RateLimiterMode>,
    pub request_timeout: Duration,
    pub slow_request_threshold: Duration,
    pub static_dir: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// State with open writes, no rate limiting and no static files
    pub fn new(catalog: Arc<dyn AudioCatalog>) -> Self {
        Self {
            catalog,
            api_keys: ApiKeys::empty(),
            rate_limiter: None,
            request_timeout: Duration::from_secs(30),
            slow_request_threshold: Duration::from_secs(2),
            static_dir: None,
            started_at: Utc::now(),
        }
    }
}

// HTTP Handlers

async fn list_audio(State(state): State<AppState>) -> Result<Json<Vec<AudioFile>>> {
    let entries = state.catalog.list().await?;
    tracing::debug!(entries = entries.len(), "Listed audio entries");
    Ok(Json(entries))
}

async fn get_audio(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> Result<Json<AudioFile>> {
    let entry = state.catalog.get(&language).await?;
    Ok(Json(entry))
}

async fn create_audio(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AudioFileCreate>, JsonRejection>,
) -> Result<Json<AudioFile>> {
    let Json(req) = payload.map_err(invalid_body)?;
    let created = state.catalog.create(req).await?;
    tracing::info!(language = %created.language, id = %created.id, "Audio entry created");
    Ok(Json(created))
}

async fn update_audio(
    State(state): State<AppState>,
    Path(language): Path<String>,
    payload: std::result::Result<Json<AudioFileUpdate>, JsonRejection>,
) -> Result<Json<AudioFile>> {
    let Json(req) = payload.map_err(invalid_body)?;
    let updated = state.catalog.update(&language, req).await?;
    tracing::info!(language = %updated.language, "Audio entry updated");
    Ok(Json(updated))
}

/// Malformed or incomplete JSON bodies get the usual error body and a 400
fn invalid_body(rejection: JsonRejection) -> CatalogError {
    CatalogError::InvalidRequest(rejection.body_text())
}

async fn delete_audio(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> Result<Json<MessageResponse>> {
    let language = crate::utils::validation::language_key(&language);
    state.catalog.delete(&language).await?;
    tracing::info!(language = %language, "Audio entry deleted");

    Ok(Json(MessageResponse {
        message: format!("Audio file for language '{}' deleted successfully", language),
    }))
}

/// Health check endpoint; 503 when the storage probe fails
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    state.catalog.ping().await.map_err(|e| {
        tracing::warn!(error = %e, backend = state.catalog.backend_name(), "Health check failed");
        match e {
            CatalogError::Unavailable(_) => e,
            other => CatalogError::Unavailable(other.to_string()),
        }
    })?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        storage: state.catalog.backend_name().to_string(),
        message: "API is running successfully".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn catalog_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let entries = state.catalog.list().await?;
    let now = Utc::now();

    Ok(Json(StatsResponse {
        entries: entries.len(),
        languages: entries.into_iter().map(|e| e.language).collect(),
        started_at: state.started_at.to_rfc3339(),
        uptime_seconds: (now - state.started_at).num_seconds().max(0),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn route_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "status": "error",
            "error": "Not found"
        })),
    )
}

/// Create and configure the HTTP server router
pub fn create_router(state: AppState) -> Router<()> {
    // The demo page may be hosted anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/api/audio", get(list_audio).post(create_audio))
        .route(
            "/api/audio/:language",
            get(get_audio).put(update_audio).delete(delete_audio),
        )
        .route("/health", get(health_check))
        .route("/stats", get(catalog_stats))
        .route_layer(middleware::from_fn_with_state(
            state.api_keys.clone(),
            crate::auth::auth_middleware,
        ));

    if let Some(limiter) = state.rate_limiter.clone() {
        router = router.layer(middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }

    router = match &state.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(route_not_found),
    };

    let slow = SlowRequestThreshold(state.slow_request_threshold);
    let timeout = state.request_timeout;

    // Timeout sits inside the logging layers so a 408 is still logged and tagged
    router
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn_with_state(slow, access_log_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}
