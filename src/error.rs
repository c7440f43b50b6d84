use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

#[derive(Debug)]
pub enum CatalogError {
    // I/O errors
    Io(std::io::Error),

    // Catalog lookups
    NotFound(String),
    AlreadyExists(String),

    // Request validation errors
    InvalidRequest(String),

    // Auth errors
    Unauthorized,
    InvalidApiKey,

    // Storage errors
    Storage(String),
    Unavailable(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "I/O error: {}", e),
            CatalogError::NotFound(language) => {
                write!(f, "Audio file not found for language: {}", language)
            }
            CatalogError::AlreadyExists(language) => {
                write!(f, "Audio file for language '{}' already exists", language)
            }
            CatalogError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            CatalogError::Unauthorized => write!(
                f,
                "API key required. Provide via X-API-Key or Authorization: Bearer header"
            ),
            CatalogError::InvalidApiKey => write!(f, "Invalid API key"),
            CatalogError::Storage(msg) => write!(f, "Storage error: {}", msg),
            CatalogError::Unavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

// Conversions
impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::AlreadyExists(_) | CatalogError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            CatalogError::Unauthorized | CatalogError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            CatalogError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Axum integration
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            axum::Json(serde_json::json!({
                "status": "error",
                "error": message
            })),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
