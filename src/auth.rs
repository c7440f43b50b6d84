use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::CatalogError;
use crate::utils::header_utils::extract_api_key;

/// Keys allowed to modify the catalog. Empty means writes are open.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_keys(keys: HashSet<String>) -> Self {
        Self { keys }
    }

    /// One key per line; blank lines and `#` comments are skipped
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut keys = HashSet::new();

        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            keys.insert(trimmed.to_string());
        }

        Ok(Self { keys })
    }

    pub fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn validate(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn count(&self) -> usize {
        self.keys.len()
    }
}

/// Candidate key files, most specific first
fn key_file_candidates() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = std::env::var("SHOWCASE_API_KEY_FILE") {
        locations.push(PathBuf::from(path));
    }

    locations.push(PathBuf::from("./api_keys.txt"));

    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".showcase").join("api_keys.txt"));
    }

    locations
}

/// Load the first non-empty key file found; fall back to open writes
pub fn load_api_keys() -> ApiKeys {
    for location in key_file_candidates() {
        if !location.exists() {
            continue;
        }

        match ApiKeys::from_file(&location) {
            Ok(keys) if keys.is_enabled() => {
                tracing::info!(
                    keys = keys.count(),
                    path = %location.display(),
                    "Loaded API keys"
                );
                return keys;
            }
            Ok(_) => {
                tracing::warn!(path = %location.display(), "API key file is empty");
            }
            Err(e) => {
                tracing::warn!(
                    path = %location.display(),
                    error = %e,
                    "Could not read API key file"
                );
            }
        }
    }

    tracing::info!("No API key file found - catalog writes are unauthenticated");
    ApiKeys::empty()
}

/// Guards the mutating catalog routes; safe methods pass through
pub async fn auth_middleware(
    State(keys): State<ApiKeys>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if !keys.is_enabled() || request.method().is_safe() {
        return next.run(request).await;
    }

    match extract_api_key(&headers) {
        Some(key) if keys.validate(&key) => next.run(request).await,
        Some(_) => CatalogError::InvalidApiKey.into_response(),
        None => CatalogError::Unauthorized.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_keys() {
        let keys = ApiKeys::empty();
        assert!(!keys.is_enabled());
        assert_eq!(keys.count(), 0);
        assert!(!keys.validate("any-key"));
    }

    #[test]
    fn test_validate_key() {
        let keys = ApiKeys::from_keys(
            ["editor-1", "editor-2"].iter().map(|k| k.to_string()).collect(),
        );

        assert!(keys.is_enabled());
        assert_eq!(keys.count(), 2);
        assert!(keys.validate("editor-1"));
        assert!(!keys.validate("EDITOR-1"));
        assert!(!keys.validate("viewer"));
    }

    #[test]
    fn test_api_keys_from_file_skips_comments_and_blanks() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "# catalog editors").unwrap();
        writeln!(temp_file, "  alpha  ").unwrap();
        writeln!(temp_file).unwrap();
        writeln!(temp_file, "\tbeta").unwrap();
        temp_file.flush().unwrap();

        let keys = ApiKeys::from_file(temp_file.path()).unwrap();

        assert_eq!(keys.count(), 2);
        assert!(keys.validate("alpha"));
        assert!(keys.validate("beta"));
        assert!(!keys.validate("# catalog editors"));
    }

    #[test]
    fn test_api_keys_from_missing_file() {
        assert!(ApiKeys::from_file("/nonexistent/showcase/keys.txt").is_err());
    }

    #[test]
    fn test_key_file_candidates_include_local_file() {
        let candidates = key_file_candidates();
        assert!(candidates.contains(&PathBuf::from("./api_keys.txt")));
    }
}
