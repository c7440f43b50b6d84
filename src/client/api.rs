use futures::StreamExt;
use reqwest::{StatusCode, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use super::error::{ClientError, ClientResult};
use crate::models::{AudioFile, HealthResponse};

/// Thin reqwest wrapper over the catalog's read endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("showcase-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|_| ClientError::InvalidUrl(format!("{}{}", self.base_url, path)))
    }

    /// `GET /api/audio`
    pub async fn list_audio(&self) -> ClientResult<Vec<AudioFile>> {
        let url = self.endpoint("api/audio")?;
        tracing::debug!(%url, "Fetching audio catalog");

        let response = check_status(self.http.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    /// `GET /api/audio/{language}`; a 404 becomes `ClientError::NotFound`
    pub async fn get_audio(&self, language: &str) -> ClientResult<AudioFile> {
        let mut url = self.endpoint("api/audio")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .push(language);
        tracing::debug!(%url, language, "Fetching audio entry");

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(language.to_string()));
        }

        Ok(check_status(response).await?.json().await?)
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let response = check_status(self.http.get(self.endpoint("health")?).send().await?).await?;
        Ok(response.json().await?)
    }

    /// Absolute URL for an entry's `audio_url`; relative paths hang off the API base
    pub fn resolve_audio_url(&self, audio_url: &str) -> ClientResult<Url> {
        match Url::parse(audio_url) {
            Ok(url) => Ok(url),
            Err(_) => self
                .base_url
                .join(audio_url)
                .map_err(|_| ClientError::InvalidUrl(audio_url.to_string())),
        }
    }

    /// Stream `audio_url` into `dest`, returning the number of bytes written.
    ///
    /// The body lands in a `.part` sibling first so `dest` is never half-written.
    pub async fn download(&self, audio_url: &str, dest: &Path) -> ClientResult<u64> {
        let url = self.resolve_audio_url(audio_url)?;
        tracing::info!(%url, dest = %dest.display(), "Downloading audio");

        let response = check_status(self.http.get(url).send().await?).await?;
        let part_path = part_path_for(dest);

        let result = async {
            let mut file = tokio::fs::File::create(&part_path).await?;
            let mut stream = response.bytes_stream();
            let mut written: u64 = 0;

            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }

            file.flush().await?;
            drop(file);
            tokio::fs::rename(&part_path, dest).await?;
            Ok::<u64, ClientError>(written)
        }
        .await;

        if result.is_err() {
            let _ = tokio::fs::remove_file(&part_path).await;
        }

        result
    }
}

fn parse_base_url(base_url: &str) -> ClientResult<Url> {
    let trimmed = base_url.trim();
    let mut url =
        Url::parse(trimmed).map_err(|_| ClientError::InvalidUrl(trimmed.to_string()))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl(trimmed.to_string()));
    }

    // join() replaces the last segment unless the path ends in '/'
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn part_path_for(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// Pass 2xx through; otherwise surface the server's error message
async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        }),
    })
}

/// `error` (this server) or `detail` (FastAPI-style backends)
fn error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("error")
        .or_else(|| json.get("detail"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_adds_trailing_slash() {
        let url = parse_base_url("http://localhost:8000").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/");

        let prefixed = parse_base_url("https://example.com/demo").unwrap();
        assert_eq!(prefixed.as_str(), "https://example.com/demo/");
    }

    #[test]
    fn test_parse_base_url_rejects_non_http() {
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(parse_base_url("mailto:someone@example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_endpoint_keeps_prefix() {
        let client = ApiClient::new("https://example.com/demo").unwrap();
        assert_eq!(
            client.endpoint("api/audio").unwrap().as_str(),
            "https://example.com/demo/api/audio"
        );
    }

    #[test]
    fn test_resolve_audio_url() {
        let client = ApiClient::new("http://localhost:8000").unwrap();

        assert_eq!(
            client
                .resolve_audio_url("https://cdn.example.com/a.wav")
                .unwrap()
                .as_str(),
            "https://cdn.example.com/a.wav"
        );
        assert_eq!(
            client.resolve_audio_url("/static/b.wav").unwrap().as_str(),
            "http://localhost:8000/static/b.wav"
        );
    }

    #[test]
    fn test_error_message_sources() {
        assert_eq!(
            error_message(r#"{"status":"error","error":"nope"}"#),
            Some("nope".to_string())
        );
        assert_eq!(
            error_message(r#"{"detail":"Audio file not found"}"#),
            Some("Audio file not found".to_string())
        );
        assert_eq!(error_message("<html>502</html>"), None);
    }

    #[test]
    fn test_part_path_for() {
        assert_eq!(
            part_path_for(Path::new("/tmp/out/english_audio.wav")),
            PathBuf::from("/tmp/out/english_audio.wav.part")
        );
    }
}
