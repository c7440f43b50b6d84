use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("no audio available for language '{0}'")]
    NotFound(String),

    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("no audio loaded")]
    NothingLoaded,

    #[error("playback error: {0}")]
    Playback(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
