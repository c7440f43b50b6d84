/// Maximum allowed length of an entry's transcript (in characters)
///
/// Entries whose text exceeds this limit are rejected on create and update.
pub const MAX_TEXT_LENGTH: usize = 10_000;

/// Maximum length of a language key
pub const MAX_LANGUAGE_LENGTH: usize = 32;

/// Language the panel selects when the catalog offers it
pub const DEFAULT_LANGUAGE: &str = "english";

/// Suffix appended to the language to form an entry id
pub const AUDIO_ID_SUFFIX: &str = "_audio";

/// Default HTTP port for the catalog server
pub const DEFAULT_PORT: u16 = 8000;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Base URL the client talks to when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// File extension used for downloads whose URL carries none
pub const DEFAULT_AUDIO_EXTENSION: &str = "wav";

/// How often idle rate limit buckets are dropped
pub const RATE_LIMIT_PRUNE_INTERVAL_SECS: u64 = 60;
