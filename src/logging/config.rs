use std::env;

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Custom log directory path (overrides auto-detection)
    pub custom_log_dir: Option<String>,

    /// Filter directives for console output
    pub console_log_level: String,

    /// Filter directives for the application log file
    pub file_log_level: String,

    /// Write access/application logs to files (console only when false)
    pub file_logging_enabled: bool,

    /// Requests slower than this are reported as warnings
    pub slow_request_threshold_ms: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            custom_log_dir: None,
            console_log_level: "showcase_server=info,tower_http=warn".to_string(),
            file_log_level: "debug".to_string(),
            file_logging_enabled: true,
            slow_request_threshold_ms: 2000,
        }
    }
}

impl LogConfig {
    /// Console-only configuration used by the client commands
    pub fn console_only() -> Self {
        Self {
            file_logging_enabled: false,
            console_log_level: "showcase_server=warn".to_string(),
            ..Self::default()
        }
    }

    /// Load logging configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("SHOWCASE_LOG_DIR") {
            config.custom_log_dir = Some(dir);
        }

        if let Some(level) = lookup("RUST_LOG") {
            config.console_log_level = level;
        }

        if let Some(level) = lookup("SHOWCASE_FILE_LOG_LEVEL") {
            config.file_log_level = level;
        }

        if let Some(val) = lookup("LOG_TO_FILES") {
            config.file_logging_enabled = val.eq_ignore_ascii_case("true");
        }

        if let Some(threshold) = lookup("LOG_SLOW_REQUEST_THRESHOLD_MS").and_then(|v| v.parse().ok())
        {
            config.slow_request_threshold_ms = threshold;
        }

        config
    }
}
