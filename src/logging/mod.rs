pub mod config;
pub mod middleware;
pub mod paths;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use config::LogConfig;
pub use middleware::{access_log_middleware, request_id_middleware, RequestId, SlowRequestThreshold};

/// Keeps the non-blocking file writers alive; logs stop flushing once dropped
#[must_use]
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Initialize console logging plus, when enabled, daily-rotated JSON files:
/// `access.log` (target `access_log` only) and `application.log` (everything else)
pub fn init_logging(config: &LogConfig) -> Result<LogGuards, Box<dyn std::error::Error>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(EnvFilter::try_new(&config.console_log_level).unwrap_or_else(|_| {
            EnvFilter::new(LogConfig::default().console_log_level)
        }));

    if !config.file_logging_enabled {
        tracing_subscriber::registry().with(console_layer).try_init()?;
        return Ok(LogGuards { _guards: Vec::new() });
    }

    let log_dir = paths::get_log_directory(config.custom_log_dir.as_deref())?;

    let (access_writer, access_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "access.log"));
    let (app_writer, app_guard) = tracing_appender::non_blocking(
        tracing_appender::rolling::daily(&log_dir, "application.log"),
    );

    let access_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(access_writer)
        .with_filter(EnvFilter::new("access_log=info"));

    let app_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(app_writer)
        .with_filter(
            EnvFilter::try_new(&config.file_log_level)
                .unwrap_or_else(|_| EnvFilter::new("debug"))
                .add_directive("access_log=off".parse()?),
        );

    tracing_subscriber::registry()
        .with(console_layer)
        .with(access_layer)
        .with(app_layer)
        .try_init()?;

    tracing::info!(log_dir = ?log_dir, "Logging initialized");

    Ok(LogGuards {
        _guards: vec![access_guard, app_guard],
    })
}

/// Log platform-specific information on startup
pub fn log_platform_info() {
    tracing::info!(
        platform = std::env::consts::OS,
        architecture = std::env::consts::ARCH,
        version = env!("CARGO_PKG_VERSION"),
        "Server starting"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_logging_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("custom_logs");

        let config = LogConfig {
            custom_log_dir: Some(log_path.to_str().unwrap().to_string()),
            ..LogConfig::default()
        };

        // The global subscriber may already be set by another test; the
        // directory is resolved before that can fail.
        let _guards = init_logging(&config);

        assert!(log_path.exists(), "Log directory should be created");
    }

    #[test]
    fn test_platform_info_logging() {
        log_platform_info();
    }
}
