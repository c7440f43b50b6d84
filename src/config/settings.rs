use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::constants::{DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::rate_limit::{KeyedRateLimiter, RateLimitConfig, RateLimiterMode};

/// Server settings resolved from the environment (after `.env` is loaded)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON snapshot backing the catalog; in-memory only when unset
    pub catalog_file: Option<PathBuf>,
    /// Directory served as-is for the demo page
    pub static_dir: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            catalog_file: None,
            static_dir: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            host: lookup("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            catalog_file: lookup("CATALOG_FILE")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            static_dir: lookup("STATIC_DIR")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            request_timeout: parse_request_timeout(lookup("REQUEST_TIMEOUT_SECONDS").as_deref()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Whole seconds, at least one; anything else falls back to the default
pub fn parse_request_timeout(value: Option<&str>) -> Duration {
    let secs = value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    Duration::from_secs(secs)
}

/// Pick the rate limiter from `RATE_LIMIT_MODE` and the API key status
pub fn load_rate_limit_config(api_keys_enabled: bool) -> Option<RateLimiterMode> {
    rate_limit_from_lookup(api_keys_enabled, |name| env::var(name).ok())
}

pub(crate) fn rate_limit_from_lookup<F>(api_keys_enabled: bool, lookup: F) -> Option<RateLimiterMode>
where
    F: Fn(&str) -> Option<String>,
{
    let mode = lookup("RATE_LIMIT_MODE")
        .unwrap_or_else(|| "auto".to_string())
        .to_lowercase();

    let per_key = |lookup: &F| {
        RateLimiterMode::PerKey(KeyedRateLimiter::new(bucket_config(
            lookup,
            "AUTHENTICATED",
            RateLimitConfig {
                per_second: 10,
                burst_size: 20,
            },
        )))
    };
    let per_ip = |lookup: &F| {
        RateLimiterMode::PerIp(KeyedRateLimiter::new(bucket_config(
            lookup,
            "UNAUTHENTICATED",
            RateLimitConfig {
                per_second: 5,
                burst_size: 10,
            },
        )))
    };

    match mode.as_str() {
        "disabled" | "off" => None,
        "per-key" => Some(per_key(&lookup)),
        "per-ip" => Some(per_ip(&lookup)),
        other => {
            if other != "auto" {
                tracing::warn!(mode = other, "Unknown RATE_LIMIT_MODE, using auto");
            }
            if api_keys_enabled {
                Some(per_key(&lookup))
            } else {
                Some(per_ip(&lookup))
            }
        }
    }
}

/// `RATE_LIMIT_<SCOPE>_*` first, then the shared `RATE_LIMIT_*` knobs
fn bucket_config<F>(lookup: &F, scope: &str, defaults: RateLimitConfig) -> RateLimitConfig
where
    F: Fn(&str) -> Option<String>,
{
    let read = |suffix: &str| -> Option<u32> {
        lookup(&format!("RATE_LIMIT_{}_{}", scope, suffix))
            .or_else(|| lookup(&format!("RATE_LIMIT_{}", suffix)))
            .and_then(|v| v.parse().ok())
    };

    RateLimitConfig {
        per_second: read("PER_SECOND").unwrap_or(defaults.per_second),
        burst_size: read("BURST_SIZE").unwrap_or(defaults.burst_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_request_timeout_default() {
        assert_eq!(parse_request_timeout(None), Duration::from_secs(30));
    }

    #[test]
    fn test_request_timeout_custom() {
        assert_eq!(parse_request_timeout(Some("120")), Duration::from_secs(120));
        assert_eq!(parse_request_timeout(Some(" 1 ")), Duration::from_secs(1));
    }

    #[test]
    fn test_request_timeout_invalid_falls_back() {
        assert_eq!(parse_request_timeout(Some("soon")), Duration::from_secs(30));
        assert_eq!(parse_request_timeout(Some("-1")), Duration::from_secs(30));
        assert_eq!(parse_request_timeout(Some("0")), Duration::from_secs(30));
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[]));

        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert!(config.catalog_file.is_none());
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_server_config_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9100"),
            ("CATALOG_FILE", "data/catalog.json"),
            ("STATIC_DIR", "public"),
            ("REQUEST_TIMEOUT_SECONDS", "5"),
        ]));

        assert_eq!(config.bind_addr(), "127.0.0.1:9100");
        assert_eq!(config.catalog_file, Some(PathBuf::from("data/catalog.json")));
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_server_config_bad_port_keeps_default() {
        let config = ServerConfig::from_lookup(lookup_from(&[("PORT", "99999")]));
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_rate_limit_auto_mode() {
        let with_keys = rate_limit_from_lookup(true, lookup_from(&[])).unwrap();
        assert!(matches!(with_keys, RateLimiterMode::PerKey(_)));
        assert_eq!(with_keys.config().per_second, 10);

        let without_keys = rate_limit_from_lookup(false, lookup_from(&[])).unwrap();
        assert!(matches!(without_keys, RateLimiterMode::PerIp(_)));
        assert_eq!(without_keys.config().burst_size, 10);
    }

    #[test]
    fn test_rate_limit_disabled() {
        let mode = rate_limit_from_lookup(true, lookup_from(&[("RATE_LIMIT_MODE", "Disabled")]));
        assert!(mode.is_none());
    }

    #[test]
    fn test_rate_limit_scoped_overrides_shared() {
        let mode = rate_limit_from_lookup(
            false,
            lookup_from(&[
                ("RATE_LIMIT_MODE", "per-ip"),
                ("RATE_LIMIT_PER_SECOND", "3"),
                ("RATE_LIMIT_BURST_SIZE", "4"),
                ("RATE_LIMIT_UNAUTHENTICATED_BURST_SIZE", "7"),
            ]),
        )
        .unwrap();

        assert_eq!(
            mode.config(),
            &RateLimitConfig {
                per_second: 3,
                burst_size: 7,
            }
        );
    }

    #[test]
    fn test_rate_limit_unknown_mode_acts_as_auto() {
        let mode = rate_limit_from_lookup(true, lookup_from(&[("RATE_LIMIT_MODE", "bogus")]));
        assert!(matches!(mode, Some(RateLimiterMode::PerKey(_))));
    }
}
