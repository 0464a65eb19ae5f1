//! Configuration module for environment variable parsing.
//!
//! Configuration is resolved once at startup and shared by both binaries.

use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Primary variable holding the downstream webhook URL.
pub const WEBHOOK_URL_VAR: &str = "FORWARD_WEBHOOK_URL";

/// Legacy name for the downstream webhook URL, consulted only when the
/// primary variable is absent or empty.
pub const LEGACY_WEBHOOK_URL_VAR: &str = "DISCORD_WEBHOOK";

/// Names earlier deployments used for the downstream URL, checked in order
/// after [`WEBHOOK_URL_VAR`] and [`LEGACY_WEBHOOK_URL_VAR`].
pub const DEPLOYED_WEBHOOK_URL_VARS: [&str; 2] = ["validingawpxeno", "mahesaweda77"];

/// Shared secret expected in the `x-webhook-token` header.
pub const WEBHOOK_TOKEN_VAR: &str = "WEBHOOK_TOKEN";

/// Default request log file, relative to the working directory.
pub const DEFAULT_REQUEST_LOG_FILE: &str = "requests.log";

/// Default body limit for the catcher (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    // =========================================================================
    // Forwarder
    // =========================================================================

    /// Downstream webhook URL
    pub webhook_url: Option<String>,

    /// Shared secret token callers must present
    pub webhook_token: Option<String>,

    /// Optional timeout for the downstream call in milliseconds
    pub forward_timeout_ms: Option<u64>,

    // =========================================================================
    // Catcher
    // =========================================================================

    /// Append-only file receiving one line per caught request
    pub request_log_file: PathBuf,

    /// Maximum accepted request body size
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            webhook_url: None,
            webhook_token: None,
            forward_timeout_ms: None,
            request_log_file: PathBuf::from(DEFAULT_REQUEST_LOG_FILE),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        Config {
            port: parse_number(&var, "PORT").unwrap_or(defaults.port),

            webhook_url: [WEBHOOK_URL_VAR, LEGACY_WEBHOOK_URL_VAR]
                .into_iter()
                .chain(DEPLOYED_WEBHOOK_URL_VARS)
                .find_map(|name| var(name)),

            webhook_token: var(WEBHOOK_TOKEN_VAR),

            forward_timeout_ms: parse_number(&var, "FORWARD_TIMEOUT_MS"),

            request_log_file: var("REQUEST_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.request_log_file),

            max_body_bytes: parse_number(&var, "MAX_BODY_BYTES")
                .unwrap_or(defaults.max_body_bytes),
        }
    }
}

/// Parse a numeric variable, warning when it is set but malformed.
fn parse_number<T, F>(var: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = var(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8080);
        assert!(config.webhook_url.is_none());
        assert!(config.webhook_token.is_none());
        assert!(config.forward_timeout_ms.is_none());
        assert_eq!(config.request_log_file, PathBuf::from("requests.log"));
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_primary_url_wins_over_legacy() {
        let config = Config::from_lookup(lookup(&[
            (WEBHOOK_URL_VAR, "https://primary.example/hook"),
            (LEGACY_WEBHOOK_URL_VAR, "https://legacy.example/hook"),
        ]));
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://primary.example/hook")
        );
    }

    #[test]
    fn test_legacy_url_fallback() {
        let config = Config::from_lookup(lookup(&[
            (WEBHOOK_URL_VAR, ""),
            (LEGACY_WEBHOOK_URL_VAR, "https://legacy.example/hook"),
        ]));
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://legacy.example/hook")
        );
    }

    #[test]
    fn test_deployed_url_names_as_last_resort() {
        let config = Config::from_lookup(lookup(&[
            ("validingawpxeno", "https://first.example/hook"),
            ("mahesaweda77", "https://second.example/hook"),
        ]));
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://first.example/hook")
        );

        let config =
            Config::from_lookup(lookup(&[("mahesaweda77", "https://second.example/hook")]));
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://second.example/hook")
        );

        let config = Config::from_lookup(lookup(&[
            (LEGACY_WEBHOOK_URL_VAR, "https://legacy.example/hook"),
            ("validingawpxeno", "https://first.example/hook"),
        ]));
        assert_eq!(
            config.webhook_url.as_deref(),
            Some("https://legacy.example/hook")
        );
    }

    #[test]
    fn test_invalid_numbers_use_default() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "not-a-port"),
            ("FORWARD_TIMEOUT_MS", "soon"),
        ]));
        assert_eq!(config.port, 8080);
        assert!(config.forward_timeout_ms.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9090"),
            (WEBHOOK_TOKEN_VAR, "secret123"),
            ("FORWARD_TIMEOUT_MS", "2500"),
            ("REQUEST_LOG_FILE", "/var/log/hooks.log"),
            ("MAX_BODY_BYTES", "1024"),
        ]));
        assert_eq!(config.port, 9090);
        assert_eq!(config.webhook_token.as_deref(), Some("secret123"));
        assert_eq!(config.forward_timeout_ms, Some(2500));
        assert_eq!(config.request_log_file, PathBuf::from("/var/log/hooks.log"));
        assert_eq!(config.max_body_bytes, 1024);
    }
}
