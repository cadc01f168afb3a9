//! Service Configuration
//!
//! All runtime tunables are read from environment variables with sensible
//! defaults, so the binary can run against a local Elasticsearch with no
//! setup at all.

use std::time::Duration;

/// Default upload ceiling: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Default per-request timeout for backend calls.
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the search backend, e.g. `http://localhost:9200`.
    pub backend_url: String,

    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,

    /// Timeout applied to every backend HTTP call. Expiry is reported as
    /// the backend being unavailable, not as a hung request.
    pub backend_timeout: Duration,

    /// Indices whose names start with this prefix are hidden from listings.
    /// Elasticsearch system indices start with `.`.
    pub reserved_index_prefix: String,

    /// When `false`, an upload targeting an index that already exists is
    /// rejected instead of relying on the backend's dynamic-field behavior
    /// for columns the original mapping never saw.
    pub allow_existing_collection: bool,

    /// Markers wrapped around matched substrings in search highlights.
    pub highlight_pre_tag: String,
    pub highlight_post_tag: String,
}

impl Config {
    /// Builds a configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self {
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:9200".to_string())
                .trim_end_matches('/')
                .to_string(),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            backend_timeout: Duration::from_secs(env_parse(
                "BACKEND_TIMEOUT_SECS",
                DEFAULT_BACKEND_TIMEOUT_SECS,
            )),
            reserved_index_prefix: std::env::var("RESERVED_INDEX_PREFIX")
                .unwrap_or_else(|_| ".".to_string()),
            allow_existing_collection: env_parse("ALLOW_EXISTING_COLLECTION", true),
            highlight_pre_tag: std::env::var("HIGHLIGHT_PRE_TAG")
                .unwrap_or_else(|_| "<mark>".to_string()),
            highlight_post_tag: std::env::var("HIGHLIGHT_POST_TAG")
                .unwrap_or_else(|_| "</mark>".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:9200".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            reserved_index_prefix: ".".to_string(),
            allow_existing_collection: true,
            highlight_pre_tag: "<mark>".to_string(),
            highlight_post_tag: "</mark>".to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
