//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls caching, retries, pacing, proxy rotation and the
//! endpoints that are scraped. The defaults are tuned for slow, polite
//! scraping that stays under DuckDuckGo's bot detection.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default rich-layout endpoint.
pub const DEFAULT_HTML_URL: &str = "https://duckduckgo.com/html/";
/// Default lite-layout endpoint.
pub const DEFAULT_LITE_URL: &str = "https://lite.duckduckgo.com/lite/";
/// Homepage sent as `Referer` so requests look like they came from the site.
pub const DEFAULT_REFERER: &str = "https://duckduckgo.com/";

/// Cached results are valid for 24 hours.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Configuration for a search operation.
///
/// Use [`Default::default()`] for sensible defaults, construct with field
/// overrides, or load from TOML with [`SearchConfig::from_file`]. Missing
/// TOML keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Read and write the on-disk result cache.
    pub use_cache: bool,
    /// Directory holding one JSON file per cached query.
    pub cache_dir: PathBuf,
    /// How long a cache entry stays valid.
    pub cache_ttl_seconds: u64,
    /// Route requests through a randomly chosen entry of `proxies`.
    pub use_proxy: bool,
    /// Proxy URLs, e.g. `http://10.0.0.1:8080`.
    pub proxies: Vec<String>,
    /// Attempts per endpoint before giving up.
    pub max_retries: u32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Random pause `(min, max)` in milliseconds before every attempt.
    pub request_delay_ms: (u64, u64),
    /// Backoff unit: a retry after attempt `n` waits `2^n * backoff_base_ms`.
    pub backoff_base_ms: u64,
    /// Random jitter `(min, max)` in milliseconds added to each backoff.
    pub backoff_jitter_ms: (u64, u64),
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
    /// Rich-layout endpoint.
    pub html_url: String,
    /// Lite-layout endpoint.
    pub lite_url: String,
    /// `Referer` header value.
    pub referer: String,
    /// Where diagnostic dumps (`debug_response_<status>.html`) are written.
    pub debug_dir: PathBuf,
    /// Also dump every fetched result page into `debug_dir`.
    pub dump_html: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            cache_dir: default_cache_dir(),
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            use_proxy: false,
            proxies: Vec::new(),
            max_retries: 5,
            timeout_seconds: 30,
            request_delay_ms: (1000, 3000),
            backoff_base_ms: 1000,
            backoff_jitter_ms: (1000, 3000),
            user_agent: None,
            html_url: DEFAULT_HTML_URL.to_string(),
            lite_url: DEFAULT_LITE_URL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            debug_dir: PathBuf::from("."),
            dump_html: false,
        }
    }
}

/// Returns the default cache directory: `$XDG_CACHE_HOME/ddgs`, falling back
/// to `~/.cache/ddgs`, then to `./cache`.
pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = std::env::var_os("XDG_CACHE_HOME") {
        PathBuf::from(cache).join("ddgs")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".cache").join("ddgs")
    } else {
        PathBuf::from("cache")
    }
}

impl SearchConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, SearchError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| SearchError::Config(e.to_string()))
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_retries` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - delay and jitter ranges must have `min <= max`
    /// - both endpoints must be absolute URLs
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_retries == 0 {
            return Err(SearchError::Config(
                "max_retries must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.request_delay_ms.0 > self.request_delay_ms.1 {
            return Err(SearchError::Config(
                "request_delay_ms min must be <= max".into(),
            ));
        }
        if self.backoff_jitter_ms.0 > self.backoff_jitter_ms.1 {
            return Err(SearchError::Config(
                "backoff_jitter_ms min must be <= max".into(),
            ));
        }
        for (name, endpoint) in [("html_url", &self.html_url), ("lite_url", &self.lite_url)] {
            Url::parse(endpoint)
                .map_err(|e| SearchError::Config(format!("{name} is not a valid URL: {e}")))?;
        }
        Ok(())
    }

    /// A configuration with every pause set to zero, for tests that talk to
    /// a local mock server.
    pub fn without_delays(self) -> Self {
        Self {
            request_delay_ms: (0, 0),
            backoff_base_ms: 0,
            backoff_jitter_ms: (0, 0),
            ..self
        }
    }
}
