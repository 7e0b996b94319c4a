//! # ddgs-search
//!
//! Resilient DuckDuckGo search over the server-rendered HTML pages, with no
//! API keys and no JavaScript.
//!
//! ## Design
//!
//! - Fetches `duckduckgo.com/html/` first and falls back to the lite layout
//!   when the rich page fails or yields nothing
//! - Paced requests with User-Agent and proxy rotation; CAPTCHA pages,
//!   `429` and `5xx` are retried with exponential backoff
//! - Cascading CSS selectors so small markup changes don't break parsing
//! - Best-effort result cache (one JSON file per query, 24 h expiry)
//! - Never fails loudly: every fault degrades to an empty result and a log line
//!
//! ## Security
//!
//! - No network listeners; this is a library, not a server
//! - Search queries are logged at info level or below only
//! - Diagnostic dumps are opt-in (`dump_html`) or limited to unexpected
//!   HTTP statuses

pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod searcher;
pub mod transport;
pub mod types;

pub use cache::{CacheBackend, CacheStore, FileCache, MemoryCache};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use searcher::Searcher;
pub use transport::{HttpTransport, Transport};
pub use types::{CacheEntry, Layout, SearchOutcome, SearchResult};

/// The production stack: reqwest transport plus the configured cache.
pub type DefaultSearcher = Searcher<HttpTransport, CacheBackend>;

/// Build the production searcher for `config`.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the configuration is invalid.
pub fn searcher(config: SearchConfig) -> Result<DefaultSearcher> {
    config.validate()?;
    let cache = CacheBackend::from_config(&config);
    let transport = HttpTransport::new(config.clone());
    Ok(Searcher::new(config, transport, cache))
}

/// Search DuckDuckGo for `query`.
///
/// Consults the cache, then the HTML layout, then the lite layout, and
/// caches any non-empty result. An empty list means nothing was found or
/// every request failed.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid. Network, parse and
/// cache faults never surface here.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> ddgs_search::Result<()> {
/// let config = ddgs_search::SearchConfig::default();
/// let results = ddgs_search::search("rust programming", &config).await?;
/// for result in &results {
///     println!("{}: {}", result.title, result.link);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(query: &str, config: &SearchConfig) -> Result<Vec<SearchResult>> {
    Ok(searcher(config.clone())?.search(query).await)
}

/// Search with the default configuration.
///
/// Convenience wrapper around [`search`] using [`SearchConfig::default()`].
///
/// # Errors
///
/// Same as [`search`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> ddgs_search::Result<()> {
/// let results = ddgs_search::search_default("weather today").await?;
/// println!("{} results", results.len());
/// # Ok(())
/// # }
/// ```
pub async fn search_default(query: &str) -> Result<Vec<SearchResult>> {
    search(query, &SearchConfig::default()).await
}
