//! Error types for the ddgs-search crate.
//!
//! All errors use stable string messages suitable for display to users.
//! None of them reach the caller of [`crate::Searcher::search`]: transport,
//! cache and extraction faults are logged and degrade to an empty result.
//! Only configuration loading and validation return them.

/// Errors that can occur while configuring or running a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request could not be built or sent.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse result page HTML.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A cache entry could not be read, decoded or written.
    #[error("cache error: {0}")]
    Cache(String),

    /// Filesystem failure (config file, diagnostic dumps).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ddgs-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
