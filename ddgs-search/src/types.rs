//! Core types for search results, page layouts and search outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single organic search result, in page rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Visible title of the result. Never empty.
    pub title: String,
    /// Absolute destination URL, with any redirect wrapper already removed.
    pub link: String,
    /// Snippet shown under the title. Empty when the page had none.
    pub description: String,
}

/// The two server-rendered page templates DuckDuckGo serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    /// Rich layout at `/html/`: result blocks with titles and snippets.
    Html,
    /// Tabular layout at `lite.duckduckgo.com`, used when the rich page fails.
    Lite,
}

impl Layout {
    /// Returns the human-readable name of this layout.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Lite => "lite",
        }
    }

    /// File name used when dumping a fetched page of this layout.
    pub fn dump_file_name(&self) -> &'static str {
        match self {
            Self::Html => "debug_html_content.html",
            Self::Lite => "debug_lite_content.html",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A persisted set of results for one query.
///
/// Serialised as `{"query", "timestamp", "results"}` with an RFC 3339
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The query text exactly as searched.
    pub query: String,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
    /// Results in page order.
    pub results: Vec<SearchResult>,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(query: &str, results: Vec<SearchResult>) -> Self {
        Self {
            query: query.to_string(),
            timestamp: Utc::now(),
            results,
        }
    }

    /// Whether this entry is older than `ttl_seconds` at `now`.
    ///
    /// A TTL too large to represent as a duration never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl_seconds: u64) -> bool {
        let Some(ttl) = i64::try_from(ttl_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
        else {
            return false;
        };
        now.signed_duration_since(self.timestamp) > ttl
    }
}

/// How a search ended.
///
/// [`crate::Searcher::search`] flattens this into a plain result list, so
/// "nothing found" and "every request failed" both read as empty there.
/// Use [`crate::Searcher::search_outcome`] when the difference matters.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Served from the cache without any request.
    Cached(Vec<SearchResult>),
    /// Fetched and extracted from the given layout.
    Found {
        layout: Layout,
        results: Vec<SearchResult>,
    },
    /// At least one page was fetched, but neither extractor found a result.
    NoResults,
    /// Neither endpoint returned a usable body.
    FetchFailed,
    /// The caller cancelled the search before it finished.
    Cancelled,
}

impl SearchOutcome {
    /// Consume the outcome, returning its results (empty for every failure).
    pub fn into_results(self) -> Vec<SearchResult> {
        match self {
            Self::Cached(results) | Self::Found { results, .. } => results,
            Self::NoResults | Self::FetchFailed | Self::Cancelled => Vec::new(),
        }
    }

    /// Whether the outcome carries at least one result.
    pub fn has_results(&self) -> bool {
        match self {
            Self::Cached(results) | Self::Found { results, .. } => !results.is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SearchResult {
        SearchResult {
            title: "Example".into(),
            link: "https://example.com".into(),
            description: "An example page".into(),
        }
    }

    #[test]
    fn search_result_serialises_expected_keys() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["title"], "Example");
        assert_eq!(json["link"], "https://example.com");
        assert_eq!(json["description"], "An example page");
    }

    #[test]
    fn layout_display() {
        assert_eq!(Layout::Html.to_string(), "html");
        assert_eq!(Layout::Lite.to_string(), "lite");
    }

    #[test]
    fn layout_dump_names_differ() {
        assert_ne!(Layout::Html.dump_file_name(), Layout::Lite.dump_file_name());
    }

    #[test]
    fn fresh_entry_not_expired() {
        let entry = CacheEntry::new("rust", vec![sample()]);
        assert!(!entry.is_expired_at(Utc::now(), 86_400));
    }

    #[test]
    fn old_entry_expired() {
        let mut entry = CacheEntry::new("rust", vec![sample()]);
        entry.timestamp = Utc::now() - chrono::Duration::hours(25);
        assert!(entry.is_expired_at(Utc::now(), 86_400));
    }

    #[test]
    fn entry_exactly_at_ttl_is_still_valid() {
        let now = Utc::now();
        let mut entry = CacheEntry::new("rust", vec![sample()]);
        entry.timestamp = now - chrono::Duration::seconds(86_400);
        assert!(!entry.is_expired_at(now, 86_400));
    }

    #[test]
    fn unrepresentable_ttl_never_expires() {
        let mut entry = CacheEntry::new("rust", vec![sample()]);
        entry.timestamp = Utc::now() - chrono::Duration::days(365 * 50);
        assert!(!entry.is_expired_at(Utc::now(), u64::MAX));
        assert!(!entry.is_expired_at(Utc::now(), i64::MAX as u64));
    }

    #[test]
    fn cache_entry_timestamp_is_iso8601() {
        let entry = CacheEntry::new("rust", vec![sample()]);
        let json = serde_json::to_value(&entry).expect("serialize");
        let ts = json["timestamp"].as_str().expect("timestamp is a string");
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn outcome_into_results() {
        let found = SearchOutcome::Found {
            layout: Layout::Lite,
            results: vec![sample()],
        };
        assert!(found.has_results());
        assert_eq!(found.into_results().len(), 1);
        assert!(SearchOutcome::FetchFailed.into_results().is_empty());
        assert!(!SearchOutcome::NoResults.has_results());
        assert!(!SearchOutcome::Cancelled.has_results());
    }
}
