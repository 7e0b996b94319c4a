//! Search orchestrator: cache, primary layout, fallback layout, write-back.
//!
//! The steps are strictly sequential because each depends on the previous
//! one. Nothing here returns an error: every failure along the way is logged
//! and ends up as an empty (or cached) result.

use crate::cache::CacheStore;
use crate::config::SearchConfig;
use crate::extract;
use crate::transport::{self, Transport};
use crate::types::{Layout, SearchOutcome, SearchResult};
use tokio_util::sync::CancellationToken;

/// Build the request URL for `query` on `endpoint`.
///
/// The query is percent-encoded into the `q` parameter.
pub fn search_url(endpoint: &str, query: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}q={}", urlencoding::encode(query))
}

/// Runs searches against one transport and one cache.
///
/// `Searcher` is `Send + Sync` whenever its parts are, so independent
/// queries can share it across tasks. The cache is the only shared state.
pub struct Searcher<T, C> {
    config: SearchConfig,
    transport: T,
    cache: C,
}

impl<T: Transport, C: CacheStore> Searcher<T, C> {
    /// Assemble a searcher from its parts.
    pub fn new(config: SearchConfig, transport: T, cache: C) -> Self {
        Self {
            config,
            transport,
            cache,
        }
    }

    /// The cache in use.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Search for `query`, returning results in page order.
    ///
    /// An empty list means either "no results" or "every request failed";
    /// see [`Searcher::search_outcome`] to tell them apart.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.search_outcome(query).await.into_results()
    }

    /// Search for `query`, reporting how the search ended.
    pub async fn search_outcome(&self, query: &str) -> SearchOutcome {
        if let Some(cached) = self.cache.get(query).await {
            return SearchOutcome::Cached(cached);
        }

        tracing::info!(query, "searching DuckDuckGo");
        let mut fetched_any = false;
        let mut found = None;

        for layout in [Layout::Html, Layout::Lite] {
            if layout == Layout::Lite {
                tracing::info!("html layout gave nothing, trying lite layout");
            }
            let Some(body) = self.fetch_layout(layout, query).await else {
                continue;
            };
            fetched_any = true;

            let results = self.extract_layout(layout, &body);
            if !results.is_empty() {
                found = Some((layout, results));
                break;
            }
        }

        match found {
            Some((layout, results)) => {
                self.cache.put(query, &results).await;
                tracing::info!(query, %layout, count = results.len(), "search complete");
                SearchOutcome::Found { layout, results }
            }
            None if fetched_any => {
                tracing::info!(query, "no results found");
                SearchOutcome::NoResults
            }
            None => {
                tracing::warn!(query, "both layouts failed to fetch");
                SearchOutcome::FetchFailed
            }
        }
    }

    /// Like [`Searcher::search_outcome`], but gives up as soon as `cancel`
    /// fires. A cancelled search never writes to the cache.
    pub async fn search_with_cancel(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> SearchOutcome {
        tokio::select! {
            () = cancel.cancelled() => {
                tracing::info!(query, "search cancelled");
                SearchOutcome::Cancelled
            }
            outcome = self.search_outcome(query) => outcome,
        }
    }

    fn endpoint(&self, layout: Layout) -> &str {
        match layout {
            Layout::Html => &self.config.html_url,
            Layout::Lite => &self.config.lite_url,
        }
    }

    async fn fetch_layout(&self, layout: Layout, query: &str) -> Option<String> {
        let url = search_url(self.endpoint(layout), query);
        let body = self.transport.fetch(&url).await?;
        if self.config.dump_html {
            let path = self.config.debug_dir.join(layout.dump_file_name());
            transport::write_dump(&path, &body).await;
        }
        Some(body)
    }

    fn extract_layout(&self, layout: Layout, body: &str) -> Vec<SearchResult> {
        match extract::extract(layout, body) {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(%layout, error = %e, "error extracting results");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheBackend, MemoryCache};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const HTML_PAGE: &str = r#"<html><body>
        <div class="result"><a class="result__a" href="https://one.example/">One</a>
            <a class="result__snippet" href="https://one.example/">First</a></div>
        <div class="result"><a class="result__a" href="https://two.example/">Two</a></div>
    </body></html>"#;

    const LITE_PAGE: &str = r#"<html><body><table>
        <tr><td><a href="https://lite.example/">Lite result</a></td></tr>
        <tr><td>lite snippet</td></tr>
    </table></body></html>"#;

    /// Serves canned bodies by endpoint prefix and records every URL.
    #[derive(Default)]
    struct FakeTransport {
        pages: HashMap<&'static str, &'static str>,
        calls: Mutex<Vec<String>>,
        count: AtomicUsize,
    }

    impl FakeTransport {
        fn with(pages: &[(&'static str, &'static str)]) -> Self {
            Self {
                pages: pages.iter().copied().collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }
    }

    impl Transport for FakeTransport {
        async fn fetch(&self, url: &str) -> Option<String> {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().expect("lock").push(url.to_string());
            self.pages
                .iter()
                .find(|(prefix, _)| url.starts_with(*prefix))
                .map(|(_, body)| body.to_string())
        }
    }

    /// Never answers; only cancellation can end a search using it.
    struct HangingTransport;

    impl Transport for HangingTransport {
        async fn fetch(&self, _url: &str) -> Option<String> {
            std::future::pending::<()>().await;
            None
        }
    }

    fn searcher<T: Transport>(transport: T) -> Searcher<T, MemoryCache> {
        Searcher::new(SearchConfig::default(), transport, MemoryCache::new(86_400))
    }

    #[test]
    fn search_url_percent_encodes_query() {
        assert_eq!(
            search_url("https://duckduckgo.com/html/", "rust & c++ 100%"),
            "https://duckduckgo.com/html/?q=rust%20%26%20c%2B%2B%20100%25"
        );
    }

    #[test]
    fn search_url_appends_to_existing_query() {
        assert_eq!(
            search_url("https://lite.duckduckgo.com/lite/?kl=us-en", "a b"),
            "https://lite.duckduckgo.com/lite/?kl=us-en&q=a%20b"
        );
    }

    #[tokio::test]
    async fn html_layout_results_are_returned_and_cached() {
        let s = searcher(FakeTransport::with(&[("https://duckduckgo.com/html/", HTML_PAGE)]));

        let outcome = s.search_outcome("weather").await;
        let SearchOutcome::Found { layout, results } = outcome else {
            panic!("expected html results");
        };
        assert_eq!(layout, Layout::Html);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].description, "First");
        assert_eq!(s.cache().get("weather").await, Some(results));
        assert_eq!(s.transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn second_search_served_from_cache() {
        let s = searcher(FakeTransport::with(&[("https://duckduckgo.com/html/", HTML_PAGE)]));

        let first = s.search("weather").await;
        let second = s.search_outcome("weather").await;

        assert_eq!(second, SearchOutcome::Cached(first));
        assert_eq!(s.transport.count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn falls_back_to_lite_when_html_is_empty() {
        let s = searcher(FakeTransport::with(&[
            ("https://duckduckgo.com/html/", "<html><body>nothing here</body></html>"),
            ("https://lite.duckduckgo.com/lite/", LITE_PAGE),
        ]));

        let outcome = s.search_outcome("rust").await;
        assert_eq!(
            outcome,
            SearchOutcome::Found {
                layout: Layout::Lite,
                results: vec![SearchResult {
                    title: "Lite result".into(),
                    link: "https://lite.example/".into(),
                    description: "lite snippet".into(),
                }],
            }
        );
        let calls = s.transport.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].starts_with("https://lite.duckduckgo.com/lite/?q=rust"));
    }

    #[tokio::test]
    async fn falls_back_to_lite_when_html_fetch_fails() {
        let s = searcher(FakeTransport::with(&[(
            "https://lite.duckduckgo.com/lite/",
            LITE_PAGE,
        )]));
        let results = s.search("rust").await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn both_fetches_failing_is_fetch_failed() {
        let s = searcher(FakeTransport::default());
        assert_eq!(s.search_outcome("nothing").await, SearchOutcome::FetchFailed);
        assert!(!s.cache().contains("nothing").await);
    }

    #[tokio::test]
    async fn empty_pages_are_no_results() {
        let s = searcher(FakeTransport::with(&[
            ("https://duckduckgo.com/html/", "<html></html>"),
            ("https://lite.duckduckgo.com/lite/", "<html></html>"),
        ]));
        assert_eq!(s.search_outcome("zzz").await, SearchOutcome::NoResults);
        assert!(s.search("zzz").await.is_empty());
        assert!(!s.cache().contains("zzz").await);
    }

    #[tokio::test]
    async fn disabled_cache_always_fetches() {
        let transport = FakeTransport::with(&[("https://duckduckgo.com/html/", HTML_PAGE)]);
        let s = Searcher::new(SearchConfig::default(), transport, CacheBackend::Disabled);
        s.search("q").await;
        s.search("q").await;
        assert_eq!(s.transport.count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancellation_returns_promptly() {
        let s = searcher(HangingTransport);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(
            s.search_with_cancel("slow", &cancel).await,
            SearchOutcome::Cancelled
        );
        assert!(!s.cache().contains("slow").await);
    }

    #[tokio::test]
    async fn uncancelled_search_completes() {
        let s = searcher(FakeTransport::with(&[("https://duckduckgo.com/html/", HTML_PAGE)]));
        let cancel = CancellationToken::new();
        let outcome = s.search_with_cancel("q", &cancel).await;
        assert!(outcome.has_results());
    }

    #[tokio::test]
    async fn dump_html_writes_fetched_pages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = SearchConfig {
            dump_html: true,
            debug_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let transport = FakeTransport::with(&[("https://duckduckgo.com/html/", HTML_PAGE)]);
        let s = Searcher::new(config, transport, MemoryCache::new(86_400));

        s.search("dump").await;

        let dumped = std::fs::read_to_string(dir.path().join("debug_html_content.html"))
            .expect("page dumped");
        assert_eq!(dumped, HTML_PAGE);
        assert!(!dir.path().join("debug_lite_content.html").exists());
    }

    #[test]
    fn searcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Searcher<crate::transport::HttpTransport, CacheBackend>>();
    }
}
