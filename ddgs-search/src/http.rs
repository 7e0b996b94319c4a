//! HTTP client construction with User-Agent and proxy rotation.
//!
//! A fresh [`reqwest::Client`] is built for every attempt so each retry can
//! present a different browser identity and exit through a different proxy.
//! All random choices take the caller's RNG so tests can seed them.

use crate::config::SearchConfig;
use crate::error::SearchError;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per request.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANG: &str = "en-US,en;q=0.9";

/// Proxy entries containing this host are shipped placeholders, not real proxies.
const PLACEHOLDER_PROXY_HOST: &str = "example.com";

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    USER_AGENTS
        .choose(rng)
        .copied()
        // The pool is a non-empty const.
        .unwrap_or(USER_AGENTS[0])
}

/// Pick the User-Agent for one attempt: the configured one, else a random one.
pub fn pick_user_agent<R: Rng + ?Sized>(config: &SearchConfig, rng: &mut R) -> String {
    match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent(rng).to_owned(),
    }
}

/// Pick a proxy for one attempt.
///
/// Returns `None` when proxying is disabled, or when the pool holds nothing
/// but placeholders. The latter is logged since the caller asked for a
/// proxy and is getting a direct connection instead.
pub fn pick_proxy<R: Rng + ?Sized>(config: &SearchConfig, rng: &mut R) -> Option<String> {
    if !config.use_proxy {
        return None;
    }

    let usable: Vec<&String> = config
        .proxies
        .iter()
        .filter(|p| !p.contains(PLACEHOLDER_PROXY_HOST))
        .collect();

    match usable.choose(rng) {
        Some(proxy) => Some((*proxy).clone()),
        None => {
            tracing::warn!("no usable proxies configured, using direct connection");
            None
        }
    }
}

/// Browser-like headers sent with every request.
pub fn browser_headers(config: &SearchConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANG));
    match HeaderValue::from_str(&config.referer) {
        Ok(referer) => {
            headers.insert(REFERER, referer);
        }
        Err(_) => tracing::warn!("referer is not a valid header value, omitting it"),
    }
    headers
}

/// Build a [`reqwest::Client`] for a single request attempt.
///
/// The client has:
/// - Cookie store enabled
/// - Timeout from config
/// - The given User-Agent and the default browser headers
/// - The given proxy, if any. An unusable proxy URL is logged and skipped.
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(
    config: &SearchConfig,
    user_agent: &str,
    proxy: Option<&str>,
) -> Result<reqwest::Client, SearchError> {
    let mut builder = reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(user_agent)
        .default_headers(browser_headers(config))
        .redirect(reqwest::redirect::Policy::limited(10));

    if let Some(proxy_url) = proxy {
        match reqwest::Proxy::all(proxy_url) {
            Ok(proxy) => builder = builder.proxy(proxy),
            Err(e) => tracing::warn!(proxy = proxy_url, error = %e, "invalid proxy, using direct connection"),
        }
    }

    builder
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}
