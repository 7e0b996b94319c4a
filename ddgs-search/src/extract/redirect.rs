//! Unwrapping of DuckDuckGo redirect and tracking links.
//!
//! Result anchors on the rich layout often point at DuckDuckGo itself, e.g.
//! `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=…`, with the real
//! destination carried in a query parameter.

use url::{form_urlencoded, Url};

/// Path fragments of DuckDuckGo's redirect endpoints.
const REDIRECT_PATHS: &[&str] = &["/l/?", "/l.js?", "/y.js?"];

/// Query parameters carrying the destination, in priority order.
const DESTINATION_PARAMS: &[&str] = &["uddg", "u"];

/// Host serving the redirect endpoints; subdomains count too.
const DUCKDUCKGO_HOST: &str = "duckduckgo.com";

/// Whether `href` is a redirect wrapper rather than a direct link.
///
/// Only links back to DuckDuckGo (root-relative, or on a `duckduckgo.com`
/// host) can be wrappers; a third-party `/l/?` path is a real result.
pub fn is_redirect(href: &str) -> bool {
    if !points_at_duckduckgo(href) {
        return false;
    }
    REDIRECT_PATHS.iter().any(|p| href.contains(p))
        || query_of(href).is_some_and(|q| {
            form_urlencoded::parse(q.as_bytes()).any(|(key, _)| key == "uddg")
        })
}

fn points_at_duckduckgo(href: &str) -> bool {
    if href.starts_with('/') && !href.starts_with("//") {
        return true;
    }
    let parsed = match href.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{rest}")),
        None => Url::parse(href),
    };
    parsed.ok().is_some_and(|url| {
        url.host_str().is_some_and(|host| {
            host == DUCKDUCKGO_HOST
                || host
                    .strip_suffix(DUCKDUCKGO_HOST)
                    .is_some_and(|sub| sub.ends_with('.'))
        })
    })
}

/// Decode the destination of a redirect wrapper.
///
/// Returns `None` when no destination parameter is present (ad and
/// click-tracking links look like this) or when it is empty.
pub fn decode_redirect(href: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query_of(href)?.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    DESTINATION_PARAMS.iter().find_map(|wanted| {
        pairs
            .iter()
            .find(|(key, value)| key.as_str() == *wanted && !value.is_empty())
            .map(|(_, value)| value.clone())
    })
}

/// Resolve a raw result `href` into a destination link.
///
/// Redirect wrappers are decoded; protocol-relative links get `https:`.
/// Anything else is returned unchanged. `None` means "wrapper without a
/// destination".
pub fn resolve_link(href: &str) -> Option<String> {
    if is_redirect(href) {
        return decode_redirect(href);
    }
    if href.starts_with("//") {
        return Some(format!("https:{href}"));
    }
    Some(href.to_string())
}

fn query_of(href: &str) -> Option<&str> {
    let (_, rest) = href.split_once('?')?;
    Some(rest.split_once('#').map_or(rest, |(query, _)| query))
}
