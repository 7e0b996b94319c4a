//! HTML result extractors for the two DuckDuckGo page layouts.
//!
//! Both extractors are pure functions over page text. Markup drifts, so
//! every lookup walks an ordered list of candidate selectors and takes the
//! first that matches. A result block that cannot be turned into a record
//! is skipped with a [`Skip`] reason instead of aborting the page.

pub mod html;
pub mod lite;
pub mod redirect;

pub use html::parse_html_results;
pub use lite::parse_lite_results;

use crate::error::SearchError;
use crate::types::{Layout, SearchResult};
use scraper::{ElementRef, Selector};
use std::fmt;

/// Why a result block produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// None of the title selectors matched inside the block.
    NoTitleElement,
    /// The title element has no visible text.
    EmptyTitle,
    /// `href` missing or empty.
    EmptyLink,
    /// `javascript:` pseudo-link.
    ScriptLink,
    /// Bare `#` anchor.
    AnchorPlaceholder,
    /// Redirect wrapper without a destination parameter.
    UnresolvedRedirect,
    /// Root-relative link to another DuckDuckGo page.
    InternalLink,
}

impl Skip {
    /// Stable identifier used in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoTitleElement => "no_title_element",
            Self::EmptyTitle => "empty_title",
            Self::EmptyLink => "empty_link",
            Self::ScriptLink => "script_link",
            Self::AnchorPlaceholder => "anchor_placeholder",
            Self::UnresolvedRedirect => "unresolved_redirect",
            Self::InternalLink => "internal_link",
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run the extractor that matches `layout`.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] only if a built-in selector is invalid.
pub fn extract(layout: Layout, html: &str) -> Result<Vec<SearchResult>, SearchError> {
    match layout {
        Layout::Html => parse_html_results(html),
        Layout::Lite => parse_lite_results(html),
    }
}

/// Compile an ordered selector list, keeping the order.
pub(crate) fn compile(selectors: &[&str]) -> Result<Vec<Selector>, SearchError> {
    selectors
        .iter()
        .map(|s| {
            Selector::parse(s)
                .map_err(|e| SearchError::Parse(format!("invalid selector {s:?}: {e:?}")))
        })
        .collect()
}

/// First descendant of `scope` matched by the earliest selector that matches at all.
pub(crate) fn first_match<'a>(scope: ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|sel| scope.select(sel).next())
}

/// Visible text of an element, trimmed.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Collect per-block outcomes, logging each skip, and keep source order.
pub(crate) fn collect_records(
    layout: Layout,
    outcomes: impl Iterator<Item = Result<SearchResult, Skip>>,
) -> Vec<SearchResult> {
    let mut results = Vec::new();
    let mut skipped = 0usize;
    for (index, outcome) in outcomes.enumerate() {
        match outcome {
            Ok(result) => results.push(result),
            Err(reason) => {
                skipped += 1;
                tracing::debug!(%layout, index, %reason, "skipped result block");
            }
        }
    }
    tracing::debug!(%layout, count = results.len(), skipped, "results parsed");
    results
}
