//! Extractor for the rich `/html/` result layout.

use super::{collect_records, compile, element_text, first_match, redirect, Skip};
use crate::error::SearchError;
use crate::types::{Layout, SearchResult};
use scraper::{ElementRef, Html, Selector};

/// Result block containers, most specific layout first.
const CONTAINER_SELECTORS: &[&str] = &[
    "div.result",
    "div.results_links",
    "div.web-result",
    "article.result",
];

/// Title anchor inside a block.
const TITLE_SELECTORS: &[&str] = &["a.result__a", "a.result__url", "h2 a", ".result__title a"];

/// Snippet inside a block.
const SNIPPET_SELECTORS: &[&str] = &["a.result__snippet", "div.result__snippet", ".snippet"];

struct Selectors {
    containers: Vec<Selector>,
    titles: Vec<Selector>,
    snippets: Vec<Selector>,
}

impl Selectors {
    fn compile() -> Result<Self, SearchError> {
        Ok(Self {
            containers: compile(CONTAINER_SELECTORS)?,
            titles: compile(TITLE_SELECTORS)?,
            snippets: compile(SNIPPET_SELECTORS)?,
        })
    }
}

/// Parse a rich-layout results page into search results, in page order.
///
/// The first container selector that matches anything decides which
/// elements are result blocks; a page where none match yields no results.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] only if a built-in selector is invalid.
pub fn parse_html_results(html: &str) -> Result<Vec<SearchResult>, SearchError> {
    let selectors = Selectors::compile()?;
    let document = Html::parse_document(html);

    let blocks: Vec<ElementRef<'_>> = selectors
        .containers
        .iter()
        .zip(CONTAINER_SELECTORS)
        .find_map(|(sel, name)| {
            let found: Vec<_> = document.select(sel).collect();
            if found.is_empty() {
                None
            } else {
                tracing::debug!(selector = name, count = found.len(), "matched result blocks");
                Some(found)
            }
        })
        .unwrap_or_default();

    Ok(collect_records(
        Layout::Html,
        blocks.into_iter().map(|block| extract_block(block, &selectors)),
    ))
}

fn extract_block(block: ElementRef<'_>, selectors: &Selectors) -> Result<SearchResult, Skip> {
    let title_el = first_match(block, &selectors.titles).ok_or(Skip::NoTitleElement)?;

    let href = title_el.value().attr("href").unwrap_or_default().trim();
    if href.is_empty() {
        return Err(Skip::EmptyLink);
    }
    if href.to_ascii_lowercase().starts_with("javascript:") {
        return Err(Skip::ScriptLink);
    }
    if href == "#" {
        return Err(Skip::AnchorPlaceholder);
    }
    let link = redirect::resolve_link(href).ok_or(Skip::UnresolvedRedirect)?;

    let title = element_text(title_el);
    if title.is_empty() {
        return Err(Skip::EmptyTitle);
    }

    let description = first_match(block, &selectors.snippets)
        .map(element_text)
        .unwrap_or_default();

    Ok(SearchResult {
        title,
        link,
        description,
    })
}
