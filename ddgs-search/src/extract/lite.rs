//! Extractor for the tabular lite layout.
//!
//! The lite page is one big table. A result is a row holding the title
//! link, usually followed by a link-free row holding the snippet.

use super::{collect_records, compile, element_text, redirect, Skip};
use crate::error::SearchError;
use crate::types::{Layout, SearchResult};
use scraper::{ElementRef, Html, Selector};

struct Selectors {
    rows: Selector,
    link: Selector,
    cell: Selector,
}

impl Selectors {
    fn compile() -> Result<Self, SearchError> {
        let [rows, link, cell]: [Selector; 3] = compile(&["table tr", "a", "td"])?
            .try_into()
            .map_err(|_| SearchError::Parse("lite selectors incomplete".into()))?;
        Ok(Self { rows, link, cell })
    }
}

/// Parse a lite-layout results page into search results, in page order.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] only if a built-in selector is invalid.
pub fn parse_lite_results(html: &str) -> Result<Vec<SearchResult>, SearchError> {
    let selectors = Selectors::compile()?;
    let document = Html::parse_document(html);

    let rows = document
        .select(&selectors.rows)
        .filter_map(|row| row.select(&selectors.link).next().map(|link| (row, link)));

    Ok(collect_records(
        Layout::Lite,
        rows.map(|(row, link)| extract_row(row, link, &selectors)),
    ))
}

fn extract_row(
    row: ElementRef<'_>,
    link_el: ElementRef<'_>,
    selectors: &Selectors,
) -> Result<SearchResult, Skip> {
    let href = link_el.value().attr("href").unwrap_or_default().trim();
    if href.is_empty() {
        return Err(Skip::EmptyLink);
    }
    // Root-relative links are pagination and settings, not results.
    if href.starts_with('/') && !href.starts_with("//") {
        return Err(Skip::InternalLink);
    }
    let link = redirect::resolve_link(href).ok_or(Skip::UnresolvedRedirect)?;

    let title = element_text(link_el);
    if title.is_empty() {
        return Err(Skip::EmptyTitle);
    }

    Ok(SearchResult {
        title,
        link,
        description: description_for(row, selectors),
    })
}

/// Snippet from the row right after `row`, if that row has no link of its own.
fn description_for(row: ElementRef<'_>, selectors: &Selectors) -> String {
    let Some(next) = row
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "tr")
    else {
        return String::new();
    };

    if next.select(&selectors.link).next().is_some() {
        return String::new();
    }

    next.select(&selectors.cell)
        .map(element_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}
