//! Console display and file export of search results.

use ddgs_search::SearchResult;
use std::fmt::Write as _;
use std::io::{self, IsTerminal};
use std::path::Path;

/// ANSI escape sequences for each part of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub title: &'static str,
    pub link: &'static str,
    pub description: &'static str,
    pub reset: &'static str,
}

impl Palette {
    /// Bold cyan titles, green links, light grey descriptions.
    pub const ANSI: Palette = Palette {
        title: "\x1b[1;36m",
        link: "\x1b[0;32m",
        description: "\x1b[0;37m",
        reset: "\x1b[0m",
    };

    pub const PLAIN: Palette = Palette {
        title: "",
        link: "",
        description: "",
        reset: "",
    };

    pub fn new(colorize: bool) -> Self {
        if colorize { Self::ANSI } else { Self::PLAIN }
    }
}

/// Whether the terminal should get colours: stdout is a TTY and `NO_COLOR`
/// is unset or empty.
pub fn colors_supported() -> bool {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    !no_color && io::stdout().is_terminal()
}

/// Render results as a numbered console listing.
pub fn render_results(results: &[SearchResult], palette: Palette) -> String {
    let mut out = format!("\nFound {} results:\n\n", results.len());
    let Palette {
        title,
        link,
        description,
        reset,
    } = palette;

    for (i, r) in results.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{}. {title}{}{reset}", i + 1, r.title);
        let _ = writeln!(out, "   {link}{}{reset}", r.link);
        let _ = writeln!(out, "   {description}{}{reset}", r.description);
        out.push('\n');
    }
    out
}

/// Print results to stdout.
pub fn display_results(results: &[SearchResult], colorize: bool) {
    if results.is_empty() {
        println!("No results found or an error occurred.");
        return;
    }
    print!("{}", render_results(results, Palette::new(colorize)));
}

/// Plain-text report: a header, then each result numbered.
pub fn render_text_report(results: &[SearchResult]) -> String {
    let mut out = format!("DuckDuckGo Search Results ({} items)\n", results.len());
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");
    for (i, r) in results.iter().enumerate() {
        let _ = write!(
            out,
            "{}. {}\n   {}\n   {}\n\n",
            i + 1,
            r.title,
            r.link,
            r.description
        );
    }
    out
}

/// Write the plain-text report to `path`.
///
/// Returns `Ok(false)` without touching the filesystem when `results` is
/// empty.
///
/// # Errors
///
/// Returns any I/O error from writing the file.
pub fn save_results_to_file(results: &[SearchResult], path: &Path) -> io::Result<bool> {
    if results.is_empty() {
        return Ok(false);
    }
    std::fs::write(path, render_text_report(results))?;
    tracing::debug!(path = %path.display(), count = results.len(), "saved text report");
    Ok(true)
}

/// Write results to `path` as a pretty-printed JSON array.
///
/// Returns `Ok(false)` without touching the filesystem when `results` is
/// empty.
///
/// # Errors
///
/// Returns any I/O or serialisation error.
pub fn save_results_to_json(results: &[SearchResult], path: &Path) -> io::Result<bool> {
    if results.is_empty() {
        return Ok(false);
    }
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    tracing::debug!(path = %path.display(), count = results.len(), "saved JSON export");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<SearchResult> {
        vec![
            SearchResult {
                title: "Rust".into(),
                link: "https://www.rust-lang.org/".into(),
                description: "A language empowering everyone.".into(),
            },
            SearchResult {
                title: "Café guide, ünïcode".into(),
                link: "https://example.org/cafe".into(),
                description: String::new(),
            },
        ]
    }

    #[test]
    fn plain_render_is_numbered() {
        let text = render_results(&sample(), Palette::PLAIN);
        assert!(text.starts_with("\nFound 2 results:\n\n"));
        assert!(text.contains("1. Rust\n   https://www.rust-lang.org/\n   A language empowering everyone.\n\n"));
        assert!(text.contains("2. Café guide, ünïcode\n"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn coloured_render_wraps_each_field() {
        let text = render_results(&sample()[..1], Palette::ANSI);
        assert!(text.contains("1. \x1b[1;36mRust\x1b[0m\n"));
        assert!(text.contains("   \x1b[0;32mhttps://www.rust-lang.org/\x1b[0m\n"));
    }

    #[test]
    fn palette_selection() {
        assert_eq!(Palette::new(true), Palette::ANSI);
        assert_eq!(Palette::new(false), Palette::PLAIN);
    }

    #[test]
    fn text_report_layout() {
        let report = render_text_report(&sample());
        let mut lines = report.lines();
        assert_eq!(lines.next(), Some("DuckDuckGo Search Results (2 items)"));
        assert_eq!(lines.next(), Some("=".repeat(50).as_str()));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), Some("1. Rust"));
        assert_eq!(lines.next(), Some("   https://www.rust-lang.org/"));
    }

    #[test]
    fn save_text_writes_report() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("results.txt");
        assert!(save_results_to_file(&sample(), &path).expect("write"));
        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, render_text_report(&sample()));
    }

    #[test]
    fn save_json_is_pretty_array_with_raw_unicode() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("results.json");
        assert!(save_results_to_json(&sample(), &path).expect("write"));

        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.starts_with("[\n  {"));
        assert!(written.contains("Café guide, ünïcode"));
        let parsed: Vec<SearchResult> = serde_json::from_str(&written).expect("valid json");
        assert_eq!(parsed, sample());
    }

    #[test]
    fn empty_results_write_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let text = dir.path().join("empty.txt");
        let json = dir.path().join("empty.json");
        assert!(!save_results_to_file(&[], &text).expect("no-op"));
        assert!(!save_results_to_json(&[], &json).expect("no-op"));
        assert!(!text.exists());
        assert!(!json.exists());
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("missing").join("out.txt");
        assert!(save_results_to_file(&sample(), &path).is_err());
    }
}
