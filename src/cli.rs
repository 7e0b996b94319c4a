//! Command-line surface for the `ddgs` binary.

use clap::Parser;
use ddgs_search::{SearchConfig, SearchResult};
use std::path::PathBuf;

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "ddgs=info,ddgs_search=info";

/// Log filter used with `--verbose` when `RUST_LOG` is unset.
pub const VERBOSE_LOG_FILTER: &str = "ddgs=debug,ddgs_search=debug";

/// DuckDuckGo search without API keys or getting blocked.
#[derive(Debug, Parser)]
#[command(name = "ddgs", version, about)]
pub struct Cli {
    /// Search query (prompted for if omitted).
    pub query: Vec<String>,

    /// Rotate through the proxies listed in the configuration file.
    #[arg(short, long)]
    pub proxy: bool,

    /// Neither read nor write the result cache.
    #[arg(short, long)]
    pub no_cache: bool,

    /// Maximum attempts per page [default: 5].
    #[arg(short, long, value_name = "N")]
    pub retries: Option<u32>,

    /// Save results to a plain-text file.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Save results to a JSON file.
    #[arg(short, long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Debug logging, and dump every fetched page to the debug directory.
    #[arg(short, long)]
    pub verbose: bool,

    /// Show at most N results (0 shows all).
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    pub limit: usize,

    /// Path to a TOML search configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable ANSI colours in console output.
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// The query words joined with spaces, or `None` if there are none.
    pub fn query_text(&self) -> Option<String> {
        let joined = self.query.join(" ");
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Build the search configuration: the config file (or defaults) with
    /// command-line flags layered on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the merged configuration is invalid.
    pub fn search_config(&self) -> ddgs_search::Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::from_file(path)?,
            None => SearchConfig::default(),
        };

        if self.no_cache {
            config.use_cache = false;
        }
        if self.proxy {
            config.use_proxy = true;
        }
        if let Some(retries) = self.retries {
            config.max_retries = retries;
        }
        if self.verbose {
            config.dump_html = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Default tracing filter for this invocation.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        }
    }

    /// Whether console output should carry ANSI colours.
    pub fn colorize(&self) -> bool {
        !self.no_color && crate::output::colors_supported()
    }
}

/// Keep only the first `limit` results; `0` keeps everything.
pub fn apply_limit(results: &mut Vec<SearchResult>, limit: usize) {
    if limit > 0 {
        results.truncate(limit);
    }
}
