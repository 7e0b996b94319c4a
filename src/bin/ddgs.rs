//! CLI binary for ddgs.

use anyhow::Context;
use clap::Parser;
use ddgs::Cli;
use ddgs::cli::apply_limit;
use ddgs::output::{display_results, save_results_to_file, save_results_to_json};
use ddgs_search::SearchOutcome;
use std::io::{BufRead, Write};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log file written to the working directory alongside console logging.
const LOG_FILE: &str = "ddgs.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(&cli);

    let config = cli.search_config().context("invalid search configuration")?;
    let query = match cli.query_text() {
        Some(query) => query,
        None => prompt_query()?,
    };
    if query.is_empty() {
        anyhow::bail!("no search query given");
    }

    println!("Performing DuckDuckGo search: {query}");
    println!("Please wait...");

    let searcher = ddgs_search::searcher(config)?;

    // Handle Ctrl+C
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, cancelling search...");
            cancel_clone.cancel();
        }
    });

    let outcome = searcher.search_with_cancel(&query, &cancel).await;
    if outcome == SearchOutcome::Cancelled {
        println!("Search cancelled.");
        return Ok(());
    }

    let mut results = outcome.into_results();
    apply_limit(&mut results, cli.limit);

    if results.is_empty() {
        println!("Search failed or no results found.");
        println!("Please check your internet connection and try again.");
        return Ok(());
    }

    display_results(&results, cli.colorize());

    if let Some(path) = &cli.output {
        match save_results_to_file(&results, path) {
            Ok(true) => println!("Results saved to {}", path.display()),
            Ok(false) => {}
            Err(e) => tracing::error!(path = %path.display(), error = %e, "error saving results"),
        }
    }
    if let Some(path) = &cli.json {
        match save_results_to_json(&results, path) {
            Ok(true) => println!("Results saved to JSON format: {}", path.display()),
            Ok(false) => {}
            Err(e) => tracing::error!(path = %path.display(), error = %e, "error saving JSON"),
        }
    }

    Ok(())
}

/// Console logging to stderr plus a plain log file in the working directory.
///
/// `RUST_LOG` overrides the default filter. If the log file cannot be
/// opened, only console logging is installed.
fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));

    let (file_layer, guard) = match Builder::new()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(".")
    {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("warning: cannot open {LOG_FILE}: {e}");
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn prompt_query() -> anyhow::Result<String> {
    print!("Enter search query: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read query from stdin")?;
    Ok(line.trim().to_string())
}
