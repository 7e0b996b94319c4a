//! ddgs: DuckDuckGo search from the terminal.
//!
//! The search pipeline itself lives in the `ddgs-search` crate. This crate
//! holds the outer surfaces around it:
//! - **cli**: argument parsing and merging flags into a [`ddgs_search::SearchConfig`]
//! - **output**: console display plus plain-text and JSON export

pub mod cli;
pub mod output;

pub use cli::Cli;
