use std::time::Duration;
use thiserror::Error;

pub mod config;
pub mod fetch;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod runner;
pub mod scraper;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use pipeline::CasePipeline;
pub use runner::QueryRunner;
pub use types::{CaseDocument, CaseSummary, SearchResult};

/// The `PipelineError` enum represents various errors that can occur while
/// searching, fetching and summarizing court cases.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Represents an error that occurs during an HTTP request.
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Represents an error that occurs when the concurrency gate has been closed.
    #[error("Concurrency gate closed")]
    GateClosed,
    /// Represents an error that occurs when a CSS selector fails to parse.
    #[error("Invalid selector: {0}")]
    SelectorError(String),
    /// Represents an error that occurs while building the query runtime.
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] std::io::Error),
}

/// A type alias for `Result` with the `PipelineError` error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

// Constants

/// The timeout applied to every outbound HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// The maximum number of outbound requests allowed in flight at once.
pub const MAX_CONCURRENT_REQUESTS: usize = 100;
/// The maximum number of characters of case text handed to the summarizer.
pub const MAX_CASE_TEXT_LENGTH: usize = 9500;
/// The maximum number of search results taken from one results page.
pub const MAX_SEARCH_RESULTS: usize = 10;
/// The number of worker slots for compute-bound summarization.
pub const SUMMARY_WORKERS: usize = 10;
