//! Scrapework: a small crawl orchestration engine
//!
//! A [`Crawler`](crawler::Crawler) visits a FIFO frontier of seed URLs, runs an
//! ordered middleware chain over every request, fetches the page, hands the
//! document to a per-URL extractor and accumulates the resulting records. Once
//! the frontier drains the records go to the registered handlers and the job
//! metrics go to the registered reporters.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod middleware;
pub mod output;
pub mod state;

use thiserror::Error;

pub use crawler::fetcher::FetchError;
pub use extract::ExtractionError;
pub use middleware::MiddlewareError;
pub use output::{HandlerError, ReportError};

/// Main error type for a crawl run
///
/// Every variant except configuration errors aborts a run that is already in
/// progress. Reporter failures never show up here; they are logged instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Middleware {middleware} rejected {url}: {source}")]
    Middleware {
        url: String,
        middleware: String,
        source: MiddlewareError,
    },

    #[error("Fetch failed for {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Extraction failed for {url}: {source}")]
    Extraction { url: String, source: ExtractionError },

    #[error("Handler {handler} failed: {source}")]
    Handler {
        handler: String,
        source: HandlerError,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("No seed URLs or seed producer configured")]
    NoSeeds,
}

/// Last path segment of a type name, used as a component's display name
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Crawler, Module};
pub use extract::{Document, Extracted, Extractor, Record};
pub use state::{JobContext, MetadataCollector, PageMetrics};
