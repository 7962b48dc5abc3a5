//! Handler and reporter traits and their errors
//!
//! Handlers persist the complete record set once the crawl loop has finished.
//! Reporters summarize the finished job for humans.

use crate::extract::Record;
use crate::short_type_name;
use crate::state::JobContext;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while persisting records
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Errors that can occur while reporting
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Report endpoint returned status {0}")]
    Status(u16),

    #[error("Failed to format report: {0}")]
    Format(String),
}

/// Result type for handler operations
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Result type for reporter operations
pub type ReportResult<T> = Result<T, ReportError>;

/// A sink consuming the complete record set after a crawl finishes
///
/// Handlers run in registration order. The first failure stops the remaining
/// handlers and fails the run.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Persists the records
    ///
    /// # Arguments
    ///
    /// * `ctx` - The job context; handlers may add values to its collector
    /// * `records` - Every record extracted during the run, in visit order
    async fn process(&self, ctx: &mut JobContext, records: &[Record]) -> HandlerResult<()>;
}

/// A sink summarizing job metrics for human consumption
///
/// Reporter failures are logged by the crawler and never fail the run.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Reports on the finished job
    async fn report(&self, ctx: &JobContext) -> ReportResult<()>;
}
