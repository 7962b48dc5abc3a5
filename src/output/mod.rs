//! Record handlers and job reporters
//!
//! This module handles:
//! - Persisting the extracted records (JSON file, SQLite, S3)
//! - Summarizing finished jobs (log, markdown, Slack)

mod json_file;
mod markdown;
mod metadata;
mod s3;
mod slack;
mod sqlite_output;
pub mod stats;
mod traits;

pub use json_file::JsonFileHandler;
pub use markdown::{format_markdown_summary, generate_markdown_summary, MarkdownReporter};
pub use metadata::MetadataHandler;
pub use s3::S3Handler;
pub use slack::{format_slack_message, SlackReporter};
pub use sqlite_output::SqliteHandler;
pub use stats::{CrawlSummary, LogReporter};
pub use traits::{Handler, HandlerError, HandlerResult, ReportError, ReportResult, Reporter};
