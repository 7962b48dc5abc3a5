//! Job-scoped state shared by every component of a crawl run
//!
//! # Components
//!
//! - `JobContext`: per-run bundle handed to middleware, extractors, handlers and reporters
//! - `MetadataCollector`: named aggregates plus the ordered per-page metrics list

mod collector;
mod context;

// Re-export main types
pub use collector::{MetadataCollector, PageMetrics, DURATION, ITEMS_COUNT, PAGES_VISITED};
pub use context::{JobContext, Variables};
