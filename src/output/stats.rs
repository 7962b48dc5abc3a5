//! Job summary shared by the reporters
//!
//! This module turns a finished [`JobContext`] into a flat summary and
//! provides the log-based reporter.

use crate::output::traits::{ReportResult, Reporter};
use crate::state::{JobContext, PageMetrics, DURATION, ITEMS_COUNT, PAGES_VISITED};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Summary statistics for a finished crawl job
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Job metadata
    pub job_name: String,
    pub started_at: String,
    pub duration: Option<Duration>,

    // Aggregates
    pub pages_visited: u64,
    pub items_count: u64,

    // Per-page entries in visit order
    pub pages: Vec<PageMetrics>,

    // Any other collector values, sorted by key
    pub extra: BTreeMap<String, Value>,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots the collector of a job context
    pub fn from_context(ctx: &JobContext) -> Self {
        let collector = &ctx.collector;
        let extra = collector
            .values()
            .filter(|(key, _)| ![ITEMS_COUNT, PAGES_VISITED, DURATION].contains(key))
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();

        Self {
            job_name: ctx.job_name().to_string(),
            started_at: ctx.started_at().to_rfc3339(),
            duration: collector.duration(),
            pages_visited: collector.pages_visited(),
            items_count: collector.items_count(),
            pages: collector.pages().to_vec(),
            extra,
        }
    }

    /// Average number of records per visited page
    pub fn items_per_page(&self) -> f64 {
        if self.pages_visited == 0 {
            return 0.0;
        }
        self.items_count as f64 / self.pages_visited as f64
    }

    /// Pages fetched per second over the whole crawl loop
    pub fn pages_per_second(&self) -> f64 {
        match self.duration {
            Some(d) if d.as_secs_f64() > 0.0 => self.pages_visited as f64 / d.as_secs_f64(),
            _ => 0.0,
        }
    }

    /// The page whose iteration took longest
    pub fn slowest_page(&self) -> Option<&PageMetrics> {
        self.pages.iter().max_by_key(|p| p.duration)
    }

    /// Duration formatted in seconds, or "unknown" before the loop finished
    pub fn formatted_duration(&self) -> String {
        self.duration
            .map(|d| format!("{:.2}s", d.as_secs_f64()))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Logs the job summary and one line per page
#[derive(Debug, Clone, Copy)]
pub struct LogReporter {
    per_page: bool,
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogReporter {
    pub fn new() -> Self {
        Self { per_page: true }
    }

    /// Only logs the aggregate line
    pub fn aggregates_only() -> Self {
        Self { per_page: false }
    }
}

#[async_trait]
impl Reporter for LogReporter {
    async fn report(&self, ctx: &JobContext) -> ReportResult<()> {
        let summary = CrawlSummary::from_context(ctx);

        tracing::info!(
            parent: ctx.span(),
            "Crawl summary: {} pages visited, {} items extracted in {} ({:.2} items/page)",
            summary.pages_visited,
            summary.items_count,
            summary.formatted_duration(),
            summary.items_per_page()
        );

        if self.per_page {
            for page in &summary.pages {
                tracing::info!(
                    parent: ctx.span(),
                    "  {} - {} items in {:?}",
                    page.url,
                    page.item_count,
                    page.duration
                );
            }
        }

        for (key, value) in &summary.extra {
            tracing::debug!(parent: ctx.span(), "  {} = {}", key, value);
        }

        Ok(())
    }
}
