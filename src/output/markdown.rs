//! Markdown summary generation
//!
//! This module writes a human-readable markdown summary of a finished job,
//! including aggregate metrics and the per-page timing table.

use crate::output::stats::CrawlSummary;
use crate::output::traits::{ReportResult, Reporter};
use crate::state::JobContext;
use async_trait::async_trait;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes a markdown summary to a file
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> ReportResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    // Title
    md.push_str(&format!("# Crawl Summary: {}\n\n", summary.job_name));

    // Job metadata
    md.push_str("## Job Information\n\n");
    md.push_str(&format!("- **Job**: {}\n", summary.job_name));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    md.push_str(&format!("- **Duration**: {}\n\n", summary.formatted_duration()));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Visited**: {}\n", summary.pages_visited));
    md.push_str(&format!("- **Items Extracted**: {}\n", summary.items_count));
    md.push_str(&format!(
        "- **Items per Page**: {:.2}\n",
        summary.items_per_page()
    ));
    md.push_str(&format!(
        "- **Pages per Second**: {:.2}\n\n",
        summary.pages_per_second()
    ));

    // Per-page table
    if !summary.pages.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| URL | Items | Duration (ms) |\n");
        md.push_str("|-----|-------|---------------|\n");

        for page in &summary.pages {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                page.url,
                page.item_count,
                page.duration.as_millis()
            ));
        }
        md.push('\n');
    }

    // Other collected values
    if !summary.extra.is_empty() {
        md.push_str("## Metadata\n\n");
        md.push_str("| Key | Value |\n");
        md.push_str("|-----|-------|\n");

        for (key, value) in &summary.extra {
            md.push_str(&format!("| {} | {} |\n", key, value));
        }
        md.push('\n');
    }

    md
}

/// Writes the job summary as a markdown file
#[derive(Debug, Clone)]
pub struct MarkdownReporter {
    path: PathBuf,
}

impl MarkdownReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Reporter for MarkdownReporter {
    async fn report(&self, ctx: &JobContext) -> ReportResult<()> {
        let summary = CrawlSummary::from_context(ctx);
        generate_markdown_summary(&summary, &self.path)?;
        tracing::info!(parent: ctx.span(), "Summary written to {}", self.path.display());
        Ok(())
    }
}
