//! Slack webhook reporter

use crate::output::stats::CrawlSummary;
use crate::output::traits::{ReportError, ReportResult, Reporter};
use crate::state::JobContext;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

/// Posts a short job summary to a Slack incoming webhook
#[derive(Debug, Clone)]
pub struct SlackReporter {
    webhook_url: String,
    timeout: Duration,
}

impl SlackReporter {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Webhook payload for a finished job
///
/// A "Web Scraper Report" message with one attachment holding the job's
/// aggregate fields.
pub fn format_slack_message(summary: &CrawlSummary) -> Value {
    let mut fields = vec![
        field("Pages Visited", summary.pages_visited.to_string()),
        field("Items Extracted", summary.items_count.to_string()),
        field("Duration", summary.formatted_duration()),
    ];

    if let Some(slowest) = summary.slowest_page() {
        fields.push(json!({
            "title": "Slowest Page",
            "value": format!("{} ({} ms)", slowest.url, slowest.duration.as_millis()),
            "short": false,
        }));
    }

    json!({
        "text": "Web Scraper Report",
        "attachments": [{
            "title": format!("Scraping Results: {}", summary.job_name),
            "color": "#36a64f",
            "fields": fields,
        }],
    })
}

fn field(title: &str, value: String) -> Value {
    json!({ "title": title, "value": value, "short": true })
}

#[async_trait]
impl Reporter for SlackReporter {
    async fn report(&self, ctx: &JobContext) -> ReportResult<()> {
        let summary = CrawlSummary::from_context(ctx);
        let payload = format_slack_message(&summary);

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let response = client.post(&self.webhook_url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(ReportError::Status(response.status().as_u16()));
        }

        tracing::debug!(parent: ctx.span(), "Summary posted to Slack");
        Ok(())
    }
}
