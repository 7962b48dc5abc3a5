use crate::crawler::RequestSpec;
use crate::state::Variables;
use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for a scrape job
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub middleware: MiddlewareConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// The request every page starts from before middleware runs
    pub fn request_spec(&self) -> ConfigResult<RequestSpec> {
        let mut request = RequestSpec::default();
        request.timeout = Duration::from_secs(self.request.timeout_secs);
        request.follow_redirects = self.request.follow_redirects;
        request.retries = self.request.retries;
        for (name, value) in &self.request.headers {
            request
                .set_header(name, value)
                .map_err(|e| ConfigError::Validation(format!("request headers: {}", e)))?;
        }
        Ok(request)
    }
}

/// Job identity and seeds
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Name of the job, used in logs and output keys
    pub name: String,

    /// Seed URLs visited in order
    #[serde(rename = "start-urls", default)]
    pub start_urls: Vec<String>,

    /// Free-form job variables handed to extractors and seed producers
    #[serde(default)]
    pub variables: Variables,
}

/// Defaults for every outgoing request
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "follow-redirects", default)]
    pub follow_redirects: bool,

    /// Passed along on every request; the crawler itself never retries
    #[serde(default)]
    pub retries: u32,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            follow_redirects: false,
            retries: 0,
            headers: BTreeMap::new(),
        }
    }
}

/// Built-in middleware selection
#[derive(Debug, Clone, Deserialize)]
pub struct MiddlewareConfig {
    /// Static headers injected into every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Pool for user-agent rotation
    #[serde(rename = "user-agents", default)]
    pub user_agents: Vec<String>,

    /// Fixed proxy for every request
    pub proxy: Option<String>,

    /// Pool for proxy rotation
    #[serde(default)]
    pub proxies: Vec<String>,

    #[serde(rename = "proxy-service")]
    pub proxy_service: Option<ProxyServiceConfig>,

    /// Ask the fetcher to render pages
    #[serde(default)]
    pub render: bool,

    /// Log every outgoing request
    #[serde(rename = "log-requests", default = "default_true")]
    pub log_requests: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            headers: BTreeMap::new(),
            user_agents: Vec::new(),
            proxy: None,
            proxies: Vec::new(),
            proxy_service: None,
            render: false,
            log_requests: true,
        }
    }
}

/// Proxy rotation service settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyServiceConfig {
    /// Service endpoint; defaults to ScrapeOps
    pub endpoint: Option<String>,

    #[serde(rename = "api-key")]
    pub api_key: String,
}

/// Which built-in extractor to bind to the seeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    #[default]
    Empty,
    Body,
    Selector,
    Links,
}

/// Extractor configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub kind: ExtractorKind,

    /// CSS selector of the repeated item element (selector kind only)
    pub item: Option<String>,

    /// Field name to CSS selector (selector kind only)
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Handler and reporter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Write records to this JSON file
    #[serde(rename = "json-path")]
    pub json_path: Option<String>,

    /// Append records to this SQLite database
    #[serde(rename = "sqlite-path")]
    pub sqlite_path: Option<String>,

    /// Upload records to this S3 bucket
    #[serde(rename = "s3-bucket")]
    pub s3_bucket: Option<String>,

    #[serde(rename = "s3-key")]
    pub s3_key: Option<String>,

    /// Custom endpoint for S3-compatible stores
    #[serde(rename = "s3-endpoint")]
    pub s3_endpoint: Option<String>,

    /// Store the handled record count in the job metadata
    #[serde(rename = "log-items-count", default)]
    pub log_items_count: bool,

    /// Log the job summary when the run ends
    #[serde(rename = "log-summary", default = "default_true")]
    pub log_summary: bool,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,

    /// Slack incoming webhook for the job summary
    #[serde(rename = "slack-webhook")]
    pub slack_webhook: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: None,
            sqlite_path: None,
            s3_bucket: None,
            s3_key: None,
            s3_endpoint: None,
            log_items_count: false,
            log_summary: true,
            summary_path: None,
            slack_webhook: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}
