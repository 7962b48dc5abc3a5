//! Request model passed through the middleware chain

use crate::middleware::MiddlewareError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client knobs forwarded to the fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Connect timeout, separate from the overall request timeout
    pub connect_timeout: Option<Duration>,

    /// Accept gzip-encoded responses
    pub gzip: bool,

    /// Accept brotli-encoded responses
    pub brotli: bool,

    /// Refuse plain-http URLs
    pub https_only: bool,

    /// Maximum redirect hops when redirects are followed
    pub max_redirects: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            gzip: true,
            brotli: true,
            https_only: false,
            max_redirects: 10,
        }
    }
}

/// Everything the fetcher needs to retrieve one page
///
/// Middleware receives the spec by value and returns the (possibly modified)
/// spec to pass on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub url: String,

    /// Header names are case-insensitive
    pub headers: HeaderMap,
    pub timeout: Duration,
    pub proxy: Option<String>,
    pub follow_redirects: bool,

    /// Carried for middleware that wants it; the crawler never retries.
    pub retries: u32,

    /// Ask the fetcher to render the page in a headless browser
    pub render: bool,

    pub client_options: ClientOptions,
}

impl Default for RequestSpec {
    fn default() -> Self {
        Self {
            url: String::new(),
            headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
            follow_redirects: false,
            retries: 0,
            render: false,
            client_options: ClientOptions::default(),
        }
    }
}

impl RequestSpec {
    /// Creates a spec with default settings for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Copies these settings onto another URL
    pub fn for_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self.clone()
        }
    }

    /// Sets a header, replacing any previous value under any casing
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), MiddlewareError> {
        let name = parse_header_name(name)?;
        let value = parse_header_value(&name, value)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Appends to a header as a comma-separated list
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<(), MiddlewareError> {
        let name = parse_header_name(name)?;
        let combined = match self.header(name.as_str()) {
            Some(existing) => format!("{},{}", existing, value),
            None => value.to_string(),
        };
        let value = parse_header_value(&name, &combined)?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Looks up a header by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

fn parse_header_name(name: &str) -> Result<HeaderName, MiddlewareError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| MiddlewareError::Invalid(format!("header name '{}': {}", name, e)))
}

fn parse_header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, MiddlewareError> {
    HeaderValue::from_str(value)
        .map_err(|e| MiddlewareError::Invalid(format!("header value for '{}': {}", name, e)))
}
