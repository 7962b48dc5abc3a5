//! HTTP fetcher implementation
//!
//! This module defines the `Fetcher` seam the crawler calls for every page and
//! ships a reqwest-backed implementation. The fetcher only performs transport:
//! status codes are returned as-is and judged by the crawler.

use crate::crawler::RequestSpec;
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::collections::HashMap;
use thiserror::Error;

/// Transport-level failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid proxy {proxy}: {message}")]
    InvalidProxy { proxy: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        // Classify error
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if e.is_builder() {
            FetchError::InvalidRequest(e.to_string())
        } else {
            FetchError::Client(e)
        }
    }
}

/// Raw result of a fetch
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,

    /// Final URL after redirects
    pub url: String,

    /// Response headers with lowercase names
    pub headers: HashMap<String, String>,

    /// Page body content
    pub body: String,
}

impl Response {
    /// True for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs the network retrieval for one request
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &RequestSpec) -> Result<Response, FetchError>;
}

/// Reqwest-backed fetcher
///
/// A client is built per request so that proxy, timeout, redirect and header
/// settings coming out of the middleware chain apply to exactly that request.
/// The render flag is not supported and the page is fetched as plain HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    pub fn new() -> Self {
        Self
    }
}

/// Builds an HTTP client honoring a request spec
///
/// # Arguments
///
/// * `request` - The request whose transport settings should be applied
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(FetchError)` - Invalid proxy or client settings
pub fn build_http_client(request: &RequestSpec) -> Result<Client, FetchError> {
    let options = &request.client_options;

    let redirect = if request.follow_redirects {
        Policy::limited(options.max_redirects)
    } else {
        Policy::none()
    };

    let mut builder = Client::builder()
        .default_headers(request.headers.clone())
        .timeout(request.timeout)
        .redirect(redirect)
        .https_only(options.https_only)
        .gzip(options.gzip)
        .brotli(options.brotli);

    if let Some(connect_timeout) = options.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    if let Some(proxy_url) = &request.proxy {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| FetchError::InvalidProxy {
            proxy: proxy_url.clone(),
            message: e.to_string(),
        })?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &RequestSpec) -> Result<Response, FetchError> {
        if request.render {
            tracing::debug!("Rendering not supported, fetching {} as plain HTTP", request.url);
        }

        let client = build_http_client(request)?;
        let response = client.get(&request.url).send().await?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(Response {
            status,
            url,
            headers,
            body,
        })
    }
}
