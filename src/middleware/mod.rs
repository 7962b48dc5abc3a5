//! Request middleware
//!
//! Middleware transforms the [`RequestSpec`] before every fetch. The chain runs
//! in registration order and each middleware sees the changes made by the ones
//! before it. Returning an error aborts the page visit, and with it the run.

mod headers;
mod logging;
mod proxy;
mod user_agent;

pub use headers::HeadersMiddleware;
pub use logging::{LoggingMiddleware, RenderMiddleware};
pub use proxy::{Proxy, ProxyMiddleware, ProxyRotationMiddleware, ProxyServiceMiddleware};
pub use user_agent::UserAgentRotationMiddleware;

use crate::crawler::RequestSpec;
use crate::state::JobContext;
use crate::{short_type_name, ScrapeError};
use thiserror::Error;

/// Errors raised by middleware
#[derive(Debug, Error)]
pub enum MiddlewareError {
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid request: {0}")]
    Invalid(String),
}

/// A request transformer applied before each fetch
pub trait Middleware: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// Transforms the request, or fails to abort the visit
    fn process_request(
        &self,
        ctx: &JobContext,
        request: RequestSpec,
    ) -> Result<RequestSpec, MiddlewareError>;
}

/// Ordered list of middleware
#[derive(Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Creates an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware to the end of the chain
    pub fn push(&mut self, middleware: Box<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    /// Number of registered middleware
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// True when no middleware is registered
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Names of the registered middleware in order
    pub fn names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// Processes a request through all registered middleware
    pub fn process_request(
        &self,
        ctx: &JobContext,
        request: RequestSpec,
    ) -> Result<RequestSpec, ScrapeError> {
        let url = request.url.clone();
        let mut current_request = request;

        for middleware in &self.middlewares {
            current_request = middleware
                .process_request(ctx, current_request)
                .map_err(|source| ScrapeError::Middleware {
                    url: url.clone(),
                    middleware: middleware.name().to_string(),
                    source,
                })?;
        }

        Ok(current_request)
    }
}
