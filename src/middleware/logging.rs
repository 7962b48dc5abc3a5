use crate::crawler::RequestSpec;
use crate::middleware::{Middleware, MiddlewareError};
use crate::state::JobContext;

/// Logs every outgoing request without changing it
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn process_request(
        &self,
        ctx: &JobContext,
        request: RequestSpec,
    ) -> Result<RequestSpec, MiddlewareError> {
        tracing::info!(
            parent: ctx.span(),
            proxy = request.proxy.as_deref().unwrap_or("none"),
            render = request.render,
            "Making request to {}",
            request.url
        );
        Ok(request)
    }
}

/// Asks the fetcher to render pages in a headless browser
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderMiddleware;

impl Middleware for RenderMiddleware {
    fn process_request(
        &self,
        _ctx: &JobContext,
        mut request: RequestSpec,
    ) -> Result<RequestSpec, MiddlewareError> {
        request.render = true;
        Ok(request)
    }
}
