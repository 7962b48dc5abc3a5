use crate::crawler::RequestSpec;
use crate::middleware::{Middleware, MiddlewareError};
use crate::state::JobContext;
use std::collections::BTreeMap;

/// Injects a fixed set of headers into every request
#[derive(Debug, Clone, Default)]
pub struct HeadersMiddleware {
    headers: BTreeMap<String, String>,
}

impl HeadersMiddleware {
    pub fn new<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Sends `User-Agent: Anonymous`
    pub fn anonymous() -> Self {
        Self::new([("User-Agent", "Anonymous")])
    }

    /// Sends a generic browser user agent
    pub fn browser_default() -> Self {
        Self::new([("User-Agent", "Mozilla/5.0")])
    }
}

impl Middleware for HeadersMiddleware {
    fn process_request(
        &self,
        _ctx: &JobContext,
        mut request: RequestSpec,
    ) -> Result<RequestSpec, MiddlewareError> {
        for (name, value) in &self.headers {
            request.set_header(name, value)?;
        }
        Ok(request)
    }
}
