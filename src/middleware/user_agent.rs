use crate::crawler::RequestSpec;
use crate::middleware::{Middleware, MiddlewareError};
use crate::state::JobContext;
use crate::ConfigError;

const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
];

/// Sets a random `User-Agent` from a pool on every request
#[derive(Debug, Clone)]
pub struct UserAgentRotationMiddleware {
    agents: Vec<String>,
}

impl UserAgentRotationMiddleware {
    pub fn new(agents: Vec<String>) -> Result<Self, ConfigError> {
        if agents.iter().all(|a| a.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "user agent rotation needs at least one user agent".to_string(),
            ));
        }
        Ok(Self {
            agents: agents.into_iter().filter(|a| !a.trim().is_empty()).collect(),
        })
    }

    /// Rotates through a small set of common desktop and mobile browsers
    pub fn with_defaults() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Middleware for UserAgentRotationMiddleware {
    fn process_request(
        &self,
        _ctx: &JobContext,
        mut request: RequestSpec,
    ) -> Result<RequestSpec, MiddlewareError> {
        let agent = &self.agents[rand::random_range(0..self.agents.len())];
        request.set_header("User-Agent", agent)?;
        Ok(request)
    }
}
