use crate::config::types::{
    Config, ExtractorConfig, ExtractorKind, MiddlewareConfig, OutputConfig, RequestConfig,
    ScraperConfig,
};
use crate::crawler::RequestSpec;
use crate::extract::SelectorExtractor;
use crate::middleware::Proxy;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_request_config(&config.request)?;
    config.request_spec()?;
    validate_middleware_config(&config.middleware)?;
    validate_extractor_config(&config.extractor)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates job identity and seed URLs
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    // Validate name: non-empty, alphanumeric + hyphens and underscores only
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "scraper name cannot be empty".to_string(),
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "scraper name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.name
        )));
    }

    for seed in &config.start_urls {
        validate_http_url(seed)?;
    }

    Ok(())
}

/// Checks that a seed URL parses and uses http or https
pub fn validate_http_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use http or https",
            raw
        )));
    }

    Ok(())
}

/// Validates request defaults
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    for name in config.headers.keys() {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "request header names cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates middleware settings
fn validate_middleware_config(config: &MiddlewareConfig) -> Result<(), ConfigError> {
    let mut scratch = RequestSpec::default();
    for (name, value) in &config.headers {
        scratch
            .set_header(name, value)
            .map_err(|e| ConfigError::Validation(format!("middleware headers: {}", e)))?;
    }

    if let Some(proxy) = &config.proxy {
        Proxy::new(proxy.as_str())?;
    }

    for proxy in &config.proxies {
        Proxy::new(proxy.as_str())?;
    }

    if !config.user_agents.is_empty() && config.user_agents.iter().all(|ua| ua.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "user-agents must contain at least one non-empty entry".to_string(),
        ));
    }

    if let Some(service) = &config.proxy_service {
        if service.api_key.is_empty() {
            return Err(ConfigError::Validation(
                "proxy-service api-key cannot be empty".to_string(),
            ));
        }
        if let Some(endpoint) = &service.endpoint {
            Url::parse(endpoint).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid proxy-service endpoint: {}", e))
            })?;
        }
    }

    Ok(())
}

/// Validates extractor settings
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    if config.kind == ExtractorKind::Selector {
        // Compiles every selector, failing on the first invalid one
        SelectorExtractor::new(config.item.as_deref(), config.fields.iter())?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let paths = [
        ("json-path", &config.json_path),
        ("sqlite-path", &config.sqlite_path),
        ("summary-path", &config.summary_path),
        ("s3-bucket", &config.s3_bucket),
        ("s3-key", &config.s3_key),
    ];

    for (name, value) in paths {
        if matches!(value, Some(v) if v.trim().is_empty()) {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.s3_key.is_some() && config.s3_bucket.is_none() {
        return Err(ConfigError::Validation(
            "s3-key requires s3-bucket".to_string(),
        ));
    }

    if let Some(endpoint) = &config.s3_endpoint {
        Url::parse(endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid s3-endpoint: {}", e)))?;
    }

    if let Some(webhook) = &config.slack_webhook {
        Url::parse(webhook)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid slack-webhook: {}", e)))?;
    }

    Ok(())
}
