//! Turns a loaded configuration into a ready crawler

use crate::config::types::{Config, ExtractorConfig, ExtractorKind, MiddlewareConfig, OutputConfig};
use crate::crawler::Crawler;
use crate::extract::{BodyExtractor, EmptyExtractor, Extractor, LinkExtractor, SelectorExtractor};
use crate::middleware::{
    HeadersMiddleware, LoggingMiddleware, Proxy, ProxyMiddleware, ProxyRotationMiddleware,
    ProxyServiceMiddleware, RenderMiddleware, UserAgentRotationMiddleware,
};
use crate::output::{
    JsonFileHandler, LogReporter, MarkdownReporter, MetadataHandler, S3Handler, SlackReporter,
    SqliteHandler,
};
use crate::ConfigResult;
use std::sync::Arc;

/// Builds a crawler from a configuration
///
/// Components are registered in a fixed order. Middleware: headers, user-agent
/// rotation, proxy, proxy rotation, proxy service, render, logging. Handlers:
/// JSON file, SQLite, S3, metadata. Reporters: log, markdown, Slack.
pub fn build_crawler(config: &Config) -> ConfigResult<Crawler> {
    let mut crawler = Crawler::new(config.scraper.name.as_str())
        .with_variables(config.scraper.variables.clone())
        .with_request_defaults(config.request_spec()?)
        .with_extractor(build_extractor(&config.extractor)?)
        .seed_urls(config.scraper.start_urls.iter().cloned());

    register_middleware(&mut crawler, &config.middleware)?;
    register_handlers(&mut crawler, &config.output);
    register_reporters(&mut crawler, &config.output);

    Ok(crawler)
}

/// Builds the configured extractor
pub fn build_extractor(config: &ExtractorConfig) -> ConfigResult<Arc<dyn Extractor>> {
    let extractor: Arc<dyn Extractor> = match config.kind {
        ExtractorKind::Empty => Arc::new(EmptyExtractor),
        ExtractorKind::Body => Arc::new(BodyExtractor::new()),
        ExtractorKind::Links => Arc::new(LinkExtractor::new()),
        ExtractorKind::Selector => Arc::new(SelectorExtractor::new(
            config.item.as_deref(),
            config.fields.iter(),
        )?),
    };
    Ok(extractor)
}

fn register_middleware(crawler: &mut Crawler, config: &MiddlewareConfig) -> ConfigResult<()> {
    if !config.headers.is_empty() {
        crawler.register(HeadersMiddleware::new(config.headers.clone()));
    }

    if !config.user_agents.is_empty() {
        crawler.register(UserAgentRotationMiddleware::new(config.user_agents.clone())?);
    }

    if let Some(proxy) = &config.proxy {
        crawler.register(ProxyMiddleware::new(Proxy::new(proxy.as_str())?));
    }

    if !config.proxies.is_empty() {
        let pool = config
            .proxies
            .iter()
            .map(|p| Proxy::new(p.as_str()))
            .collect::<ConfigResult<Vec<_>>>()?;
        crawler.register(ProxyRotationMiddleware::new(pool)?);
    }

    if let Some(service) = &config.proxy_service {
        let middleware = match &service.endpoint {
            Some(endpoint) => ProxyServiceMiddleware::new(endpoint, service.api_key.as_str())?,
            None => ProxyServiceMiddleware::scrapeops(service.api_key.as_str())?,
        };
        crawler.register(middleware);
    }

    if config.render {
        crawler.register(RenderMiddleware);
    }

    if config.log_requests {
        crawler.register(LoggingMiddleware);
    }

    Ok(())
}

fn register_handlers(crawler: &mut Crawler, config: &OutputConfig) {
    if let Some(path) = &config.json_path {
        crawler.register(JsonFileHandler::new(path));
    }

    if let Some(path) = &config.sqlite_path {
        crawler.register(SqliteHandler::new(path));
    }

    if let Some(bucket) = &config.s3_bucket {
        let mut handler = S3Handler::new(bucket.as_str());
        if let Some(key) = &config.s3_key {
            handler = handler.with_key(key.as_str());
        }
        if let Some(endpoint) = &config.s3_endpoint {
            handler = handler.with_endpoint(endpoint.as_str());
        }
        crawler.register(handler);
    }

    if config.log_items_count {
        crawler.register(MetadataHandler);
    }
}

fn register_reporters(crawler: &mut Crawler, config: &OutputConfig) {
    if config.log_summary {
        crawler.register(LogReporter::new());
    }

    if let Some(path) = &config.summary_path {
        crawler.register(MarkdownReporter::new(path));
    }

    if let Some(webhook) = &config.slack_webhook {
        crawler.register(SlackReporter::new(webhook.as_str()));
    }
}
