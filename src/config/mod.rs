//! Configuration module for scrape jobs
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and building a [`Crawler`](crate::Crawler) from them.
//!
//! # Example
//!
//! ```no_run
//! use scrapework::config::{build_crawler, load_config};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! let crawler = build_crawler(&config).unwrap();
//! println!("Crawler will visit {} seed URLs", crawler.seeds().len());
//! ```

mod builder;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ExtractorConfig, ExtractorKind, MiddlewareConfig, OutputConfig, ProxyServiceConfig,
    RequestConfig, ScraperConfig,
};

// Re-export parser functions
pub use builder::{build_crawler, build_extractor};
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_env,
    load_config_with_hash, ENV_S3_BUCKET, ENV_S3_ENDPOINT, ENV_SLACK_WEBHOOK,
};
pub use validation::{validate, validate_http_url};
