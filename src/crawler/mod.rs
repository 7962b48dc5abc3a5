//! Crawler module for the crawl loop and its transport
//!
//! This module contains the core crawling logic, including:
//! - The request description passed through middleware
//! - HTTP fetching behind the [`Fetcher`] trait
//! - The FIFO frontier with visited-URL deduplication
//! - Component registration and overall crawl coordination

mod coordinator;
pub mod fetcher;
mod frontier;
mod registry;
mod request;

pub use coordinator::{CrawlReport, Crawler, Seed, SeedProducer};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher, Response};
pub use frontier::{Frontier, FrontierEntry};
pub use registry::{Module, Registry};
pub use request::{ClientOptions, RequestSpec, DEFAULT_TIMEOUT};
