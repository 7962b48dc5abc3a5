//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives one job from start to end:
//! - Resolving and seeding the frontier
//! - Running middleware, fetching and extracting each page in turn
//! - Recording per-page metrics
//! - Handing the records to handlers and the metrics to reporters

use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::registry::{Module, Registry};
use crate::crawler::request::RequestSpec;
use crate::extract::{Document, EmptyExtractor, Extractor, Record};
use crate::middleware::Middleware;
use crate::output::{Handler, Reporter};
use crate::state::{JobContext, MetadataCollector, PageMetrics, Variables, DURATION};
use crate::{ConfigError, ScrapeError};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Produces seed URLs from the job variables
pub trait SeedProducer: Send + Sync {
    fn build_seed_urls(&self, variables: &Variables) -> Vec<String>;
}

impl<F> SeedProducer for F
where
    F: Fn(&Variables) -> Vec<String> + Send + Sync,
{
    fn build_seed_urls(&self, variables: &Variables) -> Vec<String> {
        self(variables)
    }
}

/// A literal seed URL
#[derive(Clone)]
pub struct Seed {
    pub url: String,

    /// Overrides the crawler's default extractor for this URL
    pub extractor: Option<Arc<dyn Extractor>>,

    /// Queue even if the URL is a duplicate
    pub force: bool,
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("url", &self.url)
            .field("custom_extractor", &self.extractor.is_some())
            .field("force", &self.force)
            .finish()
    }
}

/// Result of a completed run
#[derive(Debug)]
pub struct CrawlReport {
    pub job_name: String,

    /// Every extracted record in visit order
    pub records: Vec<Record>,

    /// Final job metrics
    pub metadata: MetadataCollector,
}

impl CrawlReport {
    pub fn items_count(&self) -> u64 {
        self.metadata.items_count()
    }

    pub fn pages_visited(&self) -> u64 {
        self.metadata.pages_visited()
    }

    pub fn pages(&self) -> &[PageMetrics] {
        self.metadata.pages()
    }

    pub fn duration(&self) -> Duration {
        self.metadata.duration().unwrap_or_default()
    }
}

/// State of one run, discarded when the run ends
struct CrawlJob {
    ctx: JobContext,
    frontier: Frontier,
    records: Vec<Record>,
    started: Instant,
}

impl CrawlJob {
    fn new(ctx: JobContext) -> Self {
        Self {
            ctx,
            frontier: Frontier::new(),
            records: Vec::new(),
            started: Instant::now(),
        }
    }

    fn finish(self) -> CrawlReport {
        CrawlReport {
            job_name: self.ctx.job_name().to_string(),
            records: self.records,
            metadata: self.ctx.collector,
        }
    }
}

/// Crawl orchestrator
///
/// A crawler holds the job definition: seeds, request defaults, the default
/// extractor and the registered components. Every call to [`Crawler::run`]
/// starts a fresh job with its own frontier, records and metrics.
pub struct Crawler {
    name: String,
    variables: Variables,
    request_defaults: RequestSpec,
    extractor: Arc<dyn Extractor>,
    seeds: Vec<Seed>,
    seed_producer: Option<Box<dyn SeedProducer>>,
    fetcher: Box<dyn Fetcher>,
    registry: Registry,
}

impl fmt::Debug for Crawler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crawler")
            .field("name", &self.name)
            .field("seeds", &self.seeds)
            .field("seed_producer", &self.seed_producer.is_some())
            .field("request_defaults", &self.request_defaults)
            .field("middlewares", &self.registry.middleware_names())
            .field("handlers", &self.registry.handler_names())
            .field("reporters", &self.registry.reporter_names())
            .finish()
    }
}

impl Crawler {
    /// Creates a crawler with no seeds, no components and the HTTP fetcher
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Variables::new(),
            request_defaults: RequestSpec::default(),
            extractor: Arc::new(EmptyExtractor),
            seeds: Vec::new(),
            seed_producer: None,
            fetcher: Box::new(HttpFetcher::new()),
            registry: Registry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn request_defaults(&self) -> &RequestSpec {
        &self.request_defaults
    }

    /// Registers a middleware, handler or reporter
    pub fn register(&mut self, module: impl Into<Module>) -> &mut Self {
        let module = module.into();
        tracing::trace!("Registering {}", module.name());
        self.registry.register(module);
        self
    }

    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.register(Module::middleware(middleware));
        self
    }

    pub fn with_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.register(Module::handler(handler));
        self
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.register(Module::reporter(reporter));
        self
    }

    /// Adds a seed URL handled by the default extractor
    pub fn seed(mut self, url: impl Into<String>) -> Self {
        self.seeds.push(Seed {
            url: url.into(),
            extractor: None,
            force: false,
        });
        self
    }

    /// Adds a seed URL with its own extractor
    pub fn seed_with(mut self, url: impl Into<String>, extractor: Arc<dyn Extractor>) -> Self {
        self.seeds.push(Seed {
            url: url.into(),
            extractor: Some(extractor),
            force: false,
        });
        self
    }

    /// Adds a seed URL that is queued even if it duplicates an earlier one
    pub fn seed_forced(mut self, url: impl Into<String>, extractor: Arc<dyn Extractor>) -> Self {
        self.seeds.push(Seed {
            url: url.into(),
            extractor: Some(extractor),
            force: true,
        });
        self
    }

    pub fn seed_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for url in urls {
            self = self.seed(url);
        }
        self
    }

    /// Drops all literal seeds
    pub fn clear_seeds(mut self) -> Self {
        self.seeds.clear();
        self
    }

    pub fn seed_producer(mut self, producer: impl SeedProducer + 'static) -> Self {
        self.seed_producer = Some(Box::new(producer));
        self
    }

    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Sets the extractor used by seeds without their own
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Sets the request every page starts from before middleware runs
    pub fn with_request_defaults(mut self, request: RequestSpec) -> Self {
        self.request_defaults = request;
        self
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    /// Runs one crawl job to completion
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - All pages fetched and all handlers succeeded
    /// * `Err(ScrapeError)` - The first fatal error; no handler runs if the
    ///   crawl loop failed
    pub async fn run(&self) -> crate::Result<CrawlReport> {
        let ctx = JobContext::new(&self.name, self.variables.clone());
        let span = ctx.span().clone();
        self.run_job(ctx).instrument(span).await
    }

    async fn run_job(&self, ctx: JobContext) -> crate::Result<CrawlReport> {
        let seeds = self.resolve_seeds(&ctx)?;
        let mut job = CrawlJob::new(ctx);

        for seed in seeds {
            let extractor = seed.extractor.unwrap_or_else(|| Arc::clone(&self.extractor));
            job.frontier.enqueue(seed.url, extractor, seed.force);
        }

        tracing::info!("Starting crawl with {} URLs in frontier", job.frontier.len());

        while let Some(entry) = job.frontier.dequeue() {
            self.visit(&mut job, entry).await?;
        }

        let elapsed = job.started.elapsed();
        job.ctx.collector.set(DURATION, elapsed.as_secs_f64());

        tracing::info!(
            "Crawl completed: {} pages visited, {} records in {:?}",
            job.frontier.visited_count(),
            job.records.len(),
            elapsed
        );

        for handler in &self.registry.handlers {
            tracing::debug!("Running handler {}", handler.name());
            handler
                .process(&mut job.ctx, &job.records)
                .await
                .map_err(|source| ScrapeError::Handler {
                    handler: handler.name().to_string(),
                    source,
                })?;
        }

        for reporter in &self.registry.reporters {
            if let Err(e) = reporter.report(&job.ctx).await {
                tracing::warn!("Reporter {} failed: {}", reporter.name(), e);
            }
        }

        Ok(job.finish())
    }

    /// Collects literal seeds followed by produced ones
    fn resolve_seeds(&self, ctx: &JobContext) -> Result<Vec<Seed>, ConfigError> {
        let mut seeds = self.seeds.clone();

        if let Some(producer) = &self.seed_producer {
            let produced = producer.build_seed_urls(&ctx.variables);
            tracing::debug!("Seed producer returned {} URLs", produced.len());
            seeds.extend(produced.into_iter().map(|url| Seed {
                url,
                extractor: None,
                force: false,
            }));
        }

        if seeds.is_empty() {
            return Err(ConfigError::NoSeeds);
        }
        Ok(seeds)
    }

    /// Processes a single frontier entry
    ///
    /// This method:
    /// 1. Runs the middleware chain over the default request
    /// 2. Fetches the page and checks the status
    /// 3. Marks the URL visited and extracts records
    /// 4. Records the page metrics
    async fn visit(&self, job: &mut CrawlJob, entry: FrontierEntry) -> crate::Result<()> {
        let started = Instant::now();
        let FrontierEntry { url, extractor } = entry;

        let request = self
            .registry
            .middlewares
            .process_request(&job.ctx, self.request_defaults.for_url(&url))?;

        let response = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|source| ScrapeError::Fetch {
                url: url.clone(),
                source,
            })?;
        let request_url = request.url.clone();
        job.ctx.set_request(request);

        if !response.is_success() {
            return Err(ScrapeError::HttpStatus {
                url,
                status: response.status,
            });
        }

        job.frontier.mark_visited(&url);

        let rewritten = request_url != url;
        let mut document = Document::new(url.clone(), response);
        if rewritten {
            // The response came from a proxy API, not the page itself
            document.final_url = url.clone();
        }
        let extracted = extractor
            .extract(&job.ctx, &document)
            .map_err(|source| ScrapeError::Extraction {
                url: url.clone(),
                source,
            })?;
        job.ctx.set_response(document);

        let item_count = extracted.len();
        job.records.extend(extracted.into_records());

        let duration = started.elapsed();
        tracing::debug!("Visited {} ({} items, {:?})", url, item_count, duration);

        job.ctx.collector.record_page(PageMetrics {
            url,
            duration,
            item_count,
        });
        Ok(())
    }
}
