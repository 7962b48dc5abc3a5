//! Scrapework main entry point
//!
//! This is the command-line interface for running a configured scrape job.

use clap::Parser;
use scrapework::config::{build_crawler, load_config_with_hash, validate, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scrapework: a small crawl orchestration engine
///
/// Scrapework visits the configured seed URLs one after another, runs the
/// request middleware, extracts records from every page and hands them to the
/// configured outputs.
#[derive(Parser, Debug)]
#[command(name = "scrapework")]
#[command(version)]
#[command(about = "Run a configured scrape job", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Seed URL replacing the configured start URLs (repeatable)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if !cli.seeds.is_empty() {
        tracing::info!("Replacing start URLs with {} seeds from the command line", cli.seeds.len());
        config.scraper.start_urls = cli.seeds;
        validate(&config)?;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scrapework=info,warn"),
            1 => EnvFilter::new("scrapework=debug,info"),
            2 => EnvFilter::new("scrapework=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let crawler = build_crawler(config)?;
    let registry = crawler.registry();

    println!("=== Scrapework Dry Run ===\n");

    println!("Job: {}", config.scraper.name);
    println!("  Extractor: {:?}", config.extractor.kind);
    println!("  Timeout: {}s", config.request.timeout_secs);
    println!("  Follow redirects: {}", config.request.follow_redirects);

    println!("\nSeed URLs ({}):", crawler.seeds().len());
    for seed in crawler.seeds() {
        println!("  - {}", seed.url);
    }

    println!("\nMiddleware ({}):", registry.middleware_names().len());
    for name in registry.middleware_names() {
        println!("  - {}", name);
    }

    println!("\nHandlers ({}):", registry.handler_names().len());
    for name in registry.handler_names() {
        println!("  - {}", name);
    }

    println!("\nReporters ({}):", registry.reporter_names().len());
    for name in registry.reporter_names() {
        println!("  - {}", name);
    }

    println!("\n✓ Configuration is valid");
    if crawler.seeds().is_empty() {
        println!("✗ No seed URLs configured; pass --seed or set scraper.start-urls");
    } else {
        println!(
            "✓ Would start crawling with {} seed URLs",
            crawler.seeds().len()
        );
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let crawler = build_crawler(config)?;

    tracing::info!(
        "Starting job '{}' with {} seed URLs",
        config.scraper.name,
        crawler.seeds().len()
    );

    match crawler.run().await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed successfully: {} pages, {} items in {:.2}s",
                report.pages_visited(),
                report.items_count(),
                report.duration().as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
