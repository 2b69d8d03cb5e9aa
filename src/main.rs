//! Happyhour-Scout main entry point
//!
//! This is the command-line interface for the Happyhour-Scout site crawler.

use clap::Parser;
use happyhour_scout::config::{load_config_with_hash, BrowserBackend, Config};
use happyhour_scout::crawler::crawl;
use happyhour_scout::output::has_meaningful_text;
use happyhour_scout::storage::{cached_website_text, open_storage};
use happyhour_scout::url::{classify, parse_seed_url};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Happyhour-Scout: finds happy hour text on a restaurant or bar website
///
/// Crawls the site from the given URL, reads page text, OCRs images on happy
/// hour pages and linked PDFs, and prints the most relevant text it found.
#[derive(Parser, Debug)]
#[command(name = "happyhour-scout")]
#[command(version)]
#[command(about = "Finds happy hour text on a website", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Website to crawl
    #[arg(value_name = "URL")]
    url: String,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Drop any cached text for this URL and crawl again
    #[arg(long, conflicts_with = "no_cache")]
    refresh: bool,

    /// Crawl without reading or writing the text cache
    #[arg(long)]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let seed = match parse_seed_url(&cli.url) {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!("Invalid URL {:?}: {}", cli.url, e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &seed);
        return Ok(());
    }

    let text = if cli.no_cache {
        crawl(&config, seed).await?
    } else {
        handle_cached_crawl(&config, &seed, cli.refresh).await?
    };

    if has_meaningful_text(&text) {
        println!("{}", text);
    } else {
        println!("no website text found");
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
            0 => EnvFilter::new("happyhour_scout=info,warn"),
            1 => EnvFilter::new("happyhour_scout=debug,info"),
            2 => EnvFilter::new("happyhour_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only the crawl output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings and the seed
fn handle_dry_run(config: &Config, seed: &Url) {
    println!("=== Happyhour-Scout Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max concurrent tasks: {}", config.crawler.max_concurrent_tasks);
    println!("  Work budget: {}", config.crawler.work_budget);
    println!("  Navigation timeout: {}ms", config.crawler.navigation_timeout_ms);

    println!("\nBrowser:");
    match config.browser.backend {
        BrowserBackend::Webdriver => println!("  Backend: webdriver ({})", config.browser.webdriver_url),
        BrowserBackend::Http => println!("  Backend: http"),
    }
    println!("  Headless: {}", config.browser.headless);
    println!("  User agent: {}", config.browser.user_agent);

    println!("\nOCR:");
    println!("  Bucket: {}", config.ocr.bucket);
    println!("  Vision endpoint: {}", config.ocr.vision_endpoint);
    println!("  Storage endpoint: {}", config.ocr.storage_endpoint);
    println!(
        "  Credentials from: ${} / ${}",
        config.ocr.access_token_env, config.ocr.api_key_env
    );

    println!("\nCache:");
    println!("  Database: {}", config.cache.database_path);

    println!("\nSeed:");
    println!("  {} ({})", seed, classify(seed).as_str());

    println!("\n✓ Configuration is valid");
}

/// Handles the default mode: crawl through the website text cache
async fn handle_cached_crawl(
    config: &Config,
    seed: &Url,
    refresh: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut cache = open_storage(Path::new(&config.cache.database_path))?;

    match cached_website_text(&mut cache, seed, refresh, |url| crawl(config, url)).await {
        Ok(text) => {
            tracing::info!("Crawl of {} completed", seed);
            Ok(text)
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
