//! Tidecrawl main entry point
//!
//! This is the command-line interface for the Tidecrawl search crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tidecrawl::config::{load_config_with_hash, Config};
use tidecrawl::crawler::run_crawl;
use tidecrawl::output::{format_crawl_summary, format_search_results, format_statistics};
use tidecrawl::storage::{open_storage, SqliteStorage, Storage};
use tracing_subscriber::EnvFilter;

/// Number of page hits shown by `--search`
const SEARCH_LIMIT: usize = 10;

/// Number of image hits shown by `--search`
const IMAGE_SEARCH_LIMIT: usize = 20;

/// Tidecrawl: a domain-scoped search crawler
///
/// Tidecrawl crawls each seed's site breadth-first while respecting
/// robots.txt, extracts page content, filters out low-quality pages and
/// stores the rest in a searchable SQLite database.
#[derive(Parser, Debug)]
#[command(name = "tidecrawl")]
#[command(version)]
#[command(about = "A domain-scoped search crawler", long_about = None)]
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
    #[arg(long, conflicts_with_all = ["stats", "search"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "search"])]
    stats: bool,

    /// Run a full-text query against the database and exit
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["dry_run", "stats"])]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(query) = cli.search.as_deref() {
        handle_search(&config, query)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tidecrawl=info,warn"),
            1 => EnvFilter::new("tidecrawl=debug,info"),
            2 => EnvFilter::new("tidecrawl=trace,debug"),
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

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.output.database_path);
    open_storage(path).with_context(|| format!("Failed to open database {}", path.display()))
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Tidecrawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages per site: {}", config.crawler.max_pages_per_site);
    match config.crawler.depth_limit() {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unlimited"),
    }
    println!("  Minimum delay: {}ms", config.crawler.minimum_delay_ms);
    println!(
        "  Max concurrent sites: {}",
        config.crawler.max_concurrent_sites
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_database(config)?;
    let stats = storage.stats().context("Failed to read statistics")?;
    print!("{}", format_statistics(&stats));

    Ok(())
}

/// Handles the --search mode: queries the full-text index
fn handle_search(config: &Config, query: &str) -> anyhow::Result<()> {
    let storage = open_database(config)?;

    let pages = storage.search(query, SEARCH_LIMIT).context("Search failed")?;
    let images = storage
        .search_images(query, IMAGE_SEARCH_LIMIT)
        .context("Image search failed")?;

    print!("{}", format_search_results(query, &pages, &images));

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} seeds into {}",
        config.seeds.len(),
        config.output.database_path
    );

    let summary = run_crawl(config).await.context("Crawl failed")?;
    print!("{}", format_crawl_summary(&summary));

    Ok(())
}
