//! Email-Harvester main entry point
//!
//! This is the command-line interface for the Email-Harvester site crawler.

use anyhow::Context;
use clap::Parser;
use email_harvester::config::{resolve_config, validate_root_url, Config, ConfigOverrides};
use email_harvester::crawler::Coordinator;
use email_harvester::output::{load_statistics, print_run_summary, print_statistics};
use email_harvester::storage::{log_paths, LogStore};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status for invalid configuration
const EXIT_CONFIG_ERROR: u8 = 2;

/// Email-Harvester: a resumable single-site email crawler
///
/// Email-Harvester walks one website breadth-first, records every email
/// address it finds with a short context snippet, and keeps append-only
/// logs so that a later run picks up where this one stopped.
#[derive(Parser, Debug)]
#[command(name = "email-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A resumable single-site email crawler", long_about = None)]
struct Cli {
    /// Root URL of the site to crawl (http or https)
    #[arg(value_name = "ROOT_URL", value_parser = parse_root_url)]
    root_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Maximum number of link hops from the root URL
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Maximum requests per second
    #[arg(long, value_name = "RPS")]
    rate: Option<f64>,

    /// Directory for the history and email logs
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the logs and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

/// Validates the root URL argument; clap reports failures with usage
fn parse_root_url(raw: &str) -> Result<String, String> {
    validate_root_url(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let overrides = ConfigOverrides {
        max_depth: cli.max_depth,
        requests_per_second: cli.rate,
        output_directory: cli.output_dir.clone(),
    };

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = match resolve_config(cli.config.as_deref(), &overrides) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    // Handle different modes
    let result = if cli.dry_run {
        handle_dry_run(&cli.root_url, &config)
    } else if cli.stats {
        handle_stats(&cli.root_url, &config)
    } else {
        handle_crawl(config, &cli.root_url).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("email_harvester=info,warn"),
            1 => EnvFilter::new("email_harvester=debug,info"),
            2 => EnvFilter::new("email_harvester=trace,debug"),
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
fn handle_dry_run(root_url: &str, config: &Config) -> anyhow::Result<()> {
    let (history_path, emails_path) = log_paths(root_url, Path::new(&config.output.directory));

    println!("=== Email-Harvester Dry Run ===\n");

    println!("Root URL: {}", root_url);

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Requests per second: {}",
        config.crawler.requests_per_second
    );
    println!(
        "  Context ancestor depth: {}",
        config.crawler.context_ancestor_depth
    );
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  History log: {}", history_path.display());
    println!("  Email log: {}", emails_path.display());

    println!(
        "\nExcluded Extensions ({}):",
        config.exclusions.extensions.len()
    );
    println!("  {}", config.exclusions.extensions.join(", "));

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the logs
fn handle_stats(root_url: &str, config: &Config) -> anyhow::Result<()> {
    let output_dir = Path::new(&config.output.directory);
    let store = match LogStore::open_existing(root_url, output_dir)
        .context("Failed to open the logs")?
    {
        Some(store) => store,
        None => {
            println!("No logs found for {} in {}", root_url, output_dir.display());
            return Ok(());
        }
    };

    println!("History log: {}", store.history_path().display());
    println!("Email log: {}\n", store.emails_path().display());

    let stats = load_statistics(&store).context("Failed to read the email log")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, root_url: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} to depth {} at up to {} requests per second",
        root_url,
        config.crawler.max_depth,
        config.crawler.requests_per_second
    );

    let mut coordinator =
        Coordinator::new(config, root_url).context("Failed to start the crawl")?;

    // Stop gracefully on Ctrl-C; everything written so far stays in the logs
    let cancel = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping the crawl");
            cancel.cancel();
        }
    });

    let summary = coordinator.run().await?;
    print_run_summary(&summary);

    Ok(())
}
