//! wikirank main entry point
//!
//! This is the command-line interface for crawling a wiki and ranking its pages.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wikirank::config::{load_config_with_hash, Config};
use wikirank::crawler::Coordinator;
use wikirank::output::{print_report, print_summary, run_analysis, RankMethod};

/// wikirank: crawl a wiki's link graph and rank its pages
///
/// `crawl` walks the wiki from a start page with a pool of workers and records
/// every internal link and redirect to an edge log. `rank` reads that log and
/// computes PageRank by power iteration or by random-surfer simulation.
#[derive(Parser, Debug)]
#[command(name = "wikirank")]
#[command(version)]
#[command(about = "Wiki link-graph crawler and PageRank engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Validate config and show what would run without doing it
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the wiki and write the edge log
    Crawl {
        /// Path to TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// Rank the pages of a recorded edge log
    Rank {
        /// Path to TOML configuration file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Estimator: matrix (power iteration) or stochastic (random walk)
        #[arg(long, default_value_t = RankMethod::Matrix)]
        method: RankMethod,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config_path = match &cli.command {
        Command::Crawl { config } | Command::Rank { config, .. } => config.clone(),
    };
    let config = load(&config_path)?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.command);
        return Ok(());
    }

    match cli.command {
        Command::Crawl { .. } => handle_crawl(config).await,
        Command::Rank { method, .. } => handle_rank(config, method),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wikirank=info,warn"),
            1 => EnvFilter::new("wikirank=debug,info"),
            2 => EnvFilter::new("wikirank=trace,debug"),
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

fn load(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config, command: &Command) {
    println!("=== wikirank Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Start page: {}", config.crawler.start);
    println!(
        "  Retries: {} attempts, {}ms apart",
        config.crawler.retry_attempts, config.crawler.retry_delay_ms
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nSite:");
    for prefix in &config.site.prefixes {
        println!("  - {}", prefix);
    }
    println!(
        "  Links: #{} a.{}",
        config.site.content_id, config.site.link_class
    );

    println!("\nOutput:");
    println!("  Edge log: {}", config.output.edge_log);
    if let Some(rank_file) = &config.output.rank_file {
        println!("  Rank file: {}", rank_file);
    }
    if let Some(csv_file) = &config.output.csv_file {
        println!("  CSV file: {}", csv_file);
    }

    println!("\nAnalysis:");
    println!("  Reset probability: {}", config.analysis.reset_probability);
    println!("  Max iterations: {}", config.analysis.max_iterations);
    println!("  Convergence: {:?}", config.analysis.convergence);
    println!("  Top N: {}", config.analysis.top_n);

    println!("\n✓ Configuration is valid");
    match command {
        Command::Crawl { .. } => println!(
            "✓ Would crawl from {} with {} workers",
            config.crawler.start, config.crawler.workers
        ),
        Command::Rank { method, .. } => println!(
            "✓ Would rank {} with the {} method",
            config.output.edge_log, method
        ),
    }
}

/// Handles the crawl subcommand
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config).context("Failed to set up the crawler")?;
    let handle = coordinator.handle();

    let reporter = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(10));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let progress = handle.progress();
            tracing::info!(
                "Progress: {} known, {} checked, {} remaining, {} pages, {} failed",
                progress.urls_known,
                progress.urls_checked,
                progress.urls_remaining,
                progress.pages_known,
                progress.failed_fetches
            );
        }
    });

    let outcome = coordinator.run().await;
    reporter.abort();

    let outcome = outcome.context("Crawl failed")?;
    print_summary(&outcome.summary);
    Ok(())
}

/// Handles the rank subcommand
fn handle_rank(config: Config, method: RankMethod) -> anyhow::Result<()> {
    let report = run_analysis(&config, method)
        .with_context(|| format!("Failed to rank {}", config.output.edge_log))?;

    for (name, rank) in report.top.iter().take(10) {
        tracing::info!("{}\t{}", name, rank);
    }
    print_report(&report);

    if let Some(written) = report.ranks_written {
        tracing::info!("{} ranks written", written);
    }
    if let Some(rows) = report.csv_rows {
        tracing::info!("{} CSV rows written", rows);
    }
    Ok(())
}
