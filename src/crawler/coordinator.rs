//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the crawl together:
//! - Seeding the frontier with the start page
//! - Spawning the fetch workers and the aggregator
//! - Exposing pause, resume and progress through a `CrawlHandle`
//! - Collecting the crawl index and summary once the frontier is exhausted

use crate::config::Config;
use crate::crawler::aggregator::{Aggregator, CrawlIndex};
use crate::crawler::control::CrawlControl;
use crate::crawler::fetcher::{Fetcher, HttpFetcher, RetryPolicy};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::ContentQuery;
use crate::crawler::worker::{run_worker, WorkerContext};
use crate::graph::EdgeLogWriter;
use crate::output::CrawlSummary;
use crate::url::LinkNormalizer;
use crate::{ConfigError, WikiRankError};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Snapshot of crawl progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlProgress {
    /// Page names ever admitted to the frontier
    pub urls_known: usize,
    /// Admitted names already handed to a worker
    pub urls_checked: usize,
    /// Admitted names still waiting in the frontier
    pub urls_remaining: usize,
    /// Distinct classified pages in the crawl index
    pub pages_known: usize,
    pub failed_fetches: u64,
}

/// Cloneable control surface of a running crawl
#[derive(Debug, Clone)]
pub struct CrawlHandle {
    frontier: Arc<Frontier>,
    control: Arc<CrawlControl>,
}

impl CrawlHandle {
    /// Stops workers and the aggregator from starting new work
    ///
    /// Fetches already in flight run to completion.
    pub fn pause(&self) {
        tracing::info!("Pausing crawl");
        self.control.pause();
    }

    pub fn resume(&self) {
        tracing::info!("Resuming crawl");
        self.control.resume();
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    pub fn progress(&self) -> CrawlProgress {
        let urls_known = self.frontier.seen_count();
        let urls_remaining = self.frontier.size();
        CrawlProgress {
            urls_known,
            urls_checked: urls_known.saturating_sub(urls_remaining),
            urls_remaining,
            pages_known: self.control.pages_known(),
            failed_fetches: self.control.failed_fetches(),
        }
    }
}

/// Everything a finished crawl produced
#[derive(Debug)]
pub struct CrawlOutcome {
    pub index: CrawlIndex,
    pub summary: CrawlSummary,
}

/// Main crawler coordinator structure
pub struct Coordinator<F: Fetcher> {
    config: Arc<Config>,
    fetcher: Arc<F>,
    normalizer: Arc<LinkNormalizer>,
    content: Arc<ContentQuery>,
    frontier: Arc<Frontier>,
    control: Arc<CrawlControl>,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator fetching over HTTP
    pub fn new(config: Config) -> Result<Self, WikiRankError> {
        let fetcher = HttpFetcher::from_config(&config.crawler)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a coordinator around any `Fetcher`
    ///
    /// Fails when the start page is not a name the normalizer would produce
    /// itself, or when the content query does not compile.
    pub fn with_fetcher(config: Config, fetcher: F) -> Result<Self, WikiRankError> {
        let normalizer = LinkNormalizer::from_config(&config.site);
        let start = &config.crawler.start;
        if normalizer.normalize(&normalizer.expand(start)).as_deref() != Some(start.as_str()) {
            return Err(WikiRankError::InvalidStart(start.clone()));
        }

        let content = ContentQuery::new(&config.site.content_id, &config.site.link_class)
            .map_err(ConfigError::Validation)?;

        let control = CrawlControl::new(Duration::from_millis(config.crawler.pause_poll_ms));

        Ok(Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            normalizer: Arc::new(normalizer),
            content: Arc::new(content),
            frontier: Arc::new(Frontier::new()),
            control: Arc::new(control),
        })
    }

    pub fn handle(&self) -> CrawlHandle {
        CrawlHandle {
            frontier: self.frontier.clone(),
            control: self.control.clone(),
        }
    }

    /// Runs the crawl to completion
    ///
    /// The crawl ends when every discovered page has been processed. Fetch
    /// failures are logged and counted but never abort the crawl; failing to
    /// write the edge log does.
    pub async fn run(self) -> Result<CrawlOutcome, WikiRankError> {
        let started_at = chrono::Utc::now();
        let start_time = Instant::now();
        let workers = self.config.crawler.workers;

        let edge_log_path = Path::new(&self.config.output.edge_log);
        let edge_log = EdgeLogWriter::create(edge_log_path)?;
        tracing::info!(
            "Starting crawl at {} with {} workers, writing {}",
            self.config.crawler.start,
            workers,
            edge_log_path.display()
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let aggregator = Aggregator::new(Some(edge_log), self.control.clone());
        let aggregator_task = tokio::task::spawn_blocking(move || aggregator.run(rx));

        self.frontier.put(&self.config.crawler.start);

        let context = WorkerContext {
            frontier: self.frontier.clone(),
            fetcher: self.fetcher.clone(),
            normalizer: self.normalizer.clone(),
            content: self.content.clone(),
            control: self.control.clone(),
            retry: RetryPolicy::from_config(&self.config.crawler),
            events: tx,
        };

        let handles: Vec<_> = (0..workers)
            .map(|id| tokio::spawn(run_worker(id, context.clone())))
            .collect();
        // Workers hold the remaining senders; the channel closes when they exit
        drop(context);

        let mut pages_processed = 0;
        for handle in handles {
            pages_processed += handle.await?;
        }

        let index = aggregator_task.await??;
        let progress = self.handle().progress();

        let summary = CrawlSummary {
            started_at,
            duration: start_time.elapsed(),
            workers,
            urls_known: progress.urls_known,
            pages_processed,
            failed_fetches: progress.failed_fetches,
            pages_known: index.page_count(),
            links: index.link_count(),
            redirects: index.aliases.len(),
            most_linked: index.most_linked().into_iter().take(10).collect(),
        };

        tracing::info!(
            "Crawl completed: {} pages processed in {:?}, {} failed",
            pages_processed,
            summary.duration,
            summary.failed_fetches
        );

        Ok(CrawlOutcome { index, summary })
    }
}

/// Runs a complete crawl over HTTP
pub async fn run_crawl(config: Config) -> Result<CrawlOutcome, WikiRankError> {
    Coordinator::new(config)?.run().await
}
