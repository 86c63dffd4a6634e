//! Crawler module for wiki page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The deduplicating frontier shared by all workers
//! - HTTP fetching with retry logic
//! - Wiki link extraction from article bodies
//! - The single aggregator that builds the crawl index and edge log
//! - Overall crawl coordination with pause and resume

mod aggregator;
mod control;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod worker;

pub use aggregator::{Aggregator, CrawlEvent, CrawlIndex};
pub use control::CrawlControl;
pub use coordinator::{run_crawl, Coordinator, CrawlHandle, CrawlOutcome, CrawlProgress};
pub use fetcher::{
    build_http_client, fetch_with_retry, FetchError, FetchedPage, Fetcher, HttpFetcher,
    RetryPolicy, MAX_REDIRECTS,
};
pub use frontier::{Frontier, SeenSet, WorkQueue};
pub use parser::{extract_wiki_links, ContentQuery};
pub use worker::{run_worker, WorkerContext};
