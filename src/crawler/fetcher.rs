//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Following redirects and reporting the final address
//! - Retrying failed fetches a fixed number of times

use crate::config::CrawlerConfig;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Longest redirect chain the HTTP client follows
pub const MAX_REDIRECTS: usize = 10;

/// A page as returned by the server after redirects
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    /// HTTP status code of the final response
    pub status: u16,

    /// Address the response was served from; equal to the requested
    /// address when no redirect happened
    pub final_url: String,

    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors raised while fetching a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid address: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Capability to fetch a page by absolute address
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// `Fetcher` backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let requested = Url::parse(url)?;
        let response = self.client.get(requested.clone()).send().await?;

        let status = response.status().as_u16();
        let final_url = if *response.url() == requested {
            url.to_string()
        } else {
            response.url().to_string()
        };
        let body = response.text().await?;

        Ok(FetchedPage {
            status,
            final_url,
            body,
        })
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use wikirank::config::CrawlerConfig;
/// use wikirank::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// How often and how patiently a page is fetched
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            attempts: config.retry_attempts,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Fetches `url`, retrying transport failures and non-success statuses
///
/// Returns `None` once every attempt has failed; the caller decides how to
/// account for the abandoned page.
pub async fn fetch_with_retry<F: Fetcher>(
    fetcher: &F,
    url: &str,
    policy: RetryPolicy,
) -> Option<FetchedPage> {
    for attempt in 1..=policy.attempts {
        match fetcher.fetch(url).await {
            Ok(page) if page.is_success() => return Some(page),
            Ok(page) => tracing::debug!(
                "HTTP {} for {} (attempt {}/{})",
                page.status,
                url,
                attempt,
                policy.attempts
            ),
            Err(e) => tracing::debug!(
                "Fetch of {} failed (attempt {}/{}): {}",
                url,
                attempt,
                policy.attempts,
                e
            ),
        }

        if attempt < policy.attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }

    tracing::warn!(
        "Couldn't access {} after {} attempts, skipping",
        url,
        policy.attempts
    );
    None
}
