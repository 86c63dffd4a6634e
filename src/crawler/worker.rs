//! Fetch worker loop
//!
//! Each worker repeatedly takes a page name from the frontier, fetches the
//! page, and reports what it found to the aggregator. A worker exits when the
//! frontier is exhausted or shut down.

use crate::crawler::aggregator::CrawlEvent;
use crate::crawler::control::CrawlControl;
use crate::crawler::fetcher::{fetch_with_retry, Fetcher, RetryPolicy};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::ContentQuery;
use crate::url::LinkNormalizer;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Everything a worker shares with its siblings
pub struct WorkerContext<F: Fetcher> {
    pub frontier: Arc<Frontier>,
    pub fetcher: Arc<F>,
    pub normalizer: Arc<LinkNormalizer>,
    pub content: Arc<ContentQuery>,
    pub control: Arc<CrawlControl>,
    pub retry: RetryPolicy,
    pub events: UnboundedSender<CrawlEvent>,
}

impl<F: Fetcher> Clone for WorkerContext<F> {
    fn clone(&self) -> Self {
        Self {
            frontier: self.frontier.clone(),
            fetcher: self.fetcher.clone(),
            normalizer: self.normalizer.clone(),
            content: self.content.clone(),
            control: self.control.clone(),
            retry: self.retry,
            events: self.events.clone(),
        }
    }
}

/// Runs one worker until the frontier is exhausted
///
/// Returns the number of pages this worker processed.
pub async fn run_worker<F: Fetcher>(id: usize, ctx: WorkerContext<F>) -> usize {
    tracing::debug!("Worker {} started", id);
    let mut processed = 0;

    loop {
        if !ctx.control.is_running() {
            tokio::time::sleep(ctx.control.pause_poll()).await;
            continue;
        }

        let Some(name) = ctx.frontier.get().await else {
            break;
        };

        process_page(&ctx, &name).await;
        ctx.frontier.task_done();
        processed += 1;
    }

    tracing::debug!("Worker {} finished after {} pages", id, processed);
    processed
}

/// What a fetched page turned out to be
#[derive(Debug, PartialEq)]
enum PageOutcome {
    /// The server answered from another page name
    Redirected(String),
    /// The page was served under its own name; these are its links
    Links(Vec<String>),
}

async fn process_page<F: Fetcher>(ctx: &WorkerContext<F>, name: &str) {
    let url = ctx.normalizer.expand(name);
    tracing::trace!("Fetching {}", url);

    let Some(page) = fetch_with_retry(ctx.fetcher.as_ref(), &url, ctx.retry).await else {
        ctx.control.record_failed_fetch();
        return;
    };

    let outcome = if page.final_url != url {
        match ctx.normalizer.normalize(&page.final_url) {
            Some(resolved) if resolved != name => PageOutcome::Redirected(resolved),
            Some(_) => PageOutcome::Links(ctx.content.extract(&page.body)),
            None => {
                tracing::debug!("{} redirected off-site to {}", name, page.final_url);
                return;
            }
        }
    } else {
        PageOutcome::Links(ctx.content.extract(&page.body))
    };

    match outcome {
        PageOutcome::Redirected(resolved) => {
            tracing::debug!("{} redirects to {}", name, resolved);
            ctx.frontier.put(&resolved);
            emit(
                ctx,
                CrawlEvent::Redirect {
                    from: name.to_string(),
                    to: resolved,
                },
            );
        }
        PageOutcome::Links(raw_links) => {
            for link in raw_links.iter().filter_map(|raw| ctx.normalizer.normalize(raw)) {
                ctx.frontier.put(&link);
                emit(
                    ctx,
                    CrawlEvent::Link {
                        from: name.to_string(),
                        to: link,
                    },
                );
            }
        }
    }
}

fn emit<F: Fetcher>(ctx: &WorkerContext<F>, event: CrawlEvent) {
    if let Err(e) = ctx.events.send(event) {
        tracing::warn!("Aggregator is gone, dropping {:?}", e.0);
    }
}
