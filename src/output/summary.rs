//! End-of-crawl summary

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Counters describing a finished crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub workers: usize,

    /// Page names ever admitted to the frontier
    pub urls_known: usize,

    /// Page names taken off the frontier by a worker
    pub pages_processed: usize,

    /// Pages abandoned after exhausting their fetch attempts
    pub failed_fetches: u64,

    /// Distinct classified pages in the crawl index
    pub pages_known: usize,

    pub links: usize,
    pub redirects: usize,

    /// Highest out-degree pages, descending
    pub most_linked: Vec<(String, usize)>,
}

impl CrawlSummary {
    /// Pages processed per second of wall time
    pub fn rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.pages_processed as f64 / secs
        } else {
            0.0
        }
    }

    /// Share of processed pages that were fetched successfully, in percent
    pub fn success_rate(&self) -> f64 {
        if self.pages_processed == 0 {
            return 0.0;
        }
        let fetched = self.pages_processed as u64 - self.failed_fetches.min(self.pages_processed as u64);
        fetched as f64 / self.pages_processed as f64 * 100.0
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Run:");
    println!(
        "  Started: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Duration: {:.1}s", summary.duration.as_secs_f64());
    println!("  Workers: {}", summary.workers);
    println!();

    println!("Overview:");
    println!("  Page names discovered: {}", summary.urls_known);
    println!(
        "  Pages processed: {} ({:.2} pages/sec)",
        summary.pages_processed,
        summary.rate()
    );
    println!("  Failed fetches: {}", summary.failed_fetches);
    println!("  Distinct pages indexed: {}", summary.pages_known);
    println!("  Links recorded: {}", summary.links);
    println!("  Redirects recorded: {}", summary.redirects);
    println!();

    if !summary.most_linked.is_empty() {
        println!("Most Linking Pages:");
        for (name, degree) in &summary.most_linked {
            println!("  {:>8}  {}", degree, name);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} failed of {} pages)",
        summary.success_rate(),
        summary.failed_fetches,
        summary.pages_processed
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> CrawlSummary {
        CrawlSummary {
            started_at: Utc::now(),
            duration: Duration::from_secs(4),
            workers: 2,
            urls_known: 12,
            pages_processed: 10,
            failed_fetches: 1,
            pages_known: 9,
            links: 30,
            redirects: 2,
            most_linked: vec![("HomePage".to_string(), 8)],
        }
    }

    #[test]
    fn test_rates() {
        let summary = summary();
        assert!((summary.rate() - 2.5).abs() < 1e-12);
        assert!((summary.success_rate() - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_rates_without_pages() {
        let mut summary = summary();
        summary.pages_processed = 0;
        summary.duration = Duration::ZERO;
        assert_eq!(summary.rate(), 0.0);
        assert_eq!(summary.success_rate(), 0.0);
    }
}
