use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// State shared by the coordinator, the workers and the aggregator
///
/// The running flag is only checked at the start of a work cycle, so pausing
/// never interrupts a fetch already in flight.
#[derive(Debug)]
pub struct CrawlControl {
    running: AtomicBool,
    pause_poll: Duration,
    failed_fetches: AtomicU64,
    pages_known: AtomicUsize,
}

impl CrawlControl {
    pub fn new(pause_poll: Duration) -> Self {
        Self {
            running: AtomicBool::new(true),
            pause_poll,
            failed_fetches: AtomicU64::new(0),
            pages_known: AtomicUsize::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn pause(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    /// How long a paused participant idles before looking at the flag again
    pub fn pause_poll(&self) -> Duration {
        self.pause_poll
    }

    pub fn record_failed_fetch(&self) {
        self.failed_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed_fetches(&self) -> u64 {
        self.failed_fetches.load(Ordering::Relaxed)
    }

    pub fn set_pages_known(&self, pages: usize) {
        self.pages_known.store(pages, Ordering::Relaxed);
    }

    pub fn pages_known(&self) -> usize {
        self.pages_known.load(Ordering::Relaxed)
    }
}
