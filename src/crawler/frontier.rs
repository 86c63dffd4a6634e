//! Deduplicating work queue shared by the fetch workers
//!
//! The frontier is split into two parts:
//! - `SeenSet` decides admission: an address is admitted the first time it is
//!   put and never again, even after it has been fetched
//! - `WorkQueue` delivers admitted addresses in FIFO order and tracks how many
//!   of them are still unprocessed, shutting down once that reaches zero

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Every address ever admitted to the frontier
#[derive(Debug, Default)]
pub struct SeenSet {
    items: Mutex<HashSet<String>>,
}

impl SeenSet {
    /// Inserts `item`, returning true if it had never been seen
    pub fn insert(&self, item: &str) -> bool {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if items.contains(item) {
            return false;
        }
        items.insert(item.to_string())
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<String>,
    /// Items pushed but not yet marked done
    unfinished: usize,
    closed: bool,
}

/// FIFO of admitted addresses with blocking delivery
#[derive(Debug, Default)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl WorkQueue {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, item: String) {
        {
            let mut state = self.lock();
            state.pending.push_back(item);
            state.unfinished += 1;
        }
        self.notify.notify_one();
    }

    /// Waits for the next item; `None` once the queue is closed and drained
    pub async fn pop(&self) -> Option<String> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before inspecting the state so a push or close that
            // happens in between still wakes this waiter
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(item) = state.pending.pop_front() {
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Marks one delivered item as processed
    ///
    /// When nothing is pending and no delivered item is still being processed,
    /// the queue closes itself and wakes every waiter.
    pub fn task_done(&self) {
        let drained = {
            let mut state = self.lock();
            state.unfinished = state.unfinished.saturating_sub(1);
            if state.unfinished == 0 && state.pending.is_empty() {
                state.closed = true;
            }
            state.closed
        };

        if drained {
            self.notify.notify_waiters();
        }
    }

    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Concurrency-safe frontier delivering each address at most once
#[derive(Debug, Default)]
pub struct Frontier {
    seen: SeenSet,
    queue: WorkQueue,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits `item` unless it was ever put before; returns whether it was admitted
    pub fn put(&self, item: &str) -> bool {
        if !self.seen.insert(item) {
            return false;
        }
        self.queue.push(item.to_string());
        true
    }

    /// Waits for the next address; `None` once the crawl is complete or shut down
    pub async fn get(&self) -> Option<String> {
        self.queue.pop().await
    }

    /// Marks an address returned by `get` as processed
    pub fn task_done(&self) {
        self.queue.task_done();
    }

    /// Stops delivery; waiting and future `get` calls return `None` once drained
    pub fn shutdown(&self) {
        self.queue.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.queue.is_closed()
    }

    /// Addresses admitted but not yet delivered
    pub fn size(&self) -> usize {
        self.queue.len()
    }

    /// Addresses ever admitted
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn has_seen(&self, item: &str) -> bool {
        self.seen.contains(item)
    }
}
