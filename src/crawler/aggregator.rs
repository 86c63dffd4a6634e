//! Single consumer of crawl events
//!
//! The aggregator owns the crawl index and the edge log writer, so neither
//! needs a lock: every worker reports through one unbounded channel and the
//! aggregator applies the events in arrival order on its own blocking thread.

use crate::crawler::control::CrawlControl;
use crate::graph::{EdgeLogWriter, SymbolTable};
use crate::url::classify_path;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Something a worker learned about the wiki
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// Page `from` links to page `to`
    Link { from: String, to: String },
    /// Fetching `from` ended on page `to`
    Redirect { from: String, to: String },
}

/// In-memory link graph built during a crawl
///
/// Nodes are classified names (see `classify_path`), so `Main/Foo` and
/// `Foo` share one node here while the edge log keeps the raw names.
#[derive(Debug, Default)]
pub struct CrawlIndex {
    pub symbols: SymbolTable,
    /// Out-edges per node id, in discovery order
    pub links: Vec<Vec<usize>>,
    /// `(permanent, transient)` pairs reported by redirects
    pub aliases: Vec<(usize, usize)>,
}

impl CrawlIndex {
    pub fn page_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.iter().map(Vec::len).sum()
    }

    /// Pages by out-degree, descending; ties keep first-seen order
    pub fn most_linked(&self) -> Vec<(String, usize)> {
        let mut pages: Vec<(String, usize)> = self
            .symbols
            .iter()
            .map(|(id, name)| {
                let degree = self.links.get(id).map_or(0, Vec::len);
                (name.to_string(), degree)
            })
            .collect();
        pages.sort_by(|a, b| b.1.cmp(&a.1));
        pages
    }

    fn intern(&mut self, name: &str) -> usize {
        let id = self.symbols.intern(name);
        if self.links.len() <= id {
            self.links.resize_with(id + 1, Vec::new);
        }
        id
    }
}

/// Applies crawl events to the index and the optional edge log
pub struct Aggregator<W: Write> {
    index: CrawlIndex,
    edge_log: Option<EdgeLogWriter<W>>,
    control: Arc<CrawlControl>,
    events: u64,
}

impl<W: Write> Aggregator<W> {
    pub fn new(edge_log: Option<EdgeLogWriter<W>>, control: Arc<CrawlControl>) -> Self {
        Self {
            index: CrawlIndex::default(),
            edge_log,
            control,
            events: 0,
        }
    }

    /// Applies one event
    pub fn apply(&mut self, event: CrawlEvent) -> std::io::Result<()> {
        self.events += 1;
        match event {
            CrawlEvent::Link { from, to } => {
                let from_id = self.index.intern(classify_path(&from));
                let to_id = self.index.intern(classify_path(&to));
                self.index.links[from_id].push(to_id);

                if let Some(log) = self.edge_log.as_mut() {
                    log.write_link(&from, &to)?;
                }
            }
            CrawlEvent::Redirect { from, to } => {
                let transient = self.index.intern(classify_path(&from));
                let permanent = self.index.intern(classify_path(&to));
                if transient != permanent {
                    self.index.aliases.push((permanent, transient));
                }

                if let Some(log) = self.edge_log.as_mut() {
                    log.write_redirect(&from, &to)?;
                }
            }
        }

        self.control.set_pages_known(self.index.symbols.len());
        Ok(())
    }

    /// Writes buffered edge log lines through to the underlying writer
    pub fn flush(&mut self) -> std::io::Result<()> {
        match self.edge_log.as_mut() {
            Some(log) => log.flush(),
            None => Ok(()),
        }
    }

    /// Consumes events until every sender is gone
    ///
    /// Blocks the calling thread; run it under `spawn_blocking`. While the
    /// crawl is paused no events are taken off the channel, and the edge log
    /// is flushed once on entering the pause so it holds every applied event.
    pub fn run(mut self, mut events: UnboundedReceiver<CrawlEvent>) -> std::io::Result<CrawlIndex> {
        tracing::debug!("Aggregator started");
        let mut parked = false;

        loop {
            if !self.control.is_running() {
                if !parked {
                    self.flush()?;
                    parked = true;
                    tracing::debug!("Aggregator paused after {} events", self.events);
                }
                std::thread::sleep(self.control.pause_poll());
                continue;
            }
            parked = false;

            match events.blocking_recv() {
                Some(event) => self.apply(event)?,
                None => break,
            }
        }

        let (index, _) = self.finish()?;
        Ok(index)
    }

    /// Flushes the edge log and hands back the index and the log's writer
    pub fn finish(self) -> std::io::Result<(CrawlIndex, Option<W>)> {
        let written = self.edge_log.as_ref().map_or(0, EdgeLogWriter::written);
        let writer = self.edge_log.map(EdgeLogWriter::into_inner).transpose()?;

        tracing::info!(
            "Aggregated {} events into {} pages, {} edge log lines written",
            self.events,
            self.index.page_count(),
            written
        );

        Ok((self.index, writer))
    }

    pub fn index(&self) -> &CrawlIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn link(from: &str, to: &str) -> CrawlEvent {
        CrawlEvent::Link {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    fn redirect(from: &str, to: &str) -> CrawlEvent {
        CrawlEvent::Redirect {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    fn aggregator() -> Aggregator<Vec<u8>> {
        Aggregator::new(
            Some(EdgeLogWriter::new(Vec::new())),
            Arc::new(CrawlControl::new(Duration::from_millis(1))),
        )
    }

    #[test]
    fn test_links_use_classified_names() {
        let mut agg = aggregator();
        agg.apply(link("Main/HomePage", "Film/Casablanca")).unwrap();
        agg.apply(link("Main/HomePage", "Main/Tropes")).unwrap();
        agg.apply(link("Series/HomePage", "Film")).unwrap();

        let index = agg.index();
        let home = index.symbols.get("HomePage").unwrap();
        let film = index.symbols.get("Casablanca").unwrap();
        let tropes = index.symbols.get("Tropes").unwrap();
        let namespace = index.symbols.get("Film").unwrap();
        assert_eq!(index.links[home], vec![film, tropes, namespace]);
        assert_eq!(index.page_count(), 4);
        assert_eq!(index.link_count(), 3);
    }

    #[test]
    fn test_edge_log_keeps_raw_names() {
        let mut agg = aggregator();
        agg.apply(link("Main/A", "Film/B")).unwrap();
        agg.apply(redirect("Main/Old", "Main/New")).unwrap();

        let (_, writer) = agg.finish().unwrap();
        let log = String::from_utf8(writer.unwrap()).unwrap();
        assert_eq!(log, "Main/A -> Film/B\nMain/Old => Main/New\n");
    }

    #[test]
    fn test_redirect_records_alias_pair() {
        let mut agg = aggregator();
        agg.apply(redirect("Main/Old", "Main/New")).unwrap();
        // Both sides classify to the same name; nothing to alias
        agg.apply(redirect("Main/Same", "Same")).unwrap();

        let index = agg.index();
        let old = index.symbols.get("Old").unwrap();
        let new = index.symbols.get("New").unwrap();
        assert_eq!(index.aliases, vec![(new, old)]);
    }

    #[test]
    fn test_without_edge_log() {
        let mut agg: Aggregator<Vec<u8>> = Aggregator::new(
            None,
            Arc::new(CrawlControl::new(Duration::from_millis(1))),
        );
        agg.apply(link("Main/A", "Main/B")).unwrap();

        let (index, writer) = agg.finish().unwrap();
        assert!(writer.is_none());
        assert_eq!(index.page_count(), 2);
    }

    #[test]
    fn test_pages_known_tracks_symbols() {
        let control = Arc::new(CrawlControl::new(Duration::from_millis(1)));
        let mut agg: Aggregator<Vec<u8>> = Aggregator::new(None, control.clone());
        agg.apply(link("Main/A", "Main/B")).unwrap();
        agg.apply(link("Main/B", "Main/C")).unwrap();
        assert_eq!(control.pages_known(), 3);
    }

    #[test]
    fn test_most_linked() {
        let mut agg = aggregator();
        agg.apply(link("Main/A", "Main/B")).unwrap();
        agg.apply(link("Main/B", "Main/A")).unwrap();
        agg.apply(link("Main/B", "Main/C")).unwrap();

        let ranked = agg.index().most_linked();
        assert_eq!(ranked[0], ("B".to_string(), 2));
        assert_eq!(ranked[1], ("A".to_string(), 1));
        assert_eq!(ranked[2], ("C".to_string(), 0));
    }

    /// Writer whose contents stay readable while the aggregator owns it
    #[derive(Clone, Default)]
    struct SharedLog(Arc<Mutex<Vec<u8>>>);

    impl SharedLog {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_flush_writes_buffered_lines() {
        let shared = SharedLog::default();
        let mut agg = Aggregator::new(
            Some(EdgeLogWriter::new(shared.clone())),
            Arc::new(CrawlControl::new(Duration::from_millis(1))),
        );
        agg.apply(link("Main/A", "Main/B")).unwrap();
        assert_eq!(shared.contents(), "");

        agg.flush().unwrap();
        assert_eq!(shared.contents(), "Main/A -> Main/B\n");
    }

    #[tokio::test]
    async fn test_pause_flushes_edge_log() {
        let shared = SharedLog::default();
        let control = Arc::new(CrawlControl::new(Duration::from_millis(1)));
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(link("Main/A", "Main/B")).unwrap();

        let agg = Aggregator::new(Some(EdgeLogWriter::new(shared.clone())), control.clone());
        let task = tokio::task::spawn_blocking(move || agg.run(rx));

        while control.pages_known() < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        control.pause();
        // Wakes the aggregator if it is already waiting on the channel
        tx.send(link("Main/B", "Main/C")).unwrap();

        let mut waited = 0;
        while shared.contents().is_empty() && waited < 1000 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            waited += 1;
        }
        assert!(shared.contents().starts_with("Main/A -> Main/B\n"));

        control.resume();
        drop(tx);
        let index = task.await.unwrap().unwrap();
        assert_eq!(index.link_count(), 2);
        assert_eq!(shared.contents(), "Main/A -> Main/B\nMain/B -> Main/C\n");
    }

    #[tokio::test]
    async fn test_run_consumes_until_channel_closes() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(link("Main/A", "Main/B")).unwrap();
        tx.send(link("Main/B", "Main/C")).unwrap();
        drop(tx);

        let agg: Aggregator<Vec<u8>> = Aggregator::new(
            None,
            Arc::new(CrawlControl::new(Duration::from_millis(1))),
        );
        let index = tokio::task::spawn_blocking(move || agg.run(rx))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(index.page_count(), 3);
        assert_eq!(index.link_count(), 2);
    }
}
