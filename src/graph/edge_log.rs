//! The line-oriented edge log shared by the crawl and analysis stages
//!
//! Each line holds one edge, `<from> <op> <to>`, where `op` is `->` for a link
//! and `=>` for a redirect. Names never contain whitespace.

use crate::EdgeLogError;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Lines between two progress messages while reading
pub const PROGRESS_INTERVAL: u64 = 1_000_000;

/// Kind of edge recorded on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOp {
    Link,
    Redirect,
}

impl EdgeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "->",
            Self::Redirect => "=>",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "->" => Some(Self::Link),
            "=>" => Some(Self::Redirect),
            _ => None,
        }
    }
}

/// One parsed edge log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub from: String,
    pub op: EdgeOp,
    pub to: String,
}

impl EdgeRecord {
    /// Parses a single line; `None` when it does not have the `<from> <op> <to>` shape
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let from = tokens.next()?;
        let op = EdgeOp::parse(tokens.next()?)?;
        let to = tokens.next()?;
        if tokens.next().is_some() {
            return None;
        }

        Some(Self {
            from: from.to_string(),
            op,
            to: to.to_string(),
        })
    }
}

impl fmt::Display for EdgeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.from, self.op.as_str(), self.to)
    }
}

/// Streams an edge log, calling `visit` with each record and its 1-based line number
///
/// Blank lines are skipped. The first malformed line aborts the read.
/// Returns the number of records visited.
pub fn read_edge_log<R, F>(reader: R, visit: F) -> Result<u64, EdgeLogError>
where
    R: BufRead,
    F: FnMut(u64, EdgeRecord) -> Result<(), EdgeLogError>,
{
    read_with_progress(reader, PROGRESS_INTERVAL, visit, |line_number, line| {
        tracing::info!("Read {} edge log lines ({})", line_number, line.trim());
    })
}

/// `read_edge_log` with `progress` called on every `interval`-th line
fn read_with_progress<R, F, P>(
    reader: R,
    interval: u64,
    mut visit: F,
    mut progress: P,
) -> Result<u64, EdgeLogError>
where
    R: BufRead,
    F: FnMut(u64, EdgeRecord) -> Result<(), EdgeLogError>,
    P: FnMut(u64, &str),
{
    let mut records = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index as u64 + 1;

        if line_number % interval == 0 {
            progress(line_number, &line);
        }

        if line.trim().is_empty() {
            continue;
        }

        let record = EdgeRecord::parse(&line).ok_or_else(|| EdgeLogError::Malformed {
            line: line_number,
            content: line.clone(),
        })?;
        visit(line_number, record)?;
        records += 1;
    }

    Ok(records)
}

/// Opens an edge log file for streaming
pub fn open_edge_log(path: &Path) -> Result<BufReader<File>, EdgeLogError> {
    Ok(BufReader::new(File::open(path)?))
}

/// Buffered edge log writer
pub struct EdgeLogWriter<W: Write> {
    out: BufWriter<W>,
    written: u64,
}

impl EdgeLogWriter<File> {
    /// Creates (or truncates) the edge log at `path`
    pub fn create(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> EdgeLogWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: BufWriter::new(inner),
            written: 0,
        }
    }

    /// Appends a `from -> to` line
    pub fn write_link(&mut self, from: &str, to: &str) -> std::io::Result<()> {
        self.write_edge(from, EdgeOp::Link, to)
    }

    /// Appends a `from => to` line
    pub fn write_redirect(&mut self, from: &str, to: &str) -> std::io::Result<()> {
        self.write_edge(from, EdgeOp::Redirect, to)
    }

    fn write_edge(&mut self, from: &str, op: EdgeOp, to: &str) -> std::io::Result<()> {
        writeln!(self.out, "{} {} {}", from, op.as_str(), to)?;
        self.written += 1;
        Ok(())
    }

    /// Number of lines written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> std::io::Result<W> {
        self.out.into_inner().map_err(|e| e.into_error())
    }
}
