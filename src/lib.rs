//! wikirank: a wiki link-graph crawler and PageRank engine
//!
//! This crate crawls a wiki site with a pool of concurrent workers, records every
//! internal link and redirect to an edge log, and later ranks the pages of that
//! log with either a random-walk simulation or matrix power iteration.

pub mod config;
pub mod crawler;
pub mod graph;
pub mod output;
pub mod rank;
pub mod url;

use thiserror::Error;

/// Main error type for wikirank operations
#[derive(Debug, Error)]
pub enum WikiRankError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Edge log error: {0}")]
    EdgeLog(#[from] EdgeLogError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Start address '{0}' is not a linkable page name")]
    InvalidStart(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid convergence mode: {0}")]
    InvalidConvergence(String),
}

/// Errors raised by the graph engine and the rank estimators
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Node {0} has been merged into another node")]
    MergedNode(usize),

    #[error("Redirect cycle or runaway chain starting at node {start}")]
    RedirectCycle { start: usize },

    #[error("Node {from} already redirects to node {existing}")]
    DoubleRedirect { from: usize, existing: usize },

    #[error("Rank vectors differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Unknown node id {0}")]
    UnknownNode(usize),
}

/// Edge log reading errors
#[derive(Debug, Error)]
pub enum EdgeLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed edge on line {line}: '{content}'")]
    Malformed { line: u64, content: String },

    #[error("Edge on line {line} is invalid: {source}")]
    Graph { line: u64, source: GraphError },
}

/// Result type alias for wikirank operations
pub type Result<T> = std::result::Result<T, WikiRankError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for graph operations
pub type GraphResult<T> = std::result::Result<T, GraphError>;

// Re-export commonly used types
pub use config::Config;
pub use graph::{Graph, SymbolTable};
pub use rank::ConvergencePolicy;
pub use url::{classify_path, LinkNormalizer};
