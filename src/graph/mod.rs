//! Page graph for the analysis stage
//!
//! This module provides:
//! - `SymbolTable`: name/id interning shared by the crawl and analysis stages
//! - `Graph`: adjacency with redirect and merge resolution
//! - The edge log format written by the crawler and read back here

pub mod edge_log;
mod engine;
mod symbols;

pub use edge_log::{open_edge_log, read_edge_log, EdgeLogWriter, EdgeOp, EdgeRecord};
pub use engine::{Graph, MergedView};
pub use symbols::SymbolTable;
