//! Output module for crawl summaries and rank reports
//!
//! This module handles:
//! - Printing the end-of-crawl summary
//! - Ranking a recorded edge log and reporting the top pages
//! - Exporting ranks as a tab-separated file and top edges as CSV

mod csv_export;
mod ranks;
mod summary;

pub use csv_export::{write_top_edges, write_top_edges_csv};
pub use ranks::{write_rank_file, write_ranks};
pub use summary::{print_summary, CrawlSummary};

use crate::config::{AnalysisConfig, Config};
use crate::graph::{open_edge_log, Graph};
use crate::rank::{MatrixParams, RankRun, StochasticParams};
use crate::WikiRankError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// PageRank estimator used by the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankMethod {
    /// Power iteration
    #[default]
    Matrix,
    /// Seeded random-surfer simulation
    Stochastic,
}

impl FromStr for RankMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "matrix" => Ok(Self::Matrix),
            "stochastic" | "walk" => Ok(Self::Stochastic),
            other => Err(format!(
                "unknown rank method '{}', expected 'matrix' or 'stochastic'",
                other
            )),
        }
    }
}

impl fmt::Display for RankMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matrix => write!(f, "matrix"),
            Self::Stochastic => write!(f, "stochastic"),
        }
    }
}

/// Result of ranking an edge log
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub method: RankMethod,
    pub run: RankRun,
    pub nodes: usize,
    pub edges: usize,
    pub redirects: usize,
    /// Highest ranked pages by `method`, descending
    pub top: Vec<(String, f64)>,
    /// Lines written to the rank file, when one is configured
    pub ranks_written: Option<usize>,
    /// Rows written to the CSV file, when one is configured
    pub csv_rows: Option<usize>,
}

fn matrix_params(analysis: &AnalysisConfig) -> Result<MatrixParams, WikiRankError> {
    Ok(MatrixParams {
        reset_probability: analysis.reset_probability,
        max_iterations: analysis.max_iterations,
        policy: analysis.convergence.policy()?,
    })
}

/// Runs the configured estimator over `graph`
pub fn rank_graph(
    graph: &mut Graph,
    analysis: &AnalysisConfig,
    method: RankMethod,
) -> Result<RankRun, WikiRankError> {
    let policy = analysis.convergence.policy()?;

    let run = match method {
        RankMethod::Matrix => graph.matrix_pagerank(&matrix_params(analysis)?)?.clone(),
        RankMethod::Stochastic => graph.stochastic_pagerank(&StochasticParams {
            reset_probability: analysis.reset_probability,
            steps_per_iteration: analysis.steps_per_iteration,
            max_iterations: analysis.max_iterations,
            policy,
            seed: analysis.seed,
        })?,
    };

    if !run.converged {
        tracing::warn!(
            "{} PageRank did not converge within {} iterations",
            method,
            analysis.max_iterations
        );
    }

    Ok(run)
}

/// Loads the edge log, ranks it, and writes the configured output files
pub fn run_analysis(config: &Config, method: RankMethod) -> Result<AnalysisReport, WikiRankError> {
    let path = Path::new(&config.output.edge_log);
    tracing::info!("Reading edge log {}", path.display());
    let mut graph = Graph::from_edge_log(open_edge_log(path)?)?;

    let run = rank_graph(&mut graph, &config.analysis, method)?;
    let ranked = graph.ranked(&run.ranks, usize::MAX);
    let top: Vec<(String, f64)> = ranked
        .iter()
        .take(config.analysis.top_n)
        .cloned()
        .collect();

    let ranks_written = match &config.output.rank_file {
        Some(rank_file) => Some(write_rank_file(
            Path::new(rank_file),
            &ranked,
            config.analysis.name_prefix.as_deref(),
        )?),
        None => None,
    };

    // The exported subgraph is always the matrix top-N; a matrix run above
    // is served from the graph's cache
    let csv_rows = match &config.output.csv_file {
        Some(csv_file) => {
            let selected = graph.top_n(config.analysis.top_n, &matrix_params(&config.analysis)?)?;
            Some(write_top_edges_csv(Path::new(csv_file), &graph, &selected)?)
        }
        None => None,
    };

    Ok(AnalysisReport {
        method,
        run,
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        redirects: graph.redirect_count(),
        top,
        ranks_written,
        csv_rows,
    })
}

/// Prints the top pages of a report to stdout
pub fn print_report(report: &AnalysisReport) {
    println!("=== PageRank ({}) ===\n", report.method);

    println!("Graph:");
    println!("  Nodes: {}", report.nodes);
    println!("  Edges: {}", report.edges);
    println!("  Redirects: {}", report.redirects);
    println!(
        "  Iterations: {} (converged: {})",
        report.run.iterations, report.run.converged
    );
    println!();

    println!("Top {} Pages:", report.top.len());
    for (i, (name, rank)) in report.top.iter().enumerate() {
        println!("  {:>4}. {:<40} {:.6e}", i + 1, name, rank);
    }
}
