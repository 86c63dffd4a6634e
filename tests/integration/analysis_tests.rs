//! Integration tests for ranking recorded edge logs

use std::path::Path;
use tempfile::TempDir;
use wikirank::config::{parse_config, Config};
use wikirank::graph::{open_edge_log, Graph};
use wikirank::output::{run_analysis, RankMethod};
use wikirank::WikiRankError;

const FOUR_NODE_LOG: &str = "A -> B\nB -> C\nC -> A\nB -> D\n";

const LONG_RUN: &str = "max-iterations = 1000";

fn write_log(dir: &TempDir, contents: &str) -> String {
    let path = dir.path().join("links.txt");
    std::fs::write(&path, contents).unwrap();
    path.display().to_string()
}

fn create_test_config(dir: &TempDir, log: &str, extra_analysis: &str) -> Config {
    let toml = format!(
        r#"
[output]
edge-log = "{log}"
rank-file = "{ranks}"
csv-file = "{csv}"

[analysis]
convergence = 1e-10
steps-per-iteration = 20000
top-n = 2
{extra}
"#,
        log = log,
        ranks = dir.path().join("ranks.tsv").display(),
        csv = dir.path().join("graph.csv").display(),
        extra = extra_analysis,
    );
    parse_config(&toml).expect("test config is valid")
}

fn rank_of(report: &[(String, f64)], name: &str) -> f64 {
    report
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, r)| *r)
        .unwrap_or_else(|| panic!("{} not ranked", name))
}

fn read_ranks(path: &Path) -> Vec<(String, f64)> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| {
            let (name, rank) = line.split_once('\t').unwrap();
            (name.to_string(), rank.parse().unwrap())
        })
        .collect()
}

#[test]
fn test_end_to_end_matrix_ranking() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, FOUR_NODE_LOG);
    let config = create_test_config(&dir, &log, LONG_RUN);

    let report = run_analysis(&config, RankMethod::Matrix).unwrap();
    assert!(report.run.converged);

    let ranks = read_ranks(&dir.path().join("ranks.tsv"));
    assert_eq!(ranks.len(), 4);

    let (a, b, c, d) = (
        rank_of(&ranks, "A"),
        rank_of(&ranks, "B"),
        rank_of(&ranks, "C"),
        rank_of(&ranks, "D"),
    );
    assert!(a > d && b > d);
    // C and D both receive half of B's rank and nothing else
    assert!(c >= d - 1e-9);
    assert!((a + b + c + d - 1.0).abs() < 1e-9);

    // Descending order in the file
    assert!(ranks.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[test]
fn test_methods_agree_on_top_two() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, FOUR_NODE_LOG);
    let config = create_test_config(&dir, &log, "max-iterations = 30");

    let matrix = run_analysis(&config, RankMethod::Matrix).unwrap();
    let stochastic = run_analysis(&config, RankMethod::Stochastic).unwrap();

    let names = |top: &[(String, f64)]| top.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>();
    assert_eq!(names(&matrix.top), vec!["B", "A"]);
    assert_eq!(names(&stochastic.top), vec!["B", "A"]);

    let d = stochastic.run.ranks[3];
    assert!(rank_of(&stochastic.top, "A") > d);
    assert!(rank_of(&stochastic.top, "B") > d);
}

#[test]
fn test_csv_holds_edges_between_top_pages() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, FOUR_NODE_LOG);
    let config = create_test_config(&dir, &log, LONG_RUN);

    let report = run_analysis(&config, RankMethod::Matrix).unwrap();
    assert_eq!(report.csv_rows, Some(1));

    let csv = std::fs::read_to_string(dir.path().join("graph.csv")).unwrap();
    assert_eq!(csv, "Source,Target\nA,B\n");
}

#[test]
fn test_csv_selection_uses_matrix_ranks_for_either_method() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, FOUR_NODE_LOG);
    let config = create_test_config(&dir, &log, "max-iterations = 30");

    let report = run_analysis(&config, RankMethod::Stochastic).unwrap();
    assert_eq!(report.method, RankMethod::Stochastic);
    assert_eq!(report.csv_rows, Some(1));

    let csv = std::fs::read_to_string(dir.path().join("graph.csv")).unwrap();
    assert_eq!(csv, "Source,Target\nA,B\n");
}

#[test]
fn test_rank_file_prefix_filter() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        "Main/Home -> Film/Casablanca\nMain/Home -> Film/Metropolis\nFilm/Casablanca -> Main/Home\n",
    );
    let config = create_test_config(&dir, &log, "max-iterations = 1000\nname-prefix = \"Film/\"");

    let report = run_analysis(&config, RankMethod::Matrix).unwrap();
    assert_eq!(report.ranks_written, Some(2));

    let ranks = read_ranks(&dir.path().join("ranks.tsv"));
    assert!(ranks.iter().all(|(name, _)| name.starts_with("Film/")));
}

#[test]
fn test_redirects_merge_rank() {
    let dir = TempDir::new().unwrap();
    let log = write_log(
        &dir,
        "A -> Old\nB -> New\nOld => New\nNew -> A\nOld -> B\n",
    );
    let config = create_test_config(&dir, &log, LONG_RUN);

    let report = run_analysis(&config, RankMethod::Matrix).unwrap();
    assert_eq!(report.redirects, 1);

    let ranks = read_ranks(&dir.path().join("ranks.tsv"));
    assert_eq!(ranks.len(), 3);
    assert!(ranks.iter().all(|(name, _)| name != "Old"));
    assert_eq!(ranks[0].0, "New");
}

#[test]
fn test_graph_links_after_merge() {
    let log = "A -> B\nOld -> C\nOld => A\nA -> D\n";
    let graph = Graph::from_edge_log(log.as_bytes()).unwrap();

    let names: Vec<&str> = graph
        .links("A")
        .unwrap()
        .into_iter()
        .filter_map(|id| graph.name(id))
        .collect();
    assert_eq!(names, vec!["B", "D", "C"]);
}

#[test]
fn test_malformed_log_reports_line() {
    let dir = TempDir::new().unwrap();
    let log = write_log(&dir, "A -> B\n\nB C\n");
    let config = create_test_config(&dir, &log, LONG_RUN);

    let err = run_analysis(&config, RankMethod::Matrix).unwrap_err();
    match err {
        WikiRankError::EdgeLog(e) => assert!(e.to_string().contains("line 3"), "{}", e),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_log_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.txt");
    assert!(open_edge_log(&missing).is_err());

    let config = create_test_config(&dir, &missing.display().to_string(), LONG_RUN);
    assert!(run_analysis(&config, RankMethod::Stochastic).is_err());
}
