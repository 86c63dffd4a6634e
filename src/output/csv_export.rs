//! CSV edge list of the highest ranked pages

use crate::graph::Graph;
use crate::WikiRankError;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

/// Writes every merged-view edge between two of the `top` pages
///
/// Rows follow the order of `top`, then the order the edges were recorded in.
/// Returns the number of rows written, header excluded.
pub fn write_top_edges<W: Write>(
    out: W,
    graph: &Graph,
    top: &[(String, f64)],
) -> Result<usize, WikiRankError> {
    let view = graph.merged_view()?;

    let mut ids = Vec::with_capacity(top.len());
    for (name, _) in top {
        if let Some(id) = graph.lookup(name)? {
            ids.push(id);
        }
    }
    let selected: HashSet<usize> = ids.iter().copied().collect();

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Source", "Target"])?;

    let mut rows = 0;
    for &from in &ids {
        let Some(from_name) = graph.name(from) else {
            continue;
        };
        for &to in view.out_edges(from) {
            if !selected.contains(&to) {
                continue;
            }
            if let Some(to_name) = graph.name(to) {
                writer.write_record([from_name, to_name])?;
                rows += 1;
            }
        }
    }

    writer.flush()?;
    Ok(rows)
}

/// Creates (or truncates) the CSV file at `path` and fills it
pub fn write_top_edges_csv(
    path: &Path,
    graph: &Graph,
    top: &[(String, f64)],
) -> Result<usize, WikiRankError> {
    let file = std::fs::File::create(path)?;
    let rows = write_top_edges(file, graph, top)?;

    tracing::info!("Wrote {} edges between top pages to {}", rows, path.display());
    Ok(rows)
}
