//! Tab-separated rank file

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `name\trank` lines for every entry whose name starts with `prefix`
///
/// `ranked` is expected in descending rank order and is written as given.
/// Returns the number of lines written.
pub fn write_ranks<W: Write>(
    out: &mut W,
    ranked: &[(String, f64)],
    prefix: Option<&str>,
) -> std::io::Result<usize> {
    let mut written = 0;
    for (name, rank) in ranked {
        if prefix.is_some_and(|p| !name.starts_with(p)) {
            continue;
        }
        writeln!(out, "{}\t{}", name, rank)?;
        written += 1;
    }
    Ok(written)
}

/// Creates (or truncates) the rank file at `path` and fills it
pub fn write_rank_file(
    path: &Path,
    ranked: &[(String, f64)],
    prefix: Option<&str>,
) -> std::io::Result<usize> {
    let mut out = BufWriter::new(File::create(path)?);
    let written = write_ranks(&mut out, ranked, prefix)?;
    out.flush()?;

    tracing::info!("Wrote {} ranks to {}", written, path.display());
    Ok(written)
}
