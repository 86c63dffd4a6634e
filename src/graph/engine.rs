//! Directed page graph with redirect and merge resolution

use crate::graph::edge_log::{read_edge_log, EdgeOp};
use crate::graph::SymbolTable;
use crate::rank::{matrix_pagerank, stochastic_pagerank, MatrixParams, RankRun, StochasticParams};
use crate::{EdgeLogError, GraphError, GraphResult};
use std::collections::HashMap;
use std::io::BufRead;

/// Directed multigraph of wiki pages
///
/// Edges are stored under the ids they were recorded with. Redirects map a
/// transient id to the id it resolves to, and `aliases` lists, for each
/// permanent id, the transient ids merged into it in registration order.
#[derive(Debug, Default)]
pub struct Graph {
    symbols: SymbolTable,
    links: Vec<Vec<usize>>,
    redirects: HashMap<usize, usize>,
    aliases: HashMap<usize, Vec<usize>>,
    matrix_cache: Option<(MatrixParams, RankRun)>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from an edge log
    ///
    /// Links are added verbatim and redirects are merged with `merge_nodes`.
    /// A redirect the graph refuses aborts the load with its line number.
    pub fn from_edge_log<R: BufRead>(reader: R) -> Result<Self, EdgeLogError> {
        let mut graph = Self::new();

        let records = read_edge_log(reader, |line, record| {
            match record.op {
                EdgeOp::Link => {
                    graph.add_link(&record.from, &record.to);
                }
                EdgeOp::Redirect => graph
                    .merge_nodes(&record.from, &record.to)
                    .map_err(|source| EdgeLogError::Graph { line, source })?,
            }
            Ok(())
        })?;

        tracing::info!(
            "Loaded {} edges: {} nodes, {} redirects",
            records,
            graph.node_count(),
            graph.redirect_count()
        );

        Ok(graph)
    }

    fn intern(&mut self, name: &str) -> usize {
        let id = self.symbols.intern(name);
        if id == self.links.len() {
            self.links.push(Vec::new());
            self.matrix_cache = None;
        }
        id
    }

    /// Appends the directed edge `from -> to`
    pub fn add_link(&mut self, from: &str, to: &str) {
        let from_id = self.intern(from);
        let to_id = self.intern(to);
        self.links[from_id].push(to_id);
        self.matrix_cache = None;
    }

    /// Records that `from` is a transient identity of `to`
    ///
    /// Unlike `merge_nodes` this does not register `from` as an alias, so
    /// `links(to)` does not include `from`'s edges.
    pub fn add_redirect(&mut self, from: &str, to: &str) -> GraphResult<()> {
        let from_id = self.intern(from);
        let to_id = self.intern(to);
        self.check_new_redirect(from_id, to_id)?;

        self.redirects.insert(from_id, to_id);
        self.matrix_cache = None;
        Ok(())
    }

    /// Merges `from` into `to`, keeping `to`
    ///
    /// `from` becomes a redirect to the permanent node behind `to`, and
    /// every alias of `from` followed by `from` itself is appended to that
    /// node's alias list.
    pub fn merge_nodes(&mut self, from: &str, to: &str) -> GraphResult<()> {
        let from_id = self.intern(from);
        let to_id = self.intern(to);
        let permanent = self.check_new_redirect(from_id, to_id)?;

        self.redirects.insert(from_id, permanent);
        let moved = self.aliases.remove(&from_id).unwrap_or_default();
        let merged = self.aliases.entry(permanent).or_default();
        merged.extend(moved);
        merged.push(from_id);

        self.matrix_cache = None;
        Ok(())
    }

    /// Validates a redirect and returns the permanent id it would point at
    fn check_new_redirect(&self, from_id: usize, to_id: usize) -> GraphResult<usize> {
        if let Some(&existing) = self.redirects.get(&from_id) {
            return Err(GraphError::DoubleRedirect {
                from: from_id,
                existing,
            });
        }

        let permanent = self.resolve(to_id)?;
        if permanent == from_id {
            return Err(GraphError::RedirectCycle { start: from_id });
        }

        Ok(permanent)
    }

    /// Interns `name` and follows its redirect chain to the permanent id
    pub fn index(&mut self, name: &str) -> GraphResult<usize> {
        let id = self.intern(name);
        self.resolve(id)
    }

    /// Resolves `name` without interning it
    pub fn lookup(&self, name: &str) -> GraphResult<Option<usize>> {
        self.symbols.get(name).map(|id| self.resolve(id)).transpose()
    }

    /// Follows redirects from `id` to the terminal id
    pub fn resolve(&self, id: usize) -> GraphResult<usize> {
        let mut current = id;
        let mut hops = 0;

        while let Some(&next) = self.redirects.get(&current) {
            hops += 1;
            // A chain longer than the redirect table must revisit a node
            if hops > self.redirects.len() {
                return Err(GraphError::RedirectCycle { start: id });
            }
            current = next;
        }

        Ok(current)
    }

    /// Direct out-edges of `id`
    ///
    /// Fails with `MergedNode` when `id` redirects elsewhere; its edges are
    /// only reachable through the node it was merged into.
    pub fn links_of(&self, id: usize) -> GraphResult<&[usize]> {
        if self.redirects.contains_key(&id) {
            return Err(GraphError::MergedNode(id));
        }

        self.links
            .get(id)
            .map(Vec::as_slice)
            .ok_or(GraphError::UnknownNode(id))
    }

    /// Out-edges of the page called `name`, merged aliases included
    ///
    /// The name is resolved first. The result holds the permanent node's own
    /// edges followed by each alias's edges in alias-registration order.
    /// Unknown names have no edges.
    pub fn links(&self, name: &str) -> GraphResult<Vec<usize>> {
        let Some(id) = self.lookup(name)? else {
            return Ok(Vec::new());
        };

        let mut output = self.links[id].clone();
        for &alias in self.aliases.get(&id).map(Vec::as_slice).unwrap_or_default() {
            output.extend_from_slice(&self.links[alias]);
        }

        Ok(output)
    }

    /// Aliases merged into `id`, in registration order
    pub fn aliases(&self, id: usize) -> &[usize] {
        self.aliases.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_redirect(&self, id: usize) -> bool {
        self.redirects.contains_key(&id)
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.symbols.name(id)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Number of interned ids, redirect sources included
    pub fn node_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn edge_count(&self) -> usize {
        self.links.iter().map(Vec::len).sum()
    }

    pub fn redirect_count(&self) -> usize {
        self.redirects.len()
    }

    /// Builds the graph both rank estimators walk
    ///
    /// Only pure ids (not redirect sources) are nodes. Every stored edge is
    /// re-attached between the permanent ids of its endpoints.
    pub fn merged_view(&self) -> GraphResult<MergedView> {
        let terminals = (0..self.node_count())
            .map(|id| self.resolve(id))
            .collect::<GraphResult<Vec<_>>>()?;

        let mut out = vec![Vec::new(); self.node_count()];
        for (source, targets) in self.links.iter().enumerate() {
            let from = terminals[source];
            out[from].extend(targets.iter().map(|&t| terminals[t]));
        }

        let pure = (0..self.node_count())
            .filter(|id| !self.redirects.contains_key(id))
            .collect();

        Ok(MergedView { pure, out })
    }

    /// Matrix PageRank, cached per parameter set until the graph changes
    pub fn matrix_pagerank(&mut self, params: &MatrixParams) -> GraphResult<&RankRun> {
        let run = match self.matrix_cache.take() {
            Some((cached, run)) if cached == *params => run,
            _ => {
                let run = matrix_pagerank(&self.merged_view()?, params)?;
                tracing::info!(
                    "Matrix PageRank finished after {} iterations (converged: {})",
                    run.iterations,
                    run.converged
                );
                run
            }
        };

        Ok(&self.matrix_cache.insert((params.clone(), run)).1)
    }

    /// Random-walk PageRank; deterministic for a given seed
    pub fn stochastic_pagerank(&self, params: &StochasticParams) -> GraphResult<RankRun> {
        let run = stochastic_pagerank(&self.merged_view()?, params)?;
        tracing::info!(
            "Stochastic PageRank finished after {} iterations (converged: {})",
            run.iterations,
            run.converged
        );
        Ok(run)
    }

    /// Names of the `n` highest ranked pages by matrix PageRank, descending
    pub fn top_n(&mut self, n: usize, params: &MatrixParams) -> GraphResult<Vec<(String, f64)>> {
        let ranks = self.matrix_pagerank(params)?.ranks.clone();
        Ok(self.ranked(&ranks, n))
    }

    /// Sorts pure nodes by `ranks`, descending with ties by ascending id
    pub fn ranked(&self, ranks: &[f64], n: usize) -> Vec<(String, f64)> {
        let mut order: Vec<usize> = (0..ranks.len().min(self.node_count()))
            .filter(|id| !self.is_redirect(*id))
            .collect();
        order.sort_by(|&a, &b| ranks[b].total_cmp(&ranks[a]).then(a.cmp(&b)));

        order
            .into_iter()
            .take(n)
            .filter_map(|id| self.name(id).map(|name| (name.to_string(), ranks[id])))
            .collect()
    }
}

/// Redirect-free adjacency over the permanent nodes of a `Graph`
///
/// Vectors are indexed by the original ids; redirect sources have no edges
/// and are not listed in `pure`.
#[derive(Debug, Clone)]
pub struct MergedView {
    pure: Vec<usize>,
    out: Vec<Vec<usize>>,
}

impl MergedView {
    /// Ids that are not redirect sources, ascending
    pub fn pure(&self) -> &[usize] {
        &self.pure
    }

    pub fn out_edges(&self, id: usize) -> &[usize] {
        &self.out[id]
    }

    /// Length of rank vectors over this view
    pub fn node_count(&self) -> usize {
        self.out.len()
    }
}
