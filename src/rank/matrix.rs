use crate::graph::MergedView;
use crate::rank::{iterate_until_converged, ConvergencePolicy, RankRun};
use crate::GraphResult;

/// Parameters of the power-iteration estimator
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixParams {
    /// Probability that the surfer jumps to a random page
    pub reset_probability: f64,
    pub max_iterations: usize,
    pub policy: ConvergencePolicy,
}

/// PageRank by power iteration over the merged view
///
/// Each edge `u -> v` gives `v` a share `1/outdegree(u)` of `u`'s rank. Pages
/// without out-edges spread their rank evenly over all pages, so the vector
/// keeps summing to 1. Redirect sources stay at 0.
pub fn matrix_pagerank(view: &MergedView, params: &MatrixParams) -> GraphResult<RankRun> {
    let len = view.node_count();
    let pure = view.pure();
    if pure.is_empty() {
        return Ok(RankRun::empty(len));
    }

    let n = pure.len() as f64;

    // incoming[v] lists (u, 1/outdegree(u)) for every edge u -> v
    let mut incoming: Vec<Vec<(usize, f64)>> = vec![Vec::new(); len];
    let mut dangling = Vec::new();
    for &u in pure {
        let targets = view.out_edges(u);
        if targets.is_empty() {
            dangling.push(u);
            continue;
        }
        let weight = 1.0 / targets.len() as f64;
        for &v in targets {
            incoming[v].push((u, weight));
        }
    }

    tracing::debug!(
        "Power iteration over {} pages, {} dangling",
        pure.len(),
        dangling.len()
    );

    let mut initial = vec![0.0; len];
    for &u in pure {
        initial[u] = 1.0 / n;
    }

    let damping = 1.0 - params.reset_probability;
    let reset_contrib = params.reset_probability / n;

    iterate_until_converged(initial, params.max_iterations, params.policy, |_, prev| {
        let dangling_mass: f64 = dangling.iter().map(|&d| prev[d]).sum();
        let base = damping * dangling_mass / n + reset_contrib;

        let mut next = vec![0.0; len];
        for &v in pure {
            let link_contrib: f64 = incoming[v].iter().map(|&(u, w)| w * prev[u]).sum();
            next[v] = damping * link_contrib + base;
        }
        next
    })
}
