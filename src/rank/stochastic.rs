use crate::graph::MergedView;
use crate::rank::{iterate_until_converged, ConvergencePolicy, RankRun};
use crate::GraphResult;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters of the random-surfer estimator
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticParams {
    /// Probability that the surfer jumps to a random page
    pub reset_probability: f64,
    pub steps_per_iteration: u64,
    pub max_iterations: usize,
    pub policy: ConvergencePolicy,
    pub seed: u64,
}

/// PageRank estimated by simulating a random surfer
///
/// The surfer starts on a random page. At every step it jumps to a uniformly
/// chosen page when the current page has no out-edges or with the reset
/// probability, and otherwise follows a uniformly chosen out-edge. Each
/// iteration walks `steps_per_iteration` steps and folds the visit counts
/// into the running visit frequencies, weighted by the steps taken so far.
pub fn stochastic_pagerank(view: &MergedView, params: &StochasticParams) -> GraphResult<RankRun> {
    let len = view.node_count();
    let pure = view.pure();
    if pure.is_empty() {
        return Ok(RankRun::empty(len));
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut cursor = pure[rng.random_range(0..pure.len())];
    let mut steps_so_far: u64 = 0;
    let steps = params.steps_per_iteration;

    iterate_until_converged(
        vec![0.0; len],
        params.max_iterations,
        params.policy,
        |iteration, prev| {
            let mut counts = vec![0u64; len];
            for _ in 0..steps {
                let targets = view.out_edges(cursor);
                cursor = if targets.is_empty() || rng.random_bool(params.reset_probability) {
                    pure[rng.random_range(0..pure.len())]
                } else {
                    targets[rng.random_range(0..targets.len())]
                };
                counts[cursor] += 1;
            }

            let previous_weight = steps_so_far as f64;
            let total = (steps_so_far + steps) as f64;
            steps_so_far += steps;

            tracing::trace!("Walk iteration {}: {} steps so far", iteration, steps_so_far);

            prev.iter()
                .zip(&counts)
                .map(|(&rank, &count)| (rank * previous_weight + count as f64) / total)
                .collect()
        },
    )
}
