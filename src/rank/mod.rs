//! PageRank estimators
//!
//! Both estimators run inside `iterate_until_converged` and stop as soon as
//! their `ConvergencePolicy` is satisfied or the iteration budget runs out:
//! - `matrix`: deterministic power iteration with dangling-mass redistribution
//! - `stochastic`: a seeded random surfer whose visit frequencies are averaged
//!   over all steps taken so far

mod convergence;
mod matrix;
mod stochastic;

pub use convergence::{descending_order, ConvergencePolicy};
pub use matrix::{matrix_pagerank, MatrixParams};
pub use stochastic::{stochastic_pagerank, StochasticParams};

use crate::GraphResult;

/// Outcome of an iterative rank estimation
#[derive(Debug, Clone, PartialEq)]
pub struct RankRun {
    /// One value per node id
    pub ranks: Vec<f64>,

    /// Iterations actually performed
    pub iterations: usize,

    /// Whether the policy was satisfied before the budget ran out
    pub converged: bool,
}

impl RankRun {
    /// All-zero result for a graph without rankable nodes
    pub fn empty(len: usize) -> Self {
        Self {
            ranks: vec![0.0; len],
            iterations: 0,
            converged: true,
        }
    }
}

/// Applies `step` until `policy` holds between two successive vectors
///
/// `step` receives the 1-based iteration number and the previous vector and
/// returns the next one. At most `max_iterations` steps are taken, and no
/// run stops before `policy.min_iterations()`.
pub fn iterate_until_converged<F>(
    initial: Vec<f64>,
    max_iterations: usize,
    policy: ConvergencePolicy,
    mut step: F,
) -> GraphResult<RankRun>
where
    F: FnMut(usize, &[f64]) -> Vec<f64>,
{
    let mut ranks = initial;

    for iteration in 1..=max_iterations {
        let next = step(iteration, &ranks);
        let converged =
            policy.has_converged(&ranks, &next)? && iteration >= policy.min_iterations();
        ranks = next;

        tracing::trace!("Iteration {}/{}", iteration, max_iterations);

        if converged {
            tracing::debug!("Converged after {} iterations", iteration);
            return Ok(RankRun {
                ranks,
                iterations: iteration,
                converged: true,
            });
        }
    }

    Ok(RankRun {
        ranks,
        iterations: max_iterations,
        converged: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphError;

    #[test]
    fn test_stops_on_convergence() {
        let run = iterate_until_converged(
            vec![1.0],
            100,
            ConvergencePolicy::ToleranceThreshold(0.1),
            |_, prev| vec![prev[0] / 2.0],
        )
        .unwrap();

        // 1 -> 0.5 -> 0.25 -> 0.125 -> 0.0625: the fourth step moves less than 0.1
        assert_eq!(run.iterations, 4);
        assert!(run.converged);
        assert_eq!(run.ranks, vec![0.0625]);
    }

    #[test]
    fn test_stops_at_iteration_budget() {
        let mut calls = 0;
        let run = iterate_until_converged(
            vec![0.0, 1.0],
            5,
            ConvergencePolicy::OrderStability,
            |_, prev| {
                calls += 1;
                vec![prev[1], prev[0]]
            },
        )
        .unwrap();

        assert_eq!(calls, 5);
        assert_eq!(run.iterations, 5);
        assert!(!run.converged);
    }

    #[test]
    fn test_order_stability_ignores_the_starting_order() {
        // The start ties everything; the first step keeps the id order only by chance
        let run = iterate_until_converged(
            vec![0.25; 4],
            100,
            ConvergencePolicy::OrderStability,
            |iteration, _| match iteration {
                1 => vec![0.4, 0.4, 0.1, 0.1],
                _ => vec![0.3, 0.4, 0.2, 0.1],
            },
        )
        .unwrap();

        assert_eq!(run.iterations, 3);
        assert!(run.converged);
    }

    #[test]
    fn test_step_changing_length_is_an_error() {
        let err = iterate_until_converged(
            vec![0.5, 0.5],
            3,
            ConvergencePolicy::OrderStability,
            |_, _| vec![1.0],
        )
        .unwrap_err();

        assert_eq!(err, GraphError::LengthMismatch { left: 2, right: 1 });
    }
}
