use crate::{GraphError, GraphResult};

/// Rule deciding when two successive rank vectors are stable enough
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvergencePolicy {
    /// Converged when both vectors sort the nodes in the same descending order
    OrderStability,
    /// Converged when no node moved by `tolerance` or more
    ToleranceThreshold(f64),
}

impl ConvergencePolicy {
    /// First iteration whose result may count as converged
    ///
    /// Starting vectors are uniform or all zero, and their order is just the
    /// ascending-id tie break, so order stability only counts from the
    /// second step on.
    pub fn min_iterations(&self) -> usize {
        match self {
            Self::OrderStability => 2,
            Self::ToleranceThreshold(_) => 1,
        }
    }

    /// Compares the previous and current vectors
    ///
    /// Vectors of different lengths are a caller bug and fail with
    /// `LengthMismatch` instead of being compared on their common prefix.
    pub fn has_converged(&self, previous: &[f64], current: &[f64]) -> GraphResult<bool> {
        if previous.len() != current.len() {
            return Err(GraphError::LengthMismatch {
                left: previous.len(),
                right: current.len(),
            });
        }

        Ok(match self {
            Self::OrderStability => descending_order(previous) == descending_order(current),
            Self::ToleranceThreshold(tolerance) => {
                max_abs_difference(previous, current) < *tolerance
            }
        })
    }
}

/// Node ids sorted by descending value, ties by ascending id
pub fn descending_order(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));
    order
}

fn max_abs_difference(previous: &[f64], current: &[f64]) -> f64 {
    previous
        .iter()
        .zip(current)
        .map(|(p, c)| (p - c).abs())
        .fold(0.0, f64::max)
}
