//! # Lagrangian relaxation of resource upper bounds
//!
//! The resource constraints are moved into the objective, weighted by nonnegative multipliers. An
//! unconstrained shortest path is computed for the current multipliers, after which the
//! multipliers are moved in the direction of the violation. Every feasible path found on the way
//! is recorded.
use num_traits::Float;
use tracing::trace;

use crate::algorithm::shortest_path::{Cost, path_from_entries, shortest_path_with_costs, solution_cost, SolutionEntry};
use crate::data::dag::SortedDag;

/// Number of subgradient steps.
pub const LAGRANGIAN_ITERATIONS: u32 = 20;

/// Result of `lagrangian_shortest_path`.
#[derive(Debug, Clone, PartialEq)]
pub struct LagrangianSolution<T> {
    /// Cost of the cheapest recorded path, zero if no feasible path was found.
    pub cost: T,
    /// The dynamic programming tables of all feasible paths found, in order of discovery. No two
    /// consecutive tables encode the same path.
    pub solutions: Vec<Vec<SolutionEntry<T>>>,
    best: Option<usize>,
}

impl<T> LagrangianSolution<T> {
    /// Whether any feasible path was found.
    pub fn is_feasible(&self) -> bool {
        !self.solutions.is_empty()
    }

    /// The cheapest recorded path, if any.
    pub fn best_path(&self) -> Option<Vec<usize>> {
        self.best.map(|index| path_from_entries(&self.solutions[index]))
    }
}

/// Heuristically find a cheap path respecting resource upper bounds.
///
/// The costs of the graph are not changed, the multiplier-adjusted costs live in a separate array.
/// Node weights are multiplied with their multiplier; edge weights are not considered.
///
/// # Arguments
///
/// * `dag`: Graph with `K` resources on each node.
/// * `upper_bounds`: Bound on the total of each resource along the path.
///
/// # Return value
///
/// The recorded feasible paths. When none were found the cost is zero and the list is empty, which
/// is not an error.
pub fn lagrangian_shortest_path<T, const K: usize, const M: usize>(
    dag: &SortedDag<T, K, M>,
    upper_bounds: [T; K],
) -> LagrangianSolution<T>
where
    T: Cost + Float + From<i32>,
{
    const { assert!(K >= 1, "the Lagrangian heuristic needs at least one resource") };

    let mut result = LagrangianSolution { cost: T::zero(), solutions: Vec::new(), best: None };
    if dag.is_empty() {
        return result;
    }

    let mut multipliers = [T::zero(); K];
    let mut costs = dag.nodes().iter().map(|node| node.cost).collect::<Vec<_>>();
    for iteration in 0..LAGRANGIAN_ITERATIONS {
        let (_, entries) = shortest_path_with_costs(dag, &costs);
        let path = path_from_entries(&entries);
        if path.first() != Some(&0) {
            // The sink is unreachable, no choice of multipliers changes that
            break;
        }

        let mut usage = [T::zero(); K];
        for &i in &path {
            for (total, &weight) in usage.iter_mut().zip(&dag.node(i).weights) {
                *total = *total + <T as From<i32>>::from(weight);
            }
        }

        let step = T::one() / <T as From<i32>>::from(2 * (iteration as i32 + 1));
        let mut feasible = true;
        for w in 0..K {
            if usage[w] > upper_bounds[w] {
                feasible = false;
            }
            multipliers[w] = (multipliers[w] + step * (usage[w] - upper_bounds[w])).max(T::zero());
        }
        for (cost, node) in costs.iter_mut().zip(dag.nodes()) {
            *cost = node.weights.iter()
                .zip(&multipliers)
                .fold(node.cost, |total, (&weight, &multiplier)| total + multiplier * <T as From<i32>>::from(weight));
        }
        trace!(iteration, feasible, multipliers = ?multipliers, "subgradient step");

        if feasible && result.solutions.last() != Some(&entries) {
            let cost = solution_cost(dag, &path);
            if result.best.is_none() || cost < result.cost {
                result.cost = cost;
                result.best = Some(result.solutions.len());
            }
            result.solutions.push(entries);
        }
    }

    result
}
