//! # Shortest paths in sorted DAGs
//!
//! Pricing problems in column generation are shortest path problems over a `SortedDag`. Because
//! the nodes are topologically sorted, all algorithms here are forward dynamic programs:
//!
//! * `shortest_path`: no side constraints.
//! * `lagrangian_shortest_path`: a fast heuristic for resource upper bounds, relaxing them with
//!   multipliers that are updated with subgradient steps.
//! * `resource_constrained_shortest_path`: exact, one resource with lower and upper bound.
//! * `consecutive_shortest_path`: exact, one resource plus bounds on the length of runs of
//!   consecutive flagged nodes.
//! * `windowed_shortest_path`: the previous algorithm on a sequence of windows, for large graphs.
//!
//! The cost of a path is the cost of its first node, plus for every edge on it the edge cost and
//! the cost of the destination node.
use std::fmt::Debug;

use num_traits::{Bounded, FromPrimitive, Num};

use crate::data::dag::SortedDag;

mod consecutive;
mod lagrangian;
mod resource;
mod windowed;

pub use consecutive::consecutive_shortest_path;
pub use lagrangian::{LAGRANGIAN_ITERATIONS, LagrangianSolution, lagrangian_shortest_path};
pub use resource::resource_constrained_shortest_path;
pub use windowed::windowed_shortest_path;

/// Numbers that can be used as path costs.
pub trait Cost: Copy + PartialOrd + Num + Bounded + FromPrimitive + Debug {
    /// Cost of a node that was not reached, large but far from overflowing when added to.
    fn unreachable() -> Self {
        Self::max_value() / (Self::one() + Self::one())
    }
}

impl<T> Cost for T where T: Copy + PartialOrd + Num + Bounded + FromPrimitive + Debug {}

/// One cell of a shortest path dynamic program.
#[derive(Debug, Clone, Copy)]
pub struct SolutionEntry<T> {
    /// Predecessor on the best path found so far, `None` if the node wasn't reached (or is the
    /// source).
    pub prev: Option<usize>,
    /// Cost of the best path found so far.
    pub cost: T,
}

impl<T: Cost> Default for SolutionEntry<T> {
    fn default() -> Self {
        Self {
            prev: None,
            cost: T::unreachable(),
        }
    }
}

/// Entries are compared by predecessor only, the cost is ignored.
///
/// Two dynamic programming tables with the same predecessors encode the same paths, which is what
/// the Lagrangian heuristic uses to skip recording a path twice in a row.
impl<T> PartialEq for SolutionEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.prev == other.prev
    }
}

/// Find the cheapest path from the first to the last node.
///
/// # Return value
///
/// The cost of the cheapest path together with the dynamic programming table, from which the path
/// can be read with `path_from_entries`. If the last node is not reachable, the cost is
/// `Cost::unreachable()`. An empty graph has cost zero and an empty table.
pub fn shortest_path<T: Cost, const K: usize, const M: usize>(
    dag: &SortedDag<T, K, M>,
) -> (T, Vec<SolutionEntry<T>>) {
    let costs = dag.nodes().iter().map(|node| node.cost).collect::<Vec<_>>();
    shortest_path_with_costs(dag, &costs)
}

/// Like `shortest_path`, but with node costs taken from `node_costs` instead of the graph.
pub fn shortest_path_with_costs<T: Cost, const K: usize, const M: usize>(
    dag: &SortedDag<T, K, M>,
    node_costs: &[T],
) -> (T, Vec<SolutionEntry<T>>) {
    debug_assert_eq!(node_costs.len(), dag.len());

    if dag.is_empty() {
        return (T::zero(), Vec::new());
    }

    let mut solution = vec![SolutionEntry::default(); dag.len()];
    solution[0].cost = node_costs[0];
    for (i, node) in dag.nodes().iter().enumerate() {
        if i > 0 && solution[i].prev.is_none() {
            continue;
        }
        for edge in &node.edges {
            let cost = solution[i].cost + node_costs[edge.to] + edge.cost;
            if cost < solution[edge.to].cost {
                solution[edge.to] = SolutionEntry { prev: Some(i), cost };
            }
        }
    }

    let cost = solution[solution.len() - 1].cost;
    (cost, solution)
}

/// The path ending in the last node encoded by a dynamic programming table, source first.
///
/// If the last node was not reached, the path consists of that node only.
pub fn path_from_entries<T>(entries: &[SolutionEntry<T>]) -> Vec<usize> {
    if entries.is_empty() {
        return Vec::new();
    }

    let mut path = vec![entries.len() - 1];
    let mut current = entries.len() - 1;
    while let Some(prev) = entries[current].prev {
        path.push(prev);
        current = prev;
    }
    path.reverse();

    path
}

/// Cost of a path of node indices.
///
/// Consecutive nodes should be connected by an edge; if there are several, the first one is used.
pub fn solution_cost<T: Cost, const K: usize, const M: usize>(
    dag: &SortedDag<T, K, M>,
    path: &[usize],
) -> T {
    let Some(&first) = path.first() else {
        return T::zero();
    };

    path.windows(2).fold(dag.node(first).cost, |cost, step| {
        let (from, to) = (step[0], step[1]);
        match dag.node(from).edges.iter().find(|edge| edge.to == to) {
            Some(edge) => cost + dag.node(to).cost + edge.cost,
            None => cost,
        }
    })
}

#[cfg(test)]
mod test {
    use crate::algorithm::shortest_path::{Cost, path_from_entries, shortest_path, solution_cost, SolutionEntry};
    use crate::data::dag::SortedDag;

    #[test]
    fn straight() {
        let mut dag = SortedDag::<f64, 2>::new(6);
        for i in 0..6 {
            dag.set_node_cost(i, (i + 1) as f64).unwrap();
            if i > 0 {
                dag.add_edge(i - 1, i, 0.0).unwrap();
            }
        }

        let (cost, solution) = shortest_path(&dag);
        assert_eq!(cost, 21.0);
        assert_eq!(path_from_entries(&solution), vec![0, 1, 2, 3, 4, 5]);
        assert!(!dag.reduce_graph().unwrap().made_changes);
    }

    #[test]
    fn chain_of_five() {
        let mut dag = SortedDag::<f64>::new(5);
        for (i, cost) in [0.0, 1.0, 2.0, 3.0, 0.0].into_iter().enumerate() {
            dag.set_node_cost(i, cost).unwrap();
            if i > 0 {
                dag.add_edge(i - 1, i, 0.0).unwrap();
            }
        }

        assert_eq!(shortest_path(&dag).0, 6.0);
    }

    #[test]
    fn small() {
        let mut dag = SortedDag::<f64, 2>::new(10);
        for i in 1..10 {
            dag.add_edge(i - 1, i, 1.0).unwrap();
        }
        dag.add_edge(3, 6, 1.0).unwrap();

        let (cost, solution) = shortest_path(&dag);
        assert_eq!(cost, 7.0);
        assert_eq!(solution[9].prev, Some(8));
        assert_eq!(solution[6].prev, Some(3));
        assert_eq!(solution[1].prev, Some(0));
        assert_eq!(solution[0].prev, None);

        let path = path_from_entries(&solution);
        assert_eq!(path, vec![0, 1, 2, 3, 6, 7, 8, 9]);
        assert_eq!(solution_cost(&dag, &path), 7.0);
        assert!(!dag.reduce_graph().unwrap().made_changes);
    }

    #[test]
    fn empty_and_single() {
        let dag = SortedDag::<f64, 2>::new(0);
        let (cost, solution) = shortest_path(&dag);
        assert_eq!(cost, 0.0);
        assert!(solution.is_empty());
        assert!(path_from_entries(&solution).is_empty());
        assert_eq!(solution_cost(&dag, &[]), 0.0);

        let mut dag = SortedDag::<f64, 2>::new(1);
        dag.set_node_cost(0, 3.0).unwrap();
        let (cost, solution) = shortest_path(&dag);
        assert_eq!(cost, 3.0);
        assert_eq!(solution.len(), 1);
    }

    #[test]
    fn unreachable_sink() {
        let mut dag = SortedDag::<i32>::new(3);
        dag.add_edge(0, 1, 1).unwrap();

        let (cost, solution) = shortest_path(&dag);
        assert_eq!(cost, i32::unreachable());
        assert_eq!(path_from_entries(&solution), vec![2]);
    }

    #[test]
    fn diamond() {
        let mut dag = SortedDag::<f64>::new(4);
        for (i, j) in [(0, 1), (0, 2), (1, 3), (2, 3)] {
            dag.add_edge(i, j, 0.0).unwrap();
        }
        for (i, cost) in [0.0, 5.0, 1.0, 0.0].into_iter().enumerate() {
            dag.set_node_cost(i, cost).unwrap();
        }

        let (cost, solution) = shortest_path(&dag);
        assert_eq!(cost, 1.0);
        assert_eq!(path_from_entries(&solution), vec![0, 2, 3]);
    }

    #[test]
    fn entries_compare_predecessors_only() {
        let a = SolutionEntry { prev: Some(1), cost: 3.0 };
        let b = SolutionEntry { prev: Some(1), cost: -7.0 };
        let c = SolutionEntry { prev: Some(2), cost: 3.0 };

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
