//! # Exact shortest path with a resource window
//!
//! A dynamic program over (node, resource consumed so far). Resource weights are integers, so the
//! table has `upper + 1` columns per node.
use crate::algorithm::shortest_path::{Cost, SolutionEntry};
use crate::data::dag::{Edge, SortedDag};
use crate::data::grid::Grid;
use crate::error::PathError;

/// Weight of an edge, zero for graphs without edge weights.
pub(super) fn edge_weight<T, const M: usize>(edge: &Edge<T, M>) -> i32 {
    edge.weights.first().copied().unwrap_or(0)
}

/// The trivial cases shared by the exact algorithms.
///
/// # Return value
///
/// `Some` result if the graph has less than two nodes.
pub(super) fn trivial_path<T: Cost, const K: usize, const M: usize>(
    dag: &SortedDag<T, K, M>,
    lower: i32,
    upper: i32,
) -> Option<Result<(T, Vec<usize>), PathError>> {
    match dag.len() {
        0 => Some(Ok((T::zero(), Vec::new()))),
        1 => {
            let node = dag.node(0);
            let weight = node.weights[0];
            Some(if lower <= weight && weight <= upper {
                Ok((node.cost, vec![0]))
            } else {
                Err(PathError::NoFeasiblePath)
            })
        },
        _ => None,
    }
}

/// Find the cheapest path whose total resource lies within bounds.
///
/// The resource is the first node weight plus, if the graph has edge weights, the first edge
/// weight. Accumulated resource may never become negative.
///
/// # Arguments
///
/// * `dag`: Graph to search.
/// * `lower`: Minimum total resource of the path.
/// * `upper`: Maximum total resource of the path.
///
/// # Return value
///
/// Cost and nodes of the cheapest feasible path.
///
/// # Errors
///
/// If the bounds are inverted, if a negative accumulated resource is encountered, or if no path
/// satisfies the bounds.
pub fn resource_constrained_shortest_path<T: Cost, const K: usize, const M: usize>(
    dag: &SortedDag<T, K, M>,
    lower: i32,
    upper: i32,
) -> Result<(T, Vec<usize>), PathError> {
    const { assert!(K >= 1, "the resource is the first node weight") };
    const { assert!(M <= 1, "at most one edge weight is supported") };

    if lower > upper {
        return Err(PathError::InvalidBounds { lower: lower.into(), upper: upper.into() });
    }
    if let Some(result) = trivial_path(dag, lower, upper) {
        return result;
    }

    let first_weight = dag.node(0).weights[0];
    if first_weight < 0 {
        return Err(PathError::NegativeResource { node: 0 });
    }
    if first_weight > upper {
        return Err(PathError::NoFeasiblePath);
    }

    let columns = upper as usize + 1;
    let mut partial = Grid::new(dag.len(), columns, SolutionEntry::<T>::default());
    partial[(0, first_weight as usize)].cost = dag.node(0).cost;
    // Index of the edge into each cell, parallel edges may differ in weight
    let mut via = Grid::new(dag.len(), columns, 0);
    let reached = |partial: &Grid<SolutionEntry<T>>, i: usize, c: usize| {
        partial[(i, c)].prev.is_some() || (i == 0 && c == first_weight as usize)
    };

    for (i, node) in dag.nodes().iter().enumerate() {
        for c in 0..columns {
            if !reached(&partial, i, c) {
                continue;
            }

            let cost_so_far = partial[(i, c)].cost;
            for (e, edge) in node.edges.iter().enumerate() {
                let to = dag.node(edge.to);
                let weight = c as i32 + to.weights[0] + edge_weight(edge);
                if weight < 0 {
                    return Err(PathError::NegativeResource { node: edge.to });
                }
                if weight > upper {
                    continue;
                }

                let cost = cost_so_far + to.cost + edge.cost;
                let cell = &mut partial[(edge.to, weight as usize)];
                if cost < cell.cost {
                    *cell = SolutionEntry { prev: Some(i), cost };
                    via[(edge.to, weight as usize)] = e;
                }
            }
        }
    }

    let sink = dag.len() - 1;
    let mut best: Option<usize> = None;
    for c in lower.max(0) as usize..columns {
        if partial[(sink, c)].prev.is_some() && best.is_none_or(|b| partial[(sink, c)].cost < partial[(sink, b)].cost) {
            best = Some(c);
        }
    }
    let mut c = best.ok_or(PathError::NoFeasiblePath)?;
    let cost = partial[(sink, c)].cost;

    let mut path = vec![sink];
    let mut current = sink;
    while let Some(prev) = partial[(current, c)].prev {
        let edge = &dag.node(prev).edges[via[(current, c)]];
        c = (c as i32 - dag.node(current).weights[0] - edge_weight(edge)) as usize;
        current = prev;
        path.push(current);
    }
    path.reverse();

    Ok((cost, path))
}
