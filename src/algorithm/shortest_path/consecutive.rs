//! # Exact shortest path with a resource window and run lengths
//!
//! The second node weight marks runs: a positive weight extends the current run by that amount, a
//! zero weight ends the run (which then needs to have at least the minimum length) and a negative
//! weight resets the run without checking it. The state of the dynamic program is (node, resource
//! consumed, length of the current run).
use crate::algorithm::shortest_path::Cost;
use crate::algorithm::shortest_path::resource::{edge_weight, trivial_path};
use crate::data::dag::SortedDag;
use crate::data::grid::Grid3;
use crate::error::PathError;

type State = (usize, usize, usize);

#[derive(Debug, Clone, Copy)]
struct Entry<T> {
    prev: Option<State>,
    cost: T,
}

/// Find the cheapest path within resource bounds that respects run lengths.
///
/// # Arguments
///
/// * `dag`: Graph with at least two node weights: the resource and the run marker.
/// * `lower`: Minimum total resource, negative values are treated as zero.
/// * `upper`: Maximum total resource.
/// * `min_consecutive`: Minimum length of a run ended by a node with run weight zero. A run may
///   be shorter when it is ended by a node with negative run weight.
/// * `max_consecutive`: Maximum length of any run.
///
/// # Errors
///
/// If the bounds are invalid, if a negative accumulated resource is encountered or if there is no
/// feasible path.
pub fn consecutive_shortest_path<T: Cost, const K: usize, const M: usize>(
    dag: &SortedDag<T, K, M>,
    lower: i32,
    upper: i32,
    min_consecutive: i32,
    max_consecutive: i32,
) -> Result<(T, Vec<usize>), PathError> {
    const { assert!(K >= 2, "the second node weight marks runs") };
    const { assert!(M <= 1, "at most one edge weight is supported") };

    if let Some(result) = trivial_path(dag, lower, upper) {
        return result;
    }

    let lower = lower.max(0);
    if lower > upper {
        return Err(PathError::InvalidBounds { lower: lower.into(), upper: upper.into() });
    }
    if max_consecutive < 1 {
        return Err(PathError::InvalidConsecutiveBounds {
            min: min_consecutive.into(),
            max: max_consecutive.into(),
        });
    }

    let first_weight = dag.node(0).weights[0];
    if first_weight < 0 {
        return Err(PathError::NegativeResource { node: 0 });
    }
    if first_weight > upper {
        return Err(PathError::NoFeasiblePath);
    }

    let shape = [dag.len(), upper as usize + 1, max_consecutive as usize + 1];
    let mut partial = Grid3::new(shape, Entry { prev: None, cost: T::unreachable() });
    let start = (0, first_weight as usize, 0);
    partial[start].cost = dag.node(0).cost;

    for (i, node) in dag.nodes().iter().enumerate() {
        for c in 0..shape[1] {
            for d in 0..shape[2] {
                if partial[(i, c, d)].prev.is_none() && (i, c, d) != start {
                    continue;
                }

                let cost_so_far = partial[(i, c, d)].cost;
                for edge in &node.edges {
                    let to = dag.node(edge.to);

                    let weight = c as i32 + to.weights[0] + edge_weight(edge);
                    if weight < 0 {
                        return Err(PathError::NegativeResource { node: edge.to });
                    }
                    if weight > upper {
                        continue;
                    }

                    let run = to.weights[1];
                    let consecutive = match run {
                        0 => {
                            if d > 0 && (d as i32) < min_consecutive {
                                continue;
                            }
                            0
                        },
                        run if run > 0 => {
                            let consecutive = d as i32 + run;
                            if consecutive > max_consecutive {
                                continue;
                            }
                            consecutive
                        },
                        _ => 0,
                    };

                    let cost = cost_so_far + to.cost + edge.cost;
                    let cell = &mut partial[(edge.to, weight as usize, consecutive as usize)];
                    if cost < cell.cost {
                        *cell = Entry { prev: Some((i, c, d)), cost };
                    }
                }
            }
        }
    }

    let sink = dag.len() - 1;
    let mut best: Option<State> = None;
    for c in lower as usize..shape[1] {
        for d in 0..shape[2] {
            let entry = partial[(sink, c, d)];
            if entry.prev.is_some() && best.is_none_or(|b| entry.cost < partial[b].cost) {
                best = Some((sink, c, d));
            }
        }
    }
    let best = best.ok_or(PathError::NoFeasiblePath)?;

    let mut path = vec![sink];
    let mut state = best;
    while let Some(prev) = partial[state].prev {
        path.push(prev.0);
        state = prev;
    }
    path.reverse();

    Ok((partial[best].cost, path))
}
