//! # Windowed decomposition
//!
//! The exact run length algorithm needs a table of size `nodes × resource × run length`, which
//! gets large for long horizons. This heuristic cuts the graph into consecutive windows and
//! solves them one after the other, each window starting from a node on the path found so far.
//!
//! Interior windows get an even share of the resource bounds. The path of a window is cut back to
//! the last node that is not inside a run, such that the next window can decide on the length of
//! that run. The last window contains the real sink and gets whatever is left of the bounds. The
//! stitched path is checked against all bounds before it is returned.
use tracing::debug;

use crate::algorithm::shortest_path::{consecutive_shortest_path, Cost, solution_cost};
use crate::data::dag::SortedDag;
use crate::error::PathError;

/// Find a cheap path within resource bounds respecting run lengths, one window at a time.
///
/// # Arguments
///
/// * `dag`: Graph with at least two node weights: the resource and the run marker.
/// * `lower`, `upper`: Bounds on the total resource.
/// * `min_consecutive`, `max_consecutive`: Bounds on run lengths, see `consecutive_shortest_path`.
/// * `num_splits`: Number of windows. Each window should contain at least five nodes.
///
/// # Return value
///
/// Cost and nodes of the stitched path.
///
/// # Errors
///
/// If the number of windows doesn't fit the graph, if a window has no feasible path, or if the
/// stitched path violates the bounds.
pub fn windowed_shortest_path<T: Cost, const K: usize, const M: usize>(
    dag: &SortedDag<T, K, M>,
    lower: i32,
    upper: i32,
    min_consecutive: i32,
    max_consecutive: i32,
    num_splits: usize,
) -> Result<(T, Vec<usize>), PathError> {
    const { assert!(K >= 2, "the second node weight marks runs") };

    let len = dag.len();
    if num_splits == 0 || 5 * num_splits > len {
        return Err(PathError::InvalidSplit { num_splits, len });
    }
    if num_splits == 1 {
        return consecutive_shortest_path(dag, lower, upper, min_consecutive, max_consecutive);
    }

    let window_len = len / num_splits;
    let share = |bound: i32| bound as f64 / num_splits as f64;
    let interior_bounds = (share(lower).ceil() as i32, share(upper).floor() as i32);

    let mut path: Vec<usize> = Vec::with_capacity(len);
    let mut start = 0;
    let mut end = window_len;
    for part in 0..num_splits {
        let last = part == num_splits - 1;

        let (window_lower, window_upper) = if last {
            let consumed = path[..path.len() - 1].iter().map(|&i| dag.node(i).weights[0]).sum::<i32>();
            (lower - consumed, upper - consumed)
        } else {
            interior_bounds
        };
        if window_upper < 0 {
            return Err(PathError::WindowedInfeasible("resource exhausted before the last window".to_string()));
        }

        let window = dag.window(start, end);
        let (_, window_path) = consecutive_shortest_path(
            &window, window_lower, window_upper, min_consecutive, max_consecutive,
        )?;
        debug!(part, start, end, nodes = window_path.len(), "solved window");

        // Interior windows end in an artificial terminal
        let keep = if last { window_path.len() } else { window_path.len() - 1 };
        for &i in &window_path[..keep] {
            let node = start + i;
            if path.last() != Some(&node) {
                path.push(node);
            }
        }

        if !last {
            while path.last().is_some_and(|&i| dag.node(i).weights[1] > 0) {
                path.pop();
            }
            start = *path.last().ok_or_else(|| {
                PathError::WindowedInfeasible("no node outside of a run to continue from".to_string())
            })?;
            end = if part == num_splits - 2 { len } else { end + window_len };
        }
    }

    verify(dag, &path, lower, upper, min_consecutive, max_consecutive)?;
    Ok((solution_cost(dag, &path), path))
}

fn verify<T, const K: usize, const M: usize>(
    dag: &SortedDag<T, K, M>,
    path: &[usize],
    lower: i32,
    upper: i32,
    min_consecutive: i32,
    max_consecutive: i32,
) -> Result<(), PathError> {
    let mut resource = 0;
    let mut consecutive = 0;
    for &i in path {
        let weights = &dag.node(i).weights;
        resource += weights[0];
        match weights[1] {
            0 => {
                if consecutive > 0 && consecutive < min_consecutive {
                    return Err(PathError::WindowedInfeasible(format!(
                        "run of length {consecutive} before node {i} is shorter than {min_consecutive}",
                    )));
                }
                consecutive = 0;
            },
            run if run > 0 => {
                consecutive += run;
                if consecutive > max_consecutive {
                    return Err(PathError::WindowedInfeasible(format!(
                        "run of length {consecutive} at node {i} is longer than {max_consecutive}",
                    )));
                }
            },
            _ => consecutive = 0,
        }
    }

    if resource < lower || resource > upper {
        return Err(PathError::WindowedInfeasible(format!(
            "resource {resource} is outside of [{lower}, {upper}]",
        )));
    }

    Ok(())
}
