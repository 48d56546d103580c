//! Shortest paths on small random graphs, checked by enumerating all paths.
use proptest::prelude::*;

use colgen::algorithm::shortest_path::{
    consecutive_shortest_path, path_from_entries, resource_constrained_shortest_path, shortest_path,
    solution_cost, windowed_shortest_path,
};
use colgen::data::dag::SortedDag;

type Dag = SortedDag<f64, 2>;

/// Random graph with integral costs, nonnegative resources and run weights between -1 and 2.
fn dag_strategy(min_nodes: usize, max_nodes: usize) -> impl Strategy<Value = Dag> {
    (min_nodes..=max_nodes).prop_flat_map(|n| {
        let edges = proptest::collection::vec(proptest::bool::weighted(0.4), n * (n - 1) / 2);
        let costs = proptest::collection::vec(-5..=5_i32, n);
        let resources = proptest::collection::vec(0..=3_i32, n);
        let runs = proptest::collection::vec(-1..=2_i32, n);

        (edges, costs, resources, runs).prop_map(move |(edges, costs, resources, runs)| {
            let mut dag = Dag::new(n);
            let pairs = (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j)));
            for ((i, j), present) in pairs.zip(edges) {
                if present {
                    dag.add_edge(i, j, 0.0).unwrap();
                }
            }
            for i in 0..n {
                dag.set_node_cost(i, f64::from(costs[i])).unwrap();
                dag.set_node_weight(i, 0, resources[i]).unwrap();
                dag.set_node_weight(i, 1, runs[i]).unwrap();
            }
            // Paths start outside of a run
            dag.set_node_weight(0, 1, -1).unwrap();
            dag
        })
    })
}

/// Every path from the first to the last node.
fn all_paths(dag: &Dag) -> Vec<Vec<usize>> {
    fn extend(dag: &Dag, path: &mut Vec<usize>, paths: &mut Vec<Vec<usize>>) {
        let Some(&current) = path.last() else { return };
        if current == dag.len() - 1 {
            paths.push(path.clone());
            return;
        }
        for edge in &dag.node(current).edges {
            path.push(edge.to);
            extend(dag, path, paths);
            path.pop();
        }
    }

    let mut paths = Vec::new();
    extend(dag, &mut vec![0], &mut paths);
    paths
}

fn resource(dag: &Dag, path: &[usize]) -> i32 {
    path.iter().map(|&i| dag.node(i).weights[0]).sum()
}

/// Whether all runs on the path have an allowed length.
fn runs_allowed(dag: &Dag, path: &[usize], min_consecutive: i32, max_consecutive: i32) -> bool {
    let mut consecutive = 0;
    for &i in &path[1..] {
        match dag.node(i).weights[1] {
            0 => {
                if consecutive > 0 && consecutive < min_consecutive {
                    return false;
                }
                consecutive = 0;
            },
            run if run > 0 => {
                consecutive += run;
                if consecutive > max_consecutive {
                    return false;
                }
            },
            _ => consecutive = 0,
        }
    }

    true
}

fn is_path(dag: &Dag, path: &[usize]) -> bool {
    path.first() == Some(&0)
        && path.last() == Some(&(dag.len() - 1))
        && path.windows(2).all(|pair| dag.node(pair[0]).edges.iter().any(|edge| edge.to == pair[1]))
}

fn cheapest(dag: &Dag, feasible: impl Fn(&[usize]) -> bool) -> Option<f64> {
    all_paths(dag).into_iter()
        .filter(|path| feasible(path))
        .map(|path| solution_cost(dag, &path))
        .min_by(f64::total_cmp)
}

proptest! {
    #[test]
    fn unconstrained(dag in dag_strategy(2, 8)) {
        let (cost, entries) = shortest_path(&dag);
        let path = path_from_entries(&entries);

        match cheapest(&dag, |_| true) {
            Some(expected) => {
                prop_assert_eq!(cost, expected);
                prop_assert!(is_path(&dag, &path));
                prop_assert_eq!(solution_cost(&dag, &path), cost);
            },
            None => prop_assert_ne!(path.first(), Some(&0)),
        }
    }

    #[test]
    fn resource_window(dag in dag_strategy(2, 8), lower in 0..=4_i32, width in 0..=6_i32) {
        let upper = lower + width;
        let expected = cheapest(&dag, |path| (lower..=upper).contains(&resource(&dag, path)));

        match (resource_constrained_shortest_path(&dag, lower, upper), expected) {
            (Ok((cost, path)), Some(expected)) => {
                prop_assert_eq!(cost, expected);
                prop_assert!(is_path(&dag, &path));
                prop_assert!((lower..=upper).contains(&resource(&dag, &path)));
                prop_assert_eq!(solution_cost(&dag, &path), cost);
            },
            (Err(_), None) => {},
            (result, expected) => prop_assert!(false, "{:?} but expected {:?}", result, expected),
        }
    }

    #[test]
    fn run_lengths(
        dag in dag_strategy(2, 8),
        upper in 0..=10_i32,
        min_consecutive in 1..=3_i32,
        max_consecutive in 1..=4_i32,
    ) {
        let expected = cheapest(&dag, |path| {
            resource(&dag, path) <= upper && runs_allowed(&dag, path, min_consecutive, max_consecutive)
        });

        match (consecutive_shortest_path(&dag, 0, upper, min_consecutive, max_consecutive), expected) {
            (Ok((cost, path)), Some(expected)) => {
                prop_assert_eq!(cost, expected);
                prop_assert!(is_path(&dag, &path));
                prop_assert!(runs_allowed(&dag, &path, min_consecutive, max_consecutive));
                prop_assert_eq!(solution_cost(&dag, &path), cost);
            },
            (Err(_), None) => {},
            (result, expected) => prop_assert!(false, "{:?} but expected {:?}", result, expected),
        }
    }

    #[test]
    fn windows_are_feasible(
        (dag, num_splits) in dag_strategy(10, 16).prop_flat_map(|dag| {
            let max_splits = dag.len() / 5;
            (Just(dag), 1..=max_splits)
        }),
        lower in 0..=6_i32,
        width in 0..=8_i32,
        min_consecutive in 1..=2_i32,
        max_consecutive in 2..=4_i32,
    ) {
        let upper = lower + width;
        let result = windowed_shortest_path(&dag, lower, upper, min_consecutive, max_consecutive, num_splits);
        if let Ok((cost, path)) = result {
            prop_assert!(is_path(&dag, &path));
            prop_assert!((lower..=upper).contains(&resource(&dag, &path)));
            prop_assert!(runs_allowed(&dag, &path, min_consecutive, max_consecutive));
            prop_assert_eq!(solution_cost(&dag, &path), cost);

            // A heuristic never beats the exact algorithm
            let (exact, _) = consecutive_shortest_path(&dag, lower, upper, min_consecutive, max_consecutive).unwrap();
            prop_assert!(exact <= cost);
            if num_splits == 1 {
                prop_assert_eq!(exact, cost);
            }
        }
    }

    #[test]
    fn reduction(dag in dag_strategy(3, 8)) {
        let mut reduced = dag.clone();
        match reduced.reduce_graph() {
            Ok(translator) => {
                prop_assert!(!reduced.reduce_graph().unwrap().made_changes);
                prop_assert_eq!(translator.made_changes, reduced.len() < dag.len());
                prop_assert_eq!(shortest_path(&reduced).0, shortest_path(&dag).0);

                for (new, old) in translator.new_to_old.iter().enumerate() {
                    prop_assert_eq!(old.len(), 1);
                    prop_assert_eq!(translator.old_to_new[old[0]], Some(new));
                }
            },
            Err(_) => prop_assert!(all_paths(&dag).is_empty()),
        }
    }
}
