//! # Topologically sorted directed acyclic graphs
//!
//! The graphs that pricing problems are solved on. Nodes are numbered such that every edge goes
//! from a lower to a higher index, which makes every shortest path computation a single forward
//! pass. The first node is the source and the last node the sink.
//!
//! Every node carries a cost and `K` integer resource weights, every edge a cost and `M` integer
//! weights.
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use num_traits::Zero;

use crate::error::DagError;

mod reduce;

pub use reduce::Translator;

/// An outgoing edge of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<T, const M: usize> {
    /// Index of the destination node, always larger than the index of the node owning the edge.
    pub to: usize,
    /// Cost of traversing the edge.
    pub cost: T,
    /// Resource consumed when traversing the edge.
    pub weights: [i32; M],
}

impl<T, const M: usize> Edge<T, M> {
    fn new(to: usize, cost: T) -> Self {
        Self { to, cost, weights: [0; M] }
    }
}

/// A node with its outgoing edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T, const K: usize, const M: usize> {
    /// Cost of visiting the node.
    pub cost: T,
    /// Resources consumed when visiting the node.
    pub weights: [i32; K],
    /// Outgoing edges.
    pub edges: Vec<Edge<T, M>>,
}

impl<T: Zero, const K: usize, const M: usize> Default for Node<T, K, M> {
    fn default() -> Self {
        Self {
            cost: T::zero(),
            weights: [0; K],
            edges: Vec::new(),
        }
    }
}

/// A DAG that is already topologically sorted, i.e. only has edges from `i` to `j` with `i < j`.
///
/// # Generic parameters
///
/// * `T`: Cost type, typically `f64` or an integer.
/// * `K`: Number of resource weights on every node.
/// * `M`: Number of resource weights on every edge.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedDag<T = f64, const K: usize = 1, const M: usize = 0> {
    nodes: Vec<Node<T, K, M>>,
}

impl<T, const K: usize, const M: usize> SortedDag<T, K, M>
where
    T: Copy + Zero,
{
    /// Create a graph with `num_nodes` nodes of zero cost and weight, and no edges.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            nodes: (0..num_nodes).map(|_| Node::default()).collect(),
        }
    }

    /// A copy of nodes `begin..end`, renumbered to start at zero.
    ///
    /// An empty terminal node is appended, and every edge leaving the window is redirected to it.
    /// When the window extends to the end of the graph the real sink is kept and no terminal is
    /// added.
    pub fn window(&self, begin: usize, end: usize) -> Self {
        debug_assert!(begin < end && end <= self.len());

        let mut nodes = self.nodes[begin..end].to_vec();
        if end < self.len() {
            nodes.push(Node::default());
        }
        let last = nodes.len() - 1;
        for node in &mut nodes {
            for edge in &mut node.edges {
                edge.to = (edge.to - begin).min(last);
            }
        }

        Self { nodes }
    }

    /// Add `delta` to the cost of node `i`.
    pub fn change_node_cost(&mut self, i: usize, delta: T) -> Result<(), DagError> {
        let node = self.node_mut(i)?;
        node.cost = node.cost + delta;
        Ok(())
    }
}

impl<T, const K: usize, const M: usize> SortedDag<T, K, M> {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether there are no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in topological order.
    pub fn nodes(&self) -> &[Node<T, K, M>] {
        &self.nodes
    }

    /// Node `i`.
    ///
    /// # Panics
    ///
    /// If `i` is out of range.
    pub fn node(&self, i: usize) -> &Node<T, K, M> {
        &self.nodes[i]
    }

    fn node_mut(&mut self, i: usize) -> Result<&mut Node<T, K, M>, DagError> {
        let len = self.nodes.len();
        self.nodes.get_mut(i).ok_or(DagError::NodeOutOfRange { index: i, len })
    }

    /// Set the cost of node `i`.
    pub fn set_node_cost(&mut self, i: usize, cost: T) -> Result<(), DagError> {
        self.node_mut(i)?.cost = cost;
        Ok(())
    }

    /// Set resource weight `w` of node `i`.
    pub fn set_node_weight(&mut self, i: usize, w: usize, weight: i32) -> Result<(), DagError> {
        debug_assert!(w < K);

        self.node_mut(i)?.weights[w] = weight;
        Ok(())
    }

    /// Add an edge from `i` to `j`.
    ///
    /// # Return value
    ///
    /// The new edge, such that its weights can be set.
    ///
    /// # Errors
    ///
    /// If `i >= j`, which would break the topological order, or if either node doesn't exist.
    pub fn add_edge(&mut self, i: usize, j: usize, cost: T) -> Result<&mut Edge<T, M>, DagError> {
        let len = self.nodes.len();
        if j >= len {
            return Err(DagError::NodeOutOfRange { index: j, len });
        }
        if i >= j {
            return Err(DagError::NotTopological { from: i, to: j });
        }

        let edges = &mut self.node_mut(i)?.edges;
        edges.push(Edge::new(j, cost));
        let last = edges.len() - 1;
        Ok(&mut edges[last])
    }

    /// Remove all edges leaving and entering node `i`.
    pub fn disconnect_node(&mut self, i: usize) -> Result<(), DagError> {
        self.node_mut(i)?.edges.clear();
        for node in &mut self.nodes[..i] {
            node.edges.retain(|edge| edge.to != i);
        }

        Ok(())
    }

    /// Write the graph in the Graphviz dot format.
    ///
    /// # Arguments
    ///
    /// * `node_name`: Label of each node.
    /// * `node_color`: Fill color of each node.
    /// * `rank`: Optionally, nodes with equal rank are drawn at the same height.
    pub fn write_dot<W: fmt::Write>(
        &self,
        out: &mut W,
        node_name: impl Fn(usize) -> String,
        node_color: impl Fn(usize) -> String,
        rank: Option<&dyn Fn(usize) -> i64>,
    ) -> fmt::Result {
        writeln!(out, "digraph dag {{")?;
        for (i, node) in self.nodes.iter().enumerate() {
            for edge in &node.edges {
                writeln!(out, "{} -> {};", i, edge.to)?;
            }
        }
        for i in 0..self.len() {
            writeln!(out, "{}[label=\"{}\", style=filled, fillcolor={}];", i, node_name(i), node_color(i))?;
        }

        if let Some(rank) = rank {
            let mut ranks = BTreeMap::<_, Vec<_>>::new();
            for i in 0..self.len() {
                ranks.entry(rank(i)).or_default().push(i);
            }
            writeln!(out, "edge[style=invis,dir=none];")?;
            for nodes in ranks.values() {
                writeln!(out, "{{ rank=same; {}}}", nodes.iter().join(" -> "))?;
            }
        }

        writeln!(out, "}}")
    }
}

impl<T, const K: usize, const M: usize> Display for SortedDag<T, K, M> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f, "{}: [{}]", i, node.edges.iter().map(|edge| edge.to).join(", "))?;
        }

        Ok(())
    }
}
