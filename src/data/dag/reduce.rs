//! # Shrinking a graph
//!
//! Removing nodes that can't lie on any source-sink path, and contracting chains of nodes that
//! have to be traversed anyway. Both operations renumber the nodes; a `Translator` maps the old
//! indices to the new ones and back.
use fifo_set::FIFOSet;
use index_utils::remove_indices;
use num_traits::Zero;
use tracing::debug;

use crate::data::dag::{Node, SortedDag};
use crate::error::DagError;

/// Mapping from and to a new set of node indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translator {
    /// Whether the graph was modified at all.
    pub made_changes: bool,
    /// For each old index, the new index, or `None` if the node was removed.
    pub old_to_new: Vec<Option<usize>>,
    /// For each new index, the old indices that were merged into it, sorted.
    pub new_to_old: Vec<Vec<usize>>,
}

impl Translator {
    fn from_old_to_new(old_to_new: Vec<Option<usize>>, new_len: usize) -> Self {
        let mut new_to_old = vec![Vec::new(); new_len];
        for (old, new) in old_to_new.iter().enumerate() {
            if let Some(new) = new {
                new_to_old[*new].push(old);
            }
        }

        Self {
            made_changes: true,
            old_to_new,
            new_to_old,
        }
    }
}

impl<T, const K: usize, const M: usize> SortedDag<T, K, M>
where
    T: Copy + Zero,
{
    /// Remove all nodes that can't be part of a path from the first to the last node.
    ///
    /// # Return value
    ///
    /// A translator from and to the new set of indices. If no changes were made, `made_changes`
    /// is false and the maps are empty.
    ///
    /// # Errors
    ///
    /// If the last node can't be reached from the first.
    pub fn reduce_graph(&mut self) -> Result<Translator, DagError> {
        let len = self.len();
        if len <= 2 {
            return Ok(Translator::default());
        }

        let mut forward_reachable = vec![false; len];
        forward_reachable[0] = true;
        let mut queue = std::iter::once(0).collect::<FIFOSet<_>>();
        while let Some(i) = queue.pop() {
            for edge in &self.nodes[i].edges {
                if !forward_reachable[edge.to] {
                    forward_reachable[edge.to] = true;
                    queue.push(edge.to);
                }
            }
        }
        if !forward_reachable[len - 1] {
            return Err(DagError::NoPath);
        }

        let mut backward_reachable = vec![false; len];
        backward_reachable[len - 1] = true;
        for i in (0..len - 1).rev() {
            backward_reachable[i] = self.nodes[i].edges.iter().any(|edge| backward_reachable[edge.to]);
        }

        let to_remove = (0..len)
            .filter(|&i| !forward_reachable[i] || !backward_reachable[i])
            .collect::<Vec<_>>();
        if to_remove.is_empty() {
            return Ok(Translator::default());
        }

        let mut old_to_new = vec![None; len];
        let mut new_len = 0;
        for i in 0..len {
            if forward_reachable[i] && backward_reachable[i] {
                old_to_new[i] = Some(new_len);
                new_len += 1;
            }
        }

        remove_indices(&mut self.nodes, &to_remove);
        for node in &mut self.nodes {
            node.edges.retain(|edge| old_to_new[edge.to].is_some());
            for edge in &mut node.edges {
                edge.to = old_to_new[edge.to].unwrap_or(edge.to);
            }
        }
        debug!(removed = to_remove.len(), remaining = new_len, "reduced graph");

        Ok(Translator::from_old_to_new(old_to_new, new_len))
    }

    /// Merge nodes that have to be traversed anyway.
    ///
    /// A node can be merged with its predecessor when no edge jumps over it. Node weights of a
    /// merged group are added, node and edge costs are not taken into account, so this is only
    /// appropriate for graphs in which those costs are set after merging.
    ///
    /// # Arguments
    ///
    /// * `can_merge`: Whether the caller allows node `i` to be merged.
    pub fn merge_graph(&mut self, can_merge: impl Fn(usize) -> bool) -> Translator {
        let len = self.len();

        let mut mergeable = vec![true; len];
        for (i, node) in self.nodes.iter().enumerate() {
            for edge in &node.edges {
                for flag in &mut mergeable[i + 1..edge.to] {
                    *flag = false;
                }
            }
        }

        let mut made_changes = false;
        let mut old_to_new = vec![None; len];
        let mut new_nodes: Vec<Node<T, K, M>> = Vec::with_capacity(len);
        let mut old_nodes = std::mem::take(&mut self.nodes).into_iter().enumerate().peekable();
        while let Some((i, node)) = old_nodes.next() {
            if !mergeable[i] || !can_merge(i) {
                old_to_new[i] = Some(new_nodes.len());
                new_nodes.push(node);
                continue;
            }

            made_changes = true;
            let mut merged = Node::default();
            let mut next = Some((i, node));
            while let Some((j, node)) = next {
                old_to_new[j] = Some(new_nodes.len());
                merged.edges.extend(node.edges);
                for (total, weight) in merged.weights.iter_mut().zip(node.weights) {
                    *total += weight;
                }
                next = old_nodes.next_if(|(k, _)| mergeable[*k] && can_merge(*k));
            }
            new_nodes.push(merged);
        }

        for (i, node) in new_nodes.iter_mut().enumerate() {
            for edge in &mut node.edges {
                edge.to = old_to_new[edge.to].unwrap_or(edge.to);
            }
            node.edges.sort_by_key(|edge| edge.to);
            node.edges.dedup_by_key(|edge| edge.to);
            node.edges.retain(|edge| edge.to != i);
        }
        let new_len = new_nodes.len();
        self.nodes = new_nodes;

        if made_changes {
            debug!(before = len, after = new_len, "merged graph");
        }
        Translator {
            made_changes,
            ..Translator::from_old_to_new(old_to_new, new_len)
        }
    }
}
