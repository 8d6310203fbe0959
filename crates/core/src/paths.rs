//! # Path Enumeration
//!
//! Every word of a sentence carries an ordered list of candidate types. A
//! *path* picks one candidate per word; the parser tries paths one after
//! another and accepts the first that reduces, so the enumeration order is
//! part of the observable behavior.
//!
//! Paths are materialized through a [`PathTree`]: generation `k` of the tree
//! holds one node per (path prefix, candidate of word `k`), children are kept
//! in candidate order, and reading the leaves left to right gives the
//! Cartesian product in lexicographic order.
//!
//! The number of paths is the product of the per-word candidate counts, so
//! highly ambiguous sentences grow combinatorially. Use
//! [`path_count`] to inspect the size before enumerating.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

/// Ancestor/descendant tree over candidate choices.
#[derive(Debug, Clone)]
pub struct PathTree<'a, T> {
    graph: DiGraph<Option<&'a T>, ()>,
    root: NodeIndex,
    leaves: Vec<NodeIndex>,
    generations: usize,
}

impl<'a, T> PathTree<'a, T> {
    /// Create a tree holding only the root.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(None);
        Self {
            graph,
            root,
            leaves: Vec::new(),
            generations: 0,
        }
    }

    /// Number of generations (words) added so far.
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Number of complete paths currently represented.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Extend every current leaf with each candidate of the next word.
    pub fn add_generation(&mut self, candidates: &'a [T]) {
        let parents = if self.generations == 0 {
            vec![self.root]
        } else {
            std::mem::take(&mut self.leaves)
        };

        let mut leaves = Vec::with_capacity(parents.len() * candidates.len());
        for parent in parents {
            for candidate in candidates {
                let child = self.graph.add_node(Some(candidate));
                self.graph.add_edge(parent, child, ());
                leaves.push(child);
            }
        }
        self.leaves = leaves;
        self.generations += 1;
    }

    /// Read every root-to-leaf path, in leaf order.
    pub fn paths(&self) -> Vec<Vec<&'a T>> {
        self.leaves
            .iter()
            .map(|&leaf| {
                let mut path = Vec::with_capacity(self.generations);
                let mut node = leaf;
                while node != self.root {
                    if let Some(candidate) = self.graph[node] {
                        path.push(candidate);
                    }
                    match self.graph.neighbors_directed(node, Direction::Incoming).next() {
                        Some(parent) => node = parent,
                        None => break,
                    }
                }
                path.reverse();
                path
            })
            .collect()
    }
}

impl<T> Default for PathTree<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Enumerate the Cartesian product of per-word candidate lists.
///
/// Paths come out in lexicographic order of candidate indices, the last word
/// varying fastest. A sentence with no words yields no paths.
pub fn enumerate_paths<'a, T>(candidates: &[&'a [T]]) -> Vec<Vec<&'a T>> {
    let mut tree = PathTree::new();
    for word in candidates {
        tree.add_generation(word);
    }
    tree.paths()
}

/// Number of paths `enumerate_paths` would produce, `None` on overflow.
pub fn path_count<T>(candidates: &[&[T]]) -> Option<usize> {
    if candidates.is_empty() {
        return Some(0);
    }
    candidates
        .iter()
        .try_fold(1usize, |acc, word| acc.checked_mul(word.len()))
}
