//! Weighted room graph with Prim and Kruskal spanning-tree extraction.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::error::{MapgenError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Nodes with per-node adjacency and parallel weight lists.
///
/// Nodes are deduplicated by value: adding a node equal to an existing one returns the
/// existing index.
#[derive(Clone, Debug)]
pub struct WeightedGraph<N> {
    nodes: Vec<N>,
    adjacency: Vec<Vec<usize>>,
    weights: Vec<Vec<f64>>,
    edges: Vec<GraphEdge>,
}

impl<N> Default for WeightedGraph<N> {
    fn default() -> Self {
        Self { nodes: Vec::new(), adjacency: Vec::new(), weights: Vec::new(), edges: Vec::new() }
    }
}

impl<N: PartialEq> WeightedGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: N) -> usize {
        if let Some(index) = self.index_of(&node) {
            return index;
        }
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        self.weights.push(Vec::new());
        self.nodes.len() - 1
    }

    pub fn index_of(&self, node: &N) -> Option<usize> {
        self.nodes.iter().position(|existing| existing == node)
    }

    /// Adds `from -> to`, and `to -> from` as well unless `directed`.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64, directed: bool) -> Result<()> {
        for index in [from, to] {
            if index >= self.nodes.len() {
                return Err(MapgenError::UnknownNode { index, len: self.nodes.len() });
            }
        }
        self.adjacency[from].push(to);
        self.weights[from].push(weight);
        if !directed && from != to {
            self.adjacency[to].push(from);
            self.weights[to].push(weight);
        }
        self.edges.push(GraphEdge { from, to, weight });
        Ok(())
    }

    /// Adds both nodes (deduplicated) and an undirected edge between them.
    pub fn connect(&mut self, a: N, b: N, weight: f64) -> (usize, usize) {
        let from = self.add_node(a);
        let to = self.add_node(b);
        self.adjacency[from].push(to);
        self.weights[from].push(weight);
        if from != to {
            self.adjacency[to].push(from);
            self.weights[to].push(weight);
        }
        self.edges.push(GraphEdge { from, to, weight });
        (from, to)
    }
}

impl<N> WeightedGraph<N> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&N> {
        self.nodes.get(index)
    }

    /// Edges in insertion order, one entry per `add_edge` call.
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let adjacent = self.adjacency.get(index).map(Vec::as_slice).unwrap_or_default();
        let weights = self.weights.get(index).map(Vec::as_slice).unwrap_or_default();
        adjacent.iter().copied().zip(weights.iter().copied())
    }

    /// Prim's algorithm following adjacency lists, restarted at every unreached node.
    pub fn prim(&self) -> Vec<GraphEdge> {
        let mut reached = vec![false; self.nodes.len()];
        let mut tree = Vec::new();
        let mut frontier = BinaryHeap::new();
        let mut order = 0_usize;

        for root in 0..self.nodes.len() {
            if reached[root] {
                continue;
            }
            reached[root] = true;
            self.push_frontier(root, &reached, &mut frontier, &mut order);
            while let Some(Reverse(step)) = frontier.pop() {
                if reached[step.edge.to] {
                    continue;
                }
                reached[step.edge.to] = true;
                tree.push(step.edge);
                self.push_frontier(step.edge.to, &reached, &mut frontier, &mut order);
            }
        }
        tree
    }

    /// Kruskal's algorithm over every edge, treating them as undirected.
    pub fn kruskal(&self) -> Vec<GraphEdge> {
        let mut sorted = self.edges.clone();
        sorted.sort_by(|a, b| a.weight.total_cmp(&b.weight));
        let mut sets = UnionFind::new(self.nodes.len());
        sorted.into_iter().filter(|edge| sets.union(edge.from, edge.to)).collect()
    }

    /// Number of connected components when edges are read as undirected.
    pub fn component_count(&self) -> usize {
        let mut sets = UnionFind::new(self.nodes.len());
        for edge in &self.edges {
            sets.union(edge.from, edge.to);
        }
        sets.set_count()
    }

    fn push_frontier(
        &self,
        from: usize,
        reached: &[bool],
        frontier: &mut BinaryHeap<Reverse<FrontierStep>>,
        order: &mut usize,
    ) {
        for (to, weight) in self.neighbors(from) {
            if !reached[to] {
                let step = FrontierStep { edge: GraphEdge { from, to, weight }, order: *order };
                frontier.push(Reverse(step));
                *order += 1;
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct FrontierStep {
    edge: GraphEdge,
    order: usize,
}

impl PartialEq for FrontierStep {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierStep {}

impl PartialOrd for FrontierStep {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierStep {
    fn cmp(&self, other: &Self) -> Ordering {
        self.edge.weight.total_cmp(&other.edge.weight).then(self.order.cmp(&other.order))
    }
}

/// Disjoint sets with path halving and union by rank.
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
    sets: usize,
}

impl UnionFind {
    pub fn new(len: usize) -> Self {
        Self { parent: (0..len).collect(), rank: vec![0; len], sets: len }
    }

    pub fn find(&mut self, mut item: usize) -> usize {
        while self.parent[item] != item {
            self.parent[item] = self.parent[self.parent[item]];
            item = self.parent[item];
        }
        item
    }

    /// Merges the sets holding `a` and `b`; false when they were already one set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return false;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            Ordering::Less => self.parent[root_a] = root_b,
            Ordering::Greater => self.parent[root_b] = root_a,
            Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
        self.sets -= 1;
        true
    }

    pub fn set_count(&self) -> usize {
        self.sets
    }
}
