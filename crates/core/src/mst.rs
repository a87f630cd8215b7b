//! Prim spanning trees over triangulation edges.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::debug;

use crate::delaunay::{Edge, Vertex};
use crate::random::RandomSource;

/// Share of non-tree edges kept by [`spanning_tree_with_loops`] unless configured otherwise.
pub const DEFAULT_LOOP_FRACTION: f64 = 0.125;

/// Frontier entry: cheapest length first, then earliest position in the input list.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    length: f64,
    index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.length.total_cmp(&other.length).then(self.index.cmp(&other.index))
    }
}

/// Prim's tree grown from the first edge's `u`.
///
/// Only the component containing that vertex is spanned; disconnected input yields the tree
/// of that component rather than an error. Equal-length candidates resolve to the one listed
/// first in `edges`.
pub fn minimum_spanning_tree(edges: &[Edge]) -> Vec<Edge> {
    let Some(first) = edges.first() else {
        return Vec::new();
    };
    let incident = incidence(edges);
    let mut closed = HashSet::new();
    grow_tree(edges, &incident, first.u, &mut closed)
}

/// Prim restarted from every vertex not yet reached, so each component gets its own tree.
pub fn spanning_forest(edges: &[Edge]) -> Vec<Edge> {
    let incident = incidence(edges);
    let mut closed = HashSet::new();
    let mut forest = Vec::new();
    let mut trees = 0_usize;
    for edge in edges {
        for root in [edge.u, edge.v] {
            if !closed.contains(&root) {
                forest.extend(grow_tree(edges, &incident, root, &mut closed));
                trees += 1;
            }
        }
    }
    debug!(edges = edges.len(), trees, tree_edges = forest.len(), "spanning forest");
    forest
}

/// [`minimum_spanning_tree`] plus each remaining edge kept with probability `fraction`.
///
/// Remaining edges are visited in input order, one draw each, so the result is reproducible
/// for a given random source.
pub fn spanning_tree_with_loops(
    edges: &[Edge],
    fraction: f64,
    rng: &mut impl RandomSource,
) -> Vec<Edge> {
    let mut selected = minimum_spanning_tree(edges);
    let mut taken: HashSet<Edge> = selected.iter().copied().collect();
    let tree_len = selected.len();
    for edge in edges {
        if edge.u == edge.v || taken.contains(edge) {
            continue;
        }
        if rng.chance(fraction) {
            taken.insert(*edge);
            selected.push(*edge);
        }
    }
    debug!(tree_edges = tree_len, loops = selected.len() - tree_len, "spanning tree with loops");
    selected
}

fn incidence(edges: &[Edge]) -> HashMap<Vertex, Vec<usize>> {
    let mut incident: HashMap<Vertex, Vec<usize>> = HashMap::new();
    for (index, edge) in edges.iter().enumerate() {
        incident.entry(edge.u).or_default().push(index);
        if edge.v != edge.u {
            incident.entry(edge.v).or_default().push(index);
        }
    }
    incident
}

fn grow_tree(
    edges: &[Edge],
    incident: &HashMap<Vertex, Vec<usize>>,
    root: Vertex,
    closed: &mut HashSet<Vertex>,
) -> Vec<Edge> {
    let mut tree = Vec::new();
    let mut frontier = BinaryHeap::new();
    close_vertex(root, edges, incident, closed, &mut frontier);
    while let Some(Reverse(candidate)) = frontier.pop() {
        let edge = edges[candidate.index];
        let next = match (closed.contains(&edge.u), closed.contains(&edge.v)) {
            (true, false) => edge.v,
            (false, true) => edge.u,
            _ => continue,
        };
        tree.push(edge);
        close_vertex(next, edges, incident, closed, &mut frontier);
    }
    tree
}

fn close_vertex(
    vertex: Vertex,
    edges: &[Edge],
    incident: &HashMap<Vertex, Vec<usize>>,
    closed: &mut HashSet<Vertex>,
    frontier: &mut BinaryHeap<Reverse<Candidate>>,
) {
    closed.insert(vertex);
    for &index in incident.get(&vertex).into_iter().flatten() {
        let edge = &edges[index];
        if edge.other(vertex).is_some_and(|other| !closed.contains(&other)) {
            frontier.push(Reverse(Candidate { length: edge.length(), index }));
        }
    }
}
