//! Joins anchor points with corridors: triangulate, thin to a spanning tree with a few loops,
//! then route every kept edge with A*.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::corridor::widen;
use crate::delaunay::{Edge, delaunay_edges};
use crate::error::Result;
use crate::graph::UnionFind;
use crate::grid::PathGrid;
use crate::mst::{DEFAULT_LOOP_FRACTION, spanning_tree_with_loops};
use crate::pathfinding::{AstarOptions, carve_path};
use crate::random::RandomSource;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionOptions {
    /// Probability of keeping each triangulation edge that is not in the spanning tree.
    pub loop_fraction: f64,
    /// Dilate the final corridor set by one cell in all eight directions.
    pub widen: bool,
    pub astar: AstarOptions,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self { loop_fraction: DEFAULT_LOOP_FRACTION, widen: false, astar: AstarOptions::default() }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Connections {
    /// Edges chosen for routing, tree edges first.
    pub edges: Vec<Edge>,
    /// Every cell on a routed path (widened when requested).
    pub corridors: BTreeSet<Pos>,
    /// Chosen edges that could not be routed even on an unobstructed grid.
    pub unrouted: Vec<Edge>,
}

impl Connections {
    pub fn is_fully_routed(&self) -> bool {
        self.unrouted.is_empty()
    }
}

/// Routes corridors between `points` over `grid`.
///
/// Degenerate point sets (fewer than three distinct points, or all collinear) are chained in
/// input order instead of triangulated. Points the triangulation leaves out or splits off are
/// bridged with their shortest joining edges before the spanning tree is taken. Routed paths
/// are stamped as hallway on `grid`, so later searches prefer fresh ground. An edge with no
/// route is retried once on an unobstructed copy of the grid; if that fails too it lands in
/// [`Connections::unrouted`].
pub fn connect_points(
    points: &[Pos],
    grid: &mut PathGrid,
    rng: &mut impl RandomSource,
    options: &ConnectionOptions,
) -> Result<Connections> {
    let mut candidates = delaunay_edges(points);
    if candidates.is_empty() {
        candidates = chain(points);
        debug!(points = points.len(), edges = candidates.len(), "chained degenerate anchors");
    }
    bridge_components(points, &mut candidates);

    let edges = spanning_tree_with_loops(&candidates, options.loop_fraction, rng);
    let mut corridors = BTreeSet::new();
    let mut unrouted = Vec::new();
    let mut fallback: Option<PathGrid> = None;

    for edge in &edges {
        let (start, target) = (edge.u.0, edge.v.0);
        let mut path = carve_path(grid, start, target, &options.astar)?;
        if path.is_none() {
            let auxiliary = fallback.get_or_insert_with(|| grid.unobstructed_copy());
            path = carve_path(auxiliary, start, target, &options.astar)?;
            debug!(?start, ?target, routed = path.is_some(), "retried on unobstructed grid");
        }
        match path {
            Some(path) => corridors.extend(path),
            None => {
                warn!(?start, ?target, "edge could not be routed");
                unrouted.push(*edge);
            }
        }
    }

    if options.widen {
        corridors = widen(&corridors, Some((grid.width(), grid.height())));
    }

    info!(
        anchors = points.len(),
        edges = edges.len(),
        corridor_cells = corridors.len(),
        unrouted = unrouted.len(),
        "anchors connected"
    );
    Ok(Connections { edges, corridors, unrouted })
}

/// Consecutive distinct points joined in input order.
fn chain(points: &[Pos]) -> Vec<Edge> {
    distinct(points).windows(2).map(|pair| Edge::new(pair[0], pair[1])).collect()
}

/// Adds the shortest point-to-point edges needed for `edges` to connect every point.
fn bridge_components(points: &[Pos], edges: &mut Vec<Edge>) {
    let points = distinct(points);
    let slots: HashMap<Pos, usize> = points.iter().enumerate().map(|(i, &pos)| (pos, i)).collect();
    let mut sets = UnionFind::new(points.len());
    for edge in edges.iter() {
        if let (Some(&a), Some(&b)) = (slots.get(&edge.u.0), slots.get(&edge.v.0)) {
            sets.union(a, b);
        }
    }
    if sets.set_count() <= 1 {
        return;
    }

    let mut bridges: Vec<(usize, usize, Edge)> = Vec::new();
    for (i, &a) in points.iter().enumerate() {
        for (j, &b) in points.iter().enumerate().skip(i + 1) {
            bridges.push((i, j, Edge::new(a, b)));
        }
    }
    bridges.sort_by(|x, y| x.2.length().total_cmp(&y.2.length()));
    for (i, j, bridge) in bridges {
        if sets.union(i, j) {
            debug!(from = ?bridge.u, to = ?bridge.v, "bridged disconnected anchors");
            edges.push(bridge);
            if sets.set_count() == 1 {
                break;
            }
        }
    }
}

fn distinct(points: &[Pos]) -> Vec<Pos> {
    let mut distinct: Vec<Pos> = Vec::with_capacity(points.len());
    for &pos in points {
        if !distinct.contains(&pos) {
            distinct.push(pos);
        }
    }
    distinct
}
