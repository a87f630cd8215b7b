//! Binary space partitioning: split the interior into leaves, inset a room in each, then join
//! the room centres with routed corridors.

use tracing::{debug, warn};

use crate::config::{BspConfig, ConnectivityConfig, GeneratorConfig};
use crate::connectivity::{Connections, connect_points};
use crate::error::Result;
use crate::geometry::euclidean;
use crate::graph::WeightedGraph;
use crate::random::{MapRng, RandomSource};
use crate::tilemap::TileMap;
use crate::types::Pos;

use super::layout::{RoomRect, bordered_grid, carve_room, interior, paint_corridors};
use super::model::{GeneratedMap, Link};
use super::{Algorithm, MapGenerator};

pub struct BspGenerator {
    width: usize,
    height: usize,
    bsp: BspConfig,
    connectivity: ConnectivityConfig,
}

impl BspGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            bsp: config.bsp.clone(),
            connectivity: config.connectivity.clone(),
        }
    }

    fn split(&self, leaf: RoomRect, depth: usize, rng: &mut MapRng, leaves: &mut Vec<RoomRect>) {
        let min = self.bsp.min_leaf_size;
        let can_split_across = leaf.height >= 2 * min;
        let can_split_down = leaf.width >= 2 * min;
        if depth >= self.bsp.max_depth || !(can_split_across || can_split_down) {
            leaves.push(leaf);
            return;
        }

        let across = match (can_split_across, can_split_down) {
            (true, true) => {
                if leaf.width * 4 > leaf.height * 5 {
                    false
                } else if leaf.height * 4 > leaf.width * 5 {
                    true
                } else {
                    rng.chance(0.5)
                }
            }
            (across, _) => across,
        };

        let side = if across { leaf.height } else { leaf.width };
        let cut = self.cut_position(side, rng);
        let (first, second) = if across {
            (
                RoomRect { height: cut, ..leaf },
                RoomRect { y: leaf.y + cut, height: leaf.height - cut, ..leaf },
            )
        } else {
            (
                RoomRect { width: cut, ..leaf },
                RoomRect { x: leaf.x + cut, width: leaf.width - cut, ..leaf },
            )
        };
        self.split(first, depth + 1, rng, leaves);
        self.split(second, depth + 1, rng, leaves);
    }

    /// Cut offset inside `[split_ratio, 1 - split_ratio]` of `side`, leaving both halves at
    /// least `min_leaf_size` long.
    fn cut_position(&self, side: usize, rng: &mut MapRng) -> usize {
        let min = self.bsp.min_leaf_size;
        let ratio = self.bsp.split_ratio;
        let lo = min.max((side as f64 * ratio).ceil() as usize);
        let hi = (side - min).min((side as f64 * (1.0 - ratio)).floor() as usize);
        if lo > hi {
            return side / 2;
        }
        rng.range(lo as i32, hi as i32 + 1) as usize
    }

    /// A room inset by `room_padding` inside `leaf`, or `None` when the leaf is too small.
    fn place_room(&self, leaf: RoomRect, rng: &mut MapRng) -> Option<RoomRect> {
        let padding = self.bsp.room_padding;
        let available_width = leaf.width.checked_sub(2 * padding).filter(|&w| w > 0)?;
        let available_height = leaf.height.checked_sub(2 * padding).filter(|&h| h > 0)?;

        let width = random_span(self.bsp.min_room_size, available_width, rng);
        let height = random_span(self.bsp.min_room_size, available_height, rng);
        let x = leaf.x + padding + rng.range(0, (available_width - width) as i32 + 1) as usize;
        let y = leaf.y + padding + rng.range(0, (available_height - height) as i32 + 1) as usize;
        Some(RoomRect { x, y, width, height })
    }
}

/// Length in `[min(minimum, available), available]`.
fn random_span(minimum: usize, available: usize, rng: &mut MapRng) -> usize {
    let low = minimum.min(available);
    rng.range(low as i32, available as i32 + 1) as usize
}

impl MapGenerator for BspGenerator {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bsp
    }

    fn generate(&self, rng: &mut MapRng) -> Result<GeneratedMap> {
        let mut map = TileMap::new(self.width, self.height);

        let mut leaves = Vec::new();
        self.split(interior(&map), 0, rng, &mut leaves);
        let mut rooms: Vec<RoomRect> =
            leaves.iter().filter_map(|&leaf| self.place_room(leaf, rng)).collect();
        if rooms.is_empty() {
            let Pos { y, x } = interior(&map).center();
            rooms.push(RoomRect { x: x as usize, y: y as usize, width: 1, height: 1 });
        }
        for room in &rooms {
            carve_room(&mut map, room);
        }
        debug!(leaves = leaves.len(), rooms = rooms.len(), "bsp rooms placed");

        let anchors: Vec<Pos> = rooms.iter().map(|room| room.center()).collect();
        let mut grid = bordered_grid(&map);
        let connections =
            connect_points(&anchors, &mut grid, rng, &self.connectivity.options())?;
        paint_corridors(&mut map, &connections.corridors);

        let graph = room_graph(&anchors, &connections);
        let components = graph.component_count();
        if components > 1 {
            warn!(components, "bsp rooms are not all connected");
        }
        debug!(
            room_links = graph.edges().len(),
            tree_weight = graph.prim().iter().map(|edge| edge.weight).sum::<f64>(),
            "bsp room graph"
        );

        Ok(GeneratedMap {
            algorithm: Algorithm::Bsp,
            map,
            anchors,
            links: graph_links(&graph),
        })
    }
}

/// Rooms joined by every corridor that was actually carved, weighted by centre distance.
fn room_graph(anchors: &[Pos], connections: &Connections) -> WeightedGraph<Pos> {
    let mut graph = WeightedGraph::new();
    for &anchor in anchors {
        graph.add_node(anchor);
    }
    for edge in connections.edges.iter().filter(|edge| !connections.unrouted.contains(edge)) {
        graph.connect(edge.u.0, edge.v.0, euclidean(edge.u.0, edge.v.0));
    }
    graph
}

fn graph_links(graph: &WeightedGraph<Pos>) -> Vec<Link> {
    graph
        .edges()
        .iter()
        .filter_map(|edge| Some(Link { from: *graph.node(edge.from)?, to: *graph.node(edge.to)? }))
        .collect()
}
