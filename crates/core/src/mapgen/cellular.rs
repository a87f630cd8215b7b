//! Cave maps: random fill, neighbourhood smoothing, pocket cleanup, then passages between the
//! surviving caverns.

use tracing::{debug, warn};

use crate::config::{CellularConfig, GeneratorConfig};
use crate::error::Result;
use crate::random::{MapRng, RandomSource};
use crate::region::{BorderMode, RegionGraph, connect_closest_regions, remove_small_regions};
use crate::tilemap::TileMap;
use crate::types::{Pos, TileKind};

use super::layout::{RoomRect, carve_room, interior};
use super::model::{GeneratedMap, Link};
use super::{Algorithm, MapGenerator};

pub struct CellularGenerator {
    width: usize,
    height: usize,
    cellular: CellularConfig,
}

impl CellularGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self { width: config.width, height: config.height, cellular: config.cellular.clone() }
    }

    fn random_fill(&self, map: &mut TileMap, rng: &mut MapRng) {
        for pos in map.positions().collect::<Vec<_>>() {
            let tile = if map.is_edge(pos) || rng.chance(self.cellular.fill_probability) {
                TileKind::Wall
            } else {
                TileKind::Floor
            };
            map.set_clipped(pos, tile);
        }
    }

    /// Carves a small chamber in the middle of a map with nothing open.
    fn ensure_open(&self, map: &mut TileMap) {
        if map.count_open() > 0 {
            return;
        }
        let Pos { y, x } = interior(map).center();
        let room = RoomRect { x: x as usize - 1, y: y as usize - 1, width: 3, height: 3 };
        carve_room(map, &room);
        debug!("cave collapsed, carved a central chamber");
    }
}

fn seal_edges(map: &mut TileMap) {
    for pos in map.positions().filter(|&pos| map.is_edge(pos)).collect::<Vec<_>>() {
        map.set_clipped(pos, TileKind::Wall);
    }
}

/// One smoothing pass: more than four walls around a tile make it wall, fewer than four make
/// it floor, exactly four leave it alone. The outer ring stays wall.
pub(super) fn smooth(map: &TileMap) -> TileMap {
    let mut next = map.clone();
    for pos in map.positions() {
        let tile = if map.is_edge(pos) {
            TileKind::Wall
        } else {
            match map.surrounding_walls(pos) {
                walls if walls > 4 => TileKind::Wall,
                walls if walls < 4 => TileKind::Floor,
                _ => map.tile_at(pos),
            }
        };
        next.set_clipped(pos, tile);
    }
    next
}

impl MapGenerator for CellularGenerator {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Cellular
    }

    fn generate(&self, rng: &mut MapRng) -> Result<GeneratedMap> {
        let config = &self.cellular;
        let mut map = TileMap::new(self.width, self.height);
        self.random_fill(&mut map, rng);
        for _ in 0..config.smoothing_steps {
            map = smooth(&map);
        }

        let (wall, floor) = (TileKind::Wall, TileKind::Floor);
        let opened = remove_small_regions(&mut map, wall, config.min_wall_region, floor);
        let filled = remove_small_regions(&mut map, floor, config.min_floor_region, wall);
        seal_edges(&mut map);
        self.ensure_open(&mut map);

        let mut graph = RegionGraph::from_map(&map, TileKind::Floor, BorderMode::default());
        debug!(regions = graph.len(), opened, filled, "caverns found");
        let passages = connect_closest_regions(
            &mut map,
            &mut graph,
            config.passage_radius,
            config.max_connection_rounds,
        );
        if !graph.all_accessible() {
            warn!(regions = graph.len(), "some caverns are still cut off");
        }

        let anchors = graph
            .iter()
            .filter_map(|(_, region)| region.tiles().first().copied())
            .collect();
        let links = passages.iter().map(|passage| Link { from: passage.start, to: passage.end });
        Ok(GeneratedMap { algorithm: Algorithm::Cellular, map, anchors, links: links.collect() })
    }
}
