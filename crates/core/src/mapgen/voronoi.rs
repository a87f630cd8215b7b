//! Voronoi cells: scatter seeds, give every tile to its nearest seed, open each cell's interior
//! and route corridors between the seeds.

use tracing::debug;

use crate::config::{ConnectivityConfig, GeneratorConfig, VoronoiConfig};
use crate::connectivity::connect_points;
use crate::error::Result;
use crate::geometry::euclidean_squared;
use crate::random::{MapRng, RandomSource};
use crate::tilemap::TileMap;
use crate::types::{Pos, TileKind};

use super::layout::{bordered_grid, interior, keep_region_containing, paint_corridors};
use super::model::{GeneratedMap, Link};
use super::{Algorithm, MapGenerator};

/// Draws per seed before placement gives up on finding a free tile.
const PLACEMENT_TRIES: usize = 16;

pub struct VoronoiGenerator {
    width: usize,
    height: usize,
    voronoi: VoronoiConfig,
    connectivity: ConnectivityConfig,
}

impl VoronoiGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            voronoi: config.voronoi.clone(),
            connectivity: config.connectivity.clone(),
        }
    }

    /// Distinct interior seed positions. The count is capped at the interior area; when no
    /// draw lands on a free tile the interior centre is used.
    fn place_seeds(&self, map: &TileMap, rng: &mut MapRng) -> Vec<Pos> {
        let area = interior(map);
        let wanted = self.voronoi.seed_count.min(area.width * area.height);
        let mut seeds: Vec<Pos> = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            let free = (0..PLACEMENT_TRIES)
                .map(|_| Pos {
                    y: rng.range(area.y as i32, (area.y + area.height) as i32),
                    x: rng.range(area.x as i32, (area.x + area.width) as i32),
                })
                .find(|pos| !seeds.contains(pos));
            if let Some(pos) = free {
                seeds.push(pos);
            }
        }
        if seeds.is_empty() {
            seeds.push(area.center());
        }
        seeds
    }
}

/// Index of the nearest seed for every tile, row-major. Ties go to the lowest index.
pub(super) fn assign_cells(map: &TileMap, seeds: &[Pos]) -> Vec<usize> {
    map.positions()
        .map(|pos| {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (index, &seed) in seeds.iter().enumerate() {
                let distance = euclidean_squared(pos, seed);
                if distance < best_distance {
                    best = index;
                    best_distance = distance;
                }
            }
            best
        })
        .collect()
}

/// Opens every interior tile whose in-map orthogonal neighbours all share its cell.
fn open_cell_interiors(map: &mut TileMap, cells: &[usize]) -> usize {
    let width = map.width();
    let cell_of = |pos: Pos| cells[(pos.y as usize) * width + (pos.x as usize)];
    let interiors: Vec<Pos> = map
        .positions()
        .filter(|&pos| !map.is_edge(pos))
        .filter(|&pos| {
            pos.orthogonal_neighbors()
                .into_iter()
                .filter(|&neighbor| map.in_bounds(neighbor))
                .all(|neighbor| cell_of(neighbor) == cell_of(pos))
        })
        .collect();
    for &pos in &interiors {
        map.set_clipped(pos, TileKind::Floor);
    }
    interiors.len()
}

impl MapGenerator for VoronoiGenerator {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Voronoi
    }

    fn generate(&self, rng: &mut MapRng) -> Result<GeneratedMap> {
        let mut map = TileMap::new(self.width, self.height);
        let seeds = self.place_seeds(&map, rng);
        let cells = assign_cells(&map, &seeds);
        let opened = open_cell_interiors(&mut map, &cells);
        // Seeds on a cell boundary would otherwise sit in wall.
        for &seed in &seeds {
            map.set_clipped(seed, TileKind::Floor);
        }
        debug!(seeds = seeds.len(), opened, "voronoi cells opened");

        let mut grid = bordered_grid(&map);
        let connections = connect_points(&seeds, &mut grid, rng, &self.connectivity.options())?;
        paint_corridors(&mut map, &connections.corridors);
        let closed = keep_region_containing(&mut map, seeds[0]);
        if closed > 0 {
            debug!(closed, "closed pockets cut off from the first seed");
        }

        let anchors: Vec<Pos> =
            seeds.into_iter().filter(|&seed| map.tile_at(seed).is_open()).collect();
        Ok(GeneratedMap {
            algorithm: Algorithm::Voronoi,
            map,
            anchors,
            links: connections.edges.iter().map(Link::from).collect(),
        })
    }
}
