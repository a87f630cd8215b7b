//! Diffusion-limited aggregation: diggers wander in from random spots and stick to the growing
//! cave where they first touch it.

use tracing::{debug, warn};

use crate::config::{DlaConfig, GeneratorConfig};
use crate::error::Result;
use crate::random::{MapRng, RandomSource};
use crate::tilemap::TileMap;
use crate::types::{Pos, TileKind};

use super::layout::{RoomRect, interior};
use super::model::GeneratedMap;
use super::{Algorithm, MapGenerator};

pub struct DlaGenerator {
    width: usize,
    height: usize,
    dla: DlaConfig,
}

impl DlaGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self { width: config.width, height: config.height, dla: config.dla.clone() }
    }

    /// Open tiles to reach: `floor_fraction` of the interior, at least one.
    fn target(&self, area: RoomRect) -> usize {
        let interior_tiles = area.width * area.height;
        ((interior_tiles as f64 * self.dla.floor_fraction) as usize).clamp(1, interior_tiles)
    }

    /// Walks one digger until it steps onto open ground, then opens the tile it came from.
    /// Returns whether anything was carved.
    fn release_digger(&self, map: &mut TileMap, area: RoomRect, rng: &mut MapRng) -> bool {
        let mut current = random_tile(area, rng);
        if map.tile_at(current).is_open() {
            return false;
        }
        for _ in 0..self.dla.max_walk_steps {
            let next = clamp_to(area, current.orthogonal_neighbors()[rng.index(4)]);
            if map.tile_at(next).is_open() {
                map.set_clipped(current, TileKind::Floor);
                return true;
            }
            current = next;
        }
        false
    }
}

fn random_tile(area: RoomRect, rng: &mut MapRng) -> Pos {
    Pos {
        y: rng.range(area.y as i32, (area.y + area.height) as i32),
        x: rng.range(area.x as i32, (area.x + area.width) as i32),
    }
}

fn clamp_to(area: RoomRect, pos: Pos) -> Pos {
    Pos {
        y: pos.y.clamp(area.y as i32, (area.y + area.height - 1) as i32),
        x: pos.x.clamp(area.x as i32, (area.x + area.width - 1) as i32),
    }
}

impl MapGenerator for DlaGenerator {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dla
    }

    fn generate(&self, rng: &mut MapRng) -> Result<GeneratedMap> {
        let mut map = TileMap::new(self.width, self.height);
        let area = interior(&map);
        let origin = area.center();
        map.set_clipped(origin, TileKind::Floor);

        let target = self.target(area);
        let mut open = 1;
        let mut diggers = 0;
        while open < target && diggers < self.dla.max_diggers {
            diggers += 1;
            if self.release_digger(&mut map, area, rng) {
                open += 1;
            }
        }
        if open < target {
            warn!(open, target, diggers, "dla digger budget spent before reaching the target");
        } else {
            debug!(open, diggers, "dla aggregate grown");
        }

        let anchors = vec![origin];
        Ok(GeneratedMap { algorithm: Algorithm::Dla, map, anchors, links: Vec::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::open_regions;

    fn generator(dla: DlaConfig) -> DlaGenerator {
        DlaGenerator::new(&GeneratorConfig { width: 40, height: 30, dla, ..Default::default() })
    }

    #[test]
    fn aggregate_reaches_its_target_as_one_region() {
        let generator = generator(DlaConfig::default());
        let mut rng = MapRng::from_seed(77);
        let generated = generator.generate(&mut rng).expect("valid config");
        let target = generator.target(interior(&generated.map));
        assert_eq!(generated.map.count_open(), target);
        assert_eq!(open_regions(&generated.map).len(), 1);
        assert_eq!(generated.anchors, vec![Pos::new(20, 15)]);
        assert_eq!(generated.tile_at(Pos::new(20, 15)), TileKind::Floor);
    }

    #[test]
    fn walks_stay_inside_the_ring() {
        let area = RoomRect { x: 1, y: 1, width: 5, height: 4 };
        assert_eq!(clamp_to(area, Pos::new(0, 3)), Pos::new(1, 3));
        assert_eq!(clamp_to(area, Pos::new(6, 5)), Pos::new(5, 4));
        let mut rng = MapRng::from_seed(1);
        for _ in 0..200 {
            let pos = random_tile(area, &mut rng);
            assert_eq!(clamp_to(area, pos), pos);
        }
    }

    #[test]
    fn tiny_budget_stops_early() {
        let generator =
            generator(DlaConfig { floor_fraction: 0.9, max_walk_steps: 1, max_diggers: 3 });
        let mut rng = MapRng::from_seed(4);
        let generated = generator.generate(&mut rng).expect("valid config");
        assert!(generated.map.count_open() <= 4);
        assert_eq!(open_regions(&generated.map).len(), 1);
    }
}
