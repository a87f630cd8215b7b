//! Rectangles used for BSP leaves and rooms, and the tile-painting helpers generators share.

use std::collections::BTreeSet;

use crate::grid::PathGrid;
use crate::region::open_regions;
use crate::tilemap::TileMap;
use crate::types::{Pos, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct RoomRect {
    pub(super) x: usize,
    pub(super) y: usize,
    pub(super) width: usize,
    pub(super) height: usize,
}

impl RoomRect {
    fn right(self) -> usize {
        self.x + self.width - 1
    }

    fn bottom(self) -> usize {
        self.y + self.height - 1
    }

    pub(super) fn center(self) -> Pos {
        Pos { y: (self.y + (self.height / 2)) as i32, x: (self.x + (self.width / 2)) as i32 }
    }
}

/// Everything inside the outer wall ring of `map`.
pub(super) fn interior(map: &TileMap) -> RoomRect {
    RoomRect {
        x: 1,
        y: 1,
        width: map.width().saturating_sub(2),
        height: map.height().saturating_sub(2),
    }
}

pub(super) fn carve_room(map: &mut TileMap, room: &RoomRect) {
    for y in room.y..=room.bottom() {
        for x in room.x..=room.right() {
            map.set_clipped(Pos { y: y as i32, x: x as i32 }, TileKind::Floor);
        }
    }
}

/// Path grid over `map` whose outer ring is blocked, so corridors never open the map edge.
pub(super) fn bordered_grid(map: &TileMap) -> PathGrid {
    let mut grid = PathGrid::from_tile_map(map);
    for pos in map.positions().filter(|&pos| map.is_edge(pos)) {
        if let Ok(node) = grid.node_mut(pos) {
            node.walkable = false;
        }
    }
    grid
}

/// Turns corridor cells that are still wall into `Corridor`; rooms and the outer ring keep
/// their tiles.
pub(super) fn paint_corridors(map: &mut TileMap, cells: &BTreeSet<Pos>) -> usize {
    let mut painted = 0;
    for &pos in cells {
        if map.in_bounds(pos) && !map.is_edge(pos) && map.tile_at(pos) == TileKind::Wall {
            map.set_clipped(pos, TileKind::Corridor);
            painted += 1;
        }
    }
    painted
}

/// Walls over every open component that does not contain `keep`. Returns the cells closed.
pub(super) fn keep_region_containing(map: &mut TileMap, keep: Pos) -> usize {
    let mut closed = 0;
    for region in open_regions(map) {
        if region.contains(&keep) {
            continue;
        }
        for &pos in &region {
            map.set_clipped(pos, TileKind::Wall);
        }
        closed += region.len();
    }
    closed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_excludes_the_outer_ring() {
        let map = TileMap::new(10, 7);
        let inner = interior(&map);
        assert_eq!(inner, RoomRect { x: 1, y: 1, width: 8, height: 5 });
        assert_eq!(inner.center(), Pos::new(5, 3));
    }

    #[test]
    fn corridors_never_touch_rooms_or_the_edge() {
        let mut map = TileMap::new(6, 4);
        carve_room(&mut map, &RoomRect { x: 1, y: 1, width: 2, height: 2 });
        let cells =
            BTreeSet::from([Pos::new(0, 1), Pos::new(2, 1), Pos::new(3, 1), Pos::new(4, 2)]);
        assert_eq!(paint_corridors(&mut map, &cells), 2);
        assert_eq!(map.tile_at(Pos::new(0, 1)), TileKind::Wall);
        assert_eq!(map.tile_at(Pos::new(2, 1)), TileKind::Floor);
        assert_eq!(map.tile_at(Pos::new(3, 1)), TileKind::Corridor);
    }

    #[test]
    fn bordered_grid_blocks_the_outer_ring() {
        let map = TileMap::new(5, 5);
        let grid = bordered_grid(&map);
        assert!(!grid.is_walkable(Pos::new(0, 2)));
        assert!(!grid.is_walkable(Pos::new(4, 4)));
        assert!(grid.is_walkable(Pos::new(1, 1)));
    }

    #[test]
    fn stray_pockets_are_closed() {
        let mut map = TileMap::new(9, 5);
        carve_room(&mut map, &RoomRect { x: 1, y: 1, width: 3, height: 3 });
        carve_room(&mut map, &RoomRect { x: 6, y: 2, width: 2, height: 1 });
        assert_eq!(keep_region_containing(&mut map, Pos::new(2, 2)), 2);
        assert_eq!(map.count_open(), 9);
    }
}
