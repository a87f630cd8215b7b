//! Typed ground-truth tile grid and the canvas interface generators paint through.

use serde::{Deserialize, Serialize};

use crate::error::{MapgenError, Result};
use crate::types::{Pos, TileKind};

/// Paint target for generated maps. The core never reads tiles back from a canvas.
pub trait TileCanvas {
    fn paint_floor(&mut self, pos: Pos);
    fn paint_wall(&mut self, pos: Pos);
    fn paint_corridor(&mut self, pos: Pos);
    fn clear(&mut self);

    fn paint(&mut self, pos: Pos, tile: TileKind) {
        match tile {
            TileKind::Wall => self.paint_wall(pos),
            TileKind::Floor => self.paint_floor(pos),
            TileKind::Corridor => self.paint_corridor(pos),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMap {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
}

impl TileMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, TileKind::Wall)
    }

    pub fn filled(width: usize, height: usize, tile: TileKind) -> Self {
        Self { width, height, tiles: vec![tile; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// True when `pos` lies on the outermost ring of the map.
    pub fn is_edge(&self, pos: Pos) -> bool {
        pos.x == 0
            || pos.y == 0
            || pos.x as usize == self.width.saturating_sub(1)
            || pos.y as usize == self.height.saturating_sub(1)
    }

    /// Bounds-checked lookup.
    pub fn get(&self, pos: Pos) -> Result<TileKind> {
        self.index(pos).map(|index| self.tiles[index])
    }

    /// Lenient lookup: anything outside the map reads as wall.
    pub fn tile_at(&self, pos: Pos) -> TileKind {
        self.get(pos).unwrap_or(TileKind::Wall)
    }

    pub fn set(&mut self, pos: Pos, tile: TileKind) -> Result<()> {
        let index = self.index(pos)?;
        self.tiles[index] = tile;
        Ok(())
    }

    /// Writes `tile` when `pos` is inside the map, ignores it otherwise.
    pub fn set_clipped(&mut self, pos: Pos, tile: TileKind) {
        if let Ok(index) = self.index(pos) {
            self.tiles[index] = tile;
        }
    }

    pub fn fill(&mut self, tile: TileKind) {
        self.tiles.fill(tile);
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    pub fn positions_where(&self, tile: TileKind) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(move |&pos| self.tile_at(pos) == tile)
    }

    pub fn count_open(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_open()).count()
    }

    /// Number of the 8 surrounding cells that are walls; cells outside the map count as walls.
    pub fn surrounding_walls(&self, pos: Pos) -> usize {
        pos.surrounding_neighbors()
            .into_iter()
            .filter(|&neighbor| self.tile_at(neighbor) == TileKind::Wall)
            .count()
    }

    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.tiles.chunks(self.width.max(1)) {
            out.extend(row.iter().map(|tile| tile.glyph()));
            out.push('\n');
        }
        out
    }

    /// Pushes every tile to `canvas`, clearing it first.
    pub fn paint_onto(&self, canvas: &mut impl TileCanvas) {
        canvas.clear();
        for pos in self.positions() {
            canvas.paint(pos, self.tile_at(pos));
        }
    }

    fn index(&self, pos: Pos) -> Result<usize> {
        if !self.in_bounds(pos) {
            return Err(MapgenError::OutOfBounds { pos, width: self.width, height: self.height });
        }
        Ok((pos.y as usize) * self.width + (pos.x as usize))
    }
}

impl TileCanvas for TileMap {
    fn paint_floor(&mut self, pos: Pos) {
        self.set_clipped(pos, TileKind::Floor);
    }

    fn paint_wall(&mut self, pos: Pos) {
        self.set_clipped(pos, TileKind::Wall);
    }

    fn paint_corridor(&mut self, pos: Pos) {
        self.set_clipped(pos, TileKind::Corridor);
    }

    fn clear(&mut self) {
        self.fill(TileKind::Wall);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingCanvas {
        floors: usize,
        walls: usize,
        corridors: usize,
        clears: usize,
    }

    impl TileCanvas for CountingCanvas {
        fn paint_floor(&mut self, _pos: Pos) {
            self.floors += 1;
        }

        fn paint_wall(&mut self, _pos: Pos) {
            self.walls += 1;
        }

        fn paint_corridor(&mut self, _pos: Pos) {
            self.corridors += 1;
        }

        fn clear(&mut self) {
            self.clears += 1;
        }
    }

    #[test]
    fn out_of_bounds_lookup_fails_fast() {
        let map = TileMap::new(4, 3);
        assert!(matches!(
            map.get(Pos::new(4, 0)),
            Err(MapgenError::OutOfBounds { width: 4, height: 3, .. })
        ));
        assert!(map.get(Pos::new(-1, 1)).is_err());
        assert_eq!(map.tile_at(Pos::new(-1, 1)), TileKind::Wall);
    }

    #[test]
    fn paint_onto_pushes_every_tile_once() {
        let mut map = TileMap::new(3, 2);
        map.set(Pos::new(0, 0), TileKind::Floor).expect("in bounds");
        map.set(Pos::new(1, 1), TileKind::Corridor).expect("in bounds");

        let mut canvas = CountingCanvas::default();
        map.paint_onto(&mut canvas);
        assert_eq!(canvas.clears, 1);
        assert_eq!((canvas.floors, canvas.corridors, canvas.walls), (1, 1, 4));

        let mut copy = TileMap::filled(3, 2, TileKind::Floor);
        map.paint_onto(&mut copy);
        assert_eq!(copy, map);
    }

    #[test]
    fn ascii_rows_follow_map_rows() {
        let mut map = TileMap::new(3, 2);
        map.set(Pos::new(2, 1), TileKind::Floor).expect("in bounds");
        assert_eq!(map.to_ascii(), "###\n##.\n");
    }
}
