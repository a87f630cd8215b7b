use serde::{Deserialize, Serialize};

/// Integer map coordinate. Ordering is row-major (`y` first, then `x`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y + dy, x: self.x + dx }
    }

    /// Up, right, down, left.
    pub const fn orthogonal_neighbors(self) -> [Pos; 4] {
        [
            Pos { y: self.y - 1, x: self.x },
            Pos { y: self.y, x: self.x + 1 },
            Pos { y: self.y + 1, x: self.x },
            Pos { y: self.y, x: self.x - 1 },
        ]
    }

    pub const fn surrounding_neighbors(self) -> [Pos; 8] {
        [
            Pos { y: self.y - 1, x: self.x - 1 },
            Pos { y: self.y - 1, x: self.x },
            Pos { y: self.y - 1, x: self.x + 1 },
            Pos { y: self.y, x: self.x - 1 },
            Pos { y: self.y, x: self.x + 1 },
            Pos { y: self.y + 1, x: self.x - 1 },
            Pos { y: self.y + 1, x: self.x },
            Pos { y: self.y + 1, x: self.x + 1 },
        ]
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    #[default]
    Wall,
    Floor,
    Corridor,
}

impl TileKind {
    /// Floor and corridor tiles are both walkable open space.
    pub fn is_open(self) -> bool {
        matches!(self, TileKind::Floor | TileKind::Corridor)
    }

    pub fn glyph(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::Corridor => ',',
        }
    }
}

/// Terrain tag carried by path-grid nodes; biases A* away from already-used ground.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terrain {
    #[default]
    None,
    Floor,
    Hallway,
}

impl Terrain {
    pub(crate) fn surcharge(self) -> u32 {
        match self {
            Terrain::Floor => 10,
            Terrain::Hallway => 5,
            Terrain::None => 1,
        }
    }
}
