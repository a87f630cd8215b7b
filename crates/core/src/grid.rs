//! Dense node grid the path search runs over.

use crate::error::{MapgenError, Result};
use crate::tilemap::TileMap;
use crate::types::{Pos, Terrain, TileKind};

/// One grid cell. Search costs are not stored here; each search keeps its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathNode {
    pub pos: Pos,
    pub walkable: bool,
    pub terrain: Terrain,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathGrid {
    width: usize,
    height: usize,
    node_diameter: f32,
    nodes: Vec<PathNode>,
}

impl PathGrid {
    /// One walkable node per tile.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_diameter(width, height, 1.0)
    }

    /// Covers a `world_width × world_height` area with square nodes of half-size
    /// `node_radius`, giving `floor(size / diameter)` nodes per axis.
    pub fn from_world(world_width: f32, world_height: f32, node_radius: f32) -> Self {
        let node_diameter = node_radius * 2.0;
        if node_diameter <= 0.0 {
            return Self::with_diameter(0, 0, 1.0);
        }
        let width = (world_width / node_diameter).floor().max(0.0) as usize;
        let height = (world_height / node_diameter).floor().max(0.0) as usize;
        Self::with_diameter(width, height, node_diameter)
    }

    /// Grid over `map` where every tile is walkable and open tiles carry `Floor` terrain.
    pub fn from_tile_map(map: &TileMap) -> Self {
        let mut grid = Self::new(map.width(), map.height());
        for node in &mut grid.nodes {
            if map.tile_at(node.pos) == TileKind::Floor {
                node.terrain = Terrain::Floor;
            }
        }
        grid
    }

    fn with_diameter(width: usize, height: usize, node_diameter: f32) -> Self {
        let nodes = (0..height)
            .flat_map(|y| {
                (0..width).map(move |x| PathNode {
                    pos: Pos { y: y as i32, x: x as i32 },
                    walkable: true,
                    terrain: Terrain::None,
                })
            })
            .collect();
        Self { width, height, node_diameter, nodes }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn node(&self, pos: Pos) -> Result<&PathNode> {
        let index = self.index(pos)?;
        Ok(&self.nodes[index])
    }

    pub fn node_mut(&mut self, pos: Pos) -> Result<&mut PathNode> {
        let index = self.index(pos)?;
        Ok(&mut self.nodes[index])
    }

    /// Node covering a world-space point, truncating toward zero.
    pub fn node_from_world_point(&self, x: f32, y: f32) -> Result<&PathNode> {
        let pos = Pos { y: self.world_to_cell(y), x: self.world_to_cell(x) };
        self.node(pos)
    }

    /// Cell index along one axis. Negative and non-finite coordinates map to -1 so the bounds
    /// check rejects them; floor keeps `-0.5` from landing in cell 0.
    fn world_to_cell(&self, coordinate: f32) -> i32 {
        let cell = (coordinate / self.node_diameter).floor();
        if cell.is_finite() && cell >= 0.0 { cell as i32 } else { -1 }
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.node(pos).is_ok_and(|node| node.walkable)
    }

    pub fn terrain(&self, pos: Pos) -> Terrain {
        self.node(pos).map_or(Terrain::None, |node| node.terrain)
    }

    pub fn set_walkable(&mut self, pos: Pos, walkable: bool) -> Result<()> {
        self.node_mut(pos)?.walkable = walkable;
        Ok(())
    }

    pub fn set_terrain(&mut self, pos: Pos, terrain: Terrain) -> Result<()> {
        self.node_mut(pos)?.terrain = terrain;
        Ok(())
    }

    /// Up to four axis-aligned in-bounds neighbours (up, right, down, left). No diagonals.
    pub fn neighbours(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        pos.orthogonal_neighbors().into_iter().filter(move |&neighbor| self.in_bounds(neighbor))
    }

    /// Same dimensions, everything walkable, no terrain tags.
    pub fn unobstructed_copy(&self) -> Self {
        Self::with_diameter(self.width, self.height, self.node_diameter)
    }

    fn index(&self, pos: Pos) -> Result<usize> {
        if !self.in_bounds(pos) {
            return Err(MapgenError::OutOfBounds { pos, width: self.width, height: self.height });
        }
        Ok((pos.y as usize) * self.width + (pos.x as usize))
    }
}
