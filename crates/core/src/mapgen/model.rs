//! Public data model for generated maps.

use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::delaunay::Edge;
use crate::geometry::euclidean;
use crate::graph::WeightedGraph;
use crate::tilemap::{TileCanvas, TileMap};
use crate::types::{Pos, TileKind};

use super::Algorithm;

/// A connection the generator routed between two anchors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Link {
    pub from: Pos,
    pub to: Pos,
}

impl From<&Edge> for Link {
    fn from(edge: &Edge) -> Self {
        Self { from: edge.u.0, to: edge.v.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GeneratedMap {
    pub algorithm: Algorithm,
    pub map: TileMap,
    /// Room centres, Voronoi seeds, region origins or the DLA seed, depending on the algorithm.
    pub anchors: Vec<Pos>,
    pub links: Vec<Link>,
}

impl GeneratedMap {
    pub fn width(&self) -> usize {
        self.map.width()
    }

    pub fn height(&self) -> usize {
        self.map.height()
    }

    pub fn tile_at(&self, pos: Pos) -> TileKind {
        self.map.tile_at(pos)
    }

    /// Anchors as nodes and links as undirected edges weighted by straight-line length.
    pub fn link_graph(&self) -> WeightedGraph<Pos> {
        let mut graph = WeightedGraph::new();
        for &anchor in &self.anchors {
            graph.add_node(anchor);
        }
        for link in &self.links {
            graph.connect(link.from, link.to, euclidean(link.from, link.to));
        }
        graph
    }

    /// Pushes every tile to `canvas` after clearing it.
    pub fn paint(&self, canvas: &mut impl TileCanvas) {
        self.map.paint_onto(canvas);
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(16 + self.map.tiles().len());
        bytes.push(self.algorithm.stream() as u8);
        bytes.extend((self.width() as u32).to_le_bytes());
        bytes.extend((self.height() as u32).to_le_bytes());
        for tile in self.map.tiles() {
            bytes.push(match tile {
                TileKind::Wall => 0,
                TileKind::Floor => 1,
                TileKind::Corridor => 2,
            });
        }

        bytes.extend((self.anchors.len() as u32).to_le_bytes());
        for anchor in &self.anchors {
            bytes.extend(anchor.y.to_le_bytes());
            bytes.extend(anchor.x.to_le_bytes());
        }

        bytes.extend((self.links.len() as u32).to_le_bytes());
        for link in &self.links {
            for pos in [link.from, link.to] {
                bytes.extend(pos.y.to_le_bytes());
                bytes.extend(pos.x.to_le_bytes());
            }
        }
        bytes
    }

    /// `xxh3_64` of [`Self::canonical_bytes`].
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}
