pub mod config;
pub mod connectivity;
pub mod corridor;
pub mod delaunay;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod heap;
pub mod mapgen;
pub mod mst;
pub mod pathfinding;
pub mod random;
pub mod region;
pub mod tilemap;
pub mod types;

pub use config::GeneratorConfig;
pub use error::{MapgenError, Result};
pub use mapgen::{Algorithm, GeneratedMap, Link, MapGenerator, generate_map, generator_for};
pub use random::{MapRng, RandomSource, derive_seed};
pub use tilemap::{TileCanvas, TileMap};
pub use types::{Pos, Terrain, TileKind};
