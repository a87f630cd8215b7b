//! Map generators built on the pathfinding, triangulation and region layers.

pub mod model;

mod bsp;
mod cellular;
mod dla;
mod layout;
mod voronoi;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GeneratorConfig;
use crate::error::{MapgenError, Result};
use crate::random::{MapRng, derive_seed};

pub use bsp::BspGenerator;
pub use cellular::CellularGenerator;
pub use dla::DlaGenerator;
pub use model::{GeneratedMap, Link};
pub use voronoi::VoronoiGenerator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Bsp,
    Cellular,
    Voronoi,
    Dla,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] =
        [Algorithm::Bsp, Algorithm::Cellular, Algorithm::Voronoi, Algorithm::Dla];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bsp => "bsp",
            Algorithm::Cellular => "cellular",
            Algorithm::Voronoi => "voronoi",
            Algorithm::Dla => "dla",
        }
    }

    /// Stream id mixed into the run seed, so each algorithm draws its own sequence.
    pub fn stream(self) -> u64 {
        match self {
            Algorithm::Bsp => 1,
            Algorithm::Cellular => 2,
            Algorithm::Voronoi => 3,
            Algorithm::Dla => 4,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = MapgenError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "bsp" => Ok(Algorithm::Bsp),
            "cellular" | "cellular-automata" | "cave" => Ok(Algorithm::Cellular),
            "voronoi" => Ok(Algorithm::Voronoi),
            "dla" => Ok(Algorithm::Dla),
            _ => Err(MapgenError::UnknownAlgorithm(name.to_owned())),
        }
    }
}

/// A map generator. Every call starts from a solid-wall map, so repeated calls with equally
/// seeded random sources give identical maps.
pub trait MapGenerator {
    fn algorithm(&self) -> Algorithm;

    fn generate(&self, rng: &mut MapRng) -> Result<GeneratedMap>;
}

/// The generator for `algorithm`, configured from `config`.
pub fn generator_for(algorithm: Algorithm, config: &GeneratorConfig) -> Box<dyn MapGenerator> {
    match algorithm {
        Algorithm::Bsp => Box::new(BspGenerator::new(config)),
        Algorithm::Cellular => Box::new(CellularGenerator::new(config)),
        Algorithm::Voronoi => Box::new(VoronoiGenerator::new(config)),
        Algorithm::Dla => Box::new(DlaGenerator::new(config)),
    }
}

/// Validates `config`, seeds a per-algorithm stream from `seed` and runs the generator.
pub fn generate_map(
    algorithm: Algorithm,
    seed: u64,
    config: &GeneratorConfig,
) -> Result<GeneratedMap> {
    config.validate()?;
    let mut rng = MapRng::from_seed(derive_seed(seed, algorithm.stream()));
    let generated = generator_for(algorithm, config).generate(&mut rng)?;
    info!(
        %algorithm,
        seed,
        width = generated.width(),
        height = generated.height(),
        open_tiles = generated.map.count_open(),
        fingerprint = generated.fingerprint(),
        "map generated"
    );
    Ok(generated)
}
