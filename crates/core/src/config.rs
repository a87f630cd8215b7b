//! Generator tuning, loadable from TOML. Every field has a default, so a config file only
//! needs the values it changes.

use serde::{Deserialize, Serialize};

use crate::connectivity::ConnectionOptions;
use crate::error::{MapgenError, Result};
use crate::mst::DEFAULT_LOOP_FRACTION;
use crate::pathfinding::AstarOptions;

pub const MIN_MAP_SIDE: usize = 8;
pub const MAX_MAP_SIDE: usize = 1024;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub bsp: BspConfig,
    pub cellular: CellularConfig,
    pub voronoi: VoronoiConfig,
    pub dla: DlaConfig,
    pub connectivity: ConnectivityConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 50,
            bsp: BspConfig::default(),
            cellular: CellularConfig::default(),
            voronoi: VoronoiConfig::default(),
            dla: DlaConfig::default(),
            connectivity: ConnectivityConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BspConfig {
    /// Leaves are never split below this side length.
    pub min_leaf_size: usize,
    /// Split position is drawn from `[split_ratio, 1 - split_ratio]` of the leaf side.
    pub split_ratio: f64,
    pub max_depth: usize,
    /// Wall margin kept between a room and its leaf edge.
    pub room_padding: usize,
    pub min_room_size: usize,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            min_leaf_size: 10,
            split_ratio: 0.35,
            max_depth: 6,
            room_padding: 1,
            min_room_size: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CellularConfig {
    pub fill_probability: f64,
    pub smoothing_steps: usize,
    /// Wall pockets smaller than this are opened up.
    pub min_wall_region: usize,
    /// Floor pockets smaller than this are filled in.
    pub min_floor_region: usize,
    pub passage_radius: i32,
    pub max_connection_rounds: usize,
}

impl Default for CellularConfig {
    fn default() -> Self {
        Self {
            fill_probability: 0.45,
            smoothing_steps: 5,
            min_wall_region: 20,
            min_floor_region: 20,
            passage_radius: 1,
            max_connection_rounds: 512,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoronoiConfig {
    pub seed_count: usize,
}

impl Default for VoronoiConfig {
    fn default() -> Self {
        Self { seed_count: 24 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DlaConfig {
    /// Stop once this share of the interior is open.
    pub floor_fraction: f64,
    /// Steps a single digger may wander before it is abandoned.
    pub max_walk_steps: usize,
    pub max_diggers: usize,
}

impl Default for DlaConfig {
    fn default() -> Self {
        Self { floor_fraction: 0.3, max_walk_steps: 4_000, max_diggers: 20_000 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectivityConfig {
    pub loop_fraction: f64,
    pub widen: bool,
    pub terrain_costs: bool,
    pub max_iterations: usize,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            loop_fraction: DEFAULT_LOOP_FRACTION,
            widen: false,
            terrain_costs: true,
            max_iterations: 100_000,
        }
    }
}

impl ConnectivityConfig {
    pub fn options(&self) -> ConnectionOptions {
        ConnectionOptions {
            loop_fraction: self.loop_fraction,
            widen: self.widen,
            astar: AstarOptions {
                terrain_costs: self.terrain_costs,
                max_iterations: Some(self.max_iterations),
            },
        }
    }
}

impl GeneratorConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, side) in [("width", self.width), ("height", self.height)] {
            if !(MIN_MAP_SIDE..=MAX_MAP_SIDE).contains(&side) {
                return Err(invalid(format!(
                    "{name} must be between {MIN_MAP_SIDE} and {MAX_MAP_SIDE}, got {side}"
                )));
            }
        }

        let probabilities = [
            ("cellular.fill_probability", self.cellular.fill_probability),
            ("dla.floor_fraction", self.dla.floor_fraction),
            ("connectivity.loop_fraction", self.connectivity.loop_fraction),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }

        let bsp = &self.bsp;
        if !(0.1..=0.5).contains(&bsp.split_ratio) {
            return Err(invalid(format!(
                "bsp.split_ratio must be within [0.1, 0.5], got {}",
                bsp.split_ratio
            )));
        }
        if bsp.min_room_size == 0 {
            return Err(invalid("bsp.min_room_size must be positive".to_owned()));
        }
        let smallest_leaf = bsp.min_room_size + 2 * bsp.room_padding;
        if bsp.min_leaf_size < smallest_leaf {
            return Err(invalid(format!(
                "bsp.min_leaf_size must fit a room plus padding ({smallest_leaf}), got {}",
                bsp.min_leaf_size
            )));
        }

        if self.cellular.passage_radius < 1 {
            return Err(invalid("cellular.passage_radius must be at least 1".to_owned()));
        }
        if self.voronoi.seed_count == 0 {
            return Err(invalid("voronoi.seed_count must be positive".to_owned()));
        }
        if self.dla.max_walk_steps == 0 || self.dla.max_diggers == 0 {
            return Err(invalid("dla walk budgets must be positive".to_owned()));
        }
        if self.connectivity.max_iterations == 0 {
            return Err(invalid("connectivity.max_iterations must be positive".to_owned()));
        }
        Ok(())
    }
}

fn invalid(message: String) -> MapgenError {
    MapgenError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GeneratorConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            width = 64

            [cellular]
            smoothing_steps = 3

            [connectivity]
            widen = true
            "#,
        )
        .expect("valid config");
        assert_eq!(config.width, 64);
        assert_eq!(config.height, GeneratorConfig::default().height);
        assert_eq!(config.cellular.smoothing_steps, 3);
        assert_eq!(config.cellular.fill_probability, CellularConfig::default().fill_probability);
        assert!(config.connectivity.options().widen);
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let error = GeneratorConfig::from_toml_str("wdith = 10").expect_err("typo is rejected");
        assert!(matches!(error, MapgenError::ConfigParse(_)));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for source in [
            "width = 4",
            "[cellular]\nfill_probability = 1.5",
            "[bsp]\nmin_leaf_size = 3",
            "[voronoi]\nseed_count = 0",
        ] {
            let error = GeneratorConfig::from_toml_str(source).expect_err(source);
            assert!(matches!(error, MapgenError::InvalidConfig(_)), "{source}: {error}");
        }
    }

    #[test]
    fn connectivity_options_carry_search_settings() {
        let config =
            ConnectivityConfig { terrain_costs: false, max_iterations: 7, ..Default::default() };
        let options = config.options();
        assert!(!options.astar.terrain_costs);
        assert_eq!(options.astar.max_iterations, Some(7));
    }
}
