use std::result::Result as StdResult;

use thiserror::Error;
use toml::de::Error as TomlError;

use crate::types::Pos;

/// Errors raised by the generation core.
///
/// Expected "nothing found" outcomes (no path, degenerate triangulation) are not errors; they
/// come back as `None` or an empty list. Everything here is a caller or configuration mistake.
#[derive(Debug, Error)]
pub enum MapgenError {
    #[error("position ({}, {}) is outside the {width}x{height} grid", pos.x, pos.y)]
    OutOfBounds { pos: Pos, width: usize, height: usize },

    #[error("node index {index} is out of range for a graph of {len} nodes")]
    UnknownNode { index: usize, len: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] TomlError),

    #[error("unknown algorithm `{0}` (expected bsp, cellular, voronoi or dla)")]
    UnknownAlgorithm(String),
}

pub type Result<T, E = MapgenError> = StdResult<T, E>;
