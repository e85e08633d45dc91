use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::GameConstants;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunables for complex generation and the light sources it places.
///
/// Missing fields fall back to the values in [`GameConstants`], so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexConfig {
    pub max_attempts: u32,
    pub min_blocks: usize,
    pub max_blocks: usize,
    pub min_outdoor_edge: usize,
    pub edge_probability: f64,
    pub interior_probability: f64,
    pub extra_floor_probability: [f64; 3],
    pub static_light_radius: i32,
    pub flashlight_radius: i32,
    pub prop_chance: f64,
}

impl Default for ComplexConfig {
    fn default() -> Self {
        Self {
            max_attempts: GameConstants::MAX_PLACEMENT_ATTEMPTS,
            min_blocks: GameConstants::MIN_BUILT_BLOCKS,
            max_blocks: GameConstants::MAX_BUILT_BLOCKS,
            min_outdoor_edge: GameConstants::MIN_OUTDOOR_EDGE_BLOCKS,
            edge_probability: GameConstants::EDGE_BLOCK_PROBABILITY,
            interior_probability: GameConstants::INTERIOR_BLOCK_PROBABILITY,
            extra_floor_probability: GameConstants::EXTRA_FLOOR_PROBABILITY,
            static_light_radius: GameConstants::STATIC_LIGHT_RADIUS,
            flashlight_radius: GameConstants::FLASHLIGHT_RADIUS,
            prop_chance: GameConstants::ROOM_PROP_CHANCE,
        }
    }
}

impl ComplexConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Probability of a block at `placed` already-built blocks, clamped to [0, 1]
    pub fn placement_probability(&self, interior: bool, placed: usize) -> f64 {
        let total = (GameConstants::COMPLEX_WIDTH * GameConstants::COMPLEX_HEIGHT) as f64;
        let base = if interior { self.interior_probability } else { self.edge_probability };
        (base * (1.0 - placed as f64 / total)).clamp(0.0, 1.0)
    }
}
