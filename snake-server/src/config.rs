//! Game Configuration
//!
//! Board geometry, speed ramp and scoring constants. Every field has a
//! default, so a config file only needs the keys it wants to change.

use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::core::grid::GridPos;

/// Largest accepted board side. Food fallback and text rendering walk
/// the whole board.
pub const MAX_CELLS_PER_SIDE: u32 = 1024;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for `GameConfig`.
    #[error("Invalid config format: {0}")]
    Parse(#[from] serde_json::Error),

    /// Values parse but are inconsistent.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board is `cells_per_side` x `cells_per_side` cells
    pub cells_per_side: u32,
    /// Size of one cell in render units (pixels for a canvas)
    pub cell_size: u32,
    /// Spawn cell of the single-segment snake
    pub origin: GridPos,
    /// Tick interval at game start (ms)
    pub initial_speed_ms: u64,
    /// Interval reduction per food eaten (ms)
    pub speed_step_ms: u64,
    /// Fastest allowed interval (ms)
    pub min_speed_ms: u64,
    /// Score awarded per food
    pub food_points: u32,
    /// Random draws before food placement falls back to the free-cell list
    pub max_food_attempts: u32,
    /// Fixed RNG seed. `None` derives one per game.
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cells_per_side: 20,
            cell_size: 20,
            origin: GridPos::new(10, 10),
            initial_speed_ms: 100,
            speed_step_ms: 2,
            min_speed_ms: 50,
            food_points: 10,
            max_food_attempts: 64,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    /// Load and validate a config from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cells_per_side < 2 {
            return Err(ConfigError::Invalid(format!(
                "cells_per_side must be at least 2, got {}",
                self.cells_per_side
            )));
        }
        if self.cells_per_side > MAX_CELLS_PER_SIDE {
            return Err(ConfigError::Invalid(format!(
                "cells_per_side must be at most {}, got {}",
                MAX_CELLS_PER_SIDE, self.cells_per_side
            )));
        }
        if !self.origin.is_on_board(self.cells_per_side) {
            return Err(ConfigError::Invalid(format!(
                "origin {} is outside a {}x{} board",
                self.origin, self.cells_per_side, self.cells_per_side
            )));
        }
        if self.min_speed_ms == 0 {
            return Err(ConfigError::Invalid("min_speed_ms must be positive".into()));
        }
        if self.min_speed_ms > self.initial_speed_ms {
            return Err(ConfigError::Invalid(format!(
                "min_speed_ms ({}) exceeds initial_speed_ms ({})",
                self.min_speed_ms, self.initial_speed_ms
            )));
        }
        Ok(())
    }

    /// Total number of cells on the board.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells_per_side as usize * self.cells_per_side as usize
    }

    /// Interval after one more food: `max(min, speed - step)`.
    #[inline]
    pub fn next_speed(&self, speed_ms: u64) -> u64 {
        speed_ms.saturating_sub(self.speed_step_ms).max(self.min_speed_ms)
    }
}

/// Configuration for the async tick driver.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Capacity of the input command channel.
    pub command_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_capacity: 256,
            command_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cell_count(), 400);
    }

    #[test]
    fn test_speed_ramp_floors_at_min() {
        let config = GameConfig::default();
        assert_eq!(config.next_speed(100), 98);
        assert_eq!(config.next_speed(52), 50);
        assert_eq!(config.next_speed(51), 50);
        assert_eq!(config.next_speed(50), 50);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json(r#"{ "cells_per_side": 12, "origin": { "x": 3, "y": 4 } }"#)
            .unwrap();
        assert_eq!(config.cells_per_side, 12);
        assert_eq!(config.origin, GridPos::new(3, 4));
        assert_eq!(config.initial_speed_ms, 100);
        assert_eq!(config.food_points, 10);
    }

    #[test]
    fn test_origin_outside_board_rejected() {
        let result = GameConfig::from_json(r#"{ "cells_per_side": 5 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_speed_range_rejected() {
        let config = GameConfig {
            initial_speed_ms: 40,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_board_size_bounds() {
        let max = GameConfig {
            cells_per_side: MAX_CELLS_PER_SIDE,
            ..Default::default()
        };
        assert!(max.validate().is_ok());

        let huge = GameConfig::from_json(r#"{ "cells_per_side": 200000 }"#);
        assert!(matches!(huge, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = GameConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
