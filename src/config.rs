//! Runtime Configuration
//!
//! Loaded from an optional JSON file; every field has a default.

use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::game::design::{DesignError, MapCatalogue};
use crate::game::input::DEFAULT_TILT_THRESHOLD;
use crate::{GOAL_PULSE_MS, WALL_PULSE_MS};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid config JSON.
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalogue file is invalid.
    #[error("Invalid map catalogue: {0}")]
    Catalogue(#[from] DesignError),

    /// Start map is not in the catalogue.
    #[error("Start map {start_map} is out of range ({map_count} maps)")]
    InvalidStartMap {
        /// Configured id.
        start_map: usize,
        /// Catalogue size.
        map_count: usize,
    },
}

/// How roll commands are executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollMode {
    /// Roll to completion when the command is handled.
    #[default]
    Instant,
    /// Advance one cell per queued tick.
    Animated,
}

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tilt magnitude that commands a roll.
    pub tilt_threshold: f32,
    /// Haptic pulse when a goal is consumed (ms).
    pub goal_pulse_ms: u64,
    /// Haptic pulse when the ball hits a wall (ms).
    pub wall_pulse_ms: u64,
    /// Map loaded at startup.
    pub start_map: usize,
    /// Roll execution mode.
    pub roll_mode: RollMode,
    /// JSON solve-record store. In-memory when unset.
    pub records_path: Option<PathBuf>,
    /// JSON catalogue of ASCII designs. Built-in maps when unset.
    pub catalogue_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tilt_threshold: DEFAULT_TILT_THRESHOLD,
            goal_pulse_ms: GOAL_PULSE_MS,
            wall_pulse_ms: WALL_PULSE_MS,
            start_map: 0,
            roll_mode: RollMode::Instant,
            records_path: None,
            catalogue_path: None,
        }
    }
}

impl Config {
    /// Parse from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load the configured catalogue, or the built-in one.
    pub fn load_catalogue(&self) -> Result<MapCatalogue, ConfigError> {
        match &self.catalogue_path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                Ok(MapCatalogue::from_json(&contents)?)
            }
            None => Ok(MapCatalogue::builtin()?),
        }
    }

    /// Check the start map against `catalogue`.
    pub fn validate(&self, catalogue: &MapCatalogue) -> Result<(), ConfigError> {
        if self.start_map >= catalogue.len() {
            return Err(ConfigError::InvalidStartMap {
                start_map: self.start_map,
                map_count: catalogue.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tilt_threshold, 2.0);
        assert_eq!(config.goal_pulse_ms, 100);
        assert_eq!(config.wall_pulse_ms, 12);
        assert_eq!(config.roll_mode, RollMode::Instant);
        assert_eq!(Config::from_json_str("{}").unwrap(), config);
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_json_str(
            r#"{"roll_mode": "animated", "wall_pulse_ms": 20, "records_path": "/tmp/records.json"}"#,
        )
        .unwrap();
        assert_eq!(config.roll_mode, RollMode::Animated);
        assert_eq!(config.wall_pulse_ms, 20);
        assert_eq!(config.goal_pulse_ms, 100);
        assert_eq!(config.records_path, Some(PathBuf::from("/tmp/records.json")));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Config::from_json_str("{\"start_map\": -1}"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_start_map_validation() {
        let catalogue = MapCatalogue::builtin().unwrap();
        let mut config = Config::default();
        assert!(config.validate(&catalogue).is_ok());

        config.start_map = catalogue.len();
        assert!(matches!(
            config.validate(&catalogue),
            Err(ConfigError::InvalidStartMap { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(Config::load("/nonexistent/tilt-maze.json"), Err(ConfigError::Io(_))));
    }
}
