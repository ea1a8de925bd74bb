use crate::distance::DistanceMetric;
use crate::types::MAX_VIEW_RADIUS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Game-wide settings. Every field has a default, so a config file only
/// needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub version: String,
    /// Directory that holds one JSON document per named save.
    pub save_dir: PathBuf,
    /// Side length of the square world grid.
    pub world_size: u32,
    /// Seed for turn-group shuffling.
    pub seed: u32,
    pub default_action_points: f64,
    pub default_movement_points: f64,
    pub default_view_distance: u32,
    pub distance_function: DistanceMetric,
    /// Not consulted by the engine; failed actors are never retried.
    pub max_turn_retries: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: "0.0.0".into(),
            save_dir: PathBuf::from("saves"),
            world_size: 100,
            seed: 12345,
            default_action_points: 1.0,
            default_movement_points: 20.0,
            default_view_distance: 20,
            distance_function: DistanceMetric::Taxicab,
            max_turn_retries: 2,
        }
    }
}

impl GameConfig {
    /// Parse a config from YAML text and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::Invalid("version must not be empty".into()));
        }
        if self.world_size == 0 {
            return Err(ConfigError::Invalid("world_size must be positive".into()));
        }
        if i32::try_from(self.world_size).is_err() {
            return Err(ConfigError::Invalid(format!(
                "world_size {} does not fit the coordinate range",
                self.world_size
            )));
        }
        if self.default_view_distance > MAX_VIEW_RADIUS {
            return Err(ConfigError::Invalid(format!(
                "default_view_distance {} exceeds {MAX_VIEW_RADIUS}",
                self.default_view_distance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = GameConfig::default();
        assert_eq!(c.world_size, 100);
        assert_eq!(c.default_movement_points, 20.0);
        assert_eq!(c.default_action_points, 1.0);
        assert_eq!(c.default_view_distance, 20);
        assert_eq!(c.distance_function, DistanceMetric::Taxicab);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c = GameConfig::from_yaml_str("world_size: 9\ndistance_function: euclidean\n").unwrap();
        assert_eq!(c.world_size, 9);
        assert_eq!(c.distance_function, DistanceMetric::Euclidean);
        assert_eq!(c.seed, 12345);
    }

    #[test]
    fn zero_world_size_rejected() {
        assert!(matches!(
            GameConfig::from_yaml_str("world_size: 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn oversized_view_distance_rejected() {
        assert!(matches!(
            GameConfig::from_yaml_str("default_view_distance: 4294967295"),
            Err(ConfigError::Invalid(_))
        ));
        let edge = format!("default_view_distance: {MAX_VIEW_RADIUS}");
        assert!(GameConfig::from_yaml_str(&edge).is_ok());
    }

    #[test]
    fn blank_version_rejected() {
        assert!(matches!(
            GameConfig::from_yaml_str("version: \"  \""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("game.yaml");
        std::fs::write(&path, "seed: 7\nsave_dir: elsewhere\n").unwrap();
        let c = GameConfig::load(&path).unwrap();
        assert_eq!(c.seed, 7);
        assert_eq!(c.save_dir, PathBuf::from("elsewhere"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = GameConfig::load(tmp.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
