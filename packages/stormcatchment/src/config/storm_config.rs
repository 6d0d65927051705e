//! Top-level configuration
//!
//! # Examples
//!
//! ```rust,ignore
//! use stormcatchment::config::{NetworkConfig, StormConfig};
//!
//! // Defaults
//! let config = StormConfig::default();
//!
//! // Override one section
//! let config = StormConfig::default().with_network(NetworkConfig::default().tolerance(1.0));
//!
//! // Complete control via YAML
//! let config = StormConfig::from_yaml("stormcatchment.yaml")?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigFileV1, SUPPORTED_VERSIONS};
use super::section_configs::{DelineationConfig, NetworkConfig, TerrainConfig};
use super::validation::Validatable;

/// Configuration for network construction, terrain queries and delineation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StormConfig {
    pub network: NetworkConfig,
    pub terrain: TerrainConfig,
    pub delineation: DelineationConfig,
}

impl StormConfig {
    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn with_terrain(mut self, terrain: TerrainConfig) -> Self {
        self.terrain = terrain;
        self
    }

    pub fn with_delineation(mut self, delineation: DelineationConfig) -> Self {
        self.delineation = delineation;
        self
    }

    /// Pour point tolerance with the network fallback applied
    pub fn pour_point_tolerance(&self) -> f64 {
        self.delineation
            .pour_point_tolerance
            .unwrap_or(self.network.tolerance)
    }

    /// Load and validate a YAML v1 file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate YAML v1 text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;

        let version = file.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let config = Self {
            network: file.network,
            terrain: file.terrain,
            delineation: file.delineation,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: Some(1),
            network: self.network.clone(),
            terrain: self.terrain.clone(),
            delineation: self.delineation.clone(),
        };
        serde_yaml::to_string(&file).map_err(ConfigError::Yaml)
    }
}

impl Validatable for StormConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.network.validate()?;
        self.terrain.validate()?;
        self.delineation.validate()?;

        // A pour point tolerance far above the snapping tolerance makes the
        // pour point swallow structures the network treats as distinct.
        if let Some(tol) = self.delineation.pour_point_tolerance {
            if self.network.tolerance > 0.0 && tol > self.network.tolerance * 100.0 {
                return Err(ConfigError::conflict(
                    format!(
                        "delineation.pour_point_tolerance ({}) is more than 100x network.tolerance ({})",
                        tol, self.network.tolerance
                    ),
                    "lower pour_point_tolerance or raise network.tolerance",
                ));
            }
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "stormcatchment"
    }
}
