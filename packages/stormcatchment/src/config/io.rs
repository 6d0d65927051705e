//! Configuration I/O (YAML)
//!
//! Defines the YAML schema types. Loading and saving live on `StormConfig`.

use serde::{Deserialize, Serialize};

use super::section_configs::{DelineationConfig, NetworkConfig, TerrainConfig};

/// Schema versions this build understands
pub const SUPPORTED_VERSIONS: &[u32] = &[1];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileV1 {
    /// Schema version (always 1 for v1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub terrain: TerrainConfig,

    #[serde(default)]
    pub delineation: DelineationConfig,
}
