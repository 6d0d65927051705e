//! Configuration System
//!
//! - Defaults: `StormConfig::default()` works for most networks
//! - Section overrides: builder setters on each section struct
//! - YAML v1 files: `StormConfig::from_yaml(path)`
//!
//! Every load path validates ranges and cross-section consistency.

pub mod error;
pub mod io;
pub mod section_configs;
pub mod storm_config;
pub mod validation;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use io::ConfigFileV1;
pub use section_configs::{DelineationConfig, NetworkConfig, TerrainConfig};
pub use storm_config::StormConfig;
pub use validation::Validatable;
