//! Error types for stormcatchment
//!
//! Structural failures (topology, missing ids) and terrain failures abort a
//! request. Degenerate routing is not an error; it is reported through
//! diagnostics on the result instead.

use thiserror::Error;

use crate::config::ConfigError;
use crate::features::network::domain::NodeId;
use crate::features::terrain::domain::TerrainError;

/// Main error type for stormcatchment operations
#[derive(Debug, Error)]
pub enum StormError {
    /// Network construction could not resolve the drainage topology
    #[error("Topology error: {0}")]
    Topology(String),

    /// Node id lookup failed
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    /// Terrain service rejected the query (propagated unmodified)
    #[error("Terrain query error: {0}")]
    TerrainQuery(#[from] TerrainError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (feature documents)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl StormError {
    /// Create a topology error
    pub fn topology(msg: impl Into<String>) -> Self {
        StormError::Topology(msg.into())
    }

    /// Create a parse error
    pub fn parse<E: std::fmt::Display>(e: E) -> Self {
        StormError::Parse(e.to_string())
    }

    /// Whether the failure is structural (bad network data) rather than a terrain miss
    pub fn is_structural(&self) -> bool {
        matches!(self, StormError::Topology(_) | StormError::NotFound(_))
    }
}

impl From<serde_json::Error> for StormError {
    fn from(e: serde_json::Error) -> Self {
        StormError::parse(e)
    }
}

/// Result type alias for stormcatchment operations
pub type Result<T> = std::result::Result<T, StormError>;
