//! Terrain service error types

use thiserror::Error;

/// Failure of a terrain query or of grid preparation
#[derive(Debug, Error)]
pub enum TerrainError {
    /// Query point outside the grid extent
    #[error("Point ({x}, {y}) lies outside the grid extent")]
    OutsideExtent { x: f64, y: f64 },

    /// Query point on a no-data cell
    #[error("Point ({x}, {y}) falls on a no-data cell")]
    NoData { x: f64, y: f64 },

    /// Grid arrays inconsistent with the grid dimensions
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// DEM file could not be parsed
    #[error("DEM parse error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TerrainError {
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        TerrainError::InvalidGrid(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        TerrainError::Parse(msg.into())
    }
}
