//! Terrain domain: grid geometry, catchment regions, errors

mod catchment;
mod error;
mod grid;

pub use catchment::TerrainCatchment;
pub use error::TerrainError;
pub use grid::{GridSpec, D8_CODES, D8_OFFSETS};
