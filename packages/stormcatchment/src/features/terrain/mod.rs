//! Terrain Module
//!
//! Terrain-only catchment delineation behind the [`TerrainService`] port:
//! - `domain/`: grid geometry, immutable catchment regions, errors
//! - `ports/`: the service trait the delineation engine depends on
//! - `infrastructure/`: D8 flow grid, ESRI ASCII DEM preprocessing, caching

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{GridSpec, TerrainCatchment, TerrainError};
pub use infrastructure::{preprocess_dem, AsciiGrid, CacheStats, CachedTerrain, FlowGrid};
pub use ports::TerrainService;
