//! Terrain service implementations

pub mod cache;
pub mod dem;
pub mod flow_grid;

pub use cache::{CacheStats, CachedTerrain};
pub use dem::{preprocess_dem, AsciiGrid};
pub use flow_grid::{FlowGrid, NODATA_DIRECTION, PIT};
