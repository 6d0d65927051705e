//! Terrain Ports - Interface Layer
//!
//! The delineation engine depends on this trait only; the D8 flow grid in
//! `infrastructure/` is one implementation, the caching wrapper another.

use crate::features::terrain::domain::{GridSpec, TerrainCatchment, TerrainError};
use crate::shared::Point;

/// Terrain-only catchment delineation over prepared flow grids
///
/// Implementations own their `(grid, flow_direction, flow_accumulation)`
/// state, which is immutable for the lifetime of the service. Queries are
/// deterministic for identical inputs.
pub trait TerrainService: Send + Sync {
    /// Grid every returned catchment lives on
    fn grid(&self) -> &GridSpec;

    /// Cell a query at `p` delineates from (after any pour-point snapping)
    fn outlet_cell(&self, p: &Point) -> Result<usize, TerrainError>;

    /// Catchment draining to `cell`
    fn delineate_cell(&self, cell: usize) -> Result<TerrainCatchment, TerrainError>;

    /// Catchment draining to the point `p`
    fn delineate_point(&self, p: &Point) -> Result<TerrainCatchment, TerrainError> {
        let cell = self.outlet_cell(p)?;
        self.delineate_cell(cell)
    }
}

impl<T: TerrainService + ?Sized> TerrainService for std::sync::Arc<T> {
    fn grid(&self) -> &GridSpec {
        (**self).grid()
    }

    fn outlet_cell(&self, p: &Point) -> Result<usize, TerrainError> {
        (**self).outlet_cell(p)
    }

    fn delineate_cell(&self, cell: usize) -> Result<TerrainCatchment, TerrainError> {
        (**self).delineate_cell(cell)
    }
}
