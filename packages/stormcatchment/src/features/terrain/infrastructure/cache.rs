//! Terrain catchment cache
//!
//! Delineating the same outlet cell twice always yields the same region
//! because the wrapped grid is immutable, so memoising per outlet cell is
//! safe. Lock-free concurrent access with DashMap lets parallel batch
//! requests share one cache.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::debug;

use crate::features::terrain::domain::{GridSpec, TerrainCatchment, TerrainError};
use crate::features::terrain::ports::TerrainService;
use crate::shared::Point;

/// Memoising wrapper around any [`TerrainService`]
pub struct CachedTerrain<T> {
    inner: T,
    catchments: DashMap<usize, TerrainCatchment>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl<T: TerrainService> CachedTerrain<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            catchments: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.catchments.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop all memoised catchments
    pub fn clear(&self) {
        self.catchments.clear();
    }
}

impl<T: TerrainService> TerrainService for CachedTerrain<T> {
    fn grid(&self) -> &GridSpec {
        self.inner.grid()
    }

    fn outlet_cell(&self, p: &Point) -> Result<usize, TerrainError> {
        self.inner.outlet_cell(p)
    }

    fn delineate_cell(&self, cell: usize) -> Result<TerrainCatchment, TerrainError> {
        if let Some(hit) = self.catchments.get(&cell) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit.value().clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let catchment = self.inner.delineate_cell(cell)?;
        debug!(
            "Terrain cache miss: cell {} ({} cells)",
            cell,
            catchment.cell_count()
        );
        self.catchments.insert(cell, catchment.clone());
        Ok(catchment)
    }
}
