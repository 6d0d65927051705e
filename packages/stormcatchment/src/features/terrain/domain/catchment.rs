//! Raster catchment regions
//!
//! A [`TerrainCatchment`] is an immutable set of cells on a fixed grid. The
//! delineation engine only ever combines regions with set operations that
//! return new values; nothing mutates a region in place.
//!
//! # Representation
//! ```text
//! cells: sorted, deduplicated row-major indices (shared via Arc)
//! union / difference / intersection: linear merge of two sorted runs
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use super::grid::GridSpec;
use crate::shared::{BBox, Point, Region};

/// Contributing cells of a catchment (or a union/difference of catchments)
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainCatchment {
    grid: GridSpec,
    cells: Arc<[usize]>,
}

impl TerrainCatchment {
    /// Build from arbitrary cell indices (sorted and deduplicated here)
    pub fn from_cells(grid: GridSpec, mut cells: Vec<usize>) -> Self {
        cells.sort_unstable();
        cells.dedup();
        cells.retain(|&c| c < grid.len());
        Self {
            grid,
            cells: cells.into(),
        }
    }

    pub fn empty(grid: GridSpec) -> Self {
        Self {
            grid,
            cells: Arc::from(Vec::new()),
        }
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Sorted cell indices
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Area in squared map units
    pub fn area(&self) -> f64 {
        self.cells.len() as f64 * self.grid.cell_area()
    }

    pub fn contains_cell(&self, cell: usize) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    /// Cells in either region
    pub fn union(&self, other: &TerrainCatchment) -> TerrainCatchment {
        debug_assert_eq!(self.grid, other.grid, "regions on different grids");
        let (a, b) = (&self.cells[..], &other.cells[..]);
        let mut out = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if a[i] < b[j] {
                out.push(a[i]);
                i += 1;
            } else if b[j] < a[i] {
                out.push(b[j]);
                j += 1;
            } else {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
        out.extend_from_slice(&a[i..]);
        out.extend_from_slice(&b[j..]);
        self.with_cells(out)
    }

    /// Cells in `self` but not in `other`
    pub fn difference(&self, other: &TerrainCatchment) -> TerrainCatchment {
        debug_assert_eq!(self.grid, other.grid, "regions on different grids");
        let (a, b) = (&self.cells[..], &other.cells[..]);
        let mut out = Vec::with_capacity(a.len());
        let mut j = 0;
        for &cell in a {
            while j < b.len() && b[j] < cell {
                j += 1;
            }
            if j < b.len() && b[j] == cell {
                continue;
            }
            out.push(cell);
        }
        self.with_cells(out)
    }

    /// Cells in both regions
    pub fn intersection(&self, other: &TerrainCatchment) -> TerrainCatchment {
        debug_assert_eq!(self.grid, other.grid, "regions on different grids");
        let (a, b) = (&self.cells[..], &other.cells[..]);
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        self.with_cells(out)
    }

    /// Edge-connected parts, each sorted, ordered by smallest cell index
    ///
    /// A network-corrected catchment is frequently a disjoint union: an
    /// outfall's own terrain plus inlet catchments far away.
    pub fn components(&self) -> Vec<TerrainCatchment> {
        let mut seen = vec![false; self.cells.len()];
        let mut parts = Vec::new();

        for start in 0..self.cells.len() {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut part = vec![self.cells[start]];
            let mut queue = VecDeque::from([self.cells[start]]);

            while let Some(cell) = queue.pop_front() {
                for n in self.grid.neighbors4(cell) {
                    if let Ok(pos) = self.cells.binary_search(&n) {
                        if !seen[pos] {
                            seen[pos] = true;
                            part.push(n);
                            queue.push_back(n);
                        }
                    }
                }
            }
            parts.push(TerrainCatchment::from_cells(self.grid, part));
        }
        parts
    }

    pub fn component_count(&self) -> usize {
        self.components().len()
    }

    fn with_cells(&self, cells: Vec<usize>) -> TerrainCatchment {
        TerrainCatchment {
            grid: self.grid,
            cells: cells.into(),
        }
    }
}

impl Region for TerrainCatchment {
    fn bounds(&self) -> Option<BBox> {
        if self.cells.is_empty() {
            return None;
        }
        let (mut min_r, mut max_r) = (usize::MAX, 0);
        let (mut min_c, mut max_c) = (usize::MAX, 0);
        for &cell in self.cells.iter() {
            let (r, c) = self.grid.row_col(cell);
            min_r = min_r.min(r);
            max_r = max_r.max(r);
            min_c = min_c.min(c);
            max_c = max_c.max(c);
        }
        let cs = self.grid.cell_size;
        Some(BBox::new(
            self.grid.x_min + min_c as f64 * cs,
            self.grid.y_max - (max_r + 1) as f64 * cs,
            self.grid.x_min + (max_c + 1) as f64 * cs,
            self.grid.y_max - min_r as f64 * cs,
        ))
    }

    fn contains_point(&self, p: &Point) -> bool {
        self.grid
            .cell_of(p)
            .map_or(false, |cell| self.contains_cell(cell))
    }
}
