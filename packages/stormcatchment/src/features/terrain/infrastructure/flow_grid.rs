//! D8 flow grid - reference terrain service
//!
//! Each valid cell drains to exactly one of its eight neighbours (or nowhere,
//! for pits and grid-edge outlets). A terrain catchment is every cell whose
//! flow path passes through the outlet cell.
//!
//! # Encoding
//! ```text
//!  32  64 128
//!  16   x   1      0   = pit / outlet (valid, drains nowhere)
//!   8   4   2      255 = no-data
//! ```
//!
//! # Complexity
//! - Direction derivation: O(N)
//! - Accumulation: O(N) (Kahn order over the drainage forest)
//! - Delineation: O(catchment size)

use std::collections::VecDeque;

use tracing::debug;

use crate::features::terrain::domain::{
    GridSpec, TerrainCatchment, TerrainError, D8_CODES, D8_OFFSETS,
};
use crate::features::terrain::ports::TerrainService;
use crate::shared::Point;

/// Direction code of a cell that drains nowhere
pub const PIT: u8 = 0;

/// Direction code of a no-data cell
pub const NODATA_DIRECTION: u8 = 255;

/// Prepared `(grid, flow_direction, flow_accumulation)` state
#[derive(Debug, Clone)]
pub struct FlowGrid {
    spec: GridSpec,
    directions: Vec<u8>,
    accumulation: Vec<u32>,
    snap_radius_cells: usize,
}

impl FlowGrid {
    /// Build from precomputed ESRI D8 direction codes (row-major)
    pub fn from_directions(spec: GridSpec, directions: Vec<u8>) -> Result<Self, TerrainError> {
        if directions.len() != spec.len() {
            return Err(TerrainError::invalid_grid(format!(
                "expected {} direction cells, got {}",
                spec.len(),
                directions.len()
            )));
        }
        if let Some((cell, code)) = directions
            .iter()
            .enumerate()
            .find(|(_, &d)| d != PIT && d != NODATA_DIRECTION && !D8_CODES.contains(&d))
        {
            return Err(TerrainError::invalid_grid(format!(
                "cell {} has invalid D8 code {}",
                cell, code
            )));
        }

        let accumulation = compute_accumulation(&spec, &directions);
        Ok(Self {
            spec,
            directions,
            accumulation,
            snap_radius_cells: 0,
        })
    }

    /// Derive D8 directions by steepest descent over an elevation raster
    ///
    /// Cells equal to `nodata` (or non-finite) are no-data. Cells with no
    /// strictly lower valid neighbour become pits; depressions are not filled.
    pub fn from_elevations(
        spec: GridSpec,
        elevations: &[f64],
        nodata: Option<f64>,
    ) -> Result<Self, TerrainError> {
        if elevations.len() != spec.len() {
            return Err(TerrainError::invalid_grid(format!(
                "expected {} elevation cells, got {}",
                spec.len(),
                elevations.len()
            )));
        }

        let is_valid = |cell: usize| {
            let z = elevations[cell];
            z.is_finite() && nodata.map_or(true, |nd| z != nd)
        };

        let mut directions = vec![NODATA_DIRECTION; spec.len()];
        let mut pits = 0usize;
        for cell in 0..spec.len() {
            if !is_valid(cell) {
                continue;
            }
            let z = elevations[cell];
            let mut best: Option<(f64, u8)> = None;
            for (k, &(dr, dc)) in D8_OFFSETS.iter().enumerate() {
                let Some(n) = spec.offset(cell, dr, dc) else {
                    continue;
                };
                if !is_valid(n) {
                    continue;
                }
                let distance = if dr != 0 && dc != 0 {
                    std::f64::consts::SQRT_2
                } else {
                    1.0
                };
                let slope = (z - elevations[n]) / distance;
                if slope > 0.0 && best.map_or(true, |(s, _)| slope > s) {
                    best = Some((slope, D8_CODES[k]));
                }
            }
            directions[cell] = match best {
                Some((_, code)) => code,
                None => {
                    pits += 1;
                    PIT
                }
            };
        }

        debug!(
            "Derived D8 directions for {}x{} grid ({} pits)",
            spec.rows, spec.cols, pits
        );
        Self::from_directions(spec, directions)
    }

    /// Snap pour points to the highest-accumulation cell within `radius` cells
    pub fn with_snap_radius(mut self, radius: usize) -> Self {
        self.snap_radius_cells = radius;
        self
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn directions(&self) -> &[u8] {
        &self.directions
    }

    /// Number of cells (including itself) draining through each cell
    pub fn accumulation(&self) -> &[u32] {
        &self.accumulation
    }

    pub fn is_valid(&self, cell: usize) -> bool {
        self.directions[cell] != NODATA_DIRECTION
    }

    /// Cell that `cell` drains to, if any
    pub fn downstream(&self, cell: usize) -> Option<usize> {
        downstream_of(&self.spec, &self.directions, cell)
    }

    fn snap(&self, cell: usize) -> usize {
        if self.snap_radius_cells == 0 {
            return cell;
        }
        let r = self.snap_radius_cells as isize;
        let mut best = cell;
        let mut best_key = (self.accumulation[cell], 0isize);
        for dr in -r..=r {
            for dc in -r..=r {
                let Some(n) = self.spec.offset(cell, dr, dc) else {
                    continue;
                };
                if !self.is_valid(n) {
                    continue;
                }
                // Highest accumulation wins, then the closest cell, then the lowest index
                let key = (self.accumulation[n], -(dr * dr + dc * dc));
                if key > best_key || (key == best_key && n < best) {
                    best = n;
                    best_key = key;
                }
            }
        }
        best
    }
}

impl TerrainService for FlowGrid {
    fn grid(&self) -> &GridSpec {
        &self.spec
    }

    fn outlet_cell(&self, p: &Point) -> Result<usize, TerrainError> {
        let cell = self
            .spec
            .cell_of(p)
            .ok_or(TerrainError::OutsideExtent { x: p.x, y: p.y })?;
        if !self.is_valid(cell) {
            return Err(TerrainError::NoData { x: p.x, y: p.y });
        }
        Ok(self.snap(cell))
    }

    fn delineate_cell(&self, cell: usize) -> Result<TerrainCatchment, TerrainError> {
        if cell >= self.spec.len() {
            return Err(TerrainError::invalid_grid(format!(
                "cell {} outside {}x{} grid",
                cell, self.spec.rows, self.spec.cols
            )));
        }
        if !self.is_valid(cell) {
            let c = self.spec.cell_center(cell);
            return Err(TerrainError::NoData { x: c.x, y: c.y });
        }

        // Upstream BFS over inverted directions
        let mut seen = vec![false; self.spec.len()];
        let mut cells = vec![cell];
        let mut queue = VecDeque::from([cell]);
        seen[cell] = true;

        while let Some(current) = queue.pop_front() {
            for &(dr, dc) in D8_OFFSETS.iter() {
                let Some(n) = self.spec.offset(current, dr, dc) else {
                    continue;
                };
                if seen[n] || self.downstream(n) != Some(current) {
                    continue;
                }
                seen[n] = true;
                cells.push(n);
                queue.push_back(n);
            }
        }

        Ok(TerrainCatchment::from_cells(self.spec, cells))
    }
}

fn downstream_of(spec: &GridSpec, directions: &[u8], cell: usize) -> Option<usize> {
    let code = directions[cell];
    let k = D8_CODES.iter().position(|&c| c == code)?;
    let (dr, dc) = D8_OFFSETS[k];
    let n = spec.offset(cell, dr, dc)?;
    (directions[n] != NODATA_DIRECTION).then_some(n)
}

/// Upstream cell counts via Kahn's algorithm over the drainage forest
///
/// Cells on a direction cycle (only possible with hand-made direction grids)
/// never reach in-degree zero and keep a partial count.
fn compute_accumulation(spec: &GridSpec, directions: &[u8]) -> Vec<u32> {
    let n = spec.len();
    let mut accumulation = vec![0u32; n];
    let mut in_degree = vec![0u32; n];

    for cell in 0..n {
        if directions[cell] == NODATA_DIRECTION {
            continue;
        }
        accumulation[cell] = 1;
        if let Some(d) = downstream_of(spec, directions, cell) {
            in_degree[d] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..n)
        .filter(|&c| directions[c] != NODATA_DIRECTION && in_degree[c] == 0)
        .collect();

    while let Some(cell) = queue.pop_front() {
        if let Some(d) = downstream_of(spec, directions, cell) {
            accumulation[d] += accumulation[cell];
            in_degree[d] -= 1;
            if in_degree[d] == 0 {
                queue.push_back(d);
            }
        }
    }

    accumulation
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3 columns, every cell flows south, bottom row is pits
    fn south_grid(rows: usize) -> FlowGrid {
        let spec = GridSpec::new(0.0, rows as f64, 1.0, rows, 3);
        let mut dirs = vec![4u8; spec.len()];
        for col in 0..3 {
            dirs[spec.index(rows - 1, col)] = PIT;
        }
        FlowGrid::from_directions(spec, dirs).unwrap()
    }

    #[test]
    fn test_delineate_column() {
        let grid = south_grid(4);
        let outlet = grid.spec().index(3, 1);
        let c = grid.delineate_cell(outlet).unwrap();
        let expected: Vec<usize> = (0..4).map(|r| grid.spec().index(r, 1)).collect();
        assert_eq!(c.cells(), expected.as_slice());
        assert_eq!(grid.accumulation()[outlet], 4);
    }

    #[test]
    fn test_outside_and_nodata() {
        let spec = GridSpec::new(0.0, 2.0, 1.0, 2, 2);
        let grid = FlowGrid::from_directions(spec, vec![4, NODATA_DIRECTION, PIT, PIT]).unwrap();

        assert!(matches!(
            grid.delineate_point(&Point::new(5.0, 5.0)),
            Err(TerrainError::OutsideExtent { .. })
        ));
        assert!(matches!(
            grid.delineate_point(&Point::new(1.5, 1.5)),
            Err(TerrainError::NoData { .. })
        ));
    }

    #[test]
    fn test_invalid_codes_rejected() {
        let spec = GridSpec::new(0.0, 1.0, 1.0, 1, 2);
        assert!(FlowGrid::from_directions(spec, vec![3, 0]).is_err());
        assert!(FlowGrid::from_directions(spec, vec![0]).is_err());
    }

    #[test]
    fn test_from_elevations_tilted_plane() {
        // Elevation decreases southwards and towards the middle column
        let spec = GridSpec::new(0.0, 3.0, 1.0, 3, 3);
        #[rustfmt::skip]
        let z = vec![
            9.0, 8.0, 9.0,
            6.0, 5.0, 6.0,
            3.0, 2.0, 3.0,
        ];
        let grid = FlowGrid::from_elevations(spec, &z, None).unwrap();
        let outlet = spec.index(2, 1);
        assert_eq!(grid.directions()[outlet], PIT);
        assert_eq!(grid.accumulation()[outlet], 9);
        assert_eq!(grid.delineate_cell(outlet).unwrap().cell_count(), 9);
    }

    #[test]
    fn test_snap_to_accumulation() {
        let grid = south_grid(4).with_snap_radius(1);
        // Bottom row holds the largest counts; the one straight below is closest
        let cell = grid.outlet_cell(&Point::new(1.5, 1.5)).unwrap();
        assert_eq!(cell, grid.spec().index(3, 1));
    }
}
