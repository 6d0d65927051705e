//! Test fixtures
//!
//! The "valleys" grid is 6 rows × 8 columns of unit cells in which every cell
//! drains straight south and the bottom row holds pits. Each column is thus an
//! independent stream: the terrain catchment of cell `(row, col)` is rows
//! `0..=row` of that column.

use stormcatchment::features::terrain::GridSpec;
use stormcatchment::{FlowGrid, Point};

pub const ROWS: usize = 6;
pub const COLS: usize = 8;

const SOUTH: u8 = 4;
const PIT: u8 = 0;

pub fn valleys_spec() -> GridSpec {
    GridSpec::new(0.0, ROWS as f64, 1.0, ROWS, COLS)
}

pub fn valleys_grid() -> FlowGrid {
    let mut directions = vec![SOUTH; ROWS * COLS];
    for col in 0..COLS {
        directions[(ROWS - 1) * COLS + col] = PIT;
    }
    FlowGrid::from_directions(valleys_spec(), directions).expect("valid valleys grid")
}

/// Centre of cell `(row, col)` on the valleys grid
pub fn at(row: usize, col: usize) -> Point {
    Point::new(col as f64 + 0.5, ROWS as f64 - row as f64 - 0.5)
}

/// Pour point at the bottom of a column
pub fn column_mouth(col: usize) -> Point {
    at(ROWS - 1, col)
}

/// Cell indices of rows `from..=to` in `col`
pub fn column_cells(col: usize, from: usize, to: usize) -> Vec<usize> {
    (from..=to).map(|row| row * COLS + col).collect()
}

/// Small ESRI ASCII DEM tilted towards its south-west corner
///
/// Every cell drains to the pit at row 2, column 0 (x 0..10, y 0..10).
/// `xllcorner 0, yllcorner 0, cellsize 10`
pub const SLOPE_DEM: &str = "ncols 4
nrows 3
xllcorner 0.0
yllcorner 0.0
cellsize 10
NODATA_value -9999
3 4 5 6
2 3 4 5
1 2 3 4
";
