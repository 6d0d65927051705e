//! Raster grid geometry
//!
//! Cells are addressed by a dense row-major index. Row 0 is the northern edge
//! (`y_max`), column 0 the western edge (`x_min`), matching ESRI ASCII grids.

use serde::{Deserialize, Serialize};

use crate::shared::{BBox, Point};

/// D8 neighbour offsets `(d_row, d_col)` in ESRI code order: E, SE, S, SW, W, NW, N, NE
pub const D8_OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// ESRI D8 direction codes, index-aligned with [`D8_OFFSETS`]
pub const D8_CODES: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

/// Placement and resolution of a raster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// West edge of column 0
    pub x_min: f64,
    /// North edge of row 0
    pub y_max: f64,
    /// Square cell edge length
    pub cell_size: f64,
    pub rows: usize,
    pub cols: usize,
}

impl GridSpec {
    pub fn new(x_min: f64, y_max: f64, cell_size: f64, rows: usize, cols: usize) -> Self {
        Self {
            x_min,
            y_max,
            cell_size,
            rows,
            cols,
        }
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell_area(&self) -> f64 {
        self.cell_size * self.cell_size
    }

    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn row_col(&self, cell: usize) -> (usize, usize) {
        (cell / self.cols, cell % self.cols)
    }

    /// Cell containing `p`, or `None` outside the extent
    ///
    /// The east and south edges are exclusive.
    pub fn cell_of(&self, p: &Point) -> Option<usize> {
        if !p.is_finite() || self.cell_size <= 0.0 {
            return None;
        }
        let col = ((p.x - self.x_min) / self.cell_size).floor();
        let row = ((self.y_max - p.y) / self.cell_size).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f64 || row >= self.rows as f64 {
            return None;
        }
        Some(self.index(row as usize, col as usize))
    }

    pub fn cell_center(&self, cell: usize) -> Point {
        let (row, col) = self.row_col(cell);
        Point::new(
            self.x_min + (col as f64 + 0.5) * self.cell_size,
            self.y_max - (row as f64 + 0.5) * self.cell_size,
        )
    }

    /// Neighbour of `cell` at `(d_row, d_col)`, if inside the grid
    pub fn offset(&self, cell: usize, d_row: isize, d_col: isize) -> Option<usize> {
        let (row, col) = self.row_col(cell);
        let r = row as isize + d_row;
        let c = col as isize + d_col;
        if r < 0 || c < 0 || r >= self.rows as isize || c >= self.cols as isize {
            return None;
        }
        Some(self.index(r as usize, c as usize))
    }

    /// Edge-sharing neighbours
    pub fn neighbors4(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        [(-1, 0), (0, -1), (0, 1), (1, 0)]
            .into_iter()
            .filter_map(move |(dr, dc)| self.offset(cell, dr, dc))
    }

    pub fn bounds(&self) -> BBox {
        BBox::new(
            self.x_min,
            self.y_max - self.rows as f64 * self.cell_size,
            self.x_min + self.cols as f64 * self.cell_size,
            self.y_max,
        )
    }
}
