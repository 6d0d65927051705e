//! Planar geometry primitives
//!
//! Everything lives in a single projected reference frame (metres, feet, ...).
//! No reprojection happens anywhere in the crate; inputs must already agree.

use serde::{Deserialize, Serialize};

/// 2D coordinate in the projected reference frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Round both ordinates to `decimals` places
    ///
    /// Line vertices and structure locations digitised separately rarely agree
    /// to the last bit; rounding first keeps snapping stable.
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        Self {
            x: (self.x * factor).round() / factor,
            y: (self.y * factor).round() / factor,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Square box of half-width `radius` centred on `center`
    pub fn around(center: Point, radius: f64) -> Self {
        Self::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        )
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Ordered vertex sequence of a conduit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub vertices: Vec<Point>,
}

impl Polyline {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    pub fn first(&self) -> Option<Point> {
        self.vertices.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.vertices.last().copied()
    }

    /// Planar length along all segments
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .sum()
    }

    /// Same geometry traversed end to start
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Self { vertices }
    }
}

/// A closed area that can answer point-in-region queries
///
/// Implemented by terrain catchments; the network uses it for spatial
/// filtering without knowing anything about rasters.
pub trait Region {
    /// Envelope used to prefilter candidates
    fn bounds(&self) -> Option<BBox>;

    /// Exact containment test
    fn contains_point(&self, p: &Point) -> bool;
}

impl Region for BBox {
    fn bounds(&self) -> Option<BBox> {
        Some(*self)
    }

    fn contains_point(&self, p: &Point) -> bool {
        self.contains(p)
    }
}
