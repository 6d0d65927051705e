//! Scenario builders
//!
//! Structures are placed on valleys-grid cells and referenced by id when
//! drawing conduits.

use std::collections::HashMap;

use stormcatchment::features::network::{FeatureSet, LineFeature, PointFeature};
use stormcatchment::{Delineate, Point, StormConfig};

use super::fixtures::{at, valleys_grid};

/// Type codes understood by the default network configuration
pub const INLET: i64 = 2;
pub const JUNCTION: i64 = 4;
pub const OUTFALL: i64 = 5;

/// Builder for a structure/conduit layout on the valleys grid
#[derive(Debug, Default)]
pub struct Scenario {
    points: Vec<PointFeature>,
    lines: Vec<LineFeature>,
    locations: HashMap<u64, Point>,
    config: StormConfig,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a structure of `type_code` at cell `(row, col)`
    pub fn structure(self, id: u64, row: usize, col: usize, type_code: i64) -> Self {
        self.structure_at(id, at(row, col), type_code)
    }

    /// Add a structure of `type_code` at an arbitrary location, on or off the grid
    pub fn structure_at(mut self, id: u64, p: Point, type_code: i64) -> Self {
        self.locations.insert(id, p);
        self.points
            .push(PointFeature::new(id, p.x, p.y).with_attribute("Type", type_code));
        self
    }

    pub fn inlet(self, id: u64, row: usize, col: usize) -> Self {
        self.structure(id, row, col, INLET)
    }

    pub fn junction(self, id: u64, row: usize, col: usize) -> Self {
        self.structure(id, row, col, JUNCTION)
    }

    pub fn outfall(self, id: u64, row: usize, col: usize) -> Self {
        self.structure(id, row, col, OUTFALL)
    }

    /// Conduit from structure `from` to structure `to` (both already added)
    pub fn pipe(mut self, from: u64, to: u64) -> Self {
        let a = self.locations[&from];
        let b = self.locations[&to];
        let id = 1000 + self.lines.len() as u64;
        self.lines
            .push(LineFeature::segment(id, (a.x, a.y), (b.x, b.y)));
        self
    }

    pub fn config(mut self, config: StormConfig) -> Self {
        self.config = config;
        self
    }

    pub fn points(&self) -> FeatureSet<PointFeature> {
        FeatureSet::new(self.points.clone())
    }

    pub fn lines(&self) -> FeatureSet<LineFeature> {
        FeatureSet::new(self.lines.clone())
    }

    /// Engine over the valleys grid
    pub fn engine(&self) -> Delineate {
        Delineate::from_parts(&self.points(), &self.lines(), valleys_grid(), &self.config)
            .expect("scenario builds")
    }
}
