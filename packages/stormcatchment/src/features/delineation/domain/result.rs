//! Delineation output

use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;
use crate::features::network::NodeId;
use crate::features::terrain::TerrainCatchment;
use crate::shared::{BBox, Point, Region};

/// Network-corrected catchment of one pour point
#[derive(Debug, Clone, PartialEq)]
pub struct DelineationResult {
    pub pour_point: Point,
    /// Structure coinciding with the pour point, if any
    pub pour_node: Option<NodeId>,
    pub region: TerrainCatchment,
    pub area: f64,
    /// Every structure delineated during the request, sorted
    pub visited: Vec<NodeId>,
    /// Structures whose corrected catchment was removed at the top level
    pub subtracted: Vec<NodeId>,
    /// Predecessors of the pour node whose corrected catchment was added
    pub added: Vec<NodeId>,
    /// Sorted, deduplicated
    pub diagnostics: Vec<Diagnostic>,
}

impl DelineationResult {
    pub fn has_warnings(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn component_count(&self) -> usize {
        self.region.component_count()
    }

    pub fn summary(&self) -> DelineationSummary {
        DelineationSummary {
            pour_point: self.pour_point,
            pour_node: self.pour_node,
            area: self.area,
            cells: self.region.cell_count(),
            components: self.component_count(),
            bounds: self.region.bounds(),
            visited: self.visited.clone(),
            subtracted: self.subtracted.clone(),
            added: self.added.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}

/// Serializable digest of a [`DelineationResult`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelineationSummary {
    pub pour_point: Point,
    pub pour_node: Option<NodeId>,
    pub area: f64,
    pub cells: usize,
    pub components: usize,
    pub bounds: Option<BBox>,
    pub visited: Vec<NodeId>,
    pub subtracted: Vec<NodeId>,
    pub added: Vec<NodeId>,
    pub diagnostics: Vec<Diagnostic>,
}
