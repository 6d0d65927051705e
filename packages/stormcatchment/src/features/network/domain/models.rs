//! Network models: structures (nodes) and conduits (edges)

use std::fmt;

use serde::{Deserialize, Serialize};

use super::features::Attributes;
use crate::shared::{Point, Polyline};

/// Structure identifier, unique within a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conduit identifier, unique within a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Flow enters the network here (catch basin, culvert inlet)
    Inlet,
    /// Manhole, bend, confluence
    Junction,
    /// Flow leaves the network here (outfall, culvert outlet)
    Outfall,
    /// No type information (including implicit nodes)
    Unknown,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Inlet => "inlet",
            NodeKind::Junction => "junction",
            NodeKind::Outfall => "outfall",
            NodeKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point structure in the drainage network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub location: Point,
    pub kind: NodeKind,
    /// Conduits flowing into this structure, sorted
    pub incoming: Vec<EdgeId>,
    /// Conduits flowing out of this structure, sorted
    pub outgoing: Vec<EdgeId>,
    /// Created to terminate a conduit that matched no input point
    pub implicit: bool,
    pub attributes: Attributes,
}

impl Node {
    pub fn is_inlet(&self) -> bool {
        self.kind == NodeKind::Inlet
    }

    pub fn is_outfall(&self) -> bool {
        self.kind == NodeKind::Outfall
    }
}

/// A directed conduit; flow runs `source → target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Vertex order follows flow direction
    pub geometry: Polyline,
    pub length: Option<f64>,
    pub diameter: Option<f64>,
}

impl Edge {
    /// Recorded length, falling back to the geometry
    pub fn effective_length(&self) -> f64 {
        self.length.unwrap_or_else(|| self.geometry.length())
    }
}
