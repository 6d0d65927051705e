//! Warnings attached to a delineation result
//!
//! Degenerate routing and structures beyond the terrain never fail a request
//! once its own pour point resolves. The engine falls back to the terrain-only answer for the
//! affected structure and records what happened here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::features::network::domain::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Downstream walk closed a cycle without reaching a terminal structure
    CycleTruncated,
    /// Downstream terminals lie both inside and outside the catchment
    AmbiguousRouting,
    /// Recursion depth guard hit; terrain-only catchment used
    DepthLimitReached,
    /// Reached a structure whose own delineation is still on the stack
    RevisitedInProgress,
    /// Upstream or diverted structure lies outside the terrain; skipped
    OutsideTerrain,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::CycleTruncated => "cycle_truncated",
            DiagnosticKind::AmbiguousRouting => "ambiguous_routing",
            DiagnosticKind::DepthLimitReached => "depth_limit_reached",
            DiagnosticKind::RevisitedInProgress => "revisited_in_progress",
            DiagnosticKind::OutsideTerrain => "outside_terrain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    pub node: NodeId,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(node: NodeId, kind: DiagnosticKind) -> Self {
        Self { node, kind }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at structure {}", self.kind.as_str(), self.node)
    }
}
