//! Construction policies

use serde::{Deserialize, Serialize};

/// What to do with a conduit endpoint that matches no structure within tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicitNodePolicy {
    /// Create one `Unknown` node per distinct unmatched location
    #[default]
    Create,
    /// Fail the build with a topology error
    Reject,
}

/// How conduit flow direction is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionPolicy {
    /// First vertex is upstream
    #[default]
    VertexOrder,
    /// Last vertex is upstream
    ReverseVertexOrder,
    /// Orient every conduit towards the outfall it connects to
    ///
    /// Conduits not connected to any outfall keep vertex order.
    FromOutfalls,
}
