//! How a structure inside a catchment routes its captured flow

use serde::{Deserialize, Serialize};

use crate::features::network::{DownstreamWalk, NodeId};
use crate::shared::{Point, Region};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecision {
    /// No outgoing conduit; captured water stays on the surface
    DeadEnd,
    /// The network carries it to the pour point anyway
    ReachesPourPoint,
    /// Every terminal discharges back inside the catchment
    DrainsInside,
    /// Every terminal discharges outside the catchment
    Diverted,
    /// Terminals on both sides
    Ambiguous,
    /// Only cycles downstream
    Unresolved,
}

impl RoutingDecision {
    /// Classify a downstream walk against the catchment it starts in
    ///
    /// `locate` maps a structure id to its location.
    pub fn classify<R, F>(
        walk: &DownstreamWalk,
        pour_node: Option<NodeId>,
        region: &R,
        locate: F,
    ) -> RoutingDecision
    where
        R: Region + ?Sized,
        F: Fn(NodeId) -> Option<Point>,
    {
        if walk.reached.len() == 1 && walk.terminals == [walk.origin] {
            return RoutingDecision::DeadEnd;
        }
        if pour_node.is_some_and(|p| walk.reaches(p)) {
            return RoutingDecision::ReachesPourPoint;
        }
        if walk.terminals.is_empty() {
            return RoutingDecision::Unresolved;
        }

        let inside = walk
            .terminals
            .iter()
            .filter(|&&t| locate(t).is_some_and(|p| region.contains_point(&p)))
            .count();
        if inside == walk.terminals.len() {
            RoutingDecision::DrainsInside
        } else if inside == 0 {
            RoutingDecision::Diverted
        } else {
            RoutingDecision::Ambiguous
        }
    }

    /// Whether the structure's corrected catchment is removed
    pub fn subtracts(&self) -> bool {
        matches!(self, RoutingDecision::Diverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::BBox;

    fn walk(origin: u64, reached: &[u64], terminals: &[u64], has_cycle: bool) -> DownstreamWalk {
        DownstreamWalk {
            origin: NodeId(origin),
            reached: reached.iter().copied().map(NodeId).collect(),
            terminals: terminals.iter().copied().map(NodeId).collect(),
            has_cycle,
        }
    }

    /// Node `n` sits at `(n, 0)`
    fn locate(id: NodeId) -> Option<Point> {
        Some(Point::new(id.0 as f64, 0.0))
    }

    #[test]
    fn test_classify() {
        let region = BBox::new(0.0, -1.0, 5.0, 1.0);

        let w = walk(1, &[1], &[1], false);
        assert_eq!(RoutingDecision::classify(&w, None, &region, locate), RoutingDecision::DeadEnd);

        let w = walk(1, &[1, 2, 9], &[9], false);
        assert_eq!(
            RoutingDecision::classify(&w, Some(NodeId(2)), &region, locate),
            RoutingDecision::ReachesPourPoint
        );
        assert_eq!(
            RoutingDecision::classify(&w, Some(NodeId(3)), &region, locate),
            RoutingDecision::Diverted
        );

        let w = walk(1, &[1, 2, 3], &[3], false);
        assert_eq!(RoutingDecision::classify(&w, None, &region, locate), RoutingDecision::DrainsInside);

        let w = walk(1, &[1, 3, 9], &[3, 9], false);
        assert_eq!(RoutingDecision::classify(&w, None, &region, locate), RoutingDecision::Ambiguous);

        let w = walk(1, &[1, 2], &[], true);
        assert_eq!(RoutingDecision::classify(&w, None, &region, locate), RoutingDecision::Unresolved);
    }

    #[test]
    fn test_only_diverted_subtracts() {
        assert!(RoutingDecision::Diverted.subtracts());
        assert!(!RoutingDecision::Ambiguous.subtracts());
        assert!(!RoutingDecision::DeadEnd.subtracts());
    }
}
