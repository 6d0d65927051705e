//! Conduit orientation from outfalls
//!
//! Surveyed line work is often digitised without regard to flow direction.
//! Starting at every outfall, a depth-first walk over the undirected conduit
//! graph orients each newly reached conduit towards the structure it was
//! reached from, i.e. towards the outfall.

use crate::features::network::domain::Node;

/// Orientation per conduit given its `(first_vertex_slot, last_vertex_slot)`
///
/// `Some(true)`: flow runs first → last. `Some(false)`: last → first.
/// `None`: no outfall reaches the conduit.
pub(super) fn orient_from_outfalls(nodes: &[Node], endpoints: &[(usize, usize)]) -> Vec<Option<bool>> {
    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (e, &(a, b)) in endpoints.iter().enumerate() {
        incident[a].push(e);
        incident[b].push(e);
    }

    let mut outfalls: Vec<usize> = (0..nodes.len()).filter(|&i| nodes[i].is_outfall()).collect();
    outfalls.sort_by_key(|&i| nodes[i].id);

    let mut orientation = vec![None; endpoints.len()];
    let mut visited = vec![false; nodes.len()];

    for start in outfalls {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut stack = vec![start];

        while let Some(v) = stack.pop() {
            for &e in &incident[v] {
                if orientation[e].is_some() {
                    continue;
                }
                let (a, b) = endpoints[e];
                let u = if a == v { b } else { a };
                // Water runs u → v
                orientation[e] = Some(b == v);
                if !visited[u] {
                    visited[u] = true;
                    stack.push(u);
                }
            }
        }
    }

    orientation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::network::domain::{Attributes, NodeId, NodeKind};
    use crate::shared::Point;

    fn node(id: u64, kind: NodeKind) -> Node {
        Node {
            id: NodeId(id),
            location: Point::new(id as f64, 0.0),
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            implicit: false,
            attributes: Attributes::new(),
        }
    }

    #[test]
    fn test_orients_towards_outfall() {
        // 0 (inlet) - 1 (junction) - 2 (outfall), second conduit digitised backwards
        let nodes = vec![
            node(10, NodeKind::Inlet),
            node(11, NodeKind::Junction),
            node(12, NodeKind::Outfall),
        ];
        let endpoints = vec![(0, 1), (2, 1)];
        let orientation = orient_from_outfalls(&nodes, &endpoints);
        assert_eq!(orientation, vec![Some(true), Some(false)]);
    }

    #[test]
    fn test_disconnected_conduits_unresolved() {
        let nodes = vec![
            node(1, NodeKind::Inlet),
            node(2, NodeKind::Junction),
            node(3, NodeKind::Outfall),
        ];
        let endpoints = vec![(0, 1)];
        assert_eq!(orient_from_outfalls(&nodes, &endpoints), vec![None]);
    }
}
