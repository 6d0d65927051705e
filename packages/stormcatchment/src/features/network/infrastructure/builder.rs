//! Network construction from point and line features
//!
//! Algorithm:
//! 1. Check that both inputs (and the configuration) agree on the CRS
//! 2. Points → structures, classified from their attributes
//! 3. Lines → conduits; each end vertex snaps to the nearest structure within
//!    tolerance, or to an implicit structure when the policy allows it
//! 4. Conduits whose ends snap to the same structure are collapsed
//! 5. Flow direction from the configured policy
//! 6. Freeze into a petgraph `DiGraph` with sorted incident edge lists

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::direction::orient_from_outfalls;
use super::network::{BuildReport, Network};
use super::spatial_index::SpatialIndex;
use crate::config::{NetworkConfig, Validatable};
use crate::errors::{Result, StormError};
use crate::features::network::domain::{
    Attributes, DirectionPolicy, Edge, EdgeId, FeatureSet, ImplicitNodePolicy, LineFeature, Node,
    NodeId, NodeKind, PointFeature,
};
use crate::shared::{Point, Polyline};

/// Conduit awaiting orientation
struct PendingEdge {
    id: EdgeId,
    first: usize,
    last: usize,
    geometry: Polyline,
    length: Option<f64>,
    diameter: Option<f64>,
}

struct NetworkBuilder<'a> {
    config: &'a NetworkConfig,
    nodes: Vec<Node>,
    spatial: SpatialIndex,
    node_slots: FxHashMap<NodeId, usize>,
    next_implicit: u64,
    report: BuildReport,
}

impl Network {
    /// Build a network from structure points and conduit lines
    pub fn build(
        points: &FeatureSet<PointFeature>,
        lines: &FeatureSet<LineFeature>,
        config: &NetworkConfig,
    ) -> Result<Network> {
        config.validate()?;
        let crs = resolve_crs(
            points.crs.as_deref(),
            lines.crs.as_deref(),
            config.crs.as_deref(),
        )?;

        let mut builder = NetworkBuilder::new(config, points.len());
        for feature in &points.features {
            builder.add_point(feature)?;
        }
        builder.next_implicit = builder
            .nodes
            .iter()
            .map(|n| n.id.0.saturating_add(1))
            .max()
            .unwrap_or(0);

        let mut pending = Vec::with_capacity(lines.len());
        let mut edge_ids = FxHashSet::default();
        for feature in &lines.features {
            if !edge_ids.insert(feature.id) {
                return Err(StormError::topology(format!(
                    "duplicate conduit id {}",
                    feature.id
                )));
            }
            if let Some(edge) = builder.add_line(feature)? {
                pending.push(edge);
            }
        }

        builder.finish(pending, crs)
    }

    /// Build from bare feature vectors with default settings and the given tolerance
    pub fn from_features(
        points: Vec<PointFeature>,
        lines: Vec<LineFeature>,
        tolerance: f64,
    ) -> Result<Network> {
        let config = NetworkConfig::default().tolerance(tolerance);
        Self::build(&FeatureSet::new(points), &FeatureSet::new(lines), &config)
    }
}

impl<'a> NetworkBuilder<'a> {
    fn new(config: &'a NetworkConfig, capacity: usize) -> Self {
        Self {
            config,
            nodes: Vec::with_capacity(capacity),
            spatial: SpatialIndex::new((config.tolerance * 8.0).max(1.0)),
            node_slots: FxHashMap::default(),
            next_implicit: 0,
            report: BuildReport::default(),
        }
    }

    fn add_point(&mut self, feature: &PointFeature) -> Result<()> {
        let id = NodeId(feature.id);
        if self.node_slots.contains_key(&id) {
            return Err(StormError::topology(format!("duplicate structure id {}", id)));
        }
        let location = feature.location.rounded(self.config.coord_decimals);
        if !location.is_finite() {
            return Err(StormError::topology(format!(
                "structure {} has a non-finite location",
                id
            )));
        }

        let kind = classify(&feature.attributes, self.config)?;
        self.push_node(Node {
            id,
            location,
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            implicit: false,
            attributes: feature.attributes.clone(),
        });
        Ok(())
    }

    /// Snap a conduit; `None` when it collapsed into a self-loop
    fn add_line(&mut self, feature: &LineFeature) -> Result<Option<PendingEdge>> {
        let id = EdgeId(feature.id);
        let vertices: Vec<Point> = feature
            .vertices
            .iter()
            .map(|p| p.rounded(self.config.coord_decimals))
            .collect();
        if vertices.len() < 2 || vertices.iter().any(|p| !p.is_finite()) {
            return Err(StormError::topology(format!(
                "conduit {} has degenerate geometry ({} vertices)",
                id,
                vertices.len()
            )));
        }

        let first = self.resolve_endpoint(vertices[0], id)?;
        let last = self.resolve_endpoint(vertices[vertices.len() - 1], id)?;
        if first == last {
            self.report.collapsed_self_loops += 1;
            debug!(
                "Conduit {} collapsed: both ends snap to structure {}",
                id, self.nodes[first].id
            );
            return Ok(None);
        }

        Ok(Some(PendingEdge {
            id,
            first,
            last,
            geometry: Polyline::new(vertices),
            length: numeric_attribute(&feature.attributes, self.config.length_field.as_deref()),
            diameter: numeric_attribute(&feature.attributes, self.config.diameter_field.as_deref()),
        }))
    }

    fn resolve_endpoint(&mut self, p: Point, edge: EdgeId) -> Result<usize> {
        if let Some(slot) = self.spatial.nearest_within(&p, self.config.tolerance) {
            return Ok(slot);
        }

        match self.config.implicit_nodes {
            ImplicitNodePolicy::Reject => Err(StormError::topology(format!(
                "conduit {} endpoint ({}, {}) has no structure within {}",
                edge, p.x, p.y, self.config.tolerance
            ))),
            ImplicitNodePolicy::Create => {
                while self.node_slots.contains_key(&NodeId(self.next_implicit)) {
                    self.next_implicit += 1;
                }
                let id = NodeId(self.next_implicit);
                self.next_implicit += 1;
                self.report.implicit_nodes += 1;
                debug!(
                    "Implicit structure {} created at ({}, {}) for conduit {}",
                    id, p.x, p.y, edge
                );
                Ok(self.push_node(Node {
                    id,
                    location: p,
                    kind: NodeKind::Unknown,
                    incoming: Vec::new(),
                    outgoing: Vec::new(),
                    implicit: true,
                    attributes: Attributes::new(),
                }))
            }
        }
    }

    fn push_node(&mut self, node: Node) -> usize {
        let slot = self.spatial.insert(node.location);
        debug_assert_eq!(slot, self.nodes.len());
        self.node_slots.insert(node.id, slot);
        self.nodes.push(node);
        slot
    }

    fn finish(mut self, pending: Vec<PendingEdge>, crs: Option<String>) -> Result<Network> {
        let forward: Vec<bool> = match self.config.direction {
            DirectionPolicy::VertexOrder => vec![true; pending.len()],
            DirectionPolicy::ReverseVertexOrder => vec![false; pending.len()],
            DirectionPolicy::FromOutfalls => {
                let endpoints: Vec<(usize, usize)> =
                    pending.iter().map(|e| (e.first, e.last)).collect();
                let orientation = orient_from_outfalls(&self.nodes, &endpoints);
                self.report.unresolved_directions =
                    orientation.iter().filter(|o| o.is_none()).count();
                orientation.into_iter().map(|o| o.unwrap_or(true)).collect()
            }
        };
        if self.report.unresolved_directions > 0 {
            warn!(
                "{} conduits are not connected to any outfall; keeping vertex order",
                self.report.unresolved_directions
            );
        }

        let mut oriented = Vec::with_capacity(pending.len());
        for (edge, forward) in pending.into_iter().zip(forward) {
            let (source, target, geometry) = if forward {
                (edge.first, edge.last, edge.geometry)
            } else {
                (edge.last, edge.first, edge.geometry.reversed())
            };
            self.nodes[source].outgoing.push(edge.id);
            self.nodes[target].incoming.push(edge.id);
            oriented.push((
                source,
                target,
                Edge {
                    id: edge.id,
                    source: self.nodes[source].id,
                    target: self.nodes[target].id,
                    geometry,
                    length: edge.length,
                    diameter: edge.diameter,
                },
            ));
        }

        let mut graph = DiGraph::with_capacity(self.nodes.len(), oriented.len());
        let mut node_lookup = FxHashMap::default();
        for mut node in self.nodes {
            node.incoming.sort_unstable();
            node.outgoing.sort_unstable();
            let id = node.id;
            let idx = graph.add_node(node);
            node_lookup.insert(id, idx);
        }

        let mut edge_lookup = FxHashMap::default();
        for (source, target, edge) in oriented {
            let id = edge.id;
            let idx = graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), edge);
            edge_lookup.insert(id, idx);
        }

        self.report.nodes = graph.node_count();
        self.report.edges = graph.edge_count();
        info!(
            "Network built: {} structures ({} implicit), {} conduits, {} self-loops collapsed",
            self.report.nodes,
            self.report.implicit_nodes,
            self.report.edges,
            self.report.collapsed_self_loops
        );

        Ok(Network {
            graph,
            node_lookup,
            edge_lookup,
            spatial: self.spatial,
            crs,
            report: self.report,
        })
    }
}

fn resolve_crs(
    points: Option<&str>,
    lines: Option<&str>,
    expected: Option<&str>,
) -> Result<Option<String>> {
    if let (Some(p), Some(l)) = (points, lines) {
        if !p.eq_ignore_ascii_case(l) {
            return Err(StormError::topology(format!(
                "coordinate reference systems of point and line inputs must match ({} vs {})",
                p, l
            )));
        }
    }
    let declared = points.or(lines);
    if let (Some(d), Some(e)) = (declared, expected) {
        if !d.eq_ignore_ascii_case(e) {
            return Err(StormError::topology(format!(
                "inputs are in {} but the configuration expects {}",
                d, e
            )));
        }
    }
    Ok(declared.or(expected).map(str::to_string))
}

/// Structure kind from explicit `IS_SINK`/`IS_SOURCE` flags or the type code
fn classify(attributes: &Attributes, config: &NetworkConfig) -> Result<NodeKind> {
    let code = attributes.get(&config.type_field).and_then(type_code);
    let is_sink = match flag(attributes, "IS_SINK")? {
        Some(v) => v,
        None => code.map_or(false, |c| config.sink_types.contains(&c)),
    };
    let is_source = match flag(attributes, "IS_SOURCE")? {
        Some(v) => v,
        None => code.map_or(false, |c| config.source_types.contains(&c)),
    };

    Ok(if is_source {
        NodeKind::Outfall
    } else if is_sink {
        NodeKind::Inlet
    } else if code.is_some() {
        NodeKind::Junction
    } else {
        NodeKind::Unknown
    })
}

fn flag(attributes: &Attributes, key: &str) -> Result<Option<bool>> {
    match attributes.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(StormError::parse(format!(
            "attribute '{}' must be boolean, got {}",
            key, other
        ))),
    }
}

fn type_code(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn numeric_attribute(attributes: &Attributes, field: Option<&str>) -> Option<f64> {
    let value = attributes.get(field?)?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn typed(id: u64, x: f64, y: f64, code: i64) -> PointFeature {
        PointFeature::new(id, x, y).with_attribute("Type", code)
    }

    #[test]
    fn test_classification() {
        let config = NetworkConfig::default();
        let mut attrs = Attributes::new();
        assert_eq!(classify(&attrs, &config).unwrap(), NodeKind::Unknown);

        attrs.insert("Type".into(), json!(2));
        assert_eq!(classify(&attrs, &config).unwrap(), NodeKind::Inlet);
        attrs.insert("Type".into(), json!("9"));
        assert_eq!(classify(&attrs, &config).unwrap(), NodeKind::Outfall);
        attrs.insert("Type".into(), json!(4));
        assert_eq!(classify(&attrs, &config).unwrap(), NodeKind::Junction);

        // Explicit flags override the type lookup
        attrs.insert("IS_SINK".into(), json!(true));
        assert_eq!(classify(&attrs, &config).unwrap(), NodeKind::Inlet);
        attrs.insert("IS_SINK".into(), json!("yes"));
        assert!(classify(&attrs, &config).is_err());
    }

    #[test]
    fn test_snapping_within_tolerance() {
        let points = vec![typed(1, 0.0, 0.0, 2), typed(2, 10.0, 0.0, 5)];
        let lines = vec![LineFeature::segment(100, (0.2, 0.1), (9.9, -0.2))];
        let net = Network::from_features(points, lines, 0.5).unwrap();

        assert_eq!(net.node_count(), 2);
        assert_eq!(net.report().implicit_nodes, 0);
        assert_eq!(net.successors(NodeId(1)).unwrap(), vec![NodeId(2)]);
        assert_eq!(net.node(NodeId(2)).unwrap().incoming, vec![EdgeId(100)]);
    }

    #[test]
    fn test_implicit_nodes_created_once_per_location() {
        let points = vec![typed(1, 0.0, 0.0, 2), typed(2, 20.0, 0.0, 5)];
        // Both conduits meet at an unmarked bend (10, 0)
        let lines = vec![
            LineFeature::segment(100, (0.0, 0.0), (10.0, 0.0)),
            LineFeature::segment(101, (10.05, 0.0), (20.0, 0.0)),
        ];
        let net = Network::from_features(points, lines, 0.5).unwrap();

        assert_eq!(net.report().implicit_nodes, 1);
        let bend = net.node(NodeId(3)).unwrap();
        assert!(bend.implicit);
        assert_eq!(bend.kind, NodeKind::Unknown);
        assert_eq!(net.successors(NodeId(3)).unwrap(), vec![NodeId(2)]);
        assert_eq!(net.predecessors(NodeId(3)).unwrap(), vec![NodeId(1)]);
    }

    #[test]
    fn test_implicit_nodes_rejected() {
        let points = vec![typed(1, 0.0, 0.0, 2)];
        let lines = vec![LineFeature::segment(100, (0.0, 0.0), (10.0, 0.0))];
        let config = NetworkConfig::default().implicit_nodes(ImplicitNodePolicy::Reject);
        let err = Network::build(&FeatureSet::new(points), &FeatureSet::new(lines), &config)
            .unwrap_err();
        assert!(matches!(err, StormError::Topology(_)));
    }

    #[test]
    fn test_self_loops_collapsed() {
        let points = vec![typed(1, 0.0, 0.0, 2)];
        let lines = vec![LineFeature::new(
            100,
            vec![Point::new(0.0, 0.0), Point::new(3.0, 3.0), Point::new(0.1, 0.0)],
        )];
        let net = Network::from_features(points, lines, 0.5).unwrap();
        assert_eq!(net.edge_count(), 0);
        assert_eq!(net.report().collapsed_self_loops, 1);
    }

    #[test]
    fn test_duplicate_ids_and_degenerate_lines() {
        let dup = vec![typed(1, 0.0, 0.0, 2), typed(1, 5.0, 0.0, 2)];
        assert!(Network::from_features(dup, vec![], 0.5).is_err());

        let lines = vec![LineFeature::new(7, vec![Point::new(0.0, 0.0)])];
        assert!(Network::from_features(vec![], lines, 0.5).is_err());

        let lines = vec![
            LineFeature::segment(7, (0.0, 0.0), (1.0, 0.0)),
            LineFeature::segment(7, (5.0, 0.0), (6.0, 0.0)),
        ];
        assert!(Network::from_features(vec![], lines, 0.5).is_err());
    }

    #[test]
    fn test_crs_must_match() {
        let points = FeatureSet::new(vec![typed(1, 0.0, 0.0, 2)]).with_crs("EPSG:32145");
        let lines = FeatureSet::new(vec![]).with_crs("EPSG:4326");
        let err = Network::build(&points, &lines, &NetworkConfig::default()).unwrap_err();
        assert!(matches!(err, StormError::Topology(_)));

        let lines = FeatureSet::new(vec![]).with_crs("epsg:32145");
        let net = Network::build(&points, &lines, &NetworkConfig::default()).unwrap();
        assert_eq!(net.crs(), Some("EPSG:32145"));

        let config = NetworkConfig::default().crs("EPSG:2263");
        assert!(Network::build(&points, &lines, &config).is_err());
    }

    #[test]
    fn test_reverse_vertex_order() {
        let points = vec![typed(1, 0.0, 0.0, 2), typed(2, 10.0, 0.0, 5)];
        let lines = vec![LineFeature::segment(100, (10.0, 0.0), (0.0, 0.0))];
        let config = NetworkConfig::default().direction(DirectionPolicy::ReverseVertexOrder);
        let net = Network::build(&FeatureSet::new(points), &FeatureSet::new(lines), &config)
            .unwrap();

        let edge = net.edge(EdgeId(100)).unwrap();
        assert_eq!((edge.source, edge.target), (NodeId(1), NodeId(2)));
        assert_eq!(edge.geometry.first(), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_from_outfalls_orientation() {
        // inlet 1 → junction 2 → outfall 3, digitised in mixed directions,
        // plus an orphan conduit between 4 and 5
        let points = vec![
            typed(1, 0.0, 0.0, 2),
            typed(2, 10.0, 0.0, 4),
            typed(3, 20.0, 0.0, 5),
            typed(4, 0.0, 50.0, 4),
            typed(5, 10.0, 50.0, 4),
        ];
        let lines = vec![
            LineFeature::segment(100, (10.0, 0.0), (0.0, 0.0)),
            LineFeature::segment(101, (10.0, 0.0), (20.0, 0.0)),
            LineFeature::segment(102, (0.0, 50.0), (10.0, 50.0)),
        ];
        let config = NetworkConfig::default().direction(DirectionPolicy::FromOutfalls);
        let net = Network::build(&FeatureSet::new(points), &FeatureSet::new(lines), &config)
            .unwrap();

        assert_eq!(net.successors(NodeId(1)).unwrap(), vec![NodeId(2)]);
        assert_eq!(net.successors(NodeId(2)).unwrap(), vec![NodeId(3)]);
        assert_eq!(net.report().unresolved_directions, 1);
        assert_eq!(net.successors(NodeId(4)).unwrap(), vec![NodeId(5)]);
    }

    #[test]
    fn test_pass_through_metadata() {
        let points = vec![typed(1, 0.0, 0.0, 2), typed(2, 10.0, 0.0, 5)];
        let lines = vec![LineFeature::segment(100, (0.0, 0.0), (10.0, 0.0))
            .with_attribute("Length", 12.5)
            .with_attribute("Diam", "0.45")];
        let mut config = NetworkConfig::default();
        config.length_field = Some("Length".to_string());
        config.diameter_field = Some("Diam".to_string());
        let net = Network::build(&FeatureSet::new(points), &FeatureSet::new(lines), &config)
            .unwrap();

        let edge = net.edge(EdgeId(100)).unwrap();
        assert_eq!(edge.length, Some(12.5));
        assert_eq!(edge.diameter, Some(0.45));
        assert_eq!(edge.effective_length(), 12.5);
    }
}
