//! Drainage network graph with petgraph
//!
//! Directed graph where:
//! - Nodes are structures (inlets, junctions, outfalls)
//! - Edges are conduits (A → B means water flows from A to B)
//!
//! The graph may contain cycles; nothing here assumes a DAG. Multi-hop
//! traversal and cycle bookkeeping belong to callers (routing queries and
//! the delineation engine).

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::spatial_index::SpatialIndex;
use crate::errors::{Result, StormError};
use crate::features::network::domain::{Edge, EdgeId, Node, NodeId};
use crate::shared::{Point, Region};

/// Summary of a network build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub nodes: usize,
    pub edges: usize,
    /// Nodes created for conduit endpoints that matched no structure
    pub implicit_nodes: usize,
    /// Conduits whose endpoints snapped to the same structure (dropped)
    pub collapsed_self_loops: usize,
    /// Conduits the outfall-driven orientation could not reach
    pub unresolved_directions: usize,
}

/// Immutable drainage network
#[derive(Debug, Clone)]
pub struct Network {
    pub(super) graph: DiGraph<Node, Edge>,
    pub(super) node_lookup: FxHashMap<NodeId, NodeIndex>,
    pub(super) edge_lookup: FxHashMap<EdgeId, EdgeIndex>,
    /// Slot `i` holds the location of `NodeIndex::new(i)`
    pub(super) spatial: SpatialIndex,
    pub(super) crs: Option<String>,
    pub(super) report: BuildReport,
}

impl Network {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// Look up a structure
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        let idx = self.index_of(id)?;
        Ok(&self.graph[idx])
    }

    /// Look up a conduit
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_lookup.get(&id).map(|&idx| &self.graph[idx])
    }

    /// All structures in construction order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// All conduits in construction order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// Dense index in `0..node_count()`, stable for the network's lifetime
    ///
    /// Used to key per-request arenas such as visited bitsets.
    pub fn dense_index(&self, id: NodeId) -> Result<usize> {
        self.index_of(id).map(|idx| idx.index())
    }

    /// Structures one conduit downstream, sorted and deduplicated
    pub fn successors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Structures one conduit upstream, sorted and deduplicated
    pub fn predecessors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Structures located inside `region`, sorted by id
    pub fn nodes_within<R: Region + ?Sized>(&self, region: &R) -> Vec<&Node> {
        let Some(bounds) = region.bounds() else {
            return Vec::new();
        };
        let mut nodes: Vec<&Node> = self
            .spatial
            .query(&bounds)
            .into_iter()
            .map(|slot| &self.graph[NodeIndex::new(slot)])
            .filter(|node| region.contains_point(&node.location))
            .collect();
        nodes.sort_by_key(|node| node.id);
        nodes
    }

    /// Structure closest to `p` within `tolerance`
    pub fn node_at(&self, p: &Point, tolerance: f64) -> Option<&Node> {
        self.spatial
            .nearest_within(p, tolerance)
            .map(|slot| &self.graph[NodeIndex::new(slot)])
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Result<NodeIndex> {
        self.node_lookup
            .get(&id)
            .copied()
            .ok_or(StormError::NotFound(id))
    }

    fn neighbors(&self, id: NodeId, direction: Direction) -> Result<Vec<NodeId>> {
        let idx = self.index_of(id)?;
        let mut ids: Vec<NodeId> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}
