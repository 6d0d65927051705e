//! Network-corrected catchment delineation
//!
//! # Algorithm
//!
//! ```text
//! corrected(p, pour_node):
//!   C0   = terrain catchment of p
//!   cand = structures inside C0, minus pour_node and structures in p's cell
//!   for N in cand (by id):
//!     walk N downstream; Diverted → C -= corrected(N)
//!   recv = pour_node + retained outfalls in cand
//!   for U in predecessors(recv) (by id):
//!     C += corrected(U)
//!   return C
//! ```
//!
//! Sub-delineations share one [`RequestState`] per top-level call: a structure
//! is entered before its recursion begins and its result is memoised when it
//! returns, so each structure is delineated at most once and cycles in the
//! network end in a diagnostic instead of unbounded recursion. A result
//! computed while a cycle was cut short stays memoised as is.
//!
//! Only the pour point itself must resolve on the terrain. A sub-delineation
//! that falls outside it is skipped with [`DiagnosticKind::OutsideTerrain`].

use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::request::{Progress, RequestState};
use crate::config::{StormConfig, Validatable};
use crate::errors::{Result, StormError};
use crate::features::delineation::domain::{DelineationResult, DiagnosticKind, RoutingDecision};
use crate::features::network::{FeatureSet, LineFeature, Network, Node, NodeId, PointFeature};
use crate::features::terrain::{CachedTerrain, FlowGrid, TerrainCatchment, TerrainService};
use crate::shared::Point;

/// Delineation engine over an immutable network and terrain service
///
/// Cheap to share across threads: both handles are read-only.
#[derive(Clone)]
pub struct Delineate {
    network: Arc<Network>,
    terrain: Arc<dyn TerrainService>,
    pour_point_tolerance: f64,
    max_depth: usize,
    parallel: bool,
}

/// What one level of the recursion produced
struct Level {
    region: TerrainCatchment,
    subtracted: Vec<NodeId>,
    added: Vec<NodeId>,
}

impl Delineate {
    pub fn new(
        network: Arc<Network>,
        terrain: Arc<dyn TerrainService>,
        config: &StormConfig,
    ) -> Result<Self> {
        config.validate()?;
        let max_depth = config
            .delineation
            .max_depth
            .unwrap_or(network.node_count() + 1);
        Ok(Self {
            network,
            terrain,
            pour_point_tolerance: config.pour_point_tolerance(),
            max_depth,
            parallel: config.delineation.parallel,
        })
    }

    /// Build the network and wrap the flow grid as configured
    pub fn from_parts(
        points: &FeatureSet<PointFeature>,
        lines: &FeatureSet<LineFeature>,
        grid: FlowGrid,
        config: &StormConfig,
    ) -> Result<Self> {
        let network = Network::build(points, lines, &config.network)?;
        let grid = grid.with_snap_radius(config.terrain.snap_radius_cells);
        let terrain: Arc<dyn TerrainService> = if config.terrain.cache {
            Arc::new(CachedTerrain::new(grid))
        } else {
            Arc::new(grid)
        };
        Self::new(Arc::new(network), terrain, config)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn terrain(&self) -> &dyn TerrainService {
        self.terrain.as_ref()
    }

    /// Network-corrected catchment draining to `pour_point`
    ///
    /// A pour point off the terrain and structural failures (missing
    /// structures) abort the request. Degenerate routing and upstream
    /// structures beyond the terrain never do; they show up in
    /// [`DelineationResult::diagnostics`].
    pub fn get_stormcatchment(&self, pour_point: Point) -> Result<DelineationResult> {
        let started = Instant::now();
        let mut state = RequestState::new(self.network.node_count());

        let pour_node = self
            .network
            .node_at(&pour_point, self.pour_point_tolerance)
            .map(|n| n.id);
        if let Some(id) = pour_node {
            state.enter(self.network.dense_index(id)?);
        }

        let level = self.corrected(pour_point, pour_node, &mut state, 0)?;

        let ids: Vec<NodeId> = self.network.nodes().map(|n| n.id).collect();
        let mut visited: Vec<NodeId> = state.visited_indices().map(|i| ids[i]).collect();
        visited.sort_unstable();
        let diagnostics = state.into_diagnostics();

        let area = level.region.area();
        info!(
            "Stormcatchment at ({}, {}): {} cells, area {:.1}, {} subtracted, {} added in {:?}",
            pour_point.x,
            pour_point.y,
            level.region.cell_count(),
            area,
            level.subtracted.len(),
            level.added.len(),
            started.elapsed()
        );
        if !diagnostics.is_empty() {
            warn!(
                "Stormcatchment at ({}, {}) completed with {} routing warnings",
                pour_point.x,
                pour_point.y,
                diagnostics.len()
            );
        }

        Ok(DelineationResult {
            pour_point,
            pour_node,
            region: level.region,
            area,
            visited,
            subtracted: level.subtracted,
            added: level.added,
            diagnostics,
        })
    }

    /// Independent requests; output order matches input order
    pub fn get_stormcatchments(&self, pour_points: &[Point]) -> Vec<Result<DelineationResult>> {
        #[cfg(feature = "parallel")]
        if self.parallel {
            return pour_points
                .par_iter()
                .map(|p| self.get_stormcatchment(*p))
                .collect();
        }

        pour_points
            .iter()
            .map(|p| self.get_stormcatchment(*p))
            .collect()
    }

    fn corrected(
        &self,
        point: Point,
        pour_node: Option<NodeId>,
        state: &mut RequestState,
        depth: usize,
    ) -> Result<Level> {
        let pour_cell = self.terrain.outlet_cell(&point)?;
        let base = self.terrain.delineate_cell(pour_cell)?;

        if depth > self.max_depth {
            if let Some(id) = pour_node {
                warn!("Depth limit {} reached at structure {}", self.max_depth, id);
                state.warn(id, DiagnosticKind::DepthLimitReached);
            }
            return Ok(Level {
                region: base,
                subtracted: Vec::new(),
                added: Vec::new(),
            });
        }

        let grid = *self.terrain.grid();
        let candidates: Vec<&Node> = self
            .network
            .nodes_within(&base)
            .into_iter()
            .filter(|n| Some(n.id) != pour_node)
            .filter(|n| grid.cell_of(&n.location) != Some(pour_cell))
            .collect();

        let mut region = base.clone();
        let mut subtracted = Vec::new();
        // Structures whose upstream network discharges into this catchment
        let mut receivers: Vec<NodeId> = pour_node.into_iter().collect();
        for node in candidates {
            let walk = self.network.downstream_walk(node.id)?;
            let decision = RoutingDecision::classify(&walk, pour_node, &base, |id| {
                self.network.node(id).ok().map(|n| n.location)
            });
            debug!("Structure {} inside catchment: {:?}", node.id, decision);

            if decision.subtracts() {
                if let Some(catchment) = self.sub_catchment(node, state, depth)? {
                    region = region.difference(&catchment);
                    subtracted.push(node.id);
                }
                continue;
            }
            match decision {
                RoutingDecision::Ambiguous => {
                    state.warn(node.id, DiagnosticKind::AmbiguousRouting);
                }
                RoutingDecision::Unresolved => {
                    state.warn(node.id, DiagnosticKind::CycleTruncated);
                }
                _ => {}
            }
            if node.is_outfall() {
                receivers.push(node.id);
            }
        }

        let mut contributors = Vec::new();
        for receiver in receivers {
            contributors.extend(self.network.predecessors(receiver)?);
        }
        contributors.sort_unstable();
        contributors.dedup();

        let mut added = Vec::new();
        for upstream in contributors {
            let node = self.network.node(upstream)?;
            if let Some(catchment) = self.sub_catchment(node, state, depth)? {
                region = region.union(&catchment);
                added.push(upstream);
            }
        }

        Ok(Level {
            region,
            subtracted,
            added,
        })
    }

    /// Corrected catchment of `node`, delineated at most once per request
    ///
    /// `None` when `node` is still being delineated further up the stack or
    /// lies beyond the terrain.
    fn sub_catchment(
        &self,
        node: &Node,
        state: &mut RequestState,
        depth: usize,
    ) -> Result<Option<TerrainCatchment>> {
        let dense = self.network.dense_index(node.id)?;
        match state.progress(node.id, dense) {
            Progress::Complete => Ok(state.memoised(node.id).cloned()),
            Progress::InProgress => {
                debug!("Structure {} is already being delineated", node.id);
                state.warn(node.id, DiagnosticKind::RevisitedInProgress);
                Ok(None)
            }
            Progress::Fresh => {
                state.enter(dense);
                match self.corrected(node.location, Some(node.id), state, depth + 1) {
                    Ok(level) => {
                        state.complete(node.id, level.region.clone());
                        Ok(Some(level.region))
                    }
                    Err(StormError::TerrainQuery(e)) => {
                        warn!("Structure {} skipped: {}", node.id, e);
                        state.warn(node.id, DiagnosticKind::OutsideTerrain);
                        state.skip(node.id);
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}
