//! Per-request delineation state
//!
//! One `RequestState` lives for exactly one top-level call and is threaded
//! through the recursion by `&mut`. A structure is *visited* once its
//! sub-delineation has started and *complete* once its outcome is memoised;
//! visited but not complete means it is still on the stack. A complete
//! structure without a catchment was skipped (it lies beyond the terrain).

use rustc_hash::FxHashMap;

use crate::features::delineation::domain::{Diagnostic, DiagnosticKind};
use crate::features::network::NodeId;
use crate::features::terrain::TerrainCatchment;

pub(super) struct RequestState {
    /// Keyed by dense node index
    visited: Vec<bool>,
    memo: FxHashMap<NodeId, Option<TerrainCatchment>>,
    diagnostics: Vec<Diagnostic>,
}

/// Where a structure stands within the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Progress {
    Fresh,
    InProgress,
    Complete,
}

impl RequestState {
    pub(super) fn new(node_count: usize) -> Self {
        Self {
            visited: vec![false; node_count],
            memo: FxHashMap::default(),
            diagnostics: Vec::new(),
        }
    }

    pub(super) fn progress(&self, id: NodeId, dense: usize) -> Progress {
        if self.memo.contains_key(&id) {
            Progress::Complete
        } else if self.visited[dense] {
            Progress::InProgress
        } else {
            Progress::Fresh
        }
    }

    pub(super) fn enter(&mut self, dense: usize) {
        self.visited[dense] = true;
    }

    pub(super) fn complete(&mut self, id: NodeId, catchment: TerrainCatchment) {
        self.memo.insert(id, Some(catchment));
    }

    pub(super) fn skip(&mut self, id: NodeId) {
        self.memo.insert(id, None);
    }

    pub(super) fn memoised(&self, id: NodeId) -> Option<&TerrainCatchment> {
        self.memo.get(&id).and_then(Option::as_ref)
    }

    pub(super) fn warn(&mut self, node: NodeId, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic::new(node, kind));
    }

    /// Dense indices entered during the request
    pub(super) fn visited_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.visited
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| i)
    }

    pub(super) fn into_diagnostics(self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics;
        diagnostics.sort_unstable();
        diagnostics.dedup();
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::terrain::GridSpec;

    #[test]
    fn test_progress_transitions() {
        let mut state = RequestState::new(3);
        let id = NodeId(42);
        assert_eq!(state.progress(id, 1), Progress::Fresh);

        state.enter(1);
        assert_eq!(state.progress(id, 1), Progress::InProgress);

        let grid = GridSpec::new(0.0, 3.0, 1.0, 3, 3);
        state.complete(id, TerrainCatchment::from_cells(grid, vec![4]));
        assert_eq!(state.progress(id, 1), Progress::Complete);
        assert_eq!(state.memoised(id).map(|c| c.cell_count()), Some(1));
        assert_eq!(state.visited_indices().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_skipped_structure_is_complete_without_catchment() {
        let mut state = RequestState::new(2);
        let id = NodeId(7);
        state.enter(0);
        state.skip(id);
        assert_eq!(state.progress(id, 0), Progress::Complete);
        assert!(state.memoised(id).is_none());
    }

    #[test]
    fn test_diagnostics_deduplicated() {
        let mut state = RequestState::new(0);
        state.warn(NodeId(2), DiagnosticKind::CycleTruncated);
        state.warn(NodeId(1), DiagnosticKind::AmbiguousRouting);
        state.warn(NodeId(2), DiagnosticKind::CycleTruncated);
        let diagnostics = state.into_diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].node, NodeId(1));
    }
}
