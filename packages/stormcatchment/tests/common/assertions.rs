//! Custom assertions for delineation results

use stormcatchment::{DelineationResult, DiagnosticKind, NodeId, TerrainService};

/// Assert that the result is exactly the terrain-only catchment
pub fn assert_terrain_only(result: &DelineationResult, terrain: &dyn TerrainService) {
    let expected = terrain
        .delineate_point(&result.pour_point)
        .expect("terrain catchment");
    assert_eq!(
        result.region.cells(),
        expected.cells(),
        "Expected terrain-only catchment, subtracted {:?}, added {:?}",
        result.subtracted,
        result.added
    );
}

/// Assert that the result is a well-formed region
pub fn assert_valid_region(result: &DelineationResult) {
    let cells = result.region.cells();
    let grid = result.region.grid();
    assert!(
        cells.windows(2).all(|w| w[0] < w[1]),
        "cells must be sorted and unique"
    );
    assert!(cells.iter().all(|&c| c < grid.len()), "cell outside grid");
    assert!(result.area >= 0.0, "negative area {}", result.area);
    assert_eq!(result.area, cells.len() as f64 * grid.cell_area());
    assert!(result.visited.windows(2).all(|w| w[0] < w[1]));
}

/// Assert that a diagnostic of `kind` was recorded for `node`
pub fn assert_has_diagnostic(result: &DelineationResult, node: u64, kind: DiagnosticKind) {
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| d.node == NodeId(node) && d.kind == kind),
        "Expected {:?} at {}, got {:?}",
        kind,
        node,
        result.diagnostics
    );
}
