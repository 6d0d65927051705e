/*
 * Stormcatchment - Network-Corrected Catchment Delineation
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Planar geometry (Point, BBox, Polyline, Region)
 * - features/    : Vertical slices (terrain → network → delineation)
 * - config/      : YAML-backed configuration with validation
 * - errors.rs    : Crate-level error type
 *
 * Performance:
 * - Memoised terrain catchments (DashMap)
 * - Rayon work-stealing for batch requests
 */

#![allow(clippy::new_without_default)] // Builders take explicit parameters
#![allow(clippy::module_inception)] // network::infrastructure::network

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Configuration (YAML v1, builder setters, validation)
pub mod config;

/// Crate-level errors
pub mod errors;

/// Vertical slices
pub mod features;

/// Shared geometry primitives
pub mod shared;

// Re-exports: primary interface
pub use config::StormConfig;
pub use errors::{Result, StormError};
pub use features::delineation::{
    Delineate, DelineationResult, DelineationSummary, Diagnostic, DiagnosticKind,
    RoutingDecision,
};
pub use features::network::{Network, NodeId, NodeKind};
pub use features::terrain::{preprocess_dem, FlowGrid, TerrainCatchment, TerrainService};
pub use shared::{BBox, Point, Polyline, Region};
