//! Stormcatchment Delineation
//!
//! Terrain catchments corrected for stormwater infrastructure: inlets whose
//! captured water is piped out of the catchment are subtracted, and
//! everything piped into the pour point's structure is added.
//!
//! # Hexagonal Architecture
//!
//! ```text
//! application/ (Delineate - entry point)
//!      ↓                    ↓
//! network (graph)     terrain::ports (TerrainService)
//!      ↓
//! domain/ (results, routing decisions, diagnostics)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let engine = Delineate::from_parts(&points, &lines, flow_grid, &StormConfig::default())?;
//! let result = engine.get_stormcatchment(Point::new(x, y))?;
//! println!("{} m² in {} parts", result.area, result.component_count());
//! ```

pub mod application;
pub mod domain;

pub use application::Delineate;
pub use domain::{
    DelineationResult, DelineationSummary, Diagnostic, DiagnosticKind, RoutingDecision,
};
