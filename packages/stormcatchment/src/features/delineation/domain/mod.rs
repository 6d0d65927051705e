//! Delineation domain: results, routing decisions, diagnostics

mod diagnostic;
mod result;
mod routing_decision;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use result::{DelineationResult, DelineationSummary};
pub use routing_decision::RoutingDecision;
