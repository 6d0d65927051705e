//! Network Module
//!
//! Stormwater infrastructure as a directed graph:
//! - `domain/`: structures, conduits, ingestion features, build policies
//! - `infrastructure/`: petgraph-backed [`Network`], builder, routing queries,
//!   spatial index, GeoJSON readers

pub mod domain;
pub mod infrastructure;

pub use domain::{
    DirectionPolicy, Edge, EdgeId, FeatureSet, ImplicitNodePolicy, LineFeature, Node, NodeId,
    NodeKind, PointFeature,
};
pub use infrastructure::{BuildReport, DownstreamWalk, Network};
