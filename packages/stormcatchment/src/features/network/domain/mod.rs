//! Network domain models

mod features;
mod models;
mod policy;

pub use features::{Attributes, FeatureSet, LineFeature, PointFeature};
pub use models::{Edge, EdgeId, Node, NodeId, NodeKind};
pub use policy::{DirectionPolicy, ImplicitNodePolicy};
