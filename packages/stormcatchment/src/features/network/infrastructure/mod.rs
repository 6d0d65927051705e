//! Network graph, construction, routing and GeoJSON ingestion

mod builder;
mod direction;
pub mod geojson;
pub mod network;
pub mod routing;
pub mod spatial_index;

pub use network::{BuildReport, Network};
pub use routing::DownstreamWalk;
pub use spatial_index::SpatialIndex;
