//! Shared primitives used by every feature slice

pub mod geometry;

pub use geometry::{BBox, Point, Polyline, Region};
