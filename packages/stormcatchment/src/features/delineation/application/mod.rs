//! Delineation application layer (entry point)

mod engine;
mod request;

pub use engine::Delineate;
