//! Feature modules

pub mod delineation;
pub mod network;
pub mod terrain;
