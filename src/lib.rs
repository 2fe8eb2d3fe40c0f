//! Tunnel map generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod container;
pub mod direction;
pub mod error;
pub mod generator;
pub mod images;
pub mod mapfile;
pub mod random_blocks;
pub mod tilemap;
