//! City layout: grid partition, streets and building blocks.
//!
//! # Invariants
//! - The grid is fully determined by repeat count, cell size and street width.
//! - Every cell's four blocks tile its interior exactly, with no overlap.
//! - All randomness comes from the generator passed in by the caller.

mod blocks;
mod grid;

pub use blocks::{fill_cell, fill_city, rand_with_limits, Block, CellBlocks};
pub use grid::{generate_map, Axis, Cell, CityMap, Street, STREET_ELEVATION};

pub fn crate_info() -> &'static str {
    concat!("cityscape-layout v", env!("CARGO_PKG_VERSION"))
}
