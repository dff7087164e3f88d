//! City kernel: the animated state of the city and its per-tick stepping.
//!
//! # Invariants
//! - All per-frame mutation happens inside [`CityWorld::step`].
//! - A light actor never leaves its lane range; wraparound is a hard reset.
//! - The light direction only ever grows; consumers wrap it if they need to.

pub mod lights;
pub mod world;

pub use lights::{advance, create_lights, LaneDirection, LightActor, LightSet};
pub use world::CityWorld;
