//! Shared types for the cityscape workspace: configuration, colours and the
//! seeded random source every generator draws from.

mod config;
mod rng;

pub use config::{CityConfig, ConfigError, MAX_REPEAT_COUNT};
pub use rng::{CityRng, DEFAULT_SEED};

/// Linear RGB colour, each channel in `[0, 1]`.
pub type Rgb = glam::Vec3;
