//! Developer tooling: city inspector and frame timing.
//!
//! # Invariants
//! - Tools only read generation and world state, never mutate it.

mod inspector;
mod timer;

pub use inspector::{CityInspector, CitySummary, LaneCount};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    concat!("cityscape-tools v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
        assert!(crate_info().ends_with(env!("CARGO_PKG_VERSION")));
    }
}
