//! Rendering adapter: renderer-agnostic scene description.
//!
//! # Invariants
//! - Renderers never mutate the world; they read the scene and the current `CityWorld`.
//! - Static geometry is built once; only light sprites and uniforms change per frame.

mod renderer;
mod scene;
mod uniforms;

pub use renderer::{DebugTextRenderer, RenderView, SceneRenderer};
pub use scene::{LightSprite, SceneDescription, SurfaceInstance, SurfaceKind, GROUND_THICKNESS};
pub use uniforms::{light_vector, LightSpriteUniforms, SurfaceUniforms};

pub fn crate_info() -> &'static str {
    concat!("cityscape-render v", env!("CARGO_PKG_VERSION"))
}
