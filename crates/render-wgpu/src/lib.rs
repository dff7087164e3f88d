//! wgpu render backend for the city.
//!
//! Draws ground, streets and buildings as instanced boxes with the
//! static-surface shader, and light actors as textured discs with the
//! light shader. Shader sources come from the loaded resource bundle.
//!
//! # Invariants
//! - Renderer never mutates world state.
//! - Camera motion is not part of the world; it lives entirely here.
//! - Static instances are uploaded once per scene; only sprites and uniforms change per frame.

mod camera;
mod gpu;
mod texture;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;
pub use texture::glow_texture;
