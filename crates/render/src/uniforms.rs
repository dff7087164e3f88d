//! Values the shaders consume, independent of any GPU API.

use cityscape_common::Rgb;
use glam::Vec3;

/// Per-frame uniforms of the static-surface shader.
///
/// `baseColor`, the remaining input of that shader, is per surface and
/// travels with [`SurfaceInstance`](crate::SurfaceInstance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceUniforms {
    pub light_direction: f32,
    pub light_color: Rgb,
    pub camera_position: Vec3,
}

/// Per-actor inputs of the light shader. The sprite texture is bound alongside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpriteUniforms {
    pub center_position: Vec3,
    pub radius: f32,
    pub tint: Rgb,
}

/// Unit vector toward the sun for a light direction angle.
///
/// Mirrors the static-surface fragment shader: the sun circles the city at a
/// fixed elevation.
pub fn light_vector(light_direction: f32) -> Vec3 {
    Vec3::new(light_direction.cos(), 0.8, light_direction.sin()).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn light_vector_is_unit_and_above_horizon() {
        for i in 0..64 {
            let v = light_vector(i as f32 * 0.3);
            assert!((v.length() - 1.0).abs() < 1e-5);
            assert!(v.y > 0.0);
        }
    }

    #[test]
    fn light_vector_is_periodic() {
        let a = light_vector(PI);
        let b = light_vector(PI + 3.0 * TAU);
        assert!((a - b).length() < 1e-4);
    }
}
