use cityscape_common::CityConfig;
use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Orbit camera circling a target point.
///
/// The polar angle is measured from straight up and never passes the
/// horizon, so the camera cannot look at the city from below.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,
    pub polar: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar: f32,
    pub sensitivity: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CityConfig::default())
    }
}

impl OrbitCamera {
    /// Start above one corner of the city, looking at its centre.
    pub fn from_config(config: &CityConfig) -> Self {
        let eye = Vec3::new(
            config.camera_distance,
            config.camera_height,
            config.camera_distance,
        );
        let distance = eye.length();
        Self {
            target: Vec3::ZERO,
            distance,
            yaw: eye.z.atan2(eye.x),
            polar: (eye.y / distance).acos(),
            fov: config.fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: config.near,
            far: config.far,
            min_distance: config.near,
            max_distance: config.far,
            max_polar: FRAC_PI_2,
            sensitivity: 0.005,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_y, cos_y) = self.yaw.sin_cos();
        self.target + self.distance * Vec3::new(sin_p * cos_y, cos_p, sin_p * sin_y)
    }

    /// Orbit by a mouse delta in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.polar = (self.polar - dy * self.sensitivity).clamp(0.01, self.max_polar);
    }

    /// Move toward (positive) or away from (negative) the target, in wheel steps.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * (1.0 - 0.1 * steps)).clamp(self.min_distance, self.max_distance);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_matches_config_eye() {
        let cam = OrbitCamera::default();
        let eye = cam.position();
        assert!((eye - Vec3::new(2200.0, 1800.0, 2200.0)).length() < 0.5);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn rotate_never_goes_below_horizon() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, -100_000.0);
        assert!(cam.position().y >= -1e-3);
        cam.rotate(0.0, 100_000.0);
        assert!(cam.polar > 0.0);
    }

    #[test]
    fn zoom_respects_limits() {
        let mut cam = OrbitCamera::default();
        for _ in 0..200 {
            cam.zoom(5.0);
        }
        assert!(cam.distance >= cam.min_distance);
        for _ in 0..200 {
            cam.zoom(-5.0);
        }
        assert!(cam.distance <= cam.max_distance);
    }
}
