use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

use crate::rng::DEFAULT_SEED;

/// Largest accepted grid side. Keeps the cell count and every derived index within `u32`.
pub const MAX_REPEAT_COUNT: u32 = 4096;

/// Errors from loading or validating a [`CityConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Every tunable of the city: layout, animation, colours and camera.
///
/// Missing fields in a config file fall back to [`CityConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Cells per side of the square grid.
    pub repeat_count: u32,
    pub cell_size: f32,
    /// Upper bound on building height; actual heights are 20%..100% of this.
    pub max_height: f32,
    pub street_width: f32,
    pub light_count: u32,
    /// Distance a light actor travels per tick.
    pub car_speed: f32,
    pub car_radius: f32,
    /// Radians added to the light direction per tick.
    pub light_step: f32,
    pub initial_light_direction: f32,
    pub ground_color: Vec3,
    pub street_color: Vec3,
    pub light_color: Vec3,
    pub car_color: Vec3,
    pub camera_distance: f32,
    pub camera_height: f32,
    pub near: f32,
    pub far: f32,
    pub fov_degrees: f32,
    pub seed: u64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            repeat_count: 20,
            cell_size: 200.0,
            max_height: 1000.0,
            street_width: 20.0,
            light_count: 500,
            car_speed: 3.0,
            car_radius: 8.0,
            light_step: 0.05,
            initial_light_direction: PI,
            ground_color: Vec3::new(0.0, 0.5, 0.0),
            street_color: Vec3::ZERO,
            light_color: Vec3::new(0.5, 0.2, 1.0),
            car_color: Vec3::new(1.0, 0.3, 0.0),
            camera_distance: 2200.0,
            camera_height: 1800.0,
            near: 0.1,
            far: 10_000.0,
            fov_degrees: 90.0,
            seed: DEFAULT_SEED,
        }
    }
}

impl CityConfig {
    /// Side length of the whole city, which is also the length of every lane.
    pub fn total_size(&self) -> f32 {
        let n = self.repeat_count as f32;
        n * self.cell_size + (n - 1.0).max(0.0) * self.street_width
    }

    /// Load a config from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "loaded city config");
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Reject configs the generators cannot lay out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repeat_count == 0 {
            return Err(ConfigError::Invalid("repeat_count must be at least 1".into()));
        }
        if self.repeat_count > MAX_REPEAT_COUNT {
            return Err(ConfigError::Invalid(format!(
                "repeat_count must be at most {MAX_REPEAT_COUNT}, got {}",
                self.repeat_count
            )));
        }
        let positive = [
            ("cell_size", self.cell_size),
            ("street_width", self.street_width),
            ("max_height", self.max_height),
            ("car_radius", self.car_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.car_speed >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "car_speed must not be negative, got {}",
                self.car_speed
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near, self.far
            )));
        }
        Ok(())
    }
}
