use cityscape_common::CityConfig;
use rand::Rng;
use serde::Serialize;

use crate::lights::{create_lights, LightSet};

/// The animated state of the city.
///
/// Everything that changes between frames lives here: the light direction
/// and the light actors. The frame loop owns one `CityWorld` and calls
/// [`CityWorld::step`] once per frame; nothing else mutates it.
#[derive(Debug, Clone, Serialize)]
pub struct CityWorld {
    tick: u64,
    /// Angle of the simulated sun in radians. Grows without bound.
    light_direction: f32,
    light_step: f32,
    car_speed: f32,
    lights: LightSet,
}

impl CityWorld {
    pub fn new(lights: LightSet, initial_light_direction: f32, light_step: f32, car_speed: f32) -> Self {
        Self {
            tick: 0,
            light_direction: initial_light_direction,
            light_step,
            car_speed,
            lights,
        }
    }

    /// Create the light actors described by `config` and wrap them in a world at tick 0.
    pub fn from_config<R: Rng + ?Sized>(config: &CityConfig, rng: &mut R) -> Self {
        let lights = create_lights(
            config.light_count,
            config.repeat_count,
            config.cell_size,
            config.street_width,
            rng,
        );
        Self::new(
            lights,
            config.initial_light_direction,
            config.light_step,
            config.car_speed,
        )
    }

    /// Number of steps taken since creation.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn light_direction(&self) -> f32 {
        self.light_direction
    }

    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    pub fn car_speed(&self) -> f32 {
        self.car_speed
    }

    /// Advance one frame: rotate the light and move every actor along its lane.
    pub fn step(&mut self) {
        self.light_direction += self.light_step;
        self.lights.advance_all(self.car_speed);
        self.tick += 1;
        tracing::trace!(
            tick = self.tick,
            light_direction = self.light_direction,
            "world stepped"
        );
    }

    /// Deterministic FNV-1a hash over tick, light direction and every actor position.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        mix(&mut h, &self.light_direction.to_le_bytes());
        for actor in self.lights.iter() {
            mix(&mut h, &actor.street.to_le_bytes());
            mix(&mut h, &actor.lane_coord.to_le_bytes());
            mix(&mut h, &actor.position.to_le_bytes());
        }
        h
    }
}
