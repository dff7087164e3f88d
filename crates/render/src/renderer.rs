use cityscape_common::CityConfig;
use cityscape_kernel::{CityWorld, LaneDirection};
use glam::Vec3;

use crate::scene::{SceneDescription, SurfaceKind};
use crate::uniforms::light_vector;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from_config(&CityConfig::default())
    }
}

impl RenderView {
    /// Start view: above one corner of the city, looking at its centre.
    pub fn from_config(config: &CityConfig) -> Self {
        Self {
            eye: Vec3::new(
                config.camera_distance,
                config.camera_height,
                config.camera_distance,
            ),
            target: Vec3::ZERO,
            fov_degrees: config.fov_degrees,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the static scene, the current world and a view, then
/// produces output. It never mutates the world.
pub trait SceneRenderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, scene: &SceneDescription, world: &CityWorld, view: &RenderView) -> Self::Output;
}

/// Text renderer for CLI output, logging and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Print every light actor, not just the per-lane counts.
    pub list_lights: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lights(mut self) -> Self {
        self.list_lights = true;
        self
    }
}

impl SceneRenderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneDescription, world: &CityWorld, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== City (tick={}, light_dir={:.3}) ===\n",
            world.tick(),
            world.light_direction()
        ));
        let sun = light_vector(world.light_direction());
        out.push_str(&format!("Sun: ({:.3}, {:.3}, {:.3})\n", sun.x, sun.y, sun.z));
        out.push_str(&format!(
            "Surfaces: ground={} streets={} buildings={}\n",
            scene.count(SurfaceKind::Ground),
            scene.count(SurfaceKind::Street),
            scene.count(SurfaceKind::Building)
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        let lights = world.lights();
        out.push_str(&format!("Lights: {}", lights.len()));
        for direction in LaneDirection::ALL {
            out.push_str(&format!(" {:?}={}", direction, lights.lane(direction).len()));
        }
        out.push('\n');

        if self.list_lights {
            for sprite in scene.light_sprites(world) {
                let p = sprite.center;
                out.push_str(&format!("  light pos=({:.2}, {:.2}, {:.2})\n", p.x, p.y, p.z));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityscape_layout::{fill_city, generate_map};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup(repeat_count: u32, light_count: u32) -> (SceneDescription, CityWorld) {
        let config = CityConfig {
            repeat_count,
            light_count,
            ..CityConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let map = generate_map(repeat_count, config.cell_size, config.street_width);
        let blocks = fill_city(&map, config.max_height, &mut rng);
        (
            SceneDescription::build(&config, &map, &blocks),
            CityWorld::from_config(&config, &mut rng),
        )
    }

    #[test]
    fn debug_renderer_single_cell() {
        let (scene, world) = setup(1, 10);
        let output = DebugTextRenderer::new().render(&scene, &world, &RenderView::default());

        assert!(output.contains("tick=0"));
        // Initial light direction is pi: the sun sits on -X.
        assert!(output.contains("Sun: (-0.781, 0.625, -0.000)") || output.contains("Sun: (-0.781, 0.625, 0.000)"));
        assert!(output.contains("streets=0"));
        assert!(output.contains("Lights: 0"));
    }

    #[test]
    fn debug_renderer_lists_lights() {
        let (scene, mut world) = setup(3, 4);
        world.step();
        let output = DebugTextRenderer::new()
            .with_lights()
            .render(&scene, &world, &RenderView::default());

        assert!(output.contains("tick=1"));
        assert!(output.contains("buildings=36"));
        assert_eq!(output.matches("light pos=").count(), 4);
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 90.0);
        assert_eq!(view.target, Vec3::ZERO);
        assert_eq!(view.eye, Vec3::new(2200.0, 1800.0, 2200.0));
    }
}
