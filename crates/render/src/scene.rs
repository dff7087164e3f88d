use cityscape_common::{CityConfig, Rgb};
use cityscape_kernel::CityWorld;
use cityscape_layout::{CellBlocks, CityMap, STREET_ELEVATION};
use glam::{Mat4, Quat, Vec3};

use crate::uniforms::{LightSpriteUniforms, SurfaceUniforms};

/// Thickness of the ground and street slabs. Their top faces sit at y = 0 and
/// y = `STREET_ELEVATION` respectively.
pub const GROUND_THICKNESS: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Ground,
    Street,
    Building,
}

/// One box drawn with the static-surface shader, in centred world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInstance {
    pub kind: SurfaceKind,
    pub center: Vec3,
    /// Full extent along X, Y and Z.
    pub size: Vec3,
    pub base_color: Rgb,
}

impl SurfaceInstance {
    /// Transform of a unit cube centred on the origin onto this box.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.size, Quat::IDENTITY, self.center)
    }
}

/// A light actor as drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSprite {
    pub center: Vec3,
    pub radius: f32,
    pub tint: Rgb,
}

impl LightSprite {
    pub fn uniforms(&self) -> LightSpriteUniforms {
        LightSpriteUniforms {
            center_position: self.center,
            radius: self.radius,
            tint: self.tint,
        }
    }
}

/// Everything a renderer needs to draw the city.
///
/// Built once after generation. The whole city is shifted by
/// [`CityMap::center_offset`] so it is centred on the world origin.
#[derive(Debug, Clone)]
pub struct SceneDescription {
    pub surfaces: Vec<SurfaceInstance>,
    pub offset: Vec3,
    pub light_color: Rgb,
    pub car_color: Rgb,
    pub car_radius: f32,
}

impl SceneDescription {
    pub fn build(config: &CityConfig, map: &CityMap, blocks: &[CellBlocks]) -> Self {
        let _span = tracing::info_span!("build_scene").entered();
        let offset = map.center_offset();
        let mut surfaces = Vec::with_capacity(map.cells.len() * 5 + map.street_count());

        for cell in &map.cells {
            let c = map.cell_size;
            surfaces.push(SurfaceInstance {
                kind: SurfaceKind::Ground,
                center: offset + cell.origin + Vec3::new(c / 2.0, -GROUND_THICKNESS / 2.0, -c / 2.0),
                size: Vec3::new(c, GROUND_THICKNESS, c),
                base_color: config.ground_color,
            });
        }

        for street in map.streets() {
            surfaces.push(SurfaceInstance {
                kind: SurfaceKind::Street,
                center: offset
                    + Vec3::new(
                        street.origin.x + street.width / 2.0,
                        STREET_ELEVATION - GROUND_THICKNESS / 2.0,
                        street.origin.z - street.depth / 2.0,
                    ),
                size: Vec3::new(street.width, GROUND_THICKNESS, street.depth),
                base_color: config.street_color,
            });
        }

        for filled in blocks {
            for block in &filled.blocks {
                surfaces.push(SurfaceInstance {
                    kind: SurfaceKind::Building,
                    center: offset + filled.cell.origin + block.center,
                    size: Vec3::new(block.width, block.height, block.depth),
                    base_color: Vec3::splat(block.shade),
                });
            }
        }

        tracing::debug!(surfaces = surfaces.len(), "scene built");

        Self {
            surfaces,
            offset,
            light_color: config.light_color,
            car_color: config.car_color,
            car_radius: config.car_radius,
        }
    }

    pub fn count(&self, kind: SurfaceKind) -> usize {
        self.surfaces.iter().filter(|s| s.kind == kind).count()
    }

    /// Light sprites for the world's current actor positions.
    pub fn light_sprites(&self, world: &CityWorld) -> Vec<LightSprite> {
        world
            .lights()
            .iter()
            .map(|actor| LightSprite {
                center: self.offset + actor.world_position(self.car_radius),
                radius: self.car_radius,
                tint: self.car_color,
            })
            .collect()
    }

    /// Static-surface uniforms for this frame.
    pub fn surface_uniforms(&self, world: &CityWorld, camera_position: Vec3) -> SurfaceUniforms {
        SurfaceUniforms {
            light_direction: world.light_direction(),
            light_color: self.light_color,
            camera_position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityscape_layout::{fill_city, generate_map};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn build(repeat_count: u32) -> (CityConfig, SceneDescription, CityWorld) {
        let config = CityConfig {
            repeat_count,
            light_count: 25,
            ..CityConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let map = generate_map(config.repeat_count, config.cell_size, config.street_width);
        let blocks = fill_city(&map, config.max_height, &mut rng);
        let scene = SceneDescription::build(&config, &map, &blocks);
        let world = CityWorld::from_config(&config, &mut rng);
        (config, scene, world)
    }

    #[test]
    fn surface_counts() {
        let (_, scene, _) = build(3);
        assert_eq!(scene.count(SurfaceKind::Ground), 9);
        assert_eq!(scene.count(SurfaceKind::Street), 4);
        assert_eq!(scene.count(SurfaceKind::Building), 36);
    }

    #[test]
    fn single_cell_has_no_streets_or_lights() {
        let (_, scene, world) = build(1);
        assert_eq!(scene.count(SurfaceKind::Ground), 1);
        assert_eq!(scene.count(SurfaceKind::Street), 0);
        assert!(scene.light_sprites(&world).is_empty());
    }

    #[test]
    fn city_is_centred() {
        let (config, scene, _) = build(3);
        let half = config.total_size() / 2.0;
        for s in scene.surfaces.iter().filter(|s| s.kind != SurfaceKind::Building) {
            assert!(s.center.x - s.size.x / 2.0 >= -half - 1e-3);
            assert!(s.center.x + s.size.x / 2.0 <= half + 1e-3);
            assert!(s.center.z - s.size.z / 2.0 >= -half - 1e-3);
            assert!(s.center.z + s.size.z / 2.0 <= half + 1e-3);
        }
    }

    #[test]
    fn buildings_stand_on_ground() {
        let (_, scene, _) = build(2);
        for s in scene.surfaces.iter().filter(|s| s.kind == SurfaceKind::Building) {
            assert!((s.center.y - s.size.y / 2.0).abs() < 1e-3);
            assert_eq!(s.base_color.x, s.base_color.y);
        }
    }

    #[test]
    fn streets_draw_above_ground() {
        let (_, scene, _) = build(3);
        for s in scene.surfaces.iter().filter(|s| s.kind == SurfaceKind::Street) {
            assert!((s.center.y + s.size.y / 2.0 - STREET_ELEVATION).abs() < 1e-6);
        }
    }

    #[test]
    fn sprites_follow_world() {
        let (config, scene, mut world) = build(3);
        let before = scene.light_sprites(&world);
        assert_eq!(before.len(), 25);
        assert!(before.iter().all(|s| s.center.y == config.car_radius));
        world.step();
        let after = scene.light_sprites(&world);
        assert_ne!(before, after);
        let u = after[0].uniforms();
        assert_eq!(u.center_position, after[0].center);
        assert_eq!(u.radius, config.car_radius);
        assert_eq!(u.tint, config.car_color);
    }

    #[test]
    fn surface_uniforms_carry_light_direction() {
        let (config, scene, mut world) = build(2);
        world.step();
        let u = scene.surface_uniforms(&world, Vec3::ONE);
        assert_eq!(u.light_direction, world.light_direction());
        assert_eq!(u.light_color, config.light_color);
        assert_eq!(u.camera_position, Vec3::ONE);
        assert_eq!(scene.surfaces[0].base_color, config.ground_color);
    }

    #[test]
    fn model_matrix_scales_unit_cube() {
        let s = SurfaceInstance {
            kind: SurfaceKind::Building,
            center: Vec3::new(1.0, 2.0, 3.0),
            size: Vec3::new(4.0, 6.0, 8.0),
            base_color: Vec3::ONE,
        };
        let corner = s.model_matrix().transform_point3(Vec3::splat(0.5));
        assert_eq!(corner, Vec3::new(3.0, 5.0, 7.0));
    }
}
