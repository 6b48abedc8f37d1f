use glam::{Mat4, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::scene::SceneConfig;
use crate::sky::SkyDome;
use crate::sun::SunPosition;
use crate::water::WaterSurface;

/// Perspective projection parameters for the scene camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32, position: Vec3) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
            position,
        }
    }

    /// Recomputed whenever the viewport resizes.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect.max(0.01);
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.position, self.position + Vec3::NEG_Z, Vec3::Y);
        let projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect.max(0.01), self.near, self.far);
        projection * view
    }
}

/// Ambient two-tone light attached alongside the water.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HemisphereLight {
    pub sky_color: Vec3,
    pub ground_color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for HemisphereLight {
    fn default() -> Self {
        Self {
            sky_color: Vec3::ONE,                // 0xffffff
            ground_color: Vec3::splat(68.0 / 255.0), // 0x444444
            intensity: 1.0,
            position: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Prefiltered ambient lighting derived from the sky dome, stored as a small
/// equirectangular image.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    width: usize,
    height: usize,
    texels: Vec<Vec3>,
}

impl EnvironmentMap {
    const WIDTH: usize = 64;
    const HEIGHT: usize = 32;

    /// Filters the dome's radiance into the environment slot. Must run after
    /// the sun reaches the sky, otherwise the baked lighting does not match
    /// the visible dome.
    pub fn bake(sky: &SkyDome) -> Self {
        let mut texels = Vec::with_capacity(Self::WIDTH * Self::HEIGHT);
        for y in 0..Self::HEIGHT {
            let polar = (y as f32 + 0.5) / Self::HEIGHT as f32 * std::f32::consts::PI;
            for x in 0..Self::WIDTH {
                let azimuthal = (x as f32 + 0.5) / Self::WIDTH as f32 * std::f32::consts::TAU;
                let direction = Vec3::new(
                    polar.sin() * azimuthal.sin(),
                    polar.cos(),
                    polar.sin() * azimuthal.cos(),
                );
                texels.push(sky.radiance(direction));
            }
        }
        Self {
            width: Self::WIDTH,
            height: Self::HEIGHT,
            texels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    /// Nearest-texel lookup for a world direction.
    pub fn sample(&self, direction: Vec3) -> Vec3 {
        let d = direction.normalize_or_zero();
        if d == Vec3::ZERO {
            return Vec3::ZERO;
        }
        let polar = d.y.clamp(-1.0, 1.0).acos();
        let azimuthal = f32::atan2(d.x, d.z).rem_euclid(std::f32::consts::TAU);
        let x = ((azimuthal / std::f32::consts::TAU * self.width as f32) as usize)
            .min(self.width - 1);
        let y = ((polar / std::f32::consts::PI * self.height as f32) as usize)
            .min(self.height - 1);
        self.texels[y * self.width + x]
    }

    /// Tonemapped RGBA8 rows for GPU upload.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.texels.len() * 4);
        for texel in &self.texels {
            let [r, g, b] = crate::sky::tonemap(*texel);
            pixels.extend_from_slice(&[r, g, b, 255]);
        }
        pixels
    }
}

/// Kinds of nodes attached to the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Water,
    Sky,
    Light,
}

/// Ownership root for the ocean scene: camera, water, sky, light and the
/// baked environment. One explicit context object instead of module-level
/// globals; hosts pass it to the renderer and the frame driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub camera: PerspectiveCamera,
    pub water: WaterSurface,
    pub sky: SkyDome,
    pub light: HemisphereLight,
    pub sun: SunPosition,
    environment: Option<EnvironmentMap>,
}

impl Stage {
    /// Assembles the scene. The steps run in a fixed order the visual result
    /// depends on: geometry and light, then the sky, then the sun into both
    /// parameter sets, and only then the environment bake.
    pub fn build(config: &SceneConfig, viewport: (u32, u32)) -> Self {
        let aspect = viewport.0.max(1) as f32 / viewport.1.max(1) as f32;
        let camera = PerspectiveCamera::new(
            config.camera.fov,
            aspect,
            config.camera.near,
            config.camera.far,
            config.camera.position,
        );

        let mut water = config.water.clone();
        water.rotation_x = -std::f32::consts::FRAC_PI_2;
        let light = config.light;
        debug!("stage: water plane and hemisphere light attached");

        let mut sky = config.sky.clone();
        debug!("stage: sky dome attached at scale {}", sky.scale);

        let sun = config.sun;
        let direction = sun.direction();
        sky.set_sun_position(direction);
        water.set_sun_direction(direction);
        debug!(
            "stage: sun applied at elevation {} azimuth {}",
            sun.elevation, sun.azimuth
        );

        let environment = EnvironmentMap::bake(&sky);
        debug!(
            "stage: environment baked ({}x{})",
            environment.width(),
            environment.height()
        );

        Self {
            camera,
            water,
            sky,
            light,
            sun,
            environment: Some(environment),
        }
    }

    pub fn environment(&self) -> Option<&EnvironmentMap> {
        self.environment.as_ref()
    }

    /// Nodes currently attached, in attach order.
    pub fn nodes(&self) -> Vec<NodeKind> {
        vec![NodeKind::Water, NodeKind::Light, NodeKind::Sky]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static STOCK: Lazy<Stage> = Lazy::new(|| Stage::build(&SceneConfig::default(), (1280, 720)));

    #[test]
    fn build_attaches_one_node_of_each_kind() {
        let nodes = STOCK.nodes();
        assert_eq!(nodes.len(), 3);
        for kind in [NodeKind::Water, NodeKind::Sky, NodeKind::Light] {
            assert_eq!(nodes.iter().filter(|n| **n == kind).count(), 1);
        }
        assert!(STOCK.environment().is_some_and(|env| !env.is_empty()));
    }

    #[test]
    fn water_lies_flat_after_build() {
        assert_eq!(STOCK.water.rotation_x, -std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn camera_matches_viewport_and_stock_projection() {
        assert_eq!(STOCK.camera.fov, 75.0);
        assert_eq!(STOCK.camera.near, 0.1);
        assert_eq!(STOCK.camera.far, 2000.0);
        assert!((STOCK.camera.aspect - 1280.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn water_sun_is_normalized_copy_of_sky_sun() {
        let sky_sun = STOCK.sky.sun_position;
        let water_sun = STOCK.water.sun_direction;
        assert!((water_sun - sky_sun.normalize()).length() < 1e-6);
        // Copies, not aliases: mutating one never moves the other.
        let mut stage = STOCK.clone();
        stage.sky.sun_position = Vec3::ZERO;
        assert!(stage.water.sun_direction.length() > 0.9);
    }

    #[test]
    fn sun_matches_the_stock_elevation_and_azimuth() {
        let expected = SunPosition::new(3.0, 115.0).direction();
        assert!((STOCK.sky.sun_position - expected).length() < 1e-6);
    }

    #[test]
    fn environment_is_brightest_toward_the_sun() {
        let env = STOCK.environment().unwrap();
        let sun = STOCK.sky.sun_position;
        let toward = env.sample(sun);
        let away = env.sample(Vec3::new(-sun.x, sun.y, -sun.z));
        let luminance = |c: Vec3| c.x + c.y + c.z;
        assert!(luminance(toward) > luminance(away));
    }

    #[test]
    fn bake_reflects_the_applied_sun_not_the_default() {
        let unlit = EnvironmentMap::bake(&SkyDome::default());
        let lit = STOCK.environment().unwrap();
        assert_ne!(&unlit, lit);
    }

    #[test]
    fn environment_sample_covers_the_full_sphere() {
        let env = STOCK.environment().unwrap();
        for direction in [Vec3::Y, Vec3::NEG_Y, Vec3::X, Vec3::NEG_Z] {
            assert!(env.sample(direction).is_finite());
        }
    }

    #[test]
    fn camera_view_proj_is_invertible() {
        let matrix = STOCK.camera.view_proj();
        assert!(matrix.determinant().abs() > 0.0);
    }
}
