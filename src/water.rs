use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Parameter set for the reflective water plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSurface {
    /// Edge length of the square plane.
    pub size: f32,
    /// Resolution of the internal reflection targets.
    pub texture_size: u32,
    /// Relative path of the tiling normal-map asset.
    pub normal_map: String,
    /// Normalized copy of the sun direction; zero until the stage applies the
    /// solved sun.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub water_color: Vec3,
    pub distortion_scale: f32,
    /// Wave scroll speed. The stock scene ships zero, freezing the surface.
    pub speed: f32,
    pub fog: bool,
    /// Rotation about the X axis in radians; the stage lays the plane flat
    /// with −π/2.
    pub rotation_x: f32,
}

impl Default for WaterSurface {
    fn default() -> Self {
        Self {
            size: 10_000.0,
            texture_size: 512,
            normal_map: "assets/waternormals.png".to_string(),
            sun_direction: Vec3::ZERO,
            sun_color: Vec3::ONE,                              // 0xffffff
            water_color: Vec3::new(0.0, 30.0 / 255.0, 15.0 / 255.0), // 0x001e0f
            distortion_scale: 3.7,
            speed: 0.0,
            fog: false,
            rotation_x: 0.0,
        }
    }
}

impl WaterSurface {
    /// Stores a unit-normalized copy of the solved sun direction. The water
    /// never aliases the sky's vector; each parameter set keeps its own copy.
    pub fn set_sun_direction(&mut self, direction: Vec3) {
        self.sun_direction = direction.normalize_or_zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_parameters_match_the_scene() {
        let water = WaterSurface::default();
        assert_eq!(water.size, 10_000.0);
        assert_eq!(water.texture_size, 512);
        assert_eq!(water.sun_color, Vec3::ONE);
        assert!((water.water_color.y - 30.0 / 255.0).abs() < 1e-6);
        assert_eq!(water.distortion_scale, 3.7);
        assert_eq!(water.speed, 0.0);
        assert!(!water.fog);
        assert_eq!(water.rotation_x, 0.0);
    }

    #[test]
    fn applied_sun_is_normalized() {
        let mut water = WaterSurface::default();
        water.set_sun_direction(Vec3::new(0.0, 3.0, 4.0));
        assert!((water.sun_direction.length() - 1.0).abs() < 1e-6);
        assert!((water.sun_direction - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn zero_sun_stays_zero_instead_of_nan() {
        let mut water = WaterSurface::default();
        water.set_sun_direction(Vec3::ZERO);
        assert_eq!(water.sun_direction, Vec3::ZERO);
    }
}
