use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Sun placement expressed as elevation above the horizon and azimuth, both
/// in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    pub elevation: f32,
    pub azimuth: f32,
}

impl Default for SunPosition {
    fn default() -> Self {
        Self {
            elevation: 3.0,
            azimuth: 115.0,
        }
    }
}

impl SunPosition {
    pub const fn new(elevation: f32, azimuth: f32) -> Self {
        Self { elevation, azimuth }
    }

    /// Converts the pair into a unit direction vector.
    ///
    /// Uses the spherical convention shared by the dome shader and the water
    /// uniforms: the polar angle is measured from the zenith
    /// (`90° − elevation`), the azimuthal angle from +Z toward +X. Elevation
    /// is clamped to [−90°, 90°] and azimuth wrapped modulo 360° before the
    /// conversion.
    pub fn direction(&self) -> Vec3 {
        let elevation = self.elevation.clamp(-90.0, 90.0);
        let azimuth = self.azimuth.rem_euclid(360.0);
        let phi = (90.0 - elevation).to_radians();
        let theta = azimuth.to_radians();
        Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_sun_matches_closed_form() {
        let sun = SunPosition::default();
        let direction = sun.direction();
        let phi = 87.0_f32.to_radians();
        let theta = 115.0_f32.to_radians();
        assert!((direction.x - phi.sin() * theta.sin()).abs() < 1e-6);
        assert!((direction.y - phi.cos()).abs() < 1e-6);
        assert!((direction.z - phi.sin() * theta.cos()).abs() < 1e-6);
    }

    #[test]
    fn direction_is_unit_length_across_domain() {
        for elevation in (-90..=90).step_by(5) {
            for azimuth in (0..360).step_by(15) {
                let sun = SunPosition::new(elevation as f32, azimuth as f32);
                let length = sun.direction().length();
                assert!(
                    (length - 1.0).abs() < 1e-5,
                    "|direction| = {length} at elevation {elevation}, azimuth {azimuth}"
                );
            }
        }
    }

    #[test]
    fn direction_is_deterministic() {
        let sun = SunPosition::new(3.0, 115.0);
        assert_eq!(sun.direction(), sun.direction());
    }

    #[test]
    fn elevation_is_clamped() {
        let over = SunPosition::new(120.0, 40.0);
        let zenith = SunPosition::new(90.0, 40.0);
        assert_eq!(over.direction(), zenith.direction());
        assert!((zenith.direction().y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn azimuth_wraps_modulo_full_turn() {
        let wrapped = SunPosition::new(3.0, 475.0);
        let base = SunPosition::new(3.0, 115.0);
        assert!((wrapped.direction() - base.direction()).length() < 1e-5);

        let negative = SunPosition::new(3.0, -245.0);
        assert!((negative.direction() - base.direction()).length() < 1e-4);
    }

    #[test]
    fn nadir_points_straight_down() {
        let sun = SunPosition::new(-90.0, 0.0);
        assert!((sun.direction().y + 1.0).abs() < 1e-6);
    }
}
