use glam::Vec3;
use serde::{Deserialize, Serialize};

const UP: Vec3 = Vec3::Y;

// Simplified total Rayleigh scattering coefficient for air at sea level.
const TOTAL_RAYLEIGH: Vec3 = Vec3::new(5.804543e-6, 1.3562911e-5, 3.0265903e-5);

// Mie scattering constant, K coefficient for the primaries.
const MIE_CONST: Vec3 = Vec3::new(1.8399919e14, 2.7798024e14, 4.079048e14);

// Optical length at zenith for molecules and haze.
const RAYLEIGH_ZENITH_LENGTH: f32 = 8.4e3;
const MIE_ZENITH_LENGTH: f32 = 1.25e3;

// Earth shadow hack parameters for the sun intensity falloff.
const SUN_INTENSITY: f32 = 1000.0;
const SUN_CUTOFF_ANGLE: f32 = std::f32::consts::PI / 1.95;
const SUN_STEEPNESS: f32 = 1.5;

// cos of the sun's angular radius; anything closer is the visible disc.
const SUN_ANGULAR_DIAMETER_COS: f32 = 0.999956;

const THREE_OVER_SIXTEEN_PI: f32 = 0.059683103;
const ONE_OVER_FOUR_PI: f32 = 0.07957747;

/// Atmosphere parameter set consumed by the dome shader and the environment
/// baker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyDome {
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    /// Direction toward the sun; zero until the stage applies the solved sun.
    pub sun_position: Vec3,
    /// Dome radius, large enough to enclose the camera frustum.
    pub scale: f32,
}

impl Default for SkyDome {
    fn default() -> Self {
        Self {
            turbidity: 10.0,
            rayleigh: 2.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.8,
            sun_position: Vec3::ZERO,
            scale: 10_000.0,
        }
    }
}

impl SkyDome {
    /// Copies the solved sun direction into the dome's sun-position uniform.
    pub fn set_sun_position(&mut self, direction: Vec3) {
        self.sun_position = direction;
    }

    /// Evaluates the atmospheric scattering model for a view direction and
    /// returns the display-referred color the dome shader produces.
    ///
    /// Rayleigh scattering with the standard phase function, Mie scattering
    /// with a Henyey-Greenstein phase, zenith-length extinction and a sun
    /// disc term. The environment baker samples this same function, so the
    /// baked lighting matches the rendered dome by construction.
    pub fn radiance(&self, view: Vec3) -> Vec3 {
        let direction = view.normalize_or_zero();
        let sun_direction = self.sun_position.normalize_or_zero();

        let sun_e = sun_intensity(sun_direction.dot(UP));
        let sun_fade = 1.0 - (1.0 - (self.sun_position.y / 450_000.0).exp()).clamp(0.0, 1.0);

        let rayleigh_coefficient = self.rayleigh - (1.0 - sun_fade);
        let beta_r = TOTAL_RAYLEIGH * rayleigh_coefficient;
        let beta_m = total_mie(self.turbidity) * self.mie_coefficient;

        // Optical length along the view ray, flattened near the horizon.
        let zenith_angle = UP.dot(direction).max(0.0).acos();
        let denom =
            zenith_angle.cos() + 0.15 * (93.885 - zenith_angle.to_degrees()).powf(-1.253);
        let s_r = RAYLEIGH_ZENITH_LENGTH / denom;
        let s_m = MIE_ZENITH_LENGTH / denom;

        // Combined extinction factor.
        let fex = vexp(-(beta_r * s_r + beta_m * s_m));

        // In-scattering.
        let cos_theta = direction.dot(sun_direction);
        let r_phase = THREE_OVER_SIXTEEN_PI * (1.0 + cos_theta * cos_theta);
        let beta_r_theta = beta_r * r_phase;
        let g = self.mie_directional_g;
        let m_phase = ONE_OVER_FOUR_PI * (1.0 - g * g)
            / (1.0 - 2.0 * g * cos_theta + g * g).max(1e-6).powf(1.5);
        let beta_m_theta = beta_m * m_phase;

        let ratio = (beta_r_theta + beta_m_theta) / (beta_r + beta_m);
        let mut lin = vpow(sun_e * ratio * (Vec3::ONE - fex), 1.5);
        let horizon_weight = (1.0 - UP.dot(sun_direction)).powf(5.0).clamp(0.0, 1.0);
        lin *= Vec3::ONE.lerp(vpow(sun_e * ratio * fex, 0.5), horizon_weight);

        // Night-sky glow plus the sun disc.
        let mut l0 = Vec3::splat(0.1) * fex;
        let sun_disc = smoothstep(
            SUN_ANGULAR_DIAMETER_COS,
            SUN_ANGULAR_DIAMETER_COS + 0.00002,
            cos_theta,
        );
        l0 += sun_e * 19000.0 * fex * sun_disc;

        let tex_color = (lin + l0) * 0.04 + Vec3::new(0.0, 0.0003, 0.00075);
        vpow(tex_color, 1.0 / (1.2 + 1.2 * sun_fade))
    }
}

/// Clamps a radiance sample into an 8-bit display triple.
pub fn tonemap(color: Vec3) -> [u8; 3] {
    let clamped = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [clamped.x as u8, clamped.y as u8, clamped.z as u8]
}

fn sun_intensity(zenith_cos: f32) -> f32 {
    let zenith_angle = zenith_cos.clamp(-1.0, 1.0).acos();
    SUN_INTENSITY * (1.0 - (-((SUN_CUTOFF_ANGLE - zenith_angle) / SUN_STEEPNESS)).exp()).max(0.0)
}

fn total_mie(turbidity: f32) -> Vec3 {
    let c = (0.2 * turbidity) * 10e-18;
    0.434 * c * MIE_CONST
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn vexp(v: Vec3) -> Vec3 {
    Vec3::new(v.x.exp(), v.y.exp(), v.z.exp())
}

fn vpow(v: Vec3, e: f32) -> Vec3 {
    Vec3::new(v.x.max(0.0).powf(e), v.y.max(0.0).powf(e), v.z.max(0.0).powf(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sun::SunPosition;

    fn lit_sky() -> SkyDome {
        let mut sky = SkyDome::default();
        sky.set_sun_position(SunPosition::default().direction());
        sky
    }

    fn luminance(color: Vec3) -> f32 {
        color.x + color.y + color.z
    }

    #[test]
    fn stock_parameters_match_the_scene() {
        let sky = SkyDome::default();
        assert_eq!(sky.turbidity, 10.0);
        assert_eq!(sky.rayleigh, 2.0);
        assert_eq!(sky.mie_coefficient, 0.005);
        assert_eq!(sky.mie_directional_g, 0.8);
        assert_eq!(sky.scale, 10_000.0);
        assert_eq!(sky.sun_position, Vec3::ZERO);
    }

    #[test]
    fn radiance_is_finite_and_non_negative() {
        let sky = lit_sky();
        for elevation in (0..=90).step_by(10) {
            for azimuth in (0..360).step_by(30) {
                let dir = SunPosition::new(elevation as f32, azimuth as f32).direction();
                let color = sky.radiance(dir);
                assert!(color.is_finite(), "non-finite radiance toward {dir:?}");
                assert!(color.min_element() >= 0.0, "negative radiance toward {dir:?}");
            }
        }
    }

    #[test]
    fn sky_is_brighter_toward_the_sun() {
        let sky = lit_sky();
        let toward = sky.radiance(SunPosition::new(10.0, 115.0).direction());
        let away = sky.radiance(SunPosition::new(10.0, 295.0).direction());
        assert!(
            luminance(toward) > luminance(away),
            "toward {toward:?} vs away {away:?}"
        );
    }

    #[test]
    fn sun_disc_outshines_nearby_sky() {
        let sky = lit_sky();
        let disc = sky.radiance(sky.sun_position);
        let beside = sky.radiance(SunPosition::new(3.0, 125.0).direction());
        assert!(luminance(disc) > luminance(beside));
    }

    #[test]
    fn radiance_is_deterministic() {
        let sky = lit_sky();
        let dir = SunPosition::new(20.0, 40.0).direction();
        assert_eq!(sky.radiance(dir), sky.radiance(dir));
    }

    #[test]
    fn unlit_dome_does_not_produce_nan() {
        let sky = SkyDome::default();
        assert!(sky.radiance(Vec3::Y).is_finite());
    }

    #[test]
    fn tonemap_clamps_into_display_range() {
        assert_eq!(tonemap(Vec3::new(2.0, -1.0, 0.5)), [255, 0, 127]);
    }
}
