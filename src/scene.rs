use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::stage::HemisphereLight;
use crate::sky::SkyDome;
use crate::sun::SunPosition;
use crate::water::WaterSurface;

/// Camera block of the scene description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 2000.0,
            position: Vec3::ZERO,
        }
    }
}

/// Scene description with every field optional; an empty document yields the
/// stock ocean scene.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub water: WaterSurface,
    pub sky: SkyDome,
    pub light: HemisphereLight,
    pub sun: SunPosition,
}

impl SceneConfig {
    /// Parses the scene XML. Missing tags keep their stock values; unknown
    /// tags are ignored.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        if !root.has_tag_name("scene") {
            return Err(anyhow!("expected <scene> root element"));
        }

        let mut config = Self::default();

        if let Some(node) = child(&root, "camera") {
            config.camera.fov = parse_f32(optional_text(&node, "fov"), config.camera.fov)?;
            config.camera.near = parse_f32(optional_text(&node, "near"), config.camera.near)?;
            config.camera.far = parse_f32(optional_text(&node, "far"), config.camera.far)?;
            config.camera.position =
                parse_vec3(optional_text(&node, "position"), config.camera.position)?;
        }

        if let Some(node) = child(&root, "sun") {
            config.sun.elevation =
                parse_f32(optional_text(&node, "elevation"), config.sun.elevation)?;
            config.sun.azimuth = parse_f32(optional_text(&node, "azimuth"), config.sun.azimuth)?;
        }

        if let Some(node) = child(&root, "water") {
            config.water.size = parse_f32(optional_text(&node, "size"), config.water.size)?;
            config.water.distortion_scale = parse_f32(
                optional_text(&node, "distortion-scale"),
                config.water.distortion_scale,
            )?;
            config.water.speed = parse_f32(optional_text(&node, "speed"), config.water.speed)?;
            config.water.water_color =
                parse_color(optional_text(&node, "color"), config.water.water_color)?;
            config.water.sun_color =
                parse_color(optional_text(&node, "sun-color"), config.water.sun_color)?;
            if let Some(path) = optional_text(&node, "normal-map") {
                config.water.normal_map = path;
            }
        }

        if let Some(node) = child(&root, "sky") {
            config.sky.turbidity =
                parse_f32(optional_text(&node, "turbidity"), config.sky.turbidity)?;
            config.sky.rayleigh = parse_f32(optional_text(&node, "rayleigh"), config.sky.rayleigh)?;
            config.sky.mie_coefficient = parse_f32(
                optional_text(&node, "mie-coefficient"),
                config.sky.mie_coefficient,
            )?;
            config.sky.mie_directional_g = parse_f32(
                optional_text(&node, "mie-directional-g"),
                config.sky.mie_directional_g,
            )?;
            config.sky.scale = parse_f32(optional_text(&node, "scale"), config.sky.scale)?;
        }

        if let Some(node) = child(&root, "light") {
            config.light.sky_color =
                parse_color(optional_text(&node, "sky-color"), config.light.sky_color)?;
            config.light.ground_color = parse_color(
                optional_text(&node, "ground-color"),
                config.light.ground_color,
            )?;
            config.light.intensity =
                parse_f32(optional_text(&node, "intensity"), config.light.intensity)?;
        }

        Ok(config)
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|candidate| candidate.has_tag_name(tag))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|candidate| candidate.has_tag_name(tag))
        .and_then(|candidate| candidate.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let mut numbers = value
        .split_whitespace()
        .filter_map(|component| component.parse::<f32>().ok());
    let x = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let y = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let z = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    Ok(Vec3::new(x, y, z))
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let mut numbers = value
        .split_whitespace()
        .filter_map(|component| component.parse::<f32>().ok());
    let r = numbers
        .next()
        .ok_or_else(|| anyhow!("color is missing components"))?;
    let g = numbers
        .next()
        .ok_or_else(|| anyhow!("color is missing components"))?;
    let b = numbers
        .next()
        .ok_or_else(|| anyhow!("color is missing components"))?;
    Ok(Vec3::new(r / 255.0, g / 255.0, b / 255.0))
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <scene>
        <camera>
            <fov>60</fov>
            <position>0 12 40</position>
        </camera>
        <sun>
            <elevation>12</elevation>
            <azimuth>200</azimuth>
        </sun>
        <water>
            <distortion-scale>2.5</distortion-scale>
            <color>0 40 20</color>
            <normal-map>textures/normals.png</normal-map>
        </water>
        <sky>
            <turbidity>4</turbidity>
        </sky>
        <light>
            <intensity>0.5</intensity>
        </light>
    </scene>
    "#;

    #[test]
    fn empty_document_yields_the_stock_scene() {
        let config = SceneConfig::from_xml("<scene/>").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!(config.camera.fov, 75.0);
        assert_eq!(config.sky.turbidity, 10.0);
        assert_eq!(config.sun.elevation, 3.0);
        assert_eq!(config.water.speed, 0.0);
    }

    #[test]
    fn overrides_apply_and_defaults_fill_the_rest() {
        let config = SceneConfig::from_xml(SAMPLE).unwrap();
        assert_eq!(config.camera.fov, 60.0);
        assert_eq!(config.camera.position, Vec3::new(0.0, 12.0, 40.0));
        assert_eq!(config.sun.elevation, 12.0);
        assert_eq!(config.sun.azimuth, 200.0);
        assert_eq!(config.water.distortion_scale, 2.5);
        assert_eq!(
            config.water.water_color,
            Vec3::new(0.0, 40.0 / 255.0, 20.0 / 255.0)
        );
        assert_eq!(config.water.normal_map, "textures/normals.png");
        assert_eq!(config.sky.turbidity, 4.0);
        assert_eq!(config.light.intensity, 0.5);
        // Untouched fields keep the stock values.
        assert_eq!(config.camera.far, 2000.0);
        assert_eq!(config.water.size, 10_000.0);
        assert_eq!(config.sky.mie_directional_g, 0.8);
    }

    #[test]
    fn wrong_root_element_is_an_error() {
        assert!(SceneConfig::from_xml("<stage/>").is_err());
    }

    #[test]
    fn malformed_number_is_an_error() {
        let bad = "<scene><sun><elevation>high</elevation></sun></scene>";
        assert!(SceneConfig::from_xml(bad).is_err());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(SceneConfig::from_xml("<scene>").is_err());
    }
}
