use std::path::Path;

use thiserror::Error;

/// Failure loading the water normal-map asset.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("unable to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to decode {path}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Decoded water normal map ready for GPU upload. Sampled with mirrored
/// repetition on both axes so the tiling never shows a seam.
#[derive(Debug, Clone)]
pub struct NormalMap {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8 rows.
    pub pixels: Vec<u8>,
}

impl NormalMap {
    /// Reads and decodes the asset up front, so the renderer never observes
    /// a half-initialized texture.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let display = path.as_ref().display().to_string();
        let bytes = std::fs::read(path.as_ref()).map_err(|source| TextureError::Io {
            path: display.clone(),
            source,
        })?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| TextureError::Decode {
            path: display,
            source,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_png_asset() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("normals.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([128, 128, 255, 255]))
            .save(&path)
            .expect("write png");

        let map = NormalMap::load(&path).expect("load normal map");
        assert_eq!((map.width, map.height), (4, 2));
        assert_eq!(map.pixels.len(), 4 * 2 * 4);
        assert_eq!(&map.pixels[..4], &[128, 128, 255, 255]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = NormalMap::load("does/not/exist.png").unwrap_err();
        assert!(matches!(err, TextureError::Io { .. }));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").expect("write file");
        let err = NormalMap::load(&path).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }
}
