use std::path::Path;

use super::{ensure_exists, AssetError};

/// Decoded 8-bit RGBA pixels, rows tightly packed.
#[derive(Debug, Clone)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Loads and decodes an image file to RGBA8.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, AssetError> {
    ensure_exists(path)?;

    let decoded = ::image::open(path).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.into_rgba8();
    let (width, height) = rgba.dimensions();

    if width == 0 || height == 0 {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
            width,
            height,
        });
    }

    log::debug!("loaded {} ({width}x{height})", path.display());

    Ok(RgbaImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_png_as_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dab.png");
        let img = ::image::RgbaImage::from_pixel(3, 2, ::image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let loaded = load_rgba(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(loaded.pixels.len(), 3 * 2 * 4);
        assert_eq!(&loaded.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_rgba(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, AssetError::Missing(_)));
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(load_rgba(&path).unwrap_err(), AssetError::Decode { .. }));
    }
}
