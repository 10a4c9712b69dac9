//! Startup assets: the brush stamp image and the WGSL programs.
//!
//! Everything here runs once before the workers start; any failure is fatal
//! for the session.

mod image;
mod shader;

pub use image::{load_rgba, RgbaImage};
pub use shader::load_wgsl;

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },
    #[error("image {} has zero size ({width}x{height})", .path.display())]
    Empty {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

/// Where the session finds its assets.
#[derive(Debug, Clone)]
pub struct AssetPaths {
    pub root: PathBuf,
    pub brush: PathBuf,
    pub brush_shader: PathBuf,
    pub display_shader: PathBuf,
}

impl AssetPaths {
    /// Standard layout under `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            brush: PathBuf::from("brush.png"),
            brush_shader: PathBuf::from("shaders/brush.wgsl"),
            display_shader: PathBuf::from("shaders/display.wgsl"),
        }
    }

    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self::under("assets")
    }
}

fn ensure_exists(path: &Path) -> Result<(), AssetError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AssetError::Missing(path.to_path_buf()))
    }
}
