use std::path::PathBuf;

use anyhow::{ensure, Result};

use crate::assets::AssetPaths;
use crate::canvas::CanvasConfig;
use crate::device::GpuInit;
use crate::present::PresentConfig;
use crate::stroke::CompositorConfig;
use crate::window::RuntimeConfig;

pub const ENV_ASSETS: &str = "INKPAD_ASSETS";
pub const ENV_CANVAS_SIZE: &str = "INKPAD_CANVAS_SIZE";
pub const ENV_SAMPLES: &str = "INKPAD_SAMPLES";
pub const ENV_POOL: &str = "INKPAD_POOL";
pub const ENV_EXPORT_DIR: &str = "INKPAD_EXPORT_DIR";

/// Upper bound on the dab pool. Every slot owns a uniform buffer pair, a bind
/// group and a render bundle, all allocated up front.
pub const MAX_POOL_SIZE: usize = 65_536;

/// Everything a [`PaintSession`](super::PaintSession) needs to start.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub canvas: CanvasConfig,
    pub compositor: CompositorConfig,
    pub present: PresentConfig,
    pub assets: AssetPaths,
    /// Where `canvas.exr` / `canvas.png` are written.
    pub export_dir: PathBuf,
}

impl SessionConfig {
    /// Defaults with `INKPAD_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Applies overrides from `lookup`. Values that do not parse are logged
    /// and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup(ENV_ASSETS) {
            self.assets.root = PathBuf::from(root);
        }
        if let Some(dir) = lookup(ENV_EXPORT_DIR) {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_CANVAS_SIZE) {
            match parse_size(&raw) {
                Some((width, height)) => {
                    self.canvas.width = width;
                    self.canvas.height = height;
                }
                None => log::warn!("ignoring {ENV_CANVAS_SIZE}={raw:?}: expected WIDTHxHEIGHT"),
            }
        }
        if let Some(raw) = lookup(ENV_SAMPLES) {
            match raw.trim().parse::<u32>() {
                Ok(n) => self.canvas.sample_count = n,
                Err(e) => log::warn!("ignoring {ENV_SAMPLES}={raw:?}: {e}"),
            }
        }
        if let Some(raw) = lookup(ENV_POOL) {
            match raw.trim().parse::<usize>() {
                Ok(n) => self.compositor.pool_size = n,
                Err(e) => log::warn!("ignoring {ENV_POOL}={raw:?}: {e}"),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.canvas.width > 0 && self.canvas.height > 0,
            "canvas size must be non-zero, got {}x{}",
            self.canvas.width,
            self.canvas.height
        );
        ensure!(
            matches!(self.canvas.sample_count, 1 | 4),
            "canvas sample count must be 1 or 4, got {}",
            self.canvas.sample_count
        );
        ensure!(
            (2..=MAX_POOL_SIZE).contains(&self.compositor.pool_size),
            "pool capacity must be in 2..={MAX_POOL_SIZE}, got {}",
            self.compositor.pool_size
        );
        ensure!(
            !self.present.frame_period.is_zero(),
            "frame period must be positive"
        );
        ensure!(
            self.compositor.brush_radius > 0.0 && self.compositor.samples_per_pixel > 0.0,
            "brush radius and interpolation density must be positive"
        );
        Ok(())
    }
}

/// Parses `"1024x768"` (also `X` or `×` as separator).
pub fn parse_size(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.trim().split_once(['x', 'X', '×'])?;
    let w = w.trim().parse().ok()?;
    let h = h.trim().parse().ok()?;
    Some((w, h))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;

    fn with_env(pairs: &[(&str, &str)]) -> SessionConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = SessionConfig::default();
        config.apply_overrides(|name| env.get(name).cloned());
        config
    }

    // ── parse_size ──

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("1024x768"), Some((1024, 768)));
        assert_eq!(parse_size(" 512 X 256 "), Some((512, 256)));
        assert_eq!(parse_size("640×480"), Some((640, 480)));
    }

    #[test]
    fn rejects_malformed_sizes() {
        assert_eq!(parse_size("1024"), None);
        assert_eq!(parse_size("axb"), None);
        assert_eq!(parse_size("-1x5"), None);
    }

    // ── overrides ──

    #[test]
    fn defaults_validate() {
        let config = SessionConfig::default();
        config.validate().unwrap();
        assert_eq!((config.canvas.width, config.canvas.height), (1024, 1024));
        assert_eq!(config.compositor.pool_size, 1000);
    }

    #[test]
    fn applies_overrides() {
        let config = with_env(&[
            (ENV_ASSETS, "/opt/inkpad"),
            (ENV_CANVAS_SIZE, "2048x1024"),
            (ENV_SAMPLES, "4"),
            (ENV_POOL, "250"),
            (ENV_EXPORT_DIR, "/tmp/out"),
        ]);
        assert_eq!(config.assets.root, PathBuf::from("/opt/inkpad"));
        assert_eq!((config.canvas.width, config.canvas.height), (2048, 1024));
        assert_eq!(config.canvas.sample_count, 4);
        assert_eq!(config.compositor.pool_size, 250);
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let config = with_env(&[(ENV_CANVAS_SIZE, "huge"), (ENV_POOL, "lots")]);
        assert_eq!((config.canvas.width, config.canvas.height), (1024, 1024));
        assert_eq!(config.compositor.pool_size, 1000);
    }

    // ── validate ──

    #[test]
    fn rejects_zero_canvas() {
        let config = with_env(&[(ENV_CANVAS_SIZE, "0x100")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_tiny_pool() {
        let config = with_env(&[(ENV_POOL, "1")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_huge_pool() {
        let config = with_env(&[(ENV_POOL, "10000000")]);
        assert_eq!(config.compositor.pool_size, 10_000_000);
        assert!(config.validate().is_err());

        let config = with_env(&[(ENV_POOL, "65536")]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unsupported_sample_count() {
        let config = with_env(&[(ENV_SAMPLES, "8")]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_frame_period() {
        let mut config = SessionConfig::default();
        config.present.frame_period = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
