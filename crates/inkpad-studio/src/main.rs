use std::path::PathBuf;

use anyhow::Result;
use inkpad_engine::logging::{init_logging, LoggingConfig};
use inkpad_engine::session::{PaintSession, SessionConfig, ENV_ASSETS};
use inkpad_engine::window::Runtime;

/// Assets shipped next to this crate, used unless `INKPAD_ASSETS` is set.
fn bundled_assets() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut config = SessionConfig::from_env();
    if std::env::var_os(ENV_ASSETS).is_none() {
        config.assets.root = bundled_assets();
    }
    config.validate()?;

    log::info!(
        "canvas {}x{} ({}x MSAA), pool {}, assets {}",
        config.canvas.width,
        config.canvas.height,
        config.canvas.sample_count,
        config.compositor.pool_size,
        config.assets.root.display()
    );

    let runtime = config.runtime.clone();
    let mut session = PaintSession::new(config);
    Runtime::run(runtime, &mut session)
}
