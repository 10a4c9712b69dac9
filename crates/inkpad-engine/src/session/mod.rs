//! The interactive paint session: wires GPU, canvas, compositor and
//! presenter together behind the [`Session`](crate::core::Session) contract.

mod config;
mod controls;
mod paint;

pub use config::{
    parse_size, SessionConfig, ENV_ASSETS, ENV_CANVAS_SIZE, ENV_EXPORT_DIR, ENV_POOL, ENV_SAMPLES,
    MAX_POOL_SIZE,
};
pub use controls::{zoom_factor, Action, Controls};
pub use paint::PaintSession;
