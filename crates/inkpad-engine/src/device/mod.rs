//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device and the shared queue
//! - choosing surface format/alpha mode and mapping surface errors
//! - checking that the adapter can render and resolve the canvas format

mod caps;
mod error;
mod gpu;
mod init;
pub(crate) mod surface;

pub use caps::{check_format_features, require_canvas_support};
pub use error::SurfaceErrorAction;
pub use gpu::Gpu;
pub use init::GpuInit;
