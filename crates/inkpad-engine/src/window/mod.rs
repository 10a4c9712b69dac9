//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single window, and forwards its events
//! to a [`Session`](crate::core::Session). Worker threads reach the window
//! only through a [`RuntimeHandle`].

mod handle;
mod runtime;

pub use handle::{RuntimeEvent, RuntimeHandle};
pub use runtime::{Runtime, RuntimeConfig};
