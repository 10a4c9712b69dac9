//! inkpad engine crate.
//!
//! GPU ink painting: stroke samples from the window thread are composited
//! onto an off-screen canvas by a worker thread in pool-sized blocks, and a
//! second worker samples the canvas onto the window surface at a fixed rate.
//! Every GPU submission goes through one shared queue lock.

pub mod assets;
pub mod canvas;
pub mod coords;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod paint;
pub mod present;
pub mod session;
pub mod stroke;
pub mod sync;
pub mod time;
pub mod window;
