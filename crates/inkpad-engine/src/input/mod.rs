//! Input subsystem.
//!
//! `InputEvent` is platform-agnostic and does not expose winit types; the
//! `WinitInput` translator turns window events into it.

mod platform;
mod types;

pub use platform::WinitInput;
pub use types::{InputEvent, Key, MouseButton};
