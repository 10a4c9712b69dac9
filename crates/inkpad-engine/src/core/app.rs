use std::sync::Arc;

use anyhow::Result;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::input::InputEvent;
use crate::window::RuntimeHandle;

/// Control directive returned by session callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// What the window runtime drives.
///
/// All callbacks run on the event-loop thread. Frame production is not part
/// of this contract; a session that renders owns its own presentation loop.
pub trait Session {
    /// Called once, after the window exists. An error aborts the runtime.
    ///
    /// The window may only be used from this thread; `handle` is what other
    /// threads use to ask for window changes.
    fn init(&mut self, window: Arc<Window>, handle: RuntimeHandle) -> Result<()>;

    /// Physical inner size changed (including scale-factor changes).
    fn resize(&mut self, size: PhysicalSize<u32>);

    fn on_input(&mut self, event: InputEvent) -> AppControl;

    /// Called exactly once before the event loop exits, even if `init` failed.
    fn shutdown(&mut self);
}
