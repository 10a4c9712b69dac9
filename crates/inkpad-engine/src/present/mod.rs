//! Window presentation.
//!
//! Samples the canvas's resolved image onto the window surface at a fixed
//! rate. One pre-recorded surface frame per swapchain slot, used round-robin;
//! all of them are rebuilt whenever the surface geometry or the canvas image
//! changes.

mod frame;
mod pacing;
mod phase;
mod pipeline;
mod presenter;
mod runtime;

pub use frame::{SurfaceFrame, SurfaceFrameSet, SurfaceGeometry};
pub use pacing::{FramePacer, Pace};
pub use phase::{PhaseError, PhaseEvent, PresentPhase};
pub use pipeline::{DisplayPipeline, ViewUniform};
pub use presenter::{FrameOutcome, PresentConfig, Presenter};
pub use runtime::{PresentRuntime, Throughput};
