//! Time subsystem.
//!
//! Frame timing and throughput utilities, decoupled from the runtime threads:
//! - one `FrameClock` per render loop; `tick()` once per iteration
//! - `RateCounter` turns running totals (frames, strokes) into per-second rates

mod frame_clock;
mod rate;

pub use frame_clock::{FrameClock, FrameTime};
pub use rate::RateCounter;
