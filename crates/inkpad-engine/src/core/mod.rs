//! Core engine-facing contracts.
//!
//! The interface between the window runtime and whatever it drives. Input is
//! delivered as platform-agnostic events and nothing of the runtime's
//! internals leaks into the session.

mod app;

pub use app::{AppControl, Session};
