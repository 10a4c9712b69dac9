//! Cross-thread coordination shared by the compositor and presenter.
//!
//! - `SharedQueue`: the single exclusive lock every GPU submission goes through
//! - `RunFlag`: cooperative shutdown with an interruptible sleep
//! - `SampleQueue`: blocking producer/consumer hand-off of stroke samples
//!
//! All waits are OS-level blocking waits; nothing here is async.

mod queue;
mod run;
mod samples;

pub use queue::{wait_for, SharedQueue};
pub use run::RunFlag;
pub use samples::SampleQueue;

use std::sync::{Mutex, MutexGuard};

/// Locks `m`, recovering the guard if a previous holder panicked.
///
/// Everything guarded in this crate is plain data that stays consistent
/// across a panic, so poisoning carries no information worth propagating.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
