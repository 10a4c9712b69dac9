use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use super::lock;

/// Shared "keep running" flag for the worker loops.
///
/// `sleep` parks on a condvar instead of `thread::sleep`, so `stop` cuts a
/// pacing sleep short.
#[derive(Debug)]
pub struct RunFlag {
    running: AtomicBool,
    gate: Mutex<()>,
    wake: Condvar,
}

impl RunFlag {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            gate: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clears the flag and wakes every sleeper.
    pub fn stop(&self) {
        let _guard = lock(&self.gate);
        self.running.store(false, Ordering::Release);
        self.wake.notify_all();
    }

    /// Sleeps for up to `duration`. Returns `false` if the flag was cleared
    /// before or during the sleep.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = lock(&self.gate);
        loop {
            if !self.is_running() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            let (g, _) = self
                .wake
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            guard = g;
        }
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_running() {
        assert!(RunFlag::new().is_running());
    }

    #[test]
    fn sleep_completes_while_running() {
        let flag = RunFlag::new();
        assert!(flag.sleep(Duration::from_millis(5)));
    }

    #[test]
    fn stop_interrupts_sleep() {
        let flag = Arc::new(RunFlag::new());
        let sleeper = {
            let flag = Arc::clone(&flag);
            thread::spawn(move || {
                let start = Instant::now();
                let completed = flag.sleep(Duration::from_secs(30));
                (completed, start.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        flag.stop();

        let (completed, elapsed) = sleeper.join().unwrap();
        assert!(!completed);
        assert!(elapsed < Duration::from_secs(10));
    }

    #[test]
    fn sleep_after_stop_returns_immediately() {
        let flag = RunFlag::new();
        flag.stop();
        assert!(!flag.sleep(Duration::from_secs(30)));
    }
}
