use std::sync::{Arc, Condvar, Mutex};

use crate::stroke::StrokeSample;

use super::{lock, RunFlag};

/// FIFO of pending stroke samples between the event thread and the compositor.
///
/// Producers append and notify; the single consumer blocks until samples are
/// pending or the run flag is cleared, then takes the whole queue at once.
#[derive(Debug)]
pub struct SampleQueue {
    pending: Mutex<Vec<StrokeSample>>,
    ready: Condvar,
    run: Arc<RunFlag>,
}

impl SampleQueue {
    pub fn new(run: Arc<RunFlag>) -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            ready: Condvar::new(),
            run,
        }
    }

    pub fn push(&self, sample: StrokeSample) {
        self.push_many(std::iter::once(sample));
    }

    /// Appends samples in order. Notifies only if anything was added.
    pub fn push_many<I>(&self, samples: I)
    where
        I: IntoIterator<Item = StrokeSample>,
    {
        let mut pending = lock(&self.pending);
        let before = pending.len();
        pending.extend(samples);
        if pending.len() > before {
            self.ready.notify_one();
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blocks until samples are pending, then takes all of them.
    ///
    /// Returns `None` once the run flag is cleared; samples still pending at
    /// that point are dropped.
    pub fn wait_drain(&self) -> Option<Vec<StrokeSample>> {
        let mut pending = lock(&self.pending);
        loop {
            if !self.run.is_running() {
                return None;
            }
            if !pending.is_empty() {
                return Some(std::mem::take(&mut *pending));
            }
            pending = self
                .ready
                .wait(pending)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    /// Wakes the consumer so it can observe a cleared run flag.
    pub fn wake_all(&self) {
        let _pending = lock(&self.pending);
        self.ready.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use std::thread;
    use std::time::Duration;

    fn sample(x: f32) -> StrokeSample {
        StrokeSample::new(Vec2::new(x, 0.0), 1.0)
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn wait_drain_preserves_enqueue_order() {
        let q = SampleQueue::new(Arc::new(RunFlag::new()));
        q.push(sample(1.0));
        q.push_many([sample(2.0), sample(3.0)]);
        q.push(sample(4.0));

        let xs: Vec<f32> = q.wait_drain().unwrap().iter().map(|s| s.position.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(q.is_empty());
    }

    #[test]
    fn push_many_empty_is_noop() {
        let q = SampleQueue::new(Arc::new(RunFlag::new()));
        q.push_many(std::iter::empty());
        assert_eq!(q.len(), 0);
    }

    // ── blocking ──────────────────────────────────────────────────────────

    #[test]
    fn wait_drain_returns_pending_without_blocking() {
        let q = SampleQueue::new(Arc::new(RunFlag::new()));
        q.push_many([sample(1.0), sample(2.0)]);
        assert_eq!(q.wait_drain().map(|v| v.len()), Some(2));
    }

    #[test]
    fn wait_drain_wakes_on_push() {
        let q = Arc::new(SampleQueue::new(Arc::new(RunFlag::new())));
        let consumer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.wait_drain())
        };

        thread::sleep(Duration::from_millis(20));
        q.push(sample(7.0));

        let got = consumer.join().unwrap().unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].position.x, 7.0);
    }

    #[test]
    fn stop_and_wake_unblocks_consumer() {
        let run = Arc::new(RunFlag::new());
        let q = Arc::new(SampleQueue::new(Arc::clone(&run)));
        let consumer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.wait_drain())
        };

        thread::sleep(Duration::from_millis(20));
        run.stop();
        q.wake_all();

        assert!(consumer.join().unwrap().is_none());
    }
}
