use std::time::{Duration, Instant};

/// Converts a monotonically increasing counter into a per-second rate,
/// reported once per window.
#[derive(Debug, Clone)]
pub struct RateCounter {
    window: Duration,
    window_start: Instant,
    count_at_start: u64,
}

impl RateCounter {
    pub fn new(window: Duration) -> Self {
        Self::starting_at(Instant::now(), window)
    }

    pub fn starting_at(start: Instant, window: Duration) -> Self {
        Self {
            window,
            window_start: start,
            count_at_start: 0,
        }
    }

    /// Returns the rate over the window that just closed, or `None` while the
    /// current window is still open.
    pub fn sample(&mut self, now: Instant, total: u64) -> Option<f64> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window || elapsed.is_zero() {
            return None;
        }

        let delta = total.saturating_sub(self.count_at_start);
        self.window_start = now;
        self.count_at_start = total;
        Some(delta as f64 / elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn nothing_until_window_closes() {
        let t0 = Instant::now();
        let mut r = RateCounter::starting_at(t0, SEC);
        assert_eq!(r.sample(t0 + Duration::from_millis(999), 50), None);
    }

    #[test]
    fn reports_rate_per_second() {
        let t0 = Instant::now();
        let mut r = RateCounter::starting_at(t0, SEC);
        let rate = r.sample(t0 + 2 * SEC, 120).unwrap();
        assert!((rate - 60.0).abs() < 1e-9);
    }

    #[test]
    fn windows_are_independent() {
        let t0 = Instant::now();
        let mut r = RateCounter::starting_at(t0, SEC);
        r.sample(t0 + SEC, 30).unwrap();
        let rate = r.sample(t0 + 2 * SEC, 40).unwrap();
        assert!((rate - 10.0).abs() < 1e-9);
    }

    #[test]
    fn counter_going_backwards_reads_as_zero() {
        let t0 = Instant::now();
        let mut r = RateCounter::starting_at(t0, SEC);
        r.sample(t0 + SEC, 30).unwrap();
        assert_eq!(r.sample(t0 + 2 * SEC, 10), Some(0.0));
    }
}
