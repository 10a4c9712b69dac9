use std::time::Duration;

/// Decision for one presentation-loop iteration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Pace {
    Render,
    /// Not due yet; sleep for the remaining time.
    Sleep(Duration),
}

/// Fixed-period frame pacing.
///
/// Elapsed time accumulates across iterations (including the sleeps the
/// pacer asked for); once it reaches the period a frame is due and the
/// accumulator restarts from zero.
#[derive(Debug, Clone)]
pub struct FramePacer {
    period: Duration,
    accumulated: Duration,
}

impl FramePacer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            accumulated: Duration::ZERO,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn advance(&mut self, dt: Duration) -> Pace {
        self.accumulated += dt;
        if self.accumulated < self.period {
            Pace::Sleep(self.period - self.accumulated)
        } else {
            self.accumulated = Duration::ZERO;
            Pace::Render
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(1.0 / 60.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn sleeps_for_remaining_time() {
        let mut p = FramePacer::new(16 * MS);
        assert_eq!(p.advance(6 * MS), Pace::Sleep(10 * MS));
    }

    #[test]
    fn renders_when_period_reached_then_restarts() {
        let mut p = FramePacer::new(16 * MS);
        assert_eq!(p.advance(6 * MS), Pace::Sleep(10 * MS));
        assert_eq!(p.advance(10 * MS), Pace::Render);
        assert_eq!(p.advance(MS), Pace::Sleep(15 * MS));
    }

    #[test]
    fn long_stall_renders_once() {
        let mut p = FramePacer::new(16 * MS);
        assert_eq!(p.advance(500 * MS), Pace::Render);
        assert!(matches!(p.advance(MS), Pace::Sleep(_)));
    }

    #[test]
    fn default_is_sixty_hertz() {
        let p = FramePacer::default();
        assert!((p.period().as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }
}
