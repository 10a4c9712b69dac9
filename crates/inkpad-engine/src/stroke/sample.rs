use crate::coords::Vec2;

/// One ink dab request: canvas-space position and pen pressure.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StrokeSample {
    pub position: Vec2,
    /// Normalized to `[0, 1]`.
    pub pressure: f32,
}

impl StrokeSample {
    /// Non-finite pressure is treated as no pressure.
    pub fn new(position: Vec2, pressure: f32) -> Self {
        let pressure = if pressure.is_finite() {
            pressure.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { position, pressure }
    }
}

/// Turns pointer motion into evenly spaced dabs.
///
/// Moves of at most one canvas pixel pass through as a single sample. Longer
/// moves are resampled along the segment with `ceil(distance * density)`
/// samples, ending exactly at the new position. Pressure is held from the
/// newest event.
#[derive(Debug, Clone)]
pub struct StrokeInterpolator {
    samples_per_pixel: f32,
    last: Option<Vec2>,
}

impl StrokeInterpolator {
    pub fn new(samples_per_pixel: f32) -> Self {
        Self {
            samples_per_pixel: samples_per_pixel.max(f32::MIN_POSITIVE),
            last: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }

    /// Starts a stroke; the first contact leaves one dab.
    pub fn begin(&mut self, sample: StrokeSample) -> Vec<StrokeSample> {
        self.last = Some(sample.position);
        vec![sample]
    }

    /// Continues the stroke to `sample`. Without an active stroke this
    /// behaves like [`begin`](Self::begin).
    pub fn feed(&mut self, sample: StrokeSample) -> Vec<StrokeSample> {
        let Some(from) = self.last else {
            return self.begin(sample);
        };
        if !sample.position.is_finite() {
            return Vec::new();
        }

        let to = sample.position;
        let distance = from.distance(to);
        self.last = Some(to);

        if distance == 0.0 {
            return Vec::new();
        }
        if distance <= 1.0 {
            return vec![sample];
        }

        let n = (distance * self.samples_per_pixel).ceil() as usize;
        (1..=n)
            .map(|i| {
                let t = i as f32 / n as f32;
                StrokeSample::new(from.lerp(to, t), sample.pressure)
            })
            .collect()
    }

    pub fn end(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32, p: f32) -> StrokeSample {
        StrokeSample::new(Vec2::new(x, y), p)
    }

    // ── sample ────────────────────────────────────────────────────────────

    #[test]
    fn pressure_is_clamped() {
        assert_eq!(at(0.0, 0.0, 3.0).pressure, 1.0);
        assert_eq!(at(0.0, 0.0, -1.0).pressure, 0.0);
        assert_eq!(at(0.0, 0.0, f32::NAN).pressure, 0.0);
    }

    // ── interpolation ─────────────────────────────────────────────────────

    #[test]
    fn begin_emits_single_dab() {
        let mut it = StrokeInterpolator::new(10.0);
        assert_eq!(it.begin(at(5.0, 5.0, 0.5)), vec![at(5.0, 5.0, 0.5)]);
        assert!(it.is_active());
    }

    #[test]
    fn sub_pixel_move_passes_through() {
        let mut it = StrokeInterpolator::new(10.0);
        it.begin(at(0.0, 0.0, 1.0));
        assert_eq!(it.feed(at(0.5, 0.5, 0.2)), vec![at(0.5, 0.5, 0.2)]);
    }

    #[test]
    fn zero_move_emits_nothing() {
        let mut it = StrokeInterpolator::new(10.0);
        it.begin(at(3.0, 3.0, 1.0));
        assert!(it.feed(at(3.0, 3.0, 0.7)).is_empty());
    }

    #[test]
    fn long_move_is_resampled_proportionally() {
        let mut it = StrokeInterpolator::new(10.0);
        it.begin(at(0.0, 0.0, 1.0));
        let out = it.feed(at(4.0, 0.0, 0.25));

        assert_eq!(out.len(), 40);
        assert!(out.iter().all(|s| s.pressure == 0.25));
        assert_eq!(out.last().map(|s| s.position), Some(Vec2::new(4.0, 0.0)));
        assert!((out[0].position.x - 0.1).abs() < 1e-5);

        // Monotonic along the segment.
        assert!(out.windows(2).all(|w| w[0].position.x < w[1].position.x));
    }

    #[test]
    fn feed_without_begin_starts_stroke() {
        let mut it = StrokeInterpolator::new(10.0);
        assert_eq!(it.feed(at(9.0, 9.0, 1.0)).len(), 1);
        it.end();
        assert!(!it.is_active());
    }
}
