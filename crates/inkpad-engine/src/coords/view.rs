use super::Vec2;

/// Pan/zoom mapping from canvas space to screen space.
///
/// With the identity view the canvas is centered in the window at 1:1.
/// `pan` is a screen-space offset applied after zoom:
///
/// `screen = (canvas - canvas_size / 2) * zoom + window_size / 2 + pan`
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewTransform {
    pub zoom: f32,
    pub pan: Vec2,
}

impl ViewTransform {
    pub const MIN_ZOOM: f32 = 0.05;
    pub const MAX_ZOOM: f32 = 32.0;

    pub const fn identity() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::zero(),
        }
    }

    pub fn canvas_to_screen(&self, p: Vec2, canvas_size: Vec2, window_size: Vec2) -> Vec2 {
        (p - canvas_size * 0.5) * self.zoom + window_size * 0.5 + self.pan
    }

    pub fn screen_to_canvas(&self, p: Vec2, canvas_size: Vec2, window_size: Vec2) -> Vec2 {
        (p - window_size * 0.5 - self.pan) / self.zoom + canvas_size * 0.5
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Multiplies zoom by `factor`, keeping the canvas point under `anchor`
    /// (screen space) fixed. Zoom is clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn zoom_about(&mut self, anchor: Vec2, factor: f32, canvas_size: Vec2, window_size: Vec2) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let fixed = self.screen_to_canvas(anchor, canvas_size, window_size);
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.pan = anchor - window_size * 0.5 - (fixed - canvas_size * 0.5) * self.zoom;
    }

    /// Packs the mapping of canvas UV `[0, 1]²` to NDC as `[sx, sy, ox, oy]`:
    /// `ndc = uv * (sx, sy) + (ox, oy)`. NDC has +Y up, hence the sign flip.
    pub fn uv_to_ndc(&self, canvas_size: Vec2, window_size: Vec2) -> [f32; 4] {
        let w = window_size.x.max(1.0);
        let h = window_size.y.max(1.0);
        let origin = self.canvas_to_screen(Vec2::zero(), canvas_size, window_size);
        [
            2.0 * canvas_size.x * self.zoom / w,
            -2.0 * canvas_size.y * self.zoom / h,
            2.0 * origin.x / w - 1.0,
            1.0 - 2.0 * origin.y / h,
        ]
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Vec2 = Vec2::new(1024.0, 1024.0);
    const WINDOW: Vec2 = Vec2::new(800.0, 600.0);

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    // ── mapping ───────────────────────────────────────────────────────────

    #[test]
    fn identity_centers_canvas() {
        let v = ViewTransform::identity();
        let center = v.canvas_to_screen(CANVAS * 0.5, CANVAS, WINDOW);
        assert_eq!(center, WINDOW * 0.5);
    }

    #[test]
    fn screen_canvas_inverse() {
        let v = ViewTransform {
            zoom: 2.5,
            pan: Vec2::new(-31.0, 12.0),
        };
        let p = Vec2::new(123.0, 456.0);
        let back = v.canvas_to_screen(v.screen_to_canvas(p, CANVAS, WINDOW), CANVAS, WINDOW);
        assert!(approx(back, p));
    }

    // ── navigation ────────────────────────────────────────────────────────

    #[test]
    fn zoom_about_keeps_anchor_fixed() {
        let mut v = ViewTransform::identity();
        let anchor = Vec2::new(100.0, 50.0);
        let before = v.screen_to_canvas(anchor, CANVAS, WINDOW);
        v.zoom_about(anchor, 1.7, CANVAS, WINDOW);
        let after = v.screen_to_canvas(anchor, CANVAS, WINDOW);
        assert!(approx(before, after));
        assert!((v.zoom - 1.7).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut v = ViewTransform::identity();
        v.zoom_about(Vec2::zero(), 1000.0, CANVAS, WINDOW);
        assert_eq!(v.zoom, ViewTransform::MAX_ZOOM);
        v.zoom_about(Vec2::zero(), 1e-9, CANVAS, WINDOW);
        assert_eq!(v.zoom, ViewTransform::MIN_ZOOM);
    }

    #[test]
    fn zoom_ignores_bad_factor() {
        let mut v = ViewTransform::identity();
        v.zoom_about(Vec2::zero(), f32::NAN, CANVAS, WINDOW);
        v.zoom_about(Vec2::zero(), -2.0, CANVAS, WINDOW);
        assert_eq!(v, ViewTransform::identity());
    }

    // ── ndc ───────────────────────────────────────────────────────────────

    #[test]
    fn uv_to_ndc_full_window_canvas() {
        // Canvas the same size as the window fills NDC exactly.
        let v = ViewTransform::identity();
        let [sx, sy, ox, oy] = v.uv_to_ndc(WINDOW, WINDOW);
        assert!((ox - -1.0).abs() < 1e-6 && (oy - 1.0).abs() < 1e-6);
        assert!((ox + sx - 1.0).abs() < 1e-6);
        assert!((oy + sy - -1.0).abs() < 1e-6);
    }
}
