use crate::canvas::ExportKind;
use crate::coords::{Vec2, ViewTransform};
use crate::input::{InputEvent, Key, MouseButton};
use crate::stroke::{StrokeInterpolator, StrokeSample};

/// Zoom multiplier per scrolled line is `exp(ZOOM_PER_LINE)`.
const ZOOM_PER_LINE: f32 = 0.1;

/// What a single input event asks the session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Canvas-space dabs for the compositor.
    Paint(Vec<StrokeSample>),
    ViewChanged(ViewTransform),
    Clear,
    /// Replace the canvas with a blank one of this size. The view is back at
    /// identity.
    ResizeCanvas { width: u32, height: u32 },
    Export(ExportKind),
    Quit,
}

/// Turns pointer, wheel and key input into session actions.
///
/// Strokes are interpolated in canvas space so dab density does not depend
/// on the current zoom.
#[derive(Debug)]
pub struct Controls {
    stroke: StrokeInterpolator,
    view: ViewTransform,
    canvas_size: Vec2,
    window_size: Vec2,
    pan_from: Option<Vec2>,
}

impl Controls {
    pub fn new(samples_per_pixel: f32, canvas_size: Vec2, window_size: Vec2) -> Self {
        Self {
            stroke: StrokeInterpolator::new(samples_per_pixel),
            view: ViewTransform::identity(),
            canvas_size,
            window_size,
            pan_from: None,
        }
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn set_window_size(&mut self, size: Vec2) {
        self.window_size = size;
    }

    pub fn set_canvas_size(&mut self, size: Vec2) {
        self.canvas_size = size;
    }

    fn to_canvas(&self, screen: Vec2, pressure: f32) -> StrokeSample {
        let p = self
            .view
            .screen_to_canvas(screen, self.canvas_size, self.window_size);
        StrokeSample::new(p, pressure)
    }

    pub fn handle(&mut self, event: InputEvent) -> Option<Action> {
        match event {
            InputEvent::PointerDown {
                button: MouseButton::Left,
                position,
                pressure,
            } => {
                let sample = self.to_canvas(position, pressure);
                Some(Action::Paint(self.stroke.begin(sample)))
            }

            InputEvent::PointerDown {
                button: MouseButton::Middle,
                position,
                ..
            } => {
                self.pan_from = Some(position);
                None
            }

            InputEvent::PointerMove { position, pressure } => {
                if let Some(from) = self.pan_from {
                    self.pan_from = Some(position);
                    self.view.pan_by(position - from);
                    return Some(Action::ViewChanged(self.view));
                }
                if !self.stroke.is_active() {
                    return None;
                }
                let sample = self.to_canvas(position, pressure);
                let dabs = self.stroke.feed(sample);
                (!dabs.is_empty()).then_some(Action::Paint(dabs))
            }

            InputEvent::PointerUp {
                button: MouseButton::Left,
                ..
            } => {
                self.stroke.end();
                None
            }

            InputEvent::PointerUp {
                button: MouseButton::Middle,
                ..
            } => {
                self.pan_from = None;
                None
            }

            InputEvent::PointerLeft => {
                self.stroke.end();
                self.pan_from = None;
                None
            }

            InputEvent::Wheel { lines, position } => {
                if lines == 0.0 {
                    return None;
                }
                self.view.zoom_about(
                    position,
                    zoom_factor(lines),
                    self.canvas_size,
                    self.window_size,
                );
                Some(Action::ViewChanged(self.view))
            }

            InputEvent::Key {
                key,
                pressed: true,
                repeat: false,
            } => self.command(key),

            _ => None,
        }
    }

    fn command(&mut self, key: Key) -> Option<Action> {
        match key {
            Key::Escape => Some(Action::Quit),
            Key::Space => Some(Action::Export(ExportKind::Hdr)),
            Key::Letter('p') => Some(Action::Export(ExportKind::Ldr)),
            Key::Letter('c') => Some(Action::Clear),
            Key::Letter('r') => {
                self.view = ViewTransform::identity();
                Some(Action::ViewChanged(self.view))
            }
            // New canvas matching the window.
            Key::Letter('n') => {
                let (width, height) = (self.window_size.x as u32, self.window_size.y as u32);
                if width == 0 || height == 0 {
                    return None;
                }
                self.stroke.end();
                self.view = ViewTransform::identity();
                Some(Action::ResizeCanvas { width, height })
            }
            _ => None,
        }
    }
}

pub fn zoom_factor(lines: f32) -> f32 {
    (lines * ZOOM_PER_LINE).exp()
}
