use winit::event::{
    ElementState, Force, MouseButton as WinitMouseButton, MouseScrollDelta, TouchPhase, WindowEvent,
};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::coords::Vec2;
use crate::input::{InputEvent, Key, MouseButton};

/// Pixel-precise scroll (trackpads) is converted to lines at this rate.
const PIXELS_PER_LINE: f32 = 40.0;

/// Translates winit window events into [`InputEvent`]s.
///
/// Button events carry no position in winit 0.30, so the last cursor
/// position is tracked here.
#[derive(Debug, Default)]
pub struct WinitInput {
    cursor: Vec2,
}

impl WinitInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Returns `None` for events the input layer does not represent.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                Some(InputEvent::PointerMove {
                    position: self.cursor,
                    pressure: 1.0,
                })
            }

            WindowEvent::CursorLeft { .. } => Some(InputEvent::PointerLeft),

            WindowEvent::MouseInput { state, button, .. } => {
                let button = map_mouse_button(*button);
                Some(match state {
                    ElementState::Pressed => InputEvent::PointerDown {
                        button,
                        position: self.cursor,
                        pressure: 1.0,
                    },
                    ElementState::Released => InputEvent::PointerUp {
                        button,
                        position: self.cursor,
                    },
                })
            }

            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel {
                lines: wheel_lines(*delta),
                position: self.cursor,
            }),

            WindowEvent::Touch(touch) => {
                self.cursor = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                let pressure = touch_pressure(touch.force);
                Some(match touch.phase {
                    TouchPhase::Started => InputEvent::PointerDown {
                        button: MouseButton::Left,
                        position: self.cursor,
                        pressure,
                    },
                    TouchPhase::Moved => InputEvent::PointerMove {
                        position: self.cursor,
                        pressure,
                    },
                    TouchPhase::Ended | TouchPhase::Cancelled => InputEvent::PointerUp {
                        button: MouseButton::Left,
                        position: self.cursor,
                    },
                })
            }

            WindowEvent::KeyboardInput { event, .. } => Some(InputEvent::Key {
                key: map_key(event.physical_key),
                pressed: event.state == ElementState::Pressed,
                repeat: event.repeat,
            }),

            _ => None,
        }
    }
}

pub(crate) fn wheel_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
    }
}

/// Devices that report no force are treated as full pressure.
pub(crate) fn touch_pressure(force: Option<Force>) -> f32 {
    force.map_or(1.0, |f| (f.normalized() as f32).clamp(0.0, 1.0))
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

pub(crate) fn map_key(pk: PhysicalKey) -> Key {
    let code = match pk {
        PhysicalKey::Code(code) => code,
        PhysicalKey::Unidentified(_) => return Key::Other(0),
    };

    let letter = match code {
        KeyCode::KeyA => 'a',
        KeyCode::KeyB => 'b',
        KeyCode::KeyC => 'c',
        KeyCode::KeyD => 'd',
        KeyCode::KeyE => 'e',
        KeyCode::KeyF => 'f',
        KeyCode::KeyG => 'g',
        KeyCode::KeyH => 'h',
        KeyCode::KeyI => 'i',
        KeyCode::KeyJ => 'j',
        KeyCode::KeyK => 'k',
        KeyCode::KeyL => 'l',
        KeyCode::KeyM => 'm',
        KeyCode::KeyN => 'n',
        KeyCode::KeyO => 'o',
        KeyCode::KeyP => 'p',
        KeyCode::KeyQ => 'q',
        KeyCode::KeyR => 'r',
        KeyCode::KeyS => 's',
        KeyCode::KeyT => 't',
        KeyCode::KeyU => 'u',
        KeyCode::KeyV => 'v',
        KeyCode::KeyW => 'w',
        KeyCode::KeyX => 'x',
        KeyCode::KeyY => 'y',
        KeyCode::KeyZ => 'z',
        KeyCode::Digit0 => return Key::Digit(0),
        KeyCode::Digit1 => return Key::Digit(1),
        KeyCode::Digit2 => return Key::Digit(2),
        KeyCode::Digit3 => return Key::Digit(3),
        KeyCode::Digit4 => return Key::Digit(4),
        KeyCode::Digit5 => return Key::Digit(5),
        KeyCode::Digit6 => return Key::Digit(6),
        KeyCode::Digit7 => return Key::Digit(7),
        KeyCode::Digit8 => return Key::Digit(8),
        KeyCode::Digit9 => return Key::Digit(9),
        KeyCode::Escape => return Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => return Key::Enter,
        KeyCode::Space => return Key::Space,
        KeyCode::Backspace => return Key::Backspace,
        other => return Key::Other(other as u32),
    };
    Key::Letter(letter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    // ── wheel ──

    #[test]
    fn line_delta_passes_through() {
        assert_eq!(wheel_lines(MouseScrollDelta::LineDelta(0.0, -2.0)), -2.0);
    }

    #[test]
    fn pixel_delta_converts_to_lines() {
        let d = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 80.0));
        assert!((wheel_lines(d) - 2.0).abs() < 1e-6);
    }

    // ── pressure ──

    #[test]
    fn missing_force_is_full_pressure() {
        assert_eq!(touch_pressure(None), 1.0);
    }

    #[test]
    fn normalized_force_is_pressure() {
        assert!((touch_pressure(Some(Force::Normalized(0.25))) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn calibrated_force_is_normalized_and_clamped() {
        let half = Force::Calibrated {
            force: 2.0,
            max_possible_force: 4.0,
            altitude_angle: None,
        };
        assert!((touch_pressure(Some(half)) - 0.5).abs() < 1e-6);

        let over = Force::Calibrated {
            force: 9.0,
            max_possible_force: 4.0,
            altitude_angle: None,
        };
        assert_eq!(touch_pressure(Some(over)), 1.0);
    }

    // ── keys ──

    #[test]
    fn maps_command_keys() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyC)), Key::Letter('c'));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyP)), Key::Letter('p'));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Space)), Key::Space);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Digit7)), Key::Digit(7));
    }

    #[test]
    fn unmapped_key_is_other() {
        assert!(matches!(map_key(PhysicalKey::Code(KeyCode::F5)), Key::Other(_)));
    }
}
