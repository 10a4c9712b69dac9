use crate::coords::Vec2;

/// Keys the paint session reacts to. Letters and digits are carried by
/// value; everything else the platform reports ends up in `Other`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,
    Backspace,
    /// Lowercase ASCII letter.
    Letter(char),
    Digit(u8),
    /// Stable platform code for a key not represented above.
    Other(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

/// Platform-agnostic input, positions in physical window pixels.
///
/// Pressure is in `[0, 1]`; devices without pressure report `1.0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        button: MouseButton,
        position: Vec2,
        pressure: f32,
    },
    PointerMove {
        position: Vec2,
        pressure: f32,
    },
    PointerUp {
        button: MouseButton,
        position: Vec2,
    },
    /// Vertical scroll in lines; positive scrolls up / away from the user.
    Wheel {
        lines: f32,
        position: Vec2,
    },
    Key {
        key: Key,
        pressed: bool,
        repeat: bool,
    },
    PointerLeft,
}

impl InputEvent {
    pub fn position(&self) -> Option<Vec2> {
        match *self {
            InputEvent::PointerDown { position, .. }
            | InputEvent::PointerMove { position, .. }
            | InputEvent::PointerUp { position, .. }
            | InputEvent::Wheel { position, .. } => Some(position),
            InputEvent::Key { .. } | InputEvent::PointerLeft => None,
        }
    }

    /// True for a fresh key press (not a release or auto-repeat).
    pub fn is_key_press(&self, wanted: Key) -> bool {
        matches!(*self, InputEvent::Key { key, pressed: true, repeat: false } if key == wanted)
    }
}
