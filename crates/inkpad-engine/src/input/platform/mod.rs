mod winit;

pub use self::winit::WinitInput;
