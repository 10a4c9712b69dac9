//! Color model shared by the canvas clear, the ink parameters and the
//! presenter background.

pub mod color;

pub use color::Color;
