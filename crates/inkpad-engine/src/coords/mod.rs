//! Coordinate types shared by input, the compositor and the presenter.
//!
//! Two CPU spaces, both in physical pixels with a top-left origin, +X right, +Y down:
//! - screen space: the window surface
//! - canvas space: the off-screen ink image
//!
//! `ViewTransform` maps between them; shaders receive the result as a
//! `scale_offset` uniform that lands directly in NDC.

mod vec2;
mod view;

pub use vec2::Vec2;
pub use view::ViewTransform;
