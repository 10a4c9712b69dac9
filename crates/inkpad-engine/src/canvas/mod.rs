//! The off-screen ink canvas.
//!
//! Owns the color image (optionally multisampled), its resolved single-sample
//! copy, the dab pipeline, and the explicit layout/access state machine.

mod canvas;
mod display;
mod export;
mod pipeline;
mod resolve;
mod state;

pub use canvas::{Canvas, CanvasConfig};
pub use display::{CanvasDisplay, DisplaySlot};
pub use export::{
    decode_texels, f16_to_f32, padded_bytes_per_row, strip_row_padding, to_srgb8, write_image,
    ExportError, ExportKind,
};
pub use pipeline::BrushPipeline;
pub(crate) use pipeline::premul_alpha_blend;
pub use resolve::ResolveBatch;
pub use state::{
    CanvasAccess, CanvasLayout, CanvasState, CanvasStateError, PipelineStage, Transition,
};
