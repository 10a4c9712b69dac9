//! Stroke compositing: samples, dab parameters, the resource batch pool and
//! the block-batching compositor.

mod batching;
mod compositor;
mod params;
mod pool;
mod sample;

pub use batching::{block_count, drain_samples, usable_capacity, BlockSink, DrainStats};
pub use compositor::{CompositorConfig, CompositorRuntime, StrokeCompositor};
pub use params::{dab_transform, ink_params, DabTransform, InkParams};
pub(crate) use params::uniform_size;
pub use pool::{PoolEntry, ResourceBatchPool};
pub use sample::{StrokeInterpolator, StrokeSample};
