use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::coords::Vec2;
use crate::sync::lock;

/// Read-only view of the image the presenter samples.
#[derive(Debug, Clone)]
pub struct CanvasDisplay {
    pub view: wgpu::TextureView,
    pub size: Vec2,
    pub generation: u64,
}

/// Where the canvas publishes its current display image.
///
/// The generation is bumped every time the image is recreated, so holders of
/// an older [`CanvasDisplay`] can detect staleness with one atomic load.
#[derive(Debug)]
pub struct DisplaySlot {
    current: Mutex<CanvasDisplay>,
    generation: AtomicU64,
}

impl DisplaySlot {
    pub(crate) fn new(view: wgpu::TextureView, size: Vec2) -> Self {
        Self {
            current: Mutex::new(CanvasDisplay {
                view,
                size,
                generation: 0,
            }),
            generation: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn current(&self) -> CanvasDisplay {
        lock(&self.current).clone()
    }

    /// Replaces the image and returns the new generation.
    pub(crate) fn publish(&self, view: wgpu::TextureView, size: Vec2) -> u64 {
        let mut current = lock(&self.current);
        let generation = current.generation + 1;
        *current = CanvasDisplay {
            view,
            size,
            generation,
        };
        self.generation.store(generation, Ordering::Release);
        generation
    }
}
