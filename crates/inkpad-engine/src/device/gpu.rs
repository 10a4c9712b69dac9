use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

use crate::sync::SharedQueue;

use super::GpuInit;

/// Owns the wgpu core objects shared by every thread of a session.
///
/// The surface is not stored here: it belongs to the presenter, behind the
/// surface lock. The queue is only reachable through [`SharedQueue`].
pub struct Gpu {
    /// Kept alive for the lifetime of the surface created from it.
    #[allow(dead_code)]
    instance: wgpu::Instance,

    adapter: wgpu::Adapter,

    /// Logical device. wgpu devices are cheap reference-counted handles.
    device: wgpu::Device,

    queue: Arc<SharedQueue>,
}

impl Gpu {
    /// Creates a GPU context able to present to `window`.
    ///
    /// Returns the context and the window's surface (unconfigured).
    pub async fn for_window(
        window: Arc<Window>,
        init: &GpuInit,
    ) -> Result<(Self, wgpu::Surface<'static>)> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = new_instance();

        // `Arc<Window>` makes the surface `'static`.
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let gpu = Self::with_instance(instance, Some(&surface), init).await?;
        Ok((gpu, surface))
    }

    /// Creates a context without a surface (export tooling, tests).
    pub async fn headless(init: &GpuInit) -> Result<Self> {
        Self::with_instance(new_instance(), None, init).await
    }

    async fn with_instance(
        instance: wgpu::Instance,
        surface: Option<&wgpu::Surface<'static>>,
        init: &GpuInit,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: surface,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("inkpad device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue: Arc::new(SharedQueue::new(queue)),
        })
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn adapter_name(&self) -> String {
        self.adapter.get_info().name
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns the queue behind the submission lock.
    pub fn queue(&self) -> &Arc<SharedQueue> {
        &self.queue
    }

    /// Blocks until all submitted work has finished.
    pub fn wait_idle(&self) {
        self.queue.with_lock(|_| {
            if let Err(e) = self.device.poll(wgpu::PollType::wait_indefinitely()) {
                log::warn!("device poll on idle failed: {e}");
            }
        });
    }
}

fn new_instance() -> wgpu::Instance {
    // Use all backends to allow wgpu to select the optimal platform backend.
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}
