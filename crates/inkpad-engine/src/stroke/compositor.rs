use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::{Context, Result};

use crate::assets::RgbaImage;
use crate::canvas::{Canvas, CanvasLayout};
use crate::coords::Vec2;
use crate::device::Gpu;
use crate::paint::Color;
use crate::sync::{lock, wait_for, RunFlag, SampleQueue, SharedQueue};

use super::batching::{drain_samples, usable_capacity, BlockSink, DrainStats};
use super::params::{dab_transform, ink_params, DabTransform, InkParams};
use super::pool::ResourceBatchPool;
use super::StrokeSample;

/// Stroke compositor parameters.
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Pre-recorded dab draws in the pool.
    pub pool_size: usize,
    /// Dab radius in canvas pixels at full pressure.
    pub brush_radius: f32,
    pub ink: Color,
    /// Opacity multiplier per dab.
    pub flow: f32,
    /// Interpolated dabs per pixel of pointer travel.
    pub samples_per_pixel: f32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            pool_size: 1000,
            brush_radius: 6.0,
            ink: Color::BLACK,
            flow: 1.0,
            samples_per_pixel: 10.0,
        }
    }
}

/// Applies stroke samples to the canvas in pool-sized blocks.
pub struct StrokeCompositor {
    device: wgpu::Device,
    queue: Arc<SharedQueue>,
    pool: ResourceBatchPool,
    staged: Vec<(DabTransform, InkParams)>,
    config: CompositorConfig,
    /// Sampled by every pool entry.
    #[allow(dead_code)]
    brush_texture: wgpu::Texture,
}

impl StrokeCompositor {
    pub fn new(gpu: &Gpu, canvas: &Canvas, brush: &RgbaImage, config: CompositorConfig) -> Result<Self> {
        anyhow::ensure!(
            usable_capacity(config.pool_size, canvas.is_multisampled()) > 0,
            "pool of {} leaves no usable slots",
            config.pool_size
        );

        let device = gpu.device().clone();
        let brush_texture = upload_brush(&device, gpu.queue(), brush);
        let brush_view = brush_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("inkpad brush sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let pool = ResourceBatchPool::new(
            &device,
            canvas.brush(),
            &brush_view,
            &sampler,
            config.pool_size,
        );

        Ok(Self {
            device,
            queue: Arc::clone(gpu.queue()),
            staged: Vec::with_capacity(config.pool_size),
            pool,
            config,
            brush_texture,
        })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Draws `samples` onto `canvas` in order. Blocks until the last block
    /// (and the resolve, when multisampled) has completed.
    pub fn composite(&mut self, canvas: &mut Canvas, samples: &[StrokeSample]) -> Result<DrainStats> {
        let mut sink = GpuBlockSink {
            canvas_size: canvas.size(),
            resolving: canvas.is_multisampled(),
            compositor: self,
            canvas,
        };
        drain_samples(&mut sink, samples)
    }
}

struct GpuBlockSink<'a> {
    compositor: &'a mut StrokeCompositor,
    canvas: &'a mut Canvas,
    canvas_size: Vec2,
    resolving: bool,
}

impl BlockSink for GpuBlockSink<'_> {
    type Error = anyhow::Error;

    fn capacity(&self) -> usize {
        usable_capacity(self.compositor.pool.len(), self.resolving)
    }

    fn resolving(&self) -> bool {
        self.resolving
    }

    fn write_slot(&mut self, slot: usize, sample: &StrokeSample) {
        let c = &mut *self.compositor;
        let params = (
            dab_transform(sample, self.canvas_size, c.config.brush_radius),
            ink_params(sample, c.config.ink, c.config.flow),
        );
        if slot < c.staged.len() {
            c.staged[slot] = params;
        } else {
            c.staged.push(params);
        }
    }

    fn submit_block(&mut self, count: usize, with_resolve: bool) -> Result<()> {
        self.canvas.state().require("draw", CanvasLayout::ShaderReadOnly)?;

        let c = &mut *self.compositor;
        let device = &c.device;

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("inkpad stroke block encoder"),
        });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("inkpad stroke block"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.canvas.target_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            rpass.execute_bundles(c.pool.bundles(count));
        }

        let mut buffers = vec![encoder.finish()];
        if with_resolve {
            let batch = self
                .canvas
                .resolve_batch()
                .context("resolve requested on a single-sample canvas")?;
            buffers.push(batch.encode(device));
        }

        let pool = &c.pool;
        let staged = &c.staged[..count];
        c.queue.with_lock(|queue| {
            for (slot, (transform, ink)) in staged.iter().enumerate() {
                if let Some(entry) = pool.entry(slot) {
                    entry.write(queue, transform, ink);
                }
            }
            let index = queue.submit(buffers);
            wait_for(device, index)
        })?;

        // Counted only once the block has completed on the device.
        self.canvas.record_draws(count)?;
        Ok(())
    }
}

fn upload_brush(device: &wgpu::Device, queue: &SharedQueue, brush: &RgbaImage) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width: brush.width,
        height: brush.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("inkpad brush texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.with_lock(|q| {
        q.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &brush.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(brush.width * 4),
                rows_per_image: Some(brush.height),
            },
            size,
        );
    });

    texture
}

/// The compositor worker thread.
///
/// Sleeps on the sample queue, drains it completely per wake, and draws under
/// the canvas lock. Dropping the runtime stops and joins the thread.
pub struct CompositorRuntime {
    run: Arc<RunFlag>,
    samples: Arc<SampleQueue>,
    join_handle: Option<JoinHandle<()>>,
}

impl CompositorRuntime {
    pub fn spawn(
        mut compositor: StrokeCompositor,
        canvas: Arc<Mutex<Canvas>>,
        samples: Arc<SampleQueue>,
        run: Arc<RunFlag>,
        strokes_drawn: Arc<AtomicU64>,
    ) -> Result<Self> {
        let worker_samples = Arc::clone(&samples);
        let join_handle = std::thread::Builder::new()
            .name("inkpad-compositor".to_owned())
            .spawn(move || {
                log::debug!("compositor thread started");
                while let Some(batch) = worker_samples.wait_drain() {
                    let mut canvas = lock(&canvas);
                    match compositor.composite(&mut canvas, &batch) {
                        Ok(stats) => {
                            strokes_drawn.fetch_add(stats.draws as u64, Ordering::Relaxed);
                        }
                        Err(e) => log::error!("dropping {} samples: {e:#}", batch.len()),
                    }
                }
                log::debug!("compositor thread stopped");
            })
            .context("failed to spawn compositor thread")?;

        Ok(Self {
            run,
            samples,
            join_handle: Some(join_handle),
        })
    }

    /// Clears the run flag, wakes the worker and joins it.
    pub fn shutdown(&mut self) {
        let Some(join_handle) = self.join_handle.take() else {
            return;
        };
        self.run.stop();
        self.samples.wake_all();
        if join_handle.join().is_err() {
            log::error!("compositor thread panicked");
        }
    }
}

impl Drop for CompositorRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
