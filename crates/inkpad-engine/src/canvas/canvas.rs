use std::sync::Arc;

use anyhow::{Context, Result};

use crate::coords::Vec2;
use crate::device::{require_canvas_support, Gpu};
use crate::paint::Color;
use crate::sync::SharedQueue;

use super::display::DisplaySlot;
use super::pipeline::BrushPipeline;
use super::resolve::ResolveBatch;
use super::state::{CanvasAccess, CanvasLayout, CanvasState, CanvasStateError, PipelineStage};

/// Canvas creation parameters.
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// 1 (no multisampling) or 4.
    pub sample_count: u32,
    pub format: wgpu::TextureFormat,
    pub clear_color: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            sample_count: 1,
            format: wgpu::TextureFormat::Rgba16Float,
            clear_color: Color::WHITE,
        }
    }
}

struct CanvasImages {
    /// Draw target. Multisampled when `sample_count > 1`.
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    /// Single-sample copy, present only when multisampled.
    resolved: Option<(wgpu::Texture, wgpu::TextureView)>,
}

impl CanvasImages {
    fn create(device: &wgpu::Device, config: &CanvasConfig, width: u32, height: u32) -> Self {
        let multisampled = config.sample_count > 1;
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let readable = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC;

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("inkpad canvas color"),
            size,
            mip_level_count: 1,
            sample_count: config.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: if multisampled {
                wgpu::TextureUsages::RENDER_ATTACHMENT
            } else {
                readable
            },
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let resolved = multisampled.then(|| {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("inkpad canvas resolved"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: config.format,
                usage: readable,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            (texture, view)
        });

        Self {
            color,
            color_view,
            resolved,
        }
    }

    /// The single-sample image: sampled for display, copied for export.
    fn display(&self) -> (&wgpu::Texture, &wgpu::TextureView) {
        match &self.resolved {
            Some((texture, view)) => (texture, view),
            None => (&self.color, &self.color_view),
        }
    }
}

/// The persistent ink image.
///
/// Every state change goes through [`transition_to`](Self::transition_to) or
/// [`clear`](Self::clear); ink draws are refused unless the image is in
/// `ShaderReadOnly`.
pub struct Canvas {
    device: wgpu::Device,
    queue: Arc<SharedQueue>,
    config: CanvasConfig,
    width: u32,
    height: u32,
    images: CanvasImages,
    resolve: Option<ResolveBatch>,
    brush: BrushPipeline,
    state: CanvasState,
    display: Arc<DisplaySlot>,
}

impl Canvas {
    /// Allocates the images and builds the dab pipeline. The canvas starts
    /// `Undefined`; call [`clear`](Self::clear) before drawing.
    pub fn create(gpu: &Gpu, config: CanvasConfig, brush_wgsl: &str) -> Result<Self> {
        anyhow::ensure!(
            config.width > 0 && config.height > 0,
            "canvas has zero size ({}x{})",
            config.width,
            config.height
        );
        require_canvas_support(gpu.adapter(), config.format, config.sample_count)
            .context("canvas format unsupported by adapter")?;

        let device = gpu.device().clone();
        let images = CanvasImages::create(&device, &config, config.width, config.height);
        let resolve = resolve_batch(&images);
        let brush = BrushPipeline::new(&device, brush_wgsl, config.format, config.sample_count);

        let size = Vec2::new(config.width as f32, config.height as f32);
        let display = Arc::new(DisplaySlot::new(images.display().1.clone(), size));

        log::info!(
            "canvas {}x{} {:?} x{}",
            config.width,
            config.height,
            config.format,
            config.sample_count
        );

        Ok(Self {
            device,
            queue: Arc::clone(gpu.queue()),
            width: config.width,
            height: config.height,
            config,
            images,
            resolve,
            brush,
            state: CanvasState::new(),
            display,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn sample_count(&self) -> u32 {
        self.config.sample_count
    }

    pub fn is_multisampled(&self) -> bool {
        self.resolve.is_some()
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn brush(&self) -> &BrushPipeline {
        &self.brush
    }

    /// Handle for the presenter.
    pub fn display(&self) -> Arc<DisplaySlot> {
        Arc::clone(&self.display)
    }

    pub(crate) fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub(crate) fn queue(&self) -> &SharedQueue {
        &self.queue
    }

    /// View the ink pass renders into.
    pub(crate) fn target_view(&self) -> &wgpu::TextureView {
        &self.images.color_view
    }

    pub(crate) fn display_texture(&self) -> &wgpu::Texture {
        self.images.display().0
    }

    pub(crate) fn resolve_batch(&self) -> Option<&ResolveBatch> {
        self.resolve.as_ref()
    }

    /// Records `count` ink draws against the state machine.
    pub(crate) fn record_draws(&mut self, count: usize) -> Result<(), CanvasStateError> {
        self.state.record_draws(count as u64)
    }

    /// Submits a one-shot ordering point for the new state, waits for it,
    /// then updates the tracked layout/access.
    pub fn transition_to(
        &mut self,
        access: CanvasAccess,
        layout: CanvasLayout,
        src_stage: PipelineStage,
        dst_stage: PipelineStage,
    ) -> Result<()> {
        let transition = self.state.plan(access, layout, src_stage, dst_stage)?;

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("inkpad canvas transition"),
            });
        self.queue
            .submit_and_wait(&self.device, std::iter::once(encoder.finish()))
            .context("canvas transition")?;

        self.state.commit(transition);
        Ok(())
    }

    /// Submits the ordering point that ends an export copy and returns the
    /// image to `ShaderReadOnly` without counting a new ready transition.
    pub(crate) fn end_export(&mut self) -> Result<()> {
        self.state.require("finish export", CanvasLayout::TransferSrc)?;

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("inkpad canvas export done"),
            });
        self.queue
            .submit_and_wait(&self.device, std::iter::once(encoder.finish()))
            .context("canvas export transition")?;

        self.state.end_export()?;
        Ok(())
    }

    /// Fills the canvas (and its resolved copy) with the clear color, then
    /// makes it shader-readable.
    pub fn clear(&mut self) -> Result<()> {
        self.state.begin_clear();

        let resolve_target = self.images.resolved.as_ref().map(|(_, view)| view);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("inkpad canvas clear encoder"),
            });
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("inkpad canvas clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.images.color_view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }
        self.queue
            .submit_and_wait(&self.device, std::iter::once(encoder.finish()))
            .context("canvas clear")?;

        self.transition_to(
            CanvasAccess::SHADER_READ,
            CanvasLayout::ShaderReadOnly,
            PipelineStage::ColorAttachmentOutput,
            PipelineStage::FragmentShader,
        )
    }

    /// Recreates the images at a new size and clears them. Publishes a new
    /// display generation so the presenter rebuilds its frames.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        anyhow::ensure!(width > 0 && height > 0, "canvas has zero size ({width}x{height})");
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }

        self.images = CanvasImages::create(&self.device, &self.config, width, height);
        self.resolve = resolve_batch(&self.images);
        self.width = width;
        self.height = height;
        self.state.reset();

        self.clear()?;

        let generation = self
            .display
            .publish(self.images.display().1.clone(), self.size());
        log::info!("canvas resized to {width}x{height} (generation {generation})");
        Ok(())
    }
}

fn resolve_batch(images: &CanvasImages) -> Option<ResolveBatch> {
    images
        .resolved
        .as_ref()
        .map(|(_, view)| ResolveBatch::new(images.color_view.clone(), view.clone()))
}
