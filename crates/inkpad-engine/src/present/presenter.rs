use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use winit::dpi::PhysicalSize;

use crate::canvas::DisplaySlot;
use crate::coords::{Vec2, ViewTransform};
use crate::device::{surface, Gpu, GpuInit, SurfaceErrorAction};
use crate::paint::Color;
use crate::sync::{lock, wait_for, SharedQueue};

use super::frame::{SurfaceFrameSet, SurfaceGeometry};
use super::phase::{PhaseEvent, PresentPhase};
use super::pipeline::{DisplayPipeline, ViewUniform};

/// Presentation parameters.
#[derive(Debug, Clone)]
pub struct PresentConfig {
    /// Target time between presented frames.
    pub frame_period: Duration,
    /// Fill around the canvas.
    pub background: Color,
}

impl Default for PresentConfig {
    fn default() -> Self {
        Self {
            frame_period: Duration::from_secs_f64(1.0 / 60.0),
            background: Color::from_srgb_u8(48, 48, 52, 255),
        }
    }
}

/// Result of one [`Presenter::render_frame`] call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    Presented,
    /// Nothing to present to, or a recoverable surface/device error.
    Skipped,
}

/// Everything guarded by the surface lock.
struct SurfaceState {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    pipeline: DisplayPipeline,
    frames: Option<SurfaceFrameSet>,
}

/// Samples the canvas onto the window surface.
///
/// Surface configuration and the frame set live behind `surface`, a lock
/// separate from the queue lock, so a resize never waits on ink composition
/// except to retire in-flight work.
pub struct Presenter {
    device: wgpu::Device,
    adapter: wgpu::Adapter,
    queue: Arc<SharedQueue>,
    init: GpuInit,
    config: PresentConfig,
    display: Arc<DisplaySlot>,
    display_wgsl: String,
    view: Mutex<ViewTransform>,
    phase: Mutex<PresentPhase>,
    surface: Mutex<Option<SurfaceState>>,
    frames_presented: AtomicU64,
}

impl Presenter {
    pub fn new(
        gpu: &Gpu,
        init: GpuInit,
        display: Arc<DisplaySlot>,
        display_wgsl: String,
        config: PresentConfig,
    ) -> Self {
        Self {
            device: gpu.device().clone(),
            adapter: gpu.adapter().clone(),
            queue: Arc::clone(gpu.queue()),
            init,
            config,
            display,
            display_wgsl,
            view: Mutex::new(ViewTransform::identity()),
            phase: Mutex::new(PresentPhase::Created),
            surface: Mutex::new(None),
            frames_presented: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &PresentConfig {
        &self.config
    }

    pub fn phase(&self) -> PresentPhase {
        *lock(&self.phase)
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented.load(Ordering::Relaxed)
    }

    pub fn view(&self) -> ViewTransform {
        *lock(&self.view)
    }

    /// Picked up by the next frame.
    pub fn set_view(&self, view: ViewTransform) {
        *lock(&self.view) = view;
    }

    /// Number of surface frames currently built.
    pub fn frame_count(&self) -> usize {
        lock(&self.surface)
            .as_ref()
            .and_then(|s| s.frames.as_ref())
            .map_or(0, SurfaceFrameSet::len)
    }

    fn advance_phase(&self, event: PhaseEvent) -> Result<()> {
        let mut phase = lock(&self.phase);
        *phase = phase.next(event)?;
        Ok(())
    }

    /// Configures the surface and builds the initial frame set.
    pub fn bind_surface(&self, surface: wgpu::Surface<'static>, size: PhysicalSize<u32>) -> Result<()> {
        self.advance_phase(PhaseEvent::BindSurface)?;

        let caps = surface.get_capabilities(&self.adapter);
        let config = surface::configuration(&caps, &self.init, size)?;
        if size.width > 0 && size.height > 0 {
            surface.configure(&self.device, &config);
        }
        log::info!(
            "surface bound: {}x{} {:?} {:?}",
            size.width,
            size.height,
            config.format,
            config.present_mode
        );

        let pipeline = DisplayPipeline::new(&self.device, &self.display_wgsl, config.format);
        let mut state = SurfaceState {
            surface,
            config,
            size,
            pipeline,
            frames: None,
        };
        self.sync_frames(&mut state);

        *lock(&self.surface) = Some(state);
        Ok(())
    }

    fn geometry(&self, state: &SurfaceState) -> SurfaceGeometry {
        SurfaceGeometry {
            width: state.size.width,
            height: state.size.height,
            format: state.config.format,
            frame_count: self.init.desired_maximum_frame_latency as usize + 1,
            canvas_generation: self.display.generation(),
        }
    }

    /// Rebuilds the frame set from scratch if its geometry is stale.
    fn sync_frames(&self, state: &mut SurfaceState) {
        let geometry = self.geometry(state);
        let stale = state
            .frames
            .as_ref()
            .is_none_or(|f| f.geometry().needs_rebuild(&geometry));
        if !stale {
            return;
        }

        if state.frames.take().is_some() {
            self.retire_in_flight();
        }
        if geometry.is_zero_sized() {
            return;
        }

        let canvas = self.display.current();
        let geometry = SurfaceGeometry {
            canvas_generation: canvas.generation,
            ..geometry
        };
        state.frames = Some(SurfaceFrameSet::build(
            &self.device,
            &state.pipeline,
            &canvas,
            geometry,
        ));
    }

    /// Waits until the device has finished everything already submitted.
    fn retire_in_flight(&self) {
        self.queue.with_lock(|_| {
            if let Err(e) = self.device.poll(wgpu::PollType::wait_indefinitely()) {
                log::warn!("device poll while retiring frames failed: {e}");
            }
        });
    }

    /// Presents one frame: update every frame's view mapping, acquire, submit
    /// the frame's draw, wait, present. Recoverable failures skip the frame.
    /// Only a fatal surface error is returned.
    pub fn render_frame(&self) -> Result<FrameOutcome> {
        {
            let mut phase = lock(&self.phase);
            if !phase.is_live() {
                return Ok(FrameOutcome::Skipped);
            }
            *phase = phase.next(PhaseEvent::Render)?;
        }

        let mut guard = lock(&self.surface);
        let Some(state) = guard.as_mut() else {
            return Ok(FrameOutcome::Skipped);
        };

        self.sync_frames(state);
        let Some(frames) = state.frames.as_mut() else {
            return Ok(FrameOutcome::Skipped);
        };
        let Some(index) = frames.advance() else {
            return Ok(FrameOutcome::Skipped);
        };

        let surface_texture = match state.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                let reason = err.to_string();
                let action =
                    surface::map_surface_error(&state.surface, &self.device, &state.config, err);
                if action == SurfaceErrorAction::Fatal {
                    bail!("surface error is fatal: {reason}");
                }
                log::warn!("skipping frame: {reason} ({action:?})");
                return Ok(FrameOutcome::Skipped);
            }
        };
        let target = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let canvas_size = self.display.current().size;
        let window_size = Vec2::new(state.size.width as f32, state.size.height as f32);
        let uniform = ViewUniform {
            scale_offset: self.view().uv_to_ndc(canvas_size, window_size),
        };

        let frames = &*frames;
        let Some(frame) = frames.frame(index) else {
            return Ok(FrameOutcome::Skipped);
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("inkpad present encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("inkpad present"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.background.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            rpass.execute_bundles(std::iter::once(frame.bundle()));
        }

        let submitted = self.queue.with_lock(|queue| {
            frames.write_transforms(queue, &uniform);
            let index = queue.submit(std::iter::once(encoder.finish()));
            wait_for(&self.device, index)?;
            surface_texture.present();
            anyhow::Ok(())
        });

        match submitted {
            Ok(()) => {
                self.frames_presented.fetch_add(1, Ordering::Relaxed);
                Ok(FrameOutcome::Presented)
            }
            Err(e) => {
                log::warn!("skipping frame: {e:#}");
                Ok(FrameOutcome::Skipped)
            }
        }
    }

    /// Reconfigures the surface for `size` and rebuilds every frame.
    /// Unchanged geometry is a no-op.
    pub fn on_resize(&self, size: PhysicalSize<u32>) -> Result<()> {
        if !self.phase().is_live() {
            log::debug!("resize ignored while {:?}", self.phase());
            return Ok(());
        }
        self.advance_phase(PhaseEvent::BeginResize)?;

        {
            let mut guard = lock(&self.surface);
            if let Some(state) = guard.as_mut() {
                if state.size != size {
                    if state.frames.take().is_some() {
                        self.retire_in_flight();
                    }
                    state.size = size;
                    if size.width > 0 && size.height > 0 {
                        state.config.width = size.width;
                        state.config.height = size.height;
                        state.surface.configure(&self.device, &state.config);
                    }
                    log::debug!("surface resized to {}x{}", size.width, size.height);
                }
                self.sync_frames(state);
            }
        }

        self.advance_phase(PhaseEvent::FinishResize)
    }

    /// Retires all frames and releases the surface. Further calls are no-ops.
    pub fn terminate(&self) {
        if self.advance_phase(PhaseEvent::Terminate).is_err() {
            return;
        }
        self.retire_in_flight();
        *lock(&self.surface) = None;
        log::debug!("presenter terminated");
    }
}
