use crate::canvas::CanvasDisplay;

use super::pipeline::{DisplayPipeline, ViewUniform};

/// Everything the surface frame set depends on. Frames are rebuilt exactly
/// when this changes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SurfaceGeometry {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub frame_count: usize,
    pub canvas_generation: u64,
}

impl SurfaceGeometry {
    pub fn is_zero_sized(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn needs_rebuild(&self, next: &SurfaceGeometry) -> bool {
        self != next
    }
}

/// Per-presentable-image resources: transform buffer, canvas binding and the
/// recorded full-quad draw.
pub struct SurfaceFrame {
    transform: wgpu::Buffer,
    /// Referenced by `bundle`; kept for its lifetime.
    #[allow(dead_code)]
    bind_group: wgpu::BindGroup,
    bundle: wgpu::RenderBundle,
}

impl SurfaceFrame {
    fn new(device: &wgpu::Device, pipeline: &DisplayPipeline, canvas: &CanvasDisplay, index: usize) -> Self {
        let transform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("inkpad surface frame ubo"),
            size: std::mem::size_of::<ViewUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("inkpad surface frame bind group"),
            layout: &pipeline.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: transform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&canvas.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&pipeline.sampler),
                },
            ],
        });

        let mut encoder = device.create_render_bundle_encoder(&wgpu::RenderBundleEncoderDescriptor {
            label: Some("inkpad surface frame bundle encoder"),
            color_formats: &[Some(pipeline.format)],
            depth_stencil: None,
            sample_count: 1,
            ..Default::default()
        });
        encoder.set_pipeline(&pipeline.pipeline);
        encoder.set_bind_group(0, &bind_group, &[]);
        encoder.draw(0..6, 0..1);
        let bundle = encoder.finish(&wgpu::RenderBundleDescriptor {
            label: Some(&format!("inkpad surface frame {index}")),
        });

        Self {
            transform,
            bind_group,
            bundle,
        }
    }

    pub fn bundle(&self) -> &wgpu::RenderBundle {
        &self.bundle
    }
}

/// The full set of surface frames for one geometry, used round-robin.
pub struct SurfaceFrameSet {
    geometry: SurfaceGeometry,
    frames: Vec<SurfaceFrame>,
    next: usize,
}

impl SurfaceFrameSet {
    pub fn build(
        device: &wgpu::Device,
        pipeline: &DisplayPipeline,
        canvas: &CanvasDisplay,
        geometry: SurfaceGeometry,
    ) -> Self {
        let frames = (0..geometry.frame_count)
            .map(|i| SurfaceFrame::new(device, pipeline, canvas, i))
            .collect();
        log::debug!(
            "built {} surface frames for {}x{} (canvas generation {})",
            geometry.frame_count,
            geometry.width,
            geometry.height,
            geometry.canvas_generation
        );
        Self {
            geometry,
            frames,
            next: 0,
        }
    }

    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Writes the view mapping into every frame's buffer.
    pub fn write_transforms(&self, queue: &wgpu::Queue, uniform: &ViewUniform) {
        for frame in &self.frames {
            queue.write_buffer(&frame.transform, 0, bytemuck::bytes_of(uniform));
        }
    }

    /// Index of the next frame in round-robin order.
    pub fn advance(&mut self) -> Option<usize> {
        if self.frames.is_empty() {
            return None;
        }
        let index = self.next;
        self.next = (self.next + 1) % self.frames.len();
        Some(index)
    }

    pub fn frame(&self, index: usize) -> Option<&SurfaceFrame> {
        self.frames.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> SurfaceGeometry {
        SurfaceGeometry {
            width: 800,
            height: 600,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            frame_count: 3,
            canvas_generation: 0,
        }
    }

    #[test]
    fn same_geometry_needs_no_rebuild() {
        assert!(!geometry().needs_rebuild(&geometry()));
    }

    #[test]
    fn size_change_needs_rebuild() {
        let next = SurfaceGeometry {
            width: 801,
            ..geometry()
        };
        assert!(geometry().needs_rebuild(&next));
    }

    #[test]
    fn canvas_generation_change_needs_rebuild() {
        let next = SurfaceGeometry {
            canvas_generation: 1,
            ..geometry()
        };
        assert!(geometry().needs_rebuild(&next));
    }

    #[test]
    fn zero_sized() {
        assert!(SurfaceGeometry { height: 0, ..geometry() }.is_zero_sized());
        assert!(!geometry().is_zero_sized());
    }
}
