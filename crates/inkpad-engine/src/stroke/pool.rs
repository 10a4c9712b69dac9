use crate::canvas::BrushPipeline;

use super::params::{DabTransform, InkParams};

/// One reusable dab: its parameter buffers, bind group and the pre-recorded
/// draw that reads them.
pub struct PoolEntry {
    transform: wgpu::Buffer,
    ink: wgpu::Buffer,
    /// Referenced by `bundle`; kept for its lifetime.
    #[allow(dead_code)]
    bind_group: wgpu::BindGroup,
    bundle: wgpu::RenderBundle,
}

impl PoolEntry {
    fn new(
        device: &wgpu::Device,
        brush: &BrushPipeline,
        brush_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        index: usize,
    ) -> Self {
        let transform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("inkpad dab transform ubo"),
            size: std::mem::size_of::<DabTransform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let ink = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("inkpad dab ink ubo"),
            size: std::mem::size_of::<InkParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("inkpad dab bind group"),
            layout: &brush.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: transform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(brush_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: ink.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_render_bundle_encoder(&wgpu::RenderBundleEncoderDescriptor {
            label: Some("inkpad dab bundle encoder"),
            color_formats: &[Some(brush.format)],
            depth_stencil: None,
            sample_count: brush.sample_count,
            ..Default::default()
        });
        encoder.set_pipeline(&brush.pipeline);
        encoder.set_bind_group(0, &bind_group, &[]);
        encoder.draw(0..6, 0..1);
        let bundle = encoder.finish(&wgpu::RenderBundleDescriptor {
            label: Some(&format!("inkpad dab bundle {index}")),
        });

        Self {
            transform,
            ink,
            bind_group,
            bundle,
        }
    }

    /// Stages new parameters; they take effect with the next submission.
    pub fn write(&self, queue: &wgpu::Queue, transform: &DabTransform, ink: &InkParams) {
        queue.write_buffer(&self.transform, 0, bytemuck::bytes_of(transform));
        queue.write_buffer(&self.ink, 0, bytemuck::bytes_of(ink));
    }
}

/// Fixed set of pre-recorded dab draws, recycled block after block.
pub struct ResourceBatchPool {
    entries: Vec<PoolEntry>,
}

impl ResourceBatchPool {
    pub fn new(
        device: &wgpu::Device,
        brush: &BrushPipeline,
        brush_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        size: usize,
    ) -> Self {
        let entries = (0..size)
            .map(|i| PoolEntry::new(device, brush, brush_view, sampler, i))
            .collect();
        log::debug!("resource batch pool: {size} entries");
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, slot: usize) -> Option<&PoolEntry> {
        self.entries.get(slot)
    }

    /// Recorded draws of slots `0..count`.
    pub fn bundles(&self, count: usize) -> impl Iterator<Item = &wgpu::RenderBundle> {
        self.entries.iter().take(count).map(|e| &e.bundle)
    }
}
