/// The multisample → single-sample copy of the canvas.
///
/// wgpu command buffers are single-use, so the batch keeps the two fixed
/// views and re-encodes the same attachment-only pass for every submission:
/// load the multisample image, store it, resolve into the display image.
#[derive(Debug)]
pub struct ResolveBatch {
    msaa_view: wgpu::TextureView,
    resolve_view: wgpu::TextureView,
}

impl ResolveBatch {
    pub(crate) fn new(msaa_view: wgpu::TextureView, resolve_view: wgpu::TextureView) -> Self {
        Self {
            msaa_view,
            resolve_view,
        }
    }

    pub fn encode(&self, device: &wgpu::Device) -> wgpu::CommandBuffer {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("inkpad canvas resolve encoder"),
        });
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("inkpad canvas resolve"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.msaa_view,
                    resolve_target: Some(&self.resolve_view),
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
        }
        encoder.finish()
    }
}
