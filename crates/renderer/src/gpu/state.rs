use std::sync::Arc;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;

use crate::backend::RenderBackend;
use crate::error::SessionError;
use crate::types::{GpuOptions, ProgramVariant, Viewport};
use crate::uniforms::UniformBlock;

use super::context::GpuContext;
use super::pipeline::ProgramPipeline;

/// Full-screen quad in clip space, counter-clockwise.
const QUAD_VERTICES: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

struct QuadBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl QuadBuffers {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform buffer"),
            size: std::mem::size_of::<UniformBlock>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });
        Self {
            vertices,
            indices,
            uniforms,
            bind_group,
        }
    }

    fn destroy(self) {
        self.vertices.destroy();
        self.indices.destroy();
        self.uniforms.destroy();
    }
}

/// `wgpu` implementation of [`RenderBackend`] drawing into a window surface.
pub struct WgpuBackend {
    context: Option<GpuContext>,
    pipeline: Option<ProgramPipeline>,
    buffers: Option<QuadBuffers>,
    size: Viewport,
}

impl WgpuBackend {
    /// Creates the surface, adapter and device for `target`.
    pub fn new<T>(
        target: Arc<T>,
        initial_size: Viewport,
        options: GpuOptions,
    ) -> Result<Self, SessionError>
    where
        T: HasDisplayHandle + HasWindowHandle + Send + Sync + 'static,
    {
        let context = GpuContext::new(target, initial_size, options)?;
        let size = context.size();
        Ok(Self {
            context: Some(context),
            pipeline: None,
            buffers: None,
            size,
        })
    }

    fn context(&self) -> Result<&GpuContext, SessionError> {
        self.context
            .as_ref()
            .ok_or(SessionError::ResourceMissing("context"))
    }

    fn acquire_frame(&self) -> Result<wgpu::SurfaceTexture, SessionError> {
        let context = self.context()?;
        match context.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated; reconfiguring");
                context.reconfigure();
                Ok(context.surface.get_current_texture()?)
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn resize(&mut self, viewport: Viewport) {
        if let Some(context) = self.context.as_mut() {
            context.resize(viewport);
            self.size = context.size();
        }
    }

    fn framebuffer_size(&self) -> Viewport {
        self.size
    }

    fn compile_program(&mut self, variant: ProgramVariant) -> Result<(), SessionError> {
        let context = self.context()?;
        let pipeline = ProgramPipeline::new(&context.device, context.surface_format, variant)?;
        tracing::debug!(%variant, format = ?context.surface_format, "compiled program");
        self.pipeline = Some(pipeline);
        Ok(())
    }

    fn create_buffers(&mut self) -> Result<(), SessionError> {
        let context = self.context()?;
        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or(SessionError::ResourceMissing("program"))?;
        let buffers = QuadBuffers::new(&context.device, &pipeline.uniform_layout);
        self.buffers = Some(buffers);
        Ok(())
    }

    fn draw(&mut self, uniforms: &UniformBlock) -> Result<(), SessionError> {
        let frame = self.acquire_frame()?;
        let context = self.context()?;
        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or(SessionError::ResourceMissing("program"))?;
        let buffers = self
            .buffers
            .as_ref()
            .ok_or(SessionError::ResourceMissing("buffers"))?;

        context
            .queue
            .write_buffer(&buffers.uniforms, 0, bytemuck::bytes_of(uniforms));

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(pipeline.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&pipeline.pipeline);
            render_pass.set_bind_group(0, &buffers.bind_group, &[]);
            render_pass.set_vertex_buffer(0, buffers.vertices.slice(..));
            render_pass.set_index_buffer(buffers.indices.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        }
        context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release_buffers(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            buffers.destroy();
        }
    }

    fn release_program(&mut self) {
        self.pipeline = None;
    }

    fn release_context(&mut self) {
        if let Some(context) = self.context.take() {
            context.device.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space_with_two_triangles() {
        assert_eq!(QUAD_INDICES.len(), 6);
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < QUAD_VERTICES.len()));
        for corner in [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]] {
            assert!(QUAD_VERTICES.contains(&corner));
        }
        assert_eq!(
            std::mem::size_of_val(&QUAD_VERTICES[0]) as u64,
            super::super::pipeline::QUAD_VERTEX_STRIDE
        );
    }
}
