use crate::error::SessionError;
use crate::types::{ProgramVariant, Viewport};
use crate::uniforms::UniformBlock;

/// GPU context owned by a single render session.
///
/// Releases must tolerate resources that were never created or were already
/// released; the session relies on that to make disposal idempotent.
pub trait RenderBackend {
    /// Resizes the output framebuffer.
    fn resize(&mut self, viewport: Viewport);

    /// Size the framebuffer actually has, which may be clamped by the device.
    fn framebuffer_size(&self) -> Viewport;

    fn compile_program(&mut self, variant: ProgramVariant) -> Result<(), SessionError>;

    /// Creates the full-screen quad and the uniform buffer.
    fn create_buffers(&mut self) -> Result<(), SessionError>;

    /// Uploads `uniforms` and draws one frame.
    fn draw(&mut self, uniforms: &UniformBlock) -> Result<(), SessionError>;

    fn release_buffers(&mut self);

    fn release_program(&mut self);

    fn release_context(&mut self);
}
