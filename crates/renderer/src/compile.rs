use std::borrow::Cow;

use wgpu::naga::ShaderStage;

use crate::error::SessionError;
use crate::program::VERTEX_SHADER;
use crate::types::ProgramVariant;

/// Compiles the quad vertex shader shared by every program.
pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
    variant: ProgramVariant,
) -> Result<wgpu::ShaderModule, SessionError> {
    compile_glsl(
        device,
        variant,
        "cosmos quad vertex",
        Cow::Borrowed(VERTEX_SHADER),
        ShaderStage::Vertex,
    )
}

/// Compiles the fragment program for `variant`.
///
/// Validation errors are captured with an error scope so a broken program
/// surfaces as [`SessionError::ProgramCompile`] instead of a device panic.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    variant: ProgramVariant,
) -> Result<wgpu::ShaderModule, SessionError> {
    compile_glsl(
        device,
        variant,
        "cosmos fragment",
        Cow::Owned(variant.fragment_source()),
        ShaderStage::Fragment,
    )
}

fn compile_glsl(
    device: &wgpu::Device,
    variant: ProgramVariant,
    label: &str,
    shader: Cow<'static, str>,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule, SessionError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader,
            stage,
            defines: &[],
        },
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        tracing::debug!(%variant, ?stage, "shader validation failed");
        return Err(SessionError::ProgramCompile {
            variant,
            message: err.to_string(),
        });
    }
    Ok(module)
}
