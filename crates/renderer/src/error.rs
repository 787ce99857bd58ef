use thiserror::Error;

use crate::session::SessionState;
use crate::types::ProgramVariant;
use crate::uniforms::UniformShape;

/// Failures surfaced by a render session and its backends.
///
/// Construction failures (`ContextUnavailable`, `ProgramCompile`) leave the host
/// untouched. Any error returned from a frame is fatal for the session: the
/// loop is stopped and every resource is released before the error reaches the
/// caller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("GPU context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("failed to compile {variant} program: {message}")]
    ProgramCompile {
        variant: ProgramVariant,
        message: String,
    },
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("uniform '{0}' is not declared by this program")]
    UndeclaredUniform(String),
    #[error("uniform '{name}' expects a {expected} value, got {actual}")]
    UniformShape {
        name: String,
        expected: UniformShape,
        actual: UniformShape,
    },
    #[error("uniform '{0}' is fixed for the lifetime of the session")]
    ImmutableUniform(String),
    #[error("operation not valid while the session is {0}")]
    Lifecycle(SessionState),
    #[error("interaction {name} rate must be in (0, 1], got {value}")]
    InvalidRate { name: &'static str, value: f32 },
    #[error("GPU resource '{0}' has not been created")]
    ResourceMissing(&'static str),
}
