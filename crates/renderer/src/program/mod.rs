//! The three procedural colour fields.
//!
//! Each variant exists twice: as GLSL for the GPU path and as a CPU evaluator
//! used by still export and tests.

mod black_hole;
pub(crate) mod noise;
mod shaders;
mod starry;
mod vortex;

pub(crate) use shaders::VERTEX_SHADER;

use crate::types::ProgramVariant;
use crate::uniforms::UniformBlock;

impl ProgramVariant {
    /// Colour of the pixel centred at `frag_coord` (bottom-left origin),
    /// evaluated on the CPU.
    pub fn shade(self, frag_coord: [f32; 2], uniforms: &UniformBlock) -> [f32; 4] {
        match self {
            ProgramVariant::Vortex => vortex::shade(frag_coord, uniforms),
            ProgramVariant::StarryNight => starry::shade(frag_coord, uniforms),
            ProgramVariant::BlackHole => black_hole::shade(frag_coord, uniforms),
        }
    }

    /// GLSL 450 fragment source reading the `Params` uniform block.
    pub fn fragment_source(self) -> String {
        shaders::fragment_source(self)
    }
}
