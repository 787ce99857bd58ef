//! Named per-frame parameters fed to the visual programs.
//!
//! Keys are declared once when the program variant is chosen. Producers
//! (viewport tracker, interaction machine, frame clock) write through
//! [`UniformStore::set`]; the render step reads a packed [`UniformBlock`].

use std::collections::BTreeMap;
use std::fmt;

use bytemuck::{Pod, Zeroable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SessionError;
use crate::types::{ProgramVariant, Viewport};

pub const TIME: &str = "time";
pub const RESOLUTION: &str = "resolution";
pub const POINTER: &str = "pointer";
pub const INTENSITY: &str = "intensity";
pub const SEED: &str = "seed";

/// Upper bound (exclusive) for each component of the random seed offset.
const SEED_RANGE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
}

impl UniformValue {
    pub fn shape(&self) -> UniformShape {
        match self {
            UniformValue::Float(_) => UniformShape::Float,
            UniformValue::Vec2(_) => UniformShape::Vec2,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(value) => Some(*value),
            UniformValue::Vec2(_) => None,
        }
    }

    pub fn as_vec2(&self) -> Option<[f32; 2]> {
        match self {
            UniformValue::Vec2(value) => Some(*value),
            UniformValue::Float(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformShape {
    Float,
    Vec2,
}

impl fmt::Display for UniformShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniformShape::Float => f.write_str("float"),
            UniformShape::Vec2 => f.write_str("vec2"),
        }
    }
}

/// How a declared uniform may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// Rewritten by its producer every frame or on events.
    PerFrame,
    /// Sampled once at session creation and immutable afterwards.
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: &'static str,
    pub shape: UniformShape,
    pub mutability: Mutability,
}

impl UniformDecl {
    const fn per_frame(name: &'static str, shape: UniformShape) -> Self {
        Self {
            name,
            shape,
            mutability: Mutability::PerFrame,
        }
    }

    const fn session(name: &'static str, shape: UniformShape) -> Self {
        Self {
            name,
            shape,
            mutability: Mutability::Session,
        }
    }
}

const VORTEX_UNIFORMS: &[UniformDecl] = &[
    UniformDecl::per_frame(TIME, UniformShape::Float),
    UniformDecl::per_frame(RESOLUTION, UniformShape::Vec2),
    UniformDecl::per_frame(POINTER, UniformShape::Vec2),
];

const STARRY_NIGHT_UNIFORMS: &[UniformDecl] = &[
    UniformDecl::per_frame(TIME, UniformShape::Float),
    UniformDecl::per_frame(RESOLUTION, UniformShape::Vec2),
    UniformDecl::session(SEED, UniformShape::Vec2),
];

const BLACK_HOLE_UNIFORMS: &[UniformDecl] = &[
    UniformDecl::per_frame(TIME, UniformShape::Float),
    UniformDecl::per_frame(RESOLUTION, UniformShape::Vec2),
    UniformDecl::per_frame(INTENSITY, UniformShape::Float),
];

impl ProgramVariant {
    /// Uniform keys this program reads.
    pub fn declared_uniforms(self) -> &'static [UniformDecl] {
        match self {
            ProgramVariant::Vortex => VORTEX_UNIFORMS,
            ProgramVariant::StarryNight => STARRY_NIGHT_UNIFORMS,
            ProgramVariant::BlackHole => BLACK_HOLE_UNIFORMS,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    decl: UniformDecl,
    value: UniformValue,
}

/// Mapping from declared uniform name to its current value.
#[derive(Debug, Clone)]
pub struct UniformStore {
    variant: ProgramVariant,
    slots: BTreeMap<&'static str, Slot>,
}

impl UniformStore {
    /// Declares the keys for `variant`, zero-initialises the per-frame ones and
    /// samples session-scoped keys from a generator seeded with `seed` (or OS
    /// entropy).
    pub fn for_variant(variant: ProgramVariant, viewport: Viewport, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let slots = variant
            .declared_uniforms()
            .iter()
            .map(|decl| {
                let value = match (decl.name, decl.mutability, decl.shape) {
                    (RESOLUTION, _, _) => UniformValue::Vec2(viewport.as_uniform()),
                    (_, Mutability::Session, UniformShape::Vec2) => UniformValue::Vec2([
                        rng.gen_range(0.0..SEED_RANGE),
                        rng.gen_range(0.0..SEED_RANGE),
                    ]),
                    (_, Mutability::Session, UniformShape::Float) => {
                        UniformValue::Float(rng.gen_range(0.0..SEED_RANGE))
                    }
                    (_, Mutability::PerFrame, UniformShape::Vec2) => UniformValue::Vec2([0.0; 2]),
                    (_, Mutability::PerFrame, UniformShape::Float) => UniformValue::Float(0.0),
                };
                (decl.name, Slot { decl: *decl, value })
            })
            .collect();
        Self { variant, slots }
    }

    pub fn variant(&self) -> ProgramVariant {
        self.variant
    }

    pub fn declares(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<UniformValue, SessionError> {
        self.slots
            .get(name)
            .map(|slot| slot.value)
            .ok_or_else(|| SessionError::UndeclaredUniform(name.to_string()))
    }

    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), SessionError> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| SessionError::UndeclaredUniform(name.to_string()))?;
        if slot.decl.mutability == Mutability::Session {
            return Err(SessionError::ImmutableUniform(name.to_string()));
        }
        if slot.decl.shape != value.shape() {
            return Err(SessionError::UniformShape {
                name: name.to_string(),
                expected: slot.decl.shape,
                actual: value.shape(),
            });
        }
        slot.value = value;
        Ok(())
    }

    /// Writes `value` only when the program declares `name`.
    ///
    /// Producers shared by every variant (pointer tracking, interaction) use
    /// this so that programs which ignore their output are left untouched.
    pub fn set_if_declared(&mut self, name: &str, value: UniformValue) -> Result<(), SessionError> {
        if self.declares(name) {
            self.set(name, value)
        } else {
            Ok(())
        }
    }

    pub fn resolution(&self) -> [f32; 2] {
        self.vec2_or_zero(RESOLUTION)
    }

    pub fn time(&self) -> f32 {
        self.float_or_zero(TIME)
    }

    /// Packs the current values into the GPU-side block. Keys the program does
    /// not declare are written as zero.
    pub fn pack(&self) -> UniformBlock {
        UniformBlock {
            resolution: self.vec2_or_zero(RESOLUTION),
            pointer: self.vec2_or_zero(POINTER),
            seed: self.vec2_or_zero(SEED),
            time: self.float_or_zero(TIME),
            intensity: self.float_or_zero(INTENSITY),
        }
    }

    fn vec2_or_zero(&self, name: &str) -> [f32; 2] {
        self.slots
            .get(name)
            .and_then(|slot| slot.value.as_vec2())
            .unwrap_or([0.0; 2])
    }

    fn float_or_zero(&self, name: &str) -> f32 {
        self.slots
            .get(name)
            .and_then(|slot| slot.value.as_float())
            .unwrap_or(0.0)
    }
}

/// std140 mirror of the `Params` uniform block declared by every fragment
/// program.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct UniformBlock {
    pub resolution: [f32; 2],
    pub pointer: [f32; 2],
    pub seed: [f32; 2],
    pub time: f32,
    pub intensity: f32,
}

impl UniformBlock {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            resolution: viewport.as_uniform(),
            ..Self::zeroed()
        }
    }

    pub fn with_time(mut self, time: f32) -> Self {
        self.time = time;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_pointer(mut self, pointer: [f32; 2]) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_seed(mut self, seed: [f32; 2]) -> Self {
        self.seed = seed;
        self
    }
}
