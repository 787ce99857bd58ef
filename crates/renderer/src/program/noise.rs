//! CPU mirrors of the GLSL helpers shared by every program.
//!
//! These follow GLSL semantics (`fract`, `mix`, `smoothstep` with reversed
//! edges) so the reference evaluators produce the same fields as the GPU up to
//! floating-point differences in `sin`.

pub(crate) type Vec2 = [f32; 2];
pub(crate) type Vec3 = [f32; 3];

pub(crate) fn fract(x: f32) -> f32 {
    x - x.floor()
}

pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub(crate) fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub(crate) fn mix3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    [mix(a[0], b[0], t), mix(a[1], b[1], t), mix(a[2], b[2], t)]
}

pub(crate) fn scale3(v: Vec3, s: f32) -> Vec3 {
    [v[0] * s, v[1] * s, v[2] * s]
}

pub(crate) fn add3(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub(crate) fn length2(v: Vec2) -> f32 {
    (v[0] * v[0] + v[1] * v[1]).sqrt()
}

pub(crate) fn length3(v: Vec3) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

pub(crate) fn add2(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] + b[0], a[1] + b[1]]
}

pub(crate) fn offset2(v: Vec2, s: f32) -> Vec2 {
    [v[0] + s, v[1] + s]
}

pub(crate) fn scale2(v: Vec2, s: f32) -> Vec2 {
    [v[0] * s, v[1] * s]
}

/// Hash of a lattice point into `[0, 1)`.
pub(crate) fn random(p: Vec2) -> f32 {
    fract((p[0] * 12.9898 + p[1] * 78.233).sin() * 43758.547)
}

/// Value noise with a smoothstep fade between the four lattice corners.
pub(crate) fn noise(p: Vec2) -> f32 {
    let i = [p[0].floor(), p[1].floor()];
    let f = [fract(p[0]), fract(p[1])];

    let a = random(i);
    let b = random([i[0] + 1.0, i[1]]);
    let c = random([i[0], i[1] + 1.0]);
    let d = random([i[0] + 1.0, i[1] + 1.0]);

    let u = [f[0] * f[0] * (3.0 - 2.0 * f[0]), f[1] * f[1] * (3.0 - 2.0 * f[1])];
    mix(a, b, u[0]) + (c - a) * u[1] * (1.0 - u[0]) + (d - b) * u[0] * u[1]
}

pub(crate) const FBM_OCTAVES: usize = 5;

/// Five octaves of [`noise`], doubling frequency and halving amplitude.
pub(crate) fn fbm(mut p: Vec2) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    for _ in 0..FBM_OCTAVES {
        value += amplitude * noise(p);
        p = scale2(p, 2.0);
        amplitude *= 0.5;
    }
    value
}

/// Twinkling point star for the lattice cell containing `p`.
///
/// Only cells whose hash exceeds `threshold` hold a star; its brightness
/// oscillates with a per-cell phase.
pub(crate) fn star(p: Vec2, size: f32, twinkle_speed: f32, threshold: f32, time: f32) -> f32 {
    let grid = [p[0].floor(), p[1].floor()];
    let f = [fract(p[0]) - 0.5, fract(p[1]) - 0.5];
    let value = random(grid);
    if value <= threshold {
        return 0.0;
    }
    let twinkle = (time * twinkle_speed + value * 20.0).sin() * 0.5 + 0.5;
    let core = 1.0 - smoothstep(0.0, size, length2(f));
    core * twinkle
}
