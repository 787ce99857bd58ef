use super::noise::{length3, random, scale3, smoothstep, Vec2, Vec3};
use crate::uniforms::UniformBlock;

const CENTER: Vec2 = [0.5, 0.5];

/// Angular speed of the disk; inner matter orbits faster (`spin / d`).
pub(crate) const BASE_SPIN: f32 = 0.3;
/// Extra swirl applied at full intensity.
pub(crate) const SWIRL_GAIN: f32 = 20.0;
/// How quickly the extra swirl decays with distance from the centre.
pub(crate) const SWIRL_FALLOFF: f32 = 5.0;

const MATTER_GRID: f32 = 300.0;
const DISK_INNER: (f32, f32) = (0.1, 0.12);
const DISK_OUTER: (f32, f32) = (0.4, 0.2);
const CLUMP_EXPONENT: f32 = 25.0;
const TINT: Vec3 = [1.0, 0.7, 0.3];

/// Radius (in uv units) of the black centre.
pub(crate) const EVENT_HORIZON: (f32, f32) = (0.09, 0.1);

pub(crate) fn shade(frag_coord: Vec2, uniforms: &UniformBlock) -> [f32; 4] {
    let resolution = [uniforms.resolution[0].max(1.0), uniforms.resolution[1].max(1.0)];
    let uv = [frag_coord[0] / resolution[0], frag_coord[1] / resolution[1]];
    let delta = [uv[0] - CENTER[0], uv[1] - CENTER[1]];
    let dist = (delta[0] * delta[0] + delta[1] * delta[1]).sqrt();

    // The horizon mask is exactly zero well before the swirl term diverges.
    let horizon = smoothstep(EVENT_HORIZON.0, EVENT_HORIZON.1, dist);
    if horizon <= 0.0 {
        return [0.0; 4];
    }

    let mut angle = delta[1].atan2(delta[0]);
    angle -= uniforms.time * BASE_SPIN / dist;
    angle += uniforms.intensity * SWIRL_GAIN * (-dist * SWIRL_FALLOFF).exp();

    let swirl = [
        CENTER[0] + dist * angle.cos(),
        CENTER[1] + dist * angle.sin(),
    ];
    let matter = random([
        (swirl[0] * MATTER_GRID).floor(),
        (swirl[1] * MATTER_GRID).floor(),
    ]);

    let disk =
        smoothstep(DISK_INNER.0, DISK_INNER.1, dist) * smoothstep(DISK_OUTER.0, DISK_OUTER.1, dist);
    let clumps = (matter * disk).powf(CLUMP_EXPONENT);

    let color: Vec3 = scale3(TINT, clumps * uniforms.intensity * horizon);
    let alpha = length3(color).sqrt();
    [color[0], color[1], color[2], alpha]
}
