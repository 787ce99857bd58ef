use super::noise::{add2, add3, fbm, mix3, scale2, scale3, smoothstep, star, Vec2, Vec3};
use crate::uniforms::UniformBlock;

const HORIZON_SKY: Vec3 = [0.06, 0.04, 0.16];
const ZENITH_SKY: Vec3 = [0.0, 0.01, 0.05];
const AURORA_LOW: Vec3 = [0.1, 0.9, 0.5];
const AURORA_HIGH: Vec3 = [0.5, 0.2, 0.9];
const MOUNTAIN: Vec3 = [0.01, 0.01, 0.03];

const AURORA_GAIN: f32 = 0.8;
const AURORA_SHARPNESS: f32 = 6.0;
const RIDGE_BASE: f32 = -0.55;
const RIDGE_HEIGHT: f32 = 0.35;
const RIDGE_EDGE: f32 = 0.005;

/// Vertical position of the mountain ridge at horizontal coordinate `x`.
pub(crate) fn ridge_height(x: f32, seed: Vec2) -> f32 {
    RIDGE_BASE + RIDGE_HEIGHT * fbm([x * 1.3 + seed[0], seed[1]])
}

pub(crate) fn shade(frag_coord: Vec2, uniforms: &UniformBlock) -> [f32; 4] {
    let time = uniforms.time;
    let seed = uniforms.seed;
    let resolution = [uniforms.resolution[0].max(1.0), uniforms.resolution[1].max(1.0)];
    let height = resolution[1];
    let st = [
        (frag_coord[0] * 2.0 - resolution[0]) / height,
        (frag_coord[1] * 2.0 - resolution[1]) / height,
    ];
    let v = (frag_coord[1] / height).clamp(0.0, 1.0);

    let mut color = mix3(HORIZON_SKY, ZENITH_SKY, v);

    let stars = star(add2(scale2(st, 40.0), seed), 0.12, 1.3, 0.985, time)
        + 0.6 * star(add2(scale2(st, 90.0), [seed[1], seed[0]]), 0.1, 2.1, 0.99, time);
    color = add3(color, [stars; 3]);

    let drift = fbm([st[0] * 1.5 + seed[0] + time * 0.05, time * 0.1 + seed[1]]);
    let centre = 0.35 + 0.25 * drift;
    let curtain = fbm([st[0] * 6.0 + time * 0.3, st[1] * 0.5 + seed[1]]);
    let band = (-(st[1] - centre).abs() * AURORA_SHARPNESS).exp() * (0.5 + 0.5 * curtain);
    let hue = (st[1] - centre + 0.5).clamp(0.0, 1.0);
    color = add3(color, scale3(mix3(AURORA_LOW, AURORA_HIGH, hue), band * AURORA_GAIN));

    let ridge = ridge_height(st[0], seed);
    let land = smoothstep(ridge + RIDGE_EDGE, ridge - RIDGE_EDGE, st[1]);
    color = mix3(color, MOUNTAIN, land);

    [color[0], color[1], color[2], 1.0]
}
