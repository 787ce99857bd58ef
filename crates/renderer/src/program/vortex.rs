use super::noise::{
    add2, add3, fbm, length2, mix3, offset2, scale2, scale3, smoothstep, star, Vec2, Vec3,
};
use crate::uniforms::UniformBlock;

const DEEP_PURPLE: Vec3 = [0.1, 0.0, 0.4];
const MAGENTA: Vec3 = [0.9, 0.2, 0.5];
const BLACK: Vec3 = [0.0, 0.0, 0.0];
const HIGHLIGHT: Vec3 = [0.9, 1.0, 1.0];

const STAR_GRID: f32 = 30.0;
const STAR_WARP: f32 = 2.0;
const STAR_SIZE: f32 = 0.15;
const STAR_TWINKLE: f32 = 0.5;
const STAR_THRESHOLD: f32 = 0.99;

const GLOW_RADIUS: f32 = 0.15;
const GLOW_GAIN: f32 = 0.5;

/// Maps pixel coordinates to a frame centred on the viewport and scaled by
/// its height.
fn centred(coord: Vec2, resolution: Vec2) -> Vec2 {
    let height = resolution[1].max(1.0);
    [
        (coord[0] * 2.0 - resolution[0]) / height,
        (coord[1] * 2.0 - resolution[1]) / height,
    ]
}

pub(crate) fn shade(frag_coord: Vec2, uniforms: &UniformBlock) -> [f32; 4] {
    let time = uniforms.time;
    let st = centred(frag_coord, uniforms.resolution);
    let pointer = centred(uniforms.pointer, uniforms.resolution);

    let q = [fbm(st), fbm(offset2(st, 1.0))];
    let warped = add2(st, q);
    let r = [
        fbm(offset2(add2(warped, [1.7, 9.2]), 0.15 * time)),
        fbm(offset2(add2(warped, [8.3, 2.8]), 0.126 * time)),
    ];
    let f = fbm(add2(st, r));

    let mut color = mix3(DEEP_PURPLE, MAGENTA, (f * f * 3.0).clamp(0.0, 1.0));
    color = mix3(color, BLACK, length2(q).clamp(0.0, 1.0));
    color = mix3(color, HIGHLIGHT, r[0].abs().clamp(0.0, 1.0));
    color = scale3(color, f * f * f + 0.6 * f * f + 0.5 * f);

    let star_st = add2(scale2(st, STAR_GRID), scale2(r, STAR_WARP));
    let sparkle = star(star_st, STAR_SIZE, STAR_TWINKLE, STAR_THRESHOLD, time);
    color = add3(color, [sparkle; 3]);

    let glow = 1.0 - smoothstep(0.0, GLOW_RADIUS, length2([st[0] - pointer[0], st[1] - pointer[1]]));
    color = add3(color, [glow * GLOW_GAIN; 3]);

    [color[0], color[1], color[2], 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Viewport;

    #[test]
    fn output_is_opaque_and_finite() {
        let block = UniformBlock::new(Viewport::new(64, 48)).with_time(12.5);
        for x in (0..64).step_by(7) {
            for y in (0..48).step_by(5) {
                let rgba = shade([x as f32 + 0.5, y as f32 + 0.5], &block);
                assert_eq!(rgba[3], 1.0);
                assert!(rgba.iter().all(|c| c.is_finite()));
            }
        }
    }

    #[test]
    fn pointer_glow_brightens_the_pixel_under_the_pointer() {
        let viewport = Viewport::new(200, 100);
        let pixel = [150.5, 30.5];
        let far = UniformBlock::new(viewport).with_pointer([0.0, 100.0]);
        let near = far.with_pointer(pixel);

        let dim = shade(pixel, &far);
        let lit = shade(pixel, &near);
        for channel in 0..3 {
            assert!((lit[channel] - dim[channel] - GLOW_GAIN).abs() < 1e-4);
        }
    }

    #[test]
    fn centre_maps_to_origin() {
        assert_eq!(centred([50.0, 25.0], [100.0, 50.0]), [0.0, 0.0]);
        assert_eq!(centred([100.0, 50.0], [100.0, 50.0]), [2.0, 1.0]);
    }
}
