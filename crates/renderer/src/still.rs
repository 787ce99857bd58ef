//! Headless still frames evaluated with the CPU reference programs.

use image::{Rgba, RgbaImage};

use crate::error::SessionError;
use crate::types::{ProgramVariant, SessionOptions, Viewport};
use crate::uniforms::{UniformBlock, UniformStore, UniformValue, INTENSITY, TIME};

/// Builds the uniform block a session would draw with at `time` seconds and
/// the given interaction `intensity`.
///
/// Keys the program does not declare are ignored, exactly as in a live
/// session.
pub fn still_uniforms(
    options: &SessionOptions,
    viewport: Viewport,
    time: f32,
    intensity: f32,
) -> Result<UniformBlock, SessionError> {
    let mut store = UniformStore::for_variant(options.variant, viewport, options.seed);
    store.set(TIME, UniformValue::Float(time))?;
    store.set_if_declared(INTENSITY, UniformValue::Float(intensity.clamp(0.0, 1.0)))?;
    Ok(store.pack())
}

/// Renders one frame of `variant` into an RGBA image (top row first).
///
/// Every pixel is sampled at its centre with a bottom-left fragment origin,
/// matching the GPU path.
pub fn render_still(
    variant: ProgramVariant,
    viewport: Viewport,
    uniforms: &UniformBlock,
) -> RgbaImage {
    let height = viewport.height;
    RgbaImage::from_fn(viewport.width, height, |x, y| {
        let frag = [x as f32 + 0.5, (height - 1 - y) as f32 + 0.5];
        let rgba = variant.shade(frag, uniforms);
        Rgba(rgba.map(to_byte))
    })
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_matches_viewport_and_flips_rows() {
        let viewport = Viewport::new(24, 16);
        let block = UniformBlock::new(viewport).with_time(1.5);
        let image = render_still(ProgramVariant::Vortex, viewport, &block);
        assert_eq!(image.dimensions(), (24, 16));

        let top_left = ProgramVariant::Vortex.shade([0.5, 15.5], &block);
        assert_eq!(image.get_pixel(0, 0).0, top_left.map(to_byte));
    }

    #[test]
    fn idle_black_hole_still_is_transparent() {
        let viewport = Viewport::new(40, 40);
        let options = SessionOptions::new(ProgramVariant::BlackHole).with_seed(9);
        let block = still_uniforms(&options, viewport, 2.0, 0.0).unwrap();
        let image = render_still(ProgramVariant::BlackHole, viewport, &block);
        assert!(image.pixels().all(|pixel| pixel.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn still_uniforms_respect_declarations() {
        let viewport = Viewport::new(10, 10);
        let vortex = SessionOptions::new(ProgramVariant::Vortex);
        let block = still_uniforms(&vortex, viewport, 4.0, 1.0).unwrap();
        assert_eq!(block.time, 4.0);
        assert_eq!(block.intensity, 0.0);
        assert_eq!(block.resolution, [10.0, 10.0]);

        let starry = SessionOptions::new(ProgramVariant::StarryNight).with_seed(11);
        let a = still_uniforms(&starry, viewport, 0.0, 0.0).unwrap();
        let b = still_uniforms(&starry, viewport, 9.0, 0.0).unwrap();
        assert_eq!(a.seed, b.seed);
        assert_ne!(a.seed, [0.0, 0.0]);
    }

    #[test]
    fn channels_are_clamped_to_bytes() {
        assert_eq!(to_byte(-0.5), 0);
        assert_eq!(to_byte(2.0), 255);
        assert_eq!(to_byte(0.5), 128);
    }
}
