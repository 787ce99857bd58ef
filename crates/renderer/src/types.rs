use std::fmt;
use std::str::FromStr;

use winit::dpi::PhysicalSize;

use crate::error::SessionError;

/// Size of the host surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-sized viewport belongs to a minimised or not-yet-laid-out host.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    pub fn as_uniform(&self) -> [f32; 2] {
        [self.width as f32, self.height as f32]
    }
}

impl From<PhysicalSize<u32>> for Viewport {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl From<Viewport> for PhysicalSize<u32> {
    fn from(viewport: Viewport) -> Self {
        PhysicalSize::new(viewport.width, viewport.height)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The procedural colour field evaluated for every output pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProgramVariant {
    /// Domain-warped nebula with a twinkling starfield and a pointer glow.
    #[default]
    Vortex,
    /// Night sky with aurora bands and a mountain silhouette.
    StarryNight,
    /// Accretion disk around a black centre, faded by interaction intensity.
    BlackHole,
}

impl ProgramVariant {
    pub const ALL: [ProgramVariant; 3] = [
        ProgramVariant::Vortex,
        ProgramVariant::StarryNight,
        ProgramVariant::BlackHole,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProgramVariant::Vortex => "vortex",
            ProgramVariant::StarryNight => "starry-night",
            ProgramVariant::BlackHole => "black-hole",
        }
    }

    /// Whether the program writes translucent pixels that should blend over
    /// whatever sits behind the surface.
    pub fn is_translucent(self) -> bool {
        matches!(self, ProgramVariant::BlackHole)
    }
}

impl fmt::Display for ProgramVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProgramVariant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vortex" | "nebula" => Ok(ProgramVariant::Vortex),
            "starry-night" | "starry" | "aurora" => Ok(ProgramVariant::StarryNight),
            "black-hole" | "blackhole" => Ok(ProgramVariant::BlackHole),
            other => Err(format!(
                "unknown program variant '{other}' (expected vortex, starry-night or black-hole)"
            )),
        }
    }
}

/// Per-frame easing steps for the interaction intensity.
///
/// Rise and fall are independent; the default falls faster than it rises so
/// that disengaging powers the effect down quickly. Both lie in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRates {
    rise: f32,
    fall: f32,
}

impl InteractionRates {
    pub const DEFAULT_RISE: f32 = 0.02;
    pub const DEFAULT_FALL: f32 = 0.03;

    pub fn new(rise: f32, fall: f32) -> Result<Self, SessionError> {
        Ok(Self {
            rise: checked_rate("rise", rise)?,
            fall: checked_rate("fall", fall)?,
        })
    }

    pub fn rise(&self) -> f32 {
        self.rise
    }

    pub fn fall(&self) -> f32 {
        self.fall
    }
}

fn checked_rate(name: &'static str, value: f32) -> Result<f32, SessionError> {
    // NaN fails both comparisons.
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(SessionError::InvalidRate { name, value })
    }
}

impl Default for InteractionRates {
    fn default() -> Self {
        Self {
            rise: Self::DEFAULT_RISE,
            fall: Self::DEFAULT_FALL,
        }
    }
}

/// GPU adapter preference handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    Low,
    #[default]
    High,
}

/// Knobs for acquiring the GPU context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuOptions {
    pub power: GpuPowerPreference,
    pub vsync: bool,
    /// Request a compositing alpha mode so translucent programs show the
    /// desktop behind them.
    pub transparent: bool,
}

impl Default for GpuOptions {
    fn default() -> Self {
        Self {
            power: GpuPowerPreference::High,
            vsync: true,
            transparent: false,
        }
    }
}

/// Options fixed when a session is created.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub variant: ProgramVariant,
    pub rates: InteractionRates,
    /// Seed for the per-session random offset; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl SessionOptions {
    pub fn new(variant: ProgramVariant) -> Self {
        Self {
            variant,
            rates: InteractionRates::default(),
            seed: None,
        }
    }

    pub fn with_rates(mut self, rates: InteractionRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new(ProgramVariant::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names_round_trip_through_from_str() {
        for variant in ProgramVariant::ALL {
            assert_eq!(variant.name().parse::<ProgramVariant>(), Ok(variant));
        }
        assert!("spiral".parse::<ProgramVariant>().is_err());
    }

    #[test]
    fn viewport_aspect_tolerates_zero_height() {
        assert_eq!(Viewport::new(1920, 1080).aspect(), 1920.0 / 1080.0);
        assert_eq!(Viewport::new(10, 0).aspect(), 10.0);
        assert!(Viewport::new(0, 10).is_empty());
    }

    #[test]
    fn rates_outside_unit_interval_are_rejected() {
        for (rise, fall) in [
            (f32::NAN, 0.03),
            (0.02, f32::NAN),
            (-0.5, 0.03),
            (0.0, 0.03),
            (0.02, 1.5),
            (f32::INFINITY, 0.03),
        ] {
            let err = InteractionRates::new(rise, fall).unwrap_err();
            assert!(
                matches!(err, SessionError::InvalidRate { .. }),
                "{rise}/{fall} accepted"
            );
        }

        let rates = InteractionRates::new(1.0, 0.25).unwrap();
        assert_eq!((rates.rise(), rates.fall()), (1.0, 0.25));
    }
}
