use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneVariant {
    #[default]
    #[serde(alias = "nebula")]
    Vortex,
    #[serde(alias = "starry", alias = "aurora")]
    StarryNight,
    #[serde(alias = "blackhole")]
    BlackHole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    Low,
    #[default]
    High,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub variant: SceneVariant,
    #[serde(default = "default_size", deserialize_with = "deserialize_size")]
    pub size: (u32, u32),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub interaction: InteractionSettings,
    #[serde(default)]
    pub gpu: GpuSettings,
}

/// Per-frame intensity steps while engaged (`rise`) and disengaged (`fall`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct InteractionSettings {
    #[serde(default = "default_rise")]
    pub rise: f32,
    #[serde(default = "default_fall")]
    pub fall: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct GpuSettings {
    #[serde(default)]
    pub power: PowerSetting,
    #[serde(default = "default_true")]
    pub vsync: bool,
    #[serde(default)]
    pub transparent: bool,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_size() -> (u32, u32) {
    (1280, 720)
}

fn default_rise() -> f32 {
    0.02
}

fn default_fall() -> f32 {
    0.03
}

fn default_true() -> bool {
    true
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            variant: SceneVariant::default(),
            size: default_size(),
            seed: None,
            interaction: InteractionSettings::default(),
            gpu: GpuSettings::default(),
        }
    }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            rise: default_rise(),
            fall: default_fall(),
        }
    }
}

impl Default for GpuSettings {
    fn default() -> Self {
        Self {
            power: PowerSetting::default(),
            vsync: true,
            transparent: false,
        }
    }
}

/// Accepts `[width, height]` or a `"WIDTHxHEIGHT"` string.
fn deserialize_size<'de, D>(deserializer: D) -> Result<(u32, u32), D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Pair(i64, i64),
    }

    match Helper::deserialize(deserializer)? {
        Helper::Str(raw) => parse_size(&raw).map_err(de::Error::custom),
        Helper::Pair(width, height) => {
            if width < 0 || height < 0 {
                return Err(de::Error::custom("size components must be non-negative"));
            }
            let width = u32::try_from(width).map_err(de::Error::custom)?;
            let height = u32::try_from(height).map_err(de::Error::custom)?;
            Ok((width, height))
        }
    }
}

/// Parses `WIDTHxHEIGHT` (case-insensitive separator).
pub fn parse_size(raw: &str) -> Result<(u32, u32), String> {
    let normalized = raw.trim().to_ascii_lowercase();
    let (width, height) = normalized
        .split_once('x')
        .ok_or_else(|| format!("invalid size '{raw}'; expected WIDTHxHEIGHT"))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid width in '{raw}': {err}"))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid height in '{raw}': {err}"))?;
    Ok((width, height))
}

impl SceneConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CURRENT_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CURRENT_VERSION}",
                self.version
            )));
        }

        let (width, height) = self.size;
        if width == 0 || height == 0 {
            return Err(ConfigError::Invalid(format!(
                "size must be positive, got {width}x{height}"
            )));
        }

        validate_rate("interaction.rise", self.interaction.rise)?;
        validate_rate("interaction.fall", self.interaction.fall)?;

        Ok(())
    }
}

/// Rates are per-frame steps and must lie in `(0, 1]`.
pub fn validate_rate(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_nan() || value <= 0.0 || value > 1.0 {
        return Err(ConfigError::Invalid(format!(
            "{name} must be in (0, 1], got {value}"
        )));
    }
    Ok(())
}
