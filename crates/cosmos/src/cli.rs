use std::path::PathBuf;

use clap::Parser;
use renderer::ProgramVariant;

#[derive(Parser, Debug)]
#[command(
    name = "cosmos",
    author,
    version,
    about = "Procedural nebula, starry-night and black-hole shaders",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Program to render (`vortex`, `starry-night` or `black-hole`).
    #[arg(long, value_name = "VARIANT", value_parser = parse_variant)]
    pub variant: Option<ProgramVariant>,

    /// Scene configuration TOML file.
    #[arg(long, env = "COSMOS_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Initial surface size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_dimensions)]
    pub size: Option<(u32, u32)>,

    /// Fixed seed for the per-session random offset.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Per-frame intensity step while engaged, in (0, 1].
    #[arg(long, value_name = "RATE")]
    pub rise: Option<f32>,

    /// Per-frame intensity step while disengaged, in (0, 1].
    #[arg(long, value_name = "RATE")]
    pub fall: Option<f32>,

    /// Export a single PNG frame to this path instead of opening a window.
    #[arg(long, value_name = "PATH")]
    pub still: Option<PathBuf>,

    /// Time in seconds evaluated for `--still`.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0, requires = "still")]
    pub still_time: f32,

    /// Interaction intensity in [0, 1] evaluated for `--still`.
    #[arg(long, value_name = "I", default_value_t = 0.0, requires = "still")]
    pub still_intensity: f32,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_variant(value: &str) -> Result<ProgramVariant, String> {
    value.parse()
}

fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = sceneconfig::parse_size(value)?;
    if width == 0 || height == 0 {
        return Err("dimensions must be greater than zero".into());
    }
    Ok((width, height))
}
