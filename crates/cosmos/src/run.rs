use std::path::Path;

use anyhow::{Context, Result};
use renderer::still::{render_still, still_uniforms};
use renderer::{
    run_window, GpuOptions, GpuPowerPreference, InteractionRates, PreviewConfig, ProgramVariant,
    SessionOptions, Viewport,
};
use sceneconfig::{PowerSetting, SceneConfig, SceneVariant};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::paths::resolve_config_path;

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let (session, gpu, size) = build_options(&cli, &config)?;

    match &cli.still {
        Some(path) => export_still(&session, size, &cli, path),
        None => run_window(PreviewConfig {
            title: format!("cosmos: {}", session.variant),
            size,
            session,
            gpu,
        }),
    }
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<SceneConfig> {
    match resolve_config_path(cli.config.as_deref()) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading scene config");
            SceneConfig::load(&path)
                .with_context(|| format!("failed to load scene config {}", path.display()))
        }
        None => Ok(SceneConfig::default()),
    }
}

/// Merges the scene file with command-line overrides; flags win.
fn build_options(cli: &Cli, config: &SceneConfig) -> Result<(SessionOptions, GpuOptions, Viewport)> {
    let variant = cli.variant.unwrap_or_else(|| map_variant(config.variant));
    let rise = cli.rise.unwrap_or(config.interaction.rise);
    let fall = cli.fall.unwrap_or(config.interaction.fall);
    let rates = InteractionRates::new(rise, fall).context("invalid interaction rates")?;

    let mut session = SessionOptions::new(variant).with_rates(rates);
    if let Some(seed) = cli.seed.or(config.seed) {
        session = session.with_seed(seed);
    }

    let gpu = GpuOptions {
        power: match config.gpu.power {
            PowerSetting::Low => GpuPowerPreference::Low,
            PowerSetting::High => GpuPowerPreference::High,
        },
        vsync: config.gpu.vsync,
        transparent: config.gpu.transparent,
    };

    let (width, height) = cli.size.unwrap_or(config.size);
    Ok((session, gpu, Viewport::new(width, height)))
}

fn map_variant(variant: SceneVariant) -> ProgramVariant {
    match variant {
        SceneVariant::Vortex => ProgramVariant::Vortex,
        SceneVariant::StarryNight => ProgramVariant::StarryNight,
        SceneVariant::BlackHole => ProgramVariant::BlackHole,
    }
}

fn export_still(session: &SessionOptions, size: Viewport, cli: &Cli, path: &Path) -> Result<()> {
    let uniforms = still_uniforms(session, size, cli.still_time, cli.still_intensity)
        .context("failed to prepare still uniforms")?;
    let image = render_still(session.variant, size, &uniforms);
    image
        .save(path)
        .with_context(|| format!("failed to write still to {}", path.display()))?;
    tracing::info!(
        variant = %session.variant,
        size = %size,
        time = cli.still_time,
        path = %path.display(),
        "still exported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["cosmos"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_scene_file() {
        let config = SceneConfig::from_toml_str(
            r#"
variant = "starry-night"
size = [800, 600]
seed = 3
[interaction]
rise = 0.1
[gpu]
power = "low"
transparent = true
"#,
        )
        .unwrap();
        let (session, gpu, size) =
            build_options(&cli(&["--variant", "black-hole", "--seed", "9"]), &config).unwrap();
        assert_eq!(session.variant, ProgramVariant::BlackHole);
        assert_eq!(session.seed, Some(9));
        assert_eq!(session.rates, InteractionRates::new(0.1, 0.03).unwrap());
        assert_eq!(gpu.power, GpuPowerPreference::Low);
        assert!(gpu.transparent);
        assert_eq!(size, Viewport::new(800, 600));
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let (session, gpu, size) = build_options(&cli(&[]), &SceneConfig::default()).unwrap();
        assert_eq!(session, SessionOptions::default());
        assert_eq!(gpu, GpuOptions::default());
        assert_eq!(size, Viewport::new(1280, 720));
    }

    #[test]
    fn invalid_rate_flags_are_rejected() {
        let err = build_options(&cli(&["--fall", "0"]), &SceneConfig::default()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("fall rate"), "{message}");

        let err = build_options(&cli(&["--rise", "NaN"]), &SceneConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("rise rate"));
    }
}
