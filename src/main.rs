use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use dark_side::config::{AppConfig, ConfigError, DEFAULT_CONFIG_FILE};
use dark_side::ephemeris::AnalyticEphemeris;
use dark_side::scene::SceneDriver;
use dark_side::{gui, logging};

/// Animates the lit and dark sides of the earth and moon.
#[derive(Debug, Parser)]
struct Args {
    /// Scene configuration (TOML). Defaults to ./dark-side.toml if present.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write every frame as a PNG, overriding the config
    #[arg(long)]
    export: bool,
    /// Number of frames, overriding the config
    #[arg(long)]
    frames: Option<usize>,
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => AppConfig::load(DEFAULT_CONFIG_FILE),
        None => Ok(AppConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config =
        load_config(args.config.as_deref()).context("failed to load configuration")?;
    if args.export {
        config.animation.export = true;
    }
    if let Some(frames) = args.frames {
        config.animation.frames = frames;
    }

    if !logging::init(&config.logging.filter) {
        warn!("logging was already initialized");
    }
    info!(kernels = config.ephemeris.kernels.len(), "starting up");

    // Without poses there is nothing to show, so these are fatal
    let ephemeris = AnalyticEphemeris::load(&config.ephemeris.kernels)
        .context("failed to load ephemeris kernels")?;
    let orrery = config.build_orrery().context("invalid body table")?;
    let scene_config = config
        .scene_config(&ephemeris)
        .context("invalid animation settings")?;
    let light_color = config.light_color().context("invalid light source")?;

    let scene = SceneDriver::new(
        orrery,
        Box::new(ephemeris),
        scene_config,
        config.query_frame(),
        light_color,
    );
    gui::run(scene);
    Ok(())
}
