use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::info;

use dark_side::config::{AppConfig, DEFAULT_CONFIG_FILE};
use dark_side::ephemeris::{AnalyticEphemeris, Ephemeris};
use dark_side::export::{export_positions, PositionRequest};
use dark_side::logging;

/// Samples body positions over a date range and writes them as text files.
#[derive(Debug, Parser)]
struct Args {
    /// First date, YYYYMMDD
    start: String,
    /// End date (not sampled), YYYYMMDD
    end: String,
    /// Number of samples
    steps: usize,
    /// Where to write the files
    #[arg(short, long, default_value = "data")]
    output_dir: PathBuf,
    /// Config file naming the kernel set
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Target/observer pairs like MOON:EARTH; defaults to MOON:EARTH and EARTH:SUN
    #[arg(short, long = "pair")]
    pairs: Vec<String>,
    #[arg(long, default_value = "J2000")]
    frame: String,
    #[arg(long, default_value = "NONE")]
    correction: String,
}

fn parse_pair(s: &str) -> anyhow::Result<(String, String)> {
    match s.split_once(':') {
        Some((target, observer)) if !target.is_empty() && !observer.is_empty() => {
            Ok((target.to_owned(), observer.to_owned()))
        }
        _ => Err(anyhow!("invalid pair `{}`, expected TARGET:OBSERVER", s)),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = if args.config.exists() {
        AppConfig::load(&args.config)
            .with_context(|| format!("failed to load {}", args.config.display()))?
    } else {
        AppConfig::default()
    };
    logging::init(&config.logging.filter);

    let ephemeris = AnalyticEphemeris::load(&config.ephemeris.kernels)
        .context("failed to load ephemeris kernels")?;
    let start = ephemeris
        .time_from_calendar(&args.start)
        .context("invalid start date")?;
    let end = ephemeris
        .time_from_calendar(&args.end)
        .context("invalid end date")?;

    let mut request = PositionRequest::new(start, end, args.steps);
    if !args.pairs.is_empty() {
        request.pairs = args
            .pairs
            .iter()
            .map(|p| parse_pair(p))
            .collect::<anyhow::Result<_>>()?;
    }
    request.reference_frame = args.frame;
    request.aberration_correction = args.correction;

    let written = export_positions(&ephemeris, &request, &args.output_dir).with_context(|| {
        format!("failed to export positions to {}", args.output_dir.display())
    })?;
    for path in written.iter() {
        info!(path = %path.display(), "wrote");
    }
    Ok(())
}
