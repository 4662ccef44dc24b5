//! Scene configuration, read from a TOML file.
//!
//! Every section has defaults, and together they describe the earth-moon
//! scene, so an empty file (or none at all) still gives a working viewer.

use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Point3;
use serde::Deserialize;
use thiserror::Error;

use crate::ephemeris::{Ephemeris, EphemerisError};
use crate::orrery::{BodyInfo, Orrery, OrreryError};
use crate::pose::QueryFrame;
use crate::scene::SceneConfig;

pub const DEFAULT_CONFIG_FILE: &str = "dark-side.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid color `{0}`, expected six hex digits")]
    Color(String),
    #[error("animation.{field}: {source}")]
    Date {
        field: &'static str,
        #[source]
        source: EphemerisError,
    },
    #[error(transparent)]
    Orrery(#[from] OrreryError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub ephemeris: EphemerisConfig,
    pub animation: AnimationConfig,
    pub light_source: LightSourceConfig,
    pub logging: LoggingConfig,
    pub bodies: Vec<BodyConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EphemerisConfig {
    /// Kernel files; relative paths are taken from the config file's directory
    pub kernels: Vec<PathBuf>,
    pub reference_frame: String,
    pub aberration_correction: String,
    pub light_source: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub start: String,
    pub end: String,
    pub frames: usize,
    pub export: bool,
    pub output_dir: PathBuf,
    pub repeat: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightSourceConfig {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyConfig {
    pub name: String,
    pub radius: f64,
    pub angular_resolution: u32,
    pub distance_factor: f64,
    /// Absent means the body orbits the light source
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "default_color_lit")]
    pub color_lit: String,
    #[serde(default = "default_color_shadow")]
    pub color_shadow: String,
}

fn default_color_lit() -> String {
    "999999".to_owned()
}

fn default_color_shadow() -> String {
    "333333".to_owned()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            ephemeris: EphemerisConfig::default(),
            animation: AnimationConfig::default(),
            light_source: LightSourceConfig::default(),
            logging: LoggingConfig::default(),
            bodies: vec![
                BodyConfig {
                    name: "EARTH".to_owned(),
                    radius: 0.4,
                    angular_resolution: 10,
                    distance_factor: 2.0 / 1.5e8,
                    parent: None,
                    color_lit: "4c99ff".to_owned(),
                    color_shadow: "00004c".to_owned(),
                },
                BodyConfig {
                    name: "MOON".to_owned(),
                    radius: 0.2,
                    angular_resolution: 30,
                    distance_factor: 1.0 / 4e5,
                    parent: Some("EARTH".to_owned()),
                    color_lit: default_color_lit(),
                    color_shadow: default_color_shadow(),
                },
            ],
        }
    }
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        EphemerisConfig {
            kernels: vec![
                PathBuf::from("kernels/planets.toml"),
                PathBuf::from("kernels/moon.toml"),
            ],
            reference_frame: "ECLIPJ2000".to_owned(),
            aberration_correction: "NONE".to_owned(),
            light_source: "SUN".to_owned(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        AnimationConfig {
            start: "Oct 1, 2018".to_owned(),
            end: "Dec 1, 2018".to_owned(),
            frames: 100,
            export: false,
            output_dir: PathBuf::from("output"),
            repeat: false,
        }
    }
}

impl Default for LightSourceConfig {
    fn default() -> Self {
        LightSourceConfig {
            color: "ffff00".to_owned(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: crate::logging::DEFAULT_FILTER.to_owned(),
        }
    }
}

impl AppConfig {
    /// Reads a config file. Relative kernel paths are resolved against the
    /// file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let mut config: AppConfig =
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for kernel in config.ephemeris.kernels.iter_mut() {
            if kernel.is_relative() {
                *kernel = base.join(&*kernel);
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Builds the body table. Bodies are added in file order, so a parent
    /// must be listed before its children.
    pub fn build_orrery(&self) -> Result<Orrery, ConfigError> {
        let mut orrery = Orrery::new(&self.ephemeris.light_source);
        for body in self.bodies.iter() {
            let info = BodyInfo::new(
                &body.name,
                body.angular_resolution,
                body.radius,
                body.distance_factor,
            )
            .with_colors(parse_color(&body.color_lit)?, parse_color(&body.color_shadow)?);
            orrery.add_body_orbiting(info, body.parent.as_deref())?;
        }
        Ok(orrery)
    }

    pub fn query_frame(&self) -> QueryFrame {
        QueryFrame {
            reference_frame: self.ephemeris.reference_frame.clone(),
            aberration_correction: self.ephemeris.aberration_correction.clone(),
        }
    }

    pub fn light_color(&self) -> Result<Point3<f32>, ConfigError> {
        parse_color(&self.light_source.color)
    }

    /// Converts the animation section's dates with the ephemeris' calendar.
    pub fn scene_config(&self, ephemeris: &dyn Ephemeris) -> Result<SceneConfig, ConfigError> {
        let anim = &self.animation;
        let start = ephemeris
            .time_from_calendar(&anim.start)
            .map_err(|source| ConfigError::Date {
                field: "start",
                source,
            })?;
        let end = ephemeris
            .time_from_calendar(&anim.end)
            .map_err(|source| ConfigError::Date {
                field: "end",
                source,
            })?;
        Ok(SceneConfig {
            start,
            end,
            frames: anim.frames,
            export: anim.export,
            output_dir: anim.output_dir.clone(),
            repeat: anim.repeat,
        })
    }
}

/// Parses `RRGGBB` (an optional leading `#` is allowed) into [0, 1] channels.
pub fn parse_color(s: &str) -> Result<Point3<f32>, ConfigError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(ConfigError::Color(s.to_owned()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map(|c| c as f32 / 255.0)
            .map_err(|_| ConfigError::Color(s.to_owned()))
    };
    Ok(Point3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
