//! The ephemeris source: where bodies are and how they are turned, as a
//! function of time.

use std::path::PathBuf;

use nalgebra::{Matrix3, Rotation3, Vector3};
use thiserror::Error;

mod analytic;
pub mod time;

pub use analytic::AnalyticEphemeris;
pub use time::CalendarFormat;

/// Mean obliquity of the ecliptic at J2000, in degrees.
pub const OBLIQUITY_J2000_DEG: f64 = 23.439_281;

/// Lookup failures. These are per-query and never fatal to the scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EphemerisError {
    #[error("no ephemeris data for body `{0}`")]
    UnknownBody(String),
    #[error("unknown reference frame `{0}`")]
    UnknownFrame(String),
    #[error("body `{body}` has no orientation model")]
    NoOrientation { body: String },
    #[error("body `{body}` is not covered at et {time} (coverage {start} to {end})")]
    OutOfCoverage {
        body: String,
        time: f64,
        start: f64,
        end: f64,
    },
    #[error("aberration correction `{0}` is not supported")]
    UnsupportedCorrection(String),
    #[error("unrecognized calendar date `{0}`")]
    InvalidEpoch(String),
}

/// Failures while loading the kernel set. There is no pose source without
/// one, so these are fatal at startup.
#[derive(Debug, Error)]
pub enum EphemerisInitError {
    #[error("no ephemeris kernels configured")]
    NoKernels,
    #[error("failed to read kernel {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse kernel {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("kernel {path}: {source}")]
    Epoch {
        path: PathBuf,
        #[source]
        source: EphemerisError,
    },
    #[error("body `{0}` is defined more than once")]
    DuplicateBody(String),
    #[error("body `{body}` is centered on unknown body `{center}`")]
    UnknownCenter { body: String, center: String },
    #[error("body `{0}` is part of a cycle of centers")]
    CenterCycle(String),
    #[error("body `{body}` has invalid orbital elements: {reason}")]
    InvalidElements { body: String, reason: &'static str },
}

/// Inertial frames positions and orientations can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InertialFrame {
    /// Earth mean equator and equinox of J2000
    J2000,
    /// Ecliptic and equinox of J2000
    EclipJ2000,
}

impl InertialFrame {
    pub fn parse(name: &str) -> Result<Self, EphemerisError> {
        match name.to_ascii_uppercase().as_str() {
            "J2000" => Ok(InertialFrame::J2000),
            "ECLIPJ2000" => Ok(InertialFrame::EclipJ2000),
            _ => Err(EphemerisError::UnknownFrame(name.to_owned())),
        }
    }

    /// Rotation taking ecliptic J2000 coordinates into this frame.
    pub fn rotation_from_ecliptic(self) -> Rotation3<f64> {
        match self {
            InertialFrame::EclipJ2000 => Rotation3::identity(),
            InertialFrame::J2000 => Rotation3::from_axis_angle(
                &Vector3::x_axis(),
                OBLIQUITY_J2000_DEG.to_radians(),
            ),
        }
    }
}

/// A source of body positions and orientations.
///
/// Implementations are loaded once at startup and then only queried.
pub trait Ephemeris {
    /// Position of `target` relative to `observer` at `time`, expressed in
    /// `reference_frame`. Units are whatever the source uses (km for the
    /// analytic kernels).
    fn position(
        &self,
        target: &str,
        time: f64,
        reference_frame: &str,
        aberration_correction: &str,
        observer: &str,
    ) -> Result<Vector3<f64>, EphemerisError>;

    /// Rotation matrix taking vectors in `inertial_frame` to `body_frame`.
    fn orientation(
        &self,
        inertial_frame: &str,
        body_frame: &str,
        time: f64,
    ) -> Result<Matrix3<f64>, EphemerisError>;

    fn time_from_calendar(&self, date: &str) -> Result<f64, EphemerisError> {
        time::parse_calendar(date)
    }

    fn calendar_from_time(&self, time: f64, format: CalendarFormat) -> String {
        time::format_calendar(time, format)
    }
}
