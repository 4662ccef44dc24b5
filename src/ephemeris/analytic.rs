use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::Deserialize;
use tracing::{debug, info};

use super::time::{parse_calendar, SECONDS_PER_DAY};
use super::{Ephemeris, EphemerisError, EphemerisInitError, InertialFrame};
use crate::math::anomaly::mean_to_true;
use crate::math::geometry::rotation_from_angles;

// On-disk kernel layout

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KernelFile {
    coverage: CoverageRecord,
    #[serde(default)]
    bodies: Vec<BodyRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CoverageRecord {
    start: String,
    end: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BodyRecord {
    name: String,
    center: Option<String>,
    #[serde(default)]
    semimajor_axis_km: f64,
    #[serde(default)]
    eccentricity: f64,
    #[serde(default)]
    inclination_deg: f64,
    #[serde(default)]
    long_asc_node_deg: f64,
    #[serde(default)]
    arg_periapsis_deg: f64,
    #[serde(default)]
    mean_anomaly_deg: f64,
    period_days: Option<f64>,
    epoch: Option<String>,
    rotation: Option<RotationRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RotationRecord {
    pole_ra_deg: f64,
    pole_dec_deg: f64,
    prime_meridian_deg: f64,
    rotation_deg_per_day: f64,
}

// Runtime model

/// Keplerian orbit around the body's center, elements in ecliptic J2000.
#[derive(Debug, Clone)]
struct KeplerOrbit {
    semimajor_axis: f64,
    eccentricity: f64,
    rotation: Rotation3<f64>,
    mean_anomaly_at_epoch: f64,
    mean_motion: f64, // rad/s
    epoch: f64,
}

/// IAU-style rotation model: fixed pole, linearly advancing prime meridian.
#[derive(Debug, Clone)]
struct RotationModel {
    pole_ra: f64,
    pole_dec: f64,
    prime_meridian: f64,
    rate: f64, // rad/day
}

#[derive(Debug, Clone)]
struct BodyEntry {
    name: String,
    center: Option<usize>,
    orbit: Option<KeplerOrbit>,
    rotation: Option<RotationModel>,
    coverage: (f64, f64),
}

/// An ephemeris computed from Keplerian elements and IAU rotation models,
/// read from a set of TOML kernel files.
///
/// Bodies form a tree: each body's orbit is relative to its `center`, and
/// exactly the bodies without a center sit at the origin. Positions between
/// any two bodies are differences of their origin-relative positions.
#[derive(Debug, Clone)]
pub struct AnalyticEphemeris {
    bodies: Vec<BodyEntry>,
}

impl KeplerOrbit {
    fn position_at(&self, time: f64) -> Vector3<f64> {
        let mean_anomaly = self.mean_anomaly_at_epoch + self.mean_motion * (time - self.epoch);
        // Keep M in [-pi, pi) so the anomaly conversions stay well-conditioned
        let mean_anomaly = (mean_anomaly + PI).rem_euclid(TAU) - PI;
        let e = self.eccentricity;
        let theta = mean_to_true(mean_anomaly, e);
        let radius = self.semimajor_axis * (1.0 - e * e) / (1.0 + e * theta.cos());
        self.rotation * Vector3::new(radius * theta.cos(), radius * theta.sin(), 0.0)
    }
}

impl RotationModel {
    /// Rotation from the J2000 equatorial frame to the body-fixed frame.
    fn equatorial_to_body(&self, time: f64) -> Rotation3<f64> {
        let days = time / SECONDS_PER_DAY;
        let w = self.prime_meridian + self.rate * days;
        // Bring the pole to +z, then spin the prime meridian into +x.
        Rotation3::from_axis_angle(&Vector3::z_axis(), -w)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), -(FRAC_PI_2 - self.pole_dec))
            * Rotation3::from_axis_angle(&Vector3::z_axis(), -(FRAC_PI_2 + self.pole_ra))
    }
}

impl AnalyticEphemeris {
    /// Loads every kernel in order. Body names must be unique across the set.
    pub fn load<P: AsRef<Path>>(kernels: &[P]) -> Result<Self, EphemerisInitError> {
        let mut sources = Vec::with_capacity(kernels.len());
        for path in kernels {
            let path = path.as_ref();
            let text = fs::read_to_string(path).map_err(|source| EphemerisInitError::Io {
                path: path.to_owned(),
                source,
            })?;
            sources.push((path.to_owned(), text));
        }
        let ephemeris = Self::from_sources(&sources)?;
        info!(
            kernels = kernels.len(),
            bodies = ephemeris.bodies.len(),
            "loaded ephemeris kernels"
        );
        Ok(ephemeris)
    }

    /// Builds an ephemeris from kernel texts. The paths are only used in
    /// error messages.
    pub fn from_sources(sources: &[(PathBuf, String)]) -> Result<Self, EphemerisInitError> {
        if sources.is_empty() {
            return Err(EphemerisInitError::NoKernels);
        }

        let mut records = vec![];
        for (path, text) in sources {
            let kernel: KernelFile =
                toml::from_str(text).map_err(|source| EphemerisInitError::Parse {
                    path: path.clone(),
                    source,
                })?;
            let epoch_err = |source| EphemerisInitError::Epoch {
                path: path.clone(),
                source,
            };
            let coverage = (
                parse_calendar(&kernel.coverage.start).map_err(epoch_err)?,
                parse_calendar(&kernel.coverage.end).map_err(epoch_err)?,
            );
            debug!(path = %path.display(), bodies = kernel.bodies.len(), "parsed kernel");
            for body in kernel.bodies {
                let epoch = match &body.epoch {
                    Some(s) => parse_calendar(s).map_err(epoch_err)?,
                    None => 0.0,
                };
                records.push((body, coverage, epoch));
            }
        }

        let mut index = HashMap::new();
        for (i, (body, _, _)) in records.iter().enumerate() {
            if index.insert(body.name.to_ascii_uppercase(), i).is_some() {
                return Err(EphemerisInitError::DuplicateBody(body.name.clone()));
            }
        }

        let mut bodies = Vec::with_capacity(records.len());
        for (body, coverage, epoch) in records {
            bodies.push(Self::build_entry(body, coverage, epoch, &index)?);
        }

        let ephemeris = AnalyticEphemeris { bodies };
        ephemeris.check_acyclic()?;
        Ok(ephemeris)
    }

    fn build_entry(
        body: BodyRecord,
        coverage: (f64, f64),
        epoch: f64,
        index: &HashMap<String, usize>,
    ) -> Result<BodyEntry, EphemerisInitError> {
        let invalid = |reason| EphemerisInitError::InvalidElements {
            body: body.name.clone(),
            reason,
        };

        let (center, orbit) = match &body.center {
            None => (None, None),
            Some(center) => {
                let center_idx = match index.get(&center.to_ascii_uppercase()) {
                    Some(&idx) => idx,
                    None => {
                        return Err(EphemerisInitError::UnknownCenter {
                            body: body.name.clone(),
                            center: center.clone(),
                        })
                    }
                };
                if !(0.0..1.0).contains(&body.eccentricity) {
                    return Err(invalid("eccentricity must be in [0, 1)"));
                }
                if !(body.semimajor_axis_km > 0.0 && body.semimajor_axis_km.is_finite()) {
                    return Err(invalid("semimajor axis must be positive and finite"));
                }
                let angles = [
                    body.inclination_deg,
                    body.long_asc_node_deg,
                    body.arg_periapsis_deg,
                    body.mean_anomaly_deg,
                ];
                if !angles.iter().all(|a| a.is_finite()) {
                    return Err(invalid("orbital angles must be finite"));
                }
                let period = match body.period_days {
                    Some(p) if p > 0.0 && p.is_finite() => p,
                    Some(_) => return Err(invalid("period must be positive and finite")),
                    None => return Err(invalid("orbiting bodies need a period")),
                };
                let mean_motion = TAU / (period * SECONDS_PER_DAY);
                if !mean_motion.is_finite() {
                    return Err(invalid("period is too short"));
                }
                let orbit = KeplerOrbit {
                    semimajor_axis: body.semimajor_axis_km,
                    eccentricity: body.eccentricity,
                    rotation: rotation_from_angles(
                        body.inclination_deg.to_radians(),
                        body.long_asc_node_deg.to_radians(),
                        body.arg_periapsis_deg.to_radians(),
                    ),
                    mean_anomaly_at_epoch: body.mean_anomaly_deg.to_radians(),
                    mean_motion,
                    epoch,
                };
                (Some(center_idx), Some(orbit))
            }
        };

        let rotation = match &body.rotation {
            None => None,
            Some(r) => {
                let angles = [
                    r.pole_ra_deg,
                    r.pole_dec_deg,
                    r.prime_meridian_deg,
                    r.rotation_deg_per_day,
                ];
                if !angles.iter().all(|a| a.is_finite()) {
                    return Err(invalid("rotation model must be finite"));
                }
                Some(RotationModel {
                    pole_ra: r.pole_ra_deg.to_radians(),
                    pole_dec: r.pole_dec_deg.to_radians(),
                    prime_meridian: r.prime_meridian_deg.to_radians(),
                    rate: r.rotation_deg_per_day.to_radians(),
                })
            }
        };

        Ok(BodyEntry {
            name: body.name,
            center,
            orbit,
            rotation,
            coverage,
        })
    }

    fn check_acyclic(&self) -> Result<(), EphemerisInitError> {
        for (i, body) in self.bodies.iter().enumerate() {
            let mut current = Some(i);
            for _ in 0..=self.bodies.len() {
                current = match current {
                    Some(idx) => self.bodies[idx].center,
                    None => break,
                };
            }
            if current.is_some() {
                return Err(EphemerisInitError::CenterCycle(body.name.clone()));
            }
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<usize, EphemerisError> {
        self.bodies
            .iter()
            .position(|b| b.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| EphemerisError::UnknownBody(name.to_owned()))
    }

    fn check_coverage(&self, idx: usize, time: f64) -> Result<(), EphemerisError> {
        let body = &self.bodies[idx];
        let (start, end) = body.coverage;
        if start <= time && time <= end {
            Ok(())
        } else {
            Err(EphemerisError::OutOfCoverage {
                body: body.name.clone(),
                time,
                start,
                end,
            })
        }
    }

    /// Position relative to the root of the body's tree, in ecliptic J2000.
    fn root_position(&self, idx: usize, time: f64) -> Result<Vector3<f64>, EphemerisError> {
        let mut position = Vector3::zeros();
        let mut current = Some(idx);
        while let Some(i) = current {
            self.check_coverage(i, time)?;
            let body = &self.bodies[i];
            if let Some(orbit) = &body.orbit {
                position += orbit.position_at(time);
            }
            current = body.center;
        }
        Ok(position)
    }
}

impl Ephemeris for AnalyticEphemeris {
    fn position(
        &self,
        target: &str,
        time: f64,
        reference_frame: &str,
        aberration_correction: &str,
        observer: &str,
    ) -> Result<Vector3<f64>, EphemerisError> {
        if !aberration_correction.eq_ignore_ascii_case("NONE") {
            return Err(EphemerisError::UnsupportedCorrection(
                aberration_correction.to_owned(),
            ));
        }
        let frame = InertialFrame::parse(reference_frame)?;
        let target = self.lookup(target)?;
        let observer = self.lookup(observer)?;

        let relative = self.root_position(target, time)? - self.root_position(observer, time)?;
        Ok(frame.rotation_from_ecliptic() * relative)
    }

    fn orientation(
        &self,
        inertial_frame: &str,
        body_frame: &str,
        time: f64,
    ) -> Result<Matrix3<f64>, EphemerisError> {
        let frame = InertialFrame::parse(inertial_frame)?;
        let unknown_frame = || EphemerisError::UnknownFrame(body_frame.to_owned());
        let prefix = body_frame.get(..4).ok_or_else(unknown_frame)?;
        if !prefix.eq_ignore_ascii_case("IAU_") {
            return Err(unknown_frame());
        }
        let idx = self.lookup(&body_frame[4..]).map_err(|_| unknown_frame())?;
        self.check_coverage(idx, time)?;

        let body = &self.bodies[idx];
        let model = body
            .rotation
            .as_ref()
            .ok_or_else(|| EphemerisError::NoOrientation {
                body: body.name.clone(),
            })?;

        // inertial -> ecliptic -> equatorial -> body-fixed
        let to_body = model.equatorial_to_body(time)
            * InertialFrame::J2000.rotation_from_ecliptic()
            * frame.rotation_from_ecliptic().inverse();
        Ok(to_body.into_inner())
    }
}
