use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::{create_dir, ExportError};
use crate::ephemeris::{CalendarFormat, Ephemeris};

pub const TIMESTAMPS_FILE: &str = "timestamps.txt";

/// What to sample: a time range and the (target, observer) pairs to sample
/// over it.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRequest {
    pub start: f64,
    pub end: f64,
    pub steps: usize,
    pub pairs: Vec<(String, String)>,
    pub reference_frame: String,
    pub aberration_correction: String,
}

impl PositionRequest {
    /// The moon seen from the earth and the earth seen from the sun, in the
    /// equatorial J2000 frame.
    pub fn new(start: f64, end: f64, steps: usize) -> Self {
        PositionRequest {
            start,
            end,
            steps,
            pairs: vec![
                ("MOON".to_owned(), "EARTH".to_owned()),
                ("EARTH".to_owned(), "SUN".to_owned()),
            ],
            reference_frame: "J2000".to_owned(),
            aberration_correction: "NONE".to_owned(),
        }
    }

    /// `steps` samples starting at `start`. The end of the range itself is
    /// not sampled.
    pub fn sample_times(&self) -> Vec<f64> {
        let step = (self.end - self.start) / self.steps as f64;
        (0..self.steps)
            .map(|k| self.start + k as f64 * step)
            .collect()
    }
}

pub fn positions_file_name(target: &str, observer: &str) -> String {
    format!("{}_{}_positions.txt", target, observer)
}

/// Samples every pair in the request and writes one `x, y, z` file per pair
/// plus a shared timestamp file. Returns the paths written, timestamps first.
pub fn export_positions(
    ephemeris: &dyn Ephemeris,
    request: &PositionRequest,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    let times = request.sample_times();

    // Query everything before touching the disk so a bad pair leaves no
    // partial output behind
    let mut tables = Vec::with_capacity(request.pairs.len());
    for (target, observer) in request.pairs.iter() {
        let rows = times
            .iter()
            .map(|&t| {
                ephemeris.position(
                    target,
                    t,
                    &request.reference_frame,
                    &request.aberration_correction,
                    observer,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        tables.push((positions_file_name(target, observer), rows));
    }

    create_dir(output_dir)?;
    let mut written = Vec::with_capacity(tables.len() + 1);

    let path = output_dir.join(TIMESTAMPS_FILE);
    write_lines(&path, times.iter().map(|&t| {
        ephemeris.calendar_from_time(t, CalendarFormat::Compact)
    }))?;
    written.push(path);

    for (name, rows) in tables {
        let path = output_dir.join(name);
        write_lines(
            &path,
            rows.iter()
                .map(|p| format!("{:.8}, {:.8}, {:.8}", p.x, p.y, p.z)),
        )?;
        written.push(path);
    }

    info!(
        dir = %output_dir.display(),
        samples = times.len(),
        files = written.len(),
        "exported positions"
    );
    Ok(written)
}

fn write_lines<I: Iterator<Item = String>>(path: &Path, lines: I) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_owned(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
    for line in lines {
        writeln!(out, "{}", line).map_err(io_err)?;
    }
    out.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::tests::StubEphemeris;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use std::fs;

    #[test]
    fn test_sample_times_exclude_end() {
        let request = PositionRequest::new(0.0, 100.0, 4);
        assert_eq!(request.sample_times(), vec![0.0, 25.0, 50.0, 75.0]);
        assert!(PositionRequest::new(0.0, 100.0, 0).sample_times().is_empty());
    }

    #[test]
    fn test_export_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("data");
        let mut eph = StubEphemeris::earth_moon();
        eph.positions.insert(
            ("EARTH".to_owned(), "SUN".to_owned()),
            Vector3::new(1.5e8, -2.0, 0.25),
        );

        let start = eph.time_from_calendar("20181001").unwrap();
        let end = eph.time_from_calendar("20181002").unwrap();
        let request = PositionRequest::new(start, end, 4);
        let written = export_positions(&eph, &request, &out).unwrap();

        assert_eq!(
            written,
            vec![
                out.join("timestamps.txt"),
                out.join("MOON_EARTH_positions.txt"),
                out.join("EARTH_SUN_positions.txt"),
            ]
        );

        let stamps = fs::read_to_string(&written[0]).unwrap();
        let stamps: Vec<_> = stamps.lines().collect();
        assert_eq!(
            stamps,
            vec!["20181001000000", "20181001060000", "20181001120000", "20181001180000"]
        );

        let earth = fs::read_to_string(&written[2]).unwrap();
        assert_eq!(earth.lines().count(), 4);
        let first: Vec<f64> = earth
            .lines()
            .next()
            .unwrap()
            .split(", ")
            .map(|s| s.parse().unwrap())
            .collect();
        assert_relative_eq!(first[0], 1.5e8);
        assert_relative_eq!(first[1], -2.0);
        assert_relative_eq!(first[2], 0.25);
    }

    #[test]
    fn test_failed_query_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("data");
        let eph = StubEphemeris::earth_moon();
        let mut request = PositionRequest::new(0.0, 10.0, 2);
        request.pairs.push(("MARS".to_owned(), "SUN".to_owned()));

        let err = export_positions(&eph, &request, &out).unwrap_err();
        assert!(matches!(err, ExportError::Ephemeris(_)));
        assert!(!out.exists());
    }
}
