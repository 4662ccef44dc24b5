//! Steps the animation: one time sample per frame, every body drawn at that
//! time, optionally written to disk.

use std::path::PathBuf;

use nalgebra::Point3;
use thiserror::Error;
use tracing::{debug, info};

use crate::ephemeris::time::linspace;
use crate::ephemeris::{CalendarFormat, Ephemeris};
use crate::export::{ExportError, FrameExporter};
use crate::mesh::InvalidMeshParameters;
use crate::orrery::Orrery;
use crate::pose::{FramePoses, QueryFrame};
use crate::render::sun::DEFAULT_RING_COUNT;
use crate::render::{BodyRenderer, FrameRecording, RenderOutcome, SunDisplay};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Ephemeris time of the first frame
    pub start: f64,
    /// Ephemeris time of the last frame
    pub end: f64,
    pub frames: usize,
    /// Write every frame as a PNG into `output_dir`
    pub export: bool,
    pub output_dir: PathBuf,
    /// Start over after the last frame instead of stopping
    pub repeat: bool,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Mesh(#[from] InvalidMeshParameters),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// What happened in one call to `render_frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    pub index: usize,
    pub time: f64,
    pub drawn: usize,
    pub skipped: usize,
    pub exported: Option<PathBuf>,
}

pub struct SceneDriver {
    orrery: Orrery,
    ephemeris: Box<dyn Ephemeris>,
    config: SceneConfig,
    times: Vec<f64>,
    next_frame: usize,
    body_renderer: BodyRenderer,
    sun: SunDisplay,
    poses: FramePoses,
    recording: FrameRecording,
    exporter: Option<FrameExporter>,
}

impl SceneDriver {
    pub fn new(
        orrery: Orrery,
        ephemeris: Box<dyn Ephemeris>,
        config: SceneConfig,
        query_frame: QueryFrame,
        light_color: Point3<f32>,
    ) -> Self {
        let times = linspace(config.start, config.end, config.frames);
        let exporter = if config.export {
            Some(FrameExporter::new(config.output_dir.clone()))
        } else {
            None
        };
        info!(
            bodies = orrery.len(),
            frames = times.len(),
            start = %ephemeris.calendar_from_time(config.start, CalendarFormat::Calendar),
            end = %ephemeris.calendar_from_time(config.end, CalendarFormat::Calendar),
            export = config.export,
            "scene ready"
        );

        SceneDriver {
            orrery,
            ephemeris,
            config,
            times,
            next_frame: 0,
            body_renderer: BodyRenderer::new(query_frame),
            sun: SunDisplay::new(light_color, DEFAULT_RING_COUNT),
            poses: FramePoses::new(),
            recording: FrameRecording::new(),
            exporter,
        }
    }

    pub fn orrery(&self) -> &Orrery {
        &self.orrery
    }

    pub fn ephemeris(&self) -> &dyn Ephemeris {
        self.ephemeris.as_ref()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// The most recently rendered frame.
    pub fn recording(&self) -> &FrameRecording {
        &self.recording
    }

    /// Poses of the bodies drawn in the most recent frame.
    pub fn poses(&self) -> &FramePoses {
        &self.poses
    }

    /// True once the last sample has been drawn and the scene doesn't repeat.
    pub fn is_finished(&self) -> bool {
        self.next_frame >= self.times.len() && !(self.config.repeat && !self.times.is_empty())
    }

    /// Calendar label for the most recent frame.
    pub fn time_label(&self) -> Option<String> {
        self.poses
            .time()
            .map(|t| self.ephemeris.calendar_from_time(t, CalendarFormat::Calendar))
    }

    /// The next `render_frame` starts over from the first sample.
    pub fn rewind(&mut self) {
        debug!("rewinding animation");
        self.next_frame = 0;
    }

    /// Draws the next time sample into the frame recording. Returns `None`
    /// when there is nothing left to draw.
    pub fn render_frame(&mut self) -> Result<Option<FrameSummary>, SceneError> {
        if self.next_frame >= self.times.len() {
            if self.config.repeat && !self.times.is_empty() {
                debug!("restarting animation");
                self.next_frame = 0;
            } else {
                return Ok(None);
            }
        }

        let index = self.next_frame;
        let time = self.times[index];
        self.next_frame += 1;

        self.poses.begin_frame(time);
        self.recording.clear();
        self.sun.draw(&mut self.recording);

        let (mut drawn, mut skipped) = (0, 0);
        for body in self.orrery.bodies() {
            let outcome = self.body_renderer.render(
                &self.orrery,
                self.ephemeris.as_ref(),
                body.id,
                time,
                &mut self.recording,
            )?;
            match outcome {
                RenderOutcome::Drawn(pose) => {
                    self.poses.insert(body.id, pose);
                    drawn += 1;
                }
                RenderOutcome::Skipped(_) => skipped += 1,
            }
        }

        let exported = match &self.exporter {
            Some(exporter) => Some(exporter.write_frame(&self.recording, index)?),
            None => None,
        };

        debug!(index, time, drawn, skipped, "rendered frame");
        Ok(Some(FrameSummary {
            index,
            time,
            drawn,
            skipped,
            exported,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::tests::{earth_moon_orrery, StubEphemeris};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn config(frames: usize, repeat: bool) -> SceneConfig {
        SceneConfig {
            start: 0.0,
            end: 10.0,
            frames,
            export: false,
            output_dir: PathBuf::from("unused"),
            repeat,
        }
    }

    fn driver(eph: StubEphemeris, frames: usize, repeat: bool) -> SceneDriver {
        let (orrery, _, _) = earth_moon_orrery();
        SceneDriver::new(
            orrery,
            Box::new(eph),
            config(frames, repeat),
            QueryFrame::default(),
            Point3::new(1.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_runs_every_sample_once() {
        let mut scene = driver(StubEphemeris::earth_moon(), 3, false);
        assert_eq!(scene.times(), &[0.0, 5.0, 10.0]);

        let mut seen = vec![];
        while let Some(summary) = scene.render_frame().unwrap() {
            assert_eq!(summary.drawn, 2);
            assert_eq!(summary.skipped, 0);
            assert_eq!(summary.exported, None);
            seen.push(summary.time);
        }
        assert_eq!(seen, vec![0.0, 5.0, 10.0]);
        assert!(scene.is_finished());
        assert_eq!(scene.render_frame().unwrap(), None);
    }

    #[test]
    fn test_frame_contents() {
        let mut scene = driver(StubEphemeris::earth_moon(), 1, false);
        scene.render_frame().unwrap();

        // Sun rings, then 18x36 earth quads + edges, then 6x12 moon quads + edges
        let rec = scene.recording();
        assert_eq!(rec.polygons().count(), DEFAULT_RING_COUNT + 648 + 72);
        assert_eq!(rec.lines().count(), 4 * 648 + 4 * 72);

        let (earth, moon) = (
            scene.orrery().find_body("EARTH").unwrap().id,
            scene.orrery().find_body("MOON").unwrap().id,
        );
        assert_relative_eq!(
            scene.poses().get(earth).unwrap().position,
            Vector3::new(2.0, 0.0, 0.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            scene.poses().get(moon).unwrap().position,
            Vector3::new(2.0, 1.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_unavailable_body_is_skipped() {
        let mut eph = StubEphemeris::earth_moon();
        eph.oriented = vec!["IAU_EARTH".to_owned()];
        let mut scene = driver(eph, 2, false);

        let summary = scene.render_frame().unwrap().unwrap();
        assert_eq!(summary.drawn, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(scene.poses().len(), 1);
        assert_eq!(
            scene.recording().polygons().count(),
            DEFAULT_RING_COUNT + 648
        );
    }

    #[test]
    fn test_repeat_wraps_around() {
        let mut scene = driver(StubEphemeris::earth_moon(), 2, true);
        let indices: Vec<_> = (0..5)
            .map(|_| scene.render_frame().unwrap().unwrap().index)
            .collect();
        assert_eq!(indices, vec![0, 1, 0, 1, 0]);
        assert!(!scene.is_finished());
    }

    #[test]
    fn test_rewind() {
        let mut scene = driver(StubEphemeris::earth_moon(), 2, false);
        scene.render_frame().unwrap();
        scene.render_frame().unwrap();
        assert!(scene.is_finished());

        scene.rewind();
        assert!(!scene.is_finished());
        assert_eq!(scene.render_frame().unwrap().unwrap().index, 0);
    }

    #[test]
    fn test_no_samples() {
        let mut scene = driver(StubEphemeris::earth_moon(), 0, true);
        assert!(scene.is_finished());
        assert_eq!(scene.render_frame().unwrap(), None);
        assert_eq!(scene.time_label(), None);
    }

    #[test]
    fn test_exports_frames() {
        let dir = tempfile::tempdir().unwrap();
        let (orrery, _, _) = earth_moon_orrery();
        let mut config = config(2, false);
        config.export = true;
        config.output_dir = dir.path().to_owned();
        let mut scene = SceneDriver::new(
            orrery,
            Box::new(StubEphemeris::earth_moon()),
            config,
            QueryFrame::default(),
            Point3::new(1.0, 1.0, 0.0),
        );

        let first = scene.render_frame().unwrap().unwrap();
        assert_eq!(first.exported, Some(dir.path().join("frame_0000.png")));
        scene.render_frame().unwrap();
        assert!(dir.path().join("frame_0001.png").exists());
    }
}
