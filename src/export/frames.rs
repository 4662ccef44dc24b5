use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::debug;

use super::{create_dir, ExportError};
use crate::render::{FrameRecording, Primitive};

/// Writes recorded frames as PNGs, looking straight down the z axis.
#[derive(Debug, Clone)]
pub struct FrameExporter {
    output_dir: PathBuf,
    size: (u32, u32),
    half_extent: f64,
}

impl FrameExporter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        FrameExporter {
            output_dir: output_dir.into(),
            size: (800, 800),
            half_extent: 3.5,
        }
    }

    pub fn frame_path(&self, frame_index: usize) -> PathBuf {
        self.output_dir.join(format!("frame_{:04}.png", frame_index))
    }

    pub fn write_frame(
        &self,
        recording: &FrameRecording,
        frame_index: usize,
    ) -> Result<PathBuf, ExportError> {
        create_dir(&self.output_dir)?;
        let path = self.frame_path(frame_index);
        draw_recording(&path, recording, self.size, self.half_extent).map_err(|e| {
            ExportError::Plot {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        debug!(path = %path.display(), primitives = recording.len(), "wrote frame");
        Ok(path)
    }
}

fn to_rgb(color: &nalgebra::Point3<f32>) -> RGBColor {
    let channel = |c: f32| (c.max(0.0).min(1.0) * 255.0).round() as u8;
    RGBColor(channel(color.x), channel(color.y), channel(color.z))
}

fn draw_recording(
    path: &Path,
    recording: &FrameRecording,
    size: (u32, u32),
    half_extent: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&BLACK)?;
    let mut chart = ChartBuilder::on(&root)
        .build_cartesian_2d(-half_extent..half_extent, -half_extent..half_extent)?;

    // Dropping z is the orthographic projection onto the xy plane
    for primitive in recording.primitives() {
        match primitive {
            Primitive::Polygon {
                points,
                color,
                alpha,
            } => {
                let points: Vec<(f64, f64)> =
                    points.iter().map(|p| (p.x as f64, p.y as f64)).collect();
                let style = to_rgb(color).mix(*alpha as f64).filled();
                chart.draw_series(std::iter::once(Polygon::new(points, style)))?;
            }
            Primitive::Line { a, b, color } => {
                let points = vec![(a.x as f64, a.y as f64), (b.x as f64, b.y as f64)];
                chart.draw_series(std::iter::once(PathElement::new(
                    points,
                    to_rgb(color).stroke_width(1),
                )))?;
            }
        }
    }

    root.present()?;
    Ok(())
}
