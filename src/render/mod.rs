//! Everything that turns poses into colored geometry.
//!
//! Renderers draw through the `DrawTarget` trait, so the same code feeds the
//! kiss3d window, the in-memory `FrameRecording` and the PNG exporter.

use nalgebra::Point3;

pub mod body;
pub mod path;
pub mod recording;
pub mod sun;

pub use body::{BodyRenderer, RenderOutcome};
pub use recording::{FrameRecording, Primitive};
pub use sun::SunDisplay;

/// Where renderers put their output. Coordinates are world space, colors are
/// RGB in [0, 1].
pub trait DrawTarget {
    /// A filled, flat-colored polygon. `alpha` is the opacity in [0, 1].
    fn draw_polygon(&mut self, points: &[Point3<f32>], color: Point3<f32>, alpha: f32);

    fn draw_line(&mut self, a: Point3<f32>, b: Point3<f32>, color: Point3<f32>);

    fn draw_quad(&mut self, corners: &[Point3<f32>; 4], color: Point3<f32>) {
        self.draw_polygon(corners, color, 1.0);
    }
}
