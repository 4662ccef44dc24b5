use kiss3d::camera::Camera;
use kiss3d::renderer::{LineRenderer, Renderer};
use nalgebra::Point3;

use self::face_renderer::FaceRenderer;
use crate::render::DrawTarget;

mod face_renderer;

/// Collects a frame's draw calls and flushes them to the GPU when kiss3d
/// renders. Faces go first, so wireframes land on top of them.
pub struct CompoundRenderer {
    face_renderer: FaceRenderer,
    line_renderer: LineRenderer,
}

impl CompoundRenderer {
    pub fn new() -> Self {
        CompoundRenderer {
            face_renderer: FaceRenderer::new(),
            line_renderer: LineRenderer::new(),
        }
    }
}

impl DrawTarget for CompoundRenderer {
    fn draw_polygon(&mut self, points: &[Point3<f32>], color: Point3<f32>, alpha: f32) {
        self.face_renderer.add_polygon(points, color, alpha);
    }

    fn draw_line(&mut self, a: Point3<f32>, b: Point3<f32>, color: Point3<f32>) {
        self.line_renderer.draw_line(a, b, color);
    }
}

impl Renderer for CompoundRenderer {
    fn render(&mut self, pass: usize, camera: &mut dyn Camera) {
        self.face_renderer.render(pass, camera);
        self.line_renderer.render(pass, camera);
    }
}
