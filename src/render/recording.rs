use nalgebra::Point3;

use super::DrawTarget;

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Polygon {
        points: Vec<Point3<f32>>,
        color: Point3<f32>,
        alpha: f32,
    },
    Line {
        a: Point3<f32>,
        b: Point3<f32>,
        color: Point3<f32>,
    },
}

/// A frame's draw calls, in order. Replaying it into another target
/// reproduces the frame exactly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameRecording {
    primitives: Vec<Primitive>,
}

impl FrameRecording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn polygons(&self) -> impl Iterator<Item = (&[Point3<f32>], Point3<f32>, f32)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Polygon {
                points,
                color,
                alpha,
            } => Some((points.as_slice(), *color, *alpha)),
            Primitive::Line { .. } => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Point3<f32>, Point3<f32>, Point3<f32>)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Line { a, b, color } => Some((*a, *b, *color)),
            Primitive::Polygon { .. } => None,
        })
    }

    pub fn replay(&self, target: &mut dyn DrawTarget) {
        for primitive in self.primitives.iter() {
            match primitive {
                Primitive::Polygon {
                    points,
                    color,
                    alpha,
                } => target.draw_polygon(points, *color, *alpha),
                Primitive::Line { a, b, color } => target.draw_line(*a, *b, *color),
            }
        }
    }
}

impl DrawTarget for FrameRecording {
    fn draw_polygon(&mut self, points: &[Point3<f32>], color: Point3<f32>, alpha: f32) {
        self.primitives.push(Primitive::Polygon {
            points: points.to_vec(),
            color,
            alpha,
        });
    }

    fn draw_line(&mut self, a: Point3<f32>, b: Point3<f32>, color: Point3<f32>) {
        self.primitives.push(Primitive::Line { a, b, color });
    }
}
