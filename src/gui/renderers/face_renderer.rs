use kiss3d::camera::Camera;
use kiss3d::context::Context;
use kiss3d::renderer::Renderer;
use kiss3d::resource::{
    AllocationType, BufferType, Effect, GPUVec, ShaderAttribute, ShaderUniform,
};

use nalgebra::{Matrix4, Point3};

struct FaceBatch {
    // Triangles, stored as (pt, color, pt, color, ...)
    triangles: Vec<Point3<f32>>,
    alpha: f32,
}

/// Filled flat-colored polygons with a per-batch opacity. Consecutive
/// polygons sharing an opacity are drawn with a single call.
pub struct FaceRenderer {
    // OpenGL stuff
    shader: Effect,
    pos: ShaderAttribute<Point3<f32>>,
    color: ShaderAttribute<Point3<f32>>,
    alpha: ShaderUniform<f32>,
    view: ShaderUniform<Matrix4<f32>>,
    proj: ShaderUniform<Matrix4<f32>>,
    // Data storage
    batches: Vec<FaceBatch>,
}

impl FaceRenderer {
    pub fn new() -> Self {
        let mut shader = Effect::new_from_str(VERTEX_SRC, FRAGMENT_SRC);

        shader.use_program();

        FaceRenderer {
            pos: shader
                .get_attrib::<Point3<f32>>("position")
                .expect("Failed to get shader attribute."),
            color: shader
                .get_attrib::<Point3<f32>>("color")
                .expect("Failed to get shader attribute."),
            alpha: shader
                .get_uniform::<f32>("alpha")
                .expect("Failed to get shader uniform."),
            view: shader
                .get_uniform::<Matrix4<f32>>("view")
                .expect("Failed to get shader uniform."),
            proj: shader
                .get_uniform::<Matrix4<f32>>("proj")
                .expect("Failed to get shader uniform."),
            shader,
            batches: vec![],
        }
    }

    pub fn add_polygon(&mut self, points: &[Point3<f32>], color: Point3<f32>, alpha: f32) {
        if points.len() < 3 {
            return;
        }

        let start_new = match self.batches.last() {
            Some(batch) => batch.alpha != alpha,
            None => true,
        };
        if start_new {
            self.batches.push(FaceBatch {
                triangles: vec![],
                alpha,
            });
        }
        let batch = match self.batches.last_mut() {
            Some(batch) => batch,
            None => return,
        };

        // Fan around the first corner; the polygons we get are convex
        for pts in points[1..].windows(2) {
            batch.triangles.push(points[0]);
            batch.triangles.push(color);
            batch.triangles.push(pts[0]);
            batch.triangles.push(color);
            batch.triangles.push(pts[1]);
            batch.triangles.push(color);
        }
    }
}

impl Renderer for FaceRenderer {
    fn render(&mut self, pass: usize, camera: &mut dyn Camera) {
        if self.batches.is_empty() {
            return;
        }

        self.shader.use_program();
        self.pos.enable();
        self.color.enable();

        camera.upload(pass, &mut self.proj, &mut self.view);

        let ctxt = Context::get();
        ctxt.enable(Context::BLEND);
        ctxt.blend_func_separate(
            Context::SRC_ALPHA,
            Context::ONE_MINUS_SRC_ALPHA,
            Context::ONE,
            Context::ONE_MINUS_SRC_ALPHA,
        );

        for batch in self.batches.drain(..) {
            let num_vertices = (batch.triangles.len() / 2) as i32;
            let mut buffer =
                GPUVec::new(batch.triangles, BufferType::Array, AllocationType::StreamDraw);
            self.pos.bind_sub_buffer(&mut buffer, 1, 0);
            self.color.bind_sub_buffer(&mut buffer, 1, 1);
            self.alpha.upload(&batch.alpha);

            // Translucent layers are painted in order, without depth testing
            let translucent = batch.alpha < 1.0;
            if translucent {
                ctxt.disable(Context::DEPTH_TEST);
            }
            ctxt.draw_arrays(Context::TRIANGLES, 0, num_vertices);
            if translucent {
                ctxt.enable(Context::DEPTH_TEST);
            }
        }

        ctxt.disable(Context::BLEND);
        self.pos.disable();
        self.color.disable();
    }
}

static VERTEX_SRC: &str = "#version 100
    attribute vec3 position;
    attribute vec3 color;
    varying   vec3 vColor;
    uniform   mat4 proj;
    uniform   mat4 view;
    void main() {
        gl_Position = proj * view * vec4(position, 1.0);
        vColor = color;
    }";

static FRAGMENT_SRC: &str = "#version 100
#ifdef GL_FRAGMENT_PRECISION_HIGH
   precision highp float;
#else
   precision mediump float;
#endif

    varying vec3 vColor;
    uniform float alpha;
    void main() {
        gl_FragColor = vec4(vColor, alpha);
    }";
