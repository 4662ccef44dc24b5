use nalgebra::{Point3, Vector3};
use tracing::warn;

use crate::ephemeris::Ephemeris;
use crate::illumination::is_lit;
use crate::mesh::{InvalidMeshParameters, MeshCache};
use crate::orrery::{Body, BodyID, Orrery};
use crate::pose::{self, Pose, PoseUnavailable, QueryFrame};

use super::DrawTarget;

const EDGE_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Drawn(Pose),
    /// Nothing was drawn; the body sits this frame out.
    Skipped(PoseUnavailable),
}

/// Draws bodies as lit/shadowed graticule quads with a wireframe on top.
#[derive(Debug, Default)]
pub struct BodyRenderer {
    meshes: MeshCache,
    frame: QueryFrame,
}

impl BodyRenderer {
    pub fn new(frame: QueryFrame) -> Self {
        BodyRenderer {
            meshes: MeshCache::new(),
            frame,
        }
    }

    pub fn mesh_cache(&self) -> &MeshCache {
        &self.meshes
    }

    pub fn render(
        &mut self,
        orrery: &Orrery,
        ephemeris: &dyn Ephemeris,
        id: BodyID,
        time: f64,
        target: &mut dyn DrawTarget,
    ) -> Result<RenderOutcome, InvalidMeshParameters> {
        let pose = match pose::resolve(orrery, ephemeris, id, time, &self.frame) {
            Ok(pose) => pose,
            Err(err) => {
                warn!("skipping body: {}", err);
                return Ok(RenderOutcome::Skipped(err));
            }
        };
        self.render_posed(orrery.get_body(id), &pose, target)?;
        Ok(RenderOutcome::Drawn(pose))
    }

    /// Draws a body at a pose the caller already resolved.
    pub fn render_posed(
        &mut self,
        body: &Body,
        pose: &Pose,
        target: &mut dyn DrawTarget,
    ) -> Result<(), InvalidMeshParameters> {
        let info = &body.info;
        let mesh = self
            .meshes
            .get_or_build(info.radius, info.angular_resolution)?;

        // Row vector times orientation, i.e. the transpose acting on columns
        let world: Vec<Point3<f32>> = mesh
            .vertices()
            .iter()
            .map(|v| {
                let p: Vector3<f64> = pose.orientation.tr_mul(&v.coords) + pose.position;
                Point3::from(nalgebra::convert::<Vector3<f64>, Vector3<f32>>(p))
            })
            .collect();

        for face in mesh.faces() {
            let local = mesh.representative_vertex(face);
            let color = if is_lit(&local.coords, &pose.position) {
                info.color_lit
            } else {
                info.color_shadow
            };
            let corners = [
                world[face[0]],
                world[face[1]],
                world[face[2]],
                world[face[3]],
            ];
            target.draw_quad(&corners, color);
        }

        let edge_color = Point3::from(EDGE_COLOR);
        for edge in mesh.edges() {
            target.draw_line(world[edge[0]], world[edge[1]], edge_color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orrery::{BodyInfo, Parent};
    use crate::pose::tests::{earth_moon_orrery, StubEphemeris};
    use crate::render::FrameRecording;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Rotation3};

    fn lit() -> Point3<f32> {
        Point3::new(1.0, 0.0, 0.0)
    }

    fn shadow() -> Point3<f32> {
        Point3::new(0.0, 0.0, 1.0)
    }

    fn single_body(resolution: u32) -> Orrery {
        let mut orrery = Orrery::new("SUN");
        orrery
            .add_body(
                BodyInfo::new("EARTH", resolution, 0.4, 2.0 / 1.5e8).with_colors(lit(), shadow()),
                Parent::LightSource,
            )
            .unwrap();
        orrery
    }

    #[test]
    fn test_counts_and_order() {
        let orrery = single_body(30);
        let body = orrery.get_body(BodyID(0));
        let pose = Pose {
            position: Vector3::new(2.0, 0.0, 0.0),
            orientation: Matrix3::identity(),
        };
        let mut rec = FrameRecording::new();
        let mut renderer = BodyRenderer::default();
        renderer.render_posed(body, &pose, &mut rec).unwrap();

        assert_eq!(rec.polygons().count(), 72);
        assert_eq!(rec.lines().count(), 288);
        // Every quad comes before the wireframe
        let first_line = rec
            .primitives()
            .iter()
            .position(|p| matches!(p, crate::render::Primitive::Line { .. }))
            .unwrap();
        assert_eq!(first_line, 72);
        for (_, _, color) in rec.lines() {
            assert_eq!(color, Point3::new(1.0, 1.0, 1.0));
        }
    }

    #[test]
    fn test_faces_towards_light_are_lit() {
        let orrery = single_body(10);
        let body = orrery.get_body(BodyID(0));
        let position = Vector3::new(2.0, 0.0, 0.0);
        let pose = Pose {
            position,
            orientation: Matrix3::identity(),
        };
        let mut rec = FrameRecording::new();
        BodyRenderer::default()
            .render_posed(body, &pose, &mut rec)
            .unwrap();

        // Faces come out in mesh order, each judged by its first corner
        let mesh = crate::mesh::generate(10, 0.4).unwrap();
        let (mut num_lit, mut num_shadow) = (0, 0);
        for ((points, color, alpha), face) in rec.polygons().zip(mesh.faces()) {
            assert_eq!(points.len(), 4);
            assert_eq!(alpha, 1.0);
            if mesh.representative_vertex(face).x < 0.0 {
                assert_eq!(color, lit());
                num_lit += 1;
            } else {
                assert_eq!(color, shadow());
                num_shadow += 1;
            }
        }
        assert!(num_lit > 0 && num_shadow > 0);
        assert_eq!(num_lit + num_shadow, 18 * 36);
    }

    #[test]
    fn test_world_vertices_follow_pose() {
        let orrery = single_body(90);
        let body = orrery.get_body(BodyID(0));
        let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), 0.7);
        let pose = Pose {
            position: Vector3::new(1.0, -3.0, 0.5),
            orientation: rotation.into_inner(),
        };
        let mut rec = FrameRecording::new();
        BodyRenderer::default()
            .render_posed(body, &pose, &mut rec)
            .unwrap();

        // Vertex 1 of the first face is (lat -90, lon 90) and sits at the south pole
        let (points, _, _) = rec.polygons().next().unwrap();
        assert_relative_eq!(points[1], Point3::new(1.0, -3.0, 0.1), epsilon = 1e-5);

        // An equatorial vertex gets rotated by the inverse orientation
        let mesh = crate::mesh::generate(90, 0.4).unwrap();
        let local = mesh.vertices()[mesh.vertex_index(1, 0)];
        let expected = rotation.inverse() * local.coords + pose.position;
        let drawn = rec
            .polygons()
            .flat_map(|(points, _, _)| points.iter())
            .any(|p| (nalgebra::convert::<Vector3<f32>, Vector3<f64>>(p.coords) - expected).norm() < 1e-5);
        assert!(drawn);
    }

    #[test]
    fn test_skips_unavailable_body() {
        let (orrery, earth, moon) = earth_moon_orrery();
        let mut eph = StubEphemeris::earth_moon();
        eph.oriented = vec!["IAU_EARTH".to_owned()];

        let mut renderer = BodyRenderer::new(QueryFrame::default());
        let mut rec = FrameRecording::new();
        let outcome = renderer.render(&orrery, &eph, moon, 0.0, &mut rec).unwrap();
        assert!(matches!(outcome, RenderOutcome::Skipped(ref e) if e.body == "MOON"));
        assert!(rec.is_empty());

        let outcome = renderer.render(&orrery, &eph, earth, 0.0, &mut rec).unwrap();
        match outcome {
            RenderOutcome::Drawn(pose) => {
                assert_relative_eq!(pose.position, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-12)
            }
            RenderOutcome::Skipped(e) => panic!("unexpected skip: {}", e),
        }
        assert!(!rec.is_empty());
    }

    #[test]
    fn test_meshes_are_cached() {
        let (orrery, earth, moon) = earth_moon_orrery();
        let eph = StubEphemeris::earth_moon();
        let mut renderer = BodyRenderer::new(QueryFrame::default());
        let mut rec = FrameRecording::new();
        for _ in 0..3 {
            renderer.render(&orrery, &eph, earth, 0.0, &mut rec).unwrap();
            renderer.render(&orrery, &eph, moon, 0.0, &mut rec).unwrap();
        }
        assert_eq!(renderer.mesh_cache().len(), 2);
    }
}
