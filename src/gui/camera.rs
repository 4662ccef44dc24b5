use kiss3d::camera::ArcBall;
use nalgebra::{Point3, Vector3};

// Smallest angle between the view direction and the ecliptic pole
const MIN_PITCH: f32 = 0.01;
const DIST_LIMITS: (f32, f32) = (0.5, 1000.0);

/// Arc-ball around the light source with the ecliptic pole as up, starting
/// `distance` away and 45 degrees above the ecliptic.
pub fn orbit_camera(distance: f32) -> ArcBall {
    let offset = distance / 2f32.sqrt();
    let eye = Point3::new(0.0, -offset, offset);
    let mut camera = ArcBall::new(eye, Point3::origin());
    camera.set_up_axis(Vector3::z());
    // Pitch and yaw are relative to the up axis
    camera.look_at(eye, Point3::origin());
    camera.set_min_pitch(MIN_PITCH);
    camera.set_min_dist(DIST_LIMITS.0);
    camera.set_max_dist(DIST_LIMITS.1);
    camera
}

/// Looks straight down onto the ecliptic, the view frame export uses.
pub fn show_top_view(camera: &mut ArcBall) {
    camera.set_at(Point3::origin());
    camera.set_pitch(MIN_PITCH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kiss3d::camera::Camera;

    #[test]
    fn test_top_view_looks_down_the_pole() {
        let mut camera = orbit_camera(6.0);
        assert_relative_eq!(camera.eye().coords.norm(), 6.0, epsilon = 1e-4);
        assert!(camera.eye().z > 4.0);

        show_top_view(&mut camera);
        let eye = camera.eye();
        assert_relative_eq!(eye.coords.norm(), 6.0, epsilon = 1e-4);
        assert!(eye.z > 5.99, "eye at {}", eye);
    }
}
