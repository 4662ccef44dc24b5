//! World poses of bodies, composed along their parent chains.

use std::collections::HashMap;

use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

use crate::ephemeris::{Ephemeris, EphemerisError};
use crate::orrery::{BodyID, Orrery};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World position in rendering units; the light source is the origin
    pub position: Vector3<f64>,
    /// Inertial -> body-fixed rotation
    pub orientation: Matrix3<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("no pose for `{body}` at et {time}: {source}")]
pub struct PoseUnavailable {
    pub body: String,
    pub time: f64,
    #[source]
    pub source: EphemerisError,
}

/// Frame and correction every ephemeris query is made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFrame {
    pub reference_frame: String,
    pub aberration_correction: String,
}

impl Default for QueryFrame {
    fn default() -> Self {
        QueryFrame {
            reference_frame: "ECLIPJ2000".to_owned(),
            aberration_correction: "NONE".to_owned(),
        }
    }
}

/// Resolves the pose of a body at `time`.
///
/// The position is the body's scaled offset from its parent, plus the
/// parent's own position, all the way up to the light source. Each level
/// uses its own distance factor.
pub fn resolve(
    orrery: &Orrery,
    ephemeris: &dyn Ephemeris,
    id: BodyID,
    time: f64,
    frame: &QueryFrame,
) -> Result<Pose, PoseUnavailable> {
    let body = orrery.get_body(id);
    let unavailable = |source| PoseUnavailable {
        body: body.name().to_owned(),
        time,
        source,
    };

    let orientation = ephemeris
        .orientation(&frame.reference_frame, &body.body_frame(), time)
        .map_err(unavailable)?;

    let mut position = Vector3::zeros();
    for link in orrery.ancestry(id) {
        let offset = ephemeris
            .position(
                link.name(),
                time,
                &frame.reference_frame,
                &frame.aberration_correction,
                orrery.parent_name(link.parent),
            )
            .map_err(unavailable)?;
        position += offset * link.info.distance_factor;
    }

    Ok(Pose {
        position,
        orientation,
    })
}

/// The poses resolved for the frame being drawn. Cleared at the start of
/// every frame; nothing carries over between frames.
#[derive(Debug, Clone, Default)]
pub struct FramePoses {
    time: Option<f64>,
    poses: HashMap<BodyID, Pose>,
}

impl FramePoses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self, time: f64) {
        self.time = Some(time);
        self.poses.clear();
    }

    pub fn time(&self) -> Option<f64> {
        self.time
    }

    pub fn insert(&mut self, id: BodyID, pose: Pose) {
        self.poses.insert(id, pose);
    }

    pub fn get(&self, id: BodyID) -> Option<&Pose> {
        self.poses.get(&id)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::orrery::{BodyInfo, Parent};
    use approx::assert_relative_eq;
    use nalgebra::Rotation3;

    /// Fixed positions keyed on (target, observer), plus an orientation
    /// shared by every body that has one.
    pub(crate) struct StubEphemeris {
        pub positions: HashMap<(String, String), Vector3<f64>>,
        pub oriented: Vec<String>,
        pub orientation: Matrix3<f64>,
    }

    impl StubEphemeris {
        pub(crate) fn earth_moon() -> Self {
            let mut positions = HashMap::new();
            positions.insert(
                ("EARTH".to_owned(), "SUN".to_owned()),
                Vector3::new(1.5e8, 0.0, 0.0),
            );
            positions.insert(
                ("MOON".to_owned(), "EARTH".to_owned()),
                Vector3::new(0.0, 4e5, 0.0),
            );
            StubEphemeris {
                positions,
                oriented: vec!["IAU_EARTH".to_owned(), "IAU_MOON".to_owned()],
                orientation: Matrix3::identity(),
            }
        }
    }

    impl Ephemeris for StubEphemeris {
        fn position(
            &self,
            target: &str,
            _time: f64,
            _reference_frame: &str,
            _aberration_correction: &str,
            observer: &str,
        ) -> Result<Vector3<f64>, EphemerisError> {
            self.positions
                .get(&(target.to_owned(), observer.to_owned()))
                .copied()
                .ok_or_else(|| EphemerisError::UnknownBody(target.to_owned()))
        }

        fn orientation(
            &self,
            _inertial_frame: &str,
            body_frame: &str,
            _time: f64,
        ) -> Result<Matrix3<f64>, EphemerisError> {
            if self.oriented.iter().any(|f| f == body_frame) {
                Ok(self.orientation)
            } else {
                Err(EphemerisError::UnknownFrame(body_frame.to_owned()))
            }
        }
    }

    pub(crate) fn earth_moon_orrery() -> (Orrery, BodyID, BodyID) {
        let mut orrery = Orrery::new("SUN");
        let earth = orrery
            .add_body(BodyInfo::new("EARTH", 10, 0.4, 2.0 / 1.5e8), Parent::LightSource)
            .unwrap();
        let moon = orrery
            .add_body(BodyInfo::new("MOON", 30, 0.2, 1.0 / 4e5), Parent::Body(earth))
            .unwrap();
        (orrery, earth, moon)
    }

    #[test]
    fn test_scaled_position() {
        let (orrery, earth, _) = earth_moon_orrery();
        let eph = StubEphemeris::earth_moon();
        let pose = resolve(&orrery, &eph, earth, 0.0, &QueryFrame::default()).unwrap();
        assert_relative_eq!(pose.position, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(pose.orientation, Matrix3::identity());
    }

    #[test]
    fn test_two_level_composition() {
        let (orrery, _, moon) = earth_moon_orrery();
        let eph = StubEphemeris::earth_moon();
        let pose = resolve(&orrery, &eph, moon, 0.0, &QueryFrame::default()).unwrap();
        // Moon's offset uses its own factor; the earth's uses the earth's
        assert_relative_eq!(pose.position, Vector3::new(2.0, 1.0, 0.0), epsilon = 1e-12);
    }

    /// Earth on a slow inclined circle around the sun, moon on a fast one
    /// around the earth; orientation spins about z.
    struct MovingEphemeris;

    impl Ephemeris for MovingEphemeris {
        fn position(
            &self,
            target: &str,
            time: f64,
            _reference_frame: &str,
            _aberration_correction: &str,
            observer: &str,
        ) -> Result<Vector3<f64>, EphemerisError> {
            match (target, observer) {
                ("EARTH", "SUN") => Ok(Vector3::new(
                    1.5e8 * (time * 1e-3).cos(),
                    1.5e8 * (time * 1e-3).sin(),
                    3.0 * time,
                )),
                ("MOON", "EARTH") => Ok(Vector3::new(
                    4e5 * (time * 0.1).cos(),
                    4e5 * (time * 0.1).sin(),
                    -time,
                )),
                _ => Err(EphemerisError::UnknownBody(target.to_owned())),
            }
        }

        fn orientation(
            &self,
            _inertial_frame: &str,
            _body_frame: &str,
            time: f64,
        ) -> Result<Matrix3<f64>, EphemerisError> {
            Ok(Rotation3::from_axis_angle(&Vector3::z_axis(), time * 1e-2).into_inner())
        }
    }

    #[test]
    fn test_composition_over_time() {
        let (orrery, earth, moon) = earth_moon_orrery();
        let eph = MovingEphemeris;
        let frame = QueryFrame::default();
        let (f_earth, f_moon) = (2.0 / 1.5e8, 1.0 / 4e5);

        for i in 0..50 {
            let t = i as f64 * 37.0;
            let sun_earth = eph.position("EARTH", t, "", "", "SUN").unwrap();
            let earth_moon = eph.position("MOON", t, "", "", "EARTH").unwrap();

            let earth_pose = resolve(&orrery, &eph, earth, t, &frame).unwrap();
            assert_relative_eq!(earth_pose.position, sun_earth * f_earth, epsilon = 1e-9);

            let moon_pose = resolve(&orrery, &eph, moon, t, &frame).unwrap();
            assert_relative_eq!(
                moon_pose.position,
                earth_moon * f_moon + sun_earth * f_earth,
                epsilon = 1e-9
            );
            assert_eq!(
                moon_pose.orientation,
                eph.orientation("", "IAU_MOON", t).unwrap()
            );
        }
    }

    #[test]
    fn test_orientation_is_passed_through() {
        let (orrery, earth, _) = earth_moon_orrery();
        let mut eph = StubEphemeris::earth_moon();
        eph.orientation = Rotation3::from_euler_angles(0.1, 0.2, 0.3).into_inner();
        let pose = resolve(&orrery, &eph, earth, 0.0, &QueryFrame::default()).unwrap();
        assert_eq!(pose.orientation, eph.orientation);
    }

    #[test]
    fn test_failures_name_the_body() {
        let (orrery, earth, moon) = earth_moon_orrery();

        // No orientation for the moon
        let mut eph = StubEphemeris::earth_moon();
        eph.oriented = vec!["IAU_EARTH".to_owned()];
        let err = resolve(&orrery, &eph, moon, 42.0, &QueryFrame::default()).unwrap_err();
        assert_eq!(err.body, "MOON");
        assert_eq!(err.time, 42.0);
        assert!(matches!(err.source, EphemerisError::UnknownFrame(_)));
        assert!(resolve(&orrery, &eph, earth, 42.0, &QueryFrame::default()).is_ok());

        // A missing ancestor position spoils the child too
        let mut eph = StubEphemeris::earth_moon();
        eph.positions.remove(&("EARTH".to_owned(), "SUN".to_owned()));
        let err = resolve(&orrery, &eph, moon, 0.0, &QueryFrame::default()).unwrap_err();
        assert_eq!(err.body, "MOON");
        assert_eq!(err.source, EphemerisError::UnknownBody("EARTH".to_owned()));
    }

    #[test]
    fn test_frame_poses() {
        let (orrery, earth, moon) = earth_moon_orrery();
        let eph = StubEphemeris::earth_moon();
        let mut poses = FramePoses::new();
        assert!(poses.is_empty());

        poses.begin_frame(1.0);
        let pose = resolve(&orrery, &eph, earth, 1.0, &QueryFrame::default()).unwrap();
        poses.insert(earth, pose);
        assert_eq!(poses.get(earth), Some(&pose));
        assert_eq!(poses.get(moon), None);
        assert_eq!(poses.time(), Some(1.0));

        poses.begin_frame(2.0);
        assert!(poses.is_empty());
        assert_eq!(poses.time(), Some(2.0));
    }
}
