use thiserror::Error;
use tracing::info;

use crate::mesh::{self, InvalidMeshParameters};

mod body;

pub use body::{Body, BodyID, BodyInfo, Parent};

#[derive(Debug, Error)]
pub enum OrreryError {
    #[error("body `{name}`: {source}")]
    InvalidMesh {
        name: String,
        #[source]
        source: InvalidMeshParameters,
    },
    #[error("body `{name}` has distance factor {factor}, expected a finite value")]
    InvalidDistanceFactor { name: String, factor: f64 },
    #[error("body `{0}` is already in the scene")]
    DuplicateName(String),
    #[error("body `{child}` orbits `{parent}`, which has not been added yet")]
    UnknownParent { child: String, parent: String },
    #[error("parent {0:?} is not in the scene")]
    UnknownParentId(BodyID),
}

/// The table of bodies in the scene, rooted at a single light source.
///
/// Bodies can only name parents that are already present, so every parent
/// chain is acyclic and ends at the light source.
#[derive(Debug, Clone)]
pub struct Orrery {
    light_source: String,
    bodies: Vec<Body>,
}

impl Orrery {
    pub fn new(light_source: &str) -> Self {
        Orrery {
            light_source: light_source.to_owned(),
            bodies: vec![],
        }
    }

    /// Ephemeris identifier of the light source at the root of the tree.
    pub fn light_source(&self) -> &str {
        &self.light_source
    }

    pub fn add_body(&mut self, info: BodyInfo, parent: Parent) -> Result<BodyID, OrreryError> {
        mesh::check_parameters(info.angular_resolution, info.radius).map_err(|source| {
            OrreryError::InvalidMesh {
                name: info.name.clone(),
                source,
            }
        })?;
        if !info.distance_factor.is_finite() {
            return Err(OrreryError::InvalidDistanceFactor {
                name: info.name,
                factor: info.distance_factor,
            });
        }
        if self.find_body(&info.name).is_some() {
            return Err(OrreryError::DuplicateName(info.name));
        }
        if let Parent::Body(parent_id) = parent {
            if parent_id.0 >= self.bodies.len() {
                return Err(OrreryError::UnknownParentId(parent_id));
            }
        }

        let id = BodyID(self.bodies.len());
        info!(
            name = %info.name,
            parent = %self.parent_name(parent),
            "added body"
        );
        self.bodies.push(Body { id, info, parent });
        Ok(id)
    }

    /// Like `add_body`, but the parent is named. `None`, or the light
    /// source's own name, means the body orbits the light source.
    pub fn add_body_orbiting(
        &mut self,
        info: BodyInfo,
        parent: Option<&str>,
    ) -> Result<BodyID, OrreryError> {
        let parent = match parent {
            None => Parent::LightSource,
            Some(name) if name.eq_ignore_ascii_case(&self.light_source) => Parent::LightSource,
            Some(name) => match self.find_body(name) {
                Some(body) => Parent::Body(body.id),
                None => {
                    return Err(OrreryError::UnknownParent {
                        child: info.name,
                        parent: name.to_owned(),
                    })
                }
            },
        };
        self.add_body(info, parent)
    }

    pub fn get_body(&self, id: BodyID) -> &Body {
        &self.bodies[id.0]
    }

    pub fn find_body(&self, name: &str) -> Option<&Body> {
        self.bodies
            .iter()
            .find(|b| b.info.name.eq_ignore_ascii_case(name))
    }

    /// Bodies in insertion order, which puts every parent before its children.
    pub fn bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Ephemeris identifier of whatever the given parent refers to.
    pub fn parent_name(&self, parent: Parent) -> &str {
        match parent {
            Parent::LightSource => &self.light_source,
            Parent::Body(id) => &self.bodies[id.0].info.name,
        }
    }

    /// Walks from the given body up to (but excluding) the light source.
    pub fn ancestry(&self, id: BodyID) -> impl Iterator<Item = &Body> + '_ {
        let mut next = Some(id);
        std::iter::from_fn(move || {
            let body = self.get_body(next?);
            next = body.parent_id();
            Some(body)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earth_moon() -> (Orrery, BodyID, BodyID) {
        let mut orrery = Orrery::new("SUN");
        let earth = orrery
            .add_body(BodyInfo::new("EARTH", 10, 0.4, 2.0 / 1.5e8), Parent::LightSource)
            .unwrap();
        let moon = orrery
            .add_body_orbiting(BodyInfo::new("MOON", 30, 0.2, 1.0 / 4e5), Some("earth"))
            .unwrap();
        (orrery, earth, moon)
    }

    #[test]
    fn test_parents() {
        let (orrery, earth, moon) = earth_moon();
        assert_eq!(orrery.get_body(earth).parent, Parent::LightSource);
        assert_eq!(orrery.get_body(moon).parent_id(), Some(earth));
        assert_eq!(orrery.parent_name(orrery.get_body(moon).parent), "EARTH");
        assert_eq!(orrery.parent_name(Parent::LightSource), "SUN");
        assert_eq!(orrery.get_body(moon).body_frame(), "IAU_MOON");
    }

    #[test]
    fn test_ancestry() {
        let (orrery, earth, moon) = earth_moon();
        let chain: Vec<_> = orrery.ancestry(moon).map(|b| b.id).collect();
        assert_eq!(chain, vec![moon, earth]);
        let chain: Vec<_> = orrery.ancestry(earth).map(|b| b.id).collect();
        assert_eq!(chain, vec![earth]);
    }

    #[test]
    fn test_light_source_by_name() {
        let mut orrery = Orrery::new("SUN");
        let mars = orrery
            .add_body_orbiting(BodyInfo::new("MARS", 15, 0.3, 1.0), Some("Sun"))
            .unwrap();
        assert_eq!(orrery.get_body(mars).parent, Parent::LightSource);
    }

    #[test]
    fn test_rejects_bad_bodies() {
        let (mut orrery, _, _) = earth_moon();

        let err = orrery
            .add_body(BodyInfo::new("PHOBOS", 7, 0.1, 1.0), Parent::LightSource)
            .unwrap_err();
        assert!(matches!(err, OrreryError::InvalidMesh { .. }));

        let err = orrery
            .add_body(BodyInfo::new("VENUS", 10, 0.0, 1.0), Parent::LightSource)
            .unwrap_err();
        assert!(matches!(err, OrreryError::InvalidMesh { .. }));

        let err = orrery
            .add_body(BodyInfo::new("VENUS", 10, 0.3, f64::NAN), Parent::LightSource)
            .unwrap_err();
        assert!(matches!(err, OrreryError::InvalidDistanceFactor { .. }));

        let err = orrery
            .add_body(BodyInfo::new("MOON", 10, 0.3, 1.0), Parent::LightSource)
            .unwrap_err();
        assert!(matches!(err, OrreryError::DuplicateName(_)));

        let err = orrery
            .add_body_orbiting(BodyInfo::new("DEIMOS", 10, 0.1, 1.0), Some("MARS"))
            .unwrap_err();
        assert!(matches!(err, OrreryError::UnknownParent { .. }));

        let err = orrery
            .add_body(BodyInfo::new("DEIMOS", 10, 0.1, 1.0), Parent::Body(BodyID(17)))
            .unwrap_err();
        assert!(matches!(err, OrreryError::UnknownParentId(BodyID(17))));

        assert_eq!(orrery.len(), 2);
    }
}
