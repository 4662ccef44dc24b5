use nalgebra::Point3;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct BodyID(pub usize);

/// What a body orbits. Parents are handles into the owning `Orrery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    LightSource,
    Body(BodyID),
}

// All the immutable info about a body
#[derive(Debug, Clone)]
pub struct BodyInfo {
    /// Identifier handed to the ephemeris source
    pub name: String,
    pub radius: f64,
    pub angular_resolution: u32,
    /// Ephemeris distance units -> rendering units
    pub distance_factor: f64,
    pub color_lit: Point3<f32>,
    pub color_shadow: Point3<f32>,
}

#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyID,
    pub info: BodyInfo,
    pub parent: Parent,
}

impl BodyInfo {
    pub fn new(name: &str, angular_resolution: u32, radius: f64, distance_factor: f64) -> Self {
        BodyInfo {
            name: name.to_owned(),
            radius,
            angular_resolution,
            distance_factor,
            color_lit: Point3::new(0.6, 0.6, 0.6),
            color_shadow: Point3::new(0.2, 0.2, 0.2),
        }
    }

    pub fn with_colors(mut self, color_lit: Point3<f32>, color_shadow: Point3<f32>) -> Self {
        self.color_lit = color_lit;
        self.color_shadow = color_shadow;
        self
    }
}

impl Body {
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn parent_id(&self) -> Option<BodyID> {
        match self.parent {
            Parent::LightSource => None,
            Parent::Body(id) => Some(id),
        }
    }

    /// Name of the body-fixed frame the ephemeris source knows this body by.
    pub fn body_frame(&self) -> String {
        format!("IAU_{}", self.info.name)
    }
}
