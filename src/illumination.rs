//! Lit/shadowed classification of surface points. The light source sits at
//! the world origin.

use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Illumination {
    Lit,
    Shadowed,
}

/// Whether a surface point (relative to its body's center) faces the light
/// source, given the body's world position.
///
/// Points exactly on the terminator count as shadowed. A zero-length surface
/// point, or a body sitting on the light source, has no direction and is
/// shadowed as well.
pub fn is_lit(surface_point: &Vector3<f64>, body_position: &Vector3<f64>) -> bool {
    let normal = match surface_point.try_normalize(0.0) {
        Some(n) => n,
        None => return false,
    };
    let sun_direction = match body_position.try_normalize(0.0) {
        Some(d) => -d,
        None => return false,
    };
    normal.dot(&sun_direction) > 0.0
}

pub fn classify(surface_point: &Vector3<f64>, body_position: &Vector3<f64>) -> Illumination {
    if is_lit(surface_point, body_position) {
        Illumination::Lit
    } else {
        Illumination::Shadowed
    }
}
