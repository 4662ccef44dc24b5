use nalgebra::{Point3, Rotation3, Vector3};

/// Converts geographic coordinates (degrees) to a point on a sphere of the
/// given radius. Longitude is the azimuth around +z, latitude the elevation
/// above the xy plane.
pub fn geographic_to_cartesian(lat_deg: f64, lon_deg: f64, radius: f64) -> Point3<f64> {
    let (sin_lat, cos_lat) = lat_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon_deg.to_radians().sin_cos();
    Point3::new(
        radius * cos_lat * cos_lon,
        radius * cos_lat * sin_lon,
        radius * sin_lat,
    )
}

/// Rotation taking the perifocal frame (xy plane = orbital plane, x towards
/// periapsis) into the reference frame the elements are expressed in.
pub fn rotation_from_angles(incl: f64, lan: f64, argp: f64) -> Rotation3<f64> {
    // Rotate around z until the periapsis sits argp away from the ascending
    // node, tip around x by the inclination, then turn around z by the LAN.
    Rotation3::from_axis_angle(&Vector3::z_axis(), lan)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), incl)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), argp)
}
