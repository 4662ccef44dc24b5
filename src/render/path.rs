use nalgebra::Point3;

/// Evaluates `f` at `num_segments + 1` evenly spaced parameters from
/// `t_start` to `t_end`, both ends included.
pub fn path_iter_parametric<F, S>(
    f: F,
    t_start: S,
    t_end: S,
    num_segments: usize,
) -> impl Iterator<Item = Point3<f32>>
where
    F: Fn(S) -> Point3<f32>,
    S: nalgebra::RealField + simba::scalar::SupersetOf<usize> + Copy,
{
    assert!(
        num_segments >= 1,
        "Must have at least one segment, num_segments was {}",
        num_segments
    );
    let convert = nalgebra::convert::<usize, S>;
    (0..=num_segments)
        .map(move |i| convert(i) / convert(num_segments))
        // u ranges from 0 to 1 (inclusive)
        .map(move |u| t_start + u * (t_end - t_start))
        .map(f)
}

/// Corners of a regular polygon of the given radius, centered on the origin
/// in the z = 0 plane. The first corner lies on +x.
pub fn regular_polygon(radius: f32, num_sides: usize) -> Vec<Point3<f32>> {
    let f = |theta: f32| Point3::new(radius * theta.cos(), radius * theta.sin(), 0.0);
    // The closing point repeats the first one
    path_iter_parametric(f, 0.0, std::f32::consts::TAU, num_sides)
        .take(num_sides)
        .collect()
}
