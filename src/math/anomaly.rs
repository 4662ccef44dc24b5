use super::intervals::Interval;
use super::root_finding::newton_plus_bisection;

/// Solves Kepler's equation `M = E - e sin E` for the eccentric anomaly.
/// Only elliptic orbits (`0 <= e < 1`) are supported.
pub fn mean_to_eccentric(mean_anomaly: f64, e: f64) -> f64 {
    assert!((0.0..1.0).contains(&e), "not an elliptic orbit: e = {}", e);

    let kepler = |x: f64| -> f64 { x - e * x.sin() - mean_anomaly };
    let kepler_der = |x: f64| -> f64 { 1.0 - e * x.cos() };

    // |E - M| = e |sin E| <= e, so the root is always inside [M - e, M + e].
    let bracket = Interval::around(mean_anomaly, e);
    newton_plus_bisection(|x| (kepler(x), kepler_der(x)), bracket, 100)
}

pub fn eccentric_to_true(eccentric_anomaly: f64, e: f64) -> f64 {
    // tan(theta/2) = sqrt((1+e)/(1-e)) tan(E/2); atan2 keeps the quadrant.
    let (sin_half, cos_half) = (eccentric_anomaly / 2.0).sin_cos();
    2.0 * f64::atan2((1.0 + e).sqrt() * sin_half, (1.0 - e).sqrt() * cos_half)
}

pub fn mean_to_true(mean_anomaly: f64, ecc: f64) -> f64 {
    eccentric_to_true(mean_to_eccentric(mean_anomaly, ecc), ecc)
}
