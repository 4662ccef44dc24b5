use nalgebra::Point3;

use super::path::regular_polygon;
use super::DrawTarget;

pub const DEFAULT_RING_COUNT: usize = 400;
const RING_SIDES: usize = 36;

#[derive(Debug, Clone)]
struct Ring {
    points: Vec<Point3<f32>>,
    color: Point3<f32>,
}

/// The light source, drawn as stacked translucent discs that fade from the
/// light's color at the core to black at the rim.
#[derive(Debug, Clone)]
pub struct SunDisplay {
    // Outermost first, which is also draw order
    rings: Vec<Ring>,
}

impl SunDisplay {
    pub fn new(color: Point3<f32>, ring_count: usize) -> Self {
        let core = rgb_to_hsl(color);
        let black = [0.0, 0.0, 0.0];

        let mut rings: Vec<Ring> = (0..ring_count)
            .map(|k| {
                // x sweeps [1, 5), so the radius grows logarithmically from 0.2
                let x = 1.0 + 4.0 * k as f32 / ring_count as f32;
                let radius = 0.2 + x.ln() / 10.0;
                let u = if ring_count > 1 {
                    k as f32 / (ring_count - 1) as f32
                } else {
                    0.0
                };
                let hsl = [
                    core[0] + (black[0] - core[0]) * u,
                    core[1] + (black[1] - core[1]) * u,
                    core[2] + (black[2] - core[2]) * u,
                ];
                Ring {
                    points: regular_polygon(radius, RING_SIDES),
                    color: hsl_to_rgb(hsl),
                }
            })
            .collect();
        rings.reverse();

        SunDisplay { rings }
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Draws the discs largest first. Opacity rises with each one, so the
    /// bright core ends up opaque on top.
    pub fn draw(&self, target: &mut dyn DrawTarget) {
        let n = self.rings.len() as f32;
        for (k, ring) in self.rings.iter().enumerate() {
            let alpha = (k + 1) as f32 / n;
            target.draw_polygon(&ring.points, ring.color, alpha);
        }
    }
}

fn rgb_to_hsl(rgb: Point3<f32>) -> [f32; 3] {
    let (r, g, b) = (rgb.x, rgb.y, rgb.z);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return [0.0, 0.0, l];
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    [h / 6.0, s, l]
}

fn hsl_to_rgb(hsl: [f32; 3]) -> Point3<f32> {
    let [h, s, l] = hsl;
    if s == 0.0 {
        return Point3::new(l, l, l);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    Point3::new(channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}
