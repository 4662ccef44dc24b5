//! Graticule (latitude/longitude grid) meshes for body spheres.

use std::collections::HashMap;
use std::rc::Rc;

use nalgebra::Point3;
use thiserror::Error;
use tracing::debug;

use crate::math::geometry::geographic_to_cartesian;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error(
    "invalid mesh parameters: angular resolution {angular_resolution} deg must be in (0, 180) \
     and divide 180, radius {radius} must be finite and positive"
)]
pub struct InvalidMeshParameters {
    pub angular_resolution: u32,
    pub radius: f64,
}

/// A sphere approximated by quads on a regular lat/lon grid.
///
/// Vertex `(lat_index, lon_index)` lives at `lon_index + lat_index * num_lon`.
/// Longitudes run over the closed range [0, 360], so the seam column is
/// duplicated on purpose.
#[derive(Debug, Clone, PartialEq)]
pub struct GraticuleMesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[usize; 4]>,
    edges: Vec<[usize; 2]>,
    num_lat: usize,
    num_lon: usize,
}

pub fn check_parameters(angular_resolution: u32, radius: f64) -> Result<(), InvalidMeshParameters> {
    let resolution_ok =
        angular_resolution > 0 && angular_resolution < 180 && 180 % angular_resolution == 0;
    let radius_ok = radius.is_finite() && radius > 0.0;
    if resolution_ok && radius_ok {
        Ok(())
    } else {
        Err(InvalidMeshParameters {
            angular_resolution,
            radius,
        })
    }
}

pub fn generate(angular_resolution: u32, radius: f64) -> Result<GraticuleMesh, InvalidMeshParameters> {
    check_parameters(angular_resolution, radius)?;

    let step = angular_resolution as usize;
    let lats: Vec<f64> = (0..=180).step_by(step).map(|d| d as f64 - 90.0).collect();
    let lons: Vec<f64> = (0..=360).step_by(step).map(|d| d as f64).collect();
    let (num_lat, num_lon) = (lats.len(), lons.len());

    let vertices = lats
        .iter()
        .flat_map(|&lat| {
            lons.iter()
                .map(move |&lon| geographic_to_cartesian(lat, lon, radius))
        })
        .collect();

    let cells = (num_lat - 1) * (num_lon - 1);
    let mut faces = Vec::with_capacity(cells);
    let mut edges = Vec::with_capacity(4 * cells);
    for i in 0..num_lat - 1 {
        for j in 0..num_lon - 1 {
            let face = [
                j + i * num_lon,
                j + 1 + i * num_lon,
                j + 1 + (i + 1) * num_lon,
                j + (i + 1) * num_lon,
            ];
            // Each cell traces its own boundary; shared edges show up twice.
            edges.push([face[0], face[1]]);
            edges.push([face[1], face[2]]);
            edges.push([face[2], face[3]]);
            edges.push([face[3], face[0]]);
            faces.push(face);
        }
    }

    Ok(GraticuleMesh {
        vertices,
        faces,
        edges,
        num_lat,
        num_lon,
    })
}

impl GraticuleMesh {
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 4]] {
        &self.faces
    }

    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    pub fn num_lat(&self) -> usize {
        self.num_lat
    }

    pub fn num_lon(&self) -> usize {
        self.num_lon
    }

    pub fn vertex_index(&self, lat_index: usize, lon_index: usize) -> usize {
        lon_index + lat_index * self.num_lon
    }

    /// The first corner of a face; stands in for the whole face when
    /// classifying illumination.
    pub fn representative_vertex(&self, face: &[usize; 4]) -> &Point3<f64> {
        &self.vertices[face[0]]
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct MeshKey {
    radius_bits: u64,
    angular_resolution: u32,
}

/// Meshes keyed by `(radius, angular_resolution)`. Only vertex positions
/// change between frames, and those are derived from these local meshes.
#[derive(Debug, Default)]
pub struct MeshCache {
    meshes: HashMap<MeshKey, Rc<GraticuleMesh>>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &mut self,
        radius: f64,
        angular_resolution: u32,
    ) -> Result<Rc<GraticuleMesh>, InvalidMeshParameters> {
        let key = MeshKey {
            radius_bits: radius.to_bits(),
            angular_resolution,
        };
        if let Some(mesh) = self.meshes.get(&key) {
            return Ok(Rc::clone(mesh));
        }

        let mesh = Rc::new(generate(angular_resolution, radius)?);
        debug!(
            radius,
            angular_resolution,
            vertices = mesh.vertices().len(),
            "built graticule mesh"
        );
        self.meshes.insert(key, Rc::clone(&mesh));
        Ok(mesh)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
