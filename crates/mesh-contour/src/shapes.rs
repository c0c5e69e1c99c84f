//! Procedural meshes for tests, benchmarks and the CLI.

use hashbrown::HashMap;
use nalgebra::Point3;

use crate::types::Mesh;

/// Icosphere of the given radius, centered at the origin.
///
/// Starts from a regular icosahedron and splits every triangle into four
/// `subdivisions` times, projecting new vertices onto the sphere. Faces are
/// wound counter-clockwise seen from outside. Vertex counts are
/// `10 * 4^subdivisions + 2` (12, 42, 162, 642, 2562, 10242, ...).
pub fn icosphere(subdivisions: u32, radius: f64) -> Mesh {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let a = 1.0;
    let b = 1.0 / phi;

    let base = [
        [0.0, b, -a],
        [b, a, 0.0],
        [-b, a, 0.0],
        [0.0, b, a],
        [0.0, -b, a],
        [-a, 0.0, b],
        [0.0, -b, -a],
        [a, 0.0, -b],
        [a, 0.0, b],
        [-a, 0.0, -b],
        [b, -a, 0.0],
        [-b, -a, 0.0],
    ];
    let mut vertices: Vec<Point3<f64>> = base
        .iter()
        .map(|&[x, y, z]| Point3::new(x, y, z) / (x * x + y * y + z * z).sqrt())
        .collect();

    let mut faces: Vec<[u32; 3]> = vec![
        [0, 2, 1],
        [3, 1, 2],
        [3, 5, 4],
        [3, 4, 8],
        [0, 7, 6],
        [0, 6, 9],
        [4, 11, 10],
        [6, 10, 11],
        [2, 9, 5],
        [11, 5, 9],
        [1, 8, 7],
        [10, 7, 8],
        [3, 2, 5],
        [3, 8, 1],
        [0, 9, 2],
        [0, 1, 7],
        [6, 11, 9],
        [6, 7, 10],
        [4, 5, 11],
        [4, 10, 8],
    ];

    for _ in 0..subdivisions {
        faces = subdivide_unit_sphere(&mut vertices, &faces);
    }

    for p in &mut vertices {
        *p *= radius;
    }
    Mesh::from_parts(vertices, faces)
}

/// Split each face into four, pushing normalized edge midpoints.
fn subdivide_unit_sphere(vertices: &mut Vec<Point3<f64>>, faces: &[[u32; 3]]) -> Vec<[u32; 3]> {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::with_capacity(faces.len() * 3 / 2);
    let mut midpoint = |v1: u32, v2: u32, vertices: &mut Vec<Point3<f64>>| -> u32 {
        let key = if v1 < v2 { (v1, v2) } else { (v2, v1) };
        *midpoints.entry(key).or_insert_with(|| {
            let m = nalgebra::center(&vertices[v1 as usize], &vertices[v2 as usize]);
            vertices.push(Point3::from(m.coords.normalize()));
            (vertices.len() - 1) as u32
        })
    };

    let mut out = Vec::with_capacity(faces.len() * 4);
    for &[v0, v1, v2] in faces {
        let m01 = midpoint(v0, v1, vertices);
        let m12 = midpoint(v1, v2, vertices);
        let m20 = midpoint(v2, v0, vertices);
        out.push([v0, m01, m20]);
        out.push([v1, m12, m01]);
        out.push([v2, m20, m12]);
        out.push([m01, m12, m20]);
    }
    out
}

/// Flat `nx` by `ny` vertex grid in the z = 0 plane.
///
/// Vertex `(i, j)` has index `j * nx + i` and sits at
/// `(i * spacing, j * spacing, 0)`. Each cell is split along the diagonal
/// from `(i, j)` to `(i + 1, j + 1)`, with normals along +z.
pub fn grid(nx: usize, ny: usize, spacing: f64) -> Mesh {
    let vertices = (0..ny)
        .flat_map(|j| (0..nx).map(move |i| Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0)))
        .collect();

    let mut faces = Vec::with_capacity(2 * nx.saturating_sub(1) * ny.saturating_sub(1));
    for j in 0..ny.saturating_sub(1) {
        for i in 0..nx.saturating_sub(1) {
            let a = (j * nx + i) as u32;
            let b = a + 1;
            let c = a + nx as u32;
            let d = c + 1;
            faces.push([a, b, d]);
            faces.push([a, d, c]);
        }
    }

    Mesh::from_parts(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_icosphere_counts() {
        for (sub, vertices, faces) in [(0, 12, 20), (1, 42, 80), (2, 162, 320), (3, 642, 1280)] {
            let mesh = icosphere(sub, 1.0);
            assert_eq!(mesh.vertex_count(), vertices);
            assert_eq!(mesh.face_count(), faces);
        }
    }

    #[test]
    fn test_icosphere_radius_and_winding() {
        let mesh = icosphere(2, 2.5);
        for p in &mesh.vertices {
            assert_relative_eq!(p.coords.norm(), 2.5, epsilon = 1e-12);
        }
        for tri in mesh.triangles() {
            let centroid = (tri.v0.coords + tri.v1.coords + tri.v2.coords) / 3.0;
            assert!(tri.normal_unnormalized().dot(&centroid) > 0.0);
        }
    }

    #[test]
    fn test_grid_layout() {
        let mesh = grid(4, 3, 0.5);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.position(5), Point3::new(0.5, 0.5, 0.0));
        for tri in mesh.triangles() {
            assert!(tri.normal_unnormalized().z > 0.0);
        }
        assert!(grid(1, 5, 1.0).faces.is_empty());
    }
}
