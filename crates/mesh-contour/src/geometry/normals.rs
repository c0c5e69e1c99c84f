//! Vertex normal estimation.

use nalgebra::Vector3;

use crate::types::Mesh;

/// Per-vertex unit normals.
///
/// Each face contributes its unit normal to its three vertices; the sum is
/// averaged by the number of contributing faces and renormalized. Faces are
/// weighted equally regardless of area. Degenerate faces contribute nothing
/// and a vertex with no valid face gets the zero vector.
///
/// Faces must reference valid vertices; run [`Mesh::validate`] first.
pub fn compute_normals(mesh: &Mesh) -> Vec<Vector3<f64>> {
    let mut sums = vec![Vector3::zeros(); mesh.vertex_count()];
    let mut counts = vec![0usize; mesh.vertex_count()];

    for (face, tri) in mesh.faces.iter().zip(mesh.triangles()) {
        let Some(n) = tri.normal() else {
            continue;
        };
        for &v in face {
            sums[v as usize] += n;
            counts[v as usize] += 1;
        }
    }

    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            if count == 0 {
                return Vector3::zeros();
            }
            (sum / count as f64)
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_flat_grid_normals() {
        let normals = compute_normals(&shapes::grid(4, 4, 0.5));
        for n in normals {
            assert_relative_eq!(n, Vector3::z(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sphere_normals_point_outward() {
        let mesh = shapes::icosphere(2, 3.0);
        let normals = compute_normals(&mesh);
        for (p, n) in mesh.vertices.iter().zip(&normals) {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
            assert!(n.dot(&p.coords.normalize()) > 0.98);
        }
    }

    #[test]
    fn test_unreferenced_vertex_has_zero_normal() {
        let mut mesh = shapes::grid(2, 2, 1.0);
        mesh.vertices.push(Point3::new(9.0, 9.0, 9.0));
        let normals = compute_normals(&mesh);
        assert_eq!(normals[4], Vector3::zeros());
    }
}
