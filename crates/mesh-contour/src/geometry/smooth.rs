//! Laplacian pre-smoothing of vertex positions.

use nalgebra::Point3;

use crate::adjacency::AdjacencyList;
use crate::error::{ContourError, ContourResult, ensure_len};
use crate::types::Mesh;

/// Relax every vertex toward the centroid of its neighbors.
///
/// Each pass moves `p` to `p + relaxation * (centroid - p)` using positions
/// from the previous pass. Returns a smoothed copy; the input is untouched
/// and faces and handedness carry over. Vertices without neighbors stay put.
pub fn smooth_positions(
    mesh: &Mesh,
    adjacency: &AdjacencyList,
    iterations: usize,
    relaxation: f64,
) -> ContourResult<Mesh> {
    if !(0.0..=1.0).contains(&relaxation) {
        return Err(ContourError::invalid_parameter(
            "mesh_smoothing_relaxation",
            format!("relaxation must be in [0, 1], got {}", relaxation),
        ));
    }
    ensure_len("adjacency", mesh.vertex_count(), adjacency.vertex_count())?;

    let mut smoothed = mesh.clone();
    let mut next: Vec<Point3<f64>> = smoothed.vertices.clone();
    for _ in 0..iterations {
        for (v, out) in next.iter_mut().enumerate() {
            let p = smoothed.vertices[v];
            let neighbors = adjacency.neighbors(v as u32);
            if neighbors.is_empty() {
                *out = p;
                continue;
            }
            let centroid = neighbors
                .iter()
                .fold(nalgebra::Vector3::zeros(), |acc, &u| {
                    acc + smoothed.vertices[u as usize].coords
                })
                / neighbors.len() as f64;
            *out = p + (centroid - p.coords) * relaxation;
        }
        std::mem::swap(&mut smoothed.vertices, &mut next);
    }
    Ok(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    #[test]
    fn test_smoothing_flattens_bump() {
        let mut mesh = shapes::grid(5, 5, 1.0);
        mesh.vertices[12].z = 1.0;
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let smoothed = smooth_positions(&mesh, &adjacency, 10, 0.5).unwrap();
        assert!(smoothed.vertices[12].z < 0.5);
        assert_eq!(mesh.vertices[12].z, 1.0);
        assert_eq!(smoothed.faces, mesh.faces);
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let mesh = shapes::icosphere(1, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let smoothed = smooth_positions(&mesh, &adjacency, 0, 0.1).unwrap();
        assert_eq!(smoothed.vertices, mesh.vertices);
    }

    #[test]
    fn test_flat_grid_stays_flat() {
        let mesh = shapes::grid(5, 5, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        let smoothed = smooth_positions(&mesh, &adjacency, 3, 0.1).unwrap();
        for p in &smoothed.vertices {
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_relaxation_out_of_range() {
        let mesh = shapes::grid(3, 3, 1.0);
        let adjacency = AdjacencyList::immediate(&mesh).unwrap();
        assert!(matches!(
            smooth_positions(&mesh, &adjacency, 1, 1.5),
            Err(ContourError::InvalidParameter { .. })
        ));
    }
}
