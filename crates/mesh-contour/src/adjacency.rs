//! Vertex adjacency graphs with configurable ring depth.
//!
//! The depth-1 ("immediate") graph links every pair of vertices that share a
//! face. Deeper graphs ("extended") hold the full k-ring of each vertex and
//! are used as bounded neighborhoods for the local surface fits.

use hashbrown::HashSet;
use tracing::debug;

use crate::error::{ContourError, ContourResult};
use crate::types::Mesh;

/// Per-vertex neighbor lists.
///
/// Each list is sorted, holds no duplicates and never contains the vertex
/// itself. Built once from a mesh and immutable afterward, so it can be
/// shared by any number of read-only consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyList {
    neighbors: Vec<Vec<u32>>,
    depth: usize,
}

impl AdjacencyList {
    /// Build the k-ring adjacency of `mesh` for `depth >= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::EmptyMesh`] for a mesh without vertices or
    /// faces, [`ContourError::InvalidVertexIndex`] for out-of-range face
    /// indices and [`ContourError::InvalidParameter`] for `depth == 0`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_contour::{AdjacencyList, shapes};
    ///
    /// let grid = shapes::grid(3, 3, 1.0);
    /// let ring1 = AdjacencyList::build(&grid, 1).unwrap();
    /// let ring2 = AdjacencyList::build(&grid, 2).unwrap();
    ///
    /// // The center of a 3x3 grid touches six vertices and reaches all others in two hops.
    /// assert_eq!(ring1.neighbors(4).len(), 6);
    /// assert_eq!(ring2.neighbors(4).len(), 8);
    /// ```
    pub fn build(mesh: &Mesh, depth: usize) -> ContourResult<Self> {
        if depth == 0 {
            return Err(ContourError::invalid_parameter(
                "adjacency_depth",
                "depth must be at least 1",
            ));
        }
        if mesh.is_empty() {
            return Err(ContourError::empty_mesh(format!(
                "cannot build adjacency for {} vertices and {} faces",
                mesh.vertex_count(),
                mesh.face_count()
            )));
        }

        let vertex_count = mesh.vertex_count();
        let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];

        for (face_index, face) in mesh.faces.iter().enumerate() {
            for &a in face {
                if a as usize >= vertex_count {
                    return Err(ContourError::invalid_vertex_index(
                        face_index,
                        a,
                        vertex_count,
                    ));
                }
                // Ordered pairs include (a, a); the self entry is stripped below.
                for &b in face {
                    neighbors[a as usize].push(b);
                }
            }
        }

        for (v, list) in neighbors.iter_mut().enumerate() {
            list.sort_unstable();
            list.dedup();
            list.retain(|&n| n as usize != v);
        }

        let immediate = Self {
            neighbors,
            depth: 1,
        };
        let mut adjacency = immediate.clone();
        for _ in 1..depth {
            adjacency = adjacency.expand_ring(&immediate);
        }

        debug!(
            vertices = vertex_count,
            depth,
            edges = adjacency.directed_edge_count() / 2,
            "Built vertex adjacency"
        );

        Ok(adjacency)
    }

    /// Build the depth-1 adjacency.
    pub fn immediate(mesh: &Mesh) -> ContourResult<Self> {
        Self::build(mesh, 1)
    }

    /// Grow every neighborhood by one ring: union each vertex's set with the
    /// immediate neighbors of its current members.
    fn expand_ring(&self, immediate: &Self) -> Self {
        let neighbors = self
            .neighbors
            .iter()
            .enumerate()
            .map(|(v, current)| {
                let mut ring: HashSet<u32> = current.iter().copied().collect();
                for &n in current {
                    ring.extend(immediate.neighbors(n).iter().copied());
                }
                ring.remove(&(v as u32));
                let mut list: Vec<u32> = ring.into_iter().collect();
                list.sort_unstable();
                list
            })
            .collect();

        Self {
            neighbors,
            depth: self.depth + 1,
        }
    }

    /// Neighbors of `vertex`, sorted ascending.
    #[inline]
    pub fn neighbors(&self, vertex: u32) -> &[u32] {
        &self.neighbors[vertex as usize]
    }

    /// Number of neighbors of `vertex`.
    #[inline]
    pub fn degree(&self, vertex: u32) -> usize {
        self.neighbors[vertex as usize].len()
    }

    /// Whether `b` is in the neighborhood of `a`.
    #[inline]
    pub fn contains(&self, a: u32, b: u32) -> bool {
        self.neighbors[a as usize].binary_search(&b).is_ok()
    }

    /// Ring depth this graph was built with.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of vertices covered.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Total number of (a, b) neighbor entries.
    pub fn directed_edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum()
    }

    /// Iterate `(vertex, neighbors)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[u32])> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .map(|(v, list)| (v as u32, list.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;
    use nalgebra::Point3;

    fn two_triangles() -> Mesh {
        Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [1, 3, 2]],
        )
    }

    #[test]
    fn test_build_two_triangles() {
        let adj = AdjacencyList::immediate(&two_triangles()).unwrap();
        assert_eq!(adj.neighbors(0), &[1, 2]);
        assert_eq!(adj.neighbors(1), &[0, 2, 3]);
        assert_eq!(adj.neighbors(2), &[0, 1, 3]);
        assert_eq!(adj.neighbors(3), &[1, 2]);
        assert_eq!(adj.directed_edge_count(), 10);
    }

    #[test]
    fn test_vertex_is_never_its_own_neighbor() {
        let adj = AdjacencyList::build(&shapes::icosphere(1, 1.0), 3).unwrap();
        for (v, list) in adj.iter() {
            assert!(!list.contains(&v));
        }
    }

    #[test]
    fn test_immediate_is_symmetric() {
        let adj = AdjacencyList::immediate(&shapes::icosphere(2, 1.0)).unwrap();
        for (v, list) in adj.iter() {
            for &n in list {
                assert!(adj.contains(n, v), "{} -> {} has no reverse edge", v, n);
            }
        }
    }

    #[test]
    fn test_icosahedron_valence() {
        let adj = AdjacencyList::immediate(&shapes::icosphere(0, 1.0)).unwrap();
        assert!((0..12).all(|v| adj.degree(v) == 5));
        // Ring 2 of an icosahedron is everything but the antipode.
        let ring2 = AdjacencyList::build(&shapes::icosphere(0, 1.0), 2).unwrap();
        assert!((0..12).all(|v| ring2.degree(v) == 10));
    }

    #[test]
    fn test_extended_contains_immediate() {
        let mesh = shapes::grid(6, 6, 1.0);
        let ring1 = AdjacencyList::build(&mesh, 1).unwrap();
        let ring2 = AdjacencyList::build(&mesh, 2).unwrap();
        assert_eq!(ring2.depth(), 2);
        for (v, list) in ring1.iter() {
            for &n in list {
                assert!(ring2.contains(v, n));
            }
        }
        // Interior grid vertex: 6 immediate neighbors, 18 within two hops.
        let center = 2 * 6 + 2;
        assert_eq!(ring1.degree(center), 6);
        assert_eq!(ring2.degree(center), 18);
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let err = AdjacencyList::immediate(&Mesh::new()).unwrap_err();
        assert!(matches!(err, ContourError::EmptyMesh { .. }));
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let err = AdjacencyList::build(&two_triangles(), 0).unwrap_err();
        assert!(matches!(err, ContourError::InvalidParameter { .. }));
    }

    #[test]
    fn test_out_of_range_face_is_rejected() {
        let mut mesh = two_triangles();
        mesh.faces.push([0, 1, 9]);
        assert!(matches!(
            AdjacencyList::immediate(&mesh),
            Err(ContourError::InvalidVertexIndex { vertex_index: 9, .. })
        ));
    }

    #[test]
    fn test_isolated_vertex_has_no_neighbors() {
        let mut mesh = two_triangles();
        mesh.vertices.push(Point3::new(5.0, 5.0, 5.0));
        let adj = AdjacencyList::immediate(&mesh).unwrap();
        assert_eq!(adj.degree(4), 0);
    }
}
