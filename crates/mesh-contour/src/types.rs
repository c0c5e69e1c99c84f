//! Core mesh data types.

use nalgebra::{Point3, Vector3};

use crate::error::{ContourError, ContourResult};

/// Orientation convention of a mesh's face winding.
///
/// Curvature is estimated in a frame whose +z axis is the vertex normal, so
/// the sign of the fitted quadratic depends on which way the normals point.
/// Right-handed meshes (counter-clockwise winding seen from outside, normals
/// pointing outward) report positive curvature on convex regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Handedness {
    /// Counter-clockwise winding, outward normals.
    #[default]
    Right,
    /// Clockwise winding, inward normals.
    Left,
}

impl Handedness {
    /// Sign applied to the raw `a + c` quadratic coefficient sum.
    #[inline]
    pub fn curvature_sign(self) -> f64 {
        match self {
            Handedness::Right => -1.0,
            Handedness::Left => 1.0,
        }
    }
}

/// An immutable triangle mesh with indexed vertices.
///
/// Vertex indices are stable positions into `vertices`; every per-vertex
/// field in this crate is indexed the same way.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// Triangle faces as indices into the vertex array.
    pub faces: Vec<[u32; 3]>,

    /// Winding convention, used to fix the sign of estimated curvature.
    #[cfg_attr(feature = "config", serde(default))]
    pub handedness: Handedness,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from positions and faces with right-handed winding.
    pub fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            handedness: Handedness::Right,
        }
    }

    /// Set the winding convention.
    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }

    /// Number of vertices in the mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces (triangles) in the mesh.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh is empty (no vertices or faces).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, vertex: u32) -> Point3<f64> {
        self.vertices[vertex as usize]
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if mesh is empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices[1..].iter().fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        }))
    }

    /// Iterate over triangles with concrete vertex positions.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| Triangle {
            v0: self.vertices[i0 as usize],
            v1: self.vertices[i1 as usize],
            v2: self.vertices[i2 as usize],
        })
    }

    /// Mean edge length over all face edges, counting shared edges twice.
    pub fn mean_edge_length(&self) -> f64 {
        if self.faces.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .triangles()
            .map(|tri| tri.edge_lengths().iter().sum::<f64>())
            .sum();
        total / (3 * self.faces.len()) as f64
    }

    /// Check that the mesh can enter the pipeline.
    ///
    /// Rejects meshes without vertices or faces, faces that reference
    /// vertices outside the vertex array, and non-finite coordinates.
    pub fn validate(&self) -> ContourResult<()> {
        if self.vertices.is_empty() {
            return Err(ContourError::empty_mesh("mesh has no vertices"));
        }
        if self.faces.is_empty() {
            return Err(ContourError::empty_mesh("mesh has no faces"));
        }

        let vertex_count = self.vertices.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(ContourError::invalid_vertex_index(
                    face_index,
                    bad,
                    vertex_count,
                ));
            }
        }

        for (vertex_index, p) in self.vertices.iter().enumerate() {
            for (coordinate, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
                if !value.is_finite() {
                    return Err(ContourError::invalid_coordinate(
                        vertex_index,
                        coordinate,
                        value,
                    ));
                }
            }
        }

        Ok(())
    }
}

/// A triangle with concrete vertex positions.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle from three points.
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Compute the (unnormalized) face normal via cross product.
    /// The direction follows the right-hand rule with CCW winding.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;
        e1.cross(&e2)
    }

    /// Compute the unit face normal.
    /// Returns None for degenerate triangles (zero area).
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.normal_unnormalized();
        let len_sq = n.norm_squared();
        if len_sq > f64::EPSILON * f64::EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    /// Compute the area of the triangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Compute the lengths of the three edges.
    #[inline]
    pub fn edge_lengths(&self) -> [f64; 3] {
        [
            (self.v1 - self.v0).norm(),
            (self.v2 - self.v1).norm(),
            (self.v0 - self.v2).norm(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Mesh {
        Mesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_triangle_normal() {
        let tri = unit_triangle().triangles().next().unwrap();
        let n = tri.normal().unwrap();
        assert_relative_eq!(n.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(tri.area(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_triangle_has_no_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(tri.normal().is_none());
    }

    #[test]
    fn test_bounds() {
        let (min, max) = unit_triangle().bounds().unwrap();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));
        assert!(Mesh::new().bounds().is_none());
    }

    #[test]
    fn test_mean_edge_length() {
        let mesh = unit_triangle();
        let expected = (1.0 + 1.0 + 2.0_f64.sqrt()) / 3.0;
        assert_relative_eq!(mesh.mean_edge_length(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_ok() {
        assert!(unit_triangle().validate().is_ok());
    }

    #[test]
    fn test_validate_empty() {
        let err = Mesh::new().validate().unwrap_err();
        assert!(matches!(err, ContourError::EmptyMesh { .. }));

        let mut no_faces = unit_triangle();
        no_faces.faces.clear();
        assert!(matches!(
            no_faces.validate(),
            Err(ContourError::EmptyMesh { .. })
        ));
    }

    #[test]
    fn test_validate_bad_index() {
        let mut mesh = unit_triangle();
        mesh.faces.push([0, 2, 7]);
        match mesh.validate() {
            Err(ContourError::InvalidVertexIndex {
                face_index,
                vertex_index,
                vertex_count,
            }) => {
                assert_eq!(face_index, 1);
                assert_eq!(vertex_index, 7);
                assert_eq!(vertex_count, 3);
            }
            other => panic!("Expected InvalidVertexIndex, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_nan() {
        let mut mesh = unit_triangle();
        mesh.vertices[1].y = f64::NAN;
        assert!(matches!(
            mesh.validate(),
            Err(ContourError::InvalidCoordinate {
                vertex_index: 1,
                coordinate: "y",
                ..
            })
        ));
    }

    #[test]
    fn test_handedness_sign() {
        assert_eq!(Handedness::Right.curvature_sign(), -1.0);
        assert_eq!(Handedness::Left.curvature_sign(), 1.0);
        assert_eq!(Mesh::new().handedness, Handedness::Right);
    }
}
