//! Mean curvature and its tangential gradient from local quadric fits.

use nalgebra::{Vector2, Vector3};
use tracing::debug;

use super::frame::TangentFrame;
use super::lsq::NormalEquations;
use crate::adjacency::AdjacencyList;
use crate::error::{ContourResult, ensure_len};
use crate::types::Mesh;

/// Per-vertex curvature gradient in each vertex's tangent frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurvatureGradient {
    /// Component along the local `e1` axis.
    pub de1: Vec<f64>,
    /// Component along the local `e2` axis.
    pub de2: Vec<f64>,
}

impl CurvatureGradient {
    /// Gradient at `vertex` as `(de1, de2)`.
    #[inline]
    pub fn at(&self, vertex: u32) -> Vector2<f64> {
        Vector2::new(self.de1[vertex as usize], self.de2[vertex as usize])
    }

    pub fn len(&self) -> usize {
        self.de1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.de1.is_empty()
    }
}

/// Mean curvature at every vertex.
///
/// Neighbors are moved into the vertex's [`TangentFrame`] and
/// `z = a x² + b xy + c y²` is fitted over them. The mean curvature is
/// `a + c` times the mesh handedness sign, so convex regions of a correctly
/// tagged mesh come out positive. Vertices without neighbors get 0.
pub fn compute_curvature(
    mesh: &Mesh,
    normals: &[Vector3<f64>],
    adjacency: &AdjacencyList,
) -> ContourResult<Vec<f64>> {
    check_inputs(mesh, normals, adjacency)?;
    let sign = mesh.handedness.curvature_sign();

    let curvature = (0..mesh.vertex_count() as u32)
        .map(|v| {
            let neighbors = adjacency.neighbors(v);
            if neighbors.is_empty() {
                return 0.0;
            }
            let frame = TangentFrame::from_normal(&normals[v as usize]);
            let origin = mesh.position(v);
            let mut fit = NormalEquations::<3>::new();
            for &u in neighbors {
                let p = frame.local(&origin, &mesh.position(u));
                fit.add_row(Vector3::new(p.x * p.x, p.x * p.y, p.y * p.y), p.z);
            }
            let coeffs = fit.solve();
            sign * (coeffs[0] + coeffs[2])
        })
        .collect::<Vec<_>>();

    debug!(
        vertices = curvature.len(),
        depth = adjacency.depth(),
        "Estimated mean curvature"
    );
    Ok(curvature)
}

/// Jacobi neighbor averaging: each pass replaces every value by the mean of
/// itself and its neighbors.
pub fn smooth_curvature(
    field: &[f64],
    adjacency: &AdjacencyList,
    iterations: usize,
) -> ContourResult<Vec<f64>> {
    ensure_len("curvature", adjacency.vertex_count(), field.len())?;

    let mut current = field.to_vec();
    let mut next = vec![0.0; field.len()];
    for _ in 0..iterations {
        for (v, out) in next.iter_mut().enumerate() {
            let neighbors = adjacency.neighbors(v as u32);
            let sum: f64 = neighbors.iter().map(|&u| current[u as usize]).sum();
            *out = (current[v] + sum) / (neighbors.len() + 1) as f64;
        }
        std::mem::swap(&mut current, &mut next);
    }
    Ok(current)
}

/// Tangential gradient of a scalar field at every vertex.
///
/// Fits `f(u) - f(v) = g1 x + g2 y` over the neighbors `u` of `v` in the
/// tangent frame of `v`. Vertices without neighbors get a zero gradient.
pub fn compute_curvature_gradient(
    mesh: &Mesh,
    normals: &[Vector3<f64>],
    adjacency: &AdjacencyList,
    curvature: &[f64],
) -> ContourResult<CurvatureGradient> {
    check_inputs(mesh, normals, adjacency)?;
    ensure_len("curvature", mesh.vertex_count(), curvature.len())?;

    let (de1, de2) = (0..mesh.vertex_count() as u32)
        .map(|v| {
            let frame = TangentFrame::from_normal(&normals[v as usize]);
            let g = tangent_gradient(mesh, adjacency, &frame, v, curvature);
            (g.x, g.y)
        })
        .unzip();

    Ok(CurvatureGradient { de1, de2 })
}

/// Linear fit of `values` around `v` in `frame`. Shared with the force model,
/// which applies it to the level-set function.
pub(crate) fn tangent_gradient(
    mesh: &Mesh,
    adjacency: &AdjacencyList,
    frame: &TangentFrame,
    v: u32,
    values: &[f64],
) -> Vector2<f64> {
    let neighbors = adjacency.neighbors(v);
    if neighbors.is_empty() {
        return Vector2::zeros();
    }
    let origin = mesh.position(v);
    let base = values[v as usize];
    let mut fit = NormalEquations::<2>::new();
    for &u in neighbors {
        let p = frame.local(&origin, &mesh.position(u));
        fit.add_row(Vector2::new(p.x, p.y), values[u as usize] - base);
    }
    fit.solve()
}

fn check_inputs(
    mesh: &Mesh,
    normals: &[Vector3<f64>],
    adjacency: &AdjacencyList,
) -> ContourResult<()> {
    ensure_len("normals", mesh.vertex_count(), normals.len())?;
    ensure_len("adjacency", mesh.vertex_count(), adjacency.vertex_count())
}
