//! Local differential geometry of triangle meshes.
//!
//! Everything here works vertex by vertex in a rotated tangent frame whose
//! +z axis is the vertex normal:
//!
//! - [`compute_normals`]: face-averaged unit normals
//! - [`compute_curvature`]: mean curvature from a quadric fit
//! - [`smooth_curvature`]: Jacobi averaging of a scalar field
//! - [`compute_curvature_gradient`]: tangential gradient of curvature
//! - [`smooth_positions`]: Laplacian pre-smoothing of the vertex positions
//!
//! [`SurfaceGeometry`] bundles the per-vertex fields the level-set force
//! model consumes.

mod curvature;
mod frame;
pub mod lsq;
mod normals;
mod smooth;

pub use curvature::{
    CurvatureGradient, compute_curvature, compute_curvature_gradient, smooth_curvature,
};
pub(crate) use curvature::tangent_gradient;
pub use frame::TangentFrame;
pub use normals::compute_normals;
pub use smooth::smooth_positions;

use nalgebra::Vector3;

use crate::adjacency::AdjacencyList;
use crate::error::{ContourResult, ensure_len};
use crate::tracing_ext::OperationTimer;
use crate::types::Mesh;

/// Per-vertex surface fields computed once per segmentation run.
#[derive(Debug, Clone)]
pub struct SurfaceGeometry {
    /// Unit vertex normals.
    pub normals: Vec<Vector3<f64>>,
    /// Smoothed mean curvature.
    pub curvature: Vec<f64>,
    /// Tangential gradient of the smoothed curvature.
    pub gradient: CurvatureGradient,
}

impl SurfaceGeometry {
    /// Normals, curvature smoothed `smoothing_iterations` times, and the
    /// gradient of the smoothed curvature.
    pub fn compute(
        mesh: &Mesh,
        adjacency: &AdjacencyList,
        smoothing_iterations: usize,
    ) -> ContourResult<Self> {
        let _timer =
            OperationTimer::with_context("surface_geometry", mesh.face_count(), mesh.vertex_count());

        let normals = compute_normals(mesh);
        let raw = compute_curvature(mesh, &normals, adjacency)?;
        let curvature = smooth_curvature(&raw, adjacency, smoothing_iterations)?;
        let gradient = compute_curvature_gradient(mesh, &normals, adjacency, &curvature)?;

        Ok(Self {
            normals,
            curvature,
            gradient,
        })
    }

    /// Number of vertices covered.
    pub fn vertex_count(&self) -> usize {
        self.normals.len()
    }

    /// Check that every field has one entry per vertex of `mesh`.
    pub fn check(&self, mesh: &Mesh) -> ContourResult<()> {
        let n = mesh.vertex_count();
        ensure_len("normals", n, self.normals.len())?;
        ensure_len("curvature", n, self.curvature.len())?;
        ensure_len("curvature_gradient", n, self.gradient.de1.len())?;
        ensure_len("curvature_gradient", n, self.gradient.de2.len())
    }
}
