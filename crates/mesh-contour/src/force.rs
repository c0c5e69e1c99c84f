//! Force models driving the level-set evolution.

use nalgebra::Vector2;
use tracing::trace;

use crate::adjacency::AdjacencyList;
use crate::error::{ContourError, ContourResult, ensure_len};
use crate::geometry::{SurfaceGeometry, TangentFrame, tangent_gradient};
use crate::level_set::Layers;
use crate::types::Mesh;

/// Supplies the speed of every contour vertex at each evolution step.
///
/// Implementations see the current layers and level-set function and must
/// return one value per vertex of `layers.zero`, in the same order.
pub trait ForceModel {
    /// Scalar energy of a contour, for monitoring.
    fn energy(&self, contour: &[u32]) -> f64;

    /// Force per zero-layer vertex.
    fn force(&self, layers: &Layers, phi: &[f64]) -> ContourResult<Vec<f64>>;
}

/// Magnitude below which the curvature term is ignored.
const CURVATURE_FLOOR: f64 = 1e-6;

/// Magnitude below which a gradient or a force maximum counts as zero.
const GRADIENT_FLOOR: f64 = 1e-12;

/// Curvature-driven force.
///
/// For every contour vertex the contour's in-plane normal `ne` is taken from
/// a linear fit of `phi` in the vertex tangent frame. The curvature gradient
/// projected onto `ne` and the curvature itself are each normalized by their
/// largest magnitude over the contour and blended as
/// `blend * gradient + (1 - blend) * curvature`, so every force lies in
/// `[-1, 1]`. When curvature is negligible everywhere on the contour the
/// normalized gradient term is used alone.
#[derive(Debug, Clone, Copy)]
pub struct CurvatureForceModel<'a> {
    mesh: &'a Mesh,
    adjacency: &'a AdjacencyList,
    geometry: &'a SurfaceGeometry,
    blend: f64,
}

impl<'a> CurvatureForceModel<'a> {
    /// Default weight of the gradient term.
    pub const DEFAULT_BLEND: f64 = 0.5;

    pub fn new(
        mesh: &'a Mesh,
        adjacency: &'a AdjacencyList,
        geometry: &'a SurfaceGeometry,
    ) -> ContourResult<Self> {
        geometry.check(mesh)?;
        ensure_len("adjacency", mesh.vertex_count(), adjacency.vertex_count())?;
        Ok(Self {
            mesh,
            adjacency,
            geometry,
            blend: Self::DEFAULT_BLEND,
        })
    }

    /// Set the gradient weight, which must lie in `[0, 1]`.
    pub fn with_blend(mut self, blend: f64) -> ContourResult<Self> {
        if !(0.0..=1.0).contains(&blend) {
            return Err(ContourError::invalid_parameter(
                "curvature_blend",
                format!("blend must be in [0, 1], got {}", blend),
            ));
        }
        self.blend = blend;
        Ok(self)
    }

    pub fn blend(&self) -> f64 {
        self.blend
    }
}

impl ForceModel for CurvatureForceModel<'_> {
    fn energy(&self, contour: &[u32]) -> f64 {
        if contour.is_empty() {
            return 0.0;
        }
        let total: f64 = contour
            .iter()
            .map(|&v| self.geometry.curvature[v as usize])
            .sum();
        total / contour.len() as f64
    }

    fn force(&self, layers: &Layers, phi: &[f64]) -> ContourResult<Vec<f64>> {
        ensure_len("phi", self.mesh.vertex_count(), phi.len())?;

        let mut gradient_term = Vec::with_capacity(layers.zero.len());
        let mut curvature_term = Vec::with_capacity(layers.zero.len());
        for v in layers.zero.iter() {
            let frame = TangentFrame::from_normal(&self.geometry.normals[v as usize]);
            let g = tangent_gradient(self.mesh, self.adjacency, &frame, v, phi);
            let norm = g.norm();
            let direction = if norm > GRADIENT_FLOOR {
                g / norm
            } else {
                Vector2::zeros()
            };
            gradient_term.push(self.geometry.gradient.at(v).dot(&direction));
            curvature_term.push(self.geometry.curvature[v as usize]);
        }

        let max_gradient = max_abs(&gradient_term);
        let max_curvature = max_abs(&curvature_term);
        trace!(max_gradient, max_curvature, "Force magnitudes");

        if max_gradient > GRADIENT_FLOOR {
            for f in &mut gradient_term {
                *f /= max_gradient;
            }
        } else {
            gradient_term.iter_mut().for_each(|f| *f = 0.0);
        }

        if max_curvature < CURVATURE_FLOOR {
            return Ok(gradient_term);
        }

        Ok(gradient_term
            .into_iter()
            .zip(curvature_term)
            .map(|(g, k)| self.blend * g + (1.0 - self.blend) * k / max_curvature)
            .collect())
    }
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |m, v| m.max(v.abs()))
}
