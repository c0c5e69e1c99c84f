//! Curvature-driven contour evolution on triangle meshes.
//!
//! This crate segments a surface region bounded by a closed vertex contour.
//! A user places a handful of seed vertices; they are joined into a closed
//! path, and that path then evolves as the zero level of a sparse-field
//! level set, pulled toward ridges and valleys of the surface's mean
//! curvature.
//!
//! # Pipeline
//!
//! 1. **Adjacency** ([`AdjacencyList`]): immediate and k-ring neighbor lists
//! 2. **Geometry** ([`geometry`]): normals, mean curvature from local quadric
//!    fits, smoothed curvature and its tangential gradient
//! 3. **Initialization** ([`path`]): seeds joined greedily or along
//!    nearest-seed basin boundaries
//! 4. **Evolution** ([`SparseFieldLevelSet`]): five-layer narrow band moved by
//!    a [`ForceModel`], by default [`CurvatureForceModel`]
//!
//! [`Segmentation`] runs all four stages with one set of
//! [`SegmentationParams`].
//!
//! # Conventions
//!
//! Vertex indices are `u32` positions into [`Mesh::vertices`]. Every
//! per-vertex field in this crate (normals, curvature, `phi`, labels) is a
//! `Vec` indexed the same way.
//!
//! Face winding is **counter-clockwise (CCW) when viewed from outside** for
//! [`Handedness::Right`] meshes, so vertex normals point outward. The sign of
//! reported curvature follows the mesh's [`Handedness`].
//!
//! `phi` is negative inside the contour and positive outside. The inside is
//! whatever the initial contour separates from the largest remaining region.
//!
//! # Quick Start
//!
//! ```
//! use mesh_contour::{Direction, Segmentation, SegmentationParams, shapes};
//!
//! let mesh = shapes::grid(12, 12, 1.0);
//! let params = SegmentationParams::quick()
//!     .with_iterations(5)
//!     .with_direction(Direction::Expand);
//!
//! let segmentation = Segmentation::new(&mesh, params).unwrap();
//! // Corners of a square around the grid center.
//! let result = segmentation.run(&[39, 43, 91, 87]).unwrap();
//!
//! assert!(!result.contour.is_empty());
//! assert_eq!(result.phi.len(), mesh.vertex_count());
//! ```
//!
//! # Stages on their own
//!
//! ```
//! use mesh_contour::{AdjacencyList, SurfaceGeometry, shapes};
//!
//! let sphere = shapes::icosphere(3, 2.0);
//! let adjacency = AdjacencyList::immediate(&sphere).unwrap();
//! let geometry = SurfaceGeometry::compute(&sphere, &adjacency, 0).unwrap();
//!
//! // Mean curvature of a sphere of radius 2 is 1/2 everywhere.
//! let mean: f64 = geometry.curvature.iter().sum::<f64>() / sphere.vertex_count() as f64;
//! assert!((mean - 0.5).abs() < 0.05);
//! ```
//!
//! # Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.
//! Stage timings go to the `mesh_contour::timing` target and per-iteration
//! band sizes to `mesh_contour::evolve` at `debug`.

mod error;
mod force;
mod pipeline;
pub mod tracing_ext;
mod types;

#[cfg(test)]
mod edge_cases;

pub mod adjacency;
pub mod geometry;
pub mod level_set;
pub mod path;
pub mod shapes;

pub use error::{
    ContourError, ContourResult, ErrorCode, ErrorLocation, RecoverySuggestion,
};
pub use types::{Handedness, Mesh, Triangle};

pub use adjacency::AdjacencyList;
pub use force::{CurvatureForceModel, ForceModel};
pub use geometry::{
    CurvatureGradient, SurfaceGeometry, TangentFrame, compute_curvature,
    compute_curvature_gradient, compute_normals, smooth_curvature, smooth_positions,
};
pub use level_set::{
    Direction, EvolveParams, EvolveSummary, LayerSet, Layers, SparseFieldLevelSet, point_type,
};
pub use path::{
    MIN_SEEDS, PathInitializer, SeedBasins, init_closed_path, init_path, nearest_seed_basins,
    snap_to_vertices, validate_seeds,
};
pub use pipeline::{Segmentation, SegmentationParams, SegmentationResult};

pub use tracing_ext::{OperationTimer, log_layer_stats, log_mesh_stats, log_progress};
