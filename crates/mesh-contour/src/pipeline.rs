//! End-to-end segmentation runs.
//!
//! [`Segmentation`] owns everything one run needs: the adjacency graphs, the
//! pre-smoothed surface and its curvature fields. Build it once per mesh and
//! call [`Segmentation::run`] for each seed set. Nothing outlives the value.
//!
//! # Example
//!
//! ```
//! use mesh_contour::{Segmentation, SegmentationParams, shapes};
//!
//! let mesh = shapes::icosphere(2, 1.0);
//! let params = SegmentationParams::quick().with_iterations(10);
//! let segmentation = Segmentation::new(&mesh, params).unwrap();
//!
//! // Three vertices around the first icosahedron vertex.
//! let seeds = segmentation.adjacency().neighbors(0)[..3].to_vec();
//! match segmentation.run(&seeds) {
//!     Ok(result) => println!("contour has {} vertices", result.contour.len()),
//!     Err(e) => println!("seeds rejected: {}", e),
//! }
//! ```

use tracing::{info, warn};

use crate::adjacency::AdjacencyList;
use crate::error::{ContourError, ContourResult};
use crate::force::CurvatureForceModel;
use crate::geometry::{SurfaceGeometry, smooth_positions};
use crate::level_set::{Direction, EvolveParams, EvolveSummary, SparseFieldLevelSet};
use crate::path::PathInitializer;
use crate::tracing_ext::{OperationTimer, log_mesh_stats};
use crate::types::{Handedness, Mesh};

/// Parameters for a full segmentation run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SegmentationParams {
    /// Evolution steps. Default: 300
    pub iterations: usize,
    /// Laplacian passes over vertex positions before curvature estimation.
    /// Default: 100
    pub mesh_smoothing_iterations: usize,
    /// Fraction of the way each pre-smoothing pass moves a vertex toward its
    /// neighbor centroid. Default: 0.1
    pub mesh_smoothing_relaxation: f64,
    /// Neighbor-averaging passes over the curvature field. Default: 100
    pub curvature_smoothing_iterations: usize,
    /// Ring depth of the neighborhoods used by the local fits. Default: 1
    pub adjacency_depth: usize,
    /// Overrides the mesh's own winding tag when set. Default: None
    pub handedness: Option<Handedness>,
    /// Weight of the curvature-gradient term against raw curvature.
    /// Default: 0.5
    pub curvature_blend: f64,
    /// How seeds become the initial contour. Default: greedy
    pub initializer: PathInitializer,
    /// Step size, rebuild interval and direction.
    pub evolve: EvolveParams,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            iterations: 300,
            mesh_smoothing_iterations: 100,
            mesh_smoothing_relaxation: 0.1,
            curvature_smoothing_iterations: 100,
            adjacency_depth: 1,
            handedness: None,
            evolve: EvolveParams::default(),
            curvature_blend: CurvatureForceModel::DEFAULT_BLEND,
            initializer: PathInitializer::Greedy,
        }
    }
}

impl SegmentationParams {
    /// Fewer iterations everywhere, for previews and tests.
    pub fn quick() -> Self {
        Self {
            iterations: 50,
            mesh_smoothing_iterations: 10,
            curvature_smoothing_iterations: 20,
            ..Default::default()
        }
    }

    /// Wider fitting neighborhoods and basin initialization, for noisy
    /// scans.
    pub fn for_noisy_meshes() -> Self {
        Self {
            mesh_smoothing_iterations: 200,
            curvature_smoothing_iterations: 200,
            adjacency_depth: 2,
            initializer: PathInitializer::Basins,
            ..Default::default()
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_mesh_smoothing(mut self, iterations: usize, relaxation: f64) -> Self {
        self.mesh_smoothing_iterations = iterations;
        self.mesh_smoothing_relaxation = relaxation;
        self
    }

    pub fn with_curvature_smoothing(mut self, iterations: usize) -> Self {
        self.curvature_smoothing_iterations = iterations;
        self
    }

    pub fn with_adjacency_depth(mut self, depth: usize) -> Self {
        self.adjacency_depth = depth;
        self
    }

    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = Some(handedness);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.evolve.direction = direction;
        self
    }

    pub fn with_initializer(mut self, initializer: PathInitializer) -> Self {
        self.initializer = initializer;
        self
    }

    /// Check every field, including the nested evolution params.
    pub fn validate(&self) -> ContourResult<()> {
        if self.adjacency_depth == 0 {
            return Err(ContourError::invalid_parameter(
                "adjacency_depth",
                "depth must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.mesh_smoothing_relaxation) {
            return Err(ContourError::invalid_parameter(
                "mesh_smoothing_relaxation",
                format!(
                    "relaxation must be in [0, 1], got {}",
                    self.mesh_smoothing_relaxation
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.curvature_blend) {
            return Err(ContourError::invalid_parameter(
                "curvature_blend",
                format!("blend must be in [0, 1], got {}", self.curvature_blend),
            ));
        }
        self.evolve.validate()
    }

    /// Parse from a TOML string. Missing fields take their defaults.
    #[cfg(feature = "config")]
    pub fn from_toml(toml_str: &str) -> ContourResult<Self> {
        toml::from_str(toml_str).map_err(|e| ContourError::Config {
            details: e.to_string(),
        })
    }

    /// Load from a TOML file.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> ContourResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ContourError::Config {
            details: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml(&contents)
    }

    /// Serialize to TOML.
    #[cfg(feature = "config")]
    pub fn to_toml(&self) -> ContourResult<String> {
        toml::to_string_pretty(self).map_err(|e| ContourError::Config {
            details: e.to_string(),
        })
    }

    /// Parse from a JSON string. Missing fields take their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json_str: &str) -> ContourResult<Self> {
        serde_json::from_str(json_str).map_err(|e| ContourError::Config {
            details: e.to_string(),
        })
    }

    /// Serialize to JSON.
    #[cfg(feature = "config")]
    pub fn to_json(&self) -> ContourResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ContourError::Config {
            details: e.to_string(),
        })
    }
}

/// Output of one segmentation run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct SegmentationResult {
    /// Contour the evolution started from.
    pub initial_contour: Vec<u32>,
    /// Final contour (zero layer), sorted by vertex index.
    pub contour: Vec<u32>,
    /// Level-set function per vertex: negative inside, positive outside.
    pub phi: Vec<f64>,
    /// Layer label per vertex.
    pub point_types: Vec<i8>,
    /// `-1` inside, `0` contour, `+1` outside.
    pub classification: Vec<i8>,
    /// What the evolution did.
    pub summary: EvolveSummary,
}

impl SegmentationResult {
    /// Signed per-vertex field for display or contour extraction.
    pub fn signed_field(&self) -> &[f64] {
        &self.phi
    }

    /// Number of vertices classified as inside.
    pub fn inside_count(&self) -> usize {
        self.classification.iter().filter(|&&c| c < 0).count()
    }

    /// Number of vertices classified as outside.
    pub fn outside_count(&self) -> usize {
        self.classification.iter().filter(|&&c| c > 0).count()
    }
}

/// Context for segmenting one mesh.
#[derive(Debug, Clone)]
pub struct Segmentation<'m> {
    mesh: &'m Mesh,
    params: SegmentationParams,
    adjacency: AdjacencyList,
    fitting: AdjacencyList,
    surface: Mesh,
    geometry: SurfaceGeometry,
}

impl<'m> Segmentation<'m> {
    /// Validate inputs and compute every per-mesh field.
    pub fn new(mesh: &'m Mesh, params: SegmentationParams) -> ContourResult<Self> {
        let _timer =
            OperationTimer::with_context("prepare_segmentation", mesh.face_count(), mesh.vertex_count());
        params.validate()?;
        mesh.validate().inspect_err(|e| warn!(error = %e, "Rejected input mesh"))?;
        log_mesh_stats(mesh, "segmentation input");

        let adjacency = AdjacencyList::immediate(mesh)?;
        let fitting = if params.adjacency_depth == 1 {
            adjacency.clone()
        } else {
            AdjacencyList::build(mesh, params.adjacency_depth)?
        };

        let mut surface = smooth_positions(
            mesh,
            &adjacency,
            params.mesh_smoothing_iterations,
            params.mesh_smoothing_relaxation,
        )?;
        if let Some(handedness) = params.handedness {
            surface.handedness = handedness;
        }

        let geometry =
            SurfaceGeometry::compute(&surface, &fitting, params.curvature_smoothing_iterations)?;

        Ok(Self {
            mesh,
            params,
            adjacency,
            fitting,
            surface,
            geometry,
        })
    }

    /// Closed contour through `seeds` using the configured initializer.
    pub fn initial_contour(&self, seeds: &[u32]) -> ContourResult<Vec<u32>> {
        self.params
            .initializer
            .run(self.mesh, &self.adjacency, seeds)
            .inspect_err(|e| warn!(error = %e, seeds = seeds.len(), "Rejected seeds"))
    }

    /// Initialize from `seeds` and evolve.
    pub fn run(&self, seeds: &[u32]) -> ContourResult<SegmentationResult> {
        let contour = self.initial_contour(seeds)?;
        self.run_from_contour(contour)
    }

    /// Evolve from an already closed contour.
    pub fn run_from_contour(&self, contour: Vec<u32>) -> ContourResult<SegmentationResult> {
        let _timer = OperationTimer::with_context(
            "segmentation",
            self.mesh.face_count(),
            self.mesh.vertex_count(),
        );

        let model = CurvatureForceModel::new(&self.surface, &self.fitting, &self.geometry)?
            .with_blend(self.params.curvature_blend)?;
        let mut level_set = SparseFieldLevelSet::new(&self.adjacency, &contour)?;
        let summary = level_set.evolve(self.params.iterations, &model, &self.params.evolve)?;

        let final_contour = level_set.zero_layer().to_vec();
        let classification = level_set.classification();
        let (phi, point_types) = level_set.into_fields();

        let result = SegmentationResult {
            initial_contour: contour,
            contour: final_contour,
            phi,
            point_types,
            classification,
            summary,
        };
        info!(
            contour_len = result.contour.len(),
            inside = result.inside_count(),
            outside = result.outside_count(),
            "Segmentation finished"
        );
        Ok(result)
    }

    pub fn mesh(&self) -> &Mesh {
        self.mesh
    }

    pub fn params(&self) -> &SegmentationParams {
        &self.params
    }

    /// Depth-1 adjacency used by the path search and the level set.
    pub fn adjacency(&self) -> &AdjacencyList {
        &self.adjacency
    }

    /// Pre-smoothed copy of the mesh the geometry was estimated on.
    pub fn smoothed_mesh(&self) -> &Mesh {
        &self.surface
    }

    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }
}
