//! Error types for contour evolution with rich diagnostics.
//!
//! Every stage of the pipeline reports failures through [`ContourError`]:
//! - Machine-readable error codes for programmatic handling
//! - Context (which vertex, which face, which seed)
//! - Recovery suggestions for common issues
//! - Terminal display via miette
//!
//! # Error Codes
//!
//! Each error has a unique code in the format `CONTOUR-XXXX`:
//! - `CONTOUR-1xxx`: Input validity (empty mesh, bad indices, too few seeds)
//! - `CONTOUR-2xxx`: Degenerate topology (self-intersecting initial curve)
//! - `CONTOUR-3xxx`: Stage data errors (per-vertex fields of the wrong size)
//! - `CONTOUR-4xxx`: Configuration errors
//!
//! Numerical non-convergence of the local least-squares fits is deliberately
//! not an error: the best estimate after the iteration cap is used.
//!
//! # Example
//!
//! ```
//! use mesh_contour::{ContourError, ErrorCode};
//!
//! let err = ContourError::insufficient_seeds(2);
//! assert_eq!(err.code(), ErrorCode::InsufficientSeeds);
//! assert_eq!(err.code().as_str(), "CONTOUR-1005");
//! ```

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for contour operations.
pub type ContourResult<T> = Result<T, ContourError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input validity (1xxx)
    /// CONTOUR-1001: Mesh has no vertices or faces
    EmptyMesh = 1001,
    /// CONTOUR-1002: Face references invalid vertex index
    InvalidVertexIndex = 1002,
    /// CONTOUR-1003: Vertex has NaN or Infinity coordinate
    InvalidCoordinate = 1003,
    /// CONTOUR-1004: Parameter outside its valid range
    InvalidParameter = 1004,
    /// CONTOUR-1005: Fewer than three seeds
    InsufficientSeeds = 1005,
    /// CONTOUR-1006: Seed index outside the mesh
    SeedOutOfRange = 1006,
    /// CONTOUR-1007: Same seed listed twice
    DuplicateSeed = 1007,

    // Degenerate topology (2xxx)
    /// CONTOUR-2001: Initial curve revisits a vertex or cannot be closed
    DegenerateTopology = 2001,

    // Stage data (3xxx)
    /// CONTOUR-3001: Per-vertex field does not match the mesh
    FieldMismatch = 3001,

    // Configuration (4xxx)
    /// CONTOUR-4001: Configuration could not be parsed
    Config = 4001,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `CONTOUR-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::EmptyMesh => "CONTOUR-1001",
            ErrorCode::InvalidVertexIndex => "CONTOUR-1002",
            ErrorCode::InvalidCoordinate => "CONTOUR-1003",
            ErrorCode::InvalidParameter => "CONTOUR-1004",
            ErrorCode::InsufficientSeeds => "CONTOUR-1005",
            ErrorCode::SeedOutOfRange => "CONTOUR-1006",
            ErrorCode::DuplicateSeed => "CONTOUR-1007",
            ErrorCode::DegenerateTopology => "CONTOUR-2001",
            ErrorCode::FieldMismatch => "CONTOUR-3001",
            ErrorCode::Config => "CONTOUR-4001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recovery suggestions for contour errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Check the input mesh for the listed problems.
    CheckInputMesh { checks: Vec<String> },
    /// Supply different seed vertices.
    ChooseDifferentSeeds { hint: String },
    /// Adjust parameters for the operation.
    AdjustParameters { parameters: Vec<(String, String)> },
    /// Recompute the stage inputs from the same mesh.
    RecomputeInputs { stages: Vec<String> },
    /// No automatic recovery available.
    None,
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoverySuggestion::CheckInputMesh { checks } => {
                write!(f, "Check the input mesh for: {}", checks.join(", "))
            }
            RecoverySuggestion::ChooseDifferentSeeds { hint } => {
                write!(f, "Choose different seeds: {}", hint)
            }
            RecoverySuggestion::AdjustParameters { parameters } => {
                let params: Vec<String> = parameters
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect();
                write!(f, "Try adjusting: {}", params.join(", "))
            }
            RecoverySuggestion::RecomputeInputs { stages } => {
                write!(f, "Recompute from the same mesh: {}", stages.join(", "))
            }
            RecoverySuggestion::None => write!(f, "No automatic recovery available"),
        }
    }
}

/// Location information for contour errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorLocation {
    /// Error at a specific vertex.
    Vertex { index: u32 },
    /// Error at a specific face.
    Face { index: usize },
    /// Error at a position in the seed list.
    Seed { position: usize, vertex: u32 },
}

impl std::fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorLocation::Vertex { index } => write!(f, "vertex {}", index),
            ErrorLocation::Face { index } => write!(f, "face {}", index),
            ErrorLocation::Seed { position, vertex } => {
                write!(f, "seed #{} (vertex {})", position, vertex)
            }
        }
    }
}

/// Errors that can occur while building geometry, initializing or evolving a contour.
#[derive(Debug, Error, Diagnostic)]
pub enum ContourError {
    /// Empty mesh (no vertices or faces).
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(contour::input::empty),
        help("The mesh must have at least one vertex and one triangle.")
    )]
    EmptyMesh { details: String },

    /// Invalid vertex index in face data.
    #[error(
        "invalid vertex index: face {face_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(contour::input::vertex_index),
        help("Remove faces with out-of-range indices before segmentation.")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },

    /// Invalid coordinate value (NaN or Infinity).
    #[error("invalid coordinate at vertex {vertex_index}: {coordinate} is {value}")]
    #[diagnostic(
        code(contour::input::coordinate),
        help("Check the source data for numerical issues.")
    )]
    InvalidCoordinate {
        vertex_index: usize,
        coordinate: &'static str,
        value: f64,
    },

    /// A parameter is outside its valid range.
    #[error("invalid parameter {name}: {details}")]
    #[diagnostic(code(contour::input::parameter))]
    InvalidParameter { name: &'static str, details: String },

    /// Fewer than three seeds were supplied.
    #[error("need at least {required} seed vertices, got {count}")]
    #[diagnostic(
        code(contour::input::seeds),
        help("A closed initial contour needs at least three seeds.")
    )]
    InsufficientSeeds { count: usize, required: usize },

    /// Seed index does not name a mesh vertex.
    #[error("seed #{position} is vertex {vertex}, but mesh only has {vertex_count} vertices")]
    #[diagnostic(code(contour::input::seed_range))]
    SeedOutOfRange {
        position: usize,
        vertex: u32,
        vertex_count: usize,
    },

    /// The same vertex appears twice in the seed list.
    #[error("seed #{position} repeats vertex {vertex}")]
    #[diagnostic(code(contour::input::seed_duplicate))]
    DuplicateSeed { position: usize, vertex: u32 },

    /// Initial curve is self-intersecting or cannot be closed.
    #[error("degenerate initial contour: {details}")]
    #[diagnostic(
        code(contour::topology::degenerate),
        help("Supply seeds that are further apart, or use the basin initializer.")
    )]
    DegenerateTopology { details: String, vertex: Option<u32> },

    /// A per-vertex field or adjacency does not match the mesh it is used with.
    #[error("{field} has {actual} entries, expected {expected}")]
    #[diagnostic(
        code(contour::data::field),
        help("Recompute normals, curvature and adjacency from the same mesh.")
    )]
    FieldMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Configuration could not be parsed.
    #[cfg(feature = "config")]
    #[error("invalid configuration: {details}")]
    #[diagnostic(code(contour::config::parse))]
    Config { details: String },
}

impl ContourError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ContourError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            ContourError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
            ContourError::InvalidCoordinate { .. } => ErrorCode::InvalidCoordinate,
            ContourError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            ContourError::InsufficientSeeds { .. } => ErrorCode::InsufficientSeeds,
            ContourError::SeedOutOfRange { .. } => ErrorCode::SeedOutOfRange,
            ContourError::DuplicateSeed { .. } => ErrorCode::DuplicateSeed,
            ContourError::DegenerateTopology { .. } => ErrorCode::DegenerateTopology,
            ContourError::FieldMismatch { .. } => ErrorCode::FieldMismatch,
            #[cfg(feature = "config")]
            ContourError::Config { .. } => ErrorCode::Config,
        }
    }

    /// Returns a recovery suggestion for this error.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            ContourError::EmptyMesh { .. } => RecoverySuggestion::CheckInputMesh {
                checks: vec!["mesh has vertices".into(), "mesh has triangles".into()],
            },
            ContourError::InvalidVertexIndex { .. } => RecoverySuggestion::CheckInputMesh {
                checks: vec!["face indices".into()],
            },
            ContourError::InvalidCoordinate { .. } => RecoverySuggestion::CheckInputMesh {
                checks: vec!["coordinate values".into()],
            },
            ContourError::InvalidParameter { name, .. } => RecoverySuggestion::AdjustParameters {
                parameters: vec![((*name).into(), "use a value in range".into())],
            },
            ContourError::InsufficientSeeds { required, .. } => {
                RecoverySuggestion::ChooseDifferentSeeds {
                    hint: format!("place at least {} seeds around the region", required),
                }
            }
            ContourError::SeedOutOfRange { .. } => RecoverySuggestion::ChooseDifferentSeeds {
                hint: "seed indices must name mesh vertices".into(),
            },
            ContourError::DuplicateSeed { .. } => RecoverySuggestion::ChooseDifferentSeeds {
                hint: "remove repeated seeds".into(),
            },
            ContourError::DegenerateTopology { .. } => RecoverySuggestion::ChooseDifferentSeeds {
                hint: "spread the seeds out so the connecting paths cannot cross".into(),
            },
            ContourError::FieldMismatch { field, .. } => RecoverySuggestion::RecomputeInputs {
                stages: vec![(*field).into()],
            },
            #[cfg(feature = "config")]
            ContourError::Config { .. } => RecoverySuggestion::None,
        }
    }

    /// Returns location information if available.
    pub fn location(&self) -> Option<ErrorLocation> {
        match self {
            ContourError::InvalidVertexIndex { face_index, .. } => Some(ErrorLocation::Face {
                index: *face_index,
            }),
            ContourError::InvalidCoordinate { vertex_index, .. } => Some(ErrorLocation::Vertex {
                index: *vertex_index as u32,
            }),
            ContourError::SeedOutOfRange {
                position, vertex, ..
            }
            | ContourError::DuplicateSeed { position, vertex } => Some(ErrorLocation::Seed {
                position: *position,
                vertex: *vertex,
            }),
            ContourError::DegenerateTopology {
                vertex: Some(v), ..
            } => Some(ErrorLocation::Vertex { index: *v }),
            _ => None,
        }
    }

    // Constructor helpers for common error patterns

    /// Create an EmptyMesh error.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        ContourError::EmptyMesh {
            details: details.into(),
        }
    }

    /// Create an InvalidVertexIndex error.
    pub fn invalid_vertex_index(face_index: usize, vertex_index: u32, vertex_count: usize) -> Self {
        ContourError::InvalidVertexIndex {
            face_index,
            vertex_index,
            vertex_count,
        }
    }

    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(vertex_index: usize, coordinate: &'static str, value: f64) -> Self {
        ContourError::InvalidCoordinate {
            vertex_index,
            coordinate,
            value,
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(name: &'static str, details: impl Into<String>) -> Self {
        ContourError::InvalidParameter {
            name,
            details: details.into(),
        }
    }

    /// Create an InsufficientSeeds error (three seeds required).
    pub fn insufficient_seeds(count: usize) -> Self {
        ContourError::InsufficientSeeds { count, required: 3 }
    }

    /// Create a DegenerateTopology error.
    pub fn degenerate(details: impl Into<String>, vertex: Option<u32>) -> Self {
        ContourError::DegenerateTopology {
            details: details.into(),
            vertex,
        }
    }

    /// Create a FieldMismatch error.
    pub fn field_mismatch(field: &'static str, expected: usize, actual: usize) -> Self {
        ContourError::FieldMismatch {
            field,
            expected,
            actual,
        }
    }
}

/// Checks that a per-vertex field has one entry per mesh vertex.
pub(crate) fn ensure_len(field: &'static str, expected: usize, actual: usize) -> ContourResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ContourError::field_mismatch(field, expected, actual))
    }
}
