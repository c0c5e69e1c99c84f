//! Tracing extensions for contour evolution.
//!
//! Structured logging and timing for the segmentation stages. Nothing is
//! printed unless the application installs a subscriber:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // RUST_LOG=mesh_contour=debug for per-iteration layer sizes
//! ```
//!
//! # Log Levels
//!
//! - **WARN**: rejected input, degenerate contours, early stops
//! - **INFO**: stage timing and run summaries
//! - **DEBUG**: per-iteration layer sizes and energy
//! - **TRACE**: local fit convergence

use nalgebra::Point3;
use std::time::Instant;
use tracing::{Span, debug, info};

use crate::level_set::Layers;
use crate::types::Mesh;

/// A performance timer that logs duration on drop.
///
/// ```rust,ignore
/// use mesh_contour::tracing_ext::OperationTimer;
///
/// fn expensive_operation() {
///     let _timer = OperationTimer::new("expensive_operation");
///     // ... do work ...
/// } // Timer logs duration when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("contour_operation", operation = name);
        debug!(target: "mesh_contour::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer with mesh size fields.
    pub fn with_context(name: &'static str, face_count: usize, vertex_count: usize) -> Self {
        let span = tracing::info_span!(
            "contour_operation",
            operation = name,
            faces = face_count,
            vertices = vertex_count
        );
        debug!(
            target: "mesh_contour::timing",
            operation = name,
            faces = face_count,
            vertices = vertex_count,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "mesh_contour::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &Mesh, context: &str) {
    let (min_bounds, max_bounds) = mesh
        .bounds()
        .unwrap_or((Point3::origin(), Point3::origin()));
    let dims = max_bounds - min_bounds;

    debug!(
        target: "mesh_contour::mesh_state",
        context = context,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        mean_edge = format!("{:.4}", mesh.mean_edge_length()),
        "Mesh state"
    );
}

/// Log the size of every layer after an evolution step.
pub fn log_layer_stats(iteration: usize, layers: &Layers, energy: f64, full_relayer: bool) {
    debug!(
        target: "mesh_contour::evolve",
        iteration,
        zero = layers.zero.len(),
        plus1 = layers.plus1.len(),
        minus1 = layers.minus1.len(),
        plus2 = layers.plus2.len(),
        minus2 = layers.minus2.len(),
        energy = format!("{:.6}", energy),
        full_relayer,
        "Layer state"
    );
}

/// Log progress for a long-running operation.
pub fn log_progress(operation: &str, current: usize, total: usize, stage: Option<&str>) {
    let percent = if total > 0 {
        (current as f64 / total as f64 * 100.0) as u32
    } else {
        0
    };

    debug!(
        target: "mesh_contour::progress",
        operation = operation,
        current = current,
        total = total,
        percent = percent,
        stage = stage.unwrap_or("processing"),
        "Progress update"
    );
}
