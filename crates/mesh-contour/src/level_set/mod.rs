//! Sparse-field level-set evolution over the mesh graph.
//!
//! The contour is the zero layer `L_z` of an implicit function `phi` defined
//! on vertices. Only a narrow band is tracked: the contour, two layers on
//! the outside (`L_p1`, `L_p2`, positive `phi`) and two on the inside
//! (`L_n1`, `L_n2`, negative `phi`). Band membership uses half-open
//! intervals:
//!
//! | layer  | `phi`            |
//! |--------|------------------|
//! | `L_n2` | `[-2.5, -1.5)`   |
//! | `L_n1` | `[-1.5, -0.5)`   |
//! | `L_z`  | `[-0.5, 0.5)`    |
//! | `L_p1` | `[0.5, 1.5)`     |
//! | `L_p2` | `[1.5, 2.5)`     |
//!
//! Each step moves `phi` on the contour by the force, then updates the band
//! incrementally. Periodically the band is rebuilt from the sign of `phi`
//! alone to correct drift.

mod layers;

pub use layers::{LayerSet, Layers, point_type};

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::adjacency::AdjacencyList;
use crate::error::{ContourError, ContourResult, ensure_len};
use crate::force::ForceModel;
use crate::tracing_ext::{OperationTimer, log_layer_stats, log_progress};

/// Largest contour value that stays below `0.5` after adding 1 or 2.
const ZERO_UPPER: f64 = 0.5 - 4.0 * f64::EPSILON;

/// Which way the contour moves under a positive force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Direction {
    /// Positive force lowers `phi`, so the inside grows.
    #[default]
    Expand,
    /// Positive force raises `phi`, so the inside shrinks.
    Shrink,
}

impl Direction {
    /// Sign applied to the force when updating `phi`.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Expand => -1.0,
            Direction::Shrink => 1.0,
        }
    }
}

/// Parameters for [`SparseFieldLevelSet::evolve`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EvolveParams {
    /// Step size applied to the force. Default: 0.15
    pub cfl: f64,
    /// Rebuild the band from scratch every this many iterations. The last
    /// iteration always rebuilds. Default: 5
    pub recompute_interval: usize,
    /// Propagation direction. Default: expand
    pub direction: Direction,
}

impl Default for EvolveParams {
    fn default() -> Self {
        Self {
            cfl: 0.15,
            recompute_interval: 5,
            direction: Direction::Expand,
        }
    }
}

impl EvolveParams {
    /// Params that move the contour the other way.
    pub fn shrinking() -> Self {
        Self {
            direction: Direction::Shrink,
            ..Default::default()
        }
    }

    /// Check the step size and rebuild interval.
    pub fn validate(&self) -> ContourResult<()> {
        if !(self.cfl.is_finite() && self.cfl > 0.0) {
            return Err(ContourError::invalid_parameter(
                "cfl",
                format!("step size must be positive and finite, got {}", self.cfl),
            ));
        }
        if self.recompute_interval == 0 {
            return Err(ContourError::invalid_parameter(
                "recompute_interval",
                "interval must be at least 1",
            ));
        }
        Ok(())
    }
}

/// What an [`SparseFieldLevelSet::evolve`] call did.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct EvolveSummary {
    /// Iterations actually performed.
    pub iterations: usize,
    /// How many of them rebuilt the band from scratch.
    pub full_relayers: usize,
    /// Vertices on the final contour.
    pub contour_len: usize,
    /// Force model energy of the final contour.
    pub energy: f64,
    /// Whether the contour vanished before all iterations ran.
    pub stopped_early: bool,
}

/// Narrow-band level set on a mesh graph.
///
/// Holds a non-owning reference to the depth-1 adjacency of the mesh and
/// owns the per-vertex `phi` and layer labels.
#[derive(Debug, Clone)]
pub struct SparseFieldLevelSet<'a> {
    adjacency: &'a AdjacencyList,
    phi: Vec<f64>,
    labels: Vec<i8>,
    layers: Layers,
}

impl<'a> SparseFieldLevelSet<'a> {
    /// Start from a closed contour.
    ///
    /// The mesh is assumed to be a topological sphere: removing the contour
    /// must split it into at least two connected pieces. The largest piece
    /// is taken as the outside and every other piece as the inside. The
    /// flood fill always runs to completion.
    ///
    /// # Errors
    ///
    /// [`ContourError::DegenerateTopology`] if the contour is empty, holds an
    /// out-of-range vertex, or does not separate the mesh.
    pub fn new(adjacency: &'a AdjacencyList, contour: &[u32]) -> ContourResult<Self> {
        let n = adjacency.vertex_count();
        if contour.is_empty() {
            return Err(ContourError::degenerate("initial contour is empty", None));
        }
        if let Some(&bad) = contour.iter().find(|&&v| v as usize >= n) {
            return Err(ContourError::degenerate(
                format!("contour vertex {} is not on a mesh with {} vertices", bad, n),
                Some(bad),
            ));
        }

        let on_contour: Vec<bool> = {
            let mut mask = vec![false; n];
            for &v in contour {
                mask[v as usize] = true;
            }
            mask
        };
        let components = split_components(adjacency, &on_contour);
        if components.len() < 2 {
            warn!(
                contour_len = contour.len(),
                components = components.len(),
                "Contour does not separate the mesh"
            );
            return Err(ContourError::degenerate(
                format!(
                    "removing the contour leaves {} connected region(s), need at least 2",
                    components.len()
                ),
                contour.first().copied(),
            ));
        }

        let outside = components
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
            .map(|(i, _)| i)
            .unwrap_or(0);

        let mut phi = vec![0.0; n];
        for (i, component) in components.iter().enumerate() {
            let value = if i == outside {
                f64::from(point_type::OUTSIDE)
            } else {
                f64::from(point_type::INSIDE)
            };
            for &v in component {
                phi[v as usize] = value;
            }
        }

        let contour_len = on_contour.iter().filter(|&&c| c).count();
        debug!(
            contour_len,
            outside = components[outside].len(),
            inside = n - contour_len - components[outside].len(),
            regions = components.len(),
            "Classified initial contour"
        );

        let mut level_set = Self {
            adjacency,
            phi,
            labels: vec![point_type::OUTSIDE; n],
            layers: Layers::default(),
        };
        level_set.relayer();
        Ok(level_set)
    }

    /// Resume from an existing level-set function. The band is rebuilt from
    /// the sign of `phi`.
    pub fn from_field(adjacency: &'a AdjacencyList, phi: Vec<f64>) -> ContourResult<Self> {
        ensure_len("phi", adjacency.vertex_count(), phi.len())?;
        if let Some(v) = phi.iter().position(|p| !p.is_finite()) {
            return Err(ContourError::invalid_parameter(
                "phi",
                format!("value at vertex {} is not finite", v),
            ));
        }
        let n = phi.len();
        let mut level_set = Self {
            adjacency,
            phi,
            labels: vec![point_type::OUTSIDE; n],
            layers: Layers::default(),
        };
        level_set.relayer();
        Ok(level_set)
    }

    /// Run `iterations` evolution steps under `model`.
    ///
    /// Stops early, with a warning, if the contour becomes empty.
    pub fn evolve(
        &mut self,
        iterations: usize,
        model: &dyn ForceModel,
        params: &EvolveParams,
    ) -> ContourResult<EvolveSummary> {
        params.validate()?;
        let _timer = OperationTimer::new("evolve");

        let step = params.direction.sign() * params.cfl;
        let mut performed = 0;
        let mut full_relayers = 0;
        let mut stopped_early = false;

        for i in 0..iterations {
            if self.layers.zero.is_empty() {
                warn!(iteration = i, "Contour vanished, stopping evolution");
                stopped_early = true;
                break;
            }

            let force = model.force(&self.layers, &self.phi)?;
            ensure_len("force", self.layers.zero.len(), force.len())?;
            for (v, f) in self.layers.zero.iter().zip(&force) {
                self.phi[v as usize] += step * f;
            }

            let full = (i + 1) % params.recompute_interval == 0 || i + 1 == iterations;
            if full {
                self.relayer();
                full_relayers += 1;
            } else {
                self.update_layers();
            }
            performed += 1;

            log_layer_stats(
                i,
                &self.layers,
                model.energy(self.layers.zero.as_slice()),
                full,
            );
            if (i + 1) % 50 == 0 {
                log_progress("evolve", i + 1, iterations, None);
            }
        }

        let summary = EvolveSummary {
            iterations: performed,
            full_relayers,
            contour_len: self.layers.zero.len(),
            energy: model.energy(self.layers.zero.as_slice()),
            stopped_early,
        };
        info!(
            iterations = summary.iterations,
            full_relayers = summary.full_relayers,
            contour_len = summary.contour_len,
            energy = format!("{:.6}", summary.energy),
            "Evolution finished"
        );
        Ok(summary)
    }

    /// Rebuild every layer from the current `phi`.
    ///
    /// A vertex joins `L_z` when it shares an edge with a vertex of opposite
    /// or zero sign and is the endpoint closer to zero; its `phi` is clamped
    /// into `[-0.5, 0.5)`. The remaining band is grown breadth-first from the
    /// contour and band `phi` values are reset to their layer distance. The
    /// result depends only on `phi`, so rebuilding twice changes nothing.
    pub fn relayer(&mut self) {
        let adjacency = self.adjacency;
        let n = self.phi.len();

        let zero: LayerSet = (0..n as u32)
            .filter(|&v| {
                let pv = self.phi[v as usize];
                adjacency.neighbors(v).iter().any(|&u| {
                    let pu = self.phi[u as usize];
                    pu * pv <= 0.0 && pv.abs() <= pu.abs()
                })
            })
            .collect();

        for (label, &p) in self.labels.iter_mut().zip(&self.phi) {
            *label = if p > 0.0 {
                point_type::OUTSIDE
            } else {
                point_type::INSIDE
            };
        }
        for v in zero.iter() {
            self.labels[v as usize] = point_type::ZERO;
            self.phi[v as usize] = self.phi[v as usize].clamp(-0.5, ZERO_UPPER);
        }

        let plus1 = self.grow(&zero, point_type::OUTSIDE, point_type::PLUS1);
        let minus1 = self.grow(&zero, point_type::INSIDE, point_type::MINUS1);
        let plus2 = self.grow(&plus1, point_type::OUTSIDE, point_type::PLUS2);
        let minus2 = self.grow(&minus1, point_type::INSIDE, point_type::MINUS2);

        for (p, &label) in self.phi.iter_mut().zip(&self.labels) {
            if label != point_type::ZERO {
                *p = f64::from(label);
            }
        }

        self.layers = Layers {
            zero,
            plus1,
            minus1,
            plus2,
            minus2,
        };
    }

    /// Relabel every `from`-labeled neighbor of `source` as `to`.
    fn grow(&mut self, source: &LayerSet, from: i8, to: i8) -> LayerSet {
        let mut grown = Vec::new();
        for v in source.iter() {
            for &u in self.adjacency.neighbors(v) {
                if self.labels[u as usize] == from {
                    self.labels[u as usize] = to;
                    grown.push(u);
                }
            }
        }
        LayerSet::from_unsorted(grown)
    }

    /// One incremental band update after `phi` moved on the contour.
    ///
    /// Neighbor queries use the labels from before the update. Layers are
    /// processed in the order zero, inside 1, outside 1, inside 2, outside
    /// 2, and each reads the `phi` values already written by the previous
    /// ones.
    fn update_layers(&mut self) {
        let adjacency = self.adjacency;
        let old = std::mem::take(&mut self.layers);
        let labels = &self.labels;
        let phi = &mut self.phi;

        let mut zero = Vec::with_capacity(old.zero.len());
        let mut plus1 = Vec::with_capacity(old.plus1.len());
        let mut minus1 = Vec::with_capacity(old.minus1.len());
        let mut plus2 = Vec::with_capacity(old.plus2.len());
        let mut minus2 = Vec::with_capacity(old.minus2.len());

        let mut to_zero = Vec::new();
        let mut to_plus1 = Vec::new();
        let mut to_minus1 = Vec::new();
        let mut to_plus2 = Vec::new();
        let mut to_minus2 = Vec::new();
        let mut dropped = Vec::new();

        for v in old.zero.iter() {
            let p = phi[v as usize];
            if p >= 0.5 {
                to_plus1.push(v);
            } else if p < -0.5 {
                to_minus1.push(v);
            } else {
                phi[v as usize] = p.min(ZERO_UPPER);
                zero.push(v);
            }
        }

        for v in old.minus1.iter() {
            match neighbor_max(adjacency, labels, phi, v, point_type::ZERO) {
                None => {
                    phi[v as usize] = -2.0;
                    to_minus2.push(v);
                }
                Some(max) => {
                    let p = max - 1.0;
                    phi[v as usize] = p;
                    if p >= -0.5 {
                        to_zero.push(v);
                    } else if p < -1.5 {
                        to_minus2.push(v);
                    } else {
                        minus1.push(v);
                    }
                }
            }
        }

        for v in old.plus1.iter() {
            match neighbor_min(adjacency, labels, phi, v, point_type::ZERO) {
                None => {
                    phi[v as usize] = 2.0;
                    to_plus2.push(v);
                }
                Some(min) => {
                    let p = min + 1.0;
                    phi[v as usize] = p;
                    if p < 0.5 {
                        phi[v as usize] = p.min(ZERO_UPPER);
                        to_zero.push(v);
                    } else if p >= 1.5 {
                        to_plus2.push(v);
                    } else {
                        plus1.push(v);
                    }
                }
            }
        }

        for v in old.minus2.iter() {
            match neighbor_max(adjacency, labels, phi, v, point_type::MINUS1) {
                None => dropped.push((v, point_type::INSIDE)),
                Some(max) => {
                    let p = max - 1.0;
                    phi[v as usize] = p;
                    if p >= -1.5 {
                        to_minus1.push(v);
                    } else if p < -2.5 {
                        dropped.push((v, point_type::INSIDE));
                    } else {
                        minus2.push(v);
                    }
                }
            }
        }

        for v in old.plus2.iter() {
            match neighbor_min(adjacency, labels, phi, v, point_type::PLUS1) {
                None => dropped.push((v, point_type::OUTSIDE)),
                Some(min) => {
                    let p = min + 1.0;
                    phi[v as usize] = p;
                    if p < 1.5 {
                        to_plus1.push(v);
                    } else if p >= 2.5 {
                        dropped.push((v, point_type::OUTSIDE));
                    } else {
                        plus2.push(v);
                    }
                }
            }
        }

        let labels = &mut self.labels;
        for &v in &to_zero {
            labels[v as usize] = point_type::ZERO;
        }
        for &(v, label) in &dropped {
            labels[v as usize] = label;
            phi[v as usize] = f64::from(label);
        }
        for (moved, label, layer) in [
            (&to_plus1, point_type::PLUS1, &mut plus1),
            (&to_minus1, point_type::MINUS1, &mut minus1),
            (&to_plus2, point_type::PLUS2, &mut plus2),
            (&to_minus2, point_type::MINUS2, &mut minus2),
        ] {
            for &v in moved {
                labels[v as usize] = label;
                layer.push(v);
            }
        }
        zero.extend_from_slice(&to_zero);

        // Vertices that just entered a first band pull their far neighbors
        // into the second band.
        for &v in &to_plus1 {
            for &u in adjacency.neighbors(v) {
                if labels[u as usize] == point_type::OUTSIDE {
                    labels[u as usize] = point_type::PLUS2;
                    phi[u as usize] = phi[v as usize] + 1.0;
                    plus2.push(u);
                }
            }
        }
        for &v in &to_minus1 {
            for &u in adjacency.neighbors(v) {
                if labels[u as usize] == point_type::INSIDE {
                    labels[u as usize] = point_type::MINUS2;
                    phi[u as usize] = phi[v as usize] - 1.0;
                    minus2.push(u);
                }
            }
        }

        self.layers = Layers {
            zero: LayerSet::from_unsorted(zero),
            plus1: LayerSet::from_unsorted(plus1),
            minus1: LayerSet::from_unsorted(minus1),
            plus2: LayerSet::from_unsorted(plus2),
            minus2: LayerSet::from_unsorted(minus2),
        };
    }

    /// Current contour.
    pub fn zero_layer(&self) -> &[u32] {
        self.layers.zero.as_slice()
    }

    /// All five layers.
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// Level-set function per vertex: negative inside, positive outside.
    pub fn phi(&self) -> &[f64] {
        &self.phi
    }

    /// Layer label per vertex (see [`point_type`]).
    pub fn point_types(&self) -> &[i8] {
        &self.labels
    }

    /// `-1` inside, `0` on the contour, `+1` outside.
    pub fn classification(&self) -> Vec<i8> {
        self.labels.iter().map(|l| l.signum()).collect()
    }

    /// Consume the level set, keeping `phi` and the labels.
    pub fn into_fields(self) -> (Vec<f64>, Vec<i8>) {
        (self.phi, self.labels)
    }
}

/// Largest `phi` among neighbors labeled `min_label` or above.
fn neighbor_max(
    adjacency: &AdjacencyList,
    labels: &[i8],
    phi: &[f64],
    v: u32,
    min_label: i8,
) -> Option<f64> {
    adjacency
        .neighbors(v)
        .iter()
        .filter(|&&u| labels[u as usize] >= min_label)
        .map(|&u| phi[u as usize])
        .reduce(f64::max)
}

/// Smallest `phi` among neighbors labeled `max_label` or below.
fn neighbor_min(
    adjacency: &AdjacencyList,
    labels: &[i8],
    phi: &[f64],
    v: u32,
    max_label: i8,
) -> Option<f64> {
    adjacency
        .neighbors(v)
        .iter()
        .filter(|&&u| labels[u as usize] <= max_label)
        .map(|&u| phi[u as usize])
        .reduce(f64::min)
}

/// Connected components of the mesh graph with `excluded` vertices removed,
/// in order of their smallest vertex.
pub(crate) fn split_components(adjacency: &AdjacencyList, excluded: &[bool]) -> Vec<Vec<u32>> {
    let n = adjacency.vertex_count();
    let mut seen = excluded.to_vec();
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..n {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        queue.push_back(start as u32);
        let mut members = Vec::new();
        while let Some(v) = queue.pop_front() {
            members.push(v);
            for &u in adjacency.neighbors(v) {
                if !seen[u as usize] {
                    seen[u as usize] = true;
                    queue.push_back(u);
                }
            }
        }
        components.push(members);
    }
    components
}
