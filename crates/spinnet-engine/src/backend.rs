//! Compute backends: sequential and data-parallel.
//!
//! Each edge's computation depends only on the read-only CSR snapshot,
//! the curvature buffer, and the mass array, and writes to its own slot
//! of a fresh output buffer — no locking, no shared mutation. That makes
//! the parallel path a plain rayon map over edge indices with the same
//! kernel body the sequential path runs.

use rayon::prelude::*;

use spinnet_core::{CsrView, FlowConfig};
use spinnet_curvature::{edge_curvature, CurvatureAlgorithm};
use spinnet_flow::flow_edge;

/// A backend maps the per-edge kernels over a topology snapshot.
///
/// Implementations must compute the identical formula; structural
/// divergence between backends is a correctness defect (see
/// [`crate::validate_backends`]).
pub trait ComputeBackend: Send + Sync {
    /// Backend name for logs and error contexts.
    fn name(&self) -> &'static str;

    /// One curvature value per flat edge of the snapshot.
    fn compute_curvature(
        &self,
        csr: &CsrView,
        algorithm: CurvatureAlgorithm,
        config: &FlowConfig,
    ) -> Vec<f64>;

    /// One post-step weight per flat edge, from the completed curvature
    /// buffer and node masses. Pure: writes nothing back.
    fn integrate_flow(
        &self,
        csr: &CsrView,
        curvature: &[f64],
        mass: &[f64],
        config: &FlowConfig,
    ) -> Vec<f64>;
}

#[inline]
fn flow_kernel(csr: &CsrView, e: usize, curvature: &[f64], mass: &[f64], cfg: &FlowConfig) -> f64 {
    let u = csr.flat_from[e];
    let v = csr.flat_to[e];
    flow_edge(csr.flat_weights[e], curvature[e], mass[u], mass[v], cfg)
}

/// Sequential reference backend: plain in-order loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialBackend;

impl ComputeBackend for SequentialBackend {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn compute_curvature(
        &self,
        csr: &CsrView,
        algorithm: CurvatureAlgorithm,
        config: &FlowConfig,
    ) -> Vec<f64> {
        (0..csr.num_edges())
            .map(|e| edge_curvature(csr, e, algorithm, config))
            .collect()
    }

    fn integrate_flow(
        &self,
        csr: &CsrView,
        curvature: &[f64],
        mass: &[f64],
        config: &FlowConfig,
    ) -> Vec<f64> {
        (0..csr.num_edges())
            .map(|e| flow_kernel(csr, e, curvature, mass, config))
            .collect()
    }
}

/// Data-parallel backend: rayon map over edge indices.
///
/// Same kernel body as [`SequentialBackend`]; only the iteration driver
/// differs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelBackend;

impl ComputeBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn compute_curvature(
        &self,
        csr: &CsrView,
        algorithm: CurvatureAlgorithm,
        config: &FlowConfig,
    ) -> Vec<f64> {
        (0..csr.num_edges())
            .into_par_iter()
            .map(|e| edge_curvature(csr, e, algorithm, config))
            .collect()
    }

    fn integrate_flow(
        &self,
        csr: &CsrView,
        curvature: &[f64],
        mass: &[f64],
        config: &FlowConfig,
    ) -> Vec<f64> {
        (0..csr.num_edges())
            .into_par_iter()
            .map(|e| flow_kernel(csr, e, curvature, mass, config))
            .collect()
    }
}
