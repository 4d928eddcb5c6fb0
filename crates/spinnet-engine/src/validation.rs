//! Cross-backend consistency harness.
//!
//! Consumers treat the sequential and parallel backends as
//! interchangeable, so agreement is a mandatory regression invariant:
//! per element, `max(5% relative, 1e-5 absolute)`. Exceeding it is a
//! correctness defect to be caught here and in tests, never a condition
//! the engine recovers from at runtime.

use log::warn;

use spinnet_core::{CsrView, FlowConfig, GraphState, Result, SpinnetError};
use spinnet_curvature::CurvatureAlgorithm;

use crate::backend::{ComputeBackend, ParallelBackend, SequentialBackend};

/// Relative tolerance of the consistency contract.
pub const REL_TOLERANCE: f64 = 0.05;

/// Absolute tolerance of the consistency contract.
pub const ABS_TOLERANCE: f64 = 1e-5;

/// Worst per-element divergence found between two backends.
#[derive(Debug, Clone, Copy)]
pub struct BackendDivergence {
    /// Flat edge index of the worst element.
    pub edge: usize,
    pub sequential: f64,
    pub parallel: f64,
    pub absolute: f64,
    pub relative: f64,
}

/// Whether a pair of values satisfies the contract.
#[inline]
pub fn within_tolerance(a: f64, b: f64) -> bool {
    let abs = (a - b).abs();
    if abs <= ABS_TOLERANCE {
        return true;
    }
    let scale = a.abs().max(b.abs());
    abs <= REL_TOLERANCE * scale
}

fn worst_divergence(seq: &[f64], par: &[f64]) -> Option<BackendDivergence> {
    let mut worst: Option<BackendDivergence> = None;
    for (e, (&a, &b)) in seq.iter().zip(par).enumerate() {
        if within_tolerance(a, b) {
            continue;
        }
        let absolute = (a - b).abs();
        let relative = absolute / a.abs().max(b.abs()).max(f64::MIN_POSITIVE);
        if worst.map_or(true, |w| absolute > w.absolute) {
            worst = Some(BackendDivergence {
                edge: e,
                sequential: a,
                parallel: b,
                absolute,
                relative,
            });
        }
    }
    worst
}

/// Runs curvature and flow through both backends on the given state and
/// verifies the consistency contract element by element.
pub fn validate_backends(
    state: &GraphState,
    algorithm: CurvatureAlgorithm,
    config: &FlowConfig,
) -> Result<()> {
    state.validate_shapes()?;
    config.validate()?;
    let csr = CsrView::build(state);

    let seq = SequentialBackend;
    let par = ParallelBackend;

    let kappa_seq = seq.compute_curvature(&csr, algorithm, config);
    let kappa_par = par.compute_curvature(&csr, algorithm, config);
    if let Some(d) = worst_divergence(&kappa_seq, &kappa_par) {
        warn!(
            "curvature divergence at edge {}: {} vs {}",
            d.edge, d.sequential, d.parallel
        );
        return Err(SpinnetError::backend(
            par.name(),
            format!(
                "curvature diverged at edge {}: sequential {} vs parallel {} (rel {:.3e})",
                d.edge, d.sequential, d.parallel, d.relative
            ),
        ));
    }

    let flow_seq = seq.integrate_flow(&csr, &kappa_seq, &state.mass, config);
    let flow_par = par.integrate_flow(&csr, &kappa_par, &state.mass, config);
    if let Some(d) = worst_divergence(&flow_seq, &flow_par) {
        return Err(SpinnetError::backend(
            par.name(),
            format!(
                "flow diverged at edge {}: sequential {} vs parallel {} (rel {:.3e})",
                d.edge, d.sequential, d.parallel, d.relative
            ),
        ));
    }

    Ok(())
}
