//! Symplectic scalar-field evolution.
//!
//! One real field φ with conjugate momentum π on the nodes, evolved by
//! leapfrog against the weighted graph Laplacian plus a quartic
//! ("Higgs") potential:
//!
//! ```text
//! V(φ) = ¼λφ⁴ − ½μ²φ²       dV/dφ = λφ³ − μ²φ
//! π_i += dt · ( Σ_j w_ij (φ_j − φ_i) − dV/dφ_i )
//! φ_i += dt · π_i
//! ```
//!
//! Momentum is updated first, then the field from the *new* momentum.
//! The ordering is what makes the scheme symplectic; swapping it turns
//! the integrator into explicit Euler and the field norm drifts within a
//! few thousand steps.

use spinnet_core::{CsrView, FlowConfig, GraphState};

/// Advances φ and π by one leapfrog step over the CSR snapshot.
///
/// Reads weights from the snapshot (the completed flow pass), writes only
/// the two field arrays.
pub fn leapfrog_step(state: &mut GraphState, csr: &CsrView, config: &FlowConfig) {
    let n = state.num_nodes();
    debug_assert_eq!(csr.num_nodes, n);

    // Momentum half of the step: discrete Laplacian minus the potential
    // derivative, from a frozen copy of φ.
    let phi = state.scalar_field.clone();
    for i in 0..n {
        let nbrs = csr.neighbors(i);
        let wts = csr.neighbor_weights(i);
        let mut laplacian = 0.0;
        for (k, &j) in nbrs.iter().enumerate() {
            laplacian += wts[k] * (phi[j] - phi[i]);
        }
        let dv = config.higgs_lambda * phi[i].powi(3) - config.higgs_mu_sq * phi[i];
        state.scalar_momentum[i] += config.dt * (laplacian - dv);
    }

    // Field half from the updated momentum.
    for i in 0..n {
        state.scalar_field[i] += config.dt * state.scalar_momentum[i];
    }
}
