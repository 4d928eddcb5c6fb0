//! Curvature-driven weight flow.
//!
//! Per edge (u, v) with curvature κ and endpoint masses m_u, m_v:
//!
//! ```text
//! flowRate = κ − G·(m_u + m_v)/2 + λ
//! ```
//!
//! Bounded mode (default) saturates the relative change through tanh and
//! clamps the result into [0.02, 0.98], so no single step can move a
//! weight by more than a fixed fraction. Scientific mode applies the raw
//! linear update with no clamping; negative or non-finite outcomes are
//! surfaced as-is so callers can detect physical instability.
//!
//! Skip rule: weights below [`spinnet_core::types::SEVERED_WEIGHT`] are
//! treated as severed links and left unchanged.

use spinnet_core::types::SEVERED_WEIGHT;
use spinnet_core::{CsrView, FlowConfig, GraphState};

/// Flow-rate scale applied before time stepping (both modes).
pub const FLOW_RATE_SCALE: f64 = 0.1;

/// Lower clamp of bounded mode.
pub const WEIGHT_FLOOR: f64 = 0.02;

/// Upper clamp of bounded mode.
pub const WEIGHT_CEIL: f64 = 0.98;

/// Computes the post-step weight of one edge.
///
/// Pure function of its inputs; the same body drives the sequential and
/// the data-parallel backend.
#[inline]
pub fn flow_edge(weight: f64, curvature: f64, mass_u: f64, mass_v: f64, config: &FlowConfig) -> f64 {
    if weight < SEVERED_WEIGHT {
        return weight;
    }

    let mass_term = 0.5 * (mass_u + mass_v);
    let flow_rate = curvature - config.coupling_g * mass_term + config.lambda_offset;

    if config.scientific_mode {
        let relative_change = flow_rate * FLOW_RATE_SCALE * config.dt;
        weight * (1.0 + relative_change)
    } else {
        let relative_change = (flow_rate * FLOW_RATE_SCALE).tanh() * config.dt;
        (weight * (1.0 + relative_change)).clamp(WEIGHT_FLOOR, WEIGHT_CEIL)
    }
}

/// Writes a completed flat-edge weight buffer back into the store,
/// symmetrically. The buffer must be indexed like the snapshot's flat
/// edge list; write-back happens only after the whole pass completed.
pub fn apply_flat_weights(state: &mut GraphState, csr: &CsrView, new_weights: &[f64]) {
    debug_assert_eq!(new_weights.len(), csr.num_edges());
    for e in 0..csr.num_edges() {
        state.write_weight_unchecked(csr.flat_from[e], csr.flat_to[e], new_weights[e]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> FlowConfig {
        FlowConfig {
            dt: 0.01,
            coupling_g: 0.05,
            ..Default::default()
        }
    }

    #[test]
    fn test_bounded_mode_stays_clamped() {
        let cfg = cfg();
        // Extreme curvature in both directions cannot leave the band.
        for kappa in [-1e6, -2.0, 0.0, 1.0, 1e6] {
            let w = flow_edge(0.5, kappa, 1.0, 1.0, &cfg);
            assert!((WEIGHT_FLOOR..=WEIGHT_CEIL).contains(&w));
        }
    }

    #[test]
    fn test_bounded_step_change_is_saturated() {
        let cfg = cfg();
        // |relative change| ≤ tanh-saturated value: at most dt per step.
        let w = flow_edge(0.5, 1e9, 0.0, 0.0, &cfg);
        assert!(w <= 0.5 * (1.0 + cfg.dt) + 1e-15);
    }

    #[test]
    fn test_positive_curvature_grows_weight() {
        let cfg = cfg();
        let w = flow_edge(0.5, 1.0, 0.0, 0.0, &cfg);
        assert!(w > 0.5);
        let w = flow_edge(0.5, -1.0, 0.0, 0.0, &cfg);
        assert!(w < 0.5);
    }

    #[test]
    fn test_mass_term_contracts() {
        let cfg = cfg();
        let light = flow_edge(0.5, 0.2, 0.0, 0.0, &cfg);
        let heavy = flow_edge(0.5, 0.2, 50.0, 50.0, &cfg);
        assert!(heavy < light);
    }

    #[test]
    fn test_severed_edge_skipped() {
        let cfg = cfg();
        assert_eq!(flow_edge(5e-5, 1.0, 0.0, 0.0, &cfg), 5e-5);
        let sci = FlowConfig {
            scientific_mode: true,
            ..cfg
        };
        assert_eq!(flow_edge(5e-5, 1.0, 0.0, 0.0, &sci), 5e-5);
    }

    #[test]
    fn test_scientific_mode_unclamped() {
        let cfg = FlowConfig {
            scientific_mode: true,
            dt: 1.0,
            coupling_g: 0.0,
            ..Default::default()
        };
        // Strong negative rate drives the weight negative; the engine
        // surfaces it rather than fixing it.
        let w = flow_edge(0.5, -30.0, 0.0, 0.0, &cfg);
        assert!(w < 0.0);

        // And non-finite curvature propagates as-is.
        let w = flow_edge(0.5, f64::NAN, 0.0, 0.0, &cfg);
        assert!(w.is_nan());
    }

    #[test]
    fn test_lambda_offset_shifts_rate() {
        let base = cfg();
        let shifted = FlowConfig {
            lambda_offset: 1.0,
            ..base
        };
        let w0 = flow_edge(0.5, 0.0, 0.0, 0.0, &base);
        let w1 = flow_edge(0.5, 0.0, 0.0, 0.0, &shifted);
        assert!(w1 > w0);
    }

    #[test]
    fn test_apply_writes_symmetrically() {
        use spinnet_core::CsrView;
        let mut g = spinnet_core::GraphState::new(3);
        g.add_edge(0, 1, 0.5).unwrap();
        g.add_edge(1, 2, 0.5).unwrap();
        let csr = CsrView::build(&g);

        apply_flat_weights(&mut g, &csr, &[0.3, 0.7]);
        assert_eq!(g.weight(0, 1), 0.3);
        assert_eq!(g.weight(1, 0), 0.3);
        assert_eq!(g.weight(2, 1), 0.7);
    }
}
