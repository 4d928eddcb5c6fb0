//! Simulation configuration bundle.
//!
//! One flat parameter struct shared by the curvature engine, the flow
//! integrator, and the scheduler. The engine reads it live on every step;
//! there is no internal parameter caching, so changing a field between
//! steps changes the very next trajectory.

use serde::{Deserialize, Serialize};

use crate::errors::SpinnetError;
use crate::Result;

/// Parameters for curvature computation and flow integration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlowConfig {
    // ========== Flow Integration ==========
    /// Integration time step.
    pub dt: f64,
    /// Gravitational coupling G multiplying the endpoint-mass term.
    pub coupling_g: f64,
    /// Constant flow offset λ (cosmological-constant analogue).
    pub lambda_offset: f64,
    /// Scientific mode: unbounded flow, no weight clamping, non-finite
    /// outcomes surfaced as-is.
    pub scientific_mode: bool,

    // ========== Curvature ==========
    /// Degree-penalty factor λ_deg in the Forman formula.
    pub degree_penalty_factor: f64,
    /// Fixed Sinkhorn refinement iteration count (never a convergence test).
    pub sinkhorn_iterations: usize,
    /// Per-iteration Sinkhorn correction strength ε.
    pub epsilon: f64,
    /// Lazy-random-walk self-mass α retained at the walk's origin.
    pub lazy_walk_alpha: f64,
    /// Neighborhood cap for the transport measures.
    pub max_neighbors: usize,

    // ========== Scalar Field ==========
    /// Enable symplectic scalar-field evolution.
    pub scalar_field_enabled: bool,
    /// Quartic self-coupling λ_h in V(φ) = ¼λ_hφ⁴ − ½μ²φ².
    pub higgs_lambda: f64,
    /// Mass-squared parameter μ² of the quartic potential.
    pub higgs_mu_sq: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,
            coupling_g: 1.0,
            lambda_offset: 0.0,
            scientific_mode: false,
            degree_penalty_factor: 1.0,
            sinkhorn_iterations: 10,
            epsilon: 0.1,
            lazy_walk_alpha: 0.5,
            max_neighbors: 32,
            scalar_field_enabled: false,
            higgs_lambda: 0.1,
            higgs_mu_sq: 1.0,
        }
    }
}

impl FlowConfig {
    /// Validates the bundle before a run.
    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SpinnetError::config(format!(
                "dt must be finite and positive, got {}",
                self.dt
            )));
        }
        if !self.coupling_g.is_finite() || !self.lambda_offset.is_finite() {
            return Err(SpinnetError::config("non-finite coupling or offset"));
        }
        if !(0.0..1.0).contains(&self.lazy_walk_alpha) {
            return Err(SpinnetError::config(format!(
                "lazy_walk_alpha must be in [0, 1), got {}",
                self.lazy_walk_alpha
            )));
        }
        if self.epsilon < 0.0 || !self.epsilon.is_finite() {
            return Err(SpinnetError::config(format!(
                "epsilon must be non-negative, got {}",
                self.epsilon
            )));
        }
        if self.max_neighbors == 0 {
            return Err(SpinnetError::config("max_neighbors must be at least 1"));
        }
        Ok(())
    }
}
