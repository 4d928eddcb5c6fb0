//! # spinnet-flow
//!
//! Time evolution for the SPINNET metric: the curvature-driven weight-flow
//! integrator, the symplectic scalar-field leapfrog, unitary edge-amplitude
//! evolution, and the `ProposedMove` substrate primitive for external
//! topology samplers.
//!
//! The flow integrator is a pure per-edge kernel plus a separate apply
//! stage. Each mode (bounded, scientific) is a straight-line code path
//! toggled by configuration; no conditionals inside the arithmetic.

pub mod integrator;
pub mod moves;
pub mod quantum;
pub mod scalar_field;

pub use integrator::{apply_flat_weights, flow_edge, FLOW_RATE_SCALE};
pub use moves::ProposedMove;
pub use quantum::EdgeWavefunction;
pub use scalar_field::leapfrog_step;
