//! # spinnet-engine
//!
//! Backend abstraction and step orchestration for SPINNET.
//!
//! The same per-element math runs through two code paths: a sequential
//! backend iterating edges in order, and a data-parallel backend mapping
//! each edge independently from read-only snapshots into a disjoint
//! output buffer. Both call the identical kernel functions from
//! `spinnet-curvature` and `spinnet-flow`, so divergence between them is
//! bounded only by floating-point width — a contract the validation
//! harness enforces at `max(5% relative, 1e-5 absolute)` per element.
//!
//! [`SpinnetEngine`] drives the full step: curvature pass, barrier, flow
//! pass into a back buffer, symmetric write-back, optional scalar-field
//! leapfrog, telemetry frame. A step either completes fully or is not
//! attempted; there is no mid-step cancellation.

pub mod backend;
pub mod engine;
pub mod validation;

pub use backend::{ComputeBackend, ParallelBackend, SequentialBackend};
pub use engine::{SpinnetEngine, StepOutput};
pub use validation::{validate_backends, BackendDivergence};
