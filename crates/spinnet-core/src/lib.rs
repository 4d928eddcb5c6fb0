//! # spinnet-core
//!
//! Core types, errors, and telemetry for the SPINNET discrete-geometry
//! simulation engine.
//!
//! This crate defines the shared substrate used by all SPINNET components:
//! - **Types**: the graph topology store, its CSR view, coloring solutions
//! - **Config**: the flow/curvature parameter bundle
//! - **Errors**: unified error handling with SpinnetError
//! - **Telemetry**: the lock-free step telemetry ring
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  spinnet-core    │  ← topology store + shared types
//! └──────────────────┘
//!          ▲
//!     ┌────┴──────────────────┐
//!     │                       │
//! ┌───▼───────────────┐ ┌─────▼────────────┐
//! │ spinnet-curvature │ │  spinnet-flow    │
//! └───────────────────┘ └──────────────────┘
//!          ▲                   ▲
//!          └─────────┬─────────┘
//!                    │
//!        ┌───────────▼───────────┐
//!        │ spinnet-scheduler /   │
//!        │ spinnet-engine        │
//!        └───────────────────────┘
//! ```
//!
//! The topology store owns all arrays (adjacency, weights, node scalars).
//! Downstream components borrow versioned snapshots and never retain one
//! past a single step.

pub mod config;
pub mod errors;
pub mod generators;
pub mod telemetry;
pub mod types;

pub use config::FlowConfig;
pub use errors::SpinnetError;
pub use telemetry::{StepFrame, TelemetryRing, TelemetryStats};
pub use types::{ColoringSolution, CsrView, GraphState, NodeId};

/// Convenience result type used across the workspace.
pub type Result<T> = std::result::Result<T, SpinnetError>;
