// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;
pub mod constants;

// Re-export public types for convenient access via `nearclifford::core::TypeName`
pub use error::{CdrError, QubitId};
pub use state::StateVector;
pub use constants::{CLIFFORD_ANGLES, normalize_angle, phase_distance};
