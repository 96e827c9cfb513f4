// src/cdr/mod.rs

//! Training circuit generation for Clifford Data Regression.
//!
//! Two generators share one contract, [`CircuitGenerator`]:
//!
//! - [`RandomCircuitGenerator`] replaces the non-Clifford operations of a
//!   circuit with freshly drawn Clifford operations and keeps every draw.
//! - [`McmcCircuitGenerator`] draws the same way but keeps a candidate only if
//!   its expectation value passes a Metropolis-Hastings test against the
//!   original circuit's value.
//!
//! Which operations count as non-Clifford is decided by a [`GateClassifier`];
//! how they are replaced is decided by the [`NearCliffordMapper`].

pub mod config;
pub mod mcmc;
pub mod near_clifford;
pub mod random;

pub use config::{GeneratorConfig, RandomState, ReplaceMethod, SelectMethod};
pub use mcmc::{ChainStep, ChainTrace, McmcCircuitGenerator, acceptance_probability, likelihood};
pub use near_clifford::NearCliffordMapper;
pub use random::{NonCliffordIndex, RandomCircuitGenerator};

use crate::circuits::Circuit;
use crate::core::CdrError;
use crate::operations::Operation;

/// Decides whether an operation has a stabilizer effect (is Clifford).
pub trait GateClassifier {
    /// `true` for Clifford operations.
    fn has_stabilizer_effect(&self, op: &Operation) -> bool;
}

/// Classifies with [`Operation::has_stabilizer_effect`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StabilizerClassifier;

impl GateClassifier for StabilizerClassifier {
    fn has_stabilizer_effect(&self, op: &Operation) -> bool {
        op.has_stabilizer_effect()
    }
}

/// Generates near-Clifford circuits from a starting circuit.
pub trait CircuitGenerator {
    /// Returns a Clifford replacement for a single operation. Clifford
    /// operations come back unchanged.
    fn swap_operations(&mut self, op: &Operation) -> Result<Operation, CdrError>;

    /// Returns exactly `num_circuits` circuits derived from `circuit`.
    ///
    /// # Errors
    /// `CdrError::InvalidCircuitCount` when `num_circuits` is zero.
    fn generate_circuits(&mut self, circuit: &Circuit, num_circuits: usize) -> Result<Vec<Circuit>, CdrError>;
}

/// Applies `generator` to every circuit in turn and concatenates the results,
/// `num_circuits` per input circuit. Nothing is returned if any call fails.
pub fn generate_for_each<G>(generator: &mut G, circuits: &[Circuit], num_circuits: usize) -> Result<Vec<Circuit>, CdrError>
where
    G: CircuitGenerator + ?Sized,
{
    if num_circuits == 0 {
        return Err(CdrError::InvalidCircuitCount);
    }
    let mut generated = Vec::with_capacity(circuits.len() * num_circuits);
    for circuit in circuits {
        generated.extend(generator.generate_circuits(circuit, num_circuits)?);
    }
    Ok(generated)
}
