// src/simulation/mod.rs

//! Noiseless state-vector simulation of `nearclifford::circuits::Circuit`.
//! The [`Simulator`] doubles as a ready-made [`Executor`] for the circuit
//! generators.

pub(crate) mod engine;

use crate::circuits::Circuit;
use crate::core::{CdrError, QubitId, StateVector};
use crate::executor::Executor;
use crate::observable::Observable;
use engine::SimulationEngine;
use tracing::trace;

/// Runs circuits on an ideal state-vector backend.
#[derive(Debug, Default)]
pub struct Simulator {
    runs: usize,
}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of circuits simulated through [`Executor::evaluate`].
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Evolves `|0...0>` through the circuit and returns the final state.
    ///
    /// # Returns
    /// * `Ok(StateVector)` over the circuit's qubits in id order.
    /// * `Err(CdrError::Simulation)` for an empty circuit, too many qubits or
    ///   a controlled operation whose control equals its target.
    pub fn run(&self, circuit: &Circuit) -> Result<StateVector, CdrError> {
        let mut engine = SimulationEngine::init(circuit.qubits())?;
        for op in circuit.operations() {
            engine.apply_operation(op)?;
        }
        Ok(engine.into_state())
    }

    /// Expectation value of `observable` on the circuit output, or the
    /// population of `|0...0>` when no observable is given. Fails with
    /// `CdrError::Simulation` if the observable acts on a qubit outside the circuit.
    pub fn expectation(&self, circuit: &Circuit, observable: Option<&Observable>) -> Result<f64, CdrError> {
        if let Some(obs) = observable {
            if let Some(missing) = obs.qubits().difference(circuit.qubits()).next() {
                return Err(CdrError::Simulation {
                    message: format!("Observable acts on {} which is not part of the circuit", missing),
                });
            }
        }
        let state = self.run(circuit)?;
        let value = match observable {
            Some(obs) => {
                let order: Vec<QubitId> = circuit.qubits().iter().copied().collect();
                obs.expectation(&state, &order)
            }
            None => state.probability(0),
        };
        trace!(value, qubits = state.num_qubits(), "simulated circuit");
        Ok(value)
    }
}

impl Executor for Simulator {
    fn evaluate(
        &mut self,
        circuits: &[Circuit],
        observable: Option<&Observable>,
    ) -> Result<Vec<f64>, CdrError> {
        self.runs += circuits.len();
        circuits.iter().map(|c| self.expectation(c, observable)).collect()
    }
}
