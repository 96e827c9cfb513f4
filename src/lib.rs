// src/lib.rs

//! `nearclifford` - near-Clifford training circuits for Clifford Data Regression
//!
//! Clifford Data Regression (CDR) learns how noise distorts expectation values
//! by running circuits whose ideal values are cheap to compute. This library
//! builds those training circuits: it takes a circuit mixing Clifford and
//! non-Clifford operations and replaces (some of) the non-Clifford operations
//! by nearby Clifford ones, either by plain random resampling or by a
//! Markov-Chain Monte-Carlo walk that favours circuits whose expectation value
//! stays close to the original one.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod observable;
pub mod executor;
pub mod simulation;
pub mod cdr;

// Re-export the most common types for easier top-level use
pub use core::{CdrError, QubitId, StateVector};
pub use operations::{Gate, Operation};
pub use circuits::{Circuit, CircuitBuilder};
pub use observable::{Observable, Pauli, PauliString};
pub use executor::{Executor, FnExecutor, RecordingExecutor};
pub use simulation::Simulator;
pub use cdr::{
    CircuitGenerator,
    GateClassifier,
    GeneratorConfig,
    McmcCircuitGenerator,
    NearCliffordMapper,
    RandomCircuitGenerator,
    RandomState,
    ReplaceMethod,
    SelectMethod,
    StabilizerClassifier,
    generate_for_each,
};

// Example 1: Random near-Clifford circuits
// Every non-Clifford rotation is snapped to its closest Clifford angle.
/// ```
/// use nearclifford::{CircuitBuilder, CircuitGenerator, GeneratorConfig, Gate, Operation, QubitId, RandomCircuitGenerator, CdrError};
///
/// fn qid(id: u64) -> QubitId { QubitId(id) }
///
/// let circuit = CircuitBuilder::new()
///     .add_op(Operation::Gate { target: qid(0), gate: Gate::H })
///     .add_op(Operation::Rz { target: qid(0), theta: 0.3 })
///     .add_op(Operation::Controlled { control: qid(0), target: qid(1), gate: Gate::X })
///     .build();
///
/// let mut generator = RandomCircuitGenerator::new(GeneratorConfig::new().with_seed(11))?;
/// let training = generator.generate_circuits(&circuit, 4)?;
///
/// assert_eq!(training.len(), 4);
/// for c in &training {
///     assert!(c.operations().iter().all(|op| op.has_stabilizer_effect()));
///     assert_eq!(c.operations()[1], Operation::Rz { target: qid(0), theta: 0.0 });
/// }
/// # Ok::<(), CdrError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: MCMC sampling against the built-in simulator
// The walk only keeps circuits whose <Z> stays near the original value.
/// ```
/// use nearclifford::{
///     CircuitBuilder, GeneratorConfig, Gate, McmcCircuitGenerator, Observable, Operation,
///     PauliString, QubitId, ReplaceMethod, Simulator, CdrError,
/// };
///
/// fn qid(id: u64) -> QubitId { QubitId(id) }
///
/// let circuit = CircuitBuilder::new()
///     .add_op(Operation::Gate { target: qid(0), gate: Gate::H })
///     .add_op(Operation::Gate { target: qid(0), gate: Gate::T })
///     .add_op(Operation::Gate { target: qid(0), gate: Gate::H })
///     .build();
///
/// let config = GeneratorConfig::new()
///     .with_method_replace(ReplaceMethod::Uniform)
///     .with_seed(5);
/// let mut generator = McmcCircuitGenerator::new(config, Simulator::new(), 0.8)?
///     .with_observable(Observable::new(vec![PauliString::z(qid(0))]));
///
/// let (training, trace) = generator.generate_circuits_traced(&circuit, 3)?;
/// assert_eq!(training.len(), 3);
/// assert_eq!(trace.accepted(), 3);
/// // One evaluation for the original circuit plus one per proposal.
/// assert_eq!(generator.executor().runs(), trace.proposals() + 1);
/// # Ok::<(), CdrError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
