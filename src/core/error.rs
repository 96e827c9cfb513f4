//! Error handling logic

use std::fmt;
use thiserror::Error;

/// Unique identifier for a qubit line in a circuit.
/// Ordering of ids fixes the row order in diagrams and the bit order in
/// simulated state vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub u64);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q({})", self.0)
    }
}

/// Errors raised while configuring generators, mapping operations or
/// evaluating circuits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CdrError {
    /// A selection or replacement method name was not recognized.
    #[error("Invalid method '{value}' for {option}: expected one of {expected}")]
    InvalidMethod {
        /// Which option was being parsed (`method_select` or `method_replace`).
        option: &'static str,
        /// The rejected name.
        value: String,
        /// Human readable list of accepted names.
        expected: &'static str,
    },

    /// `fraction_non_clifford` outside of `[0, 1]`.
    #[error("Invalid fraction of non-Clifford operations: {0} (must lie in [0, 1])")]
    InvalidFraction(f64),

    /// A kernel width used by the mapper is not a positive finite number.
    #[error("Invalid {name}: {value} (must be positive and finite)")]
    InvalidSigma {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Width of the acceptance likelihood is not a positive finite number.
    #[error("Invalid standard deviation: {0} (must be positive and finite)")]
    InvalidStandardDeviation(f64),

    /// Zero circuits were requested.
    #[error("Number of circuits to generate must be positive")]
    InvalidCircuitCount,

    /// A non-Clifford operation has no near-Clifford replacement.
    #[error("Unsupported operation: {operation} has no near-Clifford replacement")]
    UnsupportedOperation {
        /// Rendering of the offending operation.
        operation: String,
    },

    /// Failure reported by an executor.
    #[error("Executor failure: {message}")]
    Executor {
        /// Executor failure message
        message: String,
    },

    /// Executor returned a different number of values than circuits.
    #[error("Malformed executor output: expected {expected} values, got {got}")]
    MalformedExecutorOutput {
        /// Number of circuits submitted.
        expected: usize,
        /// Number of values returned.
        got: usize,
    },

    /// Executor returned NaN or an infinite expectation value.
    #[error("Executor returned a non-finite expectation value: {value}")]
    NonFiniteExpectation {
        /// The rejected value.
        value: f64,
    },

    /// The caller supplied proposal cap was exhausted.
    #[error("Proposal limit of {limit} reached after accepting {accepted} circuits")]
    ProposalLimitReached {
        /// The configured cap.
        limit: usize,
        /// Circuits accepted before the cap was hit.
        accepted: usize,
    },

    /// Failure inside the state-vector simulator.
    #[error("Simulation error: {message}")]
    Simulation {
        /// Simulation failure message
        message: String,
    },

    /// Weighted index sampling rejected its weights.
    #[error("Sampling error: {message}")]
    Sampling {
        /// Sampling failure message
        message: String,
    },
}
