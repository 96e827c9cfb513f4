// src/cdr/mcmc.rs

//! Markov-Chain Monte-Carlo generation of near-Clifford training circuits.
//!
//! Every iteration proposes a completely fresh set of Clifford replacements,
//! evaluates the candidate once with the executor and accepts it with the
//! Metropolis-Hastings probability
//!
//! ```text
//! min(1, L(candidate) / L(last)),   L(x) = N(x; μ, σ)
//! ```
//!
//! where `μ` is the absolute expectation value of the original circuit and
//! `last` is the value of the most recently accepted candidate (`μ` before the
//! first acceptance). The walk has no iteration cap unless the caller sets one
//! with [`McmcCircuitGenerator::with_max_proposals`]; a narrow `σ` can make the
//! acceptance rate arbitrarily small.

use super::config::GeneratorConfig;
use super::random::RandomCircuitGenerator;
use super::{CircuitGenerator, GateClassifier, StabilizerClassifier};
use crate::circuits::Circuit;
use crate::core::CdrError;
use crate::core::constants::DEFAULT_STANDARD_DEVIATION;
use crate::executor::Executor;
use crate::observable::Observable;
use crate::operations::Operation;
use rand::Rng;
use std::f64::consts::PI;
use std::slice;
use tracing::{debug, trace};

/// Gaussian density with mean `mu` and standard deviation `sigma` at `x`.
pub fn likelihood(x: f64, sigma: f64, mu: f64) -> f64 {
    let constants = (1.0 / sigma) * (1.0 / (2.0 * PI).sqrt());
    let exponentiation = (-0.5 * ((x - mu) / sigma).powi(2)).exp();
    constants * exponentiation
}

/// `min(1, likelihood(candidate) / likelihood(last))`, evaluated in log space.
/// Stays finite when both likelihoods underflow.
pub fn acceptance_probability(candidate: f64, last: f64, sigma: f64, mu: f64) -> f64 {
    let z_candidate = (candidate - mu) / sigma;
    let z_last = (last - mu) / sigma;
    let log_ratio = 0.5 * (z_last * z_last - z_candidate * z_candidate);
    if log_ratio >= 0.0 { 1.0 } else { log_ratio.exp() }
}

/// One proposal of the walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainStep {
    /// `|value|` of the proposed circuit.
    pub candidate_value: f64,
    /// `|value|` of the last accepted circuit at proposal time.
    pub reference_value: f64,
    /// Metropolis-Hastings acceptance probability.
    pub acceptance_probability: f64,
    /// Uniform draw in `[0, 1)` compared against the probability.
    pub draw: f64,
    /// Whether the candidate joined the output.
    pub accepted: bool,
}

/// Record of one `generate_circuits` call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChainTrace {
    mean_expectation_value: Option<f64>,
    steps: Vec<ChainStep>,
}

impl ChainTrace {
    /// `|value|` of the original circuit; `None` when the walk was skipped
    /// because the circuit was already Clifford.
    pub fn mean_expectation_value(&self) -> Option<f64> {
        self.mean_expectation_value
    }

    /// Every proposal in order.
    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }

    /// Number of proposals, equal to the number of executor calls after the first.
    pub fn proposals(&self) -> usize {
        self.steps.len()
    }

    /// Number of accepted proposals.
    pub fn accepted(&self) -> usize {
        self.steps.iter().filter(|s| s.accepted).count()
    }

    /// Accepted over proposed, `0.0` with no proposals.
    pub fn acceptance_rate(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.accepted() as f64 / self.steps.len() as f64
        }
    }
}

/// Near-Clifford circuit generator with a Metropolis-Hastings acceptance test.
pub struct McmcCircuitGenerator<E, C = StabilizerClassifier> {
    base: RandomCircuitGenerator<C>,
    executor: E,
    observable: Option<Observable>,
    standard_deviation: f64,
    max_proposals: Option<usize>,
}

impl<E: Executor> McmcCircuitGenerator<E> {
    /// Creates a generator with the built-in Clifford classifier.
    ///
    /// # Errors
    /// Configuration errors from [`GeneratorConfig::validate`] and
    /// `CdrError::InvalidStandardDeviation` unless `standard_deviation` is
    /// positive and finite.
    pub fn new(config: GeneratorConfig, executor: E, standard_deviation: f64) -> Result<Self, CdrError> {
        Self::from_base(RandomCircuitGenerator::new(config)?, executor, standard_deviation)
    }

    /// Same as [`McmcCircuitGenerator::new`] with a standard deviation of 0.8.
    pub fn with_default_standard_deviation(config: GeneratorConfig, executor: E) -> Result<Self, CdrError> {
        Self::new(config, executor, DEFAULT_STANDARD_DEVIATION)
    }
}

impl<E: Executor, C: GateClassifier> McmcCircuitGenerator<E, C> {
    /// Wraps an existing random generator, taking over its random source.
    pub fn from_base(base: RandomCircuitGenerator<C>, executor: E, standard_deviation: f64) -> Result<Self, CdrError> {
        if !(standard_deviation.is_finite() && standard_deviation > 0.0) {
            return Err(CdrError::InvalidStandardDeviation(standard_deviation));
        }
        debug!(standard_deviation, "created MCMC circuit generator");
        Ok(Self {
            base,
            executor,
            observable: None,
            standard_deviation,
            max_proposals: None,
        })
    }

    /// Evaluate circuits against `observable` instead of asking the executor
    /// for expectation values directly.
    pub fn with_observable(mut self, observable: Observable) -> Self {
        self.observable = Some(observable);
        self
    }

    /// Fail with `CdrError::ProposalLimitReached` after `limit` proposals in one call.
    pub fn with_max_proposals(mut self, limit: usize) -> Self {
        self.max_proposals = Some(limit);
        self
    }

    /// Width of the acceptance likelihood.
    pub fn standard_deviation(&self) -> f64 {
        self.standard_deviation
    }

    /// The observable, if any.
    pub fn observable(&self) -> Option<&Observable> {
        self.observable.as_ref()
    }

    /// The wrapped random generator.
    pub fn base(&self) -> &RandomCircuitGenerator<C> {
        &self.base
    }

    /// The executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Consumes the generator and returns its executor.
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Runs the walk and returns the accepted circuits with the full record
    /// of proposals.
    pub fn generate_circuits_traced(
        &mut self,
        circuit: &Circuit,
        num_circuits: usize,
    ) -> Result<(Vec<Circuit>, ChainTrace), CdrError> {
        let mut steps = Vec::new();
        let (circuits, mean_expectation_value) = self.walk(circuit, num_circuits, Some(&mut steps))?;
        Ok((circuits, ChainTrace { mean_expectation_value, steps }))
    }

    /// The Metropolis-Hastings walk. Proposals are pushed onto `steps` only
    /// when a log is given; memory otherwise stays bounded by `num_circuits`.
    fn walk(
        &mut self,
        circuit: &Circuit,
        num_circuits: usize,
        mut steps: Option<&mut Vec<ChainStep>>,
    ) -> Result<(Vec<Circuit>, Option<f64>), CdrError> {
        if num_circuits == 0 {
            return Err(CdrError::InvalidCircuitCount);
        }

        let index = self.base.non_clifford_index(circuit);
        if index.is_empty() {
            debug!(num_circuits, "circuit is already Clifford, skipping the walk");
            return Ok((vec![circuit.clone(); num_circuits], None));
        }

        let mean_expectation_value = self.evaluate_abs(circuit)?;
        let mut last_expectation_value = mean_expectation_value;
        let mut near_clifford_circuits = Vec::with_capacity(num_circuits);
        let mut proposals = 0usize;

        while near_clifford_circuits.len() < num_circuits {
            if let Some(limit) = self.max_proposals {
                if proposals >= limit {
                    return Err(CdrError::ProposalLimitReached {
                        limit,
                        accepted: near_clifford_circuits.len(),
                    });
                }
            }

            let candidate = self.base.propose(circuit, &index)?;
            let candidate_value = self.evaluate_abs(&candidate)?;
            let probability = acceptance_probability(
                candidate_value,
                last_expectation_value,
                self.standard_deviation,
                mean_expectation_value,
            );
            let draw: f64 = self.base.rng_mut().random();
            let accepted = draw < probability;
            trace!(
                proposal = proposals,
                candidate_value,
                reference_value = last_expectation_value,
                probability,
                accepted,
                "MCMC proposal"
            );

            if let Some(steps) = steps.as_deref_mut() {
                steps.push(ChainStep {
                    candidate_value,
                    reference_value: last_expectation_value,
                    acceptance_probability: probability,
                    draw,
                    accepted,
                });
            }
            proposals += 1;
            if accepted {
                near_clifford_circuits.push(candidate);
                last_expectation_value = candidate_value;
            }
        }

        debug!(
            num_circuits,
            non_clifford = index.len(),
            proposals,
            acceptance_rate = num_circuits as f64 / proposals as f64,
            "MCMC walk finished"
        );
        Ok((near_clifford_circuits, Some(mean_expectation_value)))
    }

    /// One executor call for one circuit, absolute value of the result.
    /// The reply must hold exactly one finite value.
    fn evaluate_abs(&mut self, circuit: &Circuit) -> Result<f64, CdrError> {
        let values = self.executor.evaluate(slice::from_ref(circuit), self.observable.as_ref())?;
        match values.as_slice() {
            [value] if value.is_finite() => Ok(value.abs()),
            [value] => Err(CdrError::NonFiniteExpectation { value: *value }),
            _ => Err(CdrError::MalformedExecutorOutput { expected: 1, got: values.len() }),
        }
    }
}

impl<E: Executor, C: GateClassifier> CircuitGenerator for McmcCircuitGenerator<E, C> {
    fn swap_operations(&mut self, op: &Operation) -> Result<Operation, CdrError> {
        self.base.swap_operations(op)
    }

    fn generate_circuits(&mut self, circuit: &Circuit, num_circuits: usize) -> Result<Vec<Circuit>, CdrError> {
        self.walk(circuit, num_circuits, None).map(|(circuits, _)| circuits)
    }
}
