// src/cdr/random.rs

//! Independent resampling of the non-Clifford operations, no acceptance step.

use super::config::GeneratorConfig;
use super::near_clifford::NearCliffordMapper;
use super::{CircuitGenerator, GateClassifier, StabilizerClassifier};
use crate::circuits::Circuit;
use crate::core::CdrError;
use crate::operations::Operation;
use rand::rngs::StdRng;
use tracing::debug;

/// Positions of the non-Clifford operations of one circuit, strictly increasing,
/// paired with the operations themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct NonCliffordIndex {
    positions: Vec<usize>,
    operations: Vec<Operation>,
}

impl NonCliffordIndex {
    /// Classifies every operation of `circuit` with `classifier`.
    pub fn build<C: GateClassifier + ?Sized>(circuit: &Circuit, classifier: &C) -> Self {
        let (positions, operations): (Vec<usize>, Vec<Operation>) = circuit
            .operations()
            .iter()
            .enumerate()
            .filter(|(_, op)| !classifier.has_stabilizer_effect(op))
            .map(|(i, op)| (i, op.clone()))
            .unzip();
        Self { positions, operations }
    }

    /// Positions in the circuit's operation sequence.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// The non-Clifford operations, in circuit order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of non-Clifford operations.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// `true` if the circuit is already Clifford.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Produces training circuits by drawing fresh Clifford replacements for the
/// non-Clifford operations on every circuit. Every draw is kept.
#[derive(Debug, Clone)]
pub struct RandomCircuitGenerator<C = StabilizerClassifier> {
    mapper: NearCliffordMapper,
    classifier: C,
    rng: StdRng,
}

impl RandomCircuitGenerator {
    /// Creates a generator with the built-in Clifford classifier.
    pub fn new(config: GeneratorConfig) -> Result<Self, CdrError> {
        Self::with_classifier(config, StabilizerClassifier)
    }
}

impl<C: GateClassifier> RandomCircuitGenerator<C> {
    /// Creates a generator that classifies operations with `classifier`.
    pub fn with_classifier(config: GeneratorConfig, classifier: C) -> Result<Self, CdrError> {
        let mapper = NearCliffordMapper::from_config(&config)?;
        debug!(
            fraction_non_clifford = mapper.fraction_non_clifford(),
            method_select = %mapper.method_select(),
            method_replace = %mapper.method_replace(),
            "created random circuit generator"
        );
        Ok(Self {
            mapper,
            classifier,
            rng: config.random_state.into_rng(),
        })
    }

    /// The replacement policy in use.
    pub fn mapper(&self) -> &NearCliffordMapper {
        &self.mapper
    }

    /// The classifier in use.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Non-Clifford positions of `circuit` according to this generator's classifier.
    pub fn non_clifford_index(&self, circuit: &Circuit) -> NonCliffordIndex {
        NonCliffordIndex::build(circuit, &self.classifier)
    }

    /// Draws one candidate: fresh replacements for every indexed position,
    /// spliced into a copy of `circuit`.
    pub fn propose(&mut self, circuit: &Circuit, index: &NonCliffordIndex) -> Result<Circuit, CdrError> {
        let new_ops = self.mapper.map(index.operations(), &mut self.rng)?;
        let replacements: Vec<(usize, Operation)> = index.positions().iter().copied().zip(new_ops).collect();
        Ok(circuit.with_replacements(&replacements))
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl<C: GateClassifier> CircuitGenerator for RandomCircuitGenerator<C> {
    fn swap_operations(&mut self, op: &Operation) -> Result<Operation, CdrError> {
        if self.classifier.has_stabilizer_effect(op) {
            return Ok(op.clone());
        }
        self.mapper.replace_operation(op, &mut self.rng)
    }

    fn generate_circuits(&mut self, circuit: &Circuit, num_circuits: usize) -> Result<Vec<Circuit>, CdrError> {
        if num_circuits == 0 {
            return Err(CdrError::InvalidCircuitCount);
        }

        let index = self.non_clifford_index(circuit);
        if index.is_empty() {
            debug!(num_circuits, "circuit is already Clifford, returning copies");
            return Ok(vec![circuit.clone(); num_circuits]);
        }

        let circuits = (0..num_circuits)
            .map(|_| self.propose(circuit, &index))
            .collect::<Result<Vec<Circuit>, CdrError>>()?;
        debug!(num_circuits, non_clifford = index.len(), "generated random near-Clifford circuits");
        Ok(circuits)
    }
}
