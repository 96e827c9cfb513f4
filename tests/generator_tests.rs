// tests/generator_tests.rs

use nearclifford::cdr::{NonCliffordIndex, likelihood};
use nearclifford::{
    CdrError, Circuit, CircuitBuilder, CircuitGenerator, Executor, FnExecutor, Gate, GeneratorConfig,
    McmcCircuitGenerator, Observable, Operation, PauliString, QubitId, RandomCircuitGenerator,
    RecordingExecutor, ReplaceMethod, Simulator, StabilizerClassifier, generate_for_each,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const TEST_TOLERANCE: f64 = 1e-12;
const NON_CLIFFORD_POSITIONS: [usize; 3] = [2, 4, 7];

// Helper function to create QubitId for tests
fn qid(id: u64) -> QubitId {
    QubitId(id)
}

/// Ten operations on three qubits, non-Clifford at positions 2, 4 and 7.
fn mixed_circuit() -> Circuit {
    CircuitBuilder::new()
        .add_op(Operation::Gate { target: qid(0), gate: Gate::H })
        .add_op(Operation::Gate { target: qid(1), gate: Gate::H })
        .add_op(Operation::Rz { target: qid(0), theta: 0.3 })
        .add_op(Operation::Controlled { control: qid(0), target: qid(1), gate: Gate::X })
        .add_op(Operation::Gate { target: qid(1), gate: Gate::T })
        .add_op(Operation::Gate { target: qid(2), gate: Gate::S })
        .add_op(Operation::Controlled { control: qid(1), target: qid(2), gate: Gate::Z })
        .add_op(Operation::Rz { target: qid(2), theta: 1.1 })
        .add_op(Operation::Gate { target: qid(0), gate: Gate::X })
        .add_op(Operation::Gate { target: qid(2), gate: Gate::H })
        .build()
}

fn clifford_circuit() -> Circuit {
    CircuitBuilder::new()
        .add_op(Operation::Gate { target: qid(0), gate: Gate::H })
        .add_op(Operation::Controlled { control: qid(0), target: qid(1), gate: Gate::X })
        .add_op(Operation::Rz { target: qid(1), theta: std::f64::consts::PI })
        .build()
}

fn z0() -> Observable {
    Observable::new(vec![PauliString::z(qid(0))])
}

/// Asserts that `generated` differs from `original` only at non-Clifford positions,
/// and that those positions now hold Clifford rotations on the same qubit.
fn assert_structure_preserved(original: &Circuit, generated: &Circuit) {
    assert_eq!(generated.len(), original.len(), "operation count changed");
    assert_eq!(generated.qubits(), original.qubits(), "qubit set changed");
    for (i, (old, new)) in original.operations().iter().zip(generated.operations()).enumerate() {
        if old.has_stabilizer_effect() {
            assert_eq!(old, new, "Clifford operation at position {} changed", i);
        } else {
            assert!(new.has_stabilizer_effect(), "position {} is still non-Clifford: {}", i, new);
            assert_eq!(old.involved_qubits(), new.involved_qubits(), "qubits changed at position {}", i);
        }
    }
}

fn constant_executor(value: f64) -> RecordingExecutor<FnExecutor<impl FnMut(&Circuit) -> Result<f64, CdrError>>> {
    RecordingExecutor::new(FnExecutor::new(move |_: &Circuit| Ok(value)))
}

/// First call returns `mean`; afterwards proposals alternate between a value
/// `100σ` away and `mean` itself.
fn alternating_executor(mean: f64, sigma: f64) -> RecordingExecutor<FnExecutor<impl FnMut(&Circuit) -> Result<f64, CdrError>>> {
    let mut calls = 0usize;
    RecordingExecutor::new(FnExecutor::new(move |_: &Circuit| {
        calls += 1;
        if calls > 1 && calls % 2 == 0 {
            Ok(mean + 100.0 * sigma)
        } else {
            Ok(mean)
        }
    }))
}

#[test]
fn test_scenario_a_random_generator_accepts_everything() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    assert_eq!(
        NonCliffordIndex::build(&circuit, &StabilizerClassifier).positions(),
        &NON_CLIFFORD_POSITIONS
    );

    let mut generator = RandomCircuitGenerator::new(
        GeneratorConfig::new().with_method_replace(ReplaceMethod::Uniform).with_seed(42),
    )?;
    let training = generator.generate_circuits(&circuit, 5)?;

    assert_eq!(training.len(), 5);
    for generated in &training {
        assert_structure_preserved(&circuit, generated);
        for (i, (old, new)) in circuit.operations().iter().zip(generated.operations()).enumerate() {
            if !NON_CLIFFORD_POSITIONS.contains(&i) {
                assert_eq!(old, new);
            }
        }
    }
    Ok(())
}

#[test]
fn test_scenario_b_constant_executor_accepts_every_proposal() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let n = 6;
    let mut generator = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(1), constant_executor(0.6), 0.8)?;

    let (training, trace) = generator.generate_circuits_traced(&circuit, n)?;

    assert_eq!(training.len(), n);
    assert_eq!(trace.proposals(), n);
    assert!(trace.steps().iter().all(|s| s.acceptance_probability == 1.0 && s.accepted));
    assert_eq!(trace.mean_expectation_value(), Some(0.6));
    assert_eq!(generator.executor().calls(), n + 1);
    Ok(())
}

#[test]
fn test_scenario_c_divergent_values_are_rejected_without_overflow() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let (mean, sigma, n) = (0.5, 0.8, 5);
    let mut generator = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(2), alternating_executor(mean, sigma), sigma)?;

    let (training, trace) = generator.generate_circuits_traced(&circuit, n)?;

    assert_eq!(training.len(), n);
    for step in trace.steps() {
        assert!(step.acceptance_probability.is_finite());
        if step.candidate_value > mean {
            assert_eq!(step.acceptance_probability, 0.0);
            assert!(!step.accepted);
        } else {
            assert!(step.accepted);
        }
    }
    assert_eq!(trace.proposals(), 2 * n);
    assert_eq!(generator.executor().calls(), 2 * n + 1);
    Ok(())
}

#[test]
fn test_degenerate_input_is_returned_verbatim_without_oracle_calls() -> Result<(), CdrError> {
    let circuit = clifford_circuit();

    let mut random = RandomCircuitGenerator::new(GeneratorConfig::new().with_seed(3))?;
    let copies = random.generate_circuits(&circuit, 4)?;
    assert_eq!(copies, vec![circuit.clone(); 4]);

    let mut mcmc = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(3), constant_executor(0.2), 0.8)?;
    let (copies, trace) = mcmc.generate_circuits_traced(&circuit, 3)?;
    assert_eq!(copies, vec![circuit.clone(); 3]);
    assert_eq!(trace.mean_expectation_value(), None);
    assert_eq!(mcmc.executor().calls(), 0);
    Ok(())
}

#[test]
fn test_count_property() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let mut random = RandomCircuitGenerator::new(GeneratorConfig::new().with_seed(4))?;
    let mut mcmc = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(4), Simulator::new(), 0.8)?
        .with_observable(z0());
    for n in [1, 2, 7] {
        assert_eq!(random.generate_circuits(&circuit, n)?.len(), n);
        assert_eq!(mcmc.generate_circuits(&circuit, n)?.len(), n);
    }
    Ok(())
}

#[test]
fn test_determinism_with_equal_seeds() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let config = GeneratorConfig::new().with_method_replace(ReplaceMethod::Uniform).with_seed(99);

    let mut first = McmcCircuitGenerator::new(config.clone(), Simulator::new(), 0.5)?.with_observable(z0());
    let mut second = McmcCircuitGenerator::new(config, Simulator::new(), 0.5)?.with_observable(z0());

    let (circuits_a, trace_a) = first.generate_circuits_traced(&circuit, 8)?;
    let (circuits_b, trace_b) = second.generate_circuits_traced(&circuit, 8)?;
    assert_eq!(circuits_a, circuits_b);
    assert_eq!(trace_a, trace_b);
    Ok(())
}

#[test]
fn test_seed_and_injected_generator_agree() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let mut seeded = RandomCircuitGenerator::new(
        GeneratorConfig::new().with_method_replace(ReplaceMethod::Uniform).with_seed(3),
    )?;
    let mut injected = RandomCircuitGenerator::new(
        GeneratorConfig::new()
            .with_method_replace(ReplaceMethod::Uniform)
            .with_rng(StdRng::seed_from_u64(3)),
    )?;
    assert_eq!(seeded.generate_circuits(&circuit, 5)?, injected.generate_circuits(&circuit, 5)?);
    Ok(())
}

#[test]
fn test_random_state_persists_across_calls() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let mut generator = RandomCircuitGenerator::new(
        GeneratorConfig::new().with_method_replace(ReplaceMethod::Uniform).with_seed(8),
    )?;
    let first = generator.generate_circuits(&circuit, 5)?;
    let second = generator.generate_circuits(&circuit, 5)?;
    assert_ne!(first, second);
    Ok(())
}

#[test]
fn test_acceptance_decisions_replay_from_recorded_values() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let sigma = 0.3;
    let executor = RecordingExecutor::new(Simulator::new());
    let mut generator = McmcCircuitGenerator::new(
        GeneratorConfig::new().with_method_replace(ReplaceMethod::Uniform).with_seed(17),
        executor,
        sigma,
    )?
    .with_observable(z0());

    let (training, trace) = generator.generate_circuits_traced(&circuit, 20)?;
    assert_eq!(training.len(), 20);

    let history = generator.executor().history().to_vec();
    assert_eq!(history.len(), trace.proposals() + 1);
    let mean = history[0].abs();
    assert_eq!(trace.mean_expectation_value(), Some(mean));

    let mut last = mean;
    let mut accepted = 0;
    for (step, recorded) in trace.steps().iter().zip(&history[1..]) {
        assert_eq!(step.candidate_value, recorded.abs());
        assert_eq!(step.reference_value, last);

        let expected = (likelihood(step.candidate_value, sigma, mean) / likelihood(last, sigma, mean)).min(1.0);
        assert!((step.acceptance_probability - expected).abs() < TEST_TOLERANCE);
        assert!((0.0..1.0).contains(&step.draw));
        assert_eq!(step.accepted, step.draw < step.acceptance_probability);

        if step.accepted {
            last = step.candidate_value;
            accepted += 1;
        }
    }
    assert_eq!(accepted, 20);
    Ok(())
}

#[test]
fn test_mcmc_preserves_structure() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let mut generator = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(21), Simulator::new(), 0.8)?
        .with_observable(z0());
    for generated in generator.generate_circuits(&circuit, 10)? {
        assert_structure_preserved(&circuit, &generated);
    }
    Ok(())
}

#[test]
fn test_fraction_one_keeps_every_non_clifford_operation() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let mut generator = RandomCircuitGenerator::new(GeneratorConfig::new().with_fraction_non_clifford(1.0).with_seed(5))?;
    assert_eq!(generator.generate_circuits(&circuit, 3)?, vec![circuit.clone(); 3]);
    Ok(())
}

#[test]
fn test_fraction_one_third_leaves_one_non_clifford_operation() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let mut generator = RandomCircuitGenerator::new(
        GeneratorConfig::new().with_fraction_non_clifford(1.0 / 3.0).with_seed(6),
    )?;
    for generated in generator.generate_circuits(&circuit, 10)? {
        assert_eq!(NonCliffordIndex::build(&generated, &StabilizerClassifier).len(), 1);
    }
    Ok(())
}

#[test]
fn test_batching_adapter_flattens_results() -> Result<(), CdrError> {
    let mixed = mixed_circuit();
    let clifford = clifford_circuit();
    let mut generator = RandomCircuitGenerator::new(GeneratorConfig::new().with_seed(7))?;

    let generated = generate_for_each(&mut generator, &[mixed.clone(), clifford.clone()], 3)?;

    assert_eq!(generated.len(), 6);
    for c in &generated[..3] {
        assert_structure_preserved(&mixed, c);
    }
    assert_eq!(&generated[3..], &[clifford.clone(), clifford.clone(), clifford]);
    assert_eq!(generate_for_each(&mut generator, &[mixed], 0), Err(CdrError::InvalidCircuitCount));
    Ok(())
}

#[test]
fn test_invalid_configuration_is_rejected() {
    for sigma in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let result = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(0), Simulator::new(), sigma);
        assert!(matches!(result, Err(CdrError::InvalidStandardDeviation(_))));
    }

    let err = GeneratorConfig::new().with_method_names("random", "closest").unwrap_err();
    assert!(matches!(err, CdrError::InvalidMethod { option: "method_select", .. }));

    let result = RandomCircuitGenerator::new(GeneratorConfig::new().with_fraction_non_clifford(-0.1));
    assert!(matches!(result, Err(CdrError::InvalidFraction(_))));
}

#[test]
fn test_zero_circuits_is_rejected_by_mcmc() -> Result<(), CdrError> {
    let mut generator = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(0), constant_executor(0.1), 0.8)?;
    assert_eq!(generator.generate_circuits(&mixed_circuit(), 0), Err(CdrError::InvalidCircuitCount));
    assert_eq!(generator.executor().calls(), 0);
    Ok(())
}

#[test]
fn test_executor_failure_is_propagated() -> Result<(), CdrError> {
    let mut calls = 0;
    let failing = FnExecutor::new(move |_: &Circuit| {
        calls += 1;
        if calls == 3 {
            Err(CdrError::Executor { message: "backend timeout".to_string() })
        } else {
            Ok(0.4)
        }
    });
    let mut generator = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(0), failing, 0.8)?;
    let result = generator.generate_circuits(&mixed_circuit(), 5);
    assert_eq!(result, Err(CdrError::Executor { message: "backend timeout".to_string() }));
    Ok(())
}

struct EmptyExecutor;

impl Executor for EmptyExecutor {
    fn evaluate(&mut self, _circuits: &[Circuit], _observable: Option<&Observable>) -> Result<Vec<f64>, CdrError> {
        Ok(Vec::new())
    }
}

#[test]
fn test_malformed_executor_output() -> Result<(), CdrError> {
    let mut generator = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(0), EmptyExecutor, 0.8)?;
    let result = generator.generate_circuits(&mixed_circuit(), 1);
    assert_eq!(result, Err(CdrError::MalformedExecutorOutput { expected: 1, got: 0 }));
    Ok(())
}

#[test]
fn test_reply_with_extra_values_is_malformed() -> Result<(), CdrError> {
    struct TwoValues;
    impl Executor for TwoValues {
        fn evaluate(&mut self, _circuits: &[Circuit], _observable: Option<&Observable>) -> Result<Vec<f64>, CdrError> {
            Ok(vec![0.5, 0.5])
        }
    }

    let mut generator = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(0), TwoValues, 0.8)?;
    let result = generator.generate_circuits(&mixed_circuit(), 1);
    assert_eq!(result, Err(CdrError::MalformedExecutorOutput { expected: 1, got: 2 }));
    Ok(())
}

#[test]
fn test_nan_original_value_is_reported() -> Result<(), CdrError> {
    let nan = RecordingExecutor::new(FnExecutor::new(|_: &Circuit| Ok(f64::NAN)));
    let mut generator = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(0), nan, 0.8)?;
    let result = generator.generate_circuits(&mixed_circuit(), 3);
    assert!(matches!(result, Err(CdrError::NonFiniteExpectation { value }) if value.is_nan()));
    assert_eq!(generator.executor().calls(), 1);
    Ok(())
}

#[test]
fn test_non_finite_candidate_value_is_reported() -> Result<(), CdrError> {
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let mut calls = 0;
        let executor = FnExecutor::new(move |_: &Circuit| {
            calls += 1;
            Ok(if calls == 1 { 0.5 } else { bad })
        });
        let mut generator = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(0), executor, 0.8)?;
        match generator.generate_circuits_traced(&mixed_circuit(), 3) {
            Err(CdrError::NonFiniteExpectation { value }) => {
                assert!(value.is_nan() == bad.is_nan() && (value.is_nan() || value == bad));
            }
            other => panic!("expected a non-finite expectation error, got {:?}", other),
        }
    }
    Ok(())
}

#[test]
fn test_untraced_walk_matches_traced_walk() -> Result<(), CdrError> {
    let circuit = mixed_circuit();
    let config = GeneratorConfig::new().with_method_replace(ReplaceMethod::Uniform).with_seed(31);

    let mut traced = McmcCircuitGenerator::new(config.clone(), RecordingExecutor::new(Simulator::new()), 0.3)?
        .with_observable(z0());
    let mut plain = McmcCircuitGenerator::new(config, RecordingExecutor::new(Simulator::new()), 0.3)?
        .with_observable(z0());

    let (expected, trace) = traced.generate_circuits_traced(&circuit, 6)?;
    assert_eq!(plain.generate_circuits(&circuit, 6)?, expected);
    assert_eq!(plain.executor().calls(), trace.proposals() + 1);
    Ok(())
}

#[test]
fn test_caller_supplied_proposal_limit() -> Result<(), CdrError> {
    let mut calls = 0;
    // Every candidate lands 100σ away from the original value.
    let far = FnExecutor::new(move |_: &Circuit| {
        calls += 1;
        Ok(if calls == 1 { 0.5 } else { 80.5 })
    });
    let mut generator = McmcCircuitGenerator::new(GeneratorConfig::new().with_seed(0), far, 0.8)?
        .with_max_proposals(25);
    let result = generator.generate_circuits(&mixed_circuit(), 2);
    assert_eq!(result, Err(CdrError::ProposalLimitReached { limit: 25, accepted: 0 }));
    Ok(())
}

#[test]
fn test_unmappable_non_clifford_operation() -> Result<(), CdrError> {
    let circuit = CircuitBuilder::new()
        .add_op(Operation::Controlled { control: qid(0), target: qid(1), gate: Gate::T })
        .build();
    let mut generator = RandomCircuitGenerator::new(GeneratorConfig::new().with_seed(0))?;
    assert!(matches!(
        generator.generate_circuits(&circuit, 2),
        Err(CdrError::UnsupportedOperation { .. })
    ));
    Ok(())
}
