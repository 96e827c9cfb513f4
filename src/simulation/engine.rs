// src/simulation/engine.rs
use crate::core::constants::MAX_SIMULATED_QUBITS;
use crate::core::{CdrError, QubitId, StateVector};
use crate::operations::{Operation, phase_matrix};
use num_complex::Complex;
use num_traits::Zero;
use std::collections::{BTreeSet, HashMap};

/// Dense state-vector engine evolving `|0...0>` through a circuit's operations.
/// (Internal visibility)
pub(crate) struct SimulationEngine {
    /// Maps qubit ids to their index (0..N-1) in sorted id order.
    qubit_indices: HashMap<QubitId, usize>,
    /// Amplitudes of the global state, dimension 2^N.
    amplitudes: Vec<Complex<f64>>,
    num_qubits: usize,
}

impl SimulationEngine {
    /// Initializes the engine in `|0...0>` over the given qubits.
    pub(crate) fn init(qubits: &BTreeSet<QubitId>) -> Result<Self, CdrError> {
        if qubits.is_empty() {
            return Err(CdrError::Simulation { message: "Cannot initialize simulation engine with zero qubits".to_string() });
        }
        let num_qubits = qubits.len();
        if num_qubits > MAX_SIMULATED_QUBITS {
            return Err(CdrError::Simulation {
                message: format!("{} qubits exceed the simulator limit of {}", num_qubits, MAX_SIMULATED_QUBITS),
            });
        }
        let dim = 1usize << num_qubits;

        // BTreeSet iteration is sorted, so index assignment is deterministic.
        let qubit_indices = qubits.iter().enumerate().map(|(index, q)| (*q, index)).collect();

        let mut amplitudes = vec![Complex::zero(); dim];
        amplitudes[0] = Complex::new(1.0, 0.0);

        Ok(Self { qubit_indices, amplitudes, num_qubits })
    }

    /// Applies a single operation to the global state.
    pub(crate) fn apply_operation(&mut self, op: &Operation) -> Result<(), CdrError> {
        match op {
            Operation::Rz { target, theta } => {
                let target_idx = self.get_qubit_index(target)?;
                self.apply_single_qubit_gate(target_idx, &phase_matrix(*theta));
            }
            Operation::Gate { target, gate } => {
                let target_idx = self.get_qubit_index(target)?;
                self.apply_single_qubit_gate(target_idx, &gate.matrix());
            }
            Operation::Controlled { control, target, gate } => {
                let control_idx = self.get_qubit_index(control)?;
                let target_idx = self.get_qubit_index(target)?;
                if control_idx == target_idx {
                    return Err(CdrError::Simulation { message: "Control and target qubits cannot be the same for controlled operation".to_string() });
                }
                self.apply_controlled_gate(control_idx, target_idx, &gate.matrix());
            }
        }
        Ok(())
    }

    /// Consumes the engine and returns the final state.
    pub(crate) fn into_state(self) -> StateVector {
        StateVector::new(self.amplitudes, self.num_qubits)
    }

    fn get_qubit_index(&self, qubit: &QubitId) -> Result<usize, CdrError> {
        self.qubit_indices
            .get(qubit)
            .copied()
            .ok_or_else(|| CdrError::Simulation { message: format!("Qubit {} not found in simulation context", qubit) })
    }

    /// Applies a 2x2 matrix to one qubit of the global state.
    fn apply_single_qubit_gate(&mut self, target_idx: usize, matrix: &[[Complex<f64>; 2]; 2]) {
        let k_mask = 1usize << (self.num_qubits - 1 - target_idx);

        // Visit each pair of basis states differing only at the target bit once.
        for i0 in 0..self.amplitudes.len() {
            if i0 & k_mask != 0 {
                continue;
            }
            let i1 = i0 | k_mask;
            let psi_0 = self.amplitudes[i0];
            let psi_1 = self.amplitudes[i1];
            self.amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            self.amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
    }

    /// Applies `matrix` to the target qubit on the subspace where the control is `|1>`.
    fn apply_controlled_gate(&mut self, control_idx: usize, target_idx: usize, matrix: &[[Complex<f64>; 2]; 2]) {
        let c_mask = 1usize << (self.num_qubits - 1 - control_idx);
        let t_mask = 1usize << (self.num_qubits - 1 - target_idx);

        for i0 in 0..self.amplitudes.len() {
            if i0 & c_mask == 0 || i0 & t_mask != 0 {
                continue;
            }
            let i1 = i0 | t_mask;
            let psi_0 = self.amplitudes[i0];
            let psi_1 = self.amplitudes[i1];
            self.amplitudes[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            self.amplitudes[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
    }
}
