// src/observable/mod.rs

//! Observables as weighted sums of Pauli strings.

use crate::core::{QubitId, StateVector};
use num_complex::Complex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
}

/// `coefficient · ⊗_q P_q`; qubits not listed carry the identity.
#[derive(Debug, Clone, PartialEq)]
pub struct PauliString {
    coefficient: f64,
    paulis: BTreeMap<QubitId, Pauli>,
}

impl PauliString {
    /// Creates a Pauli string. Identity factors are dropped.
    pub fn new<I>(coefficient: f64, paulis: I) -> Self
    where
        I: IntoIterator<Item = (QubitId, Pauli)>,
    {
        let paulis = paulis.into_iter().filter(|(_, p)| *p != Pauli::I).collect();
        Self { coefficient, paulis }
    }

    /// Pauli Z on a single qubit with unit weight.
    pub fn z(qubit: QubitId) -> Self {
        Self::new(1.0, [(qubit, Pauli::Z)])
    }

    /// The real coefficient.
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Non-identity factors keyed by qubit.
    pub fn paulis(&self) -> &BTreeMap<QubitId, Pauli> {
        &self.paulis
    }

    /// `<ψ|P|ψ>` times the coefficient. `qubit_order` lists the qubits of the
    /// state in id order; factors on qubits outside the state act as identity.
    pub fn expectation(&self, state: &StateVector, qubit_order: &[QubitId]) -> f64 {
        let n = state.num_qubits();
        let mut x_mask = 0usize;
        let mut z_mask = 0usize;
        let mut y_count = 0u32;
        for (qubit, pauli) in &self.paulis {
            let Some(idx) = qubit_order.iter().position(|q| q == qubit) else {
                continue;
            };
            let bit = 1usize << (n - 1 - idx);
            match pauli {
                Pauli::I => {}
                Pauli::X => x_mask |= bit,
                Pauli::Z => z_mask |= bit,
                Pauli::Y => {
                    x_mask |= bit;
                    z_mask |= bit;
                    y_count += 1;
                }
            }
        }

        // P|k> = i^{#Y} (-1)^{popcount(k & z_mask)} |k ^ x_mask>
        let y_phase = Complex::i().powu(y_count);
        let amplitudes = state.amplitudes();
        let mut total = Complex::new(0.0, 0.0);
        for (k, amp) in amplitudes.iter().enumerate() {
            let sign = if (k & z_mask).count_ones() % 2 == 0 { 1.0 } else { -1.0 };
            let image = k ^ x_mask;
            total += amplitudes[image].conj() * y_phase * sign * amp;
        }
        self.coefficient * total.re
    }
}

/// Hermitian observable `Σ_j c_j P_j`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observable {
    terms: Vec<PauliString>,
}

impl Observable {
    /// Creates an observable from its Pauli terms.
    pub fn new(terms: Vec<PauliString>) -> Self {
        Self { terms }
    }

    /// The Pauli terms.
    pub fn terms(&self) -> &[PauliString] {
        &self.terms
    }

    /// Qubits acted on non-trivially by some term.
    pub fn qubits(&self) -> BTreeSet<QubitId> {
        self.terms.iter().flat_map(|t| t.paulis.keys().copied()).collect()
    }

    /// Expectation value on a state whose qubits are `qubit_order`.
    pub fn expectation(&self, state: &StateVector, qubit_order: &[QubitId]) -> f64 {
        self.terms.iter().map(|t| t.expectation(state, qubit_order)).sum()
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Pauli::I => "I",
            Pauli::X => "X",
            Pauli::Y => "Y",
            Pauli::Z => "Z",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coefficient)?;
        for (qubit, pauli) in &self.paulis {
            write!(f, " {}{}", pauli, qubit)?;
        }
        Ok(())
    }
}
