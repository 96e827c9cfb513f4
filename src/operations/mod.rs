// src/operations/mod.rs

//! Gate operations and their Clifford classification.
//!
//! An [`Operation`] is one gate application at one position of a circuit.
//! Whether it has a stabilizer effect (is Clifford) is decided here, and
//! operations that are Z-rotations expose their angle so the near-Clifford
//! mapper can replace them.

use crate::core::QubitId;
use crate::core::constants::ANGLE_TOLERANCE;
use num_complex::Complex;
use num_traits::Zero;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};
use std::fmt;

/// Fixed (parameter free) single-qubit gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Identity.
    I,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
    /// Hadamard.
    H,
    /// Phase gate `diag(1, i)`.
    S,
    /// Inverse phase gate `diag(1, -i)`.
    Sdg,
    /// Square root of X.
    SqrtX,
    /// Inverse square root of X.
    SqrtXdg,
    /// `diag(1, e^{iπ/4})`, non-Clifford.
    T,
    /// `diag(1, e^{-iπ/4})`, non-Clifford.
    Tdg,
}

impl Gate {
    /// `true` for every gate except `T` and `T†`.
    pub fn is_clifford(&self) -> bool {
        !matches!(self, Gate::T | Gate::Tdg)
    }

    /// Angle of the equivalent phase rotation for diagonal gates.
    pub fn z_rotation_angle(&self) -> Option<f64> {
        match self {
            Gate::I => Some(0.0),
            Gate::Z => Some(std::f64::consts::PI),
            Gate::S => Some(FRAC_PI_2),
            Gate::Sdg => Some(-FRAC_PI_2),
            Gate::T => Some(FRAC_PI_4),
            Gate::Tdg => Some(-FRAC_PI_4),
            _ => None,
        }
    }

    /// Short symbol used in circuit diagrams.
    pub fn symbol(&self) -> &'static str {
        match self {
            Gate::I => "I",
            Gate::X => "X",
            Gate::Y => "Y",
            Gate::Z => "Z",
            Gate::H => "H",
            Gate::S => "S",
            Gate::Sdg => "S†",
            Gate::SqrtX => "√X",
            Gate::SqrtXdg => "√X†",
            Gate::T => "T",
            Gate::Tdg => "T†",
        }
    }

    /// 2x2 unitary of the gate.
    pub fn matrix(&self) -> [[Complex<f64>; 2]; 2] {
        let one = Complex::new(1.0, 0.0);
        let zero = Complex::zero();
        let i = Complex::i();
        match self {
            Gate::I => [[one, zero], [zero, one]],
            Gate::X => [[zero, one], [one, zero]],
            Gate::Y => [[zero, -i], [i, zero]],
            Gate::Z => [[one, zero], [zero, -one]],
            Gate::H => {
                let h = Complex::new(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            Gate::SqrtX => [
                [Complex::new(0.5, 0.5), Complex::new(0.5, -0.5)],
                [Complex::new(0.5, -0.5), Complex::new(0.5, 0.5)],
            ],
            Gate::SqrtXdg => [
                [Complex::new(0.5, -0.5), Complex::new(0.5, 0.5)],
                [Complex::new(0.5, 0.5), Complex::new(0.5, -0.5)],
            ],
            Gate::S | Gate::Sdg | Gate::T | Gate::Tdg => {
                // Diagonal gates share the phase rotation form.
                let theta = self.z_rotation_angle().unwrap_or(0.0);
                phase_matrix(theta)
            }
        }
    }
}

/// A single gate application.
#[derive(Debug, Clone, PartialEq)] // f64 angles compare bit-for-bit
pub enum Operation {
    /// Phase rotation `diag(1, e^{iθ})` on one qubit. Equal to `Rz(θ)` up to a
    /// global phase.
    Rz {
        /// The qubit the rotation acts on.
        target: QubitId,
        /// Rotation angle in radians.
        theta: f64,
    },

    /// A fixed single-qubit gate.
    Gate {
        /// The qubit the gate acts on.
        target: QubitId,
        /// The gate applied.
        gate: Gate,
    },

    /// A fixed gate on `target` applied when `control` is `|1>`.
    /// `gate: X` is CNOT, `gate: Z` is CZ.
    Controlled {
        /// Control qubit.
        control: QubitId,
        /// Target qubit.
        target: QubitId,
        /// Gate applied to the target.
        gate: Gate,
    },
}

impl Operation {
    /// Returns the qubits the operation acts on, control first.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Rz { target, .. } => vec![*target],
            Operation::Gate { target, .. } => vec![*target],
            Operation::Controlled { control, target, .. } => vec![*control, *target],
        }
    }

    /// Whether the operation maps Pauli operators to Pauli operators.
    pub fn has_stabilizer_effect(&self) -> bool {
        match self {
            Operation::Rz { theta, .. } => is_clifford_angle(*theta),
            Operation::Gate { gate, .. } => gate.is_clifford(),
            // Only controlled Paulis stay inside the Clifford group.
            Operation::Controlled { gate, .. } => {
                matches!(gate, Gate::I | Gate::X | Gate::Y | Gate::Z)
            }
        }
    }

    /// Angle of the single-qubit phase rotation this operation is equivalent to,
    /// if any. Only such operations can be mapped to near-Clifford replacements.
    pub fn z_rotation_angle(&self) -> Option<f64> {
        match self {
            Operation::Rz { theta, .. } => Some(*theta),
            Operation::Gate { gate, .. } => gate.z_rotation_angle(),
            Operation::Controlled { .. } => None,
        }
    }

    /// Builds the phase rotation by `theta` acting on this operation's target.
    /// Returns `None` for multi-qubit operations.
    pub fn with_z_rotation(&self, theta: f64) -> Option<Operation> {
        match self {
            Operation::Rz { target, .. } | Operation::Gate { target, .. } => {
                Some(Operation::Rz { target: *target, theta })
            }
            Operation::Controlled { .. } => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Rz { target, theta } => write!(f, "Rz({:.4}) {}", theta, target),
            Operation::Gate { target, gate } => write!(f, "{} {}", gate.symbol(), target),
            Operation::Controlled { control, target, gate } => {
                write!(f, "C{} {} -> {}", gate.symbol(), control, target)
            }
        }
    }
}

/// `true` if `theta` is a multiple of π/2 up to [`ANGLE_TOLERANCE`].
pub fn is_clifford_angle(theta: f64) -> bool {
    if !theta.is_finite() {
        return false;
    }
    let steps = theta / FRAC_PI_2;
    (steps - steps.round()).abs() * FRAC_PI_2 < ANGLE_TOLERANCE
}

/// Matrix of the phase rotation `diag(1, e^{iθ})`.
pub(crate) fn phase_matrix(theta: f64) -> [[Complex<f64>; 2]; 2] {
    [
        [Complex::new(1.0, 0.0), Complex::zero()],
        [Complex::zero(), Complex::new(theta.cos(), theta.sin())],
    ]
}
