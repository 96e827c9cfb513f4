//! Numeric constants shared by the mapper, the classifier and the simulator.

use std::f64::consts::{FRAC_PI_2, PI};

/// Z-rotation angles that implement Clifford phase gates (I, S, Z, S†).
pub const CLIFFORD_ANGLES: [f64; 4] = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];

/// Angles within this distance of a multiple of π/2 are treated as Clifford.
pub const ANGLE_TOLERANCE: f64 = 1e-9;

/// Default width of the acceptance likelihood used by the MCMC generator.
pub const DEFAULT_STANDARD_DEVIATION: f64 = 0.8;

/// Default kernel width for gaussian selection.
pub const DEFAULT_SIGMA_SELECT: f64 = 0.5;

/// Default kernel width for gaussian replacement.
pub const DEFAULT_SIGMA_REPLACE: f64 = 0.5;

/// Largest register the state-vector simulator accepts.
pub const MAX_SIMULATED_QUBITS: usize = 24;

/// Reduces an angle to `[0, 2π)`.
pub fn normalize_angle(theta: f64) -> f64 {
    let reduced = theta.rem_euclid(2.0 * PI);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if reduced >= 2.0 * PI { 0.0 } else { reduced }
}

/// Distance between the phase rotations `diag(1, e^{iθ})` and `diag(1, e^{iφ})`,
/// measured as the Frobenius norm of the difference of the two unitaries.
pub fn phase_distance(theta: f64, phi: f64) -> f64 {
    2.0 * ((theta - phi) / 2.0).sin().abs()
}
