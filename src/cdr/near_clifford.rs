// src/cdr/near_clifford.rs

//! Maps non-Clifford operations to nearby Clifford operations.
//!
//! Every mappable operation is a phase rotation by some angle θ. A Clifford
//! replacement is the phase rotation by one of `0, π/2, π, 3π/2` on the same
//! qubit. Closeness between angles is measured by
//! [`phase_distance`](crate::core::phase_distance), the Frobenius distance of
//! the two unitaries.

use super::config::{GeneratorConfig, ReplaceMethod, SelectMethod};
use crate::core::constants::{ANGLE_TOLERANCE, CLIFFORD_ANGLES};
use crate::core::{CdrError, normalize_angle, phase_distance};
use crate::operations::Operation;
use rand::Rng;
use rand::seq::index;
use std::f64::consts::FRAC_PI_2;

/// Selection and replacement policy, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct NearCliffordMapper {
    fraction_non_clifford: f64,
    method_select: SelectMethod,
    method_replace: ReplaceMethod,
    sigma_select: f64,
    sigma_replace: f64,
}

impl NearCliffordMapper {
    /// Builds a mapper from validated configuration.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, CdrError> {
        config.validate()?;
        Ok(Self {
            fraction_non_clifford: config.fraction_non_clifford,
            method_select: config.method_select,
            method_replace: config.method_replace,
            sigma_select: config.sigma_select,
            sigma_replace: config.sigma_replace,
        })
    }

    /// The selection policy.
    pub fn method_select(&self) -> SelectMethod {
        self.method_select
    }

    /// The replacement policy.
    pub fn method_replace(&self) -> ReplaceMethod {
        self.method_replace
    }

    /// The fraction of non-Clifford operations left unchanged.
    pub fn fraction_non_clifford(&self) -> f64 {
        self.fraction_non_clifford
    }

    /// Produces one operation per input operation: the selected ones are
    /// replaced by Clifford phase rotations on the same qubit, the rest are
    /// returned unchanged.
    ///
    /// # Errors
    /// `CdrError::UnsupportedOperation` if an input is not a finite phase rotation.
    pub fn map<R: Rng + ?Sized>(&self, ops: &[Operation], rng: &mut R) -> Result<Vec<Operation>, CdrError> {
        let angles = ops.iter().map(rotation_angle).collect::<Result<Vec<f64>, CdrError>>()?;
        let selected = self.select(&angles, rng)?;

        let mut mapped = ops.to_vec();
        for i in selected {
            let replacement = self.replace_angle(angles[i], rng)?;
            mapped[i] = clifford_rotation(&ops[i], replacement)?;
        }
        Ok(mapped)
    }

    /// Replaces a single operation unconditionally, ignoring the selection policy.
    pub fn replace_operation<R: Rng + ?Sized>(&self, op: &Operation, rng: &mut R) -> Result<Operation, CdrError> {
        let angle = rotation_angle(op)?;
        let replacement = self.replace_angle(angle, rng)?;
        clifford_rotation(op, replacement)
    }

    /// Indices (sorted) of the operations to replace, given their angles.
    pub fn select<R: Rng + ?Sized>(&self, angles: &[f64], rng: &mut R) -> Result<Vec<usize>, CdrError> {
        let total = angles.len();
        let num_kept = (self.fraction_non_clifford * total as f64).round() as usize;
        let num_replaced = total - num_kept.min(total);
        if num_replaced == 0 {
            return Ok(Vec::new());
        }

        let mut selected = match self.method_select {
            SelectMethod::Uniform => index::sample(rng, total, num_replaced).into_vec(),
            SelectMethod::Gaussian => {
                let weights: Vec<f64> = angles
                    .iter()
                    .map(|a| {
                        let nearest = CLIFFORD_ANGLES
                            .iter()
                            .map(|c| phase_distance(normalize_angle(*a), *c))
                            .fold(f64::INFINITY, f64::min);
                        -(nearest / self.sigma_select).powi(2)
                    })
                    .collect();
                sample_without_replacement(&normalized_weights(&weights), num_replaced, rng)?
            }
        };
        selected.sort_unstable();
        Ok(selected)
    }

    /// Picks a Clifford angle for `angle` according to the replacement policy.
    pub fn replace_angle<R: Rng + ?Sized>(&self, angle: f64, rng: &mut R) -> Result<f64, CdrError> {
        let angle = normalize_angle(angle);
        let choice = match self.method_replace {
            ReplaceMethod::Closest => closest_clifford_index(angle, rng),
            ReplaceMethod::Uniform => rng.random_range(0..CLIFFORD_ANGLES.len()),
            ReplaceMethod::Gaussian => {
                let log_weights: Vec<f64> = CLIFFORD_ANGLES
                    .iter()
                    .map(|c| -(phase_distance(angle, *c) / self.sigma_replace).powi(2))
                    .collect();
                draw_weighted(&normalized_weights(&log_weights), rng)?
            }
        };
        Ok(CLIFFORD_ANGLES[choice])
    }
}

fn rotation_angle(op: &Operation) -> Result<f64, CdrError> {
    match op.z_rotation_angle() {
        Some(theta) if theta.is_finite() => Ok(theta),
        _ => Err(CdrError::UnsupportedOperation { operation: op.to_string() }),
    }
}

fn clifford_rotation(op: &Operation, theta: f64) -> Result<Operation, CdrError> {
    op.with_z_rotation(theta)
        .ok_or_else(|| CdrError::UnsupportedOperation { operation: op.to_string() })
}

/// Index into [`CLIFFORD_ANGLES`] of the nearest Clifford angle. `angle` is in `[0, 2π)`.
fn closest_clifford_index<R: Rng + ?Sized>(angle: f64, rng: &mut R) -> usize {
    let scaled = angle / FRAC_PI_2;
    let lower = scaled.floor();
    let step = if ((scaled - lower) - 0.5).abs() * FRAC_PI_2 < ANGLE_TOLERANCE {
        // Equidistant, e.g. a T gate between I and S.
        if rng.random::<bool>() { lower + 1.0 } else { lower }
    } else {
        scaled.round()
    };
    (step as usize) % CLIFFORD_ANGLES.len()
}

/// Turns log-weights into weights whose maximum is one, so that very narrow
/// kernels never underflow every weight to zero.
fn normalized_weights(log_weights: &[f64]) -> Vec<f64> {
    let max = log_weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    log_weights.iter().map(|w| (w - max).exp()).collect()
}

/// Draws an index with probability proportional to its weight.
fn draw_weighted<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Result<usize, CdrError> {
    let total: f64 = weights.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(CdrError::Sampling { message: format!("weights sum to {}", total) });
    }

    let p_sample: f64 = rng.random::<f64>() * total; // Sample in [0, total)
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w;
        if p_sample < cumulative {
            return Ok(i);
        }
    }
    // p_sample can reach the rounded total; fall back to the last positive weight
    weights
        .iter()
        .rposition(|w| *w > 0.0)
        .ok_or_else(|| CdrError::Sampling { message: "no positive weight".to_string() })
}

/// Draws `amount` distinct indices, each draw proportional to the remaining weights.
fn sample_without_replacement<R: Rng + ?Sized>(
    weights: &[f64],
    amount: usize,
    rng: &mut R,
) -> Result<Vec<usize>, CdrError> {
    if amount >= weights.len() {
        return Ok((0..weights.len()).collect());
    }

    let mut remaining: Vec<(usize, f64)> = weights.iter().copied().enumerate().collect();
    let mut chosen = Vec::with_capacity(amount);
    while chosen.len() < amount && !remaining.is_empty() {
        let current: Vec<f64> = remaining.iter().map(|(_, w)| *w).collect();
        // Once every remaining weight has underflowed the rest is drawn uniformly.
        let pick = if current.iter().any(|w| *w > 0.0) {
            draw_weighted(&current, rng)?
        } else {
            rng.random_range(0..current.len())
        };
        chosen.push(remaining.remove(pick).0);
    }
    Ok(chosen)
}
