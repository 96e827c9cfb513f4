// src/executor/mod.rs

//! The evaluation oracle consumed by the MCMC generator.
//!
//! An [`Executor`] turns circuits into scalar expectation values. The crate
//! ships a noiseless state-vector executor ([`crate::Simulator`]); anything
//! else (hardware, noisy simulators, mocks) plugs in through this trait.

use crate::circuits::Circuit;
use crate::core::CdrError;
use crate::observable::Observable;

/// Evaluates circuits and returns one expectation value per circuit, in input order.
///
/// `&mut self` lets implementations keep bookkeeping such as call counts.
pub trait Executor {
    /// Evaluates `circuits` against `observable`. With no observable the
    /// executor returns expectation values directly.
    fn evaluate(
        &mut self,
        circuits: &[Circuit],
        observable: Option<&Observable>,
    ) -> Result<Vec<f64>, CdrError>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn evaluate(
        &mut self,
        circuits: &[Circuit],
        observable: Option<&Observable>,
    ) -> Result<Vec<f64>, CdrError> {
        (**self).evaluate(circuits, observable)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn evaluate(
        &mut self,
        circuits: &[Circuit],
        observable: Option<&Observable>,
    ) -> Result<Vec<f64>, CdrError> {
        (**self).evaluate(circuits, observable)
    }
}

/// Adapts a closure that maps one circuit to its expectation value.
/// The observable argument is ignored.
pub struct FnExecutor<F> {
    func: F,
}

impl<F> FnExecutor<F>
where
    F: FnMut(&Circuit) -> Result<f64, CdrError>,
{
    /// Wraps `func`.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Executor for FnExecutor<F>
where
    F: FnMut(&Circuit) -> Result<f64, CdrError>,
{
    fn evaluate(
        &mut self,
        circuits: &[Circuit],
        _observable: Option<&Observable>,
    ) -> Result<Vec<f64>, CdrError> {
        circuits.iter().map(|c| (self.func)(c)).collect()
    }
}

/// Wraps an executor and records every call and every returned value.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor<E> {
    inner: E,
    calls: usize,
    history: Vec<f64>,
}

impl<E: Executor> RecordingExecutor<E> {
    /// Wraps `inner` with empty history.
    pub fn new(inner: E) -> Self {
        Self { inner, calls: 0, history: Vec::new() }
    }

    /// Number of `evaluate` calls made so far, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Every value returned so far, in order.
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Returns the wrapped executor.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Executor> Executor for RecordingExecutor<E> {
    fn evaluate(
        &mut self,
        circuits: &[Circuit],
        observable: Option<&Observable>,
    ) -> Result<Vec<f64>, CdrError> {
        self.calls += 1;
        let values = self.inner.evaluate(circuits, observable)?;
        self.history.extend_from_slice(&values);
        Ok(values)
    }
}
