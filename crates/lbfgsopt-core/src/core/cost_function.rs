//! Cost function interface for optimization algorithms.
//!
//! The optimizer treats the objective as an opaque evaluator: given a point it
//! returns the objective value and the gradient, computed together at that
//! point. Everything the evaluator needs (targets, masks, dimensions) is
//! configured on the evaluator value itself at construction time.
//!
//! # Design Philosophy
//!
//! - A single capability, `cost_and_gradient`, so value and gradient always
//!   describe the same point
//! - Evaluators are `Sync` so that per-coordinate work inside one evaluation
//!   can be spread across threads
//! - Contract checks on the returned gradient live in [`evaluate`], not in
//!   every implementation

use crate::{
    error::{OptimizerError, Result},
    types::{DVector, Scalar},
};
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Trait for objective functions minimized by the optimizer.
///
/// Implementations must be deterministic for a fixed point within one run.
pub trait CostFunction<T>: Debug + Sync
where
    T: Scalar,
{
    /// Evaluates the objective value and its gradient at a point.
    ///
    /// # Arguments
    ///
    /// * `point` - The point to evaluate at
    ///
    /// # Returns
    ///
    /// A tuple of (value, gradient) where the gradient has the same length
    /// as `point`.
    fn cost_and_gradient(&self, point: &DVector<T>) -> Result<(T, DVector<T>)>;

    /// Evaluates only the objective value.
    ///
    /// # Default Implementation
    ///
    /// Calls `cost_and_gradient` and discards the gradient.
    fn cost(&self, point: &DVector<T>) -> Result<T> {
        self.cost_and_gradient(point).map(|(value, _)| value)
    }

    /// Dimension the evaluator expects, if it is fixed.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

impl<T, F> CostFunction<T> for &F
where
    T: Scalar,
    F: CostFunction<T> + ?Sized,
{
    fn cost_and_gradient(&self, point: &DVector<T>) -> Result<(T, DVector<T>)> {
        (**self).cost_and_gradient(point)
    }

    fn cost(&self, point: &DVector<T>) -> Result<T> {
        (**self).cost(point)
    }

    fn dimension(&self) -> Option<usize> {
        (**self).dimension()
    }
}

/// Evaluates `cost_fn` at `point` and checks the gradient length.
///
/// A gradient whose length differs from the point is reported as
/// [`OptimizerError::DimensionMismatch`], which terminates the run.
pub fn evaluate<T, C>(cost_fn: &C, point: &DVector<T>) -> Result<(T, DVector<T>)>
where
    T: Scalar,
    C: CostFunction<T> + ?Sized,
{
    if let Some(expected) = cost_fn.dimension() {
        if expected != point.len() {
            return Err(OptimizerError::dimension_mismatch(expected, point.len()));
        }
    }

    let (value, gradient) = cost_fn.cost_and_gradient(point)?;
    if gradient.len() != point.len() {
        return Err(OptimizerError::dimension_mismatch(
            point.len(),
            gradient.len(),
        ));
    }
    Ok((value, gradient))
}

/// Counts evaluations made through an underlying cost function.
///
/// Counters are atomic so the wrapper stays `Sync` like the evaluator it wraps.
#[derive(Debug)]
pub struct CountingCostFunction<F> {
    /// The underlying cost function
    pub inner: F,
    cost_count: AtomicUsize,
    gradient_count: AtomicUsize,
}

impl<F> CountingCostFunction<F> {
    /// Creates a new counting wrapper around a cost function.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            cost_count: AtomicUsize::new(0),
            gradient_count: AtomicUsize::new(0),
        }
    }

    /// Resets all counters to zero.
    pub fn reset_counts(&self) {
        self.cost_count.store(0, Ordering::Relaxed);
        self.gradient_count.store(0, Ordering::Relaxed);
    }

    /// Returns the current (value, gradient) evaluation counts.
    pub fn counts(&self) -> (usize, usize) {
        (
            self.cost_count.load(Ordering::Relaxed),
            self.gradient_count.load(Ordering::Relaxed),
        )
    }
}

impl<T, F> CostFunction<T> for CountingCostFunction<F>
where
    T: Scalar,
    F: CostFunction<T>,
{
    fn cost_and_gradient(&self, point: &DVector<T>) -> Result<(T, DVector<T>)> {
        self.cost_count.fetch_add(1, Ordering::Relaxed);
        self.gradient_count.fetch_add(1, Ordering::Relaxed);
        self.inner.cost_and_gradient(point)
    }

    fn cost(&self, point: &DVector<T>) -> Result<T> {
        self.cost_count.fetch_add(1, Ordering::Relaxed);
        self.inner.cost(point)
    }

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }
}
