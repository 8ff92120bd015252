//! Optimizer interface and run results.

use lbfgsopt_core::{
    cost_function::CostFunction,
    error::Result,
    types::{DVector, Scalar},
};
use std::fmt::{self, Debug};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why an optimization run stopped.
///
/// A line search stall is not a termination reason: the optimizer logs it,
/// adopts the last trial and keeps iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TerminationReason {
    /// Gradient norm reached the tolerance: ‖∇f(x)‖ ≤ ε
    Converged,
    /// Iteration budget exhausted without convergence
    MaxIterations,
    /// The objective or its gradient became NaN or infinite
    NumericalError,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Converged => "converged",
            Self::MaxIterations => "maximum iterations reached",
            Self::NumericalError => "numerical error",
        };
        f.write_str(text)
    }
}

/// Result of an optimization run.
///
/// `point`, `value` and `gradient_norm` always describe the same point.
#[derive(Debug, Clone)]
pub struct OptimizationResult<T: Scalar> {
    /// The final point
    pub point: DVector<T>,

    /// Objective value at `point`
    pub value: T,

    /// Gradient norm at `point`
    pub gradient_norm: T,

    /// Number of completed iterations
    pub iterations: usize,

    /// Number of objective evaluations, including the start point
    pub function_evaluations: usize,

    /// Iterations whose line search stalled
    pub line_search_stalls: usize,

    /// Iterations that discarded the history after a non-descent direction
    pub non_descent_restarts: usize,

    /// Wall-clock time of the run
    pub duration: Duration,

    /// Why the run stopped
    pub termination_reason: TerminationReason,

    /// True if the gradient tolerance was met
    pub converged: bool,
}

impl<T: Scalar> OptimizationResult<T> {
    /// Creates a result; `converged` is derived from the termination reason.
    pub fn new(
        point: DVector<T>,
        value: T,
        gradient_norm: T,
        iterations: usize,
        duration: Duration,
        termination_reason: TerminationReason,
    ) -> Self {
        Self {
            point,
            value,
            gradient_norm,
            iterations,
            function_evaluations: 0,
            line_search_stalls: 0,
            non_descent_restarts: 0,
            duration,
            termination_reason,
            converged: termination_reason == TerminationReason::Converged,
        }
    }

    /// Sets the function evaluation count.
    pub fn with_function_evaluations(mut self, count: usize) -> Self {
        self.function_evaluations = count;
        self
    }

    /// Sets the line search stall count.
    pub fn with_line_search_stalls(mut self, count: usize) -> Self {
        self.line_search_stalls = count;
        self
    }

    /// Sets the non-descent restart count.
    pub fn with_non_descent_restarts(mut self, count: usize) -> Self {
        self.non_descent_restarts = count;
        self
    }
}

/// Trait for unconstrained minimizers.
pub trait Optimizer<T: Scalar>: Debug {
    /// Human-readable algorithm name, used in logs.
    fn name(&self) -> &str;

    /// Minimizes `cost_fn` starting from `initial_point`.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters, evaluator failures or a
    /// non-finite objective at the start point.
    fn optimize<C>(
        &mut self,
        cost_fn: &C,
        initial_point: &DVector<T>,
    ) -> Result<OptimizationResult<T>>
    where
        C: CostFunction<T> + ?Sized;
}
