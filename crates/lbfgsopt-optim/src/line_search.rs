//! Backtracking line search with the Armijo sufficient decrease condition.
//!
//! Starting from `α = initial_step`, trial points `x + α·d` are evaluated and
//! `α` is shrunk geometrically by `tau` until
//!
//! ```text
//! f(x + α d) ≤ f(x) + c₁ α ∇f(x)ᵀd
//! ```
//!
//! holds. When `α` drops below `min_step` first, the search gives up and
//! returns the last trial it evaluated, flagged as unsuccessful. A stall is not
//! an error: the caller adopts the trial and keeps iterating.

use lbfgsopt_core::{
    cost_function::{evaluate, CostFunction},
    error::{OptimizerError, Result},
    numerical::axpy,
    types::{DVector, Scalar},
};
use num_traits::Float;

/// Parameters for the backtracking line search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSearchParams<T: Scalar> {
    /// First trial step α₀
    pub initial_step: T,

    /// Armijo constant c₁ ∈ (0, 1)
    pub c1: T,

    /// Shrink factor τ ∈ (0, 1) applied after each rejected trial
    pub tau: T,

    /// Step length below which the search stalls
    pub min_step: T,
}

impl<T: Scalar> Default for LineSearchParams<T> {
    fn default() -> Self {
        Self {
            initial_step: T::one(),
            c1: <T as Scalar>::from_f64(1e-4),
            tau: <T as Scalar>::from_f64(0.5),
            min_step: T::MIN_STEP_SIZE,
        }
    }
}

impl<T: Scalar> LineSearchParams<T> {
    /// Checks that every parameter is in its admissible range.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::InvalidConfiguration` if:
    /// - `initial_step` or `min_step` is not strictly positive
    /// - `c1` or `tau` lies outside the open interval (0, 1)
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_step > T::zero()) || !<T as Float>::is_finite(self.initial_step) {
            return Err(OptimizerError::invalid_configuration(
                "Initial step must be positive and finite",
                "initial_step",
                self.initial_step.to_string(),
            ));
        }
        if !(self.c1 > T::zero() && self.c1 < T::one()) {
            return Err(OptimizerError::invalid_configuration(
                "Armijo constant must lie in (0, 1)",
                "c1",
                self.c1.to_string(),
            ));
        }
        if !(self.tau > T::zero() && self.tau < T::one()) {
            return Err(OptimizerError::invalid_configuration(
                "Backtracking factor must lie in (0, 1)",
                "tau",
                self.tau.to_string(),
            ));
        }
        if !(self.min_step > T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "Minimum step must be positive",
                "min_step",
                self.min_step.to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of one line search.
#[derive(Debug, Clone)]
pub struct LineSearchResult<T: Scalar> {
    /// Step length of the returned trial
    pub step_size: T,

    /// Trial point `x + step_size·d`
    pub new_point: DVector<T>,

    /// Objective value at `new_point`
    pub new_value: T,

    /// Gradient at `new_point`
    pub new_gradient: DVector<T>,

    /// Number of objective evaluations performed
    pub function_evals: usize,

    /// True if the Armijo condition held; false for a stalled search
    pub success: bool,
}

/// Geometric backtracking line search.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingLineSearch;

impl BacktrackingLineSearch {
    /// Creates a new backtracking line search.
    pub fn new() -> Self {
        Self
    }

    /// Searches along `direction` from `point`.
    ///
    /// `value` and `directional_derivative` are `f(x)` and `∇f(x)ᵀd`. The
    /// caller is responsible for passing a descent direction; with a
    /// non-negative derivative only the stall exit can end the search.
    ///
    /// # Errors
    ///
    /// Propagates evaluator failures. A stall is reported through
    /// [`LineSearchResult::success`], not as an error.
    pub fn search<T, C>(
        &self,
        cost_fn: &C,
        point: &DVector<T>,
        value: T,
        direction: &DVector<T>,
        directional_derivative: T,
        params: &LineSearchParams<T>,
    ) -> Result<LineSearchResult<T>>
    where
        T: Scalar,
        C: CostFunction<T> + ?Sized,
    {
        let mut step = params.initial_step;
        let mut function_evals = 0;

        loop {
            let trial = axpy(point, step, direction);
            let (trial_value, trial_gradient) = evaluate(cost_fn, &trial)?;
            function_evals += 1;

            let bound = value + params.c1 * step * directional_derivative;
            let result = LineSearchResult {
                step_size: step,
                new_point: trial,
                new_value: trial_value,
                new_gradient: trial_gradient,
                function_evals,
                success: true,
            };
            if trial_value <= bound {
                return Ok(result);
            }

            step = step * params.tau;
            if step < params.min_step {
                tracing::warn!(
                    last_step = %result.step_size,
                    trials = function_evals,
                    value = %result.new_value,
                    "line search stalled below minimum step, adopting last trial"
                );
                return Ok(LineSearchResult {
                    success: false,
                    ..result
                });
            }
        }
    }
}
