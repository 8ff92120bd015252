//! L-BFGS optimizer.
//!
//! L-BFGS (Limited-memory Broyden-Fletcher-Goldfarb-Shanno) is a quasi-Newton
//! method that approximates the inverse Hessian from the `m` most recent
//! step/gradient-change pairs instead of storing a dense `n × n` matrix.
//!
//! # Algorithm Overview
//!
//! Each iteration:
//! 1. Computes `d = -H·g` with the two-loop recursion over the history
//! 2. Falls back to `d = -g` (and clears the history) if `d` is not a descent direction
//! 3. Runs a backtracking Armijo line search along `d`
//! 4. Appends `s = x_new - x`, `y = g_new - g` to the history
//! 5. Reports progress and writes a checkpoint every `checkpoint_interval` iterations
//!
//! The run stops when `‖g‖ ≤ tolerance` or after `max_iterations` iterations.
//! A stalled line search is logged and its last trial adopted; it does not stop
//! the run.
//!
//! # References
//!
//! - Nocedal & Wright, "Numerical Optimization" (2006), Algorithm 7.4
//! - Liu & Nocedal, "On the limited memory BFGS method for large scale optimization" (1989)

use crate::{
    history::CorrectionHistory,
    line_search::{BacktrackingLineSearch, LineSearchParams},
    optimizer::{OptimizationResult, Optimizer, TerminationReason},
    two_loop::search_direction,
};
use lbfgsopt_core::{
    callback::{IterationInfo, OptimizationCallback, TracingCallback},
    checkpoint::CheckpointStore,
    cost_function::{evaluate, CostFunction},
    error::{OptimizerError, Result},
    numerical::{difference, dot, norm},
    types::{DVector, Scalar},
};
use num_traits::Float;
use std::time::Instant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the L-BFGS optimizer.
///
/// Parameters are fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LBFGSParams<T: Scalar> {
    /// Iteration budget
    pub max_iterations: usize,
    /// Gradient norm at or below which the run has converged
    pub tolerance: T,
    /// Number of correction pairs kept (m); 0 gives steepest descent
    pub history_capacity: usize,
    /// First trial step of every line search
    pub initial_step: T,
    /// Armijo constant c₁
    pub c1: T,
    /// Backtracking shrink factor τ
    pub tau: T,
    /// Step length below which a line search stalls
    pub min_step: T,
    /// Write a checkpoint every this many iterations, if a store is attached
    pub checkpoint_interval: Option<usize>,
    /// Load the attached checkpoint store before the first iteration
    pub resume_from_checkpoint: bool,
}

impl<T: Scalar> Default for LBFGSParams<T> {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: <T as Scalar>::from_f64(1e-6),
            history_capacity: 10,
            initial_step: T::one(),
            c1: <T as Scalar>::from_f64(1e-4),
            tau: <T as Scalar>::from_f64(0.5),
            min_step: <T as Scalar>::from_f64(1e-10),
            checkpoint_interval: None,
            resume_from_checkpoint: false,
        }
    }
}

impl<T: Scalar> LBFGSParams<T> {
    /// Creates a configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the gradient norm tolerance.
    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the number of correction pairs kept.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Sets the first trial step of the line search.
    pub fn with_initial_step(mut self, step: T) -> Self {
        self.initial_step = step;
        self
    }

    /// Sets the Armijo constant.
    pub fn with_c1(mut self, c1: T) -> Self {
        self.c1 = c1;
        self
    }

    /// Sets the backtracking shrink factor.
    pub fn with_tau(mut self, tau: T) -> Self {
        self.tau = tau;
        self
    }

    /// Sets the line search stall threshold.
    pub fn with_min_step(mut self, min_step: T) -> Self {
        self.min_step = min_step;
        self
    }

    /// Checkpoints every `interval` iterations.
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = Some(interval);
        self
    }

    /// Enables or disables resuming from the attached checkpoint store.
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume_from_checkpoint = resume;
        self
    }

    /// Line search parameters derived from this configuration.
    pub fn line_search_params(&self) -> LineSearchParams<T> {
        LineSearchParams {
            initial_step: self.initial_step,
            c1: self.c1,
            tau: self.tau,
            min_step: self.min_step,
        }
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::InvalidConfiguration` for a negative or NaN
    /// tolerance, a zero checkpoint interval, or invalid line search parameters.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance >= T::zero()) {
            return Err(OptimizerError::invalid_configuration(
                "Tolerance must be non-negative",
                "tolerance",
                self.tolerance.to_string(),
            ));
        }
        if self.checkpoint_interval == Some(0) {
            return Err(OptimizerError::invalid_configuration(
                "Checkpoint interval must be at least 1",
                "checkpoint_interval",
                "0",
            ));
        }
        self.line_search_params().validate()
    }
}

/// Limited-memory BFGS optimizer.
///
/// # Examples
///
/// ```rust
/// use lbfgsopt_core::{problems::Rosenbrock, types::DVector};
/// use lbfgsopt_optim::{LBFGSParams, Optimizer, LBFGS};
///
/// let mut lbfgs = LBFGS::new(
///     LBFGSParams::new()
///         .with_max_iterations(200)
///         .with_history_capacity(10),
/// );
/// let start = DVector::from_vec(vec![-1.2, 1.0]);
/// let result = lbfgs.optimize(&Rosenbrock::new(), &start).unwrap();
/// assert!(result.converged);
/// ```
#[derive(Debug)]
pub struct LBFGS<T: Scalar> {
    params: LBFGSParams<T>,
    line_search: BacktrackingLineSearch,
    checkpoint: Option<Box<dyn CheckpointStore<T>>>,
}

impl<T: Scalar> LBFGS<T> {
    /// Creates an optimizer without a checkpoint store.
    pub fn new(params: LBFGSParams<T>) -> Self {
        Self {
            params,
            line_search: BacktrackingLineSearch::new(),
            checkpoint: None,
        }
    }

    /// Attaches a checkpoint store used for periodic saves and resume.
    pub fn with_checkpoint_store<S>(mut self, store: S) -> Self
    where
        S: CheckpointStore<T> + 'static,
    {
        self.checkpoint = Some(Box::new(store));
        self
    }

    /// Returns the configuration.
    pub fn params(&self) -> &LBFGSParams<T> {
        &self.params
    }

    /// Runs the optimizer, reporting every iteration to `callback`.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if the parameters do not validate
    /// - `NumericalError` if the objective or gradient is not finite at the start point
    /// - Any evaluator error, including `DimensionMismatch`
    ///
    /// Checkpoint failures are logged and never returned.
    pub fn optimize_with_callback<C, CB>(
        &mut self,
        cost_fn: &C,
        initial_point: &DVector<T>,
        callback: &mut CB,
    ) -> Result<OptimizationResult<T>>
    where
        C: CostFunction<T> + ?Sized,
        CB: OptimizationCallback<T> + ?Sized,
    {
        let start_time = Instant::now();
        self.params.validate()?;
        let line_search_params = self.params.line_search_params();

        let mut x = self.resume_point(initial_point);
        let (mut value, mut gradient) = evaluate(cost_fn, &x)?;
        let mut gradient_norm = norm(&gradient);
        if !is_finite(value) || !is_finite(gradient_norm) {
            return Err(OptimizerError::numerical_error(format!(
                "objective is not finite at the start point \
                 (value {value}, gradient norm {gradient_norm})"
            )));
        }

        tracing::debug!(
            dimension = x.len(),
            history_capacity = self.params.history_capacity,
            max_iterations = self.params.max_iterations,
            "starting L-BFGS"
        );

        let mut history = CorrectionHistory::new(self.params.history_capacity);
        let mut iteration = 0;
        let mut function_evaluations = 1;
        let mut line_search_stalls = 0;
        let mut non_descent_restarts = 0;

        let mut info = IterationInfo::initial(value, gradient_norm);
        callback.on_optimization_start(&info);

        let reason = loop {
            if gradient_norm <= self.params.tolerance {
                break TerminationReason::Converged;
            }
            if iteration >= self.params.max_iterations {
                break TerminationReason::MaxIterations;
            }

            let mut direction = search_direction(&gradient, &history);
            let mut directional_derivative = dot(&gradient, &direction);
            if !(directional_derivative < T::zero()) {
                tracing::warn!(
                    iteration,
                    directional_derivative = %directional_derivative,
                    "non-descent direction, clearing history and using steepest descent"
                );
                history.clear();
                non_descent_restarts += 1;
                direction = -&gradient;
                directional_derivative = dot(&gradient, &direction);
            }

            let step = self.line_search.search(
                cost_fn,
                &x,
                value,
                &direction,
                directional_derivative,
                &line_search_params,
            )?;
            function_evaluations += step.function_evals;
            if !step.success {
                line_search_stalls += 1;
            }

            history.append(
                difference(&step.new_point, &x),
                difference(&step.new_gradient, &gradient),
            );

            let previous_value = value;
            x = step.new_point;
            value = step.new_value;
            gradient = step.new_gradient;
            gradient_norm = norm(&gradient);
            iteration += 1;

            info = IterationInfo {
                iteration,
                value,
                previous_value,
                gradient_norm,
                step_size: step.step_size,
                directional_derivative,
                accepted: step.success,
            };
            callback.on_iteration_end(&info);

            if !is_finite(value) || !is_finite(gradient_norm) {
                tracing::warn!(
                    iteration,
                    value = %value,
                    gradient_norm = %gradient_norm,
                    "objective became non-finite"
                );
                break TerminationReason::NumericalError;
            }

            self.save_checkpoint(&x, iteration);
        };

        callback.on_optimization_end(&info);
        tracing::info!(
            reason = %reason,
            iterations = iteration,
            value = %value,
            gradient_norm = %gradient_norm,
            function_evaluations,
            "L-BFGS finished"
        );

        Ok(OptimizationResult::new(
            x,
            value,
            gradient_norm,
            iteration,
            start_time.elapsed(),
            reason,
        )
        .with_function_evaluations(function_evaluations)
        .with_line_search_stalls(line_search_stalls)
        .with_non_descent_restarts(non_descent_restarts))
    }

    /// Start point for a run: the checkpointed point when resuming, else `initial_point`.
    fn resume_point(&mut self, initial_point: &DVector<T>) -> DVector<T> {
        if !self.params.resume_from_checkpoint {
            return initial_point.clone();
        }
        let store = match self.checkpoint.as_mut() {
            Some(store) => store,
            None => return initial_point.clone(),
        };

        match store.load() {
            Ok(Some(checkpoint)) if checkpoint.point.len() == initial_point.len() => {
                tracing::debug!(
                    iteration = checkpoint.iteration,
                    "resuming from checkpoint"
                );
                checkpoint.point
            }
            Ok(Some(checkpoint)) => {
                tracing::warn!(
                    expected = initial_point.len(),
                    found = checkpoint.point.len(),
                    "ignoring checkpoint of wrong dimension"
                );
                initial_point.clone()
            }
            Ok(None) => initial_point.clone(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load checkpoint, starting fresh");
                initial_point.clone()
            }
        }
    }

    fn save_checkpoint(&mut self, point: &DVector<T>, iteration: usize) {
        let interval = match self.params.checkpoint_interval {
            Some(interval) => interval,
            None => return,
        };
        if iteration % interval != 0 {
            return;
        }
        if let Some(store) = self.checkpoint.as_mut() {
            match store.save(point, iteration) {
                Ok(()) => tracing::debug!(iteration, "checkpoint saved"),
                Err(err) => tracing::warn!(iteration, error = %err, "checkpoint save failed"),
            }
        }
    }
}

impl<T: Scalar> Default for LBFGS<T> {
    fn default() -> Self {
        Self::new(LBFGSParams::default())
    }
}

impl<T: Scalar> Optimizer<T> for LBFGS<T> {
    fn name(&self) -> &str {
        "L-BFGS"
    }

    fn optimize<C>(
        &mut self,
        cost_fn: &C,
        initial_point: &DVector<T>,
    ) -> Result<OptimizationResult<T>>
    where
        C: CostFunction<T> + ?Sized,
    {
        self.optimize_with_callback(cost_fn, initial_point, &mut TracingCallback::default())
    }
}

fn is_finite<T: Scalar>(v: T) -> bool {
    <T as Float>::is_finite(v)
}
