//! Progress reporting for optimization algorithms.
//!
//! After every iteration the optimizer hands an [`IterationInfo`] to an
//! [`OptimizationCallback`]. Reporting is a side effect only: callbacks cannot
//! stop the run and their output is not part of the optimization result.

use crate::types::Scalar;

/// Snapshot of one completed iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationInfo<T: Scalar> {
    /// Iteration counter after the step (0 before the first step)
    pub iteration: usize,

    /// Objective value at the new point
    pub value: T,

    /// Objective value at the point the step started from
    pub previous_value: T,

    /// Gradient norm at the new point
    pub gradient_norm: T,

    /// Step length chosen by the line search
    pub step_size: T,

    /// Directional derivative `gᵀd` at the start of the step
    pub directional_derivative: T,

    /// Whether the line search met the sufficient decrease condition
    pub accepted: bool,
}

impl<T: Scalar> IterationInfo<T> {
    /// Info describing the starting point, before any step is taken.
    pub fn initial(value: T, gradient_norm: T) -> Self {
        Self {
            iteration: 0,
            value,
            previous_value: value,
            gradient_norm,
            step_size: T::zero(),
            directional_derivative: T::zero(),
            accepted: true,
        }
    }
}

/// Trait for optimization progress sinks.
pub trait OptimizationCallback<T: Scalar>: Send {
    /// Called once with the state at the starting point.
    fn on_optimization_start(&mut self, info: &IterationInfo<T>) {
        let _ = info; // Unused by default
    }

    /// Called at the end of each iteration.
    fn on_iteration_end(&mut self, info: &IterationInfo<T>);

    /// Called once when the run terminates.
    fn on_optimization_end(&mut self, info: &IterationInfo<T>) {
        let _ = info; // Unused by default
    }
}

/// A no-op callback that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl<T: Scalar> OptimizationCallback<T> for NoOpCallback {
    fn on_iteration_end(&mut self, _info: &IterationInfo<T>) {}
}

/// A callback that emits progress as `tracing` events.
///
/// Every `report_every`-th iteration is logged at INFO level with the
/// iteration number, objective value, gradient norm and step length. The
/// end-of-run summary is left to the optimizer.
#[derive(Debug, Clone)]
pub struct TracingCallback {
    report_every: usize,
}

impl TracingCallback {
    /// Create a callback that logs every `report_every` iterations.
    pub fn new(report_every: usize) -> Self {
        Self {
            report_every: report_every.max(1),
        }
    }
}

impl Default for TracingCallback {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<T: Scalar> OptimizationCallback<T> for TracingCallback {
    fn on_optimization_start(&mut self, info: &IterationInfo<T>) {
        tracing::debug!(
            value = %info.value,
            gradient_norm = %info.gradient_norm,
            "starting optimization"
        );
    }

    fn on_iteration_end(&mut self, info: &IterationInfo<T>) {
        if info.iteration % self.report_every == 0 {
            tracing::info!(
                iteration = info.iteration,
                value = %info.value,
                gradient_norm = %info.gradient_norm,
                step_size = %info.step_size,
                "iteration complete"
            );
        }
    }
}

/// A callback that keeps every iteration it sees.
#[derive(Debug, Clone, Default)]
pub struct RecordingCallback<T: Scalar> {
    /// Recorded iterations, in order
    pub iterations: Vec<IterationInfo<T>>,
    /// State at the starting point, once the run has begun
    pub start: Option<IterationInfo<T>>,
    /// State at termination, once the run has ended
    pub end: Option<IterationInfo<T>>,
}

impl<T: Scalar> RecordingCallback<T> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            iterations: Vec::new(),
            start: None,
            end: None,
        }
    }
}

impl<T: Scalar> OptimizationCallback<T> for RecordingCallback<T> {
    fn on_optimization_start(&mut self, info: &IterationInfo<T>) {
        self.start = Some(info.clone());
    }

    fn on_iteration_end(&mut self, info: &IterationInfo<T>) {
        self.iterations.push(info.clone());
    }

    fn on_optimization_end(&mut self, info: &IterationInfo<T>) {
        self.end = Some(info.clone());
    }
}
