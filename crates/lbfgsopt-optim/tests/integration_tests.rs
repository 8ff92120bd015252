//! Integration tests for lbfgsopt-optim
//!
//! These tests run the full optimizer against the reference objectives and
//! check convergence, the Armijo property of accepted steps, checkpointing and
//! error reporting.

use approx::assert_relative_eq;
use lbfgsopt_core::{
    callback::{NoOpCallback, RecordingCallback},
    checkpoint::{Checkpoint, CheckpointStore, FileCheckpoint},
    cost_function::{CostFunction, CountingCostFunction},
    error::{CheckpointError, OptimizerError, Result},
    problems::{Quadratic, Rosenbrock, SparseMask, SparseQuadratic},
    types::DVector,
};
use lbfgsopt_optim::{LBFGSParams, Optimizer, TerminationReason, LBFGS};
use pretty_assertions::assert_eq;

/// Diagonal quadratic 0.5 Σ aᵢ (xᵢ − 1)² with aᵢ = i + 1.
#[derive(Debug)]
struct ScaledQuadratic {
    n: usize,
}

impl CostFunction<f64> for ScaledQuadratic {
    fn cost_and_gradient(&self, x: &DVector<f64>) -> Result<(f64, DVector<f64>)> {
        let gradient = DVector::from_fn(self.n, |i, _| (i + 1) as f64 * (x[i] - 1.0));
        let value = (0..self.n)
            .map(|i| 0.5 * (i + 1) as f64 * (x[i] - 1.0).powi(2))
            .sum();
        Ok((value, gradient))
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.n)
    }
}

/// Store whose every operation fails.
#[derive(Debug)]
struct BrokenStore;

impl CheckpointStore<f64> for BrokenStore {
    fn save(
        &mut self,
        _point: &DVector<f64>,
        _iteration: usize,
    ) -> std::result::Result<(), CheckpointError> {
        Err(CheckpointError::io(
            "/dev/full/checkpoint.txt",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        ))
    }

    fn load(&mut self) -> std::result::Result<Option<Checkpoint<f64>>, CheckpointError> {
        Err(CheckpointError::parse(1, "corrupted"))
    }
}

fn rosenbrock_params() -> LBFGSParams<f64> {
    LBFGSParams::new()
        .with_tolerance(1e-6)
        .with_history_capacity(10)
        .with_max_iterations(200)
}

#[test]
fn test_quadratic_converges() {
    let target = DVector::from_fn(10, |i, _| i as f64 * 0.5 - 2.0);
    let cost_fn = Quadratic::new(target.clone());
    let mut lbfgs = LBFGS::new(
        LBFGSParams::new()
            .with_tolerance(1e-6)
            .with_history_capacity(5)
            .with_max_iterations(100),
    );

    let result = lbfgs.optimize(&cost_fn, &DVector::zeros(10)).unwrap();

    assert!(result.converged);
    assert!(result.iterations < 20);
    assert!(result.gradient_norm <= 1e-6);
    for i in 0..10 {
        assert!((result.point[i] - target[i]).abs() < 1e-4);
    }
}

#[test]
fn test_ill_conditioned_quadratic_converges() {
    let cost_fn = ScaledQuadratic { n: 10 };
    let mut lbfgs = LBFGS::new(
        LBFGSParams::new()
            .with_history_capacity(5)
            .with_max_iterations(100),
    );

    let result = lbfgs.optimize(&cost_fn, &DVector::zeros(10)).unwrap();

    assert!(result.converged);
    assert!(result.iterations < 100);
    assert_relative_eq!(result.point, DVector::from_element(10, 1.0), epsilon = 1e-4);
}

#[test]
fn test_rosenbrock_2d_converges() {
    let mut lbfgs = LBFGS::new(rosenbrock_params());
    let start = DVector::from_vec(vec![-1.2, 1.0]);

    let result = lbfgs.optimize(&Rosenbrock::new(), &start).unwrap();

    assert_eq!(result.termination_reason, TerminationReason::Converged);
    assert!((result.point[0] - 1.0).abs() < 1e-3);
    assert!((result.point[1] - 1.0).abs() < 1e-3);
    assert!(result.value < 1e-6);
}

#[test]
fn test_extended_rosenbrock_converges() {
    let mut lbfgs = LBFGS::new(rosenbrock_params().with_max_iterations(500));
    let start = Rosenbrock::standard_start::<f64>(6);

    let result = lbfgs.optimize(&Rosenbrock::new(), &start).unwrap();

    assert!(result.converged);
    assert!(result.value < 1e-6);
    assert_relative_eq!(result.point, DVector::from_element(6, 1.0), epsilon = 1e-3);
}

#[test]
fn test_accepted_steps_satisfy_armijo() {
    let params = rosenbrock_params();
    let mut lbfgs = LBFGS::new(params.clone());
    let mut recorder = RecordingCallback::new();

    lbfgs
        .optimize_with_callback(
            &Rosenbrock::new(),
            &DVector::from_vec(vec![-1.2, 1.0]),
            &mut recorder,
        )
        .unwrap();

    assert!(!recorder.iterations.is_empty());
    for info in recorder.iterations.iter().filter(|info| info.accepted) {
        assert!(info.directional_derivative < 0.0);
        assert!(
            info.value
                <= info.previous_value
                    + params.c1 * info.step_size * info.directional_derivative,
            "iteration {} violates the Armijo condition",
            info.iteration
        );
    }
}

#[test]
fn test_progress_is_reported_every_iteration() {
    let mut lbfgs = LBFGS::new(rosenbrock_params());
    let mut recorder = RecordingCallback::new();

    let result = lbfgs
        .optimize_with_callback(
            &Rosenbrock::new(),
            &DVector::from_vec(vec![-1.2, 1.0]),
            &mut recorder,
        )
        .unwrap();

    assert_eq!(recorder.iterations.len(), result.iterations);
    let numbers: Vec<usize> = recorder.iterations.iter().map(|i| i.iteration).collect();
    assert_eq!(numbers, (1..=result.iterations).collect::<Vec<_>>());

    let start = recorder.start.expect("start reported");
    assert_relative_eq!(start.value, 24.2, epsilon = 1e-12);

    let end = recorder.end.expect("end reported");
    assert_eq!(end.iteration, result.iterations);
    assert_eq!(end.value, result.value);
    assert_eq!(end.gradient_norm, result.gradient_norm);
}

#[test]
fn test_zero_history_is_steepest_descent() {
    let cost_fn = ScaledQuadratic { n: 4 };
    let mut lbfgs = LBFGS::new(
        LBFGSParams::new()
            .with_history_capacity(0)
            .with_max_iterations(20),
    );
    let mut recorder = RecordingCallback::new();

    let result = lbfgs
        .optimize_with_callback(&cost_fn, &DVector::zeros(4), &mut recorder)
        .unwrap();

    // d = -g gives gᵀd = -‖g‖² at every step
    let mut previous_norm = recorder.start.as_ref().unwrap().gradient_norm;
    for info in &recorder.iterations {
        assert_relative_eq!(
            info.directional_derivative,
            -previous_norm * previous_norm,
            max_relative = 1e-12
        );
        previous_norm = info.gradient_norm;
    }
    assert_eq!(result.non_descent_restarts, 0);
}

#[test]
fn test_negative_curvature_restarts_from_steepest_descent() {
    /// cos(x) + 0.05 x², concave around the origin.
    #[derive(Debug)]
    struct Wavy;

    impl CostFunction<f64> for Wavy {
        fn cost_and_gradient(&self, x: &DVector<f64>) -> Result<(f64, DVector<f64>)> {
            let t = x[0];
            Ok((
                t.cos() + 0.05 * t * t,
                DVector::from_vec(vec![-t.sin() + 0.1 * t]),
            ))
        }
    }

    let mut recorder = RecordingCallback::new();
    let result = LBFGS::new(rosenbrock_params())
        .optimize_with_callback(&Wavy, &DVector::from_vec(vec![0.3]), &mut recorder)
        .unwrap();

    // The first pair has yᵀs < 0, so the quasi-Newton direction at iteration 2
    // points uphill and is replaced by -g.
    assert!(result.non_descent_restarts > 0);
    let first = &recorder.iterations[0];
    let restarted = &recorder.iterations[1];
    assert_relative_eq!(
        restarted.directional_derivative,
        -first.gradient_norm * first.gradient_norm,
        max_relative = 1e-12
    );
    assert!(restarted.directional_derivative < 0.0);

    assert_eq!(result.termination_reason, TerminationReason::Converged);
    let x = result.point[0];
    assert!((-x.sin() + 0.1 * x).abs() <= 1e-6);
    assert!(-x.cos() + 0.1 > 0.0, "converged to a maximum at {x}");
}

#[test]
fn test_stalled_line_search_adopts_trial_and_continues() {
    /// 1.5 x²: the unit steepest-descent step from x = 1 overshoots to x = -2.
    #[derive(Debug)]
    struct Steep;

    impl CostFunction<f64> for Steep {
        fn cost_and_gradient(&self, x: &DVector<f64>) -> Result<(f64, DVector<f64>)> {
            Ok((1.5 * x[0] * x[0], DVector::from_vec(vec![3.0 * x[0]])))
        }
    }

    // Halving the unit step gives 0.5 < min_step, so the first search stalls.
    let mut recorder = RecordingCallback::new();
    let result = LBFGS::new(LBFGSParams::new().with_min_step(0.75))
        .optimize_with_callback(&Steep, &DVector::from_vec(vec![1.0]), &mut recorder)
        .unwrap();

    assert_eq!(result.line_search_stalls, 1);
    let stalled = &recorder.iterations[0];
    assert!(!stalled.accepted);
    assert_eq!(stalled.step_size, 1.0);
    assert_relative_eq!(stalled.value, 6.0);

    assert!(result.iterations > 1);
    assert!(recorder.iterations[1..].iter().all(|info| info.accepted));
    assert_eq!(result.termination_reason, TerminationReason::Converged);
    assert!(result.point[0].abs() < 1e-6);
}

#[test]
fn test_function_evaluations_are_counted() {
    let cost_fn = CountingCostFunction::new(Rosenbrock::new());
    let mut lbfgs = LBFGS::new(rosenbrock_params());

    let result = lbfgs
        .optimize_with_callback(&cost_fn, &DVector::from_vec(vec![-1.2, 1.0]), &mut NoOpCallback)
        .unwrap();

    let (values, gradients) = cost_fn.counts();
    assert_eq!(result.function_evaluations, values);
    assert_eq!(values, gradients);
    assert!(result.function_evaluations > result.iterations);
}

#[test]
fn test_runs_are_deterministic() {
    let start = Rosenbrock::standard_start::<f64>(4);
    let first = LBFGS::new(rosenbrock_params())
        .optimize(&Rosenbrock::new(), &start)
        .unwrap();
    let second = LBFGS::new(rosenbrock_params())
        .optimize(&Rosenbrock::new(), &start)
        .unwrap();

    assert_eq!(first.iterations, second.iterations);
    assert_eq!(first.point, second.point);
    assert_eq!(first.value, second.value);
}

#[test]
fn test_sparse_quadratic_leaves_inactive_coordinates() {
    let mask = SparseMask::new(8, 0.5).unwrap();
    let cost_fn = SparseQuadratic::new(mask);
    let start = DVector::from_element(8, -3.0);

    let result = LBFGS::new(LBFGSParams::new())
        .optimize(&cost_fn, &start)
        .unwrap();

    assert!(result.converged);
    for i in 0..4 {
        assert_relative_eq!(result.point[i], 1.0, epsilon = 1e-6);
    }
    for i in 4..8 {
        assert_eq!(result.point[i], -3.0);
    }
}

#[test]
fn test_max_iterations_reached() {
    let mut lbfgs = LBFGS::new(rosenbrock_params().with_max_iterations(3));

    let result = lbfgs
        .optimize(&Rosenbrock::new(), &DVector::from_vec(vec![-1.2, 1.0]))
        .unwrap();

    assert_eq!(result.iterations, 3);
    assert_eq!(result.termination_reason, TerminationReason::MaxIterations);
    assert!(!result.converged);
}

#[test]
fn test_checkpoint_written_and_resumed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoint.txt");

    let first = LBFGS::new(
        rosenbrock_params()
            .with_max_iterations(12)
            .with_checkpoint_interval(5),
    )
    .with_checkpoint_store(FileCheckpoint::new(&path))
    .optimize(&Rosenbrock::new(), &DVector::from_vec(vec![-1.2, 1.0]))
    .unwrap();
    assert_eq!(first.iterations, 12);

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some("# Iteration 10"));

    let saved: Checkpoint<f64> = FileCheckpoint::new(&path).load().unwrap().unwrap();
    let (saved_value, _) = Rosenbrock::new().cost_and_gradient(&saved.point).unwrap();

    let mut recorder = RecordingCallback::new();
    let resumed = LBFGS::new(rosenbrock_params().with_resume(true))
        .with_checkpoint_store(FileCheckpoint::new(&path))
        .optimize_with_callback(
            &Rosenbrock::new(),
            &DVector::from_vec(vec![-1.2, 1.0]),
            &mut recorder,
        )
        .unwrap();

    assert_eq!(recorder.start.unwrap().value, saved_value);
    assert!(resumed.converged);
}

#[test]
fn test_resume_without_checkpoint_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let mut recorder = RecordingCallback::new();

    LBFGS::new(rosenbrock_params().with_resume(true))
        .with_checkpoint_store(FileCheckpoint::new(dir.path().join("none.txt")))
        .optimize_with_callback(
            &Rosenbrock::new(),
            &DVector::from_vec(vec![-1.2, 1.0]),
            &mut recorder,
        )
        .unwrap();

    assert_relative_eq!(recorder.start.unwrap().value, 24.2, epsilon = 1e-12);
}

#[test]
fn test_checkpoint_of_wrong_dimension_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoint.txt");
    FileCheckpoint::new(&path)
        .save(&DVector::from_vec(vec![1.0_f64, 1.0, 1.0, 1.0]), 30)
        .unwrap();

    let mut recorder = RecordingCallback::new();
    LBFGS::new(rosenbrock_params().with_resume(true))
        .with_checkpoint_store(FileCheckpoint::new(&path))
        .optimize_with_callback(
            &Rosenbrock::new(),
            &DVector::from_vec(vec![-1.2, 1.0]),
            &mut recorder,
        )
        .unwrap();

    assert_relative_eq!(recorder.start.unwrap().value, 24.2, epsilon = 1e-12);
}

#[test]
fn test_checkpoint_with_non_finite_values_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoint.txt");
    std::fs::write(&path, "# Iteration 30\nNaN 1.0\n").unwrap();

    let mut recorder = RecordingCallback::new();
    let result = LBFGS::new(rosenbrock_params().with_resume(true))
        .with_checkpoint_store(FileCheckpoint::new(&path))
        .optimize_with_callback(
            &Rosenbrock::new(),
            &DVector::from_vec(vec![-1.2, 1.0]),
            &mut recorder,
        )
        .unwrap();

    assert_relative_eq!(recorder.start.unwrap().value, 24.2, epsilon = 1e-12);
    assert!(result.converged);
}

#[test]
fn test_checkpoint_failures_do_not_stop_the_run() {
    let start = DVector::from_vec(vec![-1.2, 1.0]);
    let reference = LBFGS::new(rosenbrock_params())
        .optimize(&Rosenbrock::new(), &start)
        .unwrap();

    let result = LBFGS::new(
        rosenbrock_params()
            .with_checkpoint_interval(1)
            .with_resume(true),
    )
    .with_checkpoint_store(BrokenStore)
    .optimize(&Rosenbrock::new(), &start)
    .unwrap();

    assert!(result.converged);
    assert_eq!(result.iterations, reference.iterations);
    assert_eq!(result.point, reference.point);
}

#[test]
fn test_odd_dimension_rosenbrock_fails() {
    let err = LBFGS::new(LBFGSParams::new())
        .optimize(&Rosenbrock::new(), &DVector::from_vec(vec![0.0, 0.0, 0.0]))
        .unwrap_err();
    assert!(matches!(err, OptimizerError::EvaluationFailed { .. }));
}

#[test]
fn test_start_point_dimension_mismatch() {
    let cost_fn = Quadratic::new(DVector::from_vec(vec![1.0, 2.0, 3.0]));
    let err = LBFGS::new(LBFGSParams::new())
        .optimize(&cost_fn, &DVector::zeros(2))
        .unwrap_err();
    assert!(matches!(
        err,
        OptimizerError::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn test_non_finite_start_is_numerical_error() {
    #[derive(Debug)]
    struct Singular;

    impl CostFunction<f64> for Singular {
        fn cost_and_gradient(&self, x: &DVector<f64>) -> Result<(f64, DVector<f64>)> {
            Ok((1.0 / x[0], DVector::from_element(x.len(), f64::NAN)))
        }
    }

    let err = LBFGS::new(LBFGSParams::new())
        .optimize(&Singular, &DVector::zeros(1))
        .unwrap_err();
    assert!(matches!(err, OptimizerError::NumericalError { .. }));
}

#[test]
fn test_objective_turning_non_finite_stops_the_run() {
    /// Quadratic bowl that reports NaN once the point leaves [-10, 10].
    #[derive(Debug)]
    struct Bounded;

    impl CostFunction<f64> for Bounded {
        fn cost_and_gradient(&self, x: &DVector<f64>) -> Result<(f64, DVector<f64>)> {
            if x.iter().any(|v| v.abs() > 10.0) {
                return Ok((f64::NAN, DVector::from_element(x.len(), f64::NAN)));
            }
            Ok((0.5 * x.dot(x), x.clone()))
        }
    }

    // Every trial past the bound is rejected (NaN ≤ bound is false); the
    // stalled search then hands back a NaN point.
    let result = LBFGS::new(LBFGSParams::new().with_initial_step(1e12).with_min_step(1e6))
        .optimize(&Bounded, &DVector::from_vec(vec![1.0]))
        .unwrap();

    assert_eq!(result.termination_reason, TerminationReason::NumericalError);
    assert_eq!(result.line_search_stalls, 1);
    assert_eq!(result.iterations, 1);
}

#[cfg(feature = "serde")]
#[test]
fn test_params_and_reason_serde_roundtrip() {
    let params = LBFGSParams::<f64>::new()
        .with_history_capacity(7)
        .with_checkpoint_interval(25);
    let json = serde_json::to_string(&params).unwrap();
    let back: LBFGSParams<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, params);

    let reason = TerminationReason::MaxIterations;
    let json = serde_json::to_string(&reason).unwrap();
    assert_eq!(serde_json::from_str::<TerminationReason>(&json).unwrap(), reason);
}
