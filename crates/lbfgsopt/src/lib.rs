//! lbfgsopt - limited-memory BFGS optimization in Rust.
//!
//! This crate bundles [`lbfgsopt_core`] (vector types, evaluator trait,
//! checkpoint store, progress callbacks, reference objectives) and
//! [`lbfgsopt_optim`] (correction history, two-loop recursion, line search and
//! the optimizer) behind a single dependency.
//!
//! # Quick start
//!
//! ```rust
//! use lbfgsopt::prelude::*;
//!
//! let mut optimizer = LBFGS::new(
//!     LBFGSParams::new()
//!         .with_max_iterations(200)
//!         .with_history_capacity(10),
//! );
//! let start = DVector::from_vec(vec![-1.2_f64, 1.0]);
//! let result = optimizer.optimize(&Rosenbrock::new(), &start).unwrap();
//!
//! assert!(result.converged);
//! assert!((result.point[0] - 1.0).abs() < 1e-3);
//! ```

pub use lbfgsopt_core;
pub use lbfgsopt_optim;
pub use nalgebra;

pub use lbfgsopt_core::{CheckpointError, OptimizerError, Result};
pub use lbfgsopt_optim::{LBFGSParams, OptimizationResult, Optimizer, TerminationReason, LBFGS};

/// Everything needed to set up and run an optimization.
pub mod prelude {
    pub use lbfgsopt_core::prelude::*;
    pub use lbfgsopt_optim::{
        BacktrackingLineSearch, CorrectionHistory, LBFGSParams, LineSearchParams,
        OptimizationResult, Optimizer, TerminationReason, LBFGS,
    };
}
