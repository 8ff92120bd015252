//! Core traits and types for limited-memory quasi-Newton optimization.
//!
//! This crate provides everything the L-BFGS optimizer in `lbfgsopt-optim`
//! builds on, without any of the algorithm itself: the scalar and vector
//! types, the vector algebra, the objective evaluator interface and the
//! collaborators the optimization loop reports to.
//!
//! # Modules
//!
//! - [`cost_function`]: Objective evaluator interface
//! - [`error`]: Error types for optimization runs and checkpoint I/O
//! - [`types`]: Scalar trait, vector alias and numerical constants
//! - [`numerical`]: Vector algebra and stability guards
//! - [`optimization`]: Progress callbacks and checkpoint stores
//! - [`problems`]: Reference objectives (quadratic, Rosenbrock, sparse quadratic)

pub mod core;
pub mod numerical;
pub mod optimization;
pub mod problems;

pub use crate::core::{cost_function, error, types};
pub use crate::optimization::{callback, checkpoint};

// Re-export commonly used items at the crate root
pub use error::{CheckpointError, OptimizerError, Result};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use lbfgsopt_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callback::{
        IterationInfo, NoOpCallback, OptimizationCallback, RecordingCallback, TracingCallback,
    };
    pub use crate::checkpoint::{Checkpoint, CheckpointStore, FileCheckpoint};
    pub use crate::cost_function::{evaluate, CostFunction, CountingCostFunction};
    pub use crate::error::{CheckpointError, OptimizerError, Result};
    pub use crate::numerical::vector_ops::{axpy, copy, dot, norm};
    pub use crate::problems::{Quadratic, Rosenbrock, SparseMask, SparseQuadratic};
    pub use crate::types::{constants, DVector, Scalar};
}
