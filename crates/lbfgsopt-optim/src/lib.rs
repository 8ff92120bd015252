//! lbfgsopt Optimization - the limited-memory BFGS algorithm.
//!
//! This crate implements L-BFGS on top of the types and collaborators from
//! `lbfgsopt-core`.
//!
//! # Components
//!
//! - [`history`]: bounded, cyclic store of correction pairs `(s, y, ρ)`
//! - [`two_loop`]: two-loop recursion producing `H·g` from the history
//! - [`line_search`]: backtracking line search with the Armijo condition
//! - [`lbfgs`]: parameters and the optimization loop
//! - [`optimizer`]: the `Optimizer` trait and run results
//!
//! # Examples
//!
//! ```rust
//! use lbfgsopt_core::{problems::Quadratic, types::DVector};
//! use lbfgsopt_optim::{LBFGSParams, Optimizer, LBFGS};
//!
//! let target = DVector::from_vec(vec![1.0, 2.0, 3.0]);
//! let mut optimizer = LBFGS::new(
//!     LBFGSParams::new()
//!         .with_tolerance(1e-8)
//!         .with_history_capacity(5),
//! );
//!
//! let result = optimizer
//!     .optimize(&Quadratic::new(target.clone()), &DVector::zeros(3))
//!     .unwrap();
//! assert!(result.converged);
//! ```

pub mod history;
pub mod lbfgs;
pub mod line_search;
pub mod optimizer;
pub mod two_loop;

// Re-export main types for convenience
pub use history::{CorrectionHistory, CorrectionPair};
pub use lbfgs::{LBFGSParams, LBFGS};
pub use line_search::{BacktrackingLineSearch, LineSearchParams, LineSearchResult};
pub use optimizer::{OptimizationResult, Optimizer, TerminationReason};
pub use two_loop::{search_direction, two_loop_recursion};
