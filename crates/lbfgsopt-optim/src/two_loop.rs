//! Two-loop recursion.
//!
//! Computes `z ≈ H·g` from the correction history without forming the
//! inverse Hessian approximation `H`:
//!
//! ```text
//! q = g
//! for i = newest..oldest:
//!     α_i = ρ_i <s_i, q>
//!     q   = q - α_i y_i
//!
//! z = γ q,   γ = <s_last, y_last> / <y_last, y_last>
//!
//! for i = oldest..newest:
//!     β_i = ρ_i <y_i, z>
//!     z   = z + (α_i - β_i) s_i
//! ```
//!
//! The search direction is `-z`.

use crate::history::CorrectionHistory;
use lbfgsopt_core::{
    numerical::{dot, positive_ratio_or},
    types::{DVector, Scalar},
};

/// Returns `z ≈ H·g` for the curvature stored in `history`.
///
/// An empty history yields exactly `g`.
///
/// # Panics
///
/// Panics if a stored pair has a different length than `g`.
pub fn two_loop_recursion<T: Scalar>(
    gradient: &DVector<T>,
    history: &CorrectionHistory<T>,
) -> DVector<T> {
    let latest = match history.latest() {
        Some(pair) => pair,
        None => return gradient.clone(),
    };

    let mut q = gradient.clone();
    let mut alphas = Vec::with_capacity(history.len());
    for pair in history.iter().rev() {
        let alpha = pair.rho * dot(&pair.s, &q);
        q.axpy(-alpha, &pair.y, T::one());
        alphas.push(alpha);
    }

    // Initial scaling H₀ = γI; the raw yᵀs is used so a clamped ρ does not leak in
    let gamma = positive_ratio_or(
        dot(&latest.s, &latest.y),
        dot(&latest.y, &latest.y),
        T::one(),
    );
    let mut z = q * gamma;

    // alphas were pushed newest first
    for (pair, alpha) in history.iter().zip(alphas.into_iter().rev()) {
        let beta = pair.rho * dot(&pair.y, &z);
        z.axpy(alpha - beta, &pair.s, T::one());
    }
    z
}

/// L-BFGS search direction `d = -H·g`.
pub fn search_direction<T: Scalar>(
    gradient: &DVector<T>,
    history: &CorrectionHistory<T>,
) -> DVector<T> {
    -two_loop_recursion(gradient, history)
}
