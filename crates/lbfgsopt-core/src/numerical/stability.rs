//! Numerical stability guards for quasi-Newton updates.
//!
//! The correction history divides by the curvature product `yᵀs`, and the
//! two-loop recursion divides by `yᵀy`. Both can vanish on flat regions or
//! when a line search stalls; the helpers here keep those divisions finite.

use crate::types::{constants, Scalar};
use num_traits::Float;

/// Smallest magnitude accepted for a curvature product `yᵀs`.
///
/// The floor is relative to `‖s‖·‖y‖` so well-scaled pairs near convergence
/// are left alone, with [`Scalar::CURVATURE_FLOOR`] as the absolute minimum.
pub fn curvature_floor<T: Scalar>(s_norm: T, y_norm: T) -> T {
    let relative = constants::sqrt_epsilon::<T>() * s_norm * y_norm;
    if relative > T::CURVATURE_FLOOR {
        relative
    } else {
        T::CURVATURE_FLOOR
    }
}

/// Clamps a curvature product away from zero, keeping its sign.
///
/// Returns `sy` unchanged when `|sy| >= floor`. Smaller values, and NaN,
/// are replaced by `±floor` (positive for zero and NaN).
pub fn clamp_curvature<T: Scalar>(sy: T, floor: T) -> T {
    if <T as Float>::abs(sy) >= floor {
        sy
    } else if sy < T::zero() {
        -floor
    } else {
        floor
    }
}

/// Division that falls back to `fallback` when the denominator is not
/// strictly positive or the quotient is not finite.
pub fn positive_ratio_or<T: Scalar>(numerator: T, denominator: T, fallback: T) -> T {
    if denominator > T::zero() {
        let ratio = numerator / denominator;
        if <T as Float>::is_finite(ratio) {
            return ratio;
        }
    }
    fallback
}
