//! Type definitions and aliases for quasi-Newton optimization.
//!
//! This module provides the scalar trait shared by every component, the
//! vector alias used for points and gradients, and the numerical constants
//! that guard the optimizer against degenerate inputs.

use nalgebra::{Dyn, OVector, RealField, Scalar as NalgebraScalar};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in optimization (f32 or f64).
///
/// This trait combines all the necessary numeric traits required
/// by the vector algebra, the correction history and the line search.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default tolerance for gradient norm convergence.
    const DEFAULT_GRADIENT_TOLERANCE: Self;

    /// Absolute floor below which a curvature product `yᵀs` is clamped.
    const CURVATURE_FLOOR: Self;

    /// Step length below which backtracking gives up.
    const MIN_STEP_SIZE: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_f64` for a non-panicking version.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Try to convert from f64.
    ///
    /// Returns None if the conversion fails.
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Convert to f64 (for logging/display).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_to_f64` for a non-panicking version.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }

    /// Try to convert to f64.
    ///
    /// Returns None if the conversion fails.
    fn try_to_f64(self) -> Option<f64> {
        num_traits::cast(self)
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-4;
    const CURVATURE_FLOOR: Self = 1e-18;
    const MIN_STEP_SIZE: Self = 1e-7;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_GRADIENT_TOLERANCE: Self = 1e-6;
    const CURVATURE_FLOOR: Self = 1e-30;
    const MIN_STEP_SIZE: Self = 1e-10;
}

/// Type alias for a dynamically-sized vector.
///
/// Points, gradients, search directions and correction vectors all use this
/// representation; their length is fixed for the lifetime of one run.
pub type DVector<T> = OVector<T, Dyn>;

/// Numerical constants for different precision levels.
pub mod constants {
    use super::Scalar;
    use num_traits::Float;

    /// Get machine epsilon for the given scalar type.
    pub fn epsilon<T: Scalar>() -> T {
        T::EPSILON
    }

    /// Square root of machine epsilon, the usual relative noise level.
    pub fn sqrt_epsilon<T: Scalar>() -> T {
        <T as Float>::sqrt(T::EPSILON)
    }

    /// Get default gradient convergence tolerance.
    pub fn gradient_tolerance<T: Scalar>() -> T {
        T::DEFAULT_GRADIENT_TOLERANCE
    }

    /// Get the absolute curvature floor.
    pub fn curvature_floor<T: Scalar>() -> T {
        T::CURVATURE_FLOOR
    }

    /// Get minimum step size for line search.
    pub fn min_step_size<T: Scalar>() -> T {
        T::MIN_STEP_SIZE
    }
}
