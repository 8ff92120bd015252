//! Vector algebra on fixed-length buffers.
//!
//! These are the only vector primitives the optimizer needs. All of them
//! require operands of equal length; a mismatch is a programming error and
//! panics instead of returning a recoverable error.

use crate::types::{DVector, Scalar};
use num_traits::Float;

#[inline]
#[track_caller]
fn assert_same_len<T: Scalar>(a: &DVector<T>, b: &DVector<T>, op: &str) {
    assert_eq!(
        a.len(),
        b.len(),
        "{op}: vector length mismatch ({} vs {})",
        a.len(),
        b.len()
    );
}

/// Inner product `aᵀb`.
#[track_caller]
pub fn dot<T: Scalar>(a: &DVector<T>, b: &DVector<T>) -> T {
    assert_same_len(a, b, "dot");
    a.dot(b)
}

/// Euclidean norm `sqrt(aᵀa)`.
pub fn norm<T: Scalar>(a: &DVector<T>) -> T {
    <T as Float>::sqrt(a.dot(a))
}

/// Returns an owned copy of `src`.
pub fn copy<T: Scalar>(src: &DVector<T>) -> DVector<T> {
    src.clone()
}

/// Returns `x + alpha·d`.
#[track_caller]
pub fn axpy<T: Scalar>(x: &DVector<T>, alpha: T, d: &DVector<T>) -> DVector<T> {
    assert_same_len(x, d, "axpy");
    let mut out = x.clone();
    out.axpy(alpha, d, T::one());
    out
}

/// Writes `x + alpha·d` into `out`, reusing its storage.
#[track_caller]
pub fn axpy_into<T: Scalar>(out: &mut DVector<T>, x: &DVector<T>, alpha: T, d: &DVector<T>) {
    assert_same_len(x, d, "axpy_into");
    assert_same_len(out, x, "axpy_into");
    out.copy_from(x);
    out.axpy(alpha, d, T::one());
}

/// Returns `a - b`.
#[track_caller]
pub fn difference<T: Scalar>(a: &DVector<T>, b: &DVector<T>) -> DVector<T> {
    assert_same_len(a, b, "difference");
    a - b
}

/// True when every component is finite.
pub fn all_finite<T: Scalar>(a: &DVector<T>) -> bool {
    a.iter().all(|v| <T as Float>::is_finite(*v))
}
