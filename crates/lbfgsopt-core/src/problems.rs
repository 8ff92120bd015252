//! Reference objectives.
//!
//! These evaluators are used by the test suites, the benchmarks and the demo
//! binary. The pairwise Rosenbrock objective spreads its pairs across the
//! rayon pool for large dimensions; per-pair terms are collected in order and
//! summed sequentially so the value is bitwise reproducible.

use crate::{
    cost_function::CostFunction,
    error::{OptimizerError, Result},
    types::{DVector, Scalar},
};
use rayon::prelude::*;

/// Dimension from which evaluations are split across threads.
pub const PARALLEL_THRESHOLD: usize = 1024;

fn check_dimension(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(OptimizerError::dimension_mismatch(expected, actual));
    }
    Ok(())
}

fn ordered_sum<T: Scalar>(terms: &[T]) -> T {
    terms.iter().fold(T::zero(), |acc, &t| acc + t)
}

/// Isotropic quadratic `f(x) = 0.5·‖x − x*‖²` with gradient `x − x*`.
#[derive(Debug, Clone)]
pub struct Quadratic<T: Scalar> {
    target: DVector<T>,
}

impl<T: Scalar> Quadratic<T> {
    /// Creates a quadratic centred on `target`.
    pub fn new(target: DVector<T>) -> Self {
        Self { target }
    }

    /// The minimizer `x*`.
    pub fn target(&self) -> &DVector<T> {
        &self.target
    }
}

impl<T: Scalar> CostFunction<T> for Quadratic<T> {
    fn cost_and_gradient(&self, point: &DVector<T>) -> Result<(T, DVector<T>)> {
        check_dimension(self.target.len(), point.len())?;
        let gradient = point - &self.target;
        let value = gradient.dot(&gradient) * <T as Scalar>::from_f64(0.5);
        Ok((value, gradient))
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.target.len())
    }
}

/// Extended Rosenbrock function over consecutive coordinate pairs.
///
/// f(x) = Σᵢ 100·(x₂ᵢ₊₁ − x₂ᵢ²)² + (1 − x₂ᵢ)²
///
/// The minimizer is the all-ones vector with value 0. The dimension must be
/// even; an odd dimension is rejected as an evaluation failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rosenbrock;

impl Rosenbrock {
    /// Creates the objective.
    pub fn new() -> Self {
        Self
    }

    /// The classic starting point `(-1.2, 1.0, -1.2, 1.0, ...)`.
    pub fn standard_start<T: Scalar>(dimension: usize) -> DVector<T> {
        DVector::from_fn(dimension, |i, _| {
            if i % 2 == 0 {
                <T as Scalar>::from_f64(-1.2)
            } else {
                T::one()
            }
        })
    }

    fn pair<T: Scalar>(x: &[T], g: &mut [T]) -> T {
        let hundred = <T as Scalar>::from_f64(100.0);
        let two = <T as Scalar>::from_f64(2.0);
        let (x1, x2) = (x[0], x[1]);
        let r = x2 - x1 * x1;
        let t = T::one() - x1;
        g[0] = -(two + two) * hundred * x1 * r - two * t;
        g[1] = two * hundred * r;
        hundred * r * r + t * t
    }
}

impl<T: Scalar> CostFunction<T> for Rosenbrock {
    fn cost_and_gradient(&self, point: &DVector<T>) -> Result<(T, DVector<T>)> {
        let n = point.len();
        if n % 2 != 0 {
            return Err(OptimizerError::evaluation_failed(format!(
                "Rosenbrock requires an even dimension, got {n}"
            )));
        }

        let mut gradient = DVector::zeros(n);
        let x = point.as_slice();
        let g = gradient.as_mut_slice();

        let terms: Vec<T> = if cfg!(feature = "parallel") && n >= PARALLEL_THRESHOLD {
            x.par_chunks(2)
                .zip(g.par_chunks_mut(2))
                .map(|(xp, gp)| Self::pair(xp, gp))
                .collect()
        } else {
            x.chunks(2)
                .zip(g.chunks_mut(2))
                .map(|(xp, gp)| Self::pair(xp, gp))
                .collect()
        };

        Ok((ordered_sum(&terms), gradient))
    }
}

/// Set of coordinates that take part in a sparse objective.
///
/// The mask is plain configuration: it is built once and handed to the
/// evaluator that uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseMask {
    dimension: usize,
    active: Vec<bool>,
}

impl SparseMask {
    /// Activates the first `ceil(sparsity · dimension)` coordinates.
    ///
    /// `sparsity` is the active fraction and must lie in `[0, 1]`.
    pub fn new(dimension: usize, sparsity: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&sparsity) {
            return Err(OptimizerError::invalid_configuration(
                "sparsity must lie in [0, 1]",
                "sparsity",
                sparsity.to_string(),
            ));
        }
        let count = ((sparsity * dimension as f64).ceil() as usize).min(dimension);
        let active = (0..dimension).map(|i| i < count).collect();
        Ok(Self { dimension, active })
    }

    /// Activates exactly the listed coordinates.
    pub fn from_indices(dimension: usize, indices: &[usize]) -> Result<Self> {
        let mut active = vec![false; dimension];
        for &i in indices {
            if i >= dimension {
                return Err(OptimizerError::invalid_configuration(
                    format!("mask index out of range for dimension {dimension}"),
                    "indices",
                    i.to_string(),
                ));
            }
            active[i] = true;
        }
        Ok(Self { dimension, active })
    }

    /// Dimension of the points the mask applies to.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Whether coordinate `i` is active.
    pub fn is_active(&self, i: usize) -> bool {
        self.active.get(i).copied().unwrap_or(false)
    }

    /// Number of active coordinates.
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    /// Active coordinates in increasing order.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| a.then_some(i))
    }
}

/// Sparse quadratic `f(x) = 0.5·Σ_{i∈S} (xᵢ − 1)²`.
///
/// Coordinates outside the mask do not contribute and get a zero gradient.
#[derive(Debug, Clone)]
pub struct SparseQuadratic {
    mask: SparseMask,
}

impl SparseQuadratic {
    /// Creates the objective over the given mask.
    pub fn new(mask: SparseMask) -> Self {
        Self { mask }
    }

    /// The mask in use.
    pub fn mask(&self) -> &SparseMask {
        &self.mask
    }
}

impl<T: Scalar> CostFunction<T> for SparseQuadratic {
    fn cost_and_gradient(&self, point: &DVector<T>) -> Result<(T, DVector<T>)> {
        check_dimension(self.mask.dimension(), point.len())?;

        let mut gradient = DVector::zeros(point.len());
        let residual = |(i, (g, &x)): (usize, (&mut T, &T))| {
            if self.mask.is_active(i) {
                *g = x - T::one();
            }
        };
        if cfg!(feature = "parallel") && point.len() >= PARALLEL_THRESHOLD {
            gradient
                .as_mut_slice()
                .par_iter_mut()
                .zip(point.as_slice().par_iter())
                .enumerate()
                .for_each(residual);
        } else {
            gradient
                .as_mut_slice()
                .iter_mut()
                .zip(point.as_slice().iter())
                .enumerate()
                .for_each(residual);
        }

        let half = <T as Scalar>::from_f64(0.5);
        let value = half * gradient.dot(&gradient);
        Ok((value, gradient))
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.mask.dimension())
    }
}
