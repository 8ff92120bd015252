//! Bounded correction history for L-BFGS.
//!
//! The history keeps at most `m` correction pairs `(s, y, ρ)` in an arena of
//! `m` slots. Slots are filled in order until the arena is full; after that
//! each append overwrites the slot holding the logically oldest pair. Callers
//! only see pairs in chronological order through [`CorrectionHistory::iter`]
//! and never deal with slot indices.

use lbfgsopt_core::{
    numerical::{clamp_curvature, curvature_floor, dot, norm},
    types::{DVector, Scalar},
};
use std::iter::FusedIterator;

/// One curvature update: step `s`, gradient change `y` and `ρ = 1/(yᵀs)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionPair<T: Scalar> {
    /// Step difference `x_{k+1} − x_k`
    pub s: DVector<T>,
    /// Gradient difference `g_{k+1} − g_k`
    pub y: DVector<T>,
    /// Inverse curvature `1 / (yᵀs)`, computed from a clamped denominator
    pub rho: T,
}

impl<T: Scalar> CorrectionPair<T> {
    /// Builds a pair, clamping `yᵀs` away from zero before inverting it.
    ///
    /// # Panics
    ///
    /// Panics if `s` and `y` have different lengths.
    pub fn new(s: DVector<T>, y: DVector<T>) -> Self {
        let sy = dot(&s, &y);
        let floor = curvature_floor(norm(&s), norm(&y));
        let rho = T::one() / clamp_curvature(sy, floor);
        Self { s, y, rho }
    }
}

/// Fixed-capacity, cyclic store of correction pairs.
#[derive(Debug, Clone)]
pub struct CorrectionHistory<T: Scalar> {
    slots: Vec<CorrectionPair<T>>,
    capacity: usize,
    /// Slot the next append writes to once the arena is full
    next: usize,
    appended: usize,
}

impl<T: Scalar> CorrectionHistory<T> {
    /// Creates an empty history holding at most `capacity` pairs.
    ///
    /// A capacity of zero disables the history: appends are discarded and the
    /// two-loop recursion degenerates to steepest descent.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            next: 0,
            appended: 0,
        }
    }

    /// Maximum number of pairs retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of pairs currently retained, `min(appended, capacity)`.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no pair is retained.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total number of appends since creation or the last [`clear`](Self::clear).
    pub fn total_appended(&self) -> usize {
        self.appended
    }

    /// Appends the pair built from `s` and `y`, evicting the oldest pair if full.
    ///
    /// Degenerate pairs (`yᵀs ≈ 0`) are stored with a clamped `ρ`, never dropped.
    pub fn append(&mut self, s: DVector<T>, y: DVector<T>) {
        self.push(CorrectionPair::new(s, y));
    }

    /// Appends an already built pair.
    pub fn push(&mut self, pair: CorrectionPair<T>) {
        self.appended += 1;
        if self.capacity == 0 {
            return;
        }
        if self.slots.len() < self.capacity {
            self.slots.push(pair);
        } else {
            self.slots[self.next] = pair;
            self.next = (self.next + 1) % self.capacity;
        }
    }

    /// The most recently appended pair still retained.
    pub fn latest(&self) -> Option<&CorrectionPair<T>> {
        self.iter().next_back()
    }

    /// The oldest pair still retained.
    pub fn oldest(&self) -> Option<&CorrectionPair<T>> {
        self.iter().next()
    }

    /// Pairs from oldest to newest. Use `.rev()` for newest to oldest.
    ///
    /// The iterator borrows the history, so it can be requested again at any
    /// time to restart the traversal.
    pub fn iter(&self) -> Pairs<'_, T> {
        Pairs {
            history: self,
            front: 0,
            back: self.slots.len(),
        }
    }

    /// Drops every pair, keeping the capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.next = 0;
        self.appended = 0;
    }

    /// Slot holding the pair at chronological position `i` (0 = oldest).
    fn slot(&self, i: usize) -> usize {
        if self.slots.len() < self.capacity {
            i
        } else {
            (self.next + i) % self.capacity
        }
    }
}

impl<'a, T: Scalar> IntoIterator for &'a CorrectionHistory<T> {
    type Item = &'a CorrectionPair<T>;
    type IntoIter = Pairs<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Chronological iterator over a [`CorrectionHistory`].
#[derive(Debug, Clone)]
pub struct Pairs<'a, T: Scalar> {
    history: &'a CorrectionHistory<T>,
    front: usize,
    back: usize,
}

impl<'a, T: Scalar> Iterator for Pairs<'a, T> {
    type Item = &'a CorrectionPair<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let pair = &self.history.slots[self.history.slot(self.front)];
        self.front += 1;
        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T: Scalar> DoubleEndedIterator for Pairs<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(&self.history.slots[self.history.slot(self.back)])
    }
}

impl<T: Scalar> ExactSizeIterator for Pairs<'_, T> {}

impl<T: Scalar> FusedIterator for Pairs<'_, T> {}
