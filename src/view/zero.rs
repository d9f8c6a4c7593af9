//! The padding validity layer.
//!
//! Padding never moves data: it widens a dimension and marks the added
//! region invalid. [`ZeroView`] records, per dimension, the `[lo, hi)` window
//! of the *old* shape that is actually backed by data, and contributes a
//! conjunction of `(idx >= lo) & (idx < hi)`-style bounds checks to the
//! running validity predicate — never to the offset expression.

use crate::error;
use crate::expr::{self, Expr};

/// One dimension's valid window, as `[lo, hi)` against the *new* (padded)
/// coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroRange {
    pub lo: i64,
    pub hi: i64,
}

/// A padding layer: new shape plus a `[lo, hi)` valid window per dimension.
/// `new_shape[i] == old_shape[i] + added_before[i] + added_after[i]`, and
/// `ranges[i] == (added_before[i], added_before[i] + old_shape[i])`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroView {
    pub new_shape: Vec<i64>,
    pub ranges: Vec<ZeroRange>,
}

impl ZeroView {
    pub fn new(new_shape: Vec<i64>, ranges: Vec<ZeroRange>) -> ZeroView {
        error::ensure!(
            new_shape.len() == ranges.len(),
            "ZeroView::new",
            "ranges",
            "rank mismatch: shape has {} dims, ranges has {}",
            new_shape.len(),
            ranges.len()
        );
        for (i, (&size, r)) in new_shape.iter().zip(ranges.iter()).enumerate() {
            error::ensure!(
                r.lo <= r.hi && r.hi <= size,
                "ZeroView::new",
                "ranges",
                "dim {i}: window [{}, {}) out of bounds for size {size}",
                r.lo,
                r.hi
            );
        }
        ZeroView { new_shape, ranges }
    }

    /// True iff every dimension's window spans its whole size: this layer
    /// would add no constraint, so the pad/shrink that produced it can be
    /// dropped instead of pushed.
    pub fn is_noop(&self) -> bool {
        self.new_shape
            .iter()
            .zip(self.ranges.iter())
            .all(|(&size, r)| r.lo == 0 && r.hi == size)
        }

    /// Decodes a single linear index over `new_shape` into per-dimension
    /// coordinates and ANDs each dimension's `[lo, hi)` bound into
    /// `valid_in`, returning the strengthened predicate. Contributes nothing
    /// to the offset expression.
    pub fn expr_node(&self, idx: Expr, valid_in: Expr) -> Expr {
        let mut terms = vec![valid_in];
        let mut acc: i64 = 1;
        for i in (0..self.new_shape.len()).rev() {
            let size = self.new_shape[i];
            let range = &self.ranges[i];
            if range.lo != 0 || range.hi != size {
                let coord = expr::modulo(expr::div(idx.clone(), acc), size);
                if range.lo != 0 {
                    terms.push(expr::ge(coord.clone(), range.lo));
                }
                if range.hi != size {
                    terms.push(expr::lt(coord, range.hi));
                }
            }
            acc *= size;
        }
        expr::ands(terms)
    }
}
