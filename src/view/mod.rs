//! A single affine indexing layer over a flat buffer.
//!
//! A [`View`] maps a logical multi-dimensional index to a linear buffer
//! offset via a shape, a per-dimension stride vector, and a scalar offset.
//! [`ZeroView`] is its counterpart for padding: it contributes no offset, only
//! a validity predicate.

mod zero;

pub use zero::{ZeroRange, ZeroView};

use crate::cache;
use crate::error;
use crate::expr::{self, Expr};
#[cfg(test)]
use crate::util::prod;

/// A frozen affine indexing layer: `shape`, `strides` (same rank; a zero
/// entry means broadcast, a negative one a reversed axis), and a scalar
/// `offset`. Dimensions of size 1 always carry stride 0 (enforced at
/// construction), and [`contiguous`](View::contiguous) is true iff `offset ==
/// 0` and `strides` is exactly the row-major stride vector for `shape`.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub shape: Vec<i64>,
    pub strides: Vec<i64>,
    pub offset: i64,
    pub contiguous: bool,
    /// Adjacent dims coalesced where `stride[i-1] == size[i]*stride[i]`,
    /// size-1 dims and stride-0 runs absorbed. Same dimension order as
    /// `shape` (slowest-varying first); [`expr_node`](View::expr_node) walks
    /// it in reverse.
    merged_dims: Vec<(i64, i64)>,
}

impl View {
    /// Builds a view, normalizing `strides[i]` to 0 wherever `shape[i] == 1`.
    pub fn new(shape: Vec<i64>, strides: Vec<i64>, offset: i64) -> View {
        error::ensure!(
            shape.len() == strides.len(),
            "View::new",
            "strides",
            "rank mismatch: shape has {} dims, strides has {}",
            shape.len(),
            strides.len()
        );
        for (i, &s) in shape.iter().enumerate() {
            error::ensure!(
                s >= 1,
                "View::new",
                "shape",
                "dimension {i} must be >= 1, got {s}"
            );
        }
        let strides: Vec<i64> = shape
            .iter()
            .zip(strides.iter())
            .map(|(&s, &st)| if s == 1 { 0 } else { st })
            .collect();
        let contiguous = offset == 0 && strides == &*cache::strides_for_shape(&shape);
        let merged_dims = cache::merged_dims(&shape, &strides).to_vec();
        View {
            shape,
            strides,
            offset,
            contiguous,
            merged_dims,
        }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Maps a single linear index (expected to range over `[0,
    /// prod(shape)-1]`) through this view to a buffer offset expression.
    pub fn expr_node(&self, idx: Expr) -> Expr {
        let mut terms = vec![expr::num(self.offset)];
        let mut acc: i64 = 1;
        for &(size, stride) in self.merged_dims.iter().rev() {
            if size != 1 && stride != 0 {
                let coord = expr::modulo(expr::div(idx.clone(), acc), size);
                terms.push(expr::mul(coord, stride));
            }
            acc *= size;
        }
        expr::sum(terms)
    }

    /// Maps one index expression per shape dimension through this view to a
    /// buffer offset expression.
    pub fn expr_idxs(&self, idxs: &[Expr], extra_offset: i64) -> Expr {
        error::ensure!(
            idxs.len() == self.shape.len(),
            "View::expr_idxs",
            "idxs",
            "expected {} indices, got {}",
            self.shape.len(),
            idxs.len()
        );
        let mut terms = vec![expr::num(self.offset + extra_offset)];
        for i in 0..self.shape.len() {
            if self.shape[i] != 1 && self.strides[i] != 0 {
                terms.push(expr::mul(idxs[i].clone(), self.strides[i]));
            }
        }
        expr::sum(terms)
    }
}
