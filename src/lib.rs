//! Symbolic, copy-free view tracking for a tensor compiler's movement
//! operations.
//!
//! A [`tracker::ShapeTracker`] records reshapes, permutes, expansions,
//! shrinks, pads, flips, and strides applied to a logical tensor shape
//! without ever copying the underlying buffer. At any point it can resolve a
//! logical index (or one index per dimension) to a `(buffer_offset,
//! validity)` pair of symbolic [`expr::Expr`] nodes, which a kernel code
//! generator lowers the rest of the way.
//!
//! ```
//! use shapetrack::{expr, tracker::ShapeTracker};
//!
//! let st = ShapeTracker::new(vec![2, 3]).permute(&[1, 0]);
//! let (offset, valid) = st.expr_idxs(&[expr::var("a", 0, 2), expr::var("b", 0, 1)]);
//! assert_eq!(offset.to_string(), "(a + (b*3))");
//! assert_eq!(valid.to_string(), "1");
//! ```

pub mod cache;
pub mod error;
pub mod expr;
pub mod tracker;
mod util;
pub mod view;

pub use expr::Expr;
pub use tracker::ShapeTracker;
pub use view::{View, ZeroView};
