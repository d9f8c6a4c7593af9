//! Canonical textual rendering of [`super::Expr`] for the codegen boundary.
//!
//! Grammar: `expr := num | var | (expr op num) | (expr + expr + …) |
//! (expr < num) | (expr >= num) | (expr ∧ expr ∧ …)`.

use super::{Expr, ExprKind};
use std::fmt;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Num(c) => write!(f, "{c}"),
            ExprKind::Var(v) => write!(f, "{}", v.name),
            ExprKind::Mul(e, k) => write!(f, "({e}*{k})"),
            ExprKind::Div(e, k) => write!(f, "({e}/{k})"),
            ExprKind::Mod(e, k) => write!(f, "({e}%{k})"),
            ExprKind::Lt(e, k) => write!(f, "({e} < {k})"),
            ExprKind::Ge(e, k) => write!(f, "({e} >= {k})"),
            ExprKind::Sum(children) => {
                write!(f, "(")?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            ExprKind::And(children) => {
                write!(f, "(")?;
                for (i, c) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " \u{2227} ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
        }
    }
}
