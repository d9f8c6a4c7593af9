//! Symbolic index expression algebra.
//!
//! An [`Expr`] is an immutable, reference-counted node in a small DAG over
//! non-negative integer index variables: addition, constant-multiplication,
//! integer division, modulo, and conjunction of 0/1-valued predicates. Every
//! node caches an `[min, max]` bound, computed once at construction, and
//! every public constructor in this module is a *simplifying* constructor —
//! it eagerly folds constants, drops no-ops, and factors out common terms
//! whenever it can prove the simplification correct from bounds alone. When
//! it can't prove it, it returns a correct but unsimplified node; losing a
//! simplification is a performance concern here, never a correctness one.
//!
//! Division and modulo follow Euclidean semantics (`div_euclid`/
//! `rem_euclid`): the divisor must be positive, and the remainder is always
//! in `[0, k)` regardless of the sign of the dividend.

mod render;

use crate::error;
use std::rc::Rc;

/// A node's proven value range: every concrete evaluation of the node (on
/// any assignment of its free variables within their declared bounds) falls
/// in `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
}

impl Bounds {
    fn exact(v: i64) -> Self {
        Bounds { min: v, max: v }
    }
}

/// A free index variable and its declared inclusive bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarInfo {
    pub name: Rc<str>,
    pub min: i64,
    pub max: i64,
}

/// The variant tag of an [`Expr`], part of the codegen protocol surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprTag {
    Num,
    Var,
    Mul,
    Div,
    Mod,
    Sum,
    And,
    Lt,
    Ge,
}

#[derive(Debug, Clone)]
pub(crate) enum ExprKind {
    Num(i64),
    Var(VarInfo),
    Mul(Expr, i64),
    Div(Expr, i64),
    Mod(Expr, i64),
    Sum(Vec<Expr>),
    And(Vec<Expr>),
    Lt(Expr, i64),
    Ge(Expr, i64),
}

impl PartialEq for ExprKind {
    fn eq(&self, other: &Self) -> bool {
        use ExprKind::*;
        match (self, other) {
            (Num(a), Num(b)) => a == b,
            (Var(a), Var(b)) => a == b,
            (Mul(a, k1), Mul(b, k2)) => k1 == k2 && a == b,
            (Div(a, k1), Div(b, k2)) => k1 == k2 && a == b,
            (Mod(a, k1), Mod(b, k2)) => k1 == k2 && a == b,
            (Sum(a), Sum(b)) => a == b,
            (And(a), And(b)) => a == b,
            (Lt(a, k1), Lt(b, k2)) => k1 == k2 && a == b,
            (Ge(a, k1), Ge(b, k2)) => k1 == k2 && a == b,
            _ => false,
        }
    }
}

#[derive(Debug)]
struct ExprNode {
    kind: ExprKind,
    bounds: Bounds,
}

/// A symbolic index expression node. Cheap to clone (it's a reference-counted
/// pointer into an immutable DAG); equality compares structure, not identity.
#[derive(Debug, Clone)]
pub struct Expr(Rc<ExprNode>);

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind == other.0.kind
    }
}
impl Eq for Expr {}

impl Expr {
    fn leaf(kind: ExprKind, bounds: Bounds) -> Expr {
        Expr(Rc::new(ExprNode { kind, bounds }))
    }

    pub(crate) fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    pub fn min(&self) -> i64 {
        self.0.bounds.min
    }

    pub fn max(&self) -> i64 {
        self.0.bounds.max
    }

    pub fn bounds(&self) -> Bounds {
        self.0.bounds
    }

    pub fn tag(&self) -> ExprTag {
        match &self.0.kind {
            ExprKind::Num(_) => ExprTag::Num,
            ExprKind::Var(_) => ExprTag::Var,
            ExprKind::Mul(..) => ExprTag::Mul,
            ExprKind::Div(..) => ExprTag::Div,
            ExprKind::Mod(..) => ExprTag::Mod,
            ExprKind::Sum(_) => ExprTag::Sum,
            ExprKind::And(_) => ExprTag::And,
            ExprKind::Lt(..) => ExprTag::Lt,
            ExprKind::Ge(..) => ExprTag::Ge,
        }
    }

    /// Direct children, part of the codegen protocol surface.
    pub fn children(&self) -> Vec<Expr> {
        match &self.0.kind {
            ExprKind::Num(_) | ExprKind::Var(_) => Vec::new(),
            ExprKind::Mul(e, _)
            | ExprKind::Div(e, _)
            | ExprKind::Mod(e, _)
            | ExprKind::Lt(e, _)
            | ExprKind::Ge(e, _) => vec![e.clone()],
            ExprKind::Sum(cs) | ExprKind::And(cs) => cs.clone(),
        }
    }

    /// The constant operand of `Num`/`Mul`/`Div`/`Mod`/`Lt`/`Ge`, if any.
    pub fn const_operand(&self) -> Option<i64> {
        match &self.0.kind {
            ExprKind::Num(c) => Some(*c),
            ExprKind::Mul(_, k)
            | ExprKind::Div(_, k)
            | ExprKind::Mod(_, k)
            | ExprKind::Lt(_, k)
            | ExprKind::Ge(_, k) => Some(*k),
            _ => None,
        }
    }

    /// The variable's name, if this node is a `Var`.
    pub fn var_name(&self) -> Option<&str> {
        match &self.0.kind {
            ExprKind::Var(v) => Some(v.name.as_ref()),
            _ => None,
        }
    }

    /// Evaluate the expression given a complete assignment of its free
    /// variables. Used by tests to check the bounds invariant and to compare
    /// against a naive reference computation; not part of the lowering path
    /// (the generated kernel does the evaluating, symbolically, at codegen
    /// time).
    pub fn eval(&self, vars: &std::collections::HashMap<String, i64>) -> i64 {
        match &self.0.kind {
            ExprKind::Num(c) => *c,
            ExprKind::Var(v) => *vars
                .get(v.name.as_ref())
                .unwrap_or_else(|| panic!("shapetrack: eval: unbound variable {}", v.name)),
            ExprKind::Mul(e, k) => e.eval(vars) * k,
            ExprKind::Div(e, k) => e.eval(vars).div_euclid(*k),
            ExprKind::Mod(e, k) => e.eval(vars).rem_euclid(*k),
            ExprKind::Sum(cs) => cs.iter().map(|c| c.eval(vars)).sum(),
            ExprKind::And(cs) => i64::from(cs.iter().all(|c| c.eval(vars) != 0)),
            ExprKind::Lt(e, k) => i64::from(e.eval(vars) < *k),
            ExprKind::Ge(e, k) => i64::from(e.eval(vars) >= *k),
        }
    }
}

/// An integer constant.
pub fn num(c: i64) -> Expr {
    Expr::leaf(ExprKind::Num(c), Bounds::exact(c))
}

/// A free variable bounded by `[lo, hi]`. Degenerates to `num(lo)` when the
/// bounds don't leave room for more than one value (`lo >= hi`).
pub fn var(name: &str, lo: i64, hi: i64) -> Expr {
    if lo < hi {
        Expr::leaf(
            ExprKind::Var(VarInfo {
                name: Rc::from(name),
                min: lo,
                max: hi,
            }),
            Bounds { min: lo, max: hi },
        )
    } else {
        num(lo)
    }
}

fn mul_bounds(b: Bounds, k: i64) -> Bounds {
    let a = b.min * k;
    let c = b.max * k;
    Bounds {
        min: a.min(c),
        max: a.max(c),
    }
}

/// Scale `e` by the constant `k`.
pub fn mul(e: Expr, k: i64) -> Expr {
    if k == 0 {
        return num(0);
    }
    if k == 1 {
        return e;
    }
    match e.kind().clone() {
        ExprKind::Num(c) => num(c * k),
        ExprKind::Mul(inner, k2) => mul(inner, k2 * k),
        ExprKind::Sum(children) => sum(children.into_iter().map(|c| mul(c, k)).collect()),
        _ => {
            let bounds = mul_bounds(e.bounds(), k);
            Expr::leaf(ExprKind::Mul(e, k), bounds)
        }
    }
}

/// Find `base` among `terms` and add `coeff` to it, or append a new entry.
fn accumulate_term(terms: &mut Vec<(Expr, i64)>, base: Expr, coeff: i64) {
    for (b, c) in terms.iter_mut() {
        if *b == base {
            *c += coeff;
            return;
        }
    }
    terms.push((base, coeff));
}

/// Sum of `xs`. Flattens nested sums, merges like terms (same base,
/// coefficients added), folds constants into a single trailing `Num`, drops
/// zero-coefficient terms, and unwraps to the sole summand (or `Num(0)` for
/// an empty/all-cancelling sum).
pub fn sum(xs: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(xs.len());
    for x in xs {
        match x.kind() {
            ExprKind::Sum(children) => flat.extend(children.iter().cloned()),
            _ => flat.push(x),
        }
    }

    let mut constant: i64 = 0;
    let mut terms: Vec<(Expr, i64)> = Vec::new();
    for t in flat {
        match t.kind().clone() {
            ExprKind::Num(c) => constant += c,
            ExprKind::Mul(base, k) => accumulate_term(&mut terms, base, k),
            _ => accumulate_term(&mut terms, t, 1),
        }
    }

    let mut summands: Vec<Expr> = terms
        .into_iter()
        .filter(|(_, c)| *c != 0)
        .map(|(base, c)| mul(base, c))
        .collect();

    if constant != 0 || summands.is_empty() {
        summands.push(num(constant));
    }

    if summands.len() == 1 {
        return summands.into_iter().next().unwrap();
    }

    let min: i64 = summands.iter().map(Expr::min).sum();
    let max: i64 = summands.iter().map(Expr::max).sum();
    Expr::leaf(ExprKind::Sum(summands), Bounds { min, max })
}

/// `true` if every summand of `children` carries a coefficient divisible by
/// `k` (a bare, non-`Mul` summand counts as coefficient 1, never divisible by
/// a `k > 1`). When it returns `Some`, the caller has the fully reduced
/// (divided-by-`k`) summands ready to rebuild with [`sum`].
fn try_factor_sum(children: &[Expr], k: i64) -> Option<Vec<Expr>> {
    let mut reduced = Vec::with_capacity(children.len());
    for c in children {
        match c.kind() {
            ExprKind::Num(v) => {
                if v % k != 0 {
                    return None;
                }
                reduced.push(num(v / k));
            }
            ExprKind::Mul(base, coeff) => {
                if coeff % k != 0 {
                    return None;
                }
                reduced.push(mul(base.clone(), coeff / k));
            }
            _ => return None, // bare term has implicit coefficient 1, not divisible by k > 1
        }
    }
    Some(reduced)
}

/// Integer division by the positive constant `k`.
pub fn div(e: Expr, k: i64) -> Expr {
    error::ensure!(k > 0, "div", "k", "divisor must be positive, got {k}");
    if k == 1 {
        return e;
    }
    if e.min() >= 0 && e.max() < k {
        return num(0);
    }
    if let ExprKind::Mul(inner, c) = e.kind() {
        let (inner, c) = (inner.clone(), *c);
        if c % k == 0 {
            return mul(inner, c / k);
        }
        if c > 0 && k % c == 0 {
            return div(inner, k / c);
        }
    }
    if let ExprKind::Sum(children) = e.kind() {
        if let Some(reduced) = try_factor_sum(children, k) {
            return sum(reduced);
        }
    }
    let bounds = Bounds {
        min: e.min().div_euclid(k),
        max: e.max().div_euclid(k),
    };
    Expr::leaf(ExprKind::Div(e, k), bounds)
}

/// Modulo by the positive constant `k`.
pub fn modulo(e: Expr, k: i64) -> Expr {
    error::ensure!(k > 0, "mod", "k", "modulus must be positive, got {k}");
    if k == 1 {
        return num(0);
    }
    if e.min() >= 0 && e.max() < k {
        return e;
    }
    if let ExprKind::Mod(inner, k2) = e.kind() {
        let k2 = *k2;
        if k <= k2 && k2 % k == 0 {
            return modulo(inner.clone(), k);
        }
    }
    if let ExprKind::Mul(_, c) = e.kind() {
        if c % k == 0 {
            return num(0);
        }
    }
    if let ExprKind::Sum(children) = e.kind() {
        if try_factor_sum(children, k).is_some() {
            return num(0);
        }
    }
    Expr::leaf(ExprKind::Mod(e, k), Bounds { min: 0, max: k - 1 })
}

/// `e < k`, as a 0/1-valued expression.
pub fn lt(e: Expr, k: i64) -> Expr {
    if e.max() < k {
        return num(1);
    }
    if e.min() >= k {
        return num(0);
    }
    Expr::leaf(ExprKind::Lt(e, k), Bounds { min: 0, max: 1 })
}

/// `e >= k`, as a 0/1-valued expression.
pub fn ge(e: Expr, k: i64) -> Expr {
    if e.min() >= k {
        return num(1);
    }
    if e.max() < k {
        return num(0);
    }
    Expr::leaf(ExprKind::Ge(e, k), Bounds { min: 0, max: 1 })
}

/// Conjunction of 0/1-valued predicates. Flattens nested conjunctions, drops
/// `Num(1)` (vacuously true) terms, short-circuits to `Num(0)` if any term is
/// `Num(0)`, and unwraps a singleton.
pub fn ands(xs: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(xs.len());
    for x in xs {
        match x.kind() {
            ExprKind::And(children) => flat.extend(children.iter().cloned()),
            _ => flat.push(x),
        }
    }

    let mut kept = Vec::with_capacity(flat.len());
    for t in flat {
        match t.kind() {
            ExprKind::Num(0) => return num(0),
            ExprKind::Num(1) => {}
            _ => kept.push(t),
        }
    }

    match kept.len() {
        0 => num(1),
        1 => kept.into_iter().next().unwrap(),
        _ => Expr::leaf(ExprKind::And(kept), Bounds { min: 0, max: 1 }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn num_bounds_are_exact() {
        let e = num(7);
        assert_eq!((e.min(), e.max()), (7, 7));
    }

    #[test]
    fn var_degenerates_to_num_when_not_strictly_increasing() {
        assert_eq!(var("x", 3, 3), num(3));
        assert_eq!(var("x", 5, 2), num(5));
    }

    #[test]
    fn mul_by_zero_and_one() {
        let x = var("x", 0, 9);
        assert_eq!(mul(x.clone(), 0), num(0));
        assert_eq!(mul(x.clone(), 1), x);
    }

    #[test]
    fn mul_composes() {
        let x = var("x", 0, 9);
        let once = mul(x.clone(), 3);
        let twice = mul(once, 4);
        assert_eq!(twice, mul(x, 12));
    }

    #[test]
    fn mul_distributes_over_sum() {
        let x = var("x", 0, 9);
        let y = var("y", 0, 9);
        let s = sum(vec![x.clone(), y.clone(), num(1)]);
        let scaled = mul(s, 2);
        assert_eq!(scaled, sum(vec![mul(x, 2), mul(y, 2), num(2)]));
    }

    #[test]
    fn sum_merges_like_terms() {
        let x = var("x", 0, 9);
        let combined = sum(vec![x.clone(), x.clone()]);
        assert_eq!(combined, mul(x, 2));
    }

    #[test]
    fn sum_folds_constants_to_one_trailing_num() {
        let x = var("x", 0, 9);
        let combined = sum(vec![num(3), x.clone(), num(4)]);
        assert_eq!(combined, sum(vec![x, num(7)]));
    }

    #[test]
    fn sum_of_empty_is_zero() {
        assert_eq!(sum(vec![]), num(0));
    }

    #[test]
    fn sum_singleton_unwraps() {
        let x = var("x", 0, 9);
        assert_eq!(sum(vec![x.clone()]), x);
    }

    #[test]
    fn div_below_divisor_is_zero() {
        let x = var("x", 0, 4);
        assert_eq!(div(x, 5), num(0));
    }

    #[test]
    fn div_by_one_is_identity() {
        let x = var("x", 0, 9);
        assert_eq!(div(x.clone(), 1), x);
    }

    #[test]
    fn div_factors_out_of_divisible_sum() {
        let x = var("x", 0, 9);
        let y = var("y", 0, 9);
        let e = sum(vec![mul(x.clone(), 6), mul(y.clone(), 9), num(3)]);
        assert_eq!(div(e, 3), sum(vec![mul(x, 2), mul(y, 3), num(1)]));
    }

    #[test]
    fn div_does_not_fold_partially_divisible_sum() {
        let x = var("x", 0, 9);
        let y = var("y", 0, 9);
        let e = sum(vec![mul(x, 6), y]);
        let d = div(e, 3);
        assert_eq!(d.tag(), ExprTag::Div);
    }

    #[test]
    fn div_of_negative_coefficient_mul_never_panics() {
        // c = -3, k = 6: `k % c == 0` in the naive check, but recursing into
        // `div(inner, k / c)` would pass a negative divisor. Must not panic.
        let x = var("x", 0, 9);
        let d = div(mul(x, -3), 6);
        assert_eq!(d.min().min(d.max()), (-27i64).div_euclid(6));
        assert_eq!(d.min().max(d.max()), 0i64.div_euclid(6));
    }

    #[test]
    fn mod_below_modulus_is_identity() {
        let x = var("x", 0, 4);
        assert_eq!(modulo(x.clone(), 5), x);
    }

    #[test]
    fn mod_of_divisible_sum_is_zero() {
        let x = var("x", 0, 9);
        let e = mul(x, 6);
        assert_eq!(modulo(e, 3), num(0));
    }

    #[test]
    fn mod_of_mod_narrows_when_divisible() {
        let x = var("x", 0, 99);
        let inner = modulo(x, 12);
        assert_eq!(modulo(inner, 4), modulo(var("x", 0, 99), 4));
    }

    #[test]
    fn lt_and_ge_resolve_from_bounds() {
        let x = var("x", 0, 3);
        assert_eq!(lt(x.clone(), 10), num(1));
        assert_eq!(ge(x, 10), num(0));
    }

    #[test]
    fn ands_short_circuits_on_false() {
        let x = var("x", 0, 3);
        assert_eq!(ands(vec![lt(x, 10), num(0)]), num(0));
    }

    #[test]
    fn ands_drops_true_and_unwraps_singleton() {
        let x = var("x", 0, 3);
        let pred = ge(x, 1);
        assert_eq!(ands(vec![num(1), pred.clone()]), pred);
    }

    #[test]
    fn eval_matches_bounds_on_concrete_assignment() {
        let x = var("x", 0, 9);
        let y = var("y", 0, 9);
        let e = sum(vec![mul(x, 4), modulo(y, 3)]);
        let v = e.eval(&vars(&[("x", 5), ("y", 7)]));
        assert_eq!(v, 5 * 4 + 7 % 3);
        assert!(e.min() <= v && v <= e.max());
    }

    #[test]
    #[should_panic(expected = "divisor must be positive")]
    fn div_by_zero_is_fatal() {
        let _ = div(num(4), 0);
    }
}
