//! The total order over expression nodes, and equality built on top of it.
//!
//! The order compares by node kind first (a fixed, arbitrary ranking), then by kind-specific
//! fields: constants by value under [`f64::total_cmp`] (so even the infinities and NaN produced
//! by IEEE constant folding sort deterministically), variables by name, operations by operator
//! tag and then operand-wise recursion.
//!
//! This order is what makes canonical forms canonical: the simplification rules sort the
//! operands of commutative operators with it, so two expressions built from the same terms in
//! any insertion order converge to identical trees and identical printed forms. It is also used
//! to deduplicate sequences.
//!
//! Transparent wrappers — brackets in transparent mode, anonymous variable bindings — delegate
//! to the expression they wrap and are invisible to the order.

use crate::expr::Expr;
use crate::simplify;
use crate::var::Variable;
use std::cmp::Ordering;

/// The fixed kind ranking. Constants sort before everything else, so a folded coefficient ends
/// up in front of the symbols it scales.
fn rank(expr: &Expr) -> u8 {
    match expr {
        Expr::Const(_) => 0,
        Expr::Imag => 1,
        Expr::Var(_) => 2,
        Expr::Ref(_) => 3,
        Expr::Op(..) => 4,
        Expr::Vector(_) => 5,
        Expr::Sequence(_) => 6,
        Expr::Brackets(..) => 7,
        Expr::Error(_) => 8,
    }
}

/// Compares two expressions under the total order.
pub fn cmp(a: &Expr, b: &Expr) -> Ordering {
    // transparent wrappers delegate all semantic queries to what they wrap
    if let Expr::Brackets(child, crate::expr::BracketMode::Transparent) = a {
        return cmp(child, b);
    }
    if let Expr::Brackets(child, crate::expr::BracketMode::Transparent) = b {
        return cmp(a, child);
    }
    if let Expr::Var(var) = a {
        if var.name().is_none() {
            if let Some(value) = var.value() {
                return cmp(&value, b);
            }
        }
    }
    if let Expr::Var(var) = b {
        if var.name().is_none() {
            if let Some(value) = var.value() {
                return cmp(a, &value);
            }
        }
    }

    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (Expr::Const(lhs), Expr::Const(rhs)) => lhs.value.total_cmp(&rhs.value),
        (Expr::Imag, Expr::Imag) => Ordering::Equal,
        (Expr::Var(lhs), Expr::Var(rhs)) => lhs.name().cmp(&rhs.name()),
        (Expr::Ref(lhs), Expr::Ref(rhs)) => lhs.name().cmp(&rhs.name()),
        (Expr::Op(lhs_op, lhs_operands), Expr::Op(rhs_op, rhs_operands)) => lhs_op
            .cmp(rhs_op)
            .then_with(|| cmp_slices(lhs_operands, rhs_operands)),
        (Expr::Vector(lhs), Expr::Vector(rhs)) | (Expr::Sequence(lhs), Expr::Sequence(rhs)) => {
            cmp_slices(lhs, rhs)
        },
        (Expr::Brackets(lhs, _), Expr::Brackets(rhs, _)) => cmp(lhs, rhs),
        (Expr::Error(lhs), Expr::Error(rhs)) => lhs.cmp(rhs),
        _ => unreachable!("kind ranks are equal"),
    })
}

fn cmp_slices(lhs: &[Expr], rhs: &[Expr]) -> Ordering {
    lhs.len().cmp(&rhs.len()).then_with(|| {
        lhs.iter()
            .zip(rhs)
            .map(|(a, b)| cmp(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

/// Syntactic-after-canonicalization equality: both sides are simplified to their fixpoints and
/// the results compared node for node. This is not mathematical equivalence — it recognizes
/// exactly the pairs whose canonical forms coincide.
pub fn is_equal(a: &Expr, b: &Expr) -> bool {
    cmp(&simplify::simplify(a), &simplify::simplify(b)).is_eq()
}

/// Differentiation matches the variable by binding identity first, then by name, so two
/// distinct bindings sharing a name still behave predictably.
pub(crate) fn is_same_variable(expr: &Expr, var: &Variable) -> bool {
    match expr {
        Expr::Var(this) => {
            this.ptr_eq(var) || (this.name().is_some() && this.name() == var.name())
        },
        Expr::Ref(this) => this.upgrade().is_some_and(|this| {
            this.ptr_eq(var) || (this.name().is_some() && this.name() == var.name())
        }),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::BracketMode;
    use crate::var::Variable;
    use super::*;

    #[test]
    fn constants_sort_before_symbols() {
        let x = Variable::named("x");
        assert_eq!(cmp(&Expr::num(2.0), &x.expr()), Ordering::Less);
        assert_eq!(cmp(&x.expr(), &Expr::num(2.0)), Ordering::Greater);
    }

    #[test]
    fn constants_sort_by_value() {
        assert_eq!(cmp(&Expr::num(1.0), &Expr::num(2.0)), Ordering::Less);
        assert_eq!(cmp(&Expr::num(2.0), &Expr::num(2.0)), Ordering::Equal);

        // IEEE values produced by constant folding still sort deterministically
        assert_eq!(cmp(&Expr::num(f64::INFINITY), &Expr::num(1.0)), Ordering::Greater);
        assert_eq!(cmp(&Expr::num(f64::NAN), &Expr::num(f64::NAN)), Ordering::Equal);
    }

    #[test]
    fn variables_sort_by_name() {
        let a = Variable::named("a");
        let b = Variable::named("b");
        assert_eq!(cmp(&a.expr(), &b.expr()), Ordering::Less);
        assert_eq!(cmp(&a.expr(), &Variable::named("a").expr()), Ordering::Equal);
    }

    #[test]
    fn operations_sort_by_tag_then_operands() {
        let x = Variable::named("x");
        let sum = x.expr() + Expr::num(1.0);
        let product = x.expr() * Expr::num(2.0);
        assert_eq!(cmp(&product, &sum), Ordering::Greater);
        assert_eq!(cmp(&sum, &sum.clone()), Ordering::Equal);
    }

    #[test]
    fn transparent_wrappers_are_invisible() {
        let x = Variable::named("x");
        let wrapped = x.expr().grouped(BracketMode::Transparent);
        assert_eq!(cmp(&wrapped, &x.expr()), Ordering::Equal);

        let alias = Expr::Var(Variable::anonymous(x.expr()));
        assert_eq!(cmp(&alias, &x.expr()), Ordering::Equal);
    }

    #[test]
    fn structural_zero_via_canonical_constant() {
        assert!(Expr::num(0.0).is_zero());
        assert!(!Expr::num(1.0).is_zero());
        assert!(Expr::num(1.0).is_one());
        assert!(Expr::num(-1.0).is_minus_one());
    }
}
