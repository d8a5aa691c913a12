//! Simplification of expressions into canonical form.
//!
//! The definition of "simplified" is, of course, somewhat subjective. We define an expression
//! to be simplified if it has the lowest _complexity_ in the set of all expressions
//! **semantically equivalent** to it, where complexity is roughly defined as the number of
//! nodes in the expression tree. For example, `x + x` is not simplified, because it can be
//! reduced to one term `2x`, which has lower complexity.
//!
//! Simplification is done by applying a set of simplification rules to the expression in
//! multiple passes. Each rule is simply a function that accepts an expression and returns
//! [`Option<Expr>`]; if the rule is applicable to the expression, the rule is applied and the
//! result is returned.
//!
//! Each pass walks the tree bottom-up — children first, then at most one rule application at
//! each node — under a [`ChangeScope`](crate::token::ChangeScope) that records whether anything
//! fired. Passes repeat until a whole pass reports no change; that fixpoint is the canonical
//! form: flattened associative chains, at most one folded constant per chain, signs in
//! canonical position, and commutative operands sorted into the total order. Reaching the
//! fixpoint a second time is a no-op.
//!
//! The current set of rules is defined in [`rules`], and covers things like combining like
//! terms / factors, basic power rules, exact trigonometric values, vector arithmetic, and
//! more.

pub mod rules;
pub mod step;

use crate::expr::Expr;
use crate::step_collector::StepCollector;
use crate::token::ChangeScope;
use tracing::{debug, trace};

pub use step::Step;

/// Simplifies the given expression to its canonical form.
pub fn simplify(expr: &Expr) -> Expr {
    simplify_with(expr, &mut ())
}

/// Simplifies the given expression, collecting every applied rewrite step.
pub fn simplify_with_steps(expr: &Expr) -> (Expr, Vec<Step>) {
    let mut steps = Vec::new();
    let result = simplify_with(expr, &mut steps);
    (result, steps)
}

/// Simplifies the given expression, reporting every applied rewrite step to the given
/// collector.
pub fn simplify_with(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Expr {
    let mut current = expr.clone();
    let mut scope = ChangeScope::root();
    let mut passes = 0usize;

    loop {
        let mut pass = scope.child();
        current = simplify_pass(current, &mut pass, step_collector);
        let changed = pass.changed();
        let rewrites = pass.count();
        pass.disarm();
        drop(pass);

        passes += 1;
        trace!(passes, rewrites, "simplification pass complete");
        if !changed {
            break;
        }
    }

    debug!(passes, "fixpoint reached");
    scope.disarm();
    current
}

/// One bottom-up pass: children are rewritten first, then at most one rule is applied at this
/// node. The original node is kept when no rule fires.
fn simplify_pass(
    expr: Expr,
    scope: &mut ChangeScope,
    step_collector: &mut dyn StepCollector<Step>,
) -> Expr {
    let expr = match expr {
        Expr::Op(op, operands) => {
            let mut rewritten = Vec::with_capacity(operands.len());
            for operand in operands {
                let mut child = scope.child();
                let operand = simplify_pass(operand, &mut child, step_collector);
                child.disarm();
                rewritten.push(operand);
            }
            Expr::Op(op, rewritten)
        },
        Expr::Vector(elements) => {
            let mut rewritten = Vec::with_capacity(elements.len());
            for element in elements {
                let mut child = scope.child();
                let element = simplify_pass(element, &mut child, step_collector);
                child.disarm();
                rewritten.push(element);
            }
            Expr::Vector(rewritten)
        },
        Expr::Sequence(elements) => {
            let mut rewritten = Vec::with_capacity(elements.len());
            for element in elements {
                let mut child = scope.child();
                let element = simplify_pass(element, &mut child, step_collector);
                child.disarm();
                rewritten.push(element);
            }
            Expr::Sequence(rewritten)
        },
        Expr::Brackets(child_expr, mode) => {
            let mut child = scope.child();
            let rewritten = simplify_pass(*child_expr, &mut child, step_collector);
            child.disarm();
            Expr::Brackets(Box::new(rewritten), mode)
        },
        leaf => leaf,
    };

    match rules::all(&expr, step_collector) {
        Some(replacement) => {
            scope.mark();
            trace!(from = %expr, to = %replacement, "rule applied");
            replacement
        },
        None => expr,
    }
}

#[cfg(test)]
mod tests {
    use crate::compare;
    use crate::expr::Expr;
    use crate::op::Op;
    use crate::var::Variable;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn constant_folding() {
        let sum = Expr::Op(Op::Add, vec![Expr::num(2.0), Expr::num(3.0)]);
        assert_eq!(simplify(&sum), Expr::num(5.0));

        let x = Variable::named("x");
        let product = Expr::Op(Op::Mul, vec![Expr::num(0.0), x.expr()]);
        assert_eq!(simplify(&product), Expr::zero());

        let quotient = Expr::Op(Op::Div, vec![x.expr(), Expr::num(1.0)]);
        assert_eq!(simplify(&quotient), x.expr());
    }

    #[test]
    fn like_terms_merge_through_the_fixpoint() {
        let x = Variable::named("x");

        // 2x + 3x = 5x
        let sum = Expr::num(2.0) * x.expr() + Expr::num(3.0) * x.expr();
        assert_eq!(simplify(&sum), Expr::num(5.0) * x.expr());
    }

    #[test]
    fn like_powers_merge_through_the_fixpoint() {
        let x = Variable::named("x");

        // x^2 * x^3 = x^5
        let product = x.expr().pow(Expr::num(2.0)) * x.expr().pow(Expr::num(3.0));
        assert_eq!(simplify(&product), x.expr().pow(Expr::num(5.0)));
    }

    #[test]
    fn canonical_order_is_insertion_order_independent() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let z = Variable::named("z");

        let a = x.expr() + y.expr() + z.expr() + Expr::num(1.0);
        let b = Expr::num(1.0) + z.expr() + x.expr() + y.expr();

        let a = simplify(&a);
        let b = simplify(&b);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn fixpoint_is_idempotent() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let exprs = [
            x.expr() + y.expr() * Expr::num(3.0) + x.expr() * Expr::num(2.0),
            (x.expr() + Expr::num(1.0)).pow(Expr::num(2.0)) - x.expr(),
            x.expr().sin() * Expr::num(4.0) / y.expr(),
            Expr::Op(Op::Sub, vec![x.expr(), y.expr(), Expr::num(2.0)]),
        ];

        for expr in exprs {
            let once = simplify(&expr);
            let (twice, steps) = simplify_with_steps(&once);
            assert_eq!(once, twice);
            assert!(steps.is_empty(), "second run applied {steps:?}");
        }
    }

    #[test]
    fn subtraction_normalizes_and_cancels() {
        let x = Variable::named("x");

        // x - x = 0
        let difference = x.expr() - x.expr();
        assert_eq!(simplify(&difference), Expr::zero());

        // 2x - 3x = -x
        let difference = Expr::num(2.0) * x.expr() - Expr::num(3.0) * x.expr();
        assert_eq!(
            simplify(&difference),
            Expr::Op(Op::Neg, vec![x.expr()]),
        );
    }

    #[test]
    fn division_by_zero_constant_folds_to_ieee_values() {
        let quotient = Expr::Op(Op::Div, vec![Expr::num(1.0), Expr::num(0.0)]);
        assert_eq!(simplify(&quotient), Expr::num(f64::INFINITY));

        let quotient = Expr::Op(Op::Div, vec![Expr::num(0.0), Expr::num(0.0)]);
        assert!(simplify(&quotient).as_constant().unwrap().is_nan());
    }

    #[test]
    fn vector_dispatch() {
        let vector = Expr::Vector(vec![Expr::num(1.0), Expr::num(2.0), Expr::num(3.0)]);

        // scaling a 3-vector scales each component
        let scaled = simplify(&(Expr::num(2.0) * vector.clone()));
        assert_eq!(
            scaled,
            Expr::Vector(vec![Expr::num(2.0), Expr::num(4.0), Expr::num(6.0)]),
        );

        // mismatched sizes become an error node, never a crash
        let mismatched = simplify(&(
            vector * Expr::Vector(vec![Expr::num(1.0), Expr::num(2.0)])
        ));
        assert!(matches!(mismatched, Expr::Error(_)));
    }

    #[test]
    fn errors_absorb_the_surrounding_operation() {
        let x = Variable::named("x");
        let error = Expr::error("vector size mismatch in addition");
        let expr = (x.expr() + error.clone()) * Expr::num(2.0);
        assert_eq!(simplify(&expr), error);
    }

    #[test]
    fn is_equal_recognizes_reorderings() {
        let x = Variable::named("x");
        let y = Variable::named("y");

        let a = x.expr() * Expr::num(2.0) + y.expr();
        let b = y.expr() + Expr::num(2.0) * x.expr();
        assert!(compare::is_equal(&a, &b));

        let c = y.expr() + Expr::num(3.0) * x.expr();
        assert!(!compare::is_equal(&a, &c));
    }
}
