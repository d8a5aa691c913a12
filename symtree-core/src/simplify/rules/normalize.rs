//! Normalization rules: subtraction elimination, sign placement, chain flattening, and
//! canonical ordering. Running these first means every later rule sees flat, sign-normalized
//! chains.

use crate::compare;
use crate::expr::{BracketMode, Expr};
use crate::op::Op;
use crate::simplify::step::Step;
use crate::step_collector::StepCollector;
use std::cmp::Ordering;

/// `a - b - c = a + (-b) + (-c)`
pub fn minus_to_plus(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = super::do_op(expr, Op::Sub, |operands| {
        let mut iter = operands.iter().cloned();
        let mut terms = vec![iter.next()?];
        terms.extend(iter.map(|operand| -operand));
        Some(Expr::Op(Op::Add, terms))
    })?;

    step_collector.push(Step::MinusToPlus);
    Some(opt)
}

/// `-(-a) = a`
pub fn double_negation(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = super::do_op(expr, Op::Neg, |operands| {
        operands[0].as_op(Op::Neg).map(|inner| inner[0].clone())
    })?;

    step_collector.push(Step::DoubleNegation);
    Some(opt)
}

/// `-(a + b) = (-a) + (-b)`
pub fn negate_sum(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = super::do_op(expr, Op::Neg, |operands| {
        operands[0].as_op(Op::Add).map(|terms| {
            Expr::Op(Op::Add, terms.iter().map(|term| -term.clone()).collect())
        })
    })?;

    step_collector.push(Step::NegateSum);
    Some(opt)
}

/// `-(a * b) = (-a) * b`
///
/// Negating the first factor folds the sign into a leading constant where there is one.
pub fn negate_product(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = super::do_op(expr, Op::Neg, |operands| {
        operands[0].as_op(Op::Mul).map(|factors| {
            let mut factors = factors.to_vec();
            let first = factors.remove(0);
            factors.insert(0, -first);
            Expr::Op(Op::Mul, factors)
        })
    })?;

    step_collector.push(Step::ExtractSign);
    Some(opt)
}

/// Removes transparent bracket wrappers; canonical printing re-derives grouping from operator
/// priority. Opaque brackets persist.
pub fn drop_brackets(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = match expr {
        Expr::Brackets(child, BracketMode::Transparent) => Some((**child).clone()),
        _ => None,
    }?;

    step_collector.push(Step::DropBrackets);
    Some(opt)
}

/// Replaces an anonymous variable binding by the expression it aliases.
pub fn inline_alias(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = match expr {
        Expr::Var(var) if var.name().is_none() => var.value(),
        _ => None,
    }?;

    step_collector.push(Step::InlineAlias);
    Some(opt)
}

/// Pulls nested chains of the same associative operator up into the parent's operand list:
/// `a + (b + c) = a + b + c`, and likewise for multiplication.
pub fn flatten_chain(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = match expr {
        Expr::Op(op, operands) if op.commutative() => {
            if operands.iter().any(|operand| operand.as_op(*op).is_some()) {
                let mut flattened = Vec::with_capacity(operands.len());
                for operand in operands {
                    match operand.as_op(*op) {
                        Some(nested) => flattened.extend(nested.iter().cloned()),
                        None => flattened.push(operand.clone()),
                    }
                }
                Some(Expr::Op(*op, flattened))
            } else {
                None
            }
        },
        _ => None,
    }?;

    step_collector.push(Step::FlattenChain);
    Some(opt)
}

/// Unwraps negated factors of a product under a single aggregate sign: an odd number of them
/// leaves one unary minus around the first operand of the result.
///
/// `a * (-b) = (-a) * b`
/// `(-a) * (-b) = a * b`
pub fn extract_sign(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = super::do_multiply(expr, |factors| {
        let negated = factors.iter().filter(|factor| factor.is_unary_minus()).count();
        let canonical = negated == 0 || (negated == 1 && factors[0].is_unary_minus());
        if canonical {
            return None;
        }

        let mut unwrapped = factors
            .iter()
            .map(|factor| match factor.as_op(Op::Neg) {
                Some(inner) => inner[0].clone(),
                None => factor.clone(),
            })
            .collect::<Vec<_>>();
        if negated % 2 == 1 {
            let first = unwrapped.remove(0);
            unwrapped.insert(0, -first);
        }
        Some(Expr::Op(Op::Mul, unwrapped))
    })?;

    step_collector.push(Step::ExtractSign);
    Some(opt)
}

/// The ordering key for canonical sorting: the sign wrapper is ignored so a term and its
/// negation sort together, with the full order as tiebreak.
fn sort_cmp(a: &Expr, b: &Expr) -> Ordering {
    fn key(expr: &Expr) -> &Expr {
        match expr.as_op(Op::Neg) {
            Some(inner) => &inner[0],
            None => expr,
        }
    }

    compare::cmp(key(a), key(b)).then_with(|| compare::cmp(a, b))
}

/// Sorts the operands of commutative operators into the total order.
pub fn sort_operands(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = match expr {
        Expr::Op(op, operands) if op.commutative() => {
            let sorted = operands
                .windows(2)
                .all(|pair| sort_cmp(&pair[0], &pair[1]) != Ordering::Greater);
            if sorted {
                None
            } else {
                let mut operands = operands.clone();
                operands.sort_by(sort_cmp);
                Some(Expr::Op(*op, operands))
            }
        },
        _ => None,
    }?;

    step_collector.push(Step::SortOperands);
    Some(opt)
}

/// Applies all normalization rules.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    minus_to_plus(expr, step_collector)
        .or_else(|| double_negation(expr, step_collector))
        .or_else(|| negate_sum(expr, step_collector))
        .or_else(|| negate_product(expr, step_collector))
        .or_else(|| drop_brackets(expr, step_collector))
        .or_else(|| inline_alias(expr, step_collector))
        .or_else(|| flatten_chain(expr, step_collector))
        .or_else(|| extract_sign(expr, step_collector))
        .or_else(|| sort_operands(expr, step_collector))
}

#[cfg(test)]
mod tests {
    use crate::var::Variable;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn subtraction_becomes_negated_addition() {
        let x = Variable::named("x");
        let expr = Expr::Op(Op::Sub, vec![x.expr(), Expr::num(2.0), Expr::num(3.0)]);

        let rewritten = minus_to_plus(&expr, &mut ()).unwrap();
        assert_eq!(
            rewritten,
            Expr::Op(Op::Add, vec![x.expr(), Expr::num(-2.0), Expr::num(-3.0)]),
        );
    }

    #[test]
    fn nested_chains_flatten() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let nested = Expr::Op(Op::Add, vec![
            x.expr(),
            Expr::Op(Op::Add, vec![y.expr(), Expr::num(1.0)]),
        ]);

        let flattened = flatten_chain(&nested, &mut ()).unwrap();
        assert_eq!(
            flattened,
            Expr::Op(Op::Add, vec![x.expr(), y.expr(), Expr::num(1.0)]),
        );
    }

    #[test]
    fn odd_signs_collapse_onto_the_first_factor() {
        let a = Variable::named("a");
        let b = Variable::named("b");
        let c = Variable::named("c");

        let product = Expr::Op(Op::Mul, vec![
            Expr::Op(Op::Neg, vec![a.expr()]),
            b.expr(),
            Expr::Op(Op::Neg, vec![c.expr()]),
        ]);
        let rewritten = extract_sign(&product, &mut ()).unwrap();
        assert_eq!(rewritten, Expr::Op(Op::Mul, vec![a.expr(), b.expr(), c.expr()]));

        let product = Expr::Op(Op::Mul, vec![a.expr(), Expr::Op(Op::Neg, vec![b.expr()])]);
        let rewritten = extract_sign(&product, &mut ()).unwrap();
        assert_eq!(
            rewritten,
            Expr::Op(Op::Mul, vec![Expr::Op(Op::Neg, vec![a.expr()]), b.expr()]),
        );
    }

    #[test]
    fn canonical_product_sign_is_left_alone() {
        let a = Variable::named("a");
        let b = Variable::named("b");
        let product = Expr::Op(Op::Mul, vec![Expr::Op(Op::Neg, vec![a.expr()]), b.expr()]);
        assert_eq!(extract_sign(&product, &mut ()), None);
    }

    #[test]
    fn sorting_ignores_the_sign_wrapper() {
        let x = Variable::named("x");
        let y = Variable::named("y");

        let sum = Expr::Op(Op::Add, vec![Expr::Op(Op::Neg, vec![y.expr()]), x.expr()]);
        let sorted = sort_operands(&sum, &mut ()).unwrap();
        assert_eq!(
            sorted,
            Expr::Op(Op::Add, vec![x.expr(), Expr::Op(Op::Neg, vec![y.expr()])]),
        );

        assert_eq!(sort_operands(&sorted, &mut ()), None);
    }

    #[test]
    fn transparent_brackets_are_dropped() {
        let x = Variable::named("x");
        let wrapped = x.expr().grouped(BracketMode::Transparent);
        assert_eq!(drop_brackets(&wrapped, &mut ()), Some(x.expr()));

        let opaque = x.expr().grouped(BracketMode::Opaque);
        assert_eq!(drop_brackets(&opaque, &mut ()), None);
    }
}
