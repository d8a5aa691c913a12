//! Simplification rules for expressions involving multiplication, including combining like
//! factors.

use crate::canonic::CanonicPow;
use crate::expr::{Expr, ValueType};
use crate::op::Op;
use crate::simplify::step::Step;
use crate::simplify::rules::do_multiply;
use crate::step_collector::StepCollector;

/// `0*a = 0`
/// `a*0 = 0`
pub fn multiply_zero(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_multiply(expr, |factors| {
        if factors.iter().any(|factor| factor.is_zero()) {
            Some(Expr::zero())
        } else {
            None
        }
    })?;

    // keep the step collection logic outside of the closure to make it implement `Fn`
    step_collector.push(Step::MultiplyZero);
    Some(opt)
}

/// `1*a = a`
/// `a*1 = a`
pub fn multiply_one(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_multiply(expr, |factors| {
        let new_factors = factors.iter()
            .filter(|factor| !factor.is_one())
            .cloned()
            .collect::<Vec<_>>();

        if new_factors.len() == factors.len() {
            None
        } else {
            Some(Expr::Op(Op::Mul, new_factors).downgrade())
        }
    })?;

    step_collector.push(Step::MultiplyOne);
    Some(opt)
}

/// Folds the constants of a multiplication chain pairwise into a single accumulator constant.
///
/// The accumulator is appended back if any non-constant factor remains, and returned directly
/// as the result otherwise. An accumulator of exactly `-1` is not kept as a constant factor;
/// the sign is hoisted onto the first remaining factor as a unary minus instead.
pub fn fold_constants(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_multiply(expr, |factors| {
        let constants = factors.iter().filter(|factor| factor.is_constant()).count();
        let lone_minus_one = constants == 1
            && factors.len() > 1
            && factors.iter().any(|factor| factor.is_minus_one());
        if constants < 2 && !lone_minus_one {
            return None;
        }

        let mut accumulator = None;
        let mut rest = Vec::with_capacity(factors.len());
        for factor in factors {
            match (factor.as_constant(), accumulator) {
                (Some(value), None) => accumulator = Some(value),
                (Some(value), Some(folded)) => accumulator = Some(Op::Mul.fold(folded, value)),
                (None, _) => rest.push(factor.clone()),
            }
        }

        let accumulator = accumulator?;
        if rest.is_empty() {
            return Some(Expr::num(accumulator));
        }
        if accumulator == -1.0 {
            let first = rest.remove(0);
            rest.insert(0, -first);
        } else if accumulator != 1.0 {
            rest.insert(0, Expr::num(accumulator));
        }
        Some(Expr::Op(Op::Mul, rest).downgrade())
    })?;

    step_collector.push(Step::FoldMultiplication);
    Some(opt)
}

/// Combines like factors.
///
/// `a*a = a^2`
/// `a^2*a^3 = a^5`
/// etc.
pub fn combine_like_factors(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_multiply(expr, |factors| {
        // vector factors belong to the vector rules, not to power merging
        if factors.iter().any(|factor| factor.value_type() == ValueType::Vector) {
            return None;
        }

        // the aggregate sign sits on the first factor in canonical products; set it aside so
        // it cannot block a merge
        let mut factors = factors.to_vec();
        let negative = factors[0].is_unary_minus();
        if negative {
            let inner = factors[0].as_op(Op::Neg).map(|operands| operands[0].clone());
            if let Some(inner) = inner {
                factors[0] = inner;
            }
        }

        let mut view = CanonicPow { pairs: Vec::new() };
        for factor in &factors {
            view.pairs.extend(CanonicPow::of(factor).pairs);
        }
        if !view.merge() {
            return None;
        }

        let product = view.into_product();
        if negative {
            Some(Expr::Op(Op::Neg, vec![product]))
        } else {
            Some(product)
        }
    })?;

    step_collector.push(Step::CombineLikeFactors);
    Some(opt)
}

/// Applies all multiplication rules.
///
/// All multiplication rules will reduce the complexity of the expression.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    multiply_zero(expr, step_collector)
        .or_else(|| multiply_one(expr, step_collector))
        .or_else(|| fold_constants(expr, step_collector))
        .or_else(|| combine_like_factors(expr, step_collector))
}

#[cfg(test)]
mod tests {
    use crate::var::Variable;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn zero_short_circuits_the_chain() {
        let x = Variable::named("x");
        let product = Expr::Op(Op::Mul, vec![Expr::num(0.0), x.expr()]);
        assert_eq!(multiply_zero(&product, &mut ()), Some(Expr::zero()));
    }

    #[test]
    fn one_factors_are_dropped() {
        let x = Variable::named("x");
        let product = Expr::Op(Op::Mul, vec![Expr::num(1.0), x.expr()]);
        assert_eq!(multiply_one(&product, &mut ()), Some(x.expr()));
    }

    #[test]
    fn constants_fold_into_one_accumulator() {
        let x = Variable::named("x");
        let product = Expr::Op(Op::Mul, vec![
            Expr::num(2.0),
            x.expr(),
            Expr::num(3.0),
        ]);

        let folded = fold_constants(&product, &mut ()).unwrap();
        assert_eq!(folded, Expr::Op(Op::Mul, vec![Expr::num(6.0), x.expr()]));
    }

    #[test]
    fn minus_one_hoists_onto_the_first_factor() {
        let x = Variable::named("x");

        let product = Expr::Op(Op::Mul, vec![Expr::num(-1.0), x.expr()]);
        let folded = fold_constants(&product, &mut ()).unwrap();
        assert_eq!(folded, Expr::Op(Op::Neg, vec![x.expr()]));

        // 2 * x * -0.5 folds to -1, which becomes a sign, not a factor
        let product = Expr::Op(Op::Mul, vec![
            Expr::num(2.0),
            x.expr(),
            Expr::num(-0.5),
        ]);
        let folded = fold_constants(&product, &mut ()).unwrap();
        assert_eq!(folded, Expr::Op(Op::Neg, vec![x.expr()]));
    }

    #[test]
    fn like_factors_merge() {
        let x = Variable::named("x");

        let product = Expr::Op(Op::Mul, vec![
            x.expr().pow(Expr::num(2.0)),
            x.expr().pow(Expr::num(3.0)),
        ]);
        let merged = combine_like_factors(&product, &mut ()).unwrap();
        assert_eq!(merged, x.expr().pow(Expr::num(5.0)));

        let product = Expr::Op(Op::Mul, vec![x.expr(), x.expr()]);
        let merged = combine_like_factors(&product, &mut ()).unwrap();
        assert_eq!(merged, x.expr().pow(Expr::num(2.0)));
    }

    #[test]
    fn reciprocal_powers_cancel() {
        let x = Variable::named("x");
        let product = Expr::Op(Op::Mul, vec![
            x.expr(),
            x.expr().pow(Expr::num(-1.0)),
        ]);

        let merged = combine_like_factors(&product, &mut ()).unwrap();
        assert_eq!(merged, Expr::one());
    }
}
