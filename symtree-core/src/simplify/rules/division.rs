//! Simplification rules for quotients.
//!
//! Constant division itself is folded by the uniform numeric fold with IEEE-754 semantics:
//! `x/0` is `±inf` and `0/0` is `NaN`. The rules here handle the structural cases.

use crate::canonic::CanonicPow;
use crate::compare;
use crate::expr::{Expr, ValueType};
use crate::op::Op;
use crate::simplify::step::Step;
use crate::simplify::rules::do_divide;
use crate::step_collector::StepCollector;

/// `a/1 = a`
pub fn divide_one(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_divide(expr, |dividend, divisor| {
        if divisor.is_one() {
            Some(dividend.clone())
        } else {
            None
        }
    })?;

    step_collector.push(Step::DivideOne);
    Some(opt)
}

/// `0/a = 0`, for a divisor that is structurally nonzero.
///
/// A symbolic divisor could still be zero, so the rule only fires when the divisor is a nonzero
/// constant or the imaginary unit; everything else is left to numeric evaluation.
pub fn zero_dividend(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_divide(expr, |dividend, divisor| {
        if !dividend.is_zero() {
            return None;
        }
        let nonzero = matches!(divisor, Expr::Imag)
            || divisor.as_constant().is_some_and(|value| value != 0.0);
        if nonzero {
            Some(Expr::zero())
        } else {
            None
        }
    })?;

    step_collector.push(Step::ZeroDividend);
    Some(opt)
}

/// Cancels factors with matching bases between the dividend and the divisor.
///
/// `(x^2 * y) / x = x * y`
/// `x / x^3 = x^-2`
pub fn cancel_common_factors(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_divide(expr, |dividend, divisor| {
        if dividend.value_type() == ValueType::Vector || divisor.value_type() == ValueType::Vector {
            return None;
        }

        let mut numerator = CanonicPow::of(dividend);
        let mut denominator = CanonicPow::of(divisor);

        let mut cancelled = false;
        let mut idx = 0;
        while idx < denominator.pairs.len() {
            let (exponent, base) = denominator.pairs[idx].clone();
            // constant bases are the numeric fold's business
            if base.is_constant() {
                idx += 1;
                continue;
            }
            match numerator.pairs.iter_mut().find(|pair| compare::cmp(&pair.1, &base).is_eq()) {
                Some(pair) => {
                    pair.0 -= exponent;
                    denominator.pairs.swap_remove(idx);
                    cancelled = true;
                },
                None => idx += 1,
            }
        }

        if !cancelled {
            return None;
        }

        let numerator = numerator.into_product();
        let denominator = denominator.into_product();
        if denominator.is_one() {
            Some(numerator)
        } else {
            Some(Expr::Op(Op::Div, vec![numerator, denominator]))
        }
    })?;

    step_collector.push(Step::CancelCommonFactors);
    Some(opt)
}

/// Applies all division rules.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    divide_one(expr, step_collector)
        .or_else(|| zero_dividend(expr, step_collector))
        .or_else(|| cancel_common_factors(expr, step_collector))
}

#[cfg(test)]
mod tests {
    use crate::var::Variable;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn dividing_by_one_keeps_the_dividend() {
        let x = Variable::named("x");
        let quotient = Expr::Op(Op::Div, vec![x.expr(), Expr::num(1.0)]);
        assert_eq!(divide_one(&quotient, &mut ()), Some(x.expr()));
    }

    #[test]
    fn zero_dividend_needs_a_nonzero_divisor() {
        let x = Variable::named("x");

        let quotient = Expr::Op(Op::Div, vec![Expr::num(0.0), Expr::num(2.0)]);
        assert_eq!(zero_dividend(&quotient, &mut ()), Some(Expr::zero()));

        // a symbolic divisor could be zero; leave the quotient alone
        let quotient = Expr::Op(Op::Div, vec![Expr::num(0.0), x.expr()]);
        assert_eq!(zero_dividend(&quotient, &mut ()), None);
    }

    #[test]
    fn matching_bases_cancel() {
        let x = Variable::named("x");
        let y = Variable::named("y");

        // (x^2 * y) / x = x * y
        let quotient = Expr::Op(Op::Div, vec![
            x.expr().pow(Expr::num(2.0)) * y.expr(),
            x.expr(),
        ]);
        let cancelled = cancel_common_factors(&quotient, &mut ()).unwrap();
        assert_eq!(cancelled, x.expr() * y.expr());

        // x / x = 1
        let quotient = Expr::Op(Op::Div, vec![x.expr(), x.expr()]);
        assert_eq!(cancel_common_factors(&quotient, &mut ()), Some(Expr::one()));

        // x / x^3 = x^-2
        let quotient = Expr::Op(Op::Div, vec![x.expr(), x.expr().pow(Expr::num(3.0))]);
        assert_eq!(
            cancel_common_factors(&quotient, &mut ()),
            Some(x.expr().pow(Expr::num(-2.0))),
        );
    }

    #[test]
    fn unrelated_quotients_are_left_alone() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let quotient = Expr::Op(Op::Div, vec![x.expr(), y.expr()]);
        assert_eq!(cancel_common_factors(&quotient, &mut ()), None);
    }
}
