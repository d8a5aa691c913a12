//! Simplification rules for powers.

use crate::expr::Expr;
use crate::op::Op;
use crate::simplify::step::Step;
use crate::simplify::rules::do_power;
use crate::step_collector::StepCollector;

/// `a^0 = 1`
pub fn power_zero(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_power(expr, |_, exponent| {
        if exponent.is_zero() {
            Some(Expr::one())
        } else {
            None
        }
    })?;

    step_collector.push(Step::PowerZero);
    Some(opt)
}

/// `a^1 = a`
pub fn power_one(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_power(expr, |base, exponent| {
        if exponent.is_one() {
            Some(base.clone())
        } else {
            None
        }
    })?;

    step_collector.push(Step::PowerOne);
    Some(opt)
}

/// `1^a = 1`
pub fn one_base(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_power(expr, |base, _| {
        if base.is_one() {
            Some(Expr::one())
        } else {
            None
        }
    })?;

    step_collector.push(Step::OneBase);
    Some(opt)
}

/// `0^a = 0`, for a positive constant exponent.
pub fn zero_base(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_power(expr, |base, exponent| {
        if base.is_zero() && exponent.as_constant().is_some_and(|value| value > 0.0) {
            Some(Expr::zero())
        } else {
            None
        }
    })?;

    step_collector.push(Step::ZeroBase);
    Some(opt)
}

/// `(a^b)^c = a^(b*c)`, for constant `b` and `c`.
pub fn nested_power(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_power(expr, |base, exponent| {
        let outer = exponent.as_constant()?;
        let inner_operands = base.as_op(Op::Pow)?;
        let inner = inner_operands[1].as_constant()?;
        Some(Expr::Op(Op::Pow, vec![
            inner_operands[0].clone(),
            Expr::num(inner * outer),
        ]))
    })?;

    step_collector.push(Step::NestedPower);
    Some(opt)
}

/// Applies all power rules.
///
/// All power rules will reduce the complexity of the expression.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    power_zero(expr, step_collector)
        .or_else(|| power_one(expr, step_collector))
        .or_else(|| one_base(expr, step_collector))
        .or_else(|| zero_base(expr, step_collector))
        .or_else(|| nested_power(expr, step_collector))
}
