//! Simplification rules for trigonometric functions.
//!
//! Angles whose sine or cosine is exactly representable are looked up in a table instead of
//! being folded numerically; `sin(pi)` is exactly `0` here, not the rounding residue
//! `f64::sin` would produce. The table runs before the uniform numeric fold for that reason.
//! Angles with irrational exact values (like `pi/4`) gain nothing over numeric folding and are
//! left to it.

use crate::expr::Expr;
use crate::op::Op;
use crate::simplify::step::Step;
use crate::simplify::rules::do_op;
use crate::step_collector::StepCollector;
use std::f64::consts;

/// The canonical angles with exactly representable sines. Both the correctly rounded constant
/// and the value our own folding of `pi/6` produces are listed, in case they differ in the
/// last bit.
fn exact_sin(angle: f64) -> Option<f64> {
    if angle == 0.0 {
        Some(0.0)
    } else if angle == consts::FRAC_PI_6 || angle == consts::PI / 6.0 {
        Some(0.5)
    } else if angle == consts::FRAC_PI_2 {
        Some(1.0)
    } else if angle == consts::PI {
        Some(0.0)
    } else {
        None
    }
}

/// The canonical angles with exactly representable cosines.
fn exact_cos(angle: f64) -> Option<f64> {
    if angle == 0.0 {
        Some(1.0)
    } else if angle == consts::FRAC_PI_3 || angle == consts::PI / 3.0 {
        Some(0.5)
    } else if angle == consts::FRAC_PI_2 {
        Some(0.0)
    } else if angle == consts::PI {
        Some(-1.0)
    } else {
        None
    }
}

/// `sin(x)` at a canonical angle.
pub fn sin(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_op(expr, Op::Sin, |operands| {
        exact_sin(operands[0].as_constant()?).map(Expr::num)
    })?;

    step_collector.push(Step::Sin);
    Some(opt)
}

/// `sin(-x) = -sin(x)`
pub fn sin_odd(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_op(expr, Op::Sin, |operands| {
        match &operands[0] {
            Expr::Op(Op::Neg, inner) => {
                Some(Expr::Op(Op::Neg, vec![inner[0].clone().sin()]))
            },
            Expr::Const(c) if c.value < 0.0 => {
                Some(Expr::Op(Op::Neg, vec![Expr::num(-c.value).sin()]))
            },
            _ => None,
        }
    })?;

    step_collector.push(Step::Sin);
    Some(opt)
}

/// `cos(x)` at a canonical angle.
pub fn cos(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_op(expr, Op::Cos, |operands| {
        exact_cos(operands[0].as_constant()?).map(Expr::num)
    })?;

    step_collector.push(Step::Cos);
    Some(opt)
}

/// `cos(-x) = cos(x)`
pub fn cos_even(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_op(expr, Op::Cos, |operands| {
        match &operands[0] {
            Expr::Op(Op::Neg, inner) => Some(inner[0].clone().cos()),
            Expr::Const(c) if c.value < 0.0 => Some(Expr::num(-c.value).cos()),
            _ => None,
        }
    })?;

    step_collector.push(Step::Cos);
    Some(opt)
}

/// Applies all trigonometry rules.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    sin(expr, step_collector)
        .or_else(|| sin_odd(expr, step_collector))
        .or_else(|| cos(expr, step_collector))
        .or_else(|| cos_even(expr, step_collector))
}

#[cfg(test)]
mod tests {
    use crate::consts;
    use crate::var::Variable;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn canonical_angles_are_exact() {
        let pi = Expr::Const(*consts::PI);

        assert_eq!(sin(&pi.clone().sin(), &mut ()), Some(Expr::zero()));
        assert_eq!(cos(&pi.clone().cos(), &mut ()), Some(Expr::num(-1.0)));
        assert_eq!(sin(&Expr::zero().sin(), &mut ()), Some(Expr::zero()));
        assert_eq!(cos(&Expr::zero().cos(), &mut ()), Some(Expr::one()));
        assert_eq!(
            sin(&Expr::num(std::f64::consts::FRAC_PI_2).sin(), &mut ()),
            Some(Expr::one()),
        );
    }

    #[test]
    fn parity() {
        let x = Variable::named("x");

        let negated = Expr::Op(Op::Neg, vec![x.expr()]);
        assert_eq!(
            sin_odd(&negated.clone().sin(), &mut ()),
            Some(Expr::Op(Op::Neg, vec![x.expr().sin()])),
        );
        assert_eq!(cos_even(&negated.cos(), &mut ()), Some(x.expr().cos()));

        assert_eq!(cos_even(&Expr::num(-2.0).cos(), &mut ()), Some(Expr::num(2.0).cos()));
    }
}
