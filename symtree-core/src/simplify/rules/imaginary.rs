//! Simplification rules for expressions involving the imaginary unit, and the hook that moves
//! expressions into a complex context when a real rewrite is impossible.

use crate::consts;
use crate::expr::Expr;
use crate::op::Op;
use crate::simplify::step::Step;
use crate::simplify::rules::{do_op, do_power};
use crate::step_collector::StepCollector;

// i^..
// 0 1 2  3
// 1 i -1 -i
//
// 4 5 6  7
// 1 i -1 -i

fn cycle_index(exponent: &Expr) -> Option<i64> {
    exponent.as_integer().map(|n| n.rem_euclid(4))
}

/// `i^(4n) = 1`
///
/// `i^0` can be handled by `power_zero`, but this rule is more general.
pub fn i_pow_0(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_power(expr, |base, exponent| {
        if matches!(base, Expr::Imag) && cycle_index(exponent)? == 0 {
            Some(Expr::one())
        } else {
            None
        }
    })?;

    step_collector.push(Step::ImaginaryCycle);
    Some(opt)
}

/// `i^(4n+1) = i`
pub fn i_pow_1(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_power(expr, |base, exponent| {
        if matches!(base, Expr::Imag) && cycle_index(exponent)? == 1 {
            Some(Expr::Imag)
        } else {
            None
        }
    })?;

    step_collector.push(Step::ImaginaryCycle);
    Some(opt)
}

/// `i^(4n+2) = -1`
pub fn i_pow_2(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_power(expr, |base, exponent| {
        if matches!(base, Expr::Imag) && cycle_index(exponent)? == 2 {
            Some(Expr::Const(*consts::MINUS_ONE))
        } else {
            None
        }
    })?;

    step_collector.push(Step::ImaginaryCycle);
    Some(opt)
}

/// `i^(4n+3) = -i`
pub fn i_pow_3(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_power(expr, |base, exponent| {
        if matches!(base, Expr::Imag) && cycle_index(exponent)? == 3 {
            Some(Expr::Op(Op::Neg, vec![Expr::Imag]))
        } else {
            None
        }
    })?;

    step_collector.push(Step::ImaginaryCycle);
    Some(opt)
}

/// `sqrt(-c) = i * sqrt(c)`, rewriting a square root with a negative constant radicand into
/// the complex plane instead of leaving it to fold into NaN.
pub fn complex_root(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_op(expr, Op::Sqrt, |operands| {
        let radicand = operands[0].as_constant()?;
        let degree = operands[1].as_constant()?;
        if radicand < 0.0 && degree == 2.0 {
            Some(Expr::Op(Op::Mul, vec![
                Expr::Imag,
                Expr::num(-radicand).sqrt(),
            ]))
        } else {
            None
        }
    })?;

    step_collector.push(Step::ComplexRoot);
    Some(opt)
}

/// Applies all imaginary unit rules.
///
/// All imaginary unit rules will reduce the complexity of the expression.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    i_pow_0(expr, step_collector)
        .or_else(|| i_pow_1(expr, step_collector))
        .or_else(|| i_pow_2(expr, step_collector))
        .or_else(|| i_pow_3(expr, step_collector))
        .or_else(|| complex_root(expr, step_collector))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn the_cycle_of_i() {
        let power = |n: f64| Expr::Imag.pow(Expr::num(n));

        assert_eq!(i_pow_0(&power(4.0), &mut ()), Some(Expr::one()));
        assert_eq!(i_pow_1(&power(5.0), &mut ()), Some(Expr::Imag));
        assert_eq!(i_pow_2(&power(6.0), &mut ()), Some(Expr::num(-1.0)));
        assert_eq!(
            i_pow_3(&power(7.0), &mut ()),
            Some(Expr::Op(Op::Neg, vec![Expr::Imag])),
        );

        // negative exponents walk the same cycle
        assert_eq!(i_pow_2(&power(-2.0), &mut ()), Some(Expr::num(-1.0)));
    }

    #[test]
    fn negative_radicands_move_to_the_complex_plane() {
        let root = Expr::num(-4.0).sqrt();
        assert_eq!(
            complex_root(&root, &mut ()),
            Some(Expr::Op(Op::Mul, vec![Expr::Imag, Expr::num(4.0).sqrt()])),
        );

        assert_eq!(complex_root(&Expr::num(4.0).sqrt(), &mut ()), None);
    }
}
