//! The uniform numeric fold: any remaining operation whose operands are all constants is
//! collapsed through its registry fold function.
//!
//! This is the last rule in the chain, so the exact-value rules (canonical trig angles, the
//! imaginary cycle) always get the first look. Addition and multiplication chains are folded
//! by their own rules, which handle partially constant chains; subtraction is rewritten into
//! addition before it could reach this rule; `Compare` and `Diff` are semantic nodes, and
//! `VecMul` operates on vectors, so none of the three fold.
//!
//! Division folds with IEEE-754 semantics: `x/0` is `±inf` and `0/0` is `NaN`. Every other
//! operator declines a fold that would turn finite operands into NaN (a square root of a
//! negative radicand, a logarithm of a negative argument), leaving the expression symbolic for
//! the complex-context rules or the caller.

use crate::expr::Expr;
use crate::op::Op;
use crate::simplify::step::Step;
use crate::step_collector::StepCollector;

/// Folds an operation over constant operands into a constant.
pub fn fold_numeric(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = match expr {
        Expr::Op(op, operands) => {
            match op {
                Op::Neg | Op::Div | Op::Pow | Op::Sqrt | Op::Log | Op::Sin | Op::Cos => {},
                _ => return None,
            }

            let values = operands
                .iter()
                .map(Expr::as_constant)
                .collect::<Option<Vec<_>>>()?;
            let result = match values.len() {
                1 => op.fold(values[0], 0.0),
                _ => values[1..].iter().fold(values[0], |acc, value| op.fold(acc, *value)),
            };

            let inputs_not_nan = values.iter().all(|value| !value.is_nan());
            if result.is_nan() && inputs_not_nan && *op != Op::Div {
                None
            } else {
                Some(Expr::num(result))
            }
        },
        _ => None,
    }?;

    step_collector.push(Step::FoldNumeric);
    Some(opt)
}

/// Applies all numeric folding rules.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    fold_numeric(expr, step_collector)
}
