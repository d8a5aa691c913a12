//! Implementation of many simplification rules.
//!
//! Each rule in this module is a function that takes the expression to simplify as an argument,
//! and returns `Some(expr)` with the simplified expression if the rule applies, or `None` if the
//! rule does not apply.

pub mod add;
pub mod division;
pub mod error;
pub mod fold;
pub mod imaginary;
pub mod multiply;
pub mod normalize;
pub mod power;
pub mod trigonometry;
pub mod vector;

use crate::expr::Expr;
use crate::op::Op;
use crate::simplify::step::Step;
use crate::step_collector::StepCollector;

/// If the expression is an operation with the given operator, calls the given transformation
/// function with the operands.
///
/// Returns `Some(expr)` with the transformed expression if a transformation was applied.
pub(crate) fn do_op(
    expr: &Expr,
    op: Op,
    f: impl FnOnce(&[Expr]) -> Option<Expr>,
) -> Option<Expr> {
    if let Expr::Op(tag, operands) = expr {
        if *tag == op {
            return f(operands);
        }
    }

    None
}

/// If the expression is an addition chain, calls the given transformation function with the
/// terms.
pub(crate) fn do_add(expr: &Expr, f: impl FnOnce(&[Expr]) -> Option<Expr>) -> Option<Expr> {
    do_op(expr, Op::Add, f)
}

/// If the expression is a multiplication chain, calls the given transformation function with
/// the factors.
pub(crate) fn do_multiply(expr: &Expr, f: impl FnOnce(&[Expr]) -> Option<Expr>) -> Option<Expr> {
    do_op(expr, Op::Mul, f)
}

/// If the expression is a division, calls the given transformation function with the dividend
/// and divisor.
pub(crate) fn do_divide(
    expr: &Expr,
    f: impl FnOnce(&Expr, &Expr) -> Option<Expr>,
) -> Option<Expr> {
    do_op(expr, Op::Div, |operands| f(&operands[0], &operands[1]))
}

/// If the expression is a power, calls the given transformation function with the base and
/// exponent.
pub(crate) fn do_power(
    expr: &Expr,
    f: impl FnOnce(&Expr, &Expr) -> Option<Expr>,
) -> Option<Expr> {
    do_op(expr, Op::Pow, |operands| f(&operands[0], &operands[1]))
}

/// Applies all rules.
///
/// Error absorption and normalization run first so every later rule sees flattened,
/// sign-normalized chains; the uniform numeric fold runs after the exact-value rules so it
/// cannot shadow them.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    error::all(expr, step_collector)
        .or_else(|| normalize::all(expr, step_collector))
        .or_else(|| add::all(expr, step_collector))
        .or_else(|| multiply::all(expr, step_collector))
        .or_else(|| division::all(expr, step_collector))
        .or_else(|| power::all(expr, step_collector))
        .or_else(|| imaginary::all(expr, step_collector))
        .or_else(|| trigonometry::all(expr, step_collector))
        .or_else(|| vector::all(expr, step_collector))
        .or_else(|| fold::all(expr, step_collector))
}
