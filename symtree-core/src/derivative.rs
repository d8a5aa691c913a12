//! Symbolic differentiation.
//!
//! [`differentiate`] is a pure function producing a new tree; the input is never mutated. The
//! result is kept minimal as it is built — terms whose derivative is a structural zero are
//! dropped entirely rather than being carried as `0 * ...` — but it is not canonicalized;
//! run the result through [`simplify`](crate::simplify::simplify) for the canonical form.
//!
//! Subtraction chains, equality queries, and unevaluated differentials must never reach the
//! differentiator: callers normalize subtraction into addition first, and the other two are
//! not differentiable forms. Those arms panic. Domain problems — a logarithm whose base
//! depends on the differentiation variable — are data, not bugs, and produce an error node
//! instead.

use crate::compare;
use crate::consts;
use crate::expr::Expr;
use crate::op::Op;
use crate::var::Variable;
use tracing::trace;

/// Returns `true` if the given [`Expr`] is "clearly" zero. This is intended to keep derivative
/// trees small and is not mathematically rigorous.
fn is_trivially_zero(e: &Expr) -> bool {
    match e {
        Expr::Const(c) => c.value == 0.0,
        Expr::Op(Op::Neg, operands) => is_trivially_zero(&operands[0]),
        Expr::Op(Op::Add, terms) => terms.iter().all(is_trivially_zero),
        Expr::Op(Op::Mul, factors) => factors.iter().any(is_trivially_zero),
        Expr::Op(Op::Pow, operands) => {
            is_trivially_zero(&operands[0]) && !is_trivially_zero(&operands[1])
        },
        _ => false,
    }
}

/// Returns `true` if the given [`Expr`] is "clearly" one. This is intended to keep derivative
/// trees small and is not mathematically rigorous.
fn is_trivially_unity(e: &Expr) -> bool {
    match e {
        Expr::Const(c) => c.value == 1.0,
        Expr::Op(Op::Mul, factors) => factors.iter().all(is_trivially_unity),
        Expr::Op(Op::Pow, operands) => {
            is_trivially_zero(&operands[1]) || is_trivially_unity(&operands[0])
        },
        Expr::Op(Op::Add, terms) => terms.len() == 1 && is_trivially_unity(&terms[0]),
        _ => false,
    }
}

/// Helper struct to build a product of expressions while applying basic simplification rules.
/// If any of the expressions are zero, the product is reduced to zero; unity factors are
/// skipped.
#[derive(Default)]
struct MultBuilder(Vec<Expr>);

impl From<MultBuilder> for Expr {
    fn from(value: MultBuilder) -> Self {
        Expr::Op(Op::Mul, value.0).downgrade()
    }
}

impl MultBuilder {
    fn mult(&mut self, e: Expr) {
        if is_trivially_zero(&e) || self.0.first().is_some_and(is_trivially_zero) {
            self.0 = vec![Expr::zero()];
            return;
        }

        if !is_trivially_unity(&e) {
            self.0.push(e)
        }
    }
}

/// Helper struct to build a summation of expressions while applying basic simplification
/// rules. Only non-zero expressions are added to the sum.
#[derive(Default)]
struct SumBuilder(Vec<Expr>);

impl From<SumBuilder> for Expr {
    fn from(value: SumBuilder) -> Self {
        Expr::Op(Op::Add, value.0).downgrade()
    }
}

impl SumBuilder {
    fn add(&mut self, e: Expr) {
        if !is_trivially_zero(&e) {
            self.0.push(e)
        }
    }
}

/// `(f + g)' = f' + g'`
fn sum_rule(terms: &[Expr], with: &Variable) -> Expr {
    let mut sum = SumBuilder::default();
    for term in terms {
        sum.add(differentiate(term, with));
    }
    sum.into()
}

/// `(f * g * h)' = f' * g * h + f * g' * h + f * g * h'`
fn product_rule(factors: &[Expr], with: &Variable) -> Expr {
    let mut outer_sum = SumBuilder::default();

    for derivative_index in 0..factors.len() {
        let mut inner_mult = MultBuilder::default();
        for factor_index in 0..factors.len() {
            let factor = if derivative_index == factor_index {
                differentiate(&factors[derivative_index], with)
            } else {
                factors[factor_index].clone()
            };

            inner_mult.mult(factor);
        }

        outer_sum.add(inner_mult.into());
    }

    outer_sum.into()
}

/// `(f / g)' = (f'* g - f * g') / g^2`, specializing to `f' / g` when `g' = 0`.
fn quotient_rule(dividend: &Expr, divisor: &Expr, with: &Variable) -> Expr {
    let dividend_derivative = differentiate(dividend, with);
    let divisor_derivative = differentiate(divisor, with);

    if is_trivially_zero(&divisor_derivative) {
        if is_trivially_zero(&dividend_derivative) {
            return Expr::zero();
        }
        return Expr::Op(Op::Div, vec![dividend_derivative, divisor.clone()]);
    }

    let mut numerator = SumBuilder::default();
    let mut first = MultBuilder::default();
    first.mult(dividend_derivative);
    first.mult(divisor.clone());
    numerator.add(first.into());

    let mut second = MultBuilder::default();
    second.mult(dividend.clone());
    second.mult(divisor_derivative);
    let second = Expr::from(second);
    if !is_trivially_zero(&second) {
        numerator.add(Expr::Op(Op::Neg, vec![second]));
    }

    Expr::Op(Op::Div, vec![
        numerator.into(),
        divisor.clone().pow(Expr::num(2.0)),
    ])
}

/// `(f^g)' = f^g * (g' * ln f + g * f' / f)`, specializing to the power rule
/// `g * f^(g-1) * f'` when `g' = 0` and to the exponential rule `f^g * ln f * g'` when
/// `f' = 0`. Both derivative branches are tested for structural zero before being included to
/// keep the result minimal.
fn power_rule(base: &Expr, exponent: &Expr, with: &Variable) -> Expr {
    let base_derivative = differentiate(base, with);
    let exponent_derivative = differentiate(exponent, with);
    let base_fixed = is_trivially_zero(&base_derivative);
    let exponent_fixed = is_trivially_zero(&exponent_derivative);

    if base_fixed && exponent_fixed {
        return Expr::zero();
    }

    if exponent_fixed {
        let mut mult = MultBuilder::default();
        mult.mult(exponent.clone());
        mult.mult(Expr::Op(Op::Pow, vec![
            base.clone(),
            exponent.clone() + Expr::num(-1.0),
        ]));
        mult.mult(base_derivative);
        return mult.into();
    }

    if base_fixed {
        let mut mult = MultBuilder::default();
        mult.mult(Expr::Op(Op::Pow, vec![base.clone(), exponent.clone()]));
        mult.mult(base.clone().ln());
        mult.mult(exponent_derivative);
        return mult.into();
    }

    let mut inner = SumBuilder::default();
    let mut exponential_part = MultBuilder::default();
    exponential_part.mult(exponent_derivative);
    exponential_part.mult(base.clone().ln());
    inner.add(exponential_part.into());

    let mut power_part = MultBuilder::default();
    power_part.mult(exponent.clone());
    power_part.mult(Expr::Op(Op::Div, vec![base_derivative, base.clone()]));
    inner.add(power_part.into());

    let mut mult = MultBuilder::default();
    mult.mult(Expr::Op(Op::Pow, vec![base.clone(), exponent.clone()]));
    mult.mult(inner.into());
    mult.into()
}

/// `(log_b f)' = f' / (f * ln b)`; the base must not depend on the differentiation variable.
fn log_rule(base: &Expr, arg: &Expr, with: &Variable) -> Expr {
    let base_derivative = differentiate(base, with);
    if !is_trivially_zero(&base_derivative) {
        return Expr::error("base is not constant");
    }

    let arg_derivative = differentiate(arg, with);
    if is_trivially_zero(&arg_derivative) {
        return Expr::zero();
    }

    let mut denominator = MultBuilder::default();
    denominator.mult(arg.clone());
    if !compare::cmp(base, &Expr::Const(*consts::E)).is_eq() {
        denominator.mult(base.clone().ln());
    }

    Expr::Op(Op::Div, vec![arg_derivative, denominator.into()])
}

/// Computes the derivative of the given expression with respect to the given variable.
///
/// # Panics
///
/// Panics when handed a node form that must never reach the differentiator: a subtraction
/// chain (callers normalize those into additions first), an equality query, an unevaluated
/// differential, or a sequence.
pub fn differentiate(expr: &Expr, with: &Variable) -> Expr {
    trace!(%expr, "differentiate");

    if is_trivially_zero(expr) {
        return Expr::zero();
    }

    let derivative = match expr {
        Expr::Const(_) | Expr::Imag => Expr::zero(),
        Expr::Error(_) => expr.clone(),
        Expr::Var(var) if var.name().is_none() => match var.value() {
            Some(value) => differentiate(&value, with),
            None => Expr::zero(),
        },
        Expr::Var(_) | Expr::Ref(_) => {
            if compare::is_same_variable(expr, with) {
                Expr::one()
            } else {
                Expr::zero()
            }
        },
        Expr::Op(Op::Neg, operands) => {
            let inner = differentiate(&operands[0], with);
            if is_trivially_zero(&inner) {
                Expr::zero()
            } else {
                Expr::Op(Op::Neg, vec![inner])
            }
        },
        Expr::Op(Op::Add, terms) => sum_rule(terms, with),
        Expr::Op(Op::Mul, factors) => product_rule(factors, with),
        Expr::Op(Op::Div, operands) => quotient_rule(&operands[0], &operands[1], with),
        Expr::Op(Op::Pow, operands) => power_rule(&operands[0], &operands[1], with),
        Expr::Op(Op::Sqrt, operands) => {
            // a root is the fractional power f^(1/n)
            let exponent = match operands[1].as_constant() {
                Some(degree) => Expr::num(degree.recip()),
                None => Expr::Op(Op::Div, vec![Expr::one(), operands[1].clone()]),
            };
            power_rule(&operands[0], &exponent, with)
        },
        Expr::Op(Op::Log, operands) => log_rule(&operands[0], &operands[1], with),
        Expr::Op(Op::Sin, operands) => {
            let mut mult = MultBuilder::default();
            mult.mult(operands[0].clone().cos());
            mult.mult(differentiate(&operands[0], with));
            mult.into()
        },
        Expr::Op(Op::Cos, operands) => {
            let mut mult = MultBuilder::default();
            mult.mult(operands[0].clone().sin());
            mult.mult(differentiate(&operands[0], with));
            let inner = Expr::from(mult);
            if is_trivially_zero(&inner) {
                Expr::zero()
            } else {
                Expr::Op(Op::Neg, vec![inner])
            }
        },
        Expr::Op(Op::VecMul, operands) => {
            // (a × b)' = a' × b + a × b'
            let mut sum = SumBuilder::default();
            let lhs_derivative = differentiate(&operands[0], with);
            if !is_trivially_zero(&lhs_derivative) {
                sum.add(Expr::op(Op::VecMul, vec![lhs_derivative, operands[1].clone()]));
            }
            let rhs_derivative = differentiate(&operands[1], with);
            if !is_trivially_zero(&rhs_derivative) {
                sum.add(Expr::op(Op::VecMul, vec![operands[0].clone(), rhs_derivative]));
            }
            sum.into()
        },
        Expr::Vector(elements) => Expr::Vector(
            elements.iter().map(|element| differentiate(element, with)).collect(),
        ),
        Expr::Brackets(child, _) => differentiate(child, with),
        Expr::Op(Op::Sub, _) => {
            panic!("cannot differentiate a subtraction chain; normalize it into an addition first")
        },
        Expr::Op(Op::Compare, _) => panic!("cannot differentiate an equality query"),
        Expr::Op(Op::Diff, _) => panic!("cannot differentiate an unevaluated differential"),
        Expr::Sequence(_) => panic!("cannot differentiate a sequence"),
    };

    if is_trivially_zero(&derivative) {
        Expr::zero()
    } else {
        derivative
    }
}

#[cfg(test)]
mod tests {
    use crate::eval::{eval, Value};
    use crate::simplify::simplify;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng};
    use super::*;

    /// Evaluates the expression at the given value of `x`.
    fn eval_at(expr: &Expr, x: &Variable, value: f64) -> f64 {
        x.assign(Expr::num(value)).unwrap();
        match eval(expr).unwrap() {
            Value::Scalar(result) => result,
            Value::Vector(_) => unreachable!("scalar expression"),
        }
    }

    /// Numerically cross-checks a symbolic derivative against a finite difference at randomly
    /// sampled points.
    fn check_against_finite_difference(expr: &Expr, x: &Variable, points: u32) {
        const DX: f64 = 1e-6;
        const TOL: f64 = 1e-3;

        let symbolic = differentiate(expr, x);
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        for _ in 0..points {
            let at = rng.gen_range(0.5..3.0);
            let expected = (eval_at(expr, x, at + DX) - eval_at(expr, x, at - DX)) / (2.0 * DX);
            let actual = eval_at(&symbolic, x, at);
            assert!(
                (expected - actual).abs() < TOL,
                "at x={at}: symbolic {actual} vs numeric {expected}",
            );
        }
    }

    #[test]
    fn power_rule_produces_the_closed_form() {
        let x = Variable::named("x");

        // d/dx x^2 = 2x
        let derivative = differentiate(&x.expr().pow(Expr::num(2.0)), &x);
        assert_eq!(simplify(&derivative), Expr::num(2.0) * x.expr());
    }

    #[test]
    fn sine_differentiates_to_cosine() {
        let x = Variable::named("x");
        let derivative = differentiate(&x.expr().sin(), &x);
        assert_eq!(derivative, x.expr().cos());
    }

    #[test]
    fn cosine_differentiates_to_negated_sine() {
        let x = Variable::named("x");
        let derivative = differentiate(&x.expr().cos(), &x);
        assert_eq!(derivative, Expr::Op(Op::Neg, vec![x.expr().sin()]));
    }

    #[test]
    fn independent_variables_are_constants() {
        let x = Variable::named("x");
        let a = Variable::named("a");
        let b = Variable::named("b");

        // d/dx (a*x + b) = a
        let line = a.expr() * x.expr() + b.expr();
        assert_eq!(differentiate(&line, &x), a.expr());
    }

    #[test]
    fn constants_and_the_imaginary_unit_vanish() {
        let x = Variable::named("x");
        assert_eq!(differentiate(&Expr::num(4.0), &x), Expr::zero());
        assert_eq!(differentiate(&Expr::Imag, &x), Expr::zero());
    }

    #[test]
    fn quotient_rule_specializes_for_constant_divisors() {
        let x = Variable::named("x");
        let y = Variable::named("y");

        // d/dx (x / y) = 1 / y: the divisor's derivative branch is dropped entirely
        let quotient = Expr::Op(Op::Div, vec![x.expr(), y.expr()]);
        assert_eq!(
            differentiate(&quotient, &x),
            Expr::Op(Op::Div, vec![Expr::one(), y.expr()]),
        );
    }

    #[test]
    fn general_power_rule_covers_symbolic_exponents() {
        let x = Variable::named("x");

        // d/dx x^x = x^x * (ln(x) + x * (1/x))
        let tower = x.expr().pow(x.expr());
        check_against_finite_difference(&tower, &x, 8);
    }

    #[test]
    fn exponential_rule_uses_the_log_of_the_base() {
        let x = Variable::named("x");

        // d/dx 2^x = 2^x * ln(2)
        let exponential = Expr::num(2.0).pow(x.expr());
        assert_eq!(
            differentiate(&exponential, &x),
            Expr::num(2.0).pow(x.expr()) * Expr::num(2.0).ln(),
        );
    }

    #[test]
    fn log_base_must_not_depend_on_the_variable() {
        let x = Variable::named("x");

        let log = x.expr().log(x.expr());
        assert_eq!(differentiate(&log, &x), Expr::error("base is not constant"));

        // ln(x) is fine: d/dx ln(x) = 1/x
        assert_eq!(
            differentiate(&x.expr().ln(), &x),
            Expr::Op(Op::Div, vec![Expr::one(), x.expr()]),
        );
    }

    #[test]
    fn error_nodes_are_absorbing() {
        let x = Variable::named("x");
        let error = Expr::error("vector size mismatch in addition");
        assert_eq!(differentiate(&error, &x), error);
    }

    #[test]
    #[should_panic(expected = "subtraction chain")]
    fn subtraction_chains_must_not_reach_the_differentiator() {
        let x = Variable::named("x");
        let difference = Expr::Op(Op::Sub, vec![x.expr(), Expr::num(1.0)]);
        differentiate(&difference, &x);
    }

    #[test]
    fn numeric_cross_checks() {
        let x = Variable::named("x");

        let polynomial = x.expr().pow(Expr::num(3.0))
            + Expr::num(2.0) * x.expr().pow(Expr::num(2.0))
            + x.expr()
            + Expr::num(1.0);
        check_against_finite_difference(&polynomial, &x, 8);

        let wave = (Expr::num(2.0) * x.expr()).sin() * x.expr().cos();
        check_against_finite_difference(&wave, &x, 8);

        let quotient = Expr::Op(Op::Div, vec![
            x.expr().sin(),
            x.expr() + Expr::num(2.0),
        ]);
        check_against_finite_difference(&quotient, &x, 8);

        let root = x.expr().sqrt();
        check_against_finite_difference(&root, &x, 8);

        let log = x.expr().ln();
        check_against_finite_difference(&log, &x, 8);
    }

    #[test]
    fn end_to_end_chain_rule() {
        let x = Variable::named("x");
        let a = Variable::named("a");
        let b = Variable::named("b");
        let c = Variable::named("c");

        // y = sin(a*x^2 + b*x + c)
        let inner = a.expr() * x.expr().pow(Expr::num(2.0))
            + b.expr() * x.expr()
            + c.expr();
        let y = simplify(&inner.clone().sin());

        let derivative = simplify(&differentiate(&y, &x));

        // expected: cos(a*x^2 + b*x + c) * (2*a*x + b)
        let expected = simplify(&(
            inner.clone().cos()
                * (Expr::num(2.0) * a.expr() * x.expr() + b.expr())
        ));

        assert_eq!(derivative, expected);
        assert_eq!(derivative.to_string(), expected.to_string());
    }
}
