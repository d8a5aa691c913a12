//! Bracket opening: distributing products over sums and unfolding small integer powers.
//!
//! Expansion is a separate entry point from simplification, because it deliberately *increases*
//! complexity: `(a + b)^3` unfolds into a product of sums and then into a flat sum of
//! products, which [`simplify`](crate::simplify::simplify) can afterwards collapse into the
//! expanded polynomial. Keeping the two apart lets the simplification fixpoint stay strictly
//! complexity-reducing.
//!
//! Large or symbolic exponents are left untouched; unfolding them would explode the tree (or
//! be meaningless).

use crate::expr::Expr;
use crate::op::Op;
use crate::simplify::rules::{do_multiply, do_power};
use crate::simplify::step::Step;
use crate::step_collector::StepCollector;
use crate::token::ChangeScope;
use tracing::trace;

/// The largest integer exponent [`unfold_power`] is willing to open.
pub const MAX_UNFOLD_EXPONENT: i64 = 8;

/// `a*(b+c) = a*b + a*c`
pub fn distribute(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_multiply(expr, |factors| {
        // find the first sum, and distribute every other factor over it
        let mut factors_to_distribute = factors.to_vec();
        let idx = factors_to_distribute
            .iter()
            .position(|factor| factor.as_op(Op::Add).is_some())?;
        let sum = factors_to_distribute.swap_remove(idx);
        let terms = match sum {
            Expr::Op(Op::Add, terms) => terms,
            _ => unreachable!("position() found a sum"),
        };

        let new_terms = terms
            .into_iter()
            .map(|term| Expr::Op(Op::Mul, factors_to_distribute.clone()).downgrade() * term)
            .collect::<Vec<_>>();
        Some(Expr::Op(Op::Add, new_terms))
    })?;

    // keep the step collection logic outside of the closure to make it implement `Fn`
    step_collector.push(Step::Distribute);
    Some(opt)
}

/// `(a+b)^n`, for a small positive integer `n`, unfolds into an `n`-fold product that
/// [`distribute`] then opens.
pub fn unfold_power(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_power(expr, |base, exponent| {
        if base.as_op(Op::Add).is_none() {
            return None;
        }
        let n = exponent.as_integer()?;
        if !(2..=MAX_UNFOLD_EXPONENT).contains(&n) {
            return None;
        }

        Some(Expr::Op(Op::Mul, vec![base.clone(); n as usize]))
    })?;

    step_collector.push(Step::UnfoldPower);
    Some(opt)
}

fn rules(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    unfold_power(expr, step_collector)
        .or_else(|| distribute(expr, step_collector))
}

/// Opens brackets everywhere in the tree: every small integer power of a sum is unfolded and
/// every product over a sum distributed, to fixpoint. The result is not simplified.
pub fn expand(expr: &Expr) -> Expr {
    expand_with(expr, &mut ())
}

/// Opens brackets, reporting every applied rewrite step to the given collector.
pub fn expand_with(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Expr {
    let mut current = expr.clone();
    let mut scope = ChangeScope::root();

    loop {
        let mut pass = scope.child();
        current = expand_pass(current, &mut pass, step_collector);
        let changed = pass.changed();
        pass.disarm();
        drop(pass);

        trace!(changed, "expansion pass complete");
        if !changed {
            break;
        }
    }

    scope.disarm();
    current
}

fn expand_pass(
    expr: Expr,
    scope: &mut ChangeScope,
    step_collector: &mut dyn StepCollector<Step>,
) -> Expr {
    let expr = match expr {
        Expr::Op(op, operands) => {
            let mut rewritten = Vec::with_capacity(operands.len());
            for operand in operands {
                let mut child = scope.child();
                let operand = expand_pass(operand, &mut child, step_collector);
                child.disarm();
                rewritten.push(operand);
            }
            Expr::Op(op, rewritten)
        },
        other => other,
    };

    match rules(&expr, step_collector) {
        Some(replacement) => {
            scope.mark();
            replacement
        },
        None => expr,
    }
}
