//! Error absorption.
//!
//! Error nodes are terminal: they carry their diagnostic through every later rewrite unchanged,
//! and an operation over one can never produce anything better than the error itself.

use crate::expr::Expr;
use crate::simplify::step::Step;
use crate::step_collector::StepCollector;

/// An operation with an error operand collapses to that error.
pub fn absorb(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = match expr {
        Expr::Op(_, operands) => operands
            .iter()
            .find(|operand| matches!(operand, Expr::Error(_)))
            .cloned(),
        Expr::Brackets(child, _) if matches!(**child, Expr::Error(_)) => Some((**child).clone()),
        _ => None,
    }?;

    step_collector.push(Step::AbsorbError);
    Some(opt)
}

/// Applies all error propagation rules.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    absorb(expr, step_collector)
}

#[cfg(test)]
mod tests {
    use crate::op::Op;
    use crate::var::Variable;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn operations_over_errors_collapse() {
        let x = Variable::named("x");
        let error = Expr::error("vector size mismatch in addition");
        let sum = Expr::Op(Op::Add, vec![x.expr(), error.clone()]);

        assert_eq!(absorb(&sum, &mut ()), Some(error));
    }

    #[test]
    fn plain_operations_are_left_alone() {
        let x = Variable::named("x");
        let sum = Expr::Op(Op::Add, vec![x.expr(), Expr::num(1.0)]);
        assert_eq!(absorb(&sum, &mut ()), None);
    }
}
