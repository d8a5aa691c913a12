//! Simplification rules for expressions involving addition, including combining like terms.

use crate::canonic::CanonicMult;
use crate::expr::Expr;
use crate::op::Op;
use crate::simplify::step::Step;
use crate::simplify::rules::do_add;
use crate::step_collector::StepCollector;

/// `0+a = a`
/// `a+0 = a`
pub fn add_zero(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_add(expr, |terms| {
        let new_terms = terms.iter()
            .filter(|term| !term.is_zero())
            .cloned()
            .collect::<Vec<_>>();

        if new_terms.len() == terms.len() {
            None
        } else {
            Some(Expr::Op(Op::Add, new_terms).downgrade())
        }
    })?;

    // keep the step collection logic outside of the closure to make it implement `Fn`
    step_collector.push(Step::AddZero);
    Some(opt)
}

/// Folds the constants of an addition chain pairwise into a single accumulator constant.
///
/// The accumulator is appended back if any non-constant term remains, and returned directly as
/// the result otherwise.
pub fn fold_constants(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_add(expr, |terms| {
        if terms.iter().filter(|term| term.is_constant()).count() < 2 {
            return None;
        }

        let mut accumulator = None;
        let mut rest = Vec::with_capacity(terms.len());
        for term in terms {
            match (term.as_constant(), accumulator) {
                (Some(value), None) => accumulator = Some(value),
                (Some(value), Some(folded)) => accumulator = Some(Op::Add.fold(folded, value)),
                (None, _) => rest.push(term.clone()),
            }
        }

        let accumulator = accumulator?;
        if rest.is_empty() {
            return Some(Expr::num(accumulator));
        }
        if accumulator != 0.0 {
            rest.push(Expr::num(accumulator));
        }
        Some(Expr::Op(Op::Add, rest).downgrade())
    })?;

    step_collector.push(Step::FoldAddition);
    Some(opt)
}

/// Combines like terms.
///
/// `a+a = 2a`
/// `a+a+a = 3a`
/// `2a+3a = 5a`
/// etc.
///
/// The terms are moved into tombstoned slots; each term's canonical multiplicative view is
/// compared against the views of the later terms, a match folds the coefficients together and
/// nulls out the consumed slot, and the remaining slots are compacted at the end.
pub fn combine_like_terms(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_add(expr, |terms| {
        let mut slots = terms.iter().cloned().map(Some).collect::<Vec<_>>();
        let mut merged_any = false;

        for current in 0..slots.len() {
            let Some(term) = slots[current].as_ref() else { continue };
            let mut view = CanonicMult::of(term);
            if view.factors.is_empty() {
                // plain constants are the fold rule's business
                continue;
            }

            let mut merged = false;
            for next in (current + 1)..slots.len() {
                let Some(other) = slots[next].as_ref() else { continue };
                let other_view = CanonicMult::of(other);
                if view.matches(&other_view) {
                    view.absorb(&other_view);
                    slots[next] = None;
                    merged = true;
                }
            }

            if merged {
                slots[current] = Some(view.into_term());
                merged_any = true;
            }
        }

        if merged_any {
            let remaining = slots.into_iter().flatten().collect::<Vec<_>>();
            Some(Expr::Op(Op::Add, remaining).downgrade())
        } else {
            None
        }
    })?;

    step_collector.push(Step::CombineLikeTerms);
    Some(opt)
}

/// Applies all addition rules.
///
/// All addition rules will reduce the complexity of the expression.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    add_zero(expr, step_collector)
        .or_else(|| fold_constants(expr, step_collector))
        .or_else(|| combine_like_terms(expr, step_collector))
}
