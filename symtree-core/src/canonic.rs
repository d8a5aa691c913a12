//! Canonical extraction views over multiplicative subtrees.
//!
//! [`CanonicMult`] splits a term into a numeric coefficient — kept as a dividend/divisor pair so
//! explicit quotients merge without rounding through intermediate division — and the list of
//! remaining non-constant factors. Two terms of a sum combine exactly when their factor lists
//! match one-to-one, order-independently.
//!
//! [`CanonicPow`] splits a product into (exponent, base) pairs. Matching bases sum their
//! exponents, which merges like factors within a product and cancels common factors across a
//! quotient.
//!
//! Both are analysis views: they summarize existing nodes without taking ownership of the
//! operand storage. The rules that use them keep the operand list in tombstoned
//! (`Vec<Option<Expr>>`) slots, null out the slots a merge consumes, and compact afterwards.

use crate::compare;
use crate::expr::Expr;
use crate::op::Op;

/// The canonical multiplicative decomposition of one term of a sum.
#[derive(Debug, Clone)]
pub(crate) struct CanonicMult {
    pub dividend: f64,
    pub divisor: f64,
    pub factors: Vec<Expr>,
}

impl CanonicMult {
    /// Extracts the coefficient pair and non-constant factors of the given term.
    pub fn of(term: &Expr) -> Self {
        let mut view = Self { dividend: 1.0, divisor: 1.0, factors: Vec::new() };
        view.collect(term);
        view
    }

    fn collect(&mut self, expr: &Expr) {
        match expr {
            Expr::Const(c) => self.dividend *= c.value,
            Expr::Op(Op::Neg, operands) => {
                self.dividend = -self.dividend;
                self.collect(&operands[0]);
            },
            Expr::Op(Op::Mul, factors) => {
                for factor in factors {
                    self.collect(factor);
                }
            },
            Expr::Op(Op::Div, operands) => match operands[1].as_constant() {
                Some(divisor) => {
                    self.divisor *= divisor;
                    self.collect(&operands[0]);
                },
                None => self.factors.push(expr.clone()),
            },
            other => self.factors.push(other.clone()),
        }
    }

    /// Whether two terms have one-to-one matching factor lists, in any order.
    pub fn matches(&self, other: &Self) -> bool {
        if self.factors.len() != other.factors.len() {
            return false;
        }
        let mut unmatched = other.factors.iter().collect::<Vec<_>>();
        'factors: for factor in &self.factors {
            for idx in 0..unmatched.len() {
                if compare::cmp(factor, unmatched[idx]).is_eq() {
                    unmatched.swap_remove(idx);
                    continue 'factors;
                }
            }
            return false;
        }
        true
    }

    /// Folds another term's coefficient into this one: `a/b + c/d = (a·d + c·b)/(b·d)`.
    pub fn absorb(&mut self, other: &Self) {
        self.dividend = self.dividend * other.divisor + other.dividend * self.divisor;
        self.divisor *= other.divisor;
    }

    /// Rebuilds the term from the merged coefficient and the factor list.
    pub fn into_term(self) -> Expr {
        let coefficient = self.dividend / self.divisor;
        if self.factors.is_empty() {
            return Expr::num(coefficient);
        }

        let product = Expr::Op(Op::Mul, self.factors).downgrade();
        if coefficient == 0.0 {
            Expr::zero()
        } else if coefficient == 1.0 {
            product
        } else if coefficient == -1.0 {
            Expr::Op(Op::Neg, vec![product])
        } else {
            (Expr::num(coefficient) * product).downgrade()
        }
    }
}

/// The (exponent, base) decomposition of a product.
#[derive(Debug, Clone)]
pub(crate) struct CanonicPow {
    pub pairs: Vec<(f64, Expr)>,
}

impl CanonicPow {
    /// Extracts the (exponent, base) pairs of the given expression, treated as a product.
    pub fn of(expr: &Expr) -> Self {
        let mut view = Self { pairs: Vec::new() };
        view.collect(expr);
        view
    }

    fn collect(&mut self, expr: &Expr) {
        match expr {
            Expr::Op(Op::Mul, factors) => {
                for factor in factors {
                    self.collect(factor);
                }
            },
            Expr::Op(Op::Pow, operands) => match operands[1].as_constant() {
                Some(exponent) => self.pairs.push((exponent, operands[0].clone())),
                None => self.pairs.push((1.0, expr.clone())),
            },
            Expr::Op(Op::Sqrt, operands) => match operands[1].as_constant() {
                Some(degree) if degree != 0.0 => {
                    self.pairs.push((degree.recip(), operands[0].clone()))
                },
                _ => self.pairs.push((1.0, expr.clone())),
            },
            other => self.pairs.push((1.0, other.clone())),
        }
    }

    /// Sums the exponents of matching bases. Returns true if any pair was merged.
    pub fn merge(&mut self) -> bool {
        let mut merged = false;
        let mut idx = 0;
        while idx < self.pairs.len() {
            let mut other = idx + 1;
            while other < self.pairs.len() {
                if compare::cmp(&self.pairs[idx].1, &self.pairs[other].1).is_eq() {
                    self.pairs[idx].0 += self.pairs[other].0;
                    self.pairs.swap_remove(other);
                    merged = true;
                } else {
                    other += 1;
                }
            }
            idx += 1;
        }
        merged
    }

    /// Rebuilds one factor from an (exponent, base) pair.
    pub fn factor(exponent: f64, base: Expr) -> Option<Expr> {
        if exponent == 0.0 {
            None
        } else if exponent == 1.0 {
            Some(base)
        } else {
            Some(Expr::Op(Op::Pow, vec![base, Expr::num(exponent)]))
        }
    }

    /// Rebuilds the product from the remaining pairs.
    pub fn into_product(self) -> Expr {
        let factors = self
            .pairs
            .into_iter()
            .filter_map(|(exponent, base)| Self::factor(exponent, base))
            .collect::<Vec<_>>();
        Expr::Op(Op::Mul, factors).downgrade()
    }
}
