//! The tree representation of mathematical expressions.
//!
//! Expressions are built programmatically, through the constructors and operator overloads on
//! [`Expr`], and manipulated by rewriting. An [`Expr`] exclusively owns its operand subtrees:
//! every rewrite either keeps a subtree or consumes it and produces a replacement, so there is
//! never a point where an old and a new subtree are both reachable from the same parent.
//!
//! Associative chains are stored flat. The expression `x + (y + z)` is, after canonicalization,
//! a single [`Op::Add`] node with *three* operands, `x`, `y` and `z`. Flat chains are what make
//! like-term merging tractable: terms that can combine are all at the same level of the tree.
//!
//! # Canonical form and equality
//!
//! Determining whether two expressions are mathematically equal is hopeless in general — there
//! are infinitely many ways to write the same expression, and deciding equivalence would itself
//! require simplification. This crate instead defines equality *syntactically over canonical
//! forms*: two expressions are equal when their simplification fixpoints are identical node for
//! node. Because canonicalization sorts the operands of commutative operators into a total
//! order (see [`compare`](crate::compare)), expressions built from the same terms in any
//! insertion order reach the same canonical tree and the same printed form.
//!
//! The [`PartialEq`] implementation on [`Expr`] is the *strict* node-for-node comparison. It
//! never reports false positives, but it only recognizes expressions that have already been
//! brought to the same shape; use [`compare::is_equal`](crate::compare::is_equal) for the
//! canonicalize-then-compare query.

mod iter;

use crate::compare;
use crate::consts;
use crate::op::Op;
use crate::var::{Variable, VarRef};
use iter::ExprIter;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A numeric constant, optionally carrying a display name (`e`, `pi`).
///
/// Two constants are equal when their values are equal under [`f64::total_cmp`]; the name is
/// display metadata only.
#[derive(Debug, Clone, Copy)]
pub struct Constant {
    pub name: Option<&'static str>,
    pub value: f64,
}

impl Constant {
    /// Creates an anonymous constant. Negative zero collapses to zero, so the total order has
    /// a single zero.
    pub fn new(value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        Self { name: None, value }
    }

    /// Creates a named constant.
    pub fn named(name: &'static str, value: f64) -> Self {
        Self { name: Some(name), value }
    }
}

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        self.value.total_cmp(&other.value).is_eq()
    }
}

impl Eq for Constant {}

/// The dimensional classification of an expression's value, consumed by the external
/// multiplication/addition dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Scalar,
    Vector,
    Matrix,
}

/// How a [`Expr::Brackets`] wrapper behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketMode {
    /// Delegates all semantic queries to the child; removed by canonicalization.
    Transparent,

    /// A rewrite barrier: the child simplifies to its own fixpoint but is never merged with
    /// the surrounding expression.
    Opaque,
}

/// A node in an expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A numeric constant, named or anonymous.
    Const(Constant),

    /// The imaginary unit.
    Imag,

    /// A diagnostic value produced by a domain error. Terminal and absorbing: it neither
    /// simplifies nor differentiates further, and an operation over one collapses to it.
    Error(String),

    /// An owning handle to a variable binding. Anonymous bindings are transparent aliases for
    /// their value.
    Var(Variable),

    /// A non-owning reference to a variable binding.
    Ref(VarRef),

    /// An operation, tagged by operator, holding its ordered operands. The operand count must
    /// satisfy the operator's arity after every mutation.
    Op(Op, Vec<Expr>),

    /// A mathematical vector.
    Vector(Vec<Expr>),

    /// An ordered list of expressions with positional semantics.
    Sequence(Vec<Expr>),

    /// A wrapper forcing visual grouping.
    Brackets(Box<Expr>, BracketMode),
}

impl Expr {
    /// Creates an anonymous numeric constant.
    pub fn num(value: f64) -> Self {
        Self::Const(Constant::new(value))
    }

    /// The canonical zero constant.
    pub fn zero() -> Self {
        Self::Const(*consts::ZERO)
    }

    /// The canonical one constant.
    pub fn one() -> Self {
        Self::Const(*consts::ONE)
    }

    /// Creates an error node with the given diagnostic message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Creates an operation node.
    ///
    /// # Panics
    ///
    /// Panics if the operand count does not satisfy the operator's arity. Arity violations are
    /// programming errors, not recoverable conditions.
    pub fn op(op: Op, operands: Vec<Expr>) -> Self {
        assert!(
            op.accepts(operands.len()),
            "{op:?} does not accept {} operand(s)",
            operands.len(),
        );
        Self::Op(op, operands)
    }

    /// Raises this expression to the given power.
    pub fn pow(self, exponent: Expr) -> Self {
        Self::op(Op::Pow, vec![self, exponent])
    }

    /// The square root of this expression.
    pub fn sqrt(self) -> Self {
        Self::op(Op::Sqrt, vec![self, Self::Const(*consts::TWO)])
    }

    /// The `degree`-th root of this expression.
    pub fn nth_root(self, degree: Expr) -> Self {
        Self::op(Op::Sqrt, vec![self, degree])
    }

    /// The logarithm of this expression in the given base.
    pub fn log(self, base: Expr) -> Self {
        Self::op(Op::Log, vec![base, self])
    }

    /// The natural logarithm of this expression.
    pub fn ln(self) -> Self {
        Self::op(Op::Log, vec![Self::Const(*consts::E), self])
    }

    /// The sine of this expression.
    pub fn sin(self) -> Self {
        Self::op(Op::Sin, vec![self])
    }

    /// The cosine of this expression.
    pub fn cos(self) -> Self {
        Self::op(Op::Cos, vec![self])
    }

    /// An equality query between this expression and another.
    pub fn compare(self, rhs: Expr) -> Self {
        Self::op(Op::Compare, vec![self, rhs])
    }

    /// An unevaluated differential of this expression with respect to the given variable.
    pub fn diff(self, var: &Variable) -> Self {
        Self::op(Op::Diff, vec![self, var.expr()])
    }

    /// Wraps this expression in brackets.
    pub fn grouped(self, mode: BracketMode) -> Self {
        Self::Brackets(Box::new(self), mode)
    }

    /// Trivially downgrades the expression into a simpler form.
    ///
    /// Rewrites can leave an [`Op::Add`] or [`Op::Mul`] with zero or one operand behind. This
    /// collapses those into the single operand, or into the operator's identity constant when
    /// no operands remain.
    pub(crate) fn downgrade(self) -> Self {
        match self {
            Self::Op(Op::Add, mut terms) => {
                if terms.is_empty() {
                    Self::zero()
                } else if terms.len() == 1 {
                    terms.remove(0)
                } else {
                    Self::Op(Op::Add, terms)
                }
            },
            Self::Op(Op::Mul, mut factors) => {
                if factors.is_empty() {
                    Self::one()
                } else if factors.len() == 1 {
                    factors.remove(0)
                } else {
                    Self::Op(Op::Mul, factors)
                }
            },
            _ => self,
        }
    }

    /// If the expression is a constant, returns its value.
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Self::Const(c) => Some(c.value),
            _ => None,
        }
    }

    /// Returns true if the expression is a constant.
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Const(_))
    }

    /// If the expression is a constant holding a mathematical integer, returns it.
    pub fn as_integer(&self) -> Option<i64> {
        let value = self.as_constant()?;
        if value.is_finite() && value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
            Some(value as i64)
        } else {
            None
        }
    }

    /// If the expression is an operation with the given operator, returns its operands.
    pub fn as_op(&self, op: Op) -> Option<&[Expr]> {
        match self {
            Self::Op(tag, operands) if *tag == op => Some(operands),
            _ => None,
        }
    }

    /// If the expression names a variable (a binding or a reference to one), returns the name.
    pub fn as_symbol(&self) -> Option<String> {
        match self {
            Self::Var(var) => var.name(),
            Self::Ref(var) => var.name(),
            _ => None,
        }
    }

    /// Structural zero test against the canonical zero constant.
    pub fn is_zero(&self) -> bool {
        compare::cmp(self, &Self::zero()).is_eq()
    }

    /// Structural one test against the canonical one constant.
    pub fn is_one(&self) -> bool {
        compare::cmp(self, &Self::one()).is_eq()
    }

    /// Structural test against the canonical minus-one constant.
    pub fn is_minus_one(&self) -> bool {
        compare::cmp(self, &Self::Const(*consts::MINUS_ONE)).is_eq()
    }

    /// Returns true if the expression is a unary minus node.
    pub fn is_unary_minus(&self) -> bool {
        matches!(self, Self::Op(Op::Neg, _))
    }

    /// The priority of this node for minimal parenthesization; higher binds tighter. Leaves
    /// and self-grouping nodes never need parentheses around their operands.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Op(op, _) => op.priority(),
            Self::Sequence(_) => 0,
            _ => 10,
        }
    }

    /// Whether the canonical printed form of this node begins with a negation sign.
    pub fn has_front_minus(&self) -> bool {
        match self {
            Self::Const(c) => c.value < 0.0,
            Self::Op(Op::Neg, _) => true,
            Self::Op(Op::Add | Op::Sub | Op::Mul | Op::Div, operands) => {
                operands.first().is_some_and(Self::has_front_minus)
            },
            _ => false,
        }
    }

    /// The dimensional classification of this expression's value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Vector(_) => ValueType::Vector,
            Self::Op(Op::VecMul, _) => ValueType::Vector,
            Self::Op(Op::Neg, operands) => operands[0].value_type(),
            Self::Op(Op::Add | Op::Sub | Op::Mul, operands) => {
                if operands.iter().any(|operand| operand.value_type() == ValueType::Vector) {
                    ValueType::Vector
                } else {
                    ValueType::Scalar
                }
            },
            Self::Op(Op::Div, operands) => operands[0].value_type(),
            Self::Var(var) => var.value().map_or(ValueType::Scalar, |value| value.value_type()),
            Self::Ref(var) => var
                .upgrade()
                .and_then(|var| var.value())
                .map_or(ValueType::Scalar, |value| value.value_type()),
            Self::Brackets(child, _) => child.value_type(),
            _ => ValueType::Scalar,
        }
    }

    /// Whether this expression refers to the given variable binding, directly or transitively
    /// through the values of other bindings.
    pub fn refers_to(&self, var: &Variable) -> bool {
        match self {
            Self::Var(this) => {
                this.ptr_eq(var) || this.value().is_some_and(|value| value.refers_to(var))
            },
            Self::Ref(this) => this.upgrade().is_some_and(|this| {
                this.ptr_eq(var) || this.value().is_some_and(|value| value.refers_to(var))
            }),
            Self::Op(_, operands) | Self::Vector(operands) | Self::Sequence(operands) => {
                operands.iter().any(|operand| operand.refers_to(var))
            },
            Self::Brackets(child, _) => child.refers_to(var),
            _ => false,
        }
    }

    /// Sorts a sequence and removes adjacent equal elements. Non-sequence expressions are
    /// returned unchanged.
    pub fn unique(self) -> Self {
        match self {
            Self::Sequence(mut elements) => {
                elements.sort_by(compare::cmp);
                elements.dedup_by(|a, b| compare::cmp(a, b).is_eq());
                Self::Sequence(elements)
            },
            other => other,
        }
    }

    /// Returns an iterator that traverses the tree of expressions in left-to-right post-order
    /// (i.e. depth-first).
    pub fn post_order_iter(&self) -> ExprIter {
        ExprIter::new(self)
    }
}

/// Strict node-for-node equality, delegating through transparent wrappers. See the
/// [module-level documentation](self).
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        compare::cmp(self, other).is_eq()
    }
}

impl Eq for Expr {}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::num(value)
    }
}

impl From<&Variable> for Expr {
    fn from(var: &Variable) -> Self {
        var.expr()
    }
}

/// Adds two expressions. No simplification is done, except that two constants fold and a mix
/// of addition chains and other operands is combined into one flat chain.
impl Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Const(lhs), Self::Const(rhs)) => Self::num(lhs.value + rhs.value),
            (Self::Op(Op::Add, mut terms), Self::Op(Op::Add, rhs_terms)) => {
                terms.extend(rhs_terms);
                Self::Op(Op::Add, terms)
            },
            (Self::Op(Op::Add, mut terms), other) | (other, Self::Op(Op::Add, mut terms)) => {
                terms.push(other);
                Self::Op(Op::Add, terms)
            },
            (lhs, rhs) => Self::Op(Op::Add, vec![lhs, rhs]),
        }
    }
}

/// Subtracts one expression from another, building a subtraction chain. Canonicalization
/// rewrites the chain into an addition of negated operands.
impl Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Const(lhs), Self::Const(rhs)) => Self::num(lhs.value - rhs.value),
            (Self::Op(Op::Sub, mut operands), rhs) => {
                operands.push(rhs);
                Self::Op(Op::Sub, operands)
            },
            (lhs, rhs) => Self::Op(Op::Sub, vec![lhs, rhs]),
        }
    }
}

/// Multiplies two expressions. No simplification is done, except that two constants fold and a
/// mix of multiplication chains and other operands is combined into one flat chain.
impl Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Const(lhs), Self::Const(rhs)) => Self::num(lhs.value * rhs.value),
            (Self::Op(Op::Mul, mut factors), Self::Op(Op::Mul, rhs_factors)) => {
                factors.extend(rhs_factors);
                Self::Op(Op::Mul, factors)
            },
            (Self::Op(Op::Mul, mut factors), other) | (other, Self::Op(Op::Mul, mut factors)) => {
                factors.push(other);
                Self::Op(Op::Mul, factors)
            },
            (lhs, rhs) => Self::Op(Op::Mul, vec![lhs, rhs]),
        }
    }
}

impl Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        match (self, rhs) {
            (Self::Const(lhs), Self::Const(rhs)) => Self::num(lhs.value / rhs.value),
            (lhs, rhs) => Self::Op(Op::Div, vec![lhs, rhs]),
        }
    }
}

/// Negates an expression. Constants are negated in place; everything else is wrapped in a
/// unary minus node.
impl Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::Const(c) => Self::num(-c.value),
            expr => Self::Op(Op::Neg, vec![expr]),
        }
    }
}

fn fmt_operand(f: &mut fmt::Formatter<'_>, operand: &Expr, parent: u8, first: bool) -> fmt::Result {
    if operand.priority() < parent || (!first && operand.has_front_minus()) {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(c) => match c.name {
                Some(name) => write!(f, "{name}"),
                None => write!(f, "{}", c.value),
            },
            Self::Imag => write!(f, "i"),
            Self::Error(message) => write!(f, "[error: {message}]"),
            Self::Var(var) => match var.name() {
                Some(name) => write!(f, "{name}"),
                None => match var.value() {
                    Some(value) => write!(f, "{value}"),
                    None => write!(f, "<anonymous>"),
                },
            },
            Self::Ref(var) => match var.upgrade() {
                Some(target) => match target.name() {
                    Some(name) => write!(f, "{name}"),
                    None => match target.value() {
                        Some(value) => write!(f, "{value}"),
                        None => write!(f, "<anonymous>"),
                    },
                },
                None => write!(f, "<dropped>"),
            },
            Self::Op(Op::Neg, operands) => {
                write!(f, "-")?;
                fmt_operand(f, &operands[0], Op::Neg.priority(), false)
            },
            Self::Op(Op::Add, terms) => {
                let mut iter = terms.iter();
                if let Some(term) = iter.next() {
                    fmt_operand(f, term, Op::Add.priority(), true)?;
                    for term in iter {
                        match term {
                            Expr::Op(Op::Neg, inner) => {
                                write!(f, " - ")?;
                                fmt_operand(f, &inner[0], Op::Mul.priority(), false)?;
                            },
                            Expr::Const(c) if c.value < 0.0 => {
                                write!(f, " - {}", -c.value)?;
                            },
                            term => {
                                write!(f, " + ")?;
                                fmt_operand(f, term, Op::Add.priority(), true)?;
                            },
                        }
                    }
                }
                Ok(())
            },
            Self::Op(Op::Sub, operands) => {
                let mut iter = operands.iter();
                if let Some(first) = iter.next() {
                    fmt_operand(f, first, Op::Sub.priority(), true)?;
                    for operand in iter {
                        write!(f, " - ")?;
                        if operand.priority() <= Op::Sub.priority() || operand.has_front_minus() {
                            write!(f, "({operand})")?;
                        } else {
                            write!(f, "{operand}")?;
                        }
                    }
                }
                Ok(())
            },
            Self::Op(Op::Mul, factors) => {
                let mut iter = factors.iter();
                if let Some(factor) = iter.next() {
                    fmt_operand(f, factor, Op::Mul.priority(), true)?;
                    for factor in iter {
                        write!(f, " * ")?;
                        fmt_operand(f, factor, Op::Mul.priority(), false)?;
                    }
                }
                Ok(())
            },
            Self::Op(Op::Div, operands) => {
                fmt_operand(f, &operands[0], Op::Div.priority(), true)?;
                write!(f, " / ")?;
                let divisor = &operands[1];
                if divisor.priority() <= Op::Div.priority() || divisor.has_front_minus() {
                    write!(f, "({divisor})")
                } else {
                    write!(f, "{divisor}")
                }
            },
            Self::Op(Op::Pow, operands) => {
                let (base, exponent) = (&operands[0], &operands[1]);
                if base.priority() <= Op::Pow.priority() || base.has_front_minus() {
                    write!(f, "({base})")?;
                } else {
                    write!(f, "{base}")?;
                }
                write!(f, "^")?;
                if exponent.priority() <= Op::Pow.priority() || exponent.has_front_minus() {
                    write!(f, "({exponent})")
                } else {
                    write!(f, "{exponent}")
                }
            },
            Self::Op(Op::Sqrt, operands) => {
                if compare::cmp(&operands[1], &Expr::Const(*consts::TWO)).is_eq() {
                    write!(f, "sqrt({})", operands[0])
                } else {
                    write!(f, "root({}, {})", operands[0], operands[1])
                }
            },
            Self::Op(Op::Log, operands) => {
                if compare::cmp(&operands[0], &Expr::Const(*consts::E)).is_eq() {
                    write!(f, "ln({})", operands[1])
                } else {
                    write!(f, "log({}, {})", operands[0], operands[1])
                }
            },
            Self::Op(Op::Sin, operands) => write!(f, "sin({})", operands[0]),
            Self::Op(Op::Cos, operands) => write!(f, "cos({})", operands[0]),
            Self::Op(Op::Compare, operands) => {
                write!(f, "{} = {}", operands[0], operands[1])
            },
            Self::Op(Op::Diff, operands) => {
                write!(f, "diff({}, {})", operands[0], operands[1])
            },
            Self::Op(Op::VecMul, operands) => {
                write!(f, "cross({}, {})", operands[0], operands[1])
            },
            Self::Vector(elements) => {
                write!(f, "[")?;
                let mut iter = elements.iter();
                if let Some(element) = iter.next() {
                    write!(f, "{element}")?;
                    for element in iter {
                        write!(f, ", {element}")?;
                    }
                }
                write!(f, "]")
            },
            Self::Sequence(elements) => {
                let mut iter = elements.iter();
                if let Some(element) = iter.next() {
                    write!(f, "{element}")?;
                    for element in iter {
                        write!(f, ", {element}")?;
                    }
                }
                Ok(())
            },
            Self::Brackets(child, _) => write!(f, "({child})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::var::Variable;
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn overloads_flatten_chains() {
        let x = Variable::named("x");
        let expr = x.expr() + Expr::num(1.0) + Expr::num(2.0) * x.expr() * Expr::num(3.0);

        match &expr {
            Expr::Op(Op::Add, terms) => {
                assert_eq!(terms.len(), 3);
                assert!(matches!(&terms[2], Expr::Op(Op::Mul, factors) if factors.len() == 3));
            },
            other => panic!("expected a flat addition chain, got {other:?}"),
        }
    }

    #[test]
    fn constants_fold_in_overloads() {
        assert_eq!(Expr::num(2.0) + Expr::num(3.0), Expr::num(5.0));
        assert_eq!(Expr::num(2.0) * Expr::num(3.0), Expr::num(6.0));
        assert_eq!(-Expr::num(2.0), Expr::num(-2.0));
    }

    #[test]
    #[should_panic(expected = "does not accept")]
    fn arity_violations_are_fatal() {
        Expr::op(Op::Pow, vec![Expr::num(2.0)]);
    }

    #[test]
    fn front_minus() {
        let x = Variable::named("x");
        assert!(Expr::num(-2.0).has_front_minus());
        assert!((-x.expr()).has_front_minus());
        assert!((Expr::num(-2.0) * x.expr()).has_front_minus());
        assert!(!x.expr().has_front_minus());
        assert!(x.expr().is_unary_minus() == false);
        assert!((-x.expr()).is_unary_minus());
    }

    #[test]
    fn value_types() {
        let x = Variable::named("x");
        let vector = Expr::Vector(vec![Expr::num(1.0), Expr::num(2.0), Expr::num(3.0)]);

        assert_eq!(x.expr().value_type(), ValueType::Scalar);
        assert_eq!(vector.value_type(), ValueType::Vector);
        assert_eq!((Expr::num(2.0) * vector).value_type(), ValueType::Vector);
    }

    #[test]
    fn display_uses_minimal_parenthesization() {
        let x = Variable::named("x");
        let y = Variable::named("y");

        let sum = x.expr() + y.expr();
        assert_eq!(sum.to_string(), "x + y");

        let product = (x.expr() + y.expr()) * Expr::num(2.0);
        assert_eq!(product.to_string(), "(x + y) * 2");

        let power = (x.expr() + y.expr()).pow(Expr::num(2.0));
        assert_eq!(power.to_string(), "(x + y)^2");

        let nested_power = x.expr().pow(y.expr()).pow(Expr::num(2.0));
        assert_eq!(nested_power.to_string(), "(x^y)^2");

        assert_eq!(x.expr().sin().to_string(), "sin(x)");
        assert_eq!(x.expr().sqrt().to_string(), "sqrt(x)");
        assert_eq!(x.expr().ln().to_string(), "ln(x)");
    }

    #[test]
    fn display_strips_signs_in_sums() {
        let x = Variable::named("x");
        let sum = x.expr() + (-Variable::named("y").expr()) + Expr::num(-3.0);
        assert_eq!(sum.to_string(), "x - y - 3");
    }

    #[test]
    fn sequence_unique_sorts_and_dedups() {
        let x = Variable::named("x");
        let seq = Expr::Sequence(vec![
            x.expr(),
            Expr::num(2.0),
            x.expr(),
            Expr::num(1.0),
            Expr::num(2.0),
        ]);

        match seq.unique() {
            Expr::Sequence(elements) => assert_eq!(elements.len(), 3),
            other => panic!("expected a sequence, got {other:?}"),
        }
    }
}
