//! Symbolic expression trees with canonical simplification and differentiation.
//!
//! # Expression representation
//!
//! Expressions are trees of [`Expr`] nodes, built programmatically through constructors and
//! operator overloads — there is no parser. Associative chains are stored **flat**: the
//! expression `x + (y + z)` canonicalizes to a single [`Expr::Op`] addition node with _three_
//! children, `x`, `y`, and `z`.
//!
//! This is done to make it easier to perform algebraic manipulations on the expression. A
//! common step in simplifying an expression is to combine "like terms", that is, to combine
//! terms that share the same factors (e.g. `x + x = 2x`). This is much easier to do when the
//! terms in question are all at the same level in the tree.
//!
//! # Simplification
//!
//! [`simplify()`] reduces an expression to its canonical form by running rewrite rules to a
//! fixpoint:
//!
//! ```
//! use symtree_core::{simplify, Expr, Variable};
//!
//! let x = Variable::named("x");
//!
//! // x + x + x = 3x
//! let expr = x.expr() + x.expr() + x.expr();
//! assert_eq!(simplify(&expr), Expr::num(3.0) * x.expr());
//! ```
//!
//! The canonical form is deterministic: commutative operands are sorted into a total order
//! (see [`compare`]), so expressions built from the same terms in any insertion order produce
//! identical trees and identical printed forms. Equality ([`compare::is_equal`]) is defined as
//! node-for-node identity of canonical forms — syntactic, not mathematical, equivalence.
//!
//! # Differentiation
//!
//! [`differentiate()`] produces a new tree for the symbolic derivative:
//!
//! ```
//! use symtree_core::{differentiate, simplify, Expr, Variable};
//!
//! let x = Variable::named("x");
//!
//! // d/dx x^2 = 2x
//! let derivative = differentiate(&x.expr().pow(Expr::num(2.0)), &x);
//! assert_eq!(simplify(&derivative), Expr::num(2.0) * x.expr());
//! ```
//!
//! # Errors
//!
//! Domain problems — circular variable assignments, mismatched vector sizes, a logarithm whose
//! base is not constant — are *data*: they become [`Expr::Error`] nodes that flow through
//! later rewrites unchanged and surface wherever the tree is printed. Programming errors —
//! arity violations, an out-of-sync operator registry, differentiating a node form that must
//! never reach the differentiator — panic.

pub mod compare;
pub mod consts;
pub mod derivative;
pub mod eval;
pub mod expand;
pub mod expr;
pub mod op;
pub mod render;
pub mod simplify;
pub mod step_collector;
pub mod token;
pub mod var;

mod canonic;

pub use derivative::differentiate;
pub use eval::{eval, EvalError, Value};
pub use expand::expand;
pub use expr::{BracketMode, Constant, Expr, ValueType};
pub use op::Op;
pub use simplify::{simplify, simplify_with, simplify_with_steps, Step};
pub use step_collector::StepCollector;
pub use token::ChangeScope;
pub use var::{CircularAssignment, Variable, VarRef};
