//! Numeric evaluation of expression trees.
//!
//! Evaluation resolves variable references through the binding layer and folds operations
//! through the registry fold functions. It is what the derivative cross-check tests use to
//! compare a symbolic result against a finite difference, and what a frontend would call to
//! plot an expression.

use crate::expr::Expr;
use crate::op::Op;
use std::fmt;

/// The numeric result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A domain error carried by an error node.
    Domain(String),

    /// A reference whose variable binding has been dropped.
    DanglingReference,

    /// A variable with no assigned value.
    Unbound(String),

    /// A node without a numeric value.
    NotNumeric(&'static str),

    /// Vector operands with incompatible dimensions.
    DimensionMismatch(&'static str),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(message) => write!(f, "{message}"),
            Self::DanglingReference => write!(f, "reference to a dropped variable"),
            Self::Unbound(name) => write!(f, "variable `{name}` has no value"),
            Self::NotNumeric(what) => write!(f, "{what} has no numeric value"),
            Self::DimensionMismatch(what) => write!(f, "{what}"),
        }
    }
}

fn scalar(value: Value, context: &'static str) -> Result<f64, EvalError> {
    match value {
        Value::Scalar(value) => Ok(value),
        Value::Vector(_) => Err(EvalError::DimensionMismatch(context)),
    }
}

fn add(acc: Value, rhs: Value, op: Op) -> Result<Value, EvalError> {
    match (acc, rhs) {
        (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(op.fold(a, b))),
        (Value::Vector(a), Value::Vector(b)) => {
            if a.len() != b.len() {
                return Err(EvalError::DimensionMismatch("vector size mismatch in addition"));
            }
            Ok(Value::Vector(a.into_iter().zip(b).map(|(a, b)| op.fold(a, b)).collect()))
        },
        _ => Err(EvalError::DimensionMismatch("cannot add vector and scalar")),
    }
}

fn multiply(acc: Value, rhs: Value) -> Result<Value, EvalError> {
    match (acc, rhs) {
        (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(a * b)),
        (Value::Scalar(a), Value::Vector(b)) | (Value::Vector(b), Value::Scalar(a)) => {
            Ok(Value::Vector(b.into_iter().map(|value| a * value).collect()))
        },
        (Value::Vector(a), Value::Vector(b)) => {
            if a.len() != b.len() {
                return Err(EvalError::DimensionMismatch("vector size mismatch in dot product"));
            }
            Ok(Value::Scalar(a.into_iter().zip(b).map(|(a, b)| a * b).sum()))
        },
    }
}

/// Evaluates the given expression to a numeric value.
pub fn eval(expr: &Expr) -> Result<Value, EvalError> {
    match expr {
        Expr::Const(c) => Ok(Value::Scalar(c.value)),
        Expr::Imag => Err(EvalError::NotNumeric("the imaginary unit")),
        Expr::Error(message) => Err(EvalError::Domain(message.clone())),
        Expr::Var(var) => match var.value() {
            Some(value) => eval(&value),
            None => Err(EvalError::Unbound(
                var.name().unwrap_or_else(|| String::from("<anonymous>")),
            )),
        },
        Expr::Ref(var) => match var.upgrade() {
            Some(var) => eval(&Expr::Var(var)),
            None => Err(EvalError::DanglingReference),
        },
        Expr::Vector(elements) => {
            let components = elements
                .iter()
                .map(|element| scalar(eval(element)?, "nested vectors are not supported"))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Vector(components))
        },
        Expr::Sequence(_) => Err(EvalError::NotNumeric("a sequence")),
        Expr::Brackets(child, _) => eval(child),
        Expr::Op(op, operands) => match op {
            Op::Add | Op::Sub => {
                let mut values = operands.iter().map(eval);
                let mut acc = values.next().expect("variadic operators have operands")?;
                for value in values {
                    acc = add(acc, value?, *op)?;
                }
                Ok(acc)
            },
            Op::Mul => {
                let mut values = operands.iter().map(eval);
                let mut acc = values.next().expect("variadic operators have operands")?;
                for value in values {
                    acc = multiply(acc, value?)?;
                }
                Ok(acc)
            },
            Op::Neg => match eval(&operands[0])? {
                Value::Scalar(value) => Ok(Value::Scalar(-value)),
                Value::Vector(values) => {
                    Ok(Value::Vector(values.into_iter().map(|value| -value).collect()))
                },
            },
            Op::Div | Op::Pow | Op::Sqrt | Op::Log | Op::Compare => {
                let lhs = scalar(eval(&operands[0])?, "vector operand in a scalar operation")?;
                let rhs = scalar(eval(&operands[1])?, "vector operand in a scalar operation")?;
                Ok(Value::Scalar(op.fold(lhs, rhs)))
            },
            Op::Sin | Op::Cos => {
                let value = scalar(eval(&operands[0])?, "vector operand in a scalar operation")?;
                Ok(Value::Scalar(op.fold(value, 0.0)))
            },
            Op::Diff => Err(EvalError::NotNumeric("an unevaluated differential")),
            Op::VecMul => {
                let lhs = eval(&operands[0])?;
                let rhs = eval(&operands[1])?;
                match (lhs, rhs) {
                    (Value::Vector(a), Value::Vector(b)) if a.len() == 3 && b.len() == 3 => {
                        Ok(Value::Vector(vec![
                            a[1] * b[2] - a[2] * b[1],
                            a[2] * b[0] - a[0] * b[2],
                            a[0] * b[1] - a[1] * b[0],
                        ]))
                    },
                    _ => Err(EvalError::DimensionMismatch(
                        "cross product requires 3-dimensional vectors",
                    )),
                }
            },
        },
    }
}
