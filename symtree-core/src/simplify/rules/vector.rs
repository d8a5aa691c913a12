//! Simplification rules for vector arithmetic.
//!
//! Only the base rules live in the core: elementwise addition, scaling by a scalar, the dot
//! product, and the cross product. Dimension mismatches are domain errors and become error
//! nodes, never panics. The full dimensional dispatch table that selects between
//! scalar/vector/matrix rules is an external collaborator; it consumes
//! [`value_type`](crate::expr::Expr::value_type).

use crate::expr::{Expr, ValueType};
use crate::op::Op;
use crate::simplify::step::Step;
use crate::simplify::rules::{do_add, do_multiply, do_op};
use crate::step_collector::StepCollector;

fn as_vector(expr: &Expr) -> Option<&[Expr]> {
    match expr {
        Expr::Vector(elements) => Some(elements),
        _ => None,
    }
}

/// Elementwise addition of vectors of equal length. Adding a vector to a scalar, or vectors of
/// different lengths, is a domain error.
pub fn vector_add(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_add(expr, |terms| {
        if !terms.iter().any(|term| as_vector(term).is_some()) {
            return None;
        }
        if terms.iter().any(|term| term.value_type() != ValueType::Vector) {
            return Some(Expr::error("cannot add vector and scalar"));
        }

        // every term is vector-valued; wait until all of them are vector literals
        let vectors = terms.iter().map(as_vector).collect::<Option<Vec<_>>>()?;
        let len = vectors[0].len();
        if vectors.iter().any(|vector| vector.len() != len) {
            return Some(Expr::error("vector size mismatch in addition"));
        }

        let components = (0..len)
            .map(|idx| {
                vectors
                    .iter()
                    .map(|vector| vector[idx].clone())
                    .reduce(|a, b| a + b)
                    .unwrap()
            })
            .collect();
        Some(Expr::Vector(components))
    })?;

    step_collector.push(Step::VectorAdd);
    Some(opt)
}

/// Scales a vector by the scalar factors of a product: each component is multiplied by all of
/// them.
pub fn vector_scale(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_multiply(expr, |factors| {
        let vectors = factors.iter().filter(|factor| as_vector(factor).is_some()).count();
        if vectors != 1 {
            return None;
        }

        let idx = factors.iter().position(|factor| as_vector(factor).is_some())?;
        let elements = as_vector(&factors[idx])?;
        let scalars = factors
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, factor)| factor.clone())
            .collect::<Vec<_>>();
        if scalars.iter().any(|scalar| scalar.value_type() == ValueType::Vector) {
            return None;
        }

        let components = elements
            .iter()
            .map(|element| {
                scalars
                    .iter()
                    .cloned()
                    .chain(std::iter::once(element.clone()))
                    .reduce(|a, b| a * b)
                    .unwrap()
            })
            .collect();
        Some(Expr::Vector(components))
    })?;

    step_collector.push(Step::VectorScale);
    Some(opt)
}

/// The dot product of two vector literals in a product. Vectors of different lengths are a
/// domain error.
pub fn dot_product(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_multiply(expr, |factors| {
        let mut vector_indices = factors
            .iter()
            .enumerate()
            .filter(|(_, factor)| as_vector(factor).is_some())
            .map(|(idx, _)| idx);
        let first = vector_indices.next()?;
        let second = vector_indices.next()?;

        let lhs = as_vector(&factors[first])?;
        let rhs = as_vector(&factors[second])?;
        if lhs.len() != rhs.len() {
            return Some(Expr::error("vector size mismatch in dot product"));
        }

        let dot = lhs
            .iter()
            .zip(rhs)
            .map(|(a, b)| a.clone() * b.clone())
            .reduce(|a, b| a + b)?;

        let mut rest = factors
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != first && *idx != second)
            .map(|(_, factor)| factor.clone())
            .collect::<Vec<_>>();
        if rest.is_empty() {
            Some(dot)
        } else {
            rest.push(dot);
            Some(Expr::Op(Op::Mul, rest))
        }
    })?;

    step_collector.push(Step::DotProduct);
    Some(opt)
}

/// `-v` negates each component.
pub fn vector_negate(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_op(expr, Op::Neg, |operands| {
        as_vector(&operands[0]).map(|elements| {
            Expr::Vector(elements.iter().map(|element| -element.clone()).collect())
        })
    })?;

    step_collector.push(Step::VectorScale);
    Some(opt)
}

/// The cross product of two 3-vectors. Anything else is a domain error.
pub fn cross_product(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    let opt = do_op(expr, Op::VecMul, |operands| {
        let lhs = as_vector(&operands[0]);
        let rhs = as_vector(&operands[1]);
        let (lhs, rhs) = match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => (lhs, rhs),
            // a scalar operand can never become a vector; a symbolic one still might
            _ => {
                if operands.iter().any(|operand| operand.value_type() != ValueType::Vector) {
                    return Some(Expr::error("cross product requires vectors"));
                }
                return None;
            },
        };
        if lhs.len() != 3 || rhs.len() != 3 {
            return Some(Expr::error("cross product requires 3-dimensional vectors"));
        }

        Some(Expr::Vector(vec![
            lhs[1].clone() * rhs[2].clone() - lhs[2].clone() * rhs[1].clone(),
            lhs[2].clone() * rhs[0].clone() - lhs[0].clone() * rhs[2].clone(),
            lhs[0].clone() * rhs[1].clone() - lhs[1].clone() * rhs[0].clone(),
        ]))
    })?;

    step_collector.push(Step::CrossProduct);
    Some(opt)
}

/// Applies all vector rules.
pub fn all(expr: &Expr, step_collector: &mut dyn StepCollector<Step>) -> Option<Expr> {
    vector_add(expr, step_collector)
        .or_else(|| vector_negate(expr, step_collector))
        .or_else(|| vector_scale(expr, step_collector))
        .or_else(|| dot_product(expr, step_collector))
        .or_else(|| cross_product(expr, step_collector))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn vector(values: [f64; 3]) -> Expr {
        Expr::Vector(values.into_iter().map(Expr::num).collect())
    }

    #[test]
    fn elementwise_addition() {
        let sum = Expr::Op(Op::Add, vec![vector([1.0, 2.0, 3.0]), vector([4.0, 5.0, 6.0])]);
        let added = vector_add(&sum, &mut ()).unwrap();
        assert_eq!(added, vector([5.0, 7.0, 9.0]));
    }

    #[test]
    fn size_mismatch_is_a_domain_error() {
        let sum = Expr::Op(Op::Add, vec![
            vector([1.0, 2.0, 3.0]),
            Expr::Vector(vec![Expr::num(1.0), Expr::num(2.0)]),
        ]);
        assert!(matches!(vector_add(&sum, &mut ()), Some(Expr::Error(_))));
    }

    #[test]
    fn adding_scalar_and_vector_is_a_domain_error() {
        let sum = Expr::Op(Op::Add, vec![vector([1.0, 2.0, 3.0]), Expr::num(1.0)]);
        assert!(matches!(vector_add(&sum, &mut ()), Some(Expr::Error(_))));
    }

    #[test]
    fn scalar_scaling() {
        let product = Expr::Op(Op::Mul, vec![Expr::num(2.0), vector([1.0, 2.0, 3.0])]);
        let scaled = vector_scale(&product, &mut ()).unwrap();
        assert_eq!(scaled, vector([2.0, 4.0, 6.0]));
    }

    #[test]
    fn dot_product_of_equal_lengths() {
        let product = Expr::Op(Op::Mul, vec![vector([1.0, 2.0, 3.0]), vector([4.0, 5.0, 6.0])]);
        let dot = dot_product(&product, &mut ()).unwrap();
        assert_eq!(dot, Expr::num(32.0));

        let mismatched = Expr::Op(Op::Mul, vec![
            vector([1.0, 2.0, 3.0]),
            Expr::Vector(vec![Expr::num(1.0), Expr::num(2.0)]),
        ]);
        assert!(matches!(dot_product(&mismatched, &mut ()), Some(Expr::Error(_))));
    }

    #[test]
    fn cross_product_of_three_vectors() {
        let cross = Expr::op(Op::VecMul, vec![vector([1.0, 0.0, 0.0]), vector([0.0, 1.0, 0.0])]);
        let result = cross_product(&cross, &mut ()).unwrap();
        assert_eq!(result, vector([0.0, 0.0, 1.0]));
    }

    #[test]
    fn cross_product_requires_three_dimensions() {
        let cross = Expr::op(Op::VecMul, vec![
            Expr::Vector(vec![Expr::num(1.0), Expr::num(2.0)]),
            Expr::Vector(vec![Expr::num(3.0), Expr::num(4.0)]),
        ]);
        assert!(matches!(cross_product(&cross, &mut ()), Some(Expr::Error(_))));
    }
}
