//! Named variable bindings and non-owning references to them.
//!
//! A [`Variable`] is a shared handle to a binding: an optional name plus an optionally assigned
//! value expression. Named variables persist and can be reassigned; anonymous variables wrap a
//! single expression and act as transparent aliases for it.
//!
//! A [`VarRef`] is a non-owning handle. It does not keep the binding alive; instead its liveness
//! can be checked with [`VarRef::upgrade`], and a dangling reference surfaces as an error value
//! at evaluation time rather than undefined behavior.
//!
//! Assignment runs the mandatory circularity check: a value that refers back to the variable
//! being assigned (directly or through other bindings) is rejected, and the rejection is
//! recorded in the binding as an error node naming the variable, so it is never silently
//! accepted.

use crate::expr::Expr;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug)]
struct VarData {
    name: Option<String>,
    value: Option<Expr>,
}

/// A shared owning handle to a variable binding.
#[derive(Clone)]
pub struct Variable(Rc<RefCell<VarData>>);

/// A non-owning reference to a variable binding.
#[derive(Clone)]
pub struct VarRef(Weak<RefCell<VarData>>);

/// The rejection report for an assignment that would have created a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularAssignment {
    /// The name of the variable the rejected assignment targeted.
    pub variable: String,
}

impl fmt::Display for CircularAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circular assignment of variable `{}`", self.variable)
    }
}

impl Variable {
    /// Creates a named variable with no value assigned yet.
    pub fn named(name: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(VarData { name: Some(name.into()), value: None })))
    }

    /// Creates an anonymous variable wrapping the given expression.
    pub fn anonymous(value: Expr) -> Self {
        Self(Rc::new(RefCell::new(VarData { name: None, value: Some(value) })))
    }

    /// The name of this variable, if it has one.
    pub fn name(&self) -> Option<String> {
        self.0.borrow().name.clone()
    }

    /// A clone of the currently assigned value, if any.
    pub fn value(&self) -> Option<Expr> {
        self.0.borrow().value.clone()
    }

    /// Whether two handles point at the same binding.
    pub fn ptr_eq(&self, other: &Variable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Creates a non-owning reference to this binding.
    pub fn reference(&self) -> VarRef {
        VarRef(Rc::downgrade(&self.0))
    }

    /// An expression referring to this variable.
    pub fn expr(&self) -> Expr {
        Expr::Ref(self.reference())
    }

    /// Assigns a new value to this variable, replacing the old one.
    ///
    /// If the new value refers back to this variable, directly or transitively through other
    /// bindings, the assignment is rejected: the stored value becomes an error node recording
    /// the variable, and the rejection is returned to the caller.
    pub fn assign(&self, value: Expr) -> Result<(), CircularAssignment> {
        if value.refers_to(self) {
            let rejection = CircularAssignment {
                variable: self.name().unwrap_or_else(|| String::from("<anonymous>")),
            };
            self.0.borrow_mut().value = Some(Expr::Error(rejection.to_string()));
            return Err(rejection);
        }
        self.0.borrow_mut().value = Some(value);
        Ok(())
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Variable({name})"),
            None => write!(f, "Variable(<anonymous> = {:?})", self.0.borrow().value),
        }
    }
}

impl VarRef {
    /// Attempts to recover an owning handle; `None` if the binding has been dropped.
    pub fn upgrade(&self) -> Option<Variable> {
        self.0.upgrade().map(Variable)
    }

    /// The name of the referenced variable, or `None` if it is anonymous or dropped.
    pub fn name(&self) -> Option<String> {
        self.upgrade().and_then(|var| var.name())
    }
}

impl fmt::Debug for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Ref({name})"),
            None => match self.upgrade() {
                Some(_) => write!(f, "Ref(<anonymous>)"),
                None => write!(f, "Ref(<dropped>)"),
            },
        }
    }
}
