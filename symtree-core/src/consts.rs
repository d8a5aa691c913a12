//! Singleton constants used throughout the library. This module consists of static constants
//! initialized once at startup and never mutated; structural zero and one tests in the
//! simplification rules always compare against these, never against ad hoc float literals.

use crate::expr::Constant;
use once_cell::sync::Lazy;

pub static ZERO: Lazy<Constant> = Lazy::new(|| Constant::new(0.0));

pub static ONE: Lazy<Constant> = Lazy::new(|| Constant::new(1.0));

pub static MINUS_ONE: Lazy<Constant> = Lazy::new(|| Constant::new(-1.0));

pub static ONE_HALF: Lazy<Constant> = Lazy::new(|| Constant::new(0.5));

pub static TWO: Lazy<Constant> = Lazy::new(|| Constant::new(2.0));

/// Euler's number.
pub static E: Lazy<Constant> = Lazy::new(|| Constant::named("e", std::f64::consts::E));

pub static PI: Lazy<Constant> = Lazy::new(|| Constant::named("pi", std::f64::consts::PI));

pub static TAU: Lazy<Constant> = Lazy::new(|| Constant::named("tau", std::f64::consts::TAU));
