//! The operator registry.
//!
//! Every operator an [`Expr::Op`](crate::expr::Expr::Op) node can be tagged with is described by
//! one row of a static table: its printed symbol, its priority (used for minimal
//! parenthesization), whether it is commutative (which drives chain flattening and canonical
//! reordering), its expected arity, and a numeric fold function used for constant folding.
//!
//! The table is consulted through [`Op::info`], which checks that the row it finds actually
//! describes the operator it was asked about. A mismatch means the registry and the [`Op`] enum
//! have drifted apart, which is a bug in this crate, so the lookup panics rather than returning
//! anything.

/// An operator tag.
///
/// The discriminant doubles as the index into the registry table, so the order of the variants
/// here must match the order of the rows in `REGISTRY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Op {
    /// Unary negation.
    Neg,

    /// Subtraction of two or more operands: `a - b - c`.
    Sub,

    /// Addition of two or more operands.
    Add,

    /// Multiplication of two or more operands.
    Mul,

    /// Division, `(dividend, divisor)`.
    Div,

    /// Exponentiation, `(base, exponent)`.
    Pow,

    /// Root extraction, `(radicand, degree)`. `sqrt(x)` is `Sqrt` with degree 2.
    Sqrt,

    /// Logarithm, `(base, argument)`.
    Log,

    /// Sine of one operand.
    Sin,

    /// Cosine of one operand.
    Cos,

    /// An equality query between two operands.
    Compare,

    /// An unevaluated differential, `(expression, variable)`.
    Diff,

    /// Vector cross product of two operands.
    VecMul,
}

/// Describes one operator.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    /// The operator this row describes. Checked against the query in [`Op::info`].
    pub op: Op,

    /// The printed symbol or function name.
    pub symbol: &'static str,

    /// Priority for minimal parenthesization; higher binds tighter. Function-call style
    /// operators never need parentheses around themselves and get the highest priority.
    pub priority: u8,

    /// Whether the operands can be reordered and nested chains of this operator merged.
    pub commutative: bool,

    /// Expected operand count. `-1` means variadic (two or more).
    pub arity: i8,

    /// Numeric fold function for constant folding. Unary operators ignore the second operand,
    /// which is passed as a fixed `0.0`.
    pub fold: fn(f64, f64) -> f64,
}

static REGISTRY: [OpInfo; 13] = [
    OpInfo { op: Op::Neg, symbol: "-", priority: 4, commutative: false, arity: 1, fold: |a, _| -a },
    OpInfo { op: Op::Sub, symbol: "-", priority: 2, commutative: false, arity: -1, fold: |a, b| a - b },
    OpInfo { op: Op::Add, symbol: "+", priority: 2, commutative: true, arity: -1, fold: |a, b| a + b },
    OpInfo { op: Op::Mul, symbol: "*", priority: 3, commutative: true, arity: -1, fold: |a, b| a * b },
    OpInfo { op: Op::Div, symbol: "/", priority: 3, commutative: false, arity: 2, fold: |a, b| a / b },
    OpInfo { op: Op::Pow, symbol: "^", priority: 5, commutative: false, arity: 2, fold: |a, b| a.powf(b) },
    OpInfo { op: Op::Sqrt, symbol: "root", priority: 6, commutative: false, arity: 2, fold: |a, b| a.powf(b.recip()) },
    OpInfo { op: Op::Log, symbol: "log", priority: 6, commutative: false, arity: 2, fold: |a, b| b.log(a) },
    OpInfo { op: Op::Sin, symbol: "sin", priority: 6, commutative: false, arity: 1, fold: |a, _| a.sin() },
    OpInfo { op: Op::Cos, symbol: "cos", priority: 6, commutative: false, arity: 1, fold: |a, _| a.cos() },
    OpInfo { op: Op::Compare, symbol: "=", priority: 1, commutative: false, arity: 2, fold: |a, b| if a == b { 1.0 } else { 0.0 } },
    OpInfo { op: Op::Diff, symbol: "diff", priority: 6, commutative: false, arity: 2, fold: |_, _| f64::NAN },
    OpInfo { op: Op::VecMul, symbol: "cross", priority: 6, commutative: false, arity: 2, fold: |_, _| f64::NAN },
];

impl Op {
    /// Looks up the registry row for this operator.
    ///
    /// # Panics
    ///
    /// Panics if the row found at this operator's index describes a different operator. This
    /// indicates the registry table and the [`Op`] enum are out of sync, which is a bug in this
    /// crate.
    pub fn info(self) -> &'static OpInfo {
        let info = &REGISTRY[self as usize];
        assert!(
            info.op == self,
            "operator registry is out of sync at {:?}: found row for {:?}",
            self,
            info.op,
        );
        info
    }

    /// The priority of this operator; higher binds tighter.
    pub fn priority(self) -> u8 {
        self.info().priority
    }

    /// The printed symbol or function name of this operator.
    pub fn symbol(self) -> &'static str {
        self.info().symbol
    }

    /// Whether nested chains of this operator can be flattened and its operands reordered.
    pub fn commutative(self) -> bool {
        self.info().commutative
    }

    /// The expected operand count, or `-1` for variadic operators.
    pub fn arity(self) -> i8 {
        self.info().arity
    }

    /// Whether the given operand count satisfies this operator's arity.
    pub fn accepts(self, len: usize) -> bool {
        match self.arity() {
            -1 => len >= 2,
            n => len == n as usize,
        }
    }

    /// Numerically folds two operands with this operator. Unary operators ignore the second
    /// operand; pass `0.0`.
    pub fn fold(self, a: f64, b: f64) -> f64 {
        (self.info().fold)(a, b)
    }
}
