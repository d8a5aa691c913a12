//! The rewrite steps reported by the simplification and expansion rules.

/// One applied rewrite. Each rule pushes its own variant into the
/// [`StepCollector`](crate::step_collector::StepCollector), so a collected run reads as the
/// list of rules that fired, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    // normalization
    MinusToPlus,
    DoubleNegation,
    NegateSum,
    DropBrackets,
    InlineAlias,
    FlattenChain,
    ExtractSign,
    SortOperands,

    // addition
    AddZero,
    FoldAddition,
    CombineLikeTerms,

    // multiplication
    MultiplyZero,
    MultiplyOne,
    FoldMultiplication,
    CombineLikeFactors,

    // division
    DivideOne,
    ZeroDividend,
    CancelCommonFactors,

    // powers and roots
    PowerZero,
    PowerOne,
    OneBase,
    ZeroBase,
    NestedPower,

    // complex context
    ImaginaryCycle,
    ComplexRoot,

    // trigonometry
    Sin,
    Cos,

    // numeric folding
    FoldNumeric,

    // vectors
    VectorAdd,
    VectorScale,
    DotProduct,
    CrossProduct,

    // error propagation
    AbsorbError,

    // expansion
    UnfoldPower,
    Distribute,
}
