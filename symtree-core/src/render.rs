//! The interface the core exposes to an external renderer.
//!
//! The renderer does two-pass layout: it [`measure`]s every subtree first, then [`draw`]s into
//! the boxes it computed. The contract between the passes is exact — for the same constraints,
//! `draw` places text of exactly the size `measure` returned. Both derive from the same
//! canonical printed form, which is what makes the contract trivially hold.
//!
//! The geometric typesetting subsystem itself (layout boxes, bracket drawing, fraction
//! stacking) is an external collaborator; the core only guarantees this measurement contract
//! plus the per-node [`priority`](crate::expr::Expr::priority),
//! [`has_front_minus`](crate::expr::Expr::has_front_minus),
//! [`is_unary_minus`](crate::expr::Expr::is_unary_minus) and
//! [`value_type`](crate::expr::Expr::value_type) queries, all stable for a canonical node
//! until the next mutation.
//!
//! Measurement results can be memoized in a [`MeasureCache`], a side table keyed by node
//! identity. The cache lives outside the tree: algebraic nodes stay pure values. Because the
//! key is the node's address, the cache is only valid until the tree is mutated; rewriting
//! invalidates it wholesale.

use crate::expr::Expr;
use std::collections::HashMap;

/// Layout constraints: the metrics of the renderer's character cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for Constraints {
    fn default() -> Self {
        Self { char_width: 8.0, line_height: 16.0 }
    }
}

/// A measured size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// The drawing surface the renderer hands to [`draw`].
pub trait Canvas {
    /// Places a run of text with its top-left corner at the given position.
    fn text(&mut self, x: f64, y: f64, text: &str);
}

/// Measures the expression under the given constraints. Pure: no canvas is touched.
pub fn measure(expr: &Expr, constraints: &Constraints) -> Size {
    let rendered = expr.to_string();
    Size {
        width: rendered.chars().count() as f64 * constraints.char_width,
        height: constraints.line_height,
    }
}

/// Draws the expression at the given position and returns the size actually drawn, which
/// equals [`measure`] of the same expression under the same constraints.
pub fn draw(expr: &Expr, canvas: &mut dyn Canvas, x: f64, y: f64, constraints: &Constraints) -> Size {
    let rendered = expr.to_string();
    canvas.text(x, y, &rendered);
    Size {
        width: rendered.chars().count() as f64 * constraints.char_width,
        height: constraints.line_height,
    }
}

/// A memoized measurement table keyed by node identity, to be discarded on any mutation of
/// the measured tree.
#[derive(Debug, Default)]
pub struct MeasureCache {
    sizes: HashMap<usize, Size>,
}

impl MeasureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measures through the cache.
    pub fn measure(&mut self, expr: &Expr, constraints: &Constraints) -> Size {
        let key = expr as *const Expr as usize;
        *self.sizes.entry(key).or_insert_with(|| measure(expr, constraints))
    }

    /// Drops every cached measurement. Call after mutating the measured tree.
    pub fn invalidate(&mut self) {
        self.sizes.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::var::Variable;
    use pretty_assertions::assert_eq;
    use super::*;

    /// A canvas that records every text placement.
    #[derive(Default)]
    struct Recorder {
        placements: Vec<(f64, f64, String)>,
    }

    impl Canvas for Recorder {
        fn text(&mut self, x: f64, y: f64, text: &str) {
            self.placements.push((x, y, text.to_string()));
        }
    }

    #[test]
    fn draw_reproduces_measure() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let constraints = Constraints::default();

        let exprs = [
            x.expr() + y.expr() * Expr::num(2.0),
            (x.expr() + y.expr()).pow(Expr::num(2.0)),
            x.expr().sin() * x.expr().sqrt(),
        ];

        for expr in exprs {
            let measured = measure(&expr, &constraints);
            let mut canvas = Recorder::default();
            let drawn = draw(&expr, &mut canvas, 0.0, 0.0, &constraints);
            assert_eq!(measured, drawn);
            assert_eq!(canvas.placements.len(), 1);
        }
    }

    #[test]
    fn measurement_scales_with_the_printed_form() {
        let x = Variable::named("x");
        let constraints = Constraints::default();

        let small = measure(&x.expr(), &constraints);
        let large = measure(&(x.expr() + Expr::num(1.0)), &constraints);
        assert!(large.width > small.width);
        assert_eq!(small.height, large.height);
    }

    #[test]
    fn cache_returns_consistent_sizes() {
        let x = Variable::named("x");
        let expr = x.expr() + Expr::num(1.0);
        let constraints = Constraints::default();

        let mut cache = MeasureCache::new();
        let first = cache.measure(&expr, &constraints);
        let second = cache.measure(&expr, &constraints);
        assert_eq!(first, second);
        assert_eq!(first, measure(&expr, &constraints));

        cache.invalidate();
        assert_eq!(cache.measure(&expr, &constraints), first);
    }
}
