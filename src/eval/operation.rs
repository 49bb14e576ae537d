//! Arithmetic evaluation (spec §4.3 "Operations"): math-mode gating, then
//! unit algebra for `Dimension`/`Color` operands.

use codemap::Span;

use crate::ast::{AstNode, Dimension, NodeKind, Operation};
use crate::color::Color;
use crate::common::{MathMode, Op};
use crate::error::{LessError, LessResult};

use super::{eval_node, Context};

pub fn eval_operation(ctx: &mut Context, node: &AstNode, op: &Operation) -> LessResult<AstNode> {
    let span = node.span();

    // Math-mode gating (spec §4.3): division outside parens is left
    // symbolic under `parens-division`; everything is left symbolic
    // outside parens under `parens`; `always` never leaves anything
    // symbolic. `in_calc` always forces symbolic regardless of mode.
    let force_symbolic = ctx.in_calc
        || match ctx.math_mode {
            MathMode::Always => false,
            MathMode::Parens => !op.in_parens,
            MathMode::ParensDivision => op.op == Op::Div && !op.in_parens,
        };

    let left = eval_node(ctx, &op.left)?;
    let right = eval_node(ctx, &op.right)?;

    if force_symbolic {
        return Ok(symbolic(node, op, left, right));
    }

    apply(op.op, left, right, span, ctx.strict_units)
}

fn symbolic(node: &AstNode, op: &Operation, left: AstNode, right: AstNode) -> AstNode {
    AstNode::new(
        node.span(),
        node.meta.file.clone(),
        NodeKind::Operation(Operation {
            op: op.op,
            left: Box::new(left),
            right: Box::new(right),
            is_spaced: op.is_spaced,
            in_parens: op.in_parens,
        }),
    )
}

fn apply(op: Op, left: AstNode, right: AstNode, span: Span, strict_units: bool) -> LessResult<AstNode> {
    match (&left.kind, &right.kind) {
        (NodeKind::Dimension(a), NodeKind::Dimension(b)) => {
            dimension_op(op, a, b, span, strict_units, left.meta.file.clone())
        }
        (NodeKind::Dimension(a), NodeKind::Color(c)) | (NodeKind::Color(c), NodeKind::Dimension(a)) => {
            let scalar = a.value;
            Ok(AstNode::new(
                span,
                left.meta.file.clone(),
                NodeKind::Color(color_scalar_op(op, c, scalar)),
            ))
        }
        (NodeKind::Color(a), NodeKind::Color(b)) => Ok(AstNode::new(
            span,
            left.meta.file.clone(),
            NodeKind::Color(color_color_op(op, a, b)),
        )),
        _ => Err(LessError::syntax(
            format!(
                "cannot operate on a {} and a {}",
                left.kind.type_name(),
                right.kind.type_name()
            ),
            span,
        )),
    }
}

fn dimension_op(
    op: Op,
    a: &Dimension,
    b: &Dimension,
    span: Span,
    strict_units: bool,
    file: std::rc::Rc<crate::pos::FileInfo>,
) -> LessResult<AstNode> {
    let result = match op {
        Op::Mul => Dimension::new(a.value * b.value, a.unit.multiply(&b.unit)),
        Op::Div => Dimension::new(a.value / b.value, a.unit.divide(&b.unit)),
        Op::Add | Op::Sub => {
            if a.unit.is_unitless() {
                let converted = b.value;
                let value = if op == Op::Add {
                    a.value + converted
                } else {
                    a.value - converted
                };
                Dimension::new(value, b.unit.clone())
            } else if b.unit.is_unitless() {
                let value = if op == Op::Add {
                    a.value + b.value
                } else {
                    a.value - b.value
                };
                Dimension::new(value, a.unit.clone())
            } else if !a.unit.is_compatible_with(&b.unit) {
                if strict_units {
                    return Err(LessError::syntax(
                        format!(
                            "Incompatible units. Change the units or use the \"~\" escape syntax. ({} and {})",
                            a.unit, b.unit
                        ),
                        span,
                    ));
                }
                let value = if op == Op::Add {
                    a.value + b.value
                } else {
                    a.value - b.value
                };
                Dimension::new(value, a.unit.clone())
            } else {
                let factor = a.unit.conversion_factor(&b.unit).unwrap_or(1.0);
                let b_in_a = b.value * factor;
                let value = if op == Op::Add {
                    a.value + b_in_a
                } else {
                    a.value - b_in_a
                };
                Dimension::new(value, a.unit.clone())
            }
        }
    };
    Ok(AstNode::new(span, file, NodeKind::Dimension(result)))
}

fn color_scalar_op(op: Op, c: &Color, scalar: f64) -> Color {
    let f = |v: f64| match op {
        Op::Add => v + scalar,
        Op::Sub => v - scalar,
        Op::Mul => v * scalar,
        Op::Div => v / scalar,
    };
    Color::rgba(f(c.r()), f(c.g()), f(c.b()), c.alpha())
}

fn color_color_op(op: Op, a: &Color, b: &Color) -> Color {
    let f = |x: f64, y: f64| match op {
        Op::Add => x + y,
        Op::Sub => x - y,
        Op::Mul => x * y,
        Op::Div => {
            if y == 0.0 {
                x
            } else {
                x / y
            }
        }
    };
    Color::rgba(f(a.r(), b.r()), f(a.g(), b.g()), f(a.b(), b.b()), a.alpha())
}
