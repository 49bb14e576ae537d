//! List functions (spec §4.7 "List"): `length`, `extract`, and `range`.
//!
//! `each()` is not registered: in the reference it expands into zero or
//! more sibling rulesets rather than reducing to a single value, which
//! doesn't fit a function's `Node -> Node` signature. Left for the
//! visitor pipeline if it's ever needed (see DESIGN.md).

use crate::ast::{AstNode, Dimension, Expression, NodeKind};
use crate::error::{LessError, LessResult};

use super::{expect_dimension, Args, Context, FunctionRegistry};

pub fn register(r: &mut FunctionRegistry) {
    r.register("length", length);
    r.register("extract", extract);
    r.register("range", range);
}

/// Treats a single `Expression`'s children as a space list, or a `Value`'s
/// `Expression`s as a comma list; any other node is a one-element list.
fn as_items(node: &AstNode) -> Vec<AstNode> {
    match &node.kind {
        NodeKind::Value(v) => v
            .children
            .iter()
            .map(|e| {
                if e.children.len() == 1 {
                    e.children[0].clone()
                } else {
                    AstNode::new(node.span(), node.meta.file.clone(), NodeKind::Expression(e.clone()))
                }
            })
            .collect(),
        NodeKind::Expression(e) if e.children.len() > 1 => e.children.clone(),
        _ => vec![node.clone()],
    }
}

fn length(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let list = args
        .first()
        .ok_or_else(|| LessError::argument("length", "argument 1 is required"))?;
    let count = as_items(list).len();
    Ok(AstNode::new(
        span,
        list.meta.file.clone(),
        NodeKind::Dimension(Dimension::unitless(count as f64)),
    ))
}

fn extract(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let list = args
        .first()
        .ok_or_else(|| LessError::argument("extract", "argument 1 is required"))?;
    let index = expect_dimension(args, 1, "extract")?.value as usize;
    let items = as_items(list);
    if index == 0 || index > items.len() {
        return Err(LessError::argument(
            "extract",
            format!("index {index} is out of range for a list of {} item(s)", items.len()),
        ));
    }
    let _ = span;
    Ok(items[index - 1].clone())
}

fn range(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let (from, to, step, unit) = match args.len() {
        0 => return Err(LessError::argument("range", "at least one argument is required")),
        1 => {
            let to = expect_dimension(args, 0, "range")?;
            (1.0, to.value, 1.0, to.unit.clone())
        }
        2 => {
            let from = expect_dimension(args, 0, "range")?;
            let to = expect_dimension(args, 1, "range")?;
            (from.value, to.value, 1.0, to.unit.clone())
        }
        _ => {
            let from = expect_dimension(args, 0, "range")?;
            let to = expect_dimension(args, 1, "range")?;
            let step = expect_dimension(args, 2, "range")?;
            (from.value, to.value, step.value, to.unit.clone())
        }
    };
    if step == 0.0 {
        return Err(LessError::argument("range", "step must not be zero"));
    }
    let file = args[0].meta.file.clone();
    let mut value = from;
    let mut children = Vec::new();
    while (step > 0.0 && value <= to) || (step < 0.0 && value >= to) {
        children.push(Expression::new(vec![AstNode::new(
            span,
            file.clone(),
            NodeKind::Dimension(Dimension::new(value, unit.clone())),
        )]));
        value += step;
    }
    if children.len() == 1 {
        return Ok(children.into_iter().next().unwrap().children.into_iter().next().unwrap());
    }
    Ok(AstNode::new(
        span,
        file,
        NodeKind::Value(crate::ast::ValueList { children }),
    ))
}
