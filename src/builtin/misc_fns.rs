//! Miscellaneous functions (spec §4.7 "Misc"): `if`, `boolean`, `default`,
//! unit conversion and inspection.

use crate::ast::{AstNode, Dimension, Keyword, NodeKind};
use crate::error::{LessError, LessResult};
use crate::unit::Unit;

use super::{expect_dimension, keyword_node, Args, Context, FunctionRegistry};

pub fn register(r: &mut FunctionRegistry) {
    r.register("if", if_fn);
    r.register("boolean", boolean);
    r.register("default", default);
    r.register("unit", unit_fn);
    r.register("get-unit", get_unit);
    r.register("convert", convert);
}

/// `if(condition, true-value, false-value?)`. The condition is a guard
/// expression already reduced to a value by `eval_call`; truthiness
/// follows the same rule guards use (spec §4.2 "Guards").
fn if_fn(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let cond = args.first().ok_or_else(|| LessError::argument("if", "argument 1 is required"))?;
    let truthy = node_is_truthy(cond);
    if truthy {
        args.get(1)
            .cloned()
            .ok_or_else(|| LessError::argument("if", "argument 2 (true value) is required"))
    } else {
        Ok(args
            .get(2)
            .cloned()
            .unwrap_or_else(|| AstNode::new(span, cond.meta.file.clone(), NodeKind::Anonymous(crate::ast::Anonymous::text("")))))
    }
}

fn node_is_truthy(node: &AstNode) -> bool {
    match &node.kind {
        NodeKind::Keyword(k) => !k.name.eq_ignore_ascii_case("false"),
        NodeKind::Anonymous(a) => !a.value.is_empty(),
        _ => true,
    }
}

/// `boolean(condition)`: returns the `true`/`false` keyword a guard would
/// have evaluated `condition` to, without a mixin to attach the guard to.
fn boolean(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let node = args.first().ok_or_else(|| LessError::argument("boolean", "argument 1 is required"))?;
    Ok(keyword_node(span, node, if node_is_truthy(node) { "true" } else { "false" }))
}

/// `default()`: true only while a mixin candidate set is resolving a
/// `default()` guard term (spec §4.2); the guard evaluator special-cases
/// that before a call ever reaches here, so this is always the
/// outside-a-guard fallback.
fn default(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let file = args
        .first()
        .map(|n| n.meta.file.clone())
        .ok_or_else(|| LessError::argument("default", "called with no anchoring node in scope"))?;
    Ok(AstNode::new(span, file, NodeKind::Keyword(Keyword::new("false"))))
}

fn unit_fn(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let d = expect_dimension(args, 0, "unit")?;
    let unit = match args.get(1).map(|n| &n.kind) {
        Some(NodeKind::Keyword(k)) => Unit::single(k.name.clone()),
        Some(NodeKind::Quoted(q)) => Unit::single(q.content.clone()),
        None => Unit::unitless(),
        Some(other) => {
            return Err(LessError::argument(
                "unit",
                format!("argument 2 must be a unit keyword, got {}", other.type_name()),
            ))
        }
    };
    Ok(AstNode::new(
        span,
        args[0].meta.file.clone(),
        NodeKind::Dimension(Dimension::new(d.value, unit)),
    ))
}

fn get_unit(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let d = expect_dimension(args, 0, "get-unit")?;
    Ok(AstNode::new(
        span,
        args[0].meta.file.clone(),
        NodeKind::Anonymous(crate::ast::Anonymous::text(d.unit.to_string())),
    ))
}

/// `convert(value, unit)`: like `unit()` but rescales the value using the
/// same conversion tables arithmetic uses, instead of just relabeling it.
fn convert(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let d = expect_dimension(args, 0, "convert")?;
    let target_name = match args.get(1).map(|n| &n.kind) {
        Some(NodeKind::Keyword(k)) => k.name.clone(),
        Some(NodeKind::Quoted(q)) => q.content.clone(),
        _ => return Err(LessError::argument("convert", "argument 2 must be a target unit keyword")),
    };
    let target = Unit::single(target_name);
    let factor = d
        .unit
        .conversion_factor(&target)
        .ok_or_else(|| LessError::argument("convert", format!("cannot convert {} to {}", d.unit, target)))?;
    Ok(AstNode::new(
        span,
        args[0].meta.file.clone(),
        NodeKind::Dimension(Dimension::new(d.value * factor, target)),
    ))
}
