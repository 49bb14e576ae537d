//! Math functions (spec §4.7 "Math"): single-argument rounding/trig plus
//! the variadic `min`/`max`.

use crate::ast::{AstNode, Dimension, NodeKind};
use crate::error::{LessError, LessResult};
use crate::unit::Unit;

use super::{expect_dimension, Args, Context, FunctionRegistry};

pub fn register(r: &mut FunctionRegistry) {
    r.register("ceil", ceil);
    r.register("floor", floor);
    r.register("round", round);
    r.register("sqrt", sqrt);
    r.register("abs", abs);
    r.register("sin", sin);
    r.register("cos", cos);
    r.register("tan", tan);
    r.register("asin", asin);
    r.register("acos", acos);
    r.register("atan", atan);
    r.register("pi", pi);
    r.register("pow", pow);
    r.register("mod", rem);
    r.register("percentage", percentage);
    r.register("min", min);
    r.register("max", max);
}

fn unary(
    args: &Args,
    func: &'static str,
    f: impl Fn(f64) -> f64,
) -> LessResult<(f64, Unit)> {
    let d = expect_dimension(args, 0, func)?;
    Ok((f(d.value), d.unit.clone()))
}

fn unary_node(args: &Args, func: &'static str, f: impl Fn(f64) -> f64) -> LessResult<AstNode> {
    let (value, unit) = unary(args, func, f)?;
    Ok(AstNode::new(
        args[0].span(),
        args[0].meta.file.clone(),
        NodeKind::Dimension(Dimension::new(value, unit)),
    ))
}

fn ceil(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    unary_node(args, "ceil", f64::ceil)
}

fn floor(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    unary_node(args, "floor", f64::floor)
}

fn round(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let d = expect_dimension(args, 0, "round")?;
    let places = if args.len() > 1 {
        expect_dimension(args, 1, "round")?.value
    } else {
        0.0
    };
    let factor = 10f64.powf(places);
    let value = (d.value * factor).round() / factor;
    Ok(AstNode::new(
        args[0].span(),
        args[0].meta.file.clone(),
        NodeKind::Dimension(Dimension::new(value, d.unit.clone())),
    ))
}

fn sqrt(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    unary_node(args, "sqrt", f64::sqrt)
}

fn abs(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    unary_node(args, "abs", f64::abs)
}

fn sin(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    trig_unitless(args, "sin", f64::sin)
}

fn cos(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    trig_unitless(args, "cos", f64::cos)
}

fn tan(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    trig_unitless(args, "tan", f64::tan)
}

fn asin(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    trig_unitless(args, "asin", f64::asin)
}

fn acos(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    trig_unitless(args, "acos", f64::acos)
}

fn atan(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    trig_unitless(args, "atan", f64::atan)
}

/// Trig functions coerce their argument to radians if it carries an angle
/// unit and always return a unitless number (spec §4.7 "Math").
fn trig_unitless(args: &Args, func: &'static str, f: impl Fn(f64) -> f64) -> LessResult<AstNode> {
    let d = expect_dimension(args, 0, func)?;
    let radians = match d.unit.numerators().first().map(String::as_str) {
        Some("deg") => d.value.to_radians(),
        Some("grad") => d.value * std::f64::consts::PI / 200.0,
        Some("turn") => d.value * std::f64::consts::TAU,
        _ => d.value,
    };
    Ok(AstNode::new(
        args[0].span(),
        args[0].meta.file.clone(),
        NodeKind::Dimension(Dimension::unitless(f(radians))),
    ))
}

fn pi(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let file = args
        .first()
        .map(|n| n.meta.file.clone())
        .ok_or_else(|| LessError::argument("pi", "no reference node to anchor the result to"))?;
    Ok(AstNode::new(
        span,
        file,
        NodeKind::Dimension(Dimension::unitless(std::f64::consts::PI)),
    ))
}

fn pow(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let base = expect_dimension(args, 0, "pow")?;
    let exp = expect_dimension(args, 1, "pow")?.value;
    Ok(AstNode::new(
        args[0].span(),
        args[0].meta.file.clone(),
        NodeKind::Dimension(Dimension::new(base.value.powf(exp), base.unit.clone())),
    ))
}

fn rem(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let a = expect_dimension(args, 0, "mod")?;
    let b = expect_dimension(args, 1, "mod")?;
    Ok(AstNode::new(
        args[0].span(),
        args[0].meta.file.clone(),
        NodeKind::Dimension(Dimension::new(a.value % b.value, a.unit.clone())),
    ))
}

fn percentage(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let d = expect_dimension(args, 0, "percentage")?;
    Ok(AstNode::new(
        args[0].span(),
        args[0].meta.file.clone(),
        NodeKind::Dimension(Dimension::new(d.value * 100.0, Unit::single("%"))),
    ))
}

fn min(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    extreme(args, "min", |a, b| a < b)
}

fn max(ctx: &mut Context, args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    extreme(args, "max", |a, b| a > b)
}

fn extreme(args: &Args, func: &'static str, better: impl Fn(f64, f64) -> bool) -> LessResult<AstNode> {
    if args.is_empty() {
        return Err(LessError::argument(func, "at least one argument is required"));
    }
    let mut best = expect_dimension(args, 0, func)?;
    for idx in 1..args.len() {
        let candidate = expect_dimension(args, idx, func)?;
        if !candidate.unit.is_compatible_with(&best.unit) {
            return Err(LessError::argument(
                func,
                format!("incompatible units between argument 1 and argument {}", idx + 1),
            ));
        }
        if better(candidate.value, best.value) {
            best = candidate;
        }
    }
    Ok(AstNode::new(
        args[0].span(),
        args[0].meta.file.clone(),
        NodeKind::Dimension(best.clone()),
    ))
}
