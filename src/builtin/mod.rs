//! The function registry (spec §4.7): built-ins keyed by lowercased name,
//! plus `register` for plugin-added functions (spec SPEC_FULL §E.1) so a
//! host can extend the registry without the JS bridge feature.

mod color_fns;
mod image_fns;
mod list_fns;
mod math_fns;
mod misc_fns;
mod string_fns;
mod type_fns;

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{AstNode, Call, NodeKind};
use crate::error::{LessError, LessResult};
use crate::eval::{eval_node, Context};

/// One evaluated call argument, already reduced by the evaluator.
pub type Args = [AstNode];

pub type BuiltinFn = dyn Fn(&mut Context, &Args, codemap::Span) -> LessResult<AstNode>;

/// Keyed by lowercased name (spec §4.7 "Keyed by lowercased function
/// name"). Built once per process and shared read-only across compiles
/// (spec §5 "the function registry may be shared when read-only after
/// initialization").
pub struct FunctionRegistry {
    functions: HashMap<String, Rc<BuiltinFn>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut registry = FunctionRegistry {
            functions: HashMap::new(),
        };
        color_fns::register(&mut registry);
        math_fns::register(&mut registry);
        list_fns::register(&mut registry);
        string_fns::register(&mut registry);
        type_fns::register(&mut registry);
        misc_fns::register(&mut registry);
        image_fns::register(&mut registry);
        registry
    }

    /// Register a plugin function. Overwrites any built-in of the same
    /// name, matching the reference's last-registration-wins behavior.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&mut Context, &Args, codemap::Span) -> LessResult<AstNode> + 'static,
    ) {
        self.functions.insert(name.into().to_ascii_lowercase(), Rc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<Rc<BuiltinFn>> {
        self.functions.get(&name.to_ascii_lowercase()).cloned()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatch a `Call` node: evaluate every argument expression, look the
/// name up in the registry, and invoke it. A name with no registered
/// function is not an error — it passes through as a plain CSS function
/// call (spec §4.7 "unknown function" fallback, mirrored from the
/// reference's behavior for e.g. `translate(...)`, `attr(...)`).
pub fn eval_call(ctx: &mut Context, node: &AstNode, call: &Call) -> LessResult<AstNode> {
    let span = node.span();
    let mut evaluated_args = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        let arg_node = AstNode::new(span, node.meta.file.clone(), NodeKind::Expression(arg.clone()));
        evaluated_args.push(eval_node(ctx, &arg_node)?);
    }

    if call.calc {
        let was_in_calc = ctx.in_calc;
        ctx.in_calc = true;
        let mut reevaluated = Vec::with_capacity(evaluated_args.len());
        for arg in &evaluated_args {
            reevaluated.push(eval_node(ctx, arg)?);
        }
        ctx.in_calc = was_in_calc;
        evaluated_args = reevaluated;
    }

    if let Some(f) = ctx.functions.get(&call.name) {
        return f(ctx, &evaluated_args, span);
    }

    pass_through(ctx, node, call, evaluated_args)
}

fn pass_through(ctx: &Context, node: &AstNode, call: &Call, args: Vec<AstNode>) -> LessResult<AstNode> {
    let rendered_args: Vec<String> = args
        .iter()
        .map(|n| crate::emitter::render_value_node(n, ctx.num_precision))
        .collect();
    let text = format!("{}({})", call.name, rendered_args.join(", "));
    Ok(AstNode::new(
        node.span(),
        node.meta.file.clone(),
        NodeKind::Anonymous(crate::ast::Anonymous::text(text)),
    ))
}

// -- shared argument-coercion helpers used by every `*_fns` submodule ------

pub(crate) fn expect_dimension<'a>(
    args: &'a Args,
    idx: usize,
    func: &str,
) -> LessResult<&'a crate::ast::Dimension> {
    match args.get(idx).map(|n| &n.kind) {
        Some(NodeKind::Dimension(d)) => Ok(d),
        Some(other) => Err(LessError::argument(
            func,
            format!("argument {} must be a number, got {}", idx + 1, other.type_name()),
        )),
        None => Err(LessError::argument(func, format!("argument {} is required", idx + 1))),
    }
}

pub(crate) fn expect_color(args: &Args, idx: usize, func: &str) -> LessResult<crate::color::Color> {
    match args.get(idx).map(|n| &n.kind) {
        Some(NodeKind::Color(c)) => Ok(c.clone()),
        Some(other) => Err(LessError::argument(
            func,
            format!("argument {} must be a color, got {}", idx + 1, other.type_name()),
        )),
        None => Err(LessError::argument(func, format!("argument {} is required", idx + 1))),
    }
}

pub(crate) fn optional_number(args: &Args, idx: usize, default: f64) -> f64 {
    match args.get(idx).map(|n| &n.kind) {
        Some(NodeKind::Dimension(d)) => d.value,
        _ => default,
    }
}

/// `%`-scaled `[0, 1]` value: `50%` and `0.5` are both accepted, as the
/// reference's color functions do for saturation/lightness/alpha args.
pub(crate) fn expect_fraction(args: &Args, idx: usize, func: &str) -> LessResult<f64> {
    let d = expect_dimension(args, idx, func)?;
    if d.unit.numerators().first().map(String::as_str) == Some("%") {
        Ok(d.value / 100.0)
    } else {
        Ok(d.value)
    }
}

pub(crate) fn number_node(span: codemap::Span, node: &AstNode, value: f64) -> AstNode {
    AstNode::new(
        span,
        node.meta.file.clone(),
        NodeKind::Dimension(crate::ast::Dimension::unitless(value)),
    )
}

pub(crate) fn color_node(span: codemap::Span, node: &AstNode, color: crate::color::Color) -> AstNode {
    AstNode::new(span, node.meta.file.clone(), NodeKind::Color(color))
}

pub(crate) fn keyword_node(span: codemap::Span, node: &AstNode, text: impl Into<String>) -> AstNode {
    AstNode::new(
        span,
        node.meta.file.clone(),
        NodeKind::Keyword(crate::ast::Keyword::new(text)),
    )
}

pub(crate) fn string_node(span: codemap::Span, node: &AstNode, text: impl Into<String>) -> AstNode {
    AstNode::new(
        span,
        node.meta.file.clone(),
        NodeKind::Quoted(crate::ast::Quoted {
            quote_char: Some('"'),
            content: text.into(),
            escaped: false,
        }),
    )
}
