//! Type-predicate functions (spec §4.7 "Type"): all return a `Keyword`
//! `true`/`false`, matching the reference's boolean-as-keyword convention.

use crate::ast::NodeKind;

use super::{keyword_node, Args, Context, FunctionRegistry};

pub fn register(r: &mut FunctionRegistry) {
    r.register("iscolor", iscolor);
    r.register("isnumber", isnumber);
    r.register("isstring", isstring);
    r.register("iskeyword", iskeyword);
    r.register("isurl", isurl);
    r.register("ispixel", ispixel);
    r.register("ispercentage", ispercentage);
    r.register("isem", isem);
    r.register("isunit", isunit);
    r.register("isruleset", isruleset);
    r.register("isdefined", isdefined);
}

fn bool_keyword(ctx: &mut Context, node: &crate::ast::AstNode, span: codemap::Span, value: bool) -> crate::error::LessResult<crate::ast::AstNode> {
    let _ = ctx;
    Ok(keyword_node(span, node, if value { "true" } else { "false" }))
}

fn predicate(
    ctx: &mut Context,
    args: &Args,
    span: codemap::Span,
    f: impl Fn(&NodeKind) -> bool,
) -> crate::error::LessResult<crate::ast::AstNode> {
    let node = args
        .first()
        .ok_or_else(|| crate::error::LessError::argument("is*", "argument 1 is required"))?;
    bool_keyword(ctx, node, span, f(&node.kind))
}

fn iscolor(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    predicate(ctx, args, span, |k| matches!(k, NodeKind::Color(_)))
}

fn isnumber(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    predicate(ctx, args, span, |k| matches!(k, NodeKind::Dimension(_)))
}

fn isstring(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    predicate(ctx, args, span, |k| matches!(k, NodeKind::Quoted(_)))
}

fn iskeyword(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    predicate(ctx, args, span, |k| matches!(k, NodeKind::Keyword(_)))
}

fn isurl(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    predicate(ctx, args, span, |k| matches!(k, NodeKind::Url(_)))
}

fn ispixel(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    predicate(ctx, args, span, |k| {
        matches!(k, NodeKind::Dimension(d) if d.unit.numerators() == ["px"] && d.unit.denominators().is_empty())
    })
}

fn ispercentage(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    predicate(ctx, args, span, |k| {
        matches!(k, NodeKind::Dimension(d) if d.unit.numerators() == ["%"] && d.unit.denominators().is_empty())
    })
}

fn isem(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    predicate(ctx, args, span, |k| {
        matches!(k, NodeKind::Dimension(d) if d.unit.numerators() == ["em"] && d.unit.denominators().is_empty())
    })
}

fn isunit(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let unit = args
        .get(1)
        .map(|n| match &n.kind {
            NodeKind::Keyword(k) => k.name.clone(),
            NodeKind::Quoted(q) => q.content.clone(),
            _ => String::new(),
        })
        .unwrap_or_default();
    predicate(ctx, args, span, |k| match k {
        NodeKind::Dimension(d) => d.unit.numerators() == [unit.as_str()] && d.unit.denominators().is_empty(),
        _ => false,
    })
}

fn isruleset(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    predicate(ctx, args, span, |k| matches!(k, NodeKind::DetachedRuleset(_)))
}

/// Not a reference LESS builtin; a small, documented addition that checks
/// whether `@name` resolves in the current scope without raising a
/// `NameError`, useful from guard conditions.
fn isdefined(ctx: &mut Context, args: &Args, span: codemap::Span) -> crate::error::LessResult<crate::ast::AstNode> {
    let name = match args.first().map(|n| &n.kind) {
        Some(NodeKind::Keyword(k)) => k.name.clone(),
        Some(NodeKind::Quoted(q)) => q.content.clone(),
        _ => {
            return Err(crate::error::LessError::argument(
                "isdefined",
                "argument 1 must be a variable name",
            ))
        }
    };
    let found = ctx.frames.lookup_variable(name.trim_start_matches('@')).is_some();
    bool_keyword(ctx, &args[0], span, found)
}
