//! Image/asset functions (spec §4.7 "Misc"). Real implementations need
//! filesystem and image-codec access the core evaluator deliberately
//! doesn't have (spec §5 non-goals); these register the reference's
//! names so calls don't silently fall through to the unknown-function
//! pass-through, and fail loudly instead of guessing at file contents.

use crate::ast::{AstNode, NodeKind, Url};
use crate::error::{LessError, LessResult};

use super::{Args, Context, FunctionRegistry};

pub fn register(r: &mut FunctionRegistry) {
    r.register("data-uri", data_uri);
    r.register("image-size", unsupported_image_fn);
    r.register("image-width", unsupported_image_fn);
    r.register("image-height", unsupported_image_fn);
    r.register("svg-gradient", svg_gradient_unsupported);
}

/// `data-uri(mimetype?, url)`: without a file manager attached, the core
/// can't read the referenced file, so it passes the URL through
/// unembedded rather than failing the whole compile.
fn data_uri(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let _ = ctx;
    let url_arg = args
        .last()
        .ok_or_else(|| LessError::argument("data-uri", "a url argument is required"))?;
    let file = url_arg.meta.file.clone();
    Ok(AstNode::new(
        span,
        file,
        NodeKind::Url(Url {
            value: Box::new(url_arg.clone()),
            is_evald: true,
        }),
    ))
}

fn unsupported_image_fn(_ctx: &mut Context, _args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    Err(LessError::runtime(
        "image inspection functions require a host-provided file manager, which this core does not embed",
    ))
}

fn svg_gradient_unsupported(_ctx: &mut Context, _args: &Args, _span: codemap::Span) -> LessResult<AstNode> {
    Err(LessError::runtime(
        "svg-gradient() requires SVG generation support this core does not embed",
    ))
}
