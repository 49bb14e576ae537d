//! String functions (spec §4.7 "String"): escaping and `%`-style format.

use regex::Regex;

use crate::ast::{AstNode, NodeKind, Quoted};
use crate::error::{LessError, LessResult};

use super::{keyword_node, string_node, Args, Context, FunctionRegistry};

pub fn register(r: &mut FunctionRegistry) {
    r.register("e", escape_passthrough);
    r.register("escape", escape);
    r.register("replace", replace);
    r.register("%", format);
    r.register("format", format);
}

fn text_of(ctx: &Context, node: &AstNode) -> String {
    match &node.kind {
        NodeKind::Quoted(q) => q.content.clone(),
        NodeKind::Keyword(k) => k.name.clone(),
        NodeKind::Anonymous(a) => a.value.clone(),
        NodeKind::Dimension(d) => d.to_css_string(ctx.num_precision),
        other => crate::emitter::render_value_node(
            &AstNode::new(node.span(), node.meta.file.clone(), other.clone()),
            ctx.num_precision,
        ),
    }
}

/// `e("...")`: unquotes a string, marking it `escaped` so the emitter
/// never re-adds quotes (spec §4.7 "e()").
fn escape_passthrough(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let arg = args.first().ok_or_else(|| LessError::argument("e", "argument 1 is required"))?;
    let text = text_of(ctx, arg);
    Ok(AstNode::new(
        span,
        arg.meta.file.clone(),
        NodeKind::Quoted(Quoted {
            quote_char: None,
            content: text,
            escaped: true,
        }),
    ))
}

/// `escape("...")`: URL-escapes a small fixed set of characters, per the
/// reference's `encodeURI`-minus-reserved-chars behavior.
fn escape(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let arg = args.first().ok_or_else(|| LessError::argument("escape", "argument 1 is required"))?;
    let text = text_of(ctx, arg);
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '=' => out.push_str("%3D"),
            ':' => out.push_str("%3A"),
            '#' => out.push_str("%23"),
            ';' => out.push_str("%3B"),
            '(' => out.push_str("%28"),
            ')' => out.push_str("%29"),
            ' ' => out.push_str("%20"),
            other => out.push(other),
        }
    }
    Ok(keyword_node(span, arg, out))
}

fn replace(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let subject_node = args
        .first()
        .ok_or_else(|| LessError::argument("replace", "argument 1 is required"))?;
    let subject = text_of(ctx, subject_node);
    let pattern_node = args
        .get(1)
        .ok_or_else(|| LessError::argument("replace", "argument 2 (pattern) is required"))?;
    let replacement_node = args
        .get(2)
        .ok_or_else(|| LessError::argument("replace", "argument 3 (replacement) is required"))?;
    let flags = args.get(3).map(|n| text_of(ctx, n)).unwrap_or_default();

    let pattern = text_of(ctx, pattern_node);
    let replacement = translate_backreferences(&text_of(ctx, replacement_node));
    let mut builder = regex::RegexBuilder::new(&pattern);
    builder.case_insensitive(flags.contains('i'));
    let re = builder
        .build()
        .map_err(|e| LessError::argument("replace", format!("invalid pattern: {e}")))?;

    let result = if flags.contains('g') {
        re.replace_all(&subject, replacement.as_str()).into_owned()
    } else {
        re.replacen(&subject, 1, replacement.as_str()).into_owned()
    };

    Ok(string_node(span, subject_node, result))
}

/// `$1`-style backreferences used by the reference's `replace()` become
/// `regex`'s `${1}` form.
fn translate_backreferences(replacement: &str) -> String {
    let re = Regex::new(r"\$(\d+)").expect("static pattern");
    re.replace_all(replacement, "$${$1}").into_owned()
}

/// `%("%d of %s", count, noun)`: positional `%s`/`%d`/`%a`/`%%` substitution,
/// matching the reference's sprintf-lite (spec §4.7 "format()/%()").
fn format(ctx: &mut Context, args: &Args, span: codemap::Span) -> LessResult<AstNode> {
    let template_node = args
        .first()
        .ok_or_else(|| LessError::argument("%", "argument 1 (template) is required"))?;
    let template = text_of(ctx, template_node);
    let mut rest = args[1..].iter();
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(spec @ ('s' | 'd' | 'a' | 'S' | 'D' | 'A')) => {
                let value = rest
                    .next()
                    .ok_or_else(|| LessError::argument("%", "not enough arguments for format string"))?;
                let rendered = text_of(ctx, value);
                let rendered = if spec.is_uppercase() {
                    uri_escape(&rendered)
                } else {
                    rendered
                };
                out.push_str(&rendered);
            }
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    Ok(string_node(span, template_node, out))
}

fn uri_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).as_bytes() {
                out.push_str(&format!("%{b:02X}"));
            }
        }
    }
    out
}
