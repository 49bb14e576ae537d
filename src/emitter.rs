//! CSS emitter (spec §4.6): walks the flat sequence the to-CSS visitor
//! produced and serializes it deterministically — two-space indentation
//! (none under `compress`), `, `-joined selectors, trimmed dimensions,
//! shortest-form colors, merged declarations with `!important` position
//! preserved at the tag's original source index (spec §9 open item 1).

use crate::ast::{AstNode, AtRuleNode, Declaration, Media, NodeKind, Ruleset};
use crate::common::MergeKind;
use crate::error::LessResult;

/// The subset of `Options` the emitter actually reads. Built from the
/// public `Options` struct at the API boundary.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub precision: usize,
    pub compress: bool,
    /// `Options::url_args` (spec §6.2): appended to every non-`data:` URL
    /// with `?` or `&` as appropriate (spec §4.6).
    pub url_args: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            precision: 8,
            compress: false,
            url_args: String::new(),
        }
    }
}

pub fn emit(top_level: &[AstNode], opts: &EmitOptions) -> LessResult<String> {
    let mut out = String::new();
    let mut first = true;
    for node in top_level {
        let piece = emit_top_level(node, 0, opts)?;
        if piece.is_empty() {
            continue;
        }
        if !first && !opts.compress {
            out.push('\n');
        }
        out.push_str(&piece);
        first = false;
    }
    if !opts.compress && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn emit_top_level(node: &AstNode, depth: usize, opts: &EmitOptions) -> LessResult<String> {
    if !node.meta.is_emittable() {
        return Ok(String::new());
    }
    match &node.kind {
        NodeKind::Ruleset(rs) => emit_ruleset(rs, depth, opts),
        NodeKind::Media(m) => emit_media(m, depth, opts),
        NodeKind::AtRule(ar) => emit_at_rule(ar, depth, opts),
        NodeKind::Comment(c) if !c.is_line_comment => Ok(indent(depth, opts) + "/*" + &c.text + "*/"),
        NodeKind::Import(import) => Ok(emit_import(import, depth, opts)),
        _ => Ok(String::new()),
    }
}

/// Only reached when `Options::process_imports` is false, or for a CSS
/// import the visitor pipeline left untouched: re-emit the literal
/// `@import` statement (spec §6.2 `processImports`).
fn emit_import(import: &crate::ast::Import, depth: usize, opts: &EmitOptions) -> String {
    let path = render_value_node(&import.path, opts.precision);
    let features = import
        .features
        .as_ref()
        .map(|v| render_value_list(v, opts.precision))
        .filter(|s| !s.is_empty())
        .map(|s| format!(" {s}"))
        .unwrap_or_default();
    format!("{}@import {}{};{}", indent(depth, opts), path, features, nl(opts))
}

fn indent(depth: usize, opts: &EmitOptions) -> String {
    if opts.compress {
        String::new()
    } else {
        "  ".repeat(depth)
    }
}

fn nl(opts: &EmitOptions) -> &'static str {
    if opts.compress {
        ""
    } else {
        "\n"
    }
}

fn open_brace(opts: &EmitOptions) -> &'static str {
    if opts.compress {
        "{"
    } else {
        " {"
    }
}

fn emit_ruleset(rs: &Ruleset, depth: usize, opts: &EmitOptions) -> LessResult<String> {
    let decls = emit_declarations(&rs.rules, opts)?;
    if decls.is_empty() {
        return Ok(String::new());
    }
    let selector_text = rs
        .paths
        .iter()
        .map(|path| {
            path.iter()
                .map(|s| s.to_css_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::new();
    out.push_str(&indent(depth, opts));
    out.push_str(&selector_text);
    out.push_str(open_brace(opts));
    out.push_str(nl(opts));
    out.push_str(&decls);
    out.push_str(&indent(depth, opts));
    out.push('}');
    out.push_str(nl(opts));
    Ok(out)
}

fn emit_media(m: &Media, depth: usize, opts: &EmitOptions) -> LessResult<String> {
    let mut body = String::new();
    let mut any = false;
    for node in &m.rules {
        let piece = emit_top_level(node, depth + 1, opts)?;
        if !piece.is_empty() {
            body.push_str(&piece);
            any = true;
        }
    }
    if !any {
        return Ok(String::new());
    }
    let features = render_value_list(&m.features, opts.precision);
    let mut out = String::new();
    out.push_str(&indent(depth, opts));
    out.push_str("@media ");
    out.push_str(&features);
    out.push_str(open_brace(opts));
    out.push_str(nl(opts));
    out.push_str(&body);
    out.push_str(&indent(depth, opts));
    out.push('}');
    out.push_str(nl(opts));
    Ok(out)
}

fn emit_at_rule(ar: &AtRuleNode, depth: usize, opts: &EmitOptions) -> LessResult<String> {
    match &ar.rules {
        None => Ok(format!("{}{} {};{}", indent(depth, opts), ar.name, ar.prelude, nl(opts))),
        Some(rules) => {
            let mut body = String::new();
            for node in rules {
                body.push_str(&emit_top_level(node, depth + 1, opts)?);
            }
            if body.is_empty() && !is_mandatory(ar) {
                return Ok(String::new());
            }
            let mut out = String::new();
            out.push_str(&indent(depth, opts));
            out.push_str(&ar.name);
            if !ar.prelude.is_empty() {
                out.push(' ');
                out.push_str(&ar.prelude);
            }
            out.push_str(open_brace(opts));
            out.push_str(nl(opts));
            out.push_str(&body);
            out.push_str(&indent(depth, opts));
            out.push('}');
            out.push_str(nl(opts));
            Ok(out)
        }
    }
}

fn is_mandatory(ar: &AtRuleNode) -> bool {
    ar.name.eq_ignore_ascii_case("@charset")
}

/// Render a ruleset's own declarations, merging `+`/`+_` tagged ones by
/// name in source order and preserving `!important` at whichever merge
/// member carried it first (spec §9 open item 1: the reference keeps
/// `!important` pinned to its original position in the merged list
/// rather than hoisting it to the end).
fn emit_declarations(rules: &[AstNode], opts: &EmitOptions) -> LessResult<String> {
    let mut groups: Vec<(String, Option<MergeKind>, Vec<(&Declaration, usize)>)> = Vec::new();
    let mut plain: Vec<(usize, String)> = Vec::new();

    for node in rules {
        if !node.meta.is_emittable() {
            continue;
        }
        match &node.kind {
            NodeKind::Declaration(d) if d.merge.is_some() => {
                if let Some(group) = groups.iter_mut().find(|(name, kind, _)| *name == d.name && *kind == d.merge) {
                    group.2.push((d, d.index));
                } else {
                    groups.push((d.name.clone(), d.merge, vec![(d, d.index)]));
                }
            }
            NodeKind::Declaration(d) => {
                plain.push((d.index, emit_declaration(d, opts)?));
            }
            NodeKind::Comment(c) if !c.is_line_comment => {
                plain.push((usize::MAX, format!("{}/*{}*/{}", indent(1, opts), c.text, nl(opts))));
            }
            _ => {}
        }
    }

    let mut merged: Vec<(usize, String)> = Vec::new();
    for (name, kind, mut members) in groups {
        members.sort_by_key(|(_, idx)| *idx);
        let sep = match kind {
            Some(MergeKind::Space) => " ",
            _ => ", ",
        };
        let first_index = members.first().map(|(_, i)| *i).unwrap_or(0);
        let value = members
            .iter()
            .map(|(d, _)| {
                let mut rendered = render_value_node(&d.value, opts.precision);
                if d.important {
                    rendered.push_str(" !important");
                }
                rendered
            })
            .collect::<Vec<_>>()
            .join(sep);
        let value = apply_url_args(&value, &opts.url_args);
        // Each member's own `!important` was already folded into `value`
        // inline above (spec §9 open item 1), so the trailing marker
        // `render_declaration_line` would otherwise append is never needed
        // here.
        merged.push((first_index, render_declaration_line(&name, &value, false, opts)));
    }

    let mut all = plain;
    all.extend(merged);
    all.sort_by_key(|(idx, _)| *idx);

    let mut out = String::new();
    for (_, line) in all {
        out.push_str(&line);
    }
    Ok(out)
}

fn emit_declaration(d: &Declaration, opts: &EmitOptions) -> LessResult<String> {
    if d.variable {
        return Ok(String::new());
    }
    let value = render_value_node(&d.value, opts.precision);
    let value = apply_url_args(&value, &opts.url_args);
    Ok(render_declaration_line(&d.name, &value, d.important, opts))
}

/// Appends `Options::url_args` to every `url(...)` occurrence in an
/// already-rendered value string, with `?` or `&` chosen by whether the
/// URL already has a query string, skipping `data:` URLs entirely
/// (spec §4.6 "`urlArgs` is appended ... not to data URIs").
fn apply_url_args(value: &str, args: &str) -> String {
    if args.is_empty() || !value.contains("url(") {
        return value.to_owned();
    }
    let mut out = String::with_capacity(value.len());
    let mut chars = value.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == 'u' && value[i..].starts_with("url(") {
            let start = i + 4;
            let mut depth = 1usize;
            let mut in_quote: Option<char> = None;
            let mut end = value.len();
            for (j, ch) in value[start..].char_indices() {
                let pos = start + j;
                match in_quote {
                    Some(q) if ch == q => in_quote = None,
                    Some(_) => {}
                    None if ch == '"' || ch == '\'' => in_quote = Some(ch),
                    None if ch == '(' => depth += 1,
                    None if ch == ')' => {
                        depth -= 1;
                        if depth == 0 {
                            end = pos;
                            break;
                        }
                    }
                    None => {}
                }
            }
            let inner = &value[start..end];
            let trimmed = inner.trim();
            let quote = trimmed
                .chars()
                .next()
                .filter(|&c| c == '"' || c == '\'')
                .filter(|&q| trimmed.ends_with(q));
            let unquoted = match quote {
                Some(_) => &trimmed[1..trimmed.len() - 1],
                None => trimmed,
            };
            out.push_str("url(");
            if unquoted.starts_with("data:") {
                out.push_str(inner);
            } else {
                let sep = if unquoted.contains('?') { '&' } else { '?' };
                if let Some(q) = quote {
                    out.push(q);
                    out.push_str(unquoted);
                    out.push(sep);
                    out.push_str(args);
                    out.push(q);
                } else {
                    out.push_str(unquoted);
                    out.push(sep);
                    out.push_str(args);
                }
            }
            out.push(')');
            // Advance the outer iterator past the closing paren we just
            // consumed by hand.
            while let Some(&(k, _)) = chars.peek() {
                if k > end {
                    break;
                }
                chars.next();
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn render_declaration_line(name: &str, value: &str, important: bool, opts: &EmitOptions) -> String {
    let bang = if important { " !important" } else { "" };
    format!("{}{}:{}{}{};{}", indent(1, opts), name, if opts.compress { "" } else { " " }, value, bang, nl(opts))
}

/// The precision [`render_value_node`] falls back to when a caller has no
/// [`EmitOptions`] in scope (builtin pass-through, mixin literal-pattern
/// matching) — the reference's own default (spec §6.2 `numPrecision`).
pub const DEFAULT_PRECISION: usize = 8;

/// Render any value-position node back to CSS text. Used both for final
/// declaration values and for the pass-through text of unrecognized
/// function calls (spec §4.7 "unknown function is a literal CSS call").
/// `precision` is `EmitOptions::precision` when the caller has one in
/// scope, or [`DEFAULT_PRECISION`] otherwise.
pub fn render_value_node(node: &AstNode, precision: usize) -> String {
    match &node.kind {
        NodeKind::Dimension(d) => d.to_css_string(precision),
        NodeKind::Color(c) => c.to_css_string(),
        NodeKind::Keyword(k) => k.name.clone(),
        NodeKind::Quoted(q) => q.to_css_string(),
        NodeKind::Anonymous(a) => a.value.clone(),
        NodeKind::Url(u) => format!("url({})", render_value_node(&u.value, precision)),
        NodeKind::UnicodeDescriptor(u) => u.value.clone(),
        NodeKind::Expression(e) => e
            .children
            .iter()
            .map(|n| render_value_node(n, precision))
            .collect::<Vec<_>>()
            .join(if e.no_spacing { "" } else { " " }),
        NodeKind::Value(v) => render_value_list(v, precision),
        NodeKind::Paren(p) => format!("({})", render_value_node(&p.child, precision)),
        NodeKind::Negative(inner) => format!("-{}", render_value_node(inner, precision)),
        NodeKind::Operation(op) => {
            let sep = if op.is_spaced { format!(" {} ", op.op.as_str()) } else { op.op.as_str().to_owned() };
            format!(
                "{}{}{}",
                render_value_node(&op.left, precision),
                sep,
                render_value_node(&op.right, precision)
            )
        }
        NodeKind::Variable(v) => format!("@{}", v.name),
        NodeKind::VariableCall(v) => format!("@@{}", v.name),
        NodeKind::Property(p) => format!("${}", p.name),
        NodeKind::Reference(r) => r.name.clone(),
        NodeKind::NamespaceValue(n) => format!(
            "{}{}",
            render_value_node(&n.callable, precision),
            n.lookups.iter().map(|l| format!(".{l}")).collect::<String>()
        ),
        NodeKind::Call(call) => {
            let args = call
                .args
                .iter()
                .map(|e| {
                    render_value_node(
                        &AstNode::new(node.meta.span, node.meta.file.clone(), NodeKind::Expression(e.clone())),
                        precision,
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}({})", call.name, args)
        }
        NodeKind::JavaScript(js) => js.expression.clone(),
        NodeKind::Declaration(d) => render_value_node(&d.value, precision),
        NodeKind::Selector(s) => s.to_css_string(),
        NodeKind::Element(e) => e.value.clone(),
        NodeKind::Comment(c) => c.text.clone(),
        NodeKind::Assignment(a) => format!("{}={}", a.key, render_value_node(&a.value, precision)),
        NodeKind::AtRule(ar) => format!("{} {}", ar.name, ar.prelude),
        NodeKind::Media(m) => render_value_list(&m.features, precision),
        NodeKind::Import(_) => String::new(),
        NodeKind::Extend(_) => String::new(),
        NodeKind::DetachedRuleset(_) => String::new(),
        NodeKind::Ruleset(_) | NodeKind::MixinCall(_) | NodeKind::MixinDefinition(_) => String::new(),
    }
}

fn render_value_list(v: &crate::ast::ValueList, precision: usize) -> String {
    v.children
        .iter()
        .map(|e| {
            e.children
                .iter()
                .map(|n| render_value_node(n, precision))
                .collect::<Vec<_>>()
                .join(if e.no_spacing { "" } else { " " })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_args_appends_with_question_mark() {
        assert_eq!(apply_url_args("url(a.png)", "v=1"), "url(a.png?v=1)");
    }

    #[test]
    fn url_args_appends_with_ampersand_when_query_present() {
        assert_eq!(apply_url_args("url(a.png?x=1)", "v=1"), "url(a.png?x=1&v=1)");
    }

    #[test]
    fn url_args_skips_data_uris() {
        let data = "url(data:image/png;base64,AAA==)";
        assert_eq!(apply_url_args(data, "v=1"), data);
    }

    #[test]
    fn url_args_is_noop_when_empty() {
        assert_eq!(apply_url_args("url(a.png)", ""), "url(a.png)");
    }

    #[test]
    fn url_args_handles_quoted_urls() {
        assert_eq!(apply_url_args("url(\"a.png\")", "v=1"), "url(\"a.png?v=1\")");
    }
}
