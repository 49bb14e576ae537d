//! To-CSS visitor (spec §4.5.4): extracts nested rulesets, media blocks
//! and generic at-rules into the flat top-level sequence the emitter
//! walks, bubbling the enclosing selector down into any at-rule nested
//! directly inside a ruleset (spec §4.3 "At-rule bubbling") and
//! combining consecutive `@media` levels left with nothing but another
//! `@media` inside them into one conjunction (spec §8 scenario 6).
//!
//! Declaration merging (`+`/`+_`) and `!important` position preservation
//! are left to [`crate::emitter`], since they're really a rendering-time
//! concern (joining value text) rather than a tree shape change.

use crate::ast::{AstNode, AtRuleNode, Expression, Keyword, Media, NodeKind, NodeMeta, Ruleset, Selector, ValueList};
use crate::error::LessResult;

/// Flatten an evaluated, join-selector'd root ruleset into the sequence
/// of top-level items the emitter walks.
pub fn flatten(root: AstNode) -> LessResult<Vec<AstNode>> {
    match root.kind {
        NodeKind::Ruleset(rs) => Ok(flatten_rules(rs.rules, None)),
        other => Ok(vec![AstNode::new(root.meta.span, root.meta.file, other)]),
    }
}

/// `ctx_paths`: when `Some`, plain declarations and comments found among
/// `rules` are lexically governed by this selector — we're walking the
/// body of an at-rule that sits directly inside a ruleset with this
/// selector — and must be wrapped in a synthetic ruleset carrying it
/// before the emitter sees them. Consecutive plain nodes are grouped into
/// one wrapped ruleset each, so interleaving with nested selectors keeps
/// its relative order.
fn flatten_rules(rules: Vec<AstNode>, ctx_paths: Option<&[Vec<Selector>]>) -> Vec<AstNode> {
    let mut out = Vec::new();
    let mut run: Vec<AstNode> = Vec::new();

    for node in rules {
        if !node.meta.is_emittable() {
            continue;
        }
        match node.kind {
            NodeKind::Ruleset(rs) => {
                flush_run(&mut run, &mut out, ctx_paths);
                out.extend(flatten_ruleset(node.meta, rs));
            }
            NodeKind::Media(m) => {
                flush_run(&mut run, &mut out, ctx_paths);
                out.push(flatten_media(node.meta, m, ctx_paths));
            }
            NodeKind::AtRule(ar) if ar.rules.is_some() => {
                flush_run(&mut run, &mut out, ctx_paths);
                out.push(flatten_at_rule(node.meta, ar, ctx_paths));
            }
            other => run.push(AstNode::new(node.meta.span, node.meta.file, other)),
        }
    }
    flush_run(&mut run, &mut out, ctx_paths);
    out
}

fn flush_run(run: &mut Vec<AstNode>, out: &mut Vec<AstNode>, ctx_paths: Option<&[Vec<Selector>]>) {
    if run.is_empty() {
        return;
    }
    let taken = std::mem::take(run);
    match ctx_paths {
        Some(paths) if !paths.is_empty() => out.push(wrap_in_ruleset(paths.to_vec(), taken)),
        _ => out.extend(taken),
    }
}

fn wrap_in_ruleset(paths: Vec<Vec<Selector>>, rules: Vec<AstNode>) -> AstNode {
    let span = rules[0].meta.span;
    let file = rules[0].meta.file.clone();
    AstNode::new(
        span,
        file,
        NodeKind::Ruleset(Ruleset {
            selectors: Vec::new(),
            rules,
            allow_imports: false,
            strict_imports: false,
            is_root: false,
            first_root: false,
            allow_root: false,
            root_in_media: true,
            extend_on_every_path: false,
            paths,
        }),
    )
}

fn flatten_ruleset(_meta: NodeMeta, rs: Ruleset) -> Vec<AstNode> {
    let paths = rs.paths;
    flatten_rules(rs.rules, Some(&paths))
}

fn flatten_media(meta: NodeMeta, mut m: Media, ctx_paths: Option<&[Vec<Selector>]>) -> AstNode {
    m.rules = flatten_rules(m.rules, ctx_paths);

    // A nested `@media` that bubbled up to become this block's *only*
    // content (its enclosing ruleset had nothing else to contribute) is
    // really one combined query, not two nested blocks (spec §8
    // scenario 6: `@media (portrait) { .s { @media (tv) { ... } } }`
    // becomes `@media (portrait) and (tv) { .s { ... } }`).
    if m.rules.len() == 1 {
        if let NodeKind::Media(inner) = &m.rules[0].kind {
            let features = combine_features(&meta, &m.features, &inner.features);
            let rules = inner.rules.clone();
            return AstNode::new(meta.span, meta.file, NodeKind::Media(Media { features, rules }));
        }
    }
    AstNode::new(meta.span, meta.file, NodeKind::Media(m))
}

/// `outer and inner`, the reference's one conjunction rule shared by
/// `@media`, `@supports` and `@container` bubbling (spec §4.3 "at-rule
/// bubbling", SPEC_FULL §E.2's `Features::and`) — a two-level nest of
/// the same at-rule kind with nothing else alongside the inner one
/// collapses into a single query joined by a literal `and` keyword.
fn features_and(outer: &str, inner: &str) -> String {
    format!("{outer} and {inner}")
}

fn combine_features(meta: &NodeMeta, outer: &ValueList, inner: &ValueList) -> ValueList {
    let outer_text = render_feature_list(meta, outer);
    let inner_text = render_feature_list(meta, inner);
    let anon = |text: String| {
        AstNode::new(meta.span, meta.file.clone(), NodeKind::Anonymous(crate::ast::Anonymous { value: text, ruleset_like: false }))
    };
    let keyword = AstNode::new(meta.span, meta.file.clone(), NodeKind::Keyword(Keyword::new("and")));
    ValueList {
        children: vec![Expression {
            children: vec![anon(outer_text), keyword, anon(inner_text)],
            no_spacing: false,
        }],
    }
}

fn render_feature_list(meta: &NodeMeta, v: &ValueList) -> String {
    crate::emitter::render_value_node(
        &AstNode::new(meta.span, meta.file.clone(), NodeKind::Value(v.clone())),
        crate::emitter::DEFAULT_PRECISION,
    )
}

/// `@supports`/`@container`, the two other conditional-group at-rules
/// that nest and bubble the same way `@media` does (spec §4.3 "at-rule
/// bubbling" is written generically over "conditional group rules", not
/// `@media` specifically).
fn is_conjoinable_at_rule(name: &str) -> bool {
    name.eq_ignore_ascii_case("@supports") || name.eq_ignore_ascii_case("@container")
}

fn flatten_at_rule(meta: NodeMeta, mut ar: AtRuleNode, ctx_paths: Option<&[Vec<Selector>]>) -> AstNode {
    if let Some(rules) = ar.rules.take() {
        ar.rules = Some(flatten_rules(rules, ctx_paths));
    }

    // Same collapse `flatten_media` does for `@media`: a nested at-rule
    // of the same conjoinable kind, bubbled up to become this block's
    // sole content, merges into one query instead of staying nested
    // (spec §8 scenario 6's pattern, generalized past `@media`).
    if is_conjoinable_at_rule(&ar.name) {
        if let Some(rules) = &ar.rules {
            if rules.len() == 1 {
                if let NodeKind::AtRule(inner) = &rules[0].kind {
                    if inner.name.eq_ignore_ascii_case(&ar.name) {
                        let prelude = features_and(&ar.prelude, &inner.prelude);
                        let rules = inner.rules.clone();
                        return AstNode::new(
                            meta.span,
                            meta.file,
                            NodeKind::AtRule(AtRuleNode {
                                name: ar.name,
                                prelude,
                                rules,
                            }),
                        );
                    }
                }
            }
        }
    }

    AstNode::new(meta.span, meta.file, NodeKind::AtRule(ar))
}

/// `@charset` must survive even with no sibling rules to justify it
/// (spec §4.5.4 "mandatory side effects").
pub fn is_mandatory(ar: &AtRuleNode) -> bool {
    ar.name.eq_ignore_ascii_case("@charset")
}
