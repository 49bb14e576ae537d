//! Join-selector visitor (spec §4.5.3): turns each ruleset's own selector
//! list plus its ancestors into absolute `paths`, resolving `&` against
//! the immediate parent's joined text and otherwise chaining as plain
//! descendant nesting.
//!
//! `@media` doesn't introduce a new selector scope (spec §4.3 "At-rule
//! bubbling" — the nested rules still belong to whatever selector
//! encloses the `@media` block), so it's walked transparently here.

use crate::ast::{AstNode, NodeKind, Selector};
use crate::error::LessResult;

pub fn run(root: AstNode) -> LessResult<AstNode> {
    match root.kind {
        NodeKind::Ruleset(mut rs) => {
            join_rules(&mut rs.rules, &[]);
            Ok(AstNode {
                meta: root.meta,
                kind: NodeKind::Ruleset(rs),
            })
        }
        other => Ok(AstNode {
            meta: root.meta,
            kind: other,
        }),
    }
}

fn join_rules(rules: &mut [AstNode], parent_paths: &[Vec<Selector>]) {
    for node in rules.iter_mut() {
        match &mut node.kind {
            NodeKind::Ruleset(rs) => {
                let paths = join(parent_paths, &rs.selectors);
                join_rules(&mut rs.rules, &paths);
                rs.paths = paths;
            }
            NodeKind::Media(m) => {
                join_rules(&mut m.rules, parent_paths);
            }
            _ => {}
        }
    }
}

/// Cross `own` against every ancestor path. At the root (`parent_paths`
/// empty) each own selector is a one-element path with no `&` to resolve.
fn join(parent_paths: &[Vec<Selector>], own: &[Selector]) -> Vec<Vec<Selector>> {
    if parent_paths.is_empty() {
        return own.iter().cloned().map(|s| vec![s]).collect();
    }
    let mut out = Vec::with_capacity(parent_paths.len() * own.len().max(1));
    for parent_path in parent_paths {
        let parent_text = join_path_text(parent_path);
        for sel in own {
            if has_parent_ref(sel) {
                out.push(vec![substitute_parent_ref(sel, &parent_text)]);
            } else {
                let mut chain = parent_path.clone();
                chain.push(sel.clone());
                out.push(chain);
            }
        }
    }
    out
}

fn join_path_text(path: &[Selector]) -> String {
    path.iter()
        .map(Selector::to_css_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_parent_ref(sel: &Selector) -> bool {
    sel.elements.iter().any(|e| e.value.contains('&'))
}

fn substitute_parent_ref(sel: &Selector, parent_text: &str) -> Selector {
    let mut out = sel.clone();
    for el in &mut out.elements {
        if el.value.contains('&') {
            el.value = el.value.replace('&', parent_text);
        }
    }
    out
}
