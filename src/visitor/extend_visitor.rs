//! Extend visitor (spec §4.5.2): `selector:extend(target)` adds `selector`
//! as an alternative selector everywhere `target` matches, transitively,
//! up to a fixed pass limit to guard against extend cycles.
//!
//! Matching and transitive closure operate on each ruleset's own selector
//! list, before the join-selector pass computes full ancestor paths —
//! a deliberate scope cut from chasing every combinator/pseudo edge case
//! the reference's selector matcher handles (see DESIGN.md).

use crate::ast::{AstNode, Element, NodeKind, Selector};
use crate::common::ExtendOption;
use crate::error::LessResult;

const MAX_PASSES: usize = 100;

struct ExtendDecl {
    target_text: String,
    all: bool,
    extender: Selector,
}

pub fn run(root: AstNode) -> LessResult<AstNode> {
    match root.kind {
        NodeKind::Ruleset(mut rs) => {
            for _ in 0..MAX_PASSES {
                let mut decls = Vec::new();
                collect_declarations(&rs.rules, &mut decls);
                if decls.is_empty() {
                    break;
                }
                if !apply_pass(&mut rs.rules, &decls) {
                    break;
                }
            }
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

fn collect_declarations(rules: &[AstNode], out: &mut Vec<ExtendDecl>) {
    for node in rules {
        match &node.kind {
            NodeKind::Ruleset(rs) => {
                for sel in &rs.selectors {
                    for ext in &sel.extend_list {
                        let mut extender = sel.clone();
                        extender.extend_list.clear();
                        out.push(ExtendDecl {
                            target_text: elements_text(&ext.target),
                            all: matches!(ext.option, Some(ExtendOption::All)),
                            extender,
                        });
                    }
                }
                collect_declarations(&rs.rules, out);
            }
            NodeKind::Media(m) => collect_declarations(&m.rules, out),
            _ => {}
        }
    }
}

/// One fixpoint pass: adds any not-yet-present matching extender selector
/// to every ruleset whose own selector list matches a declaration's
/// target. Returns whether anything changed, so the caller can detect a
/// fixpoint and stop iterating.
fn apply_pass(rules: &mut [AstNode], decls: &[ExtendDecl]) -> bool {
    let mut changed = false;
    for node in rules.iter_mut() {
        match &mut node.kind {
            NodeKind::Ruleset(rs) => {
                for decl in decls {
                    let is_match = rs
                        .selectors
                        .iter()
                        .any(|sel| selector_matches(sel, &decl.target_text, decl.all));
                    if !is_match {
                        continue;
                    }
                    let extender_text = elements_text(&decl.extender.elements);
                    let already_present = rs
                        .selectors
                        .iter()
                        .any(|sel| elements_text(&sel.elements) == extender_text);
                    if !already_present {
                        rs.selectors.push(decl.extender.clone());
                        changed = true;
                    }
                }
                if apply_pass(&mut rs.rules, decls) {
                    changed = true;
                }
            }
            NodeKind::Media(m) => {
                if apply_pass(&mut m.rules, decls) {
                    changed = true;
                }
            }
            _ => {}
        }
    }
    changed
}

fn selector_matches(sel: &Selector, target_text: &str, all: bool) -> bool {
    let text = elements_text(&sel.elements);
    if all {
        text.contains(target_text)
    } else {
        text == target_text
    }
}

fn elements_text(elements: &[Element]) -> String {
    elements.iter().map(|e| e.value.as_str()).collect::<Vec<_>>().join("")
}
