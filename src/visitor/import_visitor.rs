//! Import resolution (spec §4.5.1): walks the raw parse tree, replacing
//! each `@import` with the rules it resolved to, recursing into imported
//! content so nested imports are resolved too. `@plugin` imports are left
//! alone here; the plugin bridge (when enabled) handles those separately.

use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;

use crate::ast::{AstNode, NodeKind};
use crate::error::{LessError, LessResult};
use crate::imports::{ImportManager, ImportOutcome};
use crate::pos::FileInfo;

pub fn resolve(root: AstNode, manager: &ImportManager) -> LessResult<AstNode> {
    let file = root.meta.file.clone();
    match root.kind {
        NodeKind::Ruleset(mut rs) => {
            let mut in_progress = HashSet::new();
            rs.rules = resolve_rules(rs.rules, &file, manager, &mut in_progress)?;
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

fn resolve_rules(
    rules: Vec<AstNode>,
    importer_file: &Rc<FileInfo>,
    manager: &ImportManager,
    in_progress: &mut HashSet<PathBuf>,
) -> LessResult<Vec<AstNode>> {
    let mut out = Vec::with_capacity(rules.len());
    for node in rules {
        match node.kind {
            NodeKind::Import(ref import) if import.options.plugin => {
                out.push(node);
            }
            NodeKind::Import(ref import) => {
                let raw_path = static_path_text(&import.path)?;
                let outcome = manager.resolve(import, &raw_path, importer_file)?;
                match outcome {
                    ImportOutcome::AlreadyImported | ImportOutcome::OptionalMissing => {}
                    ImportOutcome::Verbatim(n) => out.push(n),
                    ImportOutcome::Less(resolved_path, child_rules) => {
                        if !in_progress.insert(resolved_path.clone()) {
                            return Err(LessError::runtime(format!(
                                "Recursive import of \"{}\"",
                                resolved_path.display()
                            )));
                        }
                        let child_file = child_rules
                            .first()
                            .map(|n| n.meta.file.clone())
                            .unwrap_or_else(|| importer_file.clone());
                        let nested = resolve_rules(child_rules, &child_file, manager, in_progress)?;
                        in_progress.remove(&resolved_path);
                        out.extend(nested);
                    }
                }
            }
            NodeKind::Ruleset(mut rs) => {
                rs.rules = resolve_rules(rs.rules, importer_file, manager, in_progress)?;
                out.push(AstNode {
                    meta: node.meta,
                    kind: NodeKind::Ruleset(rs),
                });
            }
            NodeKind::Media(mut m) => {
                m.rules = resolve_rules(m.rules, importer_file, manager, in_progress)?;
                out.push(AstNode {
                    meta: node.meta,
                    kind: NodeKind::Media(m),
                });
            }
            other => out.push(AstNode {
                meta: node.meta,
                kind: other,
            }),
        }
    }
    Ok(out)
}

/// Best-effort static text for an import path: a literal quoted string,
/// bare keyword, or escaped anonymous value. Variable-interpolated import
/// paths would need evaluation before resolution can happen, which this
/// core's pre-evaluation import pass doesn't support.
fn static_path_text(node: &AstNode) -> LessResult<String> {
    match &node.kind {
        NodeKind::Quoted(q) => Ok(q.content.clone()),
        NodeKind::Keyword(k) => Ok(k.name.clone()),
        NodeKind::Anonymous(a) => Ok(a.value.clone()),
        NodeKind::Url(u) => static_path_text(&u.value),
        other => Err(LessError::syntax(
            format!(
                "@import path must be a literal string, got a {}; variable-interpolated import paths aren't supported",
                other.type_name()
            ),
            node.span(),
        )),
    }
}
