//! The visitor pipeline (spec §4.5): four passes over the evaluated tree,
//! each rewriting it into the shape the next expects.
//!
//! Import resolution actually runs *before* evaluation, not after —
//! imported mixins and variables need to be visible to the importing
//! file's own evaluation pass, so splicing import content in has to
//! happen on the raw parse tree (see [`import_visitor`] and DESIGN.md
//! "Import resolution ordering").

pub mod extend_visitor;
pub mod import_visitor;
pub mod join_selector_visitor;
pub mod to_css_visitor;

use crate::ast::AstNode;
use crate::error::LessResult;
use crate::imports::ImportManager;

/// Run extend -> join-selector -> to-CSS over an already-evaluated root
/// ruleset, producing the flat top-level sequence the emitter walks.
/// Import resolution has already happened, pre-evaluation (see
/// [`import_visitor::resolve`]).
pub fn run_post_eval_pipeline(root: AstNode) -> LessResult<Vec<AstNode>> {
    let root = extend_visitor::run(root)?;
    let root = join_selector_visitor::run(root)?;
    to_css_visitor::flatten(root)
}

/// Resolve every `@import` in a freshly parsed (not yet evaluated) tree,
/// recursively, with cycle detection (spec §4.5.1).
pub fn resolve_imports(root: AstNode, manager: &ImportManager) -> LessResult<AstNode> {
    import_visitor::resolve(root, manager)
}
