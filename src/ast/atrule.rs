//! At-rule machinery (spec §3): generic at-rules, `@media`, `@import`,
//! `:extend`, and mixin guards.

use super::{AstNode, Element, ValueList};

/// Any at-rule not given specialized handling (`@charset`, `@font-face`,
/// `@keyframes`, `@page`, `@supports`, `@container`, ...). `rules` is
/// `None` for a statement form (`@charset "UTF-8";`).
#[derive(Debug, Clone)]
pub struct AtRuleNode {
    pub name: String,
    pub prelude: String,
    pub rules: Option<Vec<AstNode>>,
}

/// `@media features { rules }`. Bubbled out to the top level by the
/// evaluator, combining ancestor feature lists by conjunction
/// (spec §4.3 "At-rule bubbling").
#[derive(Debug, Clone)]
pub struct Media {
    pub features: ValueList,
    pub rules: Vec<AstNode>,
}

/// `@import (options) "path" features;` (spec §3 `Import`, §4.4).
#[derive(Debug, Clone)]
pub struct Import {
    pub path: Box<AstNode>,
    pub features: Option<ValueList>,
    pub options: ImportOptions,
    /// Set once the import manager has determined CSS-vs-LESS mode
    /// (spec §4.4 "CSS-ness").
    pub is_css: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub reference: bool,
    pub inline: bool,
    pub css: bool,
    pub less: bool,
    pub multiple: bool,
    pub once: bool,
    pub plugin: bool,
    pub optional: bool,
}

impl ImportOptions {
    /// `once` is the reference default unless `multiple` was given
    /// explicitly (spec §4.4 "importMultiple").
    pub fn effective_once(&self) -> bool {
        !self.multiple
    }
}

/// `selector:extend(target[, option])` (spec §3 `Extend`, §4.5.2).
#[derive(Debug, Clone)]
pub struct Extend {
    pub target: Vec<Element>,
    pub option: Option<crate::common::ExtendOption>,
    /// Identity of the selector this extend is attached to; used by the
    /// chainer to detect transitive extend cycles (spec §4.5.2).
    pub object_id: u64,
    pub parent_ids: Vec<u64>,
}

/// A single `(@x > 0)` guard comparison, or a boolean value used bare.
#[derive(Debug, Clone)]
pub struct Condition {
    /// `>`, `>=`, `=`, `<`, `<=`, or `""` for a bare truthy check.
    pub op: String,
    pub lvalue: Box<AstNode>,
    pub rvalue: Option<Box<AstNode>>,
    pub negate: bool,
}

/// One comma-separated alternative of a guard: its `and`-joined terms.
/// `default()` is represented as `GuardTerm::Default` rather than a
/// `Condition`, since it isn't evaluated against the frame stack at all —
/// it's true iff no sibling group in the same guard matched
/// (spec §4.3 "Guards").
#[derive(Debug, Clone)]
pub enum GuardTerm {
    Condition(Condition),
    Default,
}

#[derive(Debug, Clone)]
pub struct MixinGuardGroup {
    pub terms: Vec<GuardTerm>,
}

/// `when (a) and (b), (c)` — OR of AND-groups.
#[derive(Debug, Clone)]
pub struct MixinGuard {
    pub groups: Vec<MixinGuardGroup>,
}
