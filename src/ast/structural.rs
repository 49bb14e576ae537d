//! Structural node variants (spec §3): declarations, rulesets, comments
//! and plugin-option assignments.

use super::{AstNode, Selector};
use crate::common::MergeKind;

/// `name: value;` (or `@name: value;` when `variable` is set, or `$x`
/// property access when parsed from a `Property` target).
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub value: Box<AstNode>,
    pub important: bool,
    pub merge: Option<MergeKind>,
    /// Declarations synthesized by the evaluator (e.g. from a mixin call's
    /// `!important` propagation) rather than parsed directly.
    pub inline: bool,
    pub variable: bool,
    /// Source-order index within its enclosing ruleset; merge-position
    /// preservation (spec §9 open item 1) keys off this.
    pub index: usize,
}

/// `/* block */` or `// line` (emitted only for the former).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub is_line_comment: bool,
}

/// `key=value` inside an unknown at-rule's parenthesized options, or an
/// `evalJS` variable binding (spec §6.3).
#[derive(Debug, Clone)]
pub struct Assignment {
    pub key: String,
    pub value: Box<AstNode>,
}

/// `selector { rules }` (spec §3 `Ruleset`). `paths` starts empty and is
/// populated by the join-selector visitor (spec §3 invariant 4); until
/// then a ruleset only knows its own selector list, not its full ancestor
/// chain.
#[derive(Debug, Clone)]
pub struct Ruleset {
    pub selectors: Vec<Selector>,
    pub rules: Vec<AstNode>,
    /// `@import`-introduced rulesets reject nested `@import` unless this
    /// is set (spec §3 `Ruleset.allowImports`).
    pub allow_imports: bool,
    pub strict_imports: bool,
    /// The top-level, file-root ruleset produced by the parser.
    pub is_root: bool,
    /// First root ruleset in a multi-file compile (vs. one spliced in by
    /// `@import`); used by the to-CSS visitor's extraction step.
    pub first_root: bool,
    pub allow_root: bool,
    /// Set once this ruleset has emerged as a sibling of a bubbled at-rule
    /// chain (spec §4.5.3); tells the to-CSS visitor not to re-extract it.
    pub root_in_media: bool,
    pub extend_on_every_path: bool,
    /// Absolute selector paths: each entry is the ancestor-to-self chain of
    /// `Selector`s that, joined, make one output selector group member.
    pub paths: Vec<Vec<Selector>>,
}

impl Ruleset {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Ruleset {
            selectors,
            rules: Vec::new(),
            allow_imports: false,
            strict_imports: false,
            is_root: false,
            first_root: false,
            allow_root: false,
            root_in_media: false,
            extend_on_every_path: false,
            paths: Vec::new(),
        }
    }

    pub fn root() -> Self {
        let mut r = Ruleset::new(Vec::new());
        r.is_root = true;
        r.first_root = true;
        r.allow_root = true;
        r.allow_imports = true;
        r
    }
}
