//! Call node variants (spec §3): function calls, mixin calls/definitions,
//! detached rulesets and inline JavaScript.

use std::rc::Rc;

use super::atrule::MixinGuard;
use super::{AstNode, Element, Expression};
use crate::scope::FrameStack;

/// `name(args)` — a built-in, plugin, or unknown (pass-through) function
/// call (spec §4.7).
#[derive(Debug, Clone)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expression>,
    /// Set for `calc(...)`: math stays symbolic inside, per spec §4.3
    /// `ctx.in_calc`.
    pub calc: bool,
}

/// One formal parameter of a [`MixinDefinition`]: `@name`, `@name: default`,
/// `@name...` (variadic, must be last), or a bare literal value (`dark`,
/// `0`) that the call's actual argument at that position must match
/// exactly rather than bind to a variable (spec §4.3 "Mixin call
/// resolution" bullet 3, "pattern-matching literal arguments against
/// parameters with literal values").
#[derive(Debug, Clone)]
pub struct MixinParam {
    pub name: String,
    pub default: Option<Expression>,
    pub variadic: bool,
    /// Set instead of `name` for a bare (non-`@`) parameter: the literal
    /// value pattern a positional argument must render identically to
    /// for this definition to be a candidate.
    pub literal: Option<AstNode>,
}

/// `.name(params) when (guard) { rules }` (spec §4.2 "Mixins").
///
/// Mixin definitions are lexical closures over the ruleset they were
/// declared in, the same way a `DetachedRuleset` is: `closure` is
/// stamped in once, the first time the two-pass evaluator collects the
/// definition, and is then reused on every call regardless of call site.
#[derive(Debug, Clone)]
pub struct MixinDefinition {
    pub name: String,
    pub params: Vec<MixinParam>,
    pub guard: Option<MixinGuard>,
    pub rules: Vec<AstNode>,
    pub variadic: bool,
    pub closure: std::cell::RefCell<Option<Rc<FrameStack>>>,
}

/// One actual argument: a positional value, or `@name: value` passed by
/// name. Argument groups are semicolon-separated so commas can appear
/// inside a single argument's value (spec §4.2 "Mixins").
#[derive(Debug, Clone)]
pub struct CallArg {
    pub name: Option<String>,
    pub value: Expression,
}

/// `.name(args);` or `#ns.name(args) !important;` (spec §3 `MixinCall`).
#[derive(Debug, Clone)]
pub struct MixinCall {
    pub selector: Vec<Element>,
    pub args: Vec<CallArg>,
    pub important: bool,
}

/// `` `expression` `` — only meaningful when `Options::javascript_enabled`
/// and the plugin bridge is live (spec §4.8).
#[derive(Debug, Clone)]
pub struct JavaScriptNode {
    pub expression: String,
    pub escaped: bool,
}

/// `@name: { rules };` — closes over the frame stack at definition time
/// (spec §3 invariant 7, §4.3 "Detached rulesets").
#[derive(Debug, Clone)]
pub struct DetachedRuleset {
    pub rules: Vec<AstNode>,
    /// Captured lazily: `None` until the evaluator first closes over the
    /// defining scope, after which calling `@name()` unions these frames
    /// under the call-site frames.
    pub frames: Option<Rc<FrameStack>>,
}
