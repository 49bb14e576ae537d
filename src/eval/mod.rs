//! The evaluator (spec §4.3): a tree rewriter that reduces the AST through
//! lexical frames. Each node kind has a reduction rule implemented in
//! [`eval_node`]; leaves self-return, composites recurse and rebuild.

mod guard;
mod mixin;
mod operation;

pub use guard::eval_guard;
pub use mixin::call_mixins;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::*;
use crate::builtin::FunctionRegistry;
use crate::common::MathMode;
use crate::error::{LessError, LessResult};
use crate::scope::{Frame, FrameStack};

/// Per-compile evaluation state (spec §4.3 "Context"). One `Context` is
/// created per [`crate::Compiler::compile`] call and never shared across
/// compiles, satisfying the "no mutable global state" requirement of
/// spec §5.
pub struct Context<'a> {
    pub frames: Rc<FrameStack>,
    pub important_scope: Vec<bool>,
    pub in_calc: bool,
    pub math_mode: MathMode,
    pub strict_units: bool,
    pub num_precision: usize,
    pub compress: bool,
    pub import_multiple_default: bool,
    /// Names currently being resolved, for recursive-variable detection
    /// (spec §4.3 "Variables" `evalInProgress`).
    eval_in_progress: RefCell<HashSet<String>>,
    pub functions: &'a FunctionRegistry,
    /// Media/supports/container feature lists of every ancestor ruleset
    /// currently being evaluated, innermost last; combined by conjunction
    /// when an at-rule finally bubbles to the top (spec §4.3 "At-rule
    /// bubbling").
    pub media_path: Vec<ValueList>,
    /// Bubbled at-rules collected so far, spliced back in by the caller
    /// once the top-level ruleset finishes evaluating.
    pub media_blocks: Vec<AstNode>,
    /// `Options::javascript_enabled` (spec §6.2): gates backtick
    /// JavaScript expressions independently of whether a bridge is
    /// actually live (spec §4.8).
    pub javascript_enabled: bool,
    /// The live plugin/JS host connection, if any (spec §4.8, §6.3).
    /// `None` even when `javascript_enabled` is true means no host was
    /// wired up for this compile; evaluating a backtick expression then
    /// raises the same `RuntimeError` the protocol defines for a dead
    /// host (spec §5 "Cancellation").
    #[cfg(feature = "plugin_bridge")]
    pub plugin_bridge: Option<Rc<RefCell<dyn crate::plugin::PluginBridge>>>,
}

impl<'a> Context<'a> {
    pub fn new(functions: &'a FunctionRegistry, math_mode: MathMode, strict_units: bool) -> Self {
        Context {
            frames: FrameStack::root(),
            important_scope: Vec::new(),
            in_calc: false,
            math_mode,
            strict_units,
            num_precision: 8,
            compress: false,
            import_multiple_default: false,
            eval_in_progress: RefCell::new(HashSet::new()),
            functions,
            media_path: Vec::new(),
            media_blocks: Vec::new(),
            javascript_enabled: false,
            #[cfg(feature = "plugin_bridge")]
            plugin_bridge: None,
        }
    }

    pub fn with_frame<R>(&mut self, frame: Rc<Frame>, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = Rc::clone(&self.frames);
        self.frames = saved.push(frame);
        let result = f(self);
        self.frames = saved;
        result
    }

    pub fn enter_variable(&self, name: &str, span: codemap::Span) -> LessResult<VariableGuard<'_>> {
        if !self.eval_in_progress.borrow_mut().insert(name.to_owned()) {
            return Err(LessError::name(
                format!("Recursive variable definition for @{name}"),
                span,
            ));
        }
        Ok(VariableGuard {
            ctx: self,
            name: name.to_owned(),
        })
    }
}

/// RAII guard clearing a variable's "being evaluated" marker on drop,
/// including on the error path.
pub struct VariableGuard<'a, 'b> {
    ctx: &'a Context<'b>,
    name: String,
}

impl<'a, 'b> Drop for VariableGuard<'a, 'b> {
    fn drop(&mut self) {
        self.ctx.eval_in_progress.borrow_mut().remove(&self.name);
    }
}

/// Reduce one node. Mirrors spec §4.3 "Dispatch": `eval(ctx) -> Node` on
/// every node, leaves self-return.
pub fn eval_node(ctx: &mut Context, node: &AstNode) -> LessResult<AstNode> {
    let span = node.span();
    let result = match &node.kind {
        // Leaves: self-return.
        NodeKind::Dimension(_)
        | NodeKind::Color(_)
        | NodeKind::Keyword(_)
        | NodeKind::Quoted(_)
        | NodeKind::Anonymous(_)
        | NodeKind::UnicodeDescriptor(_)
        | NodeKind::Comment(_) => Ok(node.clone()),

        NodeKind::Variable(v) => eval_variable(ctx, node, v),
        NodeKind::Property(p) => eval_property(ctx, node, p),
        NodeKind::VariableCall(vc) => {
            let inner = ctx
                .frames
                .lookup_variable(&vc.name)
                .ok_or_else(|| LessError::name(format!("variable @@{} is undefined", vc.name), span))?;
            // The named variable's value must itself be a variable
            // reference or a value already; dereference one more level.
            eval_node(ctx, &inner)
        }

        NodeKind::Paren(p) => eval_node(ctx, &p.child),

        NodeKind::Negative(inner) => {
            let evaluated = eval_node(ctx, inner)?;
            negate(evaluated, span)
        }

        NodeKind::Operation(op) => operation::eval_operation(ctx, node, op),

        NodeKind::Expression(e) => {
            let mut children = Vec::with_capacity(e.children.len());
            for child in &e.children {
                children.push(eval_node(ctx, child)?);
            }
            Ok(AstNode::new(
                span,
                node.meta.file.clone(),
                NodeKind::Expression(Expression {
                    children,
                    no_spacing: e.no_spacing,
                }),
            ))
        }

        NodeKind::Value(v) => {
            let mut children = Vec::with_capacity(v.children.len());
            for expr in &v.children {
                let mut nodes = Vec::with_capacity(expr.children.len());
                for child in &expr.children {
                    nodes.push(eval_node(ctx, child)?);
                }
                children.push(Expression {
                    children: nodes,
                    no_spacing: expr.no_spacing,
                });
            }
            Ok(AstNode::new(
                span,
                node.meta.file.clone(),
                NodeKind::Value(ValueList { children }),
            ))
        }

        NodeKind::Call(call) => crate::builtin::eval_call(ctx, node, call),

        NodeKind::Url(u) => {
            let value = eval_node(ctx, &u.value)?;
            Ok(AstNode::new(
                span,
                node.meta.file.clone(),
                NodeKind::Url(Url {
                    value: Box::new(value),
                    is_evald: true,
                }),
            ))
        }

        // Structural nodes are reduced by the caller that owns the
        // enclosing ruleset (mixin/ruleset evaluation needs to expand
        // MixinCall into zero-or-more sibling nodes, which a 1:1 `eval`
        // can't express); see `crate::eval::mixin` and
        // `Ruleset::eval_rules` below.
        NodeKind::Declaration(_)
        | NodeKind::Ruleset(_)
        | NodeKind::Selector(_)
        | NodeKind::Element(_)
        | NodeKind::Assignment(_)
        | NodeKind::AtRule(_)
        | NodeKind::Media(_)
        | NodeKind::Import(_)
        | NodeKind::Extend(_)
        | NodeKind::DetachedRuleset(_)
        | NodeKind::MixinCall(_)
        | NodeKind::MixinDefinition(_)
        | NodeKind::NamespaceValue(_)
        | NodeKind::Reference(_) => Ok(node.clone()),

        NodeKind::JavaScript(js) => eval_javascript(ctx, node, js),
    };
    result.map_err(|e| e.with_span_if_missing(span))
}

fn eval_variable(ctx: &mut Context, node: &AstNode, v: &Variable) -> LessResult<AstNode> {
    let _guard = ctx.enter_variable(&v.name, node.span())?;
    let value = ctx
        .frames
        .lookup_variable(&v.name)
        .ok_or_else(|| LessError::name(format!("variable @{} is undefined", v.name), node.span()))?;
    eval_node(ctx, &value)
}

fn eval_property(ctx: &mut Context, node: &AstNode, p: &Property) -> LessResult<AstNode> {
    // Properties are resolved the same way as variables: the innermost
    // frame holding a declaration named `p.name` wins (spec §4.3
    // "Property accessor").
    let key = format!("$__prop__{}", p.name);
    let value = ctx
        .frames
        .lookup_variable(&key)
        .ok_or_else(|| LessError::name(format!("property \"${}\" is undefined", p.name), node.span()))?;
    eval_node(ctx, &value)
}

/// `` `expression` `` (spec §4.8, §6.3 `evalJS`). Gated by
/// `Options::javascript_enabled`; when enabled but no bridge is wired up
/// for this compile, raises the same `RuntimeError` the protocol defines
/// for an unavailable host (spec §5 "Cancellation").
fn eval_javascript(ctx: &mut Context, node: &AstNode, js: &JavaScriptNode) -> LessResult<AstNode> {
    if !ctx.javascript_enabled {
        return Err(LessError::syntax(
            "Inline JavaScript is not enabled. Is it set in your options?",
            node.span(),
        ));
    }

    #[cfg(feature = "plugin_bridge")]
    {
        let Some(bridge) = ctx.plugin_bridge.clone() else {
            return Err(LessError::runtime_at("plugin host unavailable", node.span()));
        };
        let result = bridge.borrow_mut().eval_js(&js.expression, &[])?;
        return js_value_to_node(node, result, js.escaped);
    }

    #[cfg(not(feature = "plugin_bridge"))]
    {
        let _ = js;
        Err(LessError::runtime_at(
            "plugin host unavailable: this build has no plugin_bridge support",
            node.span(),
        ))
    }
}

#[cfg(feature = "plugin_bridge")]
fn js_value_to_node(node: &AstNode, value: crate::plugin::JsValue, escaped: bool) -> LessResult<AstNode> {
    use crate::plugin::JsValue;
    let span = node.span();
    let file = node.meta.file.clone();
    let kind = match value {
        JsValue::Number(n) => NodeKind::Dimension(Dimension::unitless(n)),
        JsValue::Boolean(b) => NodeKind::Keyword(Keyword::new(if b { "true" } else { "false" })),
        JsValue::Empty => NodeKind::Anonymous(Anonymous::text(String::new())),
        JsValue::String(s) => NodeKind::Quoted(Quoted {
            quote_char: Some('"'),
            content: s,
            escaped,
        }),
        JsValue::Array(items) => {
            let joined = items
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            NodeKind::Anonymous(Anonymous::text(joined))
        }
    };
    Ok(AstNode::new(span, file, kind))
}

/// Evaluate a body of rules (a ruleset's own rules, a mixin call's
/// produced body, or a detached ruleset's body) in its own child frame.
/// Implements the two-pass hoisting spec §4.3 documents for mixin
/// definitions, extended here to variable declarations too: the
/// reference resolves `@x` to whatever the *last* declaration of `@x` in
/// the enclosing scope is, not the last one textually before the use site,
/// so every `@name: value;` in this body is collected before anything is
/// evaluated.
pub fn eval_rules(ctx: &mut Context, rules: &[AstNode]) -> LessResult<Vec<AstNode>> {
    let frame = Rc::new(Frame::new());
    ctx.with_frame(frame.clone(), |ctx| {
        // Pass 1: hoist mixin definitions and variable declarations.
        for rule in rules {
            match &rule.kind {
                NodeKind::MixinDefinition(def) => {
                    let mut def = def.clone();
                    if def.closure.borrow().is_none() {
                        *def.closure.borrow_mut() = Some(Rc::clone(&ctx.frames));
                    }
                    frame.declare_mixin(&def.name, Rc::new(def));
                }
                NodeKind::Declaration(decl) if decl.variable => {
                    frame.declare_variable(&decl.name, (*decl.value).clone());
                }
                _ => {}
            }
        }

        // Pass 2: evaluate everything else in source order, expanding
        // mixin calls into zero-or-more produced nodes.
        let mut out = Vec::with_capacity(rules.len());
        for rule in rules {
            match &rule.kind {
                NodeKind::MixinDefinition(_) => {}
                NodeKind::Declaration(decl) if decl.variable => {}
                NodeKind::Declaration(decl) => {
                    let value = eval_node(ctx, &decl.value)?;
                    frame.declare_variable(&format!("$__prop__{}", decl.name), value.clone());
                    out.push(AstNode::new(
                        rule.span(),
                        rule.meta.file.clone(),
                        NodeKind::Declaration(Declaration {
                            name: decl.name.clone(),
                            value: Box::new(value),
                            important: decl.important || !ctx.important_scope.is_empty()
                                && *ctx.important_scope.last().unwrap(),
                            merge: decl.merge,
                            inline: decl.inline,
                            variable: false,
                            index: decl.index,
                        }),
                    ));
                }
                NodeKind::MixinCall(call) if is_detached_ruleset_call(call) => {
                    let produced = eval_detached_ruleset_call(ctx, rule.span(), call)?;
                    out.extend(produced);
                }
                NodeKind::MixinCall(call) => {
                    let produced = mixin::call_mixins(ctx, rule.span(), call)?;
                    out.extend(produced);
                }
                NodeKind::Ruleset(rs) => {
                    out.push(eval_nested_ruleset(ctx, rule, rs)?);
                }
                NodeKind::DetachedRuleset(dr) => {
                    let mut dr = dr.clone();
                    if dr.frames.is_none() {
                        dr.frames = Some(Rc::clone(&ctx.frames));
                    }
                    out.push(AstNode::new(
                        rule.span(),
                        rule.meta.file.clone(),
                        NodeKind::DetachedRuleset(dr),
                    ));
                }
                NodeKind::Media(m) => {
                    out.push(eval_media(ctx, rule, m)?);
                }
                NodeKind::AtRule(_) | NodeKind::Import(_) | NodeKind::Extend(_) | NodeKind::Comment(_) => {
                    out.push(rule.clone());
                }
                _ => {
                    out.push(eval_node(ctx, rule)?);
                }
            }
        }
        Ok(out)
    })
}

/// `@name();` — a detached ruleset invoked like a zero-arg mixin call
/// (spec §4.3 "Detached rulesets"). Distinguished from a real mixin call
/// by its selector being a single bare `@name` element.
fn is_detached_ruleset_call(call: &MixinCall) -> bool {
    call.selector.len() == 1 && call.selector[0].value.starts_with('@')
}

fn eval_detached_ruleset_call(
    ctx: &mut Context,
    span: codemap::Span,
    call: &MixinCall,
) -> LessResult<Vec<AstNode>> {
    let name = call.selector[0].value.trim_start_matches('@');
    let value = ctx
        .frames
        .lookup_variable(name)
        .ok_or_else(|| LessError::name(format!("variable @{name} is undefined"), span))?;
    let dr = match &value.kind {
        NodeKind::DetachedRuleset(dr) => dr.clone(),
        other => {
            return Err(LessError::syntax(
                format!("@{name} is a {}, not a detached ruleset", other.type_name()),
                span,
            ))
        }
    };
    let captured = dr.frames.clone().unwrap_or_else(|| Rc::clone(&ctx.frames));
    let saved = Rc::clone(&ctx.frames);
    ctx.frames = ctx.frames.push_captured(&captured);
    let produced = eval_rules(ctx, &dr.rules);
    ctx.frames = saved;
    produced
}

fn eval_nested_ruleset(ctx: &mut Context, node: &AstNode, rs: &Ruleset) -> LessResult<AstNode> {
    let evaluated_rules = eval_rules(ctx, &rs.rules)?;
    Ok(AstNode::new(
        node.span(),
        node.meta.file.clone(),
        NodeKind::Ruleset(Ruleset {
            selectors: rs.selectors.clone(),
            rules: evaluated_rules,
            allow_imports: rs.allow_imports,
            strict_imports: rs.strict_imports,
            is_root: rs.is_root,
            first_root: rs.first_root,
            allow_root: rs.allow_root,
            root_in_media: rs.root_in_media,
            extend_on_every_path: rs.extend_on_every_path,
            paths: Vec::new(),
        }),
    ))
}

fn eval_media(ctx: &mut Context, node: &AstNode, m: &Media) -> LessResult<AstNode> {
    let features = eval_node(
        ctx,
        &AstNode::new(
            node.span(),
            node.meta.file.clone(),
            NodeKind::Value(m.features.clone()),
        ),
    )?;
    let features = match features.kind {
        NodeKind::Value(v) => v,
        _ => m.features.clone(),
    };
    ctx.media_path.push(features.clone());
    let rules = eval_rules(ctx, &m.rules);
    ctx.media_path.pop();
    Ok(AstNode::new(
        node.span(),
        node.meta.file.clone(),
        NodeKind::Media(Media {
            features,
            rules: rules?,
        }),
    ))
}

fn negate(node: AstNode, span: codemap::Span) -> LessResult<AstNode> {
    match node.kind {
        NodeKind::Dimension(d) => Ok(AstNode::new(
            span,
            node.meta.file,
            NodeKind::Dimension(Dimension::new(-d.value, d.unit)),
        )),
        NodeKind::Color(c) => Ok(AstNode::new(
            span,
            node.meta.file,
            NodeKind::Color(crate::color::Color::rgba(-c.r(), -c.g(), -c.b(), c.alpha())),
        )),
        _ => Err(LessError::syntax(
            "operand of unary minus must be a number or color",
            span,
        )),
    }
}
