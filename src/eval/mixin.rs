//! Mixin call resolution (spec §4.3 "Mixin call resolution"): candidate
//! collection, arity scoring, guard evaluation, and body expansion.

use std::rc::Rc;

use codemap::Span;

use crate::ast::{AstNode, Expression, MixinCall, MixinDefinition, NodeKind};
use crate::error::{LessError, LessResult};
use crate::pos::FileInfo;
use crate::scope::Frame;

use super::guard::{eval_guard, GuardVerdict};
use super::{eval_node, eval_rules, Context};

/// Strip the leading `.`/`#` sigil so mixin definitions and calls key into
/// the same frame-table namespace regardless of which sigil was used.
///
/// Namespaced calls (`#ns.mixin()`, `#ns > .mixin()`) are resolved by the
/// *last* path element only; nested-namespace scoping is not tracked
/// separately from the flat mixin table (documented simplification, see
/// DESIGN.md).
fn mixin_key(call: &MixinCall) -> LessResult<String> {
    let last = call
        .selector
        .last()
        .ok_or_else(|| LessError::runtime("mixin call has no selector"))?;
    Ok(last.value.trim_start_matches(['.', '#']).to_owned())
}

/// Best-effort source file for a synthesized node: the file the argument
/// expression itself came from, falling back to an anonymous entry when
/// the expression is empty (e.g. a bare default value has no children yet).
fn expr_file(expr: &Expression) -> Rc<FileInfo> {
    expr.children
        .first()
        .map(|n| n.meta.file.clone())
        .unwrap_or_else(|| Rc::new(FileInfo::entry(".")))
}

pub fn call_mixins(ctx: &mut Context, span: Span, call: &MixinCall) -> LessResult<Vec<AstNode>> {
    let name = mixin_key(call)?;
    let candidates = ctx.frames.lookup_mixins(&name);
    if candidates.is_empty() {
        return Err(LessError::runtime_at(
            format!("No matching definition was found for `.{name}(...)`"),
            span,
        ));
    }

    // Evaluate call arguments once, in the calling scope.
    let mut positional = Vec::new();
    let mut named = Vec::new();
    for arg in &call.args {
        let file = expr_file(&arg.value);
        let node = AstNode::new(span, file, NodeKind::Expression(arg.value.clone()));
        let evaluated = eval_node(ctx, &node)?;
        match &arg.name {
            Some(n) => named.push((n.clone(), evaluated)),
            None => positional.push(evaluated),
        }
    }

    let mut accepted: Vec<(Rc<MixinDefinition>, Rc<Frame>)> = Vec::new();
    let mut default_only: Vec<(Rc<MixinDefinition>, Rc<Frame>)> = Vec::new();
    let mut any_arity_matched = false;

    for def in &candidates {
        if !arity_compatible(def, positional.len(), &named) {
            continue;
        }
        any_arity_matched = true;
        let frame = match bind_params(ctx, def, &positional, &named, span)? {
            Some(frame) => frame,
            // A literal parameter pattern (`.m(dark, @x)`) didn't match
            // this call's actual argument; reject the candidate the same
            // way an unmatched guard would, rather than erroring.
            None => continue,
        };

        let verdict = match &def.guard {
            None => GuardVerdict::Matched,
            Some(guard) => {
                let closure = def
                    .closure
                    .borrow()
                    .clone()
                    .unwrap_or_else(|| Rc::clone(&ctx.frames));
                let saved = Rc::clone(&ctx.frames);
                ctx.frames = closure.push(Rc::clone(&frame));
                let verdict = eval_guard(ctx, guard);
                ctx.frames = saved;
                verdict?
            }
        };

        match verdict {
            GuardVerdict::Matched => accepted.push((Rc::clone(def), frame)),
            GuardVerdict::DefaultOnly => default_only.push((Rc::clone(def), frame)),
            GuardVerdict::NotMatched => {}
        }
    }

    if accepted.is_empty() {
        accepted = default_only;
    }

    if accepted.is_empty() {
        let reason = if any_arity_matched { "guard" } else { "arity" };
        return Err(LessError::runtime_at(
            format!("No matching definition was found for `.{name}(...)` ({reason} mismatch)"),
            span,
        ));
    }

    if call.important {
        ctx.important_scope.push(true);
    }

    let mut produced = Vec::new();
    let mut eval_err = None;
    for (def, frame) in accepted {
        let closure = def
            .closure
            .borrow()
            .clone()
            .unwrap_or_else(|| Rc::clone(&ctx.frames));
        let saved = Rc::clone(&ctx.frames);
        ctx.frames = closure.push(frame);
        let body = eval_rules(ctx, &def.rules);
        ctx.frames = saved;
        match body {
            Ok(nodes) => produced.extend(nodes),
            Err(e) => {
                eval_err = Some(e);
                break;
            }
        }
    }

    if call.important {
        ctx.important_scope.pop();
    }

    if let Some(e) = eval_err {
        return Err(e);
    }

    if call.important {
        for node in &mut produced {
            if let NodeKind::Declaration(decl) = &mut node.kind {
                decl.important = true;
            }
        }
    }

    Ok(produced)
}

fn arity_compatible(def: &MixinDefinition, positional: usize, named: &[(String, AstNode)]) -> bool {
    let required = def
        .params
        .iter()
        .filter(|p| !p.variadic && p.default.is_none())
        .filter(|p| !named.iter().any(|(n, _)| n == &p.name))
        .count();
    let max = def.params.iter().filter(|p| !p.variadic).count();
    if def.variadic {
        positional >= required
    } else {
        positional >= required && positional <= max
    }
}

/// Binds `def`'s parameters against the call's actual arguments in a
/// fresh [`Frame`]. Returns `Ok(None)` rather than an error when a literal
/// parameter pattern doesn't match its corresponding positional argument
/// — that's a candidate-rejection outcome (like a failed guard), not a
/// hard failure — so the caller can fall through to the next definition.
fn bind_params(
    ctx: &mut Context,
    def: &MixinDefinition,
    positional: &[AstNode],
    named: &[(String, AstNode)],
    span: Span,
) -> LessResult<Option<Rc<Frame>>> {
    let frame = Rc::new(Frame::new());
    let mut next_positional = 0usize;
    for (idx, param) in def.params.iter().enumerate() {
        if param.variadic {
            let rest: Vec<AstNode> = positional[next_positional.min(positional.len())..].to_vec();
            let file = rest
                .first()
                .map(|n| n.meta.file.clone())
                .unwrap_or_else(|| Rc::new(FileInfo::entry(".")));
            let list = AstNode::new(span, file, NodeKind::Expression(Expression::new(rest)));
            frame.declare_variable(&param.name, list);
            break;
        }
        if let Some(literal) = &param.literal {
            let Some(actual) = positional.get(next_positional) else {
                return Ok(None);
            };
            next_positional += 1;
            if !literal_matches(ctx, literal, actual)? {
                return Ok(None);
            }
            continue;
        }
        let value = if let Some((_, v)) = named.iter().find(|(n, _)| n == &param.name) {
            v.clone()
        } else if next_positional < positional.len() {
            let v = positional[next_positional].clone();
            next_positional += 1;
            v
        } else if let Some(default) = &param.default {
            let file = expr_file(default);
            let default_node = AstNode::new(span, file, NodeKind::Expression(default.clone()));
            ctx.with_frame(Rc::clone(&frame), |ctx| eval_node(ctx, &default_node))?
        } else {
            return Err(LessError::name(
                format!("Missing argument `{}` (parameter #{})", param.name, idx + 1),
                span,
            ));
        };
        frame.declare_variable(&param.name, value);
    }
    Ok(Some(frame))
}

/// Spec §4.3 "pattern-matching literal arguments against parameters with
/// literal values": the literal and the actual argument match iff they
/// render to identical CSS text (restricted in practice to literal
/// keywords/numbers, per the grammar `parse_mixin_params` accepts).
fn literal_matches(ctx: &mut Context, literal: &AstNode, actual: &AstNode) -> LessResult<bool> {
    let literal = eval_node(ctx, literal)?;
    let precision = ctx.num_precision;
    Ok(crate::emitter::render_value_node(&literal, precision) == crate::emitter::render_value_node(actual, precision))
}
