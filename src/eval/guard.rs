//! Guard evaluation (spec §4.3 "Guards"): comma is OR, `and` is AND,
//! `default()` is true iff no other guard in the same overload group
//! matched. The third case can't be decided locally — only
//! [`crate::eval::mixin`], which sees every candidate with a given
//! name/arity at once, knows whether "no other guard matched".

use crate::ast::{AstNode, Condition, GuardTerm, MixinGuard, NodeKind};
use crate::error::LessResult;

use super::eval_node;
use super::Context;

/// The verdict for one mixin definition's guard, before the
/// `default()`-requires-siblings step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    Matched,
    NotMatched,
    /// Every OR-group that could still match reduces to `default()`;
    /// whether this definition is actually used depends on whether a
    /// sibling definition (same name, compatible arity) matched outright.
    DefaultOnly,
}

pub fn eval_guard(ctx: &mut Context, guard: &MixinGuard) -> LessResult<GuardVerdict> {
    let mut saw_default_group = false;
    for group in &guard.groups {
        match eval_group(ctx, group)? {
            Some(true) => return Ok(GuardVerdict::Matched),
            Some(false) => {}
            None => saw_default_group = true,
        }
    }
    if saw_default_group {
        Ok(GuardVerdict::DefaultOnly)
    } else {
        Ok(GuardVerdict::NotMatched)
    }
}

/// `Some(bool)` for a group with no bare `default()` term; `None` if the
/// group is exactly `default()` (optionally ANDed with conditions that all
/// passed), deferring the verdict to the caller.
fn eval_group(
    ctx: &mut Context,
    group: &crate::ast::MixinGuardGroup,
) -> LessResult<Option<bool>> {
    let mut has_default = false;
    for term in &group.terms {
        match term {
            GuardTerm::Default => has_default = true,
            GuardTerm::Condition(cond) => {
                if !eval_condition(ctx, cond)? {
                    return Ok(Some(false));
                }
            }
        }
    }
    if has_default {
        Ok(None)
    } else {
        Ok(Some(true))
    }
}

fn eval_condition(ctx: &mut Context, cond: &Condition) -> LessResult<bool> {
    let lv = eval_node(ctx, &cond.lvalue)?;
    let result = match &cond.rvalue {
        None => is_truthy(&lv),
        Some(rv) => {
            let rv = eval_node(ctx, rv)?;
            compare(&lv, &rv, &cond.op)?
        }
    };
    Ok(result != cond.negate)
}

fn is_truthy(node: &AstNode) -> bool {
    match &node.kind {
        NodeKind::Keyword(k) => !k.name.eq_ignore_ascii_case("false"),
        NodeKind::Dimension(d) => d.value != 0.0,
        _ => true,
    }
}

fn compare(lv: &AstNode, rv: &AstNode, op: &str) -> LessResult<bool> {
    use std::cmp::Ordering;
    let ordering = match (&lv.kind, &rv.kind) {
        (NodeKind::Dimension(a), NodeKind::Dimension(b)) => {
            a.value.partial_cmp(&b.value).unwrap_or(Ordering::Less)
        }
        (NodeKind::Keyword(a), NodeKind::Keyword(b)) => a.name.cmp(&b.name),
        (NodeKind::Quoted(a), NodeKind::Quoted(b)) => a.content.cmp(&b.content),
        (NodeKind::Color(a), NodeKind::Color(b)) => {
            if a == b {
                Ordering::Equal
            } else {
                Ordering::Less
            }
        }
        _ => {
            return Ok(op == "="
                && format!("{:?}", lv.kind.type_name()) == format!("{:?}", rv.kind.type_name()))
        }
    };
    Ok(match op {
        ">" => ordering == Ordering::Greater,
        ">=" => ordering != Ordering::Less,
        "<" => ordering == Ordering::Less,
        "<=" => ordering != Ordering::Greater,
        "=" | "" => ordering == Ordering::Equal,
        _ => false,
    })
}
