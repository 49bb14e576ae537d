//! Composite value node variants (spec §3).

use crate::common::Op;

use super::AstNode;

/// Whitespace-separated list of child nodes, e.g. `1px solid red`.
/// `no_spacing` is set for contexts (some function arguments) where the
/// reference renders children without the separating space.
#[derive(Debug, Clone)]
pub struct Expression {
    pub children: Vec<AstNode>,
    pub no_spacing: bool,
}

impl Expression {
    pub fn new(children: Vec<AstNode>) -> Self {
        Expression {
            children,
            no_spacing: false,
        }
    }
}

/// Comma-separated list of [`Expression`]s, e.g. `Arial, sans-serif`.
#[derive(Debug, Clone)]
pub struct ValueList {
    pub children: Vec<Expression>,
}

#[derive(Debug, Clone)]
pub struct Paren {
    pub child: Box<AstNode>,
}

/// Unary minus, e.g. `-@x`.
pub type Negative = AstNode;

/// A binary arithmetic operation (spec §3, §4.3).
#[derive(Debug, Clone)]
pub struct Operation {
    pub op: Op,
    pub left: Box<AstNode>,
    pub right: Box<AstNode>,
    /// Whether the source had spaces around the operator; symbolic
    /// fallback re-emission (when math mode leaves it unevaluated) uses
    /// this to decide whether to print `a+b` or `a + b`.
    pub is_spaced: bool,
    /// True if this operation sits directly inside a `Paren` — used by the
    /// evaluator to decide whether `parens-division` forces evaluation
    /// regardless of operator (spec §4.3).
    pub in_parens: bool,
}
