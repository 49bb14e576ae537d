//! `Selector` and `Element` (spec §3). Selectors are parsed once, then
//! flattened into absolute paths by the join-selector visitor
//! ([`crate::visitor::join_selector`]).

use super::atrule::Extend;
use super::AstNode;
use crate::common::Combinator;

/// One compound-selector element: a combinator plus the simple selector
/// text (`.foo`, `#bar`, `&`, `[attr=val]`, `%(interpolation)`...).
/// `is_variable` marks an element produced by `@{name}` interpolation,
/// which the evaluator must resolve before the join-selector visitor runs.
#[derive(Debug, Clone)]
pub struct Element {
    pub combinator: Combinator,
    pub value: String,
    pub is_variable: bool,
}

impl Element {
    pub fn new(combinator: Combinator, value: impl Into<String>) -> Self {
        Element {
            combinator,
            value: value.into(),
            is_variable: false,
        }
    }

    pub fn is_parent_reference(&self) -> bool {
        self.value.starts_with('&')
    }
}

/// A full selector: a sequence of [`Element`]s, any attached
/// `:extend(...)`, and an optional `when (...)` guard used when a selector
/// itself is conditional (spec §4.2 "Selectors").
#[derive(Debug, Clone)]
pub struct Selector {
    pub elements: Vec<Element>,
    pub extend_list: Vec<Extend>,
    pub condition: Option<Box<AstNode>>,
    pub evald_condition: Option<bool>,
    /// True for a selector that only exists to host bubbled `@media`
    /// content and has no element text of its own.
    pub media_empty: bool,
}

impl Selector {
    pub fn new() -> Self {
        Selector {
            elements: Vec::new(),
            extend_list: Vec::new(),
            condition: None,
            evald_condition: None,
            media_empty: false,
        }
    }

    /// Render the selector's own text (not including ancestor paths).
    pub fn to_css_string(&self) -> String {
        let mut out = String::new();
        for (i, el) in self.elements.iter().enumerate() {
            if i > 0 || el.combinator != Combinator::None {
                let sep = el.combinator.as_str();
                if sep == " " {
                    out.push(' ');
                } else if !sep.is_empty() {
                    out.push(' ');
                    out.push_str(sep);
                    out.push(' ');
                }
            }
            out.push_str(&el.value);
        }
        out
    }
}

impl Default for Selector {
    fn default() -> Self {
        Self::new()
    }
}
