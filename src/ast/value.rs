//! Value atom node variants (spec §3).

use crate::unit::Unit;

/// A number with a canonical [`Unit`] (spec §3 invariant 2).
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub value: f64,
    pub unit: Unit,
}

impl Dimension {
    pub fn new(value: f64, unit: Unit) -> Self {
        Dimension { value, unit }
    }

    pub fn unitless(value: f64) -> Self {
        Dimension {
            value,
            unit: Unit::unitless(),
        }
    }

    /// Trims trailing zeros per the reference's precision rule; unitless
    /// zero is preserved as a bare `0` (spec §4.6).
    pub fn to_css_string(&self, precision: usize) -> String {
        let scaled = format!("{:.*}", precision, self.value);
        let trimmed = if scaled.contains('.') {
            scaled
                .trim_end_matches('0')
                .trim_end_matches('.')
                .to_owned()
        } else {
            scaled
        };
        let trimmed = if trimmed.is_empty() || trimmed == "-0" {
            "0".to_owned()
        } else {
            trimmed
        };
        format!("{trimmed}{}", self.unit)
    }
}

/// A bare identifier that isn't a variable/property reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub name: String,
}

impl Keyword {
    pub fn new(name: impl Into<String>) -> Self {
        Keyword { name: name.into() }
    }
}

/// A quoted string. `escaped` marks `~"..."`, which is unquoted on emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quoted {
    pub quote_char: Option<char>,
    pub content: String,
    pub escaped: bool,
}

impl Quoted {
    pub fn to_css_string(&self) -> String {
        if self.escaped {
            self.content.clone()
        } else {
            match self.quote_char {
                Some(q) => format!("{q}{}{q}", self.content),
                None => self.content.clone(),
            }
        }
    }
}

/// Raw, already-CSS-ready text that isn't further interpreted: the
/// catch-all for `Declaration.value` fallback and built-in function
/// results that are just strings (spec §9: "always a `Node`, wrapping raw
/// strings in `Anonymous`").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anonymous {
    pub value: String,
    /// True when this node actually wraps a ruleset-like body (e.g. an
    /// inlined `@import`'s raw file contents, spec §4.4) rather than plain
    /// text, so the emitter knows not to further indent/escape it.
    pub ruleset_like: bool,
}

impl Anonymous {
    pub fn text(value: impl Into<String>) -> Self {
        Anonymous {
            value: value.into(),
            ruleset_like: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Url {
    /// The unevaluated interior, boxed so `Url` can hold any value node
    /// (quoted string, variable, expression) before `is_evald`.
    pub value: Box<super::AstNode>,
    pub is_evald: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnicodeDescriptor {
    pub value: String,
}
