//! Selector grammar (spec §4.2 "Selectors"): combinators, the parent
//! reference `&`, attached `:extend(...)`, and the ruleset they head.

use crate::ast::*;
use crate::common::{Combinator, ExtendOption};
use crate::error::LessResult;

use super::Parser;

impl Parser {
    pub(super) fn try_ruleset(&mut self) -> LessResult<Option<AstNode>> {
        let start = self.scanner.pos();
        let selectors = match self.parse_selector_list()? {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(None),
        };
        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some('{') {
            return Ok(None);
        }
        let rules = self.parse_block()?;
        let span = self.scanner.span_from(start);
        let mut ruleset = Ruleset::new(selectors);
        ruleset.rules = rules;
        Ok(Some(self.node(span, NodeKind::Ruleset(ruleset))))
    }

    fn parse_selector_list(&mut self) -> LessResult<Option<Vec<Selector>>> {
        let mut selectors = Vec::new();
        loop {
            self.scanner.skip_whitespace();
            let sel = match self.parse_one_selector()? {
                Some(s) => s,
                None => break,
            };
            selectors.push(sel);
            self.scanner.skip_whitespace();
            if self.scanner.eat_char(',') {
                continue;
            }
            break;
        }
        if selectors.is_empty() {
            Ok(None)
        } else {
            Ok(Some(selectors))
        }
    }

    fn parse_one_selector(&mut self) -> LessResult<Option<Selector>> {
        let mut elements = Vec::new();
        let mut first = true;
        loop {
            let ws = self.scanner.skip_whitespace();
            let combinator = match self.peek_explicit_combinator() {
                Some(c) => {
                    self.scanner.bump();
                    if c == Combinator::ShadowDeep {
                        self.scanner.bump();
                    }
                    self.scanner.skip_whitespace();
                    c
                }
                None if first => Combinator::None,
                None if ws => Combinator::Descendant,
                None => break,
            };
            let text = self.parse_compound_selector_text();
            if text.is_empty() {
                if !first {
                    // Trailing combinator with nothing after it: not part
                    // of this selector after all.
                    break;
                }
                return Ok(None);
            }
            let is_variable = text.contains("@{");
            elements.push(Element {
                combinator,
                value: text,
                is_variable,
            });
            first = false;
        }
        if elements.is_empty() {
            return Ok(None);
        }

        let mut selector = Selector::new();
        if let Some(last) = elements.last_mut() {
            if let Some((base, extend)) = split_extend(&last.value) {
                last.value = base;
                selector.extend_list.push(extend);
            }
        }
        selector.elements = elements;
        Ok(Some(selector))
    }

    fn peek_explicit_combinator(&self) -> Option<Combinator> {
        match self.scanner.peek() {
            Some('>') => Some(Combinator::Child),
            Some('~') => Some(Combinator::Sibling),
            Some('+') => Some(Combinator::NextSibling),
            Some('^') if self.scanner.peek_nth(1) == Some('^') => Some(Combinator::ShadowDeep),
            Some('^') => Some(Combinator::Shadow),
            _ => None,
        }
    }

    /// Consumes one compound simple selector: a run of `.class`, `#id`,
    /// type names, `&`, `*`, `%(...)` interpolation, `[attr...]`, and
    /// `:pseudo(...)` pieces glued with no whitespace between them.
    /// Parens are tracked as nesting depth, never as a stop condition,
    /// since in this grammatical position they only ever open inside an
    /// already-started pseudo-class.
    fn parse_compound_selector_text(&mut self) -> String {
        let mut out = String::new();
        let mut paren_depth = 0i32;
        let mut bracket_depth = 0i32;
        loop {
            match self.scanner.peek() {
                None => break,
                Some(c) if c.is_whitespace() && paren_depth == 0 && bracket_depth == 0 => break,
                Some(',' | '{' | ';') if paren_depth == 0 && bracket_depth == 0 => break,
                Some(c @ ('>' | '~' | '+')) if paren_depth == 0 && bracket_depth == 0 && !out.is_empty() => {
                    let _ = c;
                    break;
                }
                Some('(') => {
                    paren_depth += 1;
                    out.push(self.scanner.bump().unwrap());
                }
                Some(')') => {
                    paren_depth -= 1;
                    out.push(self.scanner.bump().unwrap());
                }
                Some('[') => {
                    bracket_depth += 1;
                    out.push(self.scanner.bump().unwrap());
                }
                Some(']') => {
                    bracket_depth -= 1;
                    out.push(self.scanner.bump().unwrap());
                }
                Some(c @ ('"' | '\'')) => {
                    out.push(self.scanner.bump().unwrap());
                    loop {
                        match self.scanner.peek() {
                            None => break,
                            Some('\\') => {
                                out.push(self.scanner.bump().unwrap());
                                if let Some(esc) = self.scanner.bump() {
                                    out.push(esc);
                                }
                            }
                            Some(q) if q == c => {
                                out.push(self.scanner.bump().unwrap());
                                break;
                            }
                            Some(_) => out.push(self.scanner.bump().unwrap()),
                        }
                    }
                }
                Some(_) => out.push(self.scanner.bump().unwrap()),
            }
        }
        out
    }
}

/// Splits a trailing `:extend(target[, option])` off a compound selector's
/// text (spec §4.5.2). Returns `(base_without_extend, Extend)`.
fn split_extend(text: &str) -> Option<(String, Extend)> {
    let idx = text.find(":extend(")?;
    if !text.ends_with(')') {
        return None;
    }
    let base = text[..idx].to_owned();
    let inner = &text[idx + ":extend(".len()..text.len() - 1];
    let (target_text, option) = if let Some(stripped) = inner.strip_suffix(" all") {
        (stripped, Some(ExtendOption::All))
    } else if let Some(stripped) = inner.strip_suffix("all") {
        (stripped.trim_end(), Some(ExtendOption::All))
    } else {
        (inner, Some(ExtendOption::Exact))
    };
    let target = split_simple_selector_chain(target_text);
    Some((
        base,
        Extend {
            target,
            option,
            object_id: 0,
            parent_ids: Vec::new(),
        },
    ))
}

/// A bare-bones split of an extend target string (no combinators expected
/// in practice — `:extend(.a.b)`, `:extend(.a > .b)`) into `Element`s.
fn split_simple_selector_chain(text: &str) -> Vec<Element> {
    let mut elements = Vec::new();
    for (i, raw) in text.split_whitespace().enumerate() {
        if matches!(raw, ">" | "+" | "~") {
            continue;
        }
        let combinator = if i == 0 {
            Combinator::None
        } else {
            Combinator::Descendant
        };
        elements.push(Element::new(combinator, raw));
    }
    if elements.is_empty() && !text.trim().is_empty() {
        elements.push(Element::new(Combinator::None, text.trim()));
    }
    elements
}
