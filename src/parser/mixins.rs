//! Mixin definitions and calls (spec §4.2 "Mixins", §4.3 "Guards"):
//! `.name(params) when (guard) { }` and `.name(args);`.
//!
//! A mixin's head never legitimately contains a paren of its own, so
//! unlike [`super::selectors`]'s general selector scan, the element text
//! here stops flatly at the first unconsumed `(`.

use std::cell::RefCell;

use crate::ast::*;
use crate::common::Combinator;
use crate::error::LessResult;

use super::Parser;

impl Parser {
    /// `.name(params) when (guard) { rules }` (spec §4.2 "Mixins").
    pub(super) fn try_mixin_definition(&mut self) -> LessResult<Option<AstNode>> {
        let start = self.scanner.pos();
        if !matches!(self.scanner.peek(), Some('.') | Some('#')) {
            return Ok(None);
        }
        let name = match self.parse_mixin_head()? {
            Some(n) => n,
            None => return Ok(None),
        };
        self.scanner.skip_whitespace();
        if !self.scanner.eat_char('(') {
            return Ok(None);
        }
        let (params, variadic) = self.parse_mixin_params()?;
        self.scanner.skip_whitespace();
        if !self.scanner.eat_char(')') {
            return Ok(None);
        }
        self.scanner.skip_whitespace();
        let guard = self.try_parse_guard()?;
        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some('{') {
            return Ok(None);
        }
        let rules = self.parse_block()?;
        let span = self.scanner.span_from(start);
        Ok(Some(self.node(
            span,
            NodeKind::MixinDefinition(MixinDefinition {
                name,
                params,
                guard,
                rules,
                variadic,
                closure: RefCell::new(None),
            }),
        )))
    }

    pub(super) fn try_mixin_call(&mut self) -> LessResult<Option<AstNode>> {
        let start = self.scanner.pos();
        if !matches!(self.scanner.peek(), Some('.') | Some('#') | Some('@')) {
            return Ok(None);
        }
        let selector = match self.parse_mixin_call_selector()? {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(None),
        };
        self.scanner.skip_whitespace();
        let args = if self.scanner.eat_char('(') {
            let args = self.parse_call_args()?;
            self.scanner.skip_whitespace();
            if !self.scanner.eat_char(')') {
                return Ok(None);
            }
            args
        } else {
            Vec::new()
        };
        self.scanner.skip_whitespace();
        let important = self.eat_important();
        self.scanner.skip_whitespace();
        if !(self.scanner.eat_char(';') || self.scanner.peek() == Some('}') || self.scanner.at_end())
        {
            return Ok(None);
        }
        let span = self.scanner.span_from(start);
        Ok(Some(self.node(
            span,
            NodeKind::MixinCall(MixinCall {
                selector,
                args,
                important,
            }),
        )))
    }

    fn eat_important(&mut self) -> bool {
        if self.scanner.peek() != Some('!') {
            return false;
        }
        let cp = self.scanner.checkpoint();
        self.scanner.bump();
        self.scanner.skip_whitespace();
        if self.scanner.eat_keyword("important") {
            true
        } else {
            self.scanner.restore(cp);
            false
        }
    }

    /// One `.mixin`/`#ns.mixin`/`#ns > .mixin` name chain used by a
    /// definition: elements glued with no significant combinator info
    /// carried through to calls, so this just returns the flattened name
    /// of the last segment.
    fn parse_mixin_head(&mut self) -> LessResult<Option<String>> {
        let mut last = None;
        loop {
            self.scanner.skip_whitespace();
            match self.scanner.peek() {
                Some('.') | Some('#') => {
                    let text = self.parse_mixin_name_element();
                    if text.is_empty() {
                        return Ok(None);
                    }
                    last = Some(text.trim_start_matches(['.', '#']).to_owned());
                }
                _ => break,
            }
            self.scanner.skip_whitespace();
            if self.scanner.eat_char('>') {
                continue;
            }
            break;
        }
        Ok(last)
    }

    fn parse_mixin_call_selector(&mut self) -> LessResult<Option<Vec<Element>>> {
        let mut elements = Vec::new();
        let mut first = true;
        loop {
            let ws = self.scanner.skip_whitespace();
            let combinator = if first {
                Combinator::None
            } else if self.scanner.eat_char('>') {
                self.scanner.skip_whitespace();
                Combinator::Child
            } else if ws {
                Combinator::Descendant
            } else {
                break;
            };
            if !matches!(self.scanner.peek(), Some('.') | Some('#') | Some('@')) {
                if first {
                    return Ok(None);
                }
                break;
            }
            let text = self.parse_mixin_name_element();
            if text.is_empty() {
                return Ok(None);
            }
            elements.push(Element::new(combinator, text));
            first = false;
        }
        Ok(Some(elements))
    }

    /// One `.name`/`#name`/`@name` token, stopping flat at the first `(`.
    fn parse_mixin_name_element(&mut self) -> String {
        let mut out = String::new();
        if matches!(self.scanner.peek(), Some('.') | Some('#') | Some('@')) {
            out.push(self.scanner.bump().unwrap());
        }
        out.push_str(&self.scanner.take_while(|c| {
            c.is_alphanumeric() || c == '-' || c == '_' || c == '\\'
        }));
        out
    }

    fn parse_mixin_params(&mut self) -> LessResult<(Vec<MixinParam>, bool)> {
        let mut params = Vec::new();
        let mut variadic = false;
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.peek() == Some(')') || self.scanner.at_end() {
                break;
            }
            if self.scanner.rest().starts_with("...") {
                self.scanner.bump();
                self.scanner.bump();
                self.scanner.bump();
                variadic = true;
                self.scanner.skip_whitespace();
                let name = if self.scanner.eat_char('@') {
                    self.parse_ident().unwrap_or_default()
                } else {
                    String::new()
                };
                params.push(MixinParam {
                    name,
                    default: None,
                    variadic: true,
                    literal: None,
                });
                self.scanner.skip_whitespace();
                self.scanner.eat_char(',');
                self.scanner.eat_char(';');
                continue;
            }

            let is_var = self.scanner.eat_char('@');
            if is_var {
                let name = self.parse_ident().unwrap_or_default();
                let mut default = None;
                let mut param_variadic = false;
                self.scanner.skip_whitespace();
                if self.scanner.eat_char(':') {
                    self.scanner.skip_whitespace();
                    let text = self.scan_param_value();
                    let span = self.scanner.span_here();
                    let value = self.parse_value_list_text(&text)?;
                    default = Some(match value.kind {
                        NodeKind::Expression(e) => e,
                        other => Expression::new(vec![AstNode::new(span, self.file.clone(), other)]),
                    });
                } else if self.scanner.rest().starts_with("...") {
                    self.scanner.bump();
                    self.scanner.bump();
                    self.scanner.bump();
                    param_variadic = true;
                    variadic = true;
                }
                params.push(MixinParam {
                    name,
                    default,
                    variadic: param_variadic,
                    literal: None,
                });
            } else {
                // A bare (non-`@`) parameter is a literal pattern: the
                // call's actual argument at this position must render
                // identically to it, not bind to a variable (spec §4.3
                // "pattern-matching literal arguments").
                let literal = self
                    .parse_primary_value()?
                    .ok_or_else(|| self.err("expected a literal mixin parameter pattern"))?;
                params.push(MixinParam {
                    name: String::new(),
                    default: None,
                    variadic: false,
                    literal: Some(literal),
                });
            }
            self.scanner.skip_whitespace();
            if self.scanner.eat_char(',') || self.scanner.eat_char(';') {
                continue;
            }
            break;
        }
        Ok((params, variadic))
    }

    /// Scan one parameter default or call argument up to the next
    /// top-level `,`, `;`, or `)`.
    fn scan_param_value(&mut self) -> String {
        let mut out = String::new();
        let mut depth = 0i32;
        loop {
            match self.scanner.peek() {
                None => break,
                Some(')') if depth == 0 => break,
                Some(',' | ';') if depth == 0 => break,
                Some('(') => {
                    depth += 1;
                    out.push(self.scanner.bump().unwrap());
                }
                Some(')') => {
                    depth -= 1;
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

    fn parse_call_args(&mut self) -> LessResult<Vec<CallArg>> {
        let mut args = Vec::new();
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.peek() == Some(')') || self.scanner.at_end() {
                break;
            }
            let cp = self.scanner.checkpoint();
            let mut name = None;
            if self.scanner.eat_char('@') {
                if let Some(ident) = self.parse_ident() {
                    self.scanner.skip_whitespace();
                    if self.scanner.eat_char(':') {
                        name = Some(ident);
                    } else {
                        self.scanner.restore(cp);
                    }
                } else {
                    self.scanner.restore(cp);
                }
            }
            self.scanner.skip_whitespace();
            let text = self.scan_param_value();
            let span = self.scanner.span_here();
            let value_node = self.parse_value_list_text(&text)?;
            let value = match value_node.kind {
                NodeKind::Expression(e) => e,
                other => Expression::new(vec![AstNode::new(span, self.file.clone(), other)]),
            };
            args.push(CallArg { name, value });
            self.scanner.skip_whitespace();
            if self.scanner.eat_char(',') || self.scanner.eat_char(';') {
                continue;
            }
            break;
        }
        Ok(args)
    }

    // -- guards ------------------------------------------------------------

    fn try_parse_guard(&mut self) -> LessResult<Option<MixinGuard>> {
        let cp = self.scanner.checkpoint();
        if !self.scanner.eat_keyword("when") {
            return Ok(None);
        }
        let next_ok = !matches!(self.scanner.peek(), Some(c) if Self::is_ident_char(c));
        if !next_ok {
            self.scanner.restore(cp);
            return Ok(None);
        }
        self.scanner.skip_whitespace();
        let mut groups = vec![self.parse_guard_group()?];
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.eat_char(',') {
                self.scanner.skip_whitespace();
                groups.push(self.parse_guard_group()?);
                continue;
            }
            break;
        }
        Ok(Some(MixinGuard { groups }))
    }

    fn parse_guard_group(&mut self) -> LessResult<MixinGuardGroup> {
        let mut terms = vec![self.parse_guard_term()?];
        loop {
            self.scanner.skip_whitespace();
            let cp = self.scanner.checkpoint();
            if self.scanner.eat_keyword("and") {
                let next_ok = !matches!(self.scanner.peek(), Some(c) if Self::is_ident_char(c));
                if next_ok {
                    self.scanner.skip_whitespace();
                    terms.push(self.parse_guard_term()?);
                    continue;
                }
            }
            self.scanner.restore(cp);
            break;
        }
        Ok(MixinGuardGroup { terms })
    }

    fn parse_guard_term(&mut self) -> LessResult<GuardTerm> {
        let negate = if self.scanner.eat_keyword("not") {
            self.scanner.skip_whitespace();
            true
        } else {
            false
        };
        if !self.scanner.eat_char('(') {
            return Err(self.err("expected '(' in guard"));
        }
        self.scanner.skip_whitespace();

        let cp = self.scanner.checkpoint();
        if self.scanner.eat_keyword("default") {
            self.scanner.skip_whitespace();
            if self.scanner.eat_char('(') {
                self.scanner.skip_whitespace();
                if self.scanner.eat_char(')') {
                    self.scanner.skip_whitespace();
                    if self.scanner.eat_char(')') {
                        return Ok(GuardTerm::Default);
                    }
                }
            }
            self.scanner.restore(cp);
        }

        let lvalue = self.parse_guard_operand()?;
        self.scanner.skip_whitespace();
        let op = self.parse_guard_op();
        let rvalue = if op.is_empty() {
            None
        } else {
            self.scanner.skip_whitespace();
            Some(Box::new(self.parse_guard_operand()?))
        };
        self.scanner.skip_whitespace();
        if !self.scanner.eat_char(')') {
            return Err(self.err("expected ')' closing guard condition"));
        }
        Ok(GuardTerm::Condition(Condition {
            op,
            lvalue: Box::new(lvalue),
            rvalue,
            negate,
        }))
    }

    fn parse_guard_operand(&mut self) -> LessResult<AstNode> {
        self.parse_expression()
    }

    fn parse_guard_op(&mut self) -> String {
        self.scanner.skip_whitespace();
        for op in ["=<", ">=", "=", ">", "<"] {
            if self.scanner.rest().starts_with(op) {
                for _ in 0..op.chars().count() {
                    self.scanner.bump();
                }
                return if op == "=<" { "<=".to_owned() } else { op.to_owned() };
            }
        }
        String::new()
    }
}
