//! Value grammar (spec §4.2 "Expressions"): comma-separated `Value` of
//! whitespace-separated `Expression`s, precedence-climbed arithmetic
//! (additive < multiplicative < unary < primary), and value atoms.

use crate::ast::*;
use crate::color::Color;
use crate::common::Op;
use crate::error::LessResult;
use crate::unit::Unit;

use super::Parser;

impl Parser {
    /// `Value`: comma-separated list of `Expression`s.
    pub(super) fn parse_value_list(&mut self, span: codemap::Span) -> LessResult<AstNode> {
        let mut children = Vec::new();
        self.scanner.skip_whitespace();
        loop {
            let expr = self.parse_expression()?;
            children.push(expr);
            self.scanner.skip_whitespace();
            if self.scanner.eat_char(',') {
                self.scanner.skip_whitespace();
                continue;
            }
            break;
        }
        if children.len() == 1 {
            return Ok(children.into_iter().next().unwrap());
        }
        let exprs = children
            .into_iter()
            .map(|n| match n.kind {
                NodeKind::Expression(e) => e,
                other => Expression::new(vec![AstNode::new(n.meta.span, n.meta.file.clone(), other)]),
            })
            .collect();
        Ok(self.node(span, NodeKind::Value(ValueList { children: exprs })))
    }

    /// One whitespace-separated `Expression`: a run of additive terms.
    pub(super) fn parse_expression(&mut self) -> LessResult<AstNode> {
        let start = self.scanner.pos();
        let mut children = Vec::new();
        loop {
            self.scanner.skip_whitespace();
            match self.scanner.peek() {
                None | Some(',' | ';' | ')' | '}' | '!') => break,
                _ => {}
            }
            let before = self.scanner.pos();
            let term = self.parse_additive()?;
            if self.scanner.pos() == before {
                break;
            }
            children.push(term);
        }
        let span = self.scanner.span_from(start);
        if children.len() == 1 {
            return Ok(children.into_iter().next().unwrap());
        }
        Ok(self.node(span, NodeKind::Expression(Expression::new(children))))
    }

    fn parse_additive(&mut self) -> LessResult<AstNode> {
        let start = self.scanner.pos();
        let mut left = self.parse_multiplicative()?;
        loop {
            let spaced_before = self.scanner.rest().starts_with(' ');
            let cp = self.scanner.checkpoint();
            self.scanner.skip_whitespace();
            let op = match self.scanner.peek() {
                Some('+') => Op::Add,
                Some('-') if self.peek_is_binary_minus() => Op::Sub,
                _ => {
                    self.scanner.restore(cp);
                    break;
                }
            };
            self.scanner.bump();
            let spaced_after = self.scanner.skip_whitespace() || spaced_before;
            let right = self.parse_multiplicative()?;
            let span = self.scanner.span_from(start);
            left = self.node(
                span,
                NodeKind::Operation(Operation {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    is_spaced: spaced_after,
                    in_parens: false,
                }),
            );
        }
        Ok(left)
    }

    /// A `-` only reads as a binary operator when it isn't immediately
    /// followed by a digit/`.`/`@` glued to the previous token (`-5`,
    /// `-@x` parse as a negative primary instead, spec §4.2 "unary
    /// (negative)").
    fn peek_is_binary_minus(&self) -> bool {
        !matches!(self.scanner.peek_nth(1), Some(c) if c.is_ascii_digit() || c == '.' || c == '@')
    }

    fn parse_multiplicative(&mut self) -> LessResult<AstNode> {
        let start = self.scanner.pos();
        let mut left = self.parse_unary()?;
        loop {
            let cp = self.scanner.checkpoint();
            self.scanner.skip_whitespace();
            let op = match self.scanner.peek() {
                Some('*') => Op::Mul,
                Some('/') => Op::Div,
                _ => {
                    self.scanner.restore(cp);
                    break;
                }
            };
            self.scanner.bump();
            self.scanner.skip_whitespace();
            let right = self.parse_unary()?;
            let span = self.scanner.span_from(start);
            left = self.node(
                span,
                NodeKind::Operation(Operation {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    is_spaced: true,
                    in_parens: false,
                }),
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> LessResult<AstNode> {
        let start = self.scanner.pos();
        if self.scanner.peek() == Some('-')
            && matches!(self.scanner.peek_nth(1), Some(c) if c.is_ascii_digit() || c == '.' || c == '@' || c == '(')
        {
            self.scanner.bump();
            let inner = self.parse_unary()?;
            let span = self.scanner.span_from(start);
            return Ok(self.node(span, NodeKind::Negative(Box::new(inner))));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> LessResult<AstNode> {
        self.parse_primary_value()?.ok_or_else(|| self.err("expected a value"))
    }

    /// A single value atom: number, color, string, url, variable,
    /// property, function call, keyword, or parenthesized sub-expression.
    /// Returns `Ok(None)` rather than erroring so callers (e.g. the import
    /// path parser) can treat "nothing here" as a distinct, recoverable
    /// outcome.
    pub(super) fn parse_primary_value(&mut self) -> LessResult<Option<AstNode>> {
        self.scanner.skip_whitespace();
        let start = self.scanner.pos();
        match self.scanner.peek() {
            None => Ok(None),
            Some('(') => {
                self.scanner.bump();
                self.scanner.skip_whitespace();
                let mut inner = self.parse_additive_in_parens()?;
                if let NodeKind::Operation(op) = &mut inner.kind {
                    op.in_parens = true;
                }
                self.scanner.skip_whitespace();
                if !self.scanner.eat_char(')') {
                    return Err(self.err("expected ')'"));
                }
                let span = self.scanner.span_from(start);
                Ok(Some(self.node(
                    span,
                    NodeKind::Paren(Paren {
                        child: Box::new(inner),
                    }),
                )))
            }
            Some('"' | '\'') => Ok(Some(self.parse_quoted(false)?)),
            Some('~') if matches!(self.scanner.peek_nth(1), Some('"' | '\'')) => {
                self.scanner.bump();
                Ok(Some(self.parse_quoted(true)?))
            }
            Some('`') => Ok(Some(self.parse_javascript()?)),
            Some('#') if self.looks_like_color() => Ok(Some(self.parse_color()?)),
            Some('@') if self.scanner.peek_nth(1) == Some('@') => {
                self.scanner.bump();
                self.scanner.bump();
                let name = self.parse_ident().ok_or_else(|| self.err("expected variable name"))?;
                let span = self.scanner.span_from(start);
                Ok(Some(self.node(span, NodeKind::VariableCall(VariableCall { name }))))
            }
            Some('@') => {
                self.scanner.bump();
                let name = self.parse_ident().ok_or_else(|| self.err("expected variable name"))?;
                let span = self.scanner.span_from(start);
                Ok(Some(self.node(span, NodeKind::Variable(Variable::new(name)))))
            }
            Some('$') => {
                self.scanner.bump();
                let name = self.parse_ident().ok_or_else(|| self.err("expected property name"))?;
                let span = self.scanner.span_from(start);
                Ok(Some(self.node(span, NodeKind::Property(Property { name }))))
            }
            Some(c) if c.is_ascii_digit() || (c == '.' && matches!(self.scanner.peek_nth(1), Some(d) if d.is_ascii_digit())) => {
                Ok(Some(self.parse_dimension()?))
            }
            Some(c) if Self::is_ident_start(c) => {
                let ident = self.parse_ident().unwrap();
                if ident.eq_ignore_ascii_case("url") && self.scanner.peek() == Some('(') {
                    return Ok(Some(self.parse_url(start)?));
                }
                if self.scanner.peek() == Some('(') {
                    return Ok(Some(self.parse_call(start, ident)?));
                }
                if let Some(color) = Color::from_name(&ident) {
                    if matches!(ident.as_str(), "transparent") {
                        let span = self.scanner.span_from(start);
                        return Ok(Some(self.node(span, NodeKind::Keyword(Keyword::new(ident)))));
                    }
                    let span = self.scanner.span_from(start);
                    return Ok(Some(self.node(span, NodeKind::Color(color.with_source_text(ident)))));
                }
                let span = self.scanner.span_from(start);
                Ok(Some(self.node(span, NodeKind::Keyword(Keyword::new(ident)))))
            }
            Some(_) => {
                // Anything else (bare punctuation in a declaration value,
                // e.g. a grid-template string, attribute selector leaking
                // through) is preserved verbatim as an opaque atom.
                let text = self.scanner.take_while(|c| !c.is_whitespace() && c != ',' && c != ';' && c != ')');
                if text.is_empty() {
                    return Ok(None);
                }
                let span = self.scanner.span_from(start);
                Ok(Some(self.node(span, NodeKind::Anonymous(Anonymous::text(text)))))
            }
        }
    }

    fn parse_additive_in_parens(&mut self) -> LessResult<AstNode> {
        self.parse_additive()
    }

    fn looks_like_color(&self) -> bool {
        let hex_len = self
            .scanner
            .rest()
            .chars()
            .skip(1)
            .take_while(|c| c.is_ascii_hexdigit())
            .count();
        matches!(hex_len, 3 | 4 | 6 | 8)
    }

    fn parse_color(&mut self) -> LessResult<AstNode> {
        let start = self.scanner.pos();
        self.scanner.bump();
        let hex = self.scanner.take_while(|c| c.is_ascii_hexdigit());
        let color = Color::from_hex(&hex).ok_or_else(|| self.err("invalid color literal"))?;
        let span = self.scanner.span_from(start);
        Ok(self.node(span, NodeKind::Color(color.with_source_text(format!("#{hex}")))))
    }

    fn parse_dimension(&mut self) -> LessResult<AstNode> {
        let start = self.scanner.pos();
        let mut text = self.scanner.take_while(|c| c.is_ascii_digit());
        if self.scanner.peek() == Some('.') {
            text.push(self.scanner.bump().unwrap());
            text.push_str(&self.scanner.take_while(|c| c.is_ascii_digit()));
        }
        if matches!(self.scanner.peek(), Some('e' | 'E'))
            && matches!(self.scanner.peek_nth(1), Some(c) if c.is_ascii_digit() || c == '+' || c == '-')
        {
            text.push(self.scanner.bump().unwrap());
            if matches!(self.scanner.peek(), Some('+' | '-')) {
                text.push(self.scanner.bump().unwrap());
            }
            text.push_str(&self.scanner.take_while(|c| c.is_ascii_digit()));
        }
        let value: f64 = text.parse().map_err(|_| self.err("malformed number"))?;
        let unit_text = if self.scanner.peek() == Some('%') {
            self.scanner.bump();
            "%".to_owned()
        } else {
            self.scanner.take_while(|c| c.is_ascii_alphabetic())
        };
        let unit = if unit_text.is_empty() {
            Unit::unitless()
        } else {
            Unit::single(unit_text)
        };
        let span = self.scanner.span_from(start);
        Ok(self.node(span, NodeKind::Dimension(Dimension::new(value, unit))))
    }

    fn parse_quoted(&mut self, escaped: bool) -> LessResult<AstNode> {
        let start = self.scanner.pos();
        let quote = self.scanner.bump().unwrap();
        let mut content = String::new();
        loop {
            match self.scanner.peek() {
                None => return Err(self.err("unterminated string")),
                Some('\\') => {
                    self.scanner.bump();
                    if let Some(c) = self.scanner.bump() {
                        content.push(c);
                    }
                }
                Some(c) if c == quote => {
                    self.scanner.bump();
                    break;
                }
                Some(_) => content.push(self.scanner.bump().unwrap()),
            }
        }
        let span = self.scanner.span_from(start);
        Ok(self.node(
            span,
            NodeKind::Quoted(Quoted {
                quote_char: Some(quote),
                content,
                escaped,
            }),
        ))
    }

    fn parse_javascript(&mut self) -> LessResult<AstNode> {
        let start = self.scanner.pos();
        self.scanner.bump();
        let mut expr = String::new();
        loop {
            match self.scanner.peek() {
                None => return Err(self.err("unterminated JavaScript expression")),
                Some('`') => {
                    self.scanner.bump();
                    break;
                }
                Some(_) => expr.push(self.scanner.bump().unwrap()),
            }
        }
        let span = self.scanner.span_from(start);
        Ok(self.node(
            span,
            NodeKind::JavaScript(JavaScriptNode {
                expression: expr,
                escaped: false,
            }),
        ))
    }

    fn parse_url(&mut self, start: usize) -> LessResult<AstNode> {
        self.scanner.bump(); // '('
        self.scanner.skip_whitespace();
        let inner = if matches!(self.scanner.peek(), Some('"' | '\'')) {
            self.parse_quoted(false)?
        } else {
            let text = self.scanner.take_while(|c| c != ')').trim_end().to_owned();
            let span = self.scanner.span_here();
            self.node(span, NodeKind::Anonymous(Anonymous::text(text)))
        };
        self.scanner.skip_whitespace();
        if !self.scanner.eat_char(')') {
            return Err(self.err("expected ')' closing url()"));
        }
        let span = self.scanner.span_from(start);
        Ok(self.node(
            span,
            NodeKind::Url(Url {
                value: Box::new(inner),
                is_evald: false,
            }),
        ))
    }

    fn parse_call(&mut self, start: usize, name: String) -> LessResult<AstNode> {
        self.scanner.bump(); // '('
        let calc = name.eq_ignore_ascii_case("calc");
        let mut args = Vec::new();
        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(')') {
            loop {
                let arg = self.parse_expression()?;
                let arg = match arg.kind {
                    NodeKind::Expression(e) => e,
                    other => Expression::new(vec![AstNode::new(arg.meta.span, arg.meta.file, other)]),
                };
                args.push(arg);
                self.scanner.skip_whitespace();
                if self.scanner.eat_char(',') {
                    self.scanner.skip_whitespace();
                    continue;
                }
                break;
            }
        }
        if !self.scanner.eat_char(')') {
            return Err(self.err("expected ')' closing function call"));
        }
        let span = self.scanner.span_from(start);
        Ok(self.node(span, NodeKind::Call(Call { name, args, calc })))
    }
}
