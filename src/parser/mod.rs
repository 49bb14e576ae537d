//! Hand-written recursive-descent parser (spec §4.2). Each method either
//! consumes and returns a node, or returns `Ok(None)`/restores its
//! checkpoint without consuming — the "no-match" contract the spec
//! requires for speculative backtracking.

mod expressions;
mod mixins;
mod scanner;
mod selectors;

use std::rc::Rc;
use std::sync::Arc;

use codemap::File;

use crate::ast::*;
use crate::common::{Combinator, MergeKind};
use crate::error::{LessError, LessResult};
use crate::pos::FileInfo;

use scanner::Scanner;

pub struct Parser {
    scanner: Scanner,
    file: Rc<FileInfo>,
}

/// Parse a whole `.less` file into a root [`Ruleset`] node. `codemap_file`
/// provides span arithmetic; `file_info` carries the filename/import flags
/// that get stamped onto every node produced from this source.
pub fn parse_stylesheet(
    codemap_file: &Arc<File>,
    file_info: Rc<FileInfo>,
) -> LessResult<AstNode> {
    // Fail fast on unbalanced braces/parens/strings before attempting a
    // structural parse (spec §4.1).
    crate::chunker::chunk(codemap_file)?;

    let source = codemap_file.source().to_owned();
    let mut parser = Parser {
        scanner: Scanner::new(Arc::clone(codemap_file), source),
        file: file_info,
    };
    let start = parser.scanner.pos();
    let rules = parser.parse_rules_until_eof()?;
    let span = parser.scanner.span_from(start);
    let mut root = Ruleset::root();
    root.rules = rules;
    Ok(AstNode::new(span, parser.file.clone(), NodeKind::Ruleset(root)))
}

impl Parser {
    fn node(&self, span: codemap::Span, kind: NodeKind) -> AstNode {
        AstNode::new(span, self.file.clone(), kind)
    }

    fn err(&self, message: impl Into<String>) -> LessError {
        LessError::parse(message, self.scanner.span_here())
    }

    fn parse_rules_until_eof(&mut self) -> LessResult<Vec<AstNode>> {
        let mut rules = Vec::new();
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.at_end() {
                break;
            }
            rules.push(self.parse_statement()?);
        }
        Ok(rules)
    }

    fn parse_block(&mut self) -> LessResult<Vec<AstNode>> {
        if !self.scanner.eat_char('{') {
            return Err(self.err("expected '{'"));
        }
        let mut rules = Vec::new();
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.eat_char('}') {
                break;
            }
            if self.scanner.at_end() {
                return Err(self.err("expected '}'"));
            }
            if self.scanner.eat_char(';') {
                continue;
            }
            rules.push(self.parse_statement()?);
        }
        Ok(rules)
    }

    fn parse_statement(&mut self) -> LessResult<AstNode> {
        self.scanner.skip_whitespace();
        if self.scanner.peek() == Some('@') {
            return self.parse_at_statement();
        }

        if let Some(def) = self.try_parse(Self::try_mixin_definition)? {
            return Ok(def);
        }
        if let Some(call) = self.try_parse(Self::try_mixin_call)? {
            return Ok(call);
        }
        if let Some(decl) = self.try_parse(Self::try_declaration)? {
            return Ok(decl);
        }
        if let Some(rs) = self.try_parse(Self::try_ruleset)? {
            return Ok(rs);
        }
        Err(self.err("expected a declaration, mixin call, or ruleset"))
    }

    /// Runs `f`, restoring the scanner if it returns `Ok(None)` or an
    /// error, so a failed alternative never leaves partial side effects
    /// for the next one to trip over.
    fn try_parse<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> LessResult<Option<T>>,
    ) -> LessResult<Option<T>> {
        let cp = self.scanner.checkpoint();
        match f(self) {
            Ok(Some(v)) => Ok(Some(v)),
            Ok(None) => {
                self.scanner.restore(cp);
                Ok(None)
            }
            Err(_) => {
                self.scanner.restore(cp);
                Ok(None)
            }
        }
    }

    fn is_ident_start(c: char) -> bool {
        c.is_alphabetic() || c == '_' || c == '-' || c == '\\'
    }

    fn is_ident_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_' || c == '-'
    }

    fn parse_ident(&mut self) -> Option<String> {
        if !matches!(self.scanner.peek(), Some(c) if Self::is_ident_start(c)) {
            return None;
        }
        Some(self.scanner.take_while(Self::is_ident_char))
    }

    // -- declarations --------------------------------------------------

    fn try_declaration(&mut self) -> LessResult<Option<AstNode>> {
        let start = self.scanner.pos();
        self.scanner.skip_whitespace();

        let variable = self.scanner.peek() == Some('@');
        let property_access = self.scanner.peek() == Some('$');
        if variable || property_access {
            self.scanner.bump();
        }
        let name = match self.parse_ident() {
            Some(n) => n,
            None => return Ok(None),
        };

        let mut merge = None;
        if self.scanner.eat_char('+') {
            if self.scanner.eat_char('_') {
                merge = Some(MergeKind::Space);
            } else {
                merge = Some(MergeKind::Comma);
            }
        }

        self.scanner.skip_whitespace();
        if !self.scanner.eat_char(':') {
            return Ok(None);
        }
        self.scanner.skip_whitespace();

        let value_start = self.scanner.pos();
        let raw = self.scan_declaration_value();
        let mut important = false;
        let trimmed = raw.trim_end();
        let (value_text, detached_body) = if let Some(stripped) = trimmed.strip_suffix("!important") {
            important = true;
            (stripped.trim_end().to_owned(), None)
        } else {
            (trimmed.to_owned(), None)
        };
        let _ = detached_body;

        self.scanner.skip_whitespace();
        self.scanner.eat_char(';');

        let full_name = if property_access {
            format!("${name}")
        } else if variable {
            format!("@{name}")
        } else {
            name.clone()
        };

        let value_span = self.scanner.span_from(value_start);
        let value = if variable && value_text.trim_start().starts_with('{') {
            self.parse_detached_ruleset_literal(&value_text, value_span)?
        } else {
            let mut sub = Parser {
                scanner: Scanner::new(self.scanner.file(), value_text),
                file: self.file.clone(),
            };
            sub.parse_value_list(value_span)?
        };

        let span = self.scanner.span_from(start);
        Ok(Some(self.node(
            span,
            NodeKind::Declaration(Declaration {
                name: full_name,
                value: Box::new(value),
                important,
                merge,
                inline: false,
                variable,
                index: 0,
            }),
        )))
    }

    /// Scan raw declaration value text up to the terminating `;` or block
    /// `}` at depth 0, respecting nested parens/strings the same way the
    /// chunker does.
    fn scan_declaration_value(&mut self) -> String {
        let mut out = String::new();
        let mut depth = 0i32;
        loop {
            match self.scanner.peek() {
                None => break,
                Some(';') if depth == 0 => break,
                Some('}') if depth == 0 => break,
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

    fn parse_detached_ruleset_literal(
        &mut self,
        text: &str,
        span: codemap::Span,
    ) -> LessResult<AstNode> {
        let trimmed = text.trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .ok_or_else(|| LessError::parse("malformed detached ruleset", span))?;
        let mut sub = Parser {
            scanner: Scanner::new(self.scanner.file(), inner.to_owned()),
            file: self.file.clone(),
        };
        let rules = sub.parse_rules_until_eof()?;
        Ok(self.node(
            span,
            NodeKind::DetachedRuleset(DetachedRuleset {
                rules,
                frames: None,
            }),
        ))
    }

    // -- at-rules --------------------------------------------------------

    fn parse_at_statement(&mut self) -> LessResult<AstNode> {
        let start = self.scanner.pos();
        let cp = self.scanner.checkpoint();
        self.scanner.bump(); // '@'
        let name = self.parse_ident().ok_or_else(|| self.err("expected at-rule name"))?;

        match name.as_str() {
            "media" => self.parse_media(start),
            "import" => self.parse_import(start),
            "plugin" => self.parse_plugin_statement(start),
            "charset" | "namespace" => self.parse_simple_at_statement(start, &name),
            "supports" | "container" | "document" | "layer" | "keyframes" | "-moz-keyframes"
            | "-webkit-keyframes" | "page" | "font-face" | "viewport" | "counter-style" => {
                self.parse_generic_at_rule(start, &name)
            }
            _ => {
                self.scanner.restore(cp);
                self.parse_variable_statement(start)
            }
        }
    }

    fn parse_variable_statement(&mut self, start: usize) -> LessResult<AstNode> {
        if let Some(decl) = self.try_parse(Self::try_declaration)? {
            return Ok(decl);
        }
        if let Some(call) = self.try_parse(Self::try_mixin_call)? {
            return Ok(call);
        }
        let _ = start;
        Err(self.err("malformed @-statement"))
    }

    fn parse_media(&mut self, start: usize) -> LessResult<AstNode> {
        self.scanner.skip_whitespace();
        let feature_text = self.scan_prelude();
        let features = self.parse_value_list_text(&feature_text)?;
        self.scanner.skip_whitespace();
        let rules = self.parse_block()?;
        let span = self.scanner.span_from(start);
        Ok(self.node(span, NodeKind::Media(Media { features, rules })))
    }

    fn parse_import(&mut self, start: usize) -> LessResult<AstNode> {
        self.scanner.skip_whitespace();
        let mut options = ImportOptions::default();
        if self.scanner.eat_char('(') {
            loop {
                self.scanner.skip_whitespace();
                let opt = self.parse_ident().ok_or_else(|| self.err("expected import option"))?;
                match opt.as_str() {
                    "reference" => options.reference = true,
                    "inline" => options.inline = true,
                    "css" => options.css = true,
                    "less" => options.less = true,
                    "multiple" => options.multiple = true,
                    "once" => options.once = true,
                    "optional" => options.optional = true,
                    other => return Err(self.err(format!("unknown import option `{other}`"))),
                }
                self.scanner.skip_whitespace();
                if self.scanner.eat_char(',') {
                    continue;
                }
                break;
            }
            if !self.scanner.eat_char(')') {
                return Err(self.err("expected ')' after import options"));
            }
            self.scanner.skip_whitespace();
        }

        let path_start = self.scanner.pos();
        let path = self.parse_primary_value()?.ok_or_else(|| self.err("expected import path"))?;
        let _ = path_start;

        self.scanner.skip_whitespace();
        let features_text = self.scan_prelude();
        let features = if features_text.trim().is_empty() {
            None
        } else {
            Some(match self.parse_value_list_text(&features_text)?.kind {
                NodeKind::Value(v) => v,
                _ => ValueList { children: Vec::new() },
            })
        };
        self.scanner.eat_char(';');

        let span = self.scanner.span_from(start);
        Ok(self.node(
            span,
            NodeKind::Import(Import {
                path: Box::new(path),
                features,
                options,
                is_css: if options.css {
                    Some(true)
                } else if options.less {
                    Some(false)
                } else {
                    None
                },
            }),
        ))
    }

    fn parse_plugin_statement(&mut self, start: usize) -> LessResult<AstNode> {
        self.scanner.skip_whitespace();
        let path = self.parse_primary_value()?.ok_or_else(|| self.err("expected plugin path"))?;
        self.scanner.skip_whitespace();
        self.scanner.eat_char(';');
        let span = self.scanner.span_from(start);
        Ok(self.node(
            span,
            NodeKind::Import(Import {
                path: Box::new(path),
                features: None,
                options: ImportOptions {
                    plugin: true,
                    ..ImportOptions::default()
                },
                is_css: Some(false),
            }),
        ))
    }

    fn parse_simple_at_statement(&mut self, start: usize, name: &str) -> LessResult<AstNode> {
        self.scanner.skip_whitespace();
        let prelude = self.scan_prelude();
        self.scanner.eat_char(';');
        let span = self.scanner.span_from(start);
        Ok(self.node(
            span,
            NodeKind::AtRule(AtRuleNode {
                name: format!("@{name}"),
                prelude: prelude.trim().to_owned(),
                rules: None,
            }),
        ))
    }

    fn parse_generic_at_rule(&mut self, start: usize, name: &str) -> LessResult<AstNode> {
        self.scanner.skip_whitespace();
        let prelude = self.scan_prelude();
        self.scanner.skip_whitespace();
        let rules = if self.scanner.peek() == Some('{') {
            Some(self.parse_block()?)
        } else {
            self.scanner.eat_char(';');
            None
        };
        let span = self.scanner.span_from(start);
        Ok(self.node(
            span,
            NodeKind::AtRule(AtRuleNode {
                name: format!("@{name}"),
                prelude: prelude.trim().to_owned(),
                rules,
            }),
        ))
    }

    /// Scan up to (not including) the next top-level `{`, `;`, or `}`.
    fn scan_prelude(&mut self) -> String {
        let mut out = String::new();
        let mut depth = 0i32;
        loop {
            match self.scanner.peek() {
                None => break,
                Some('{' | ';' | '}') if depth == 0 => break,
                Some('(') => {
                    depth += 1;
                    out.push(self.scanner.bump().unwrap());
                }
                Some(')') => {
                    depth -= 1;
                    out.push(self.scanner.bump().unwrap());
                }
                Some(_) => out.push(self.scanner.bump().unwrap()),
            }
        }
        out
    }

    fn parse_value_list_text(&mut self, text: &str) -> LessResult<AstNode> {
        let span = self.scanner.span_here();
        let mut sub = Parser {
            scanner: Scanner::new(self.scanner.file(), text.to_owned()),
            file: self.file.clone(),
        };
        sub.parse_value_list(span)
    }
}
