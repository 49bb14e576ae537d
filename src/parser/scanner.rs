//! Character-level cursor shared by every parser submodule. Tracks byte
//! offsets against the owning `codemap::File` so any node built from it can
//! mint a real `Span` directly. Backtracking (spec §4.2: "returns no-match
//! without consuming") is a plain saved byte offset, since the source text
//! itself is the only state a restore needs to rewind.
//!
//! Owns its source text rather than borrowing it so that sub-parses over
//! synthesized text (a declaration value re-scanned on its own, a detached
//! ruleset's inner body) don't need to thread a lifetime back to the
//! original file's buffer.

use std::sync::Arc;

use codemap::{File, Span};

pub struct Scanner {
    file: Arc<File>,
    source: String,
    pos: usize,
}

impl Scanner {
    pub fn new(file: Arc<File>, source: impl Into<String>) -> Self {
        Scanner {
            file,
            source: source.into(),
            pos: 0,
        }
    }

    pub fn file(&self) -> Arc<File> {
        Arc::clone(&self.file)
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn span_from(&self, start: usize) -> Span {
        self.file.span.subspan(start as u64, self.pos as u64)
    }

    pub fn span_here(&self) -> Span {
        self.file.span.subspan(self.pos as u64, self.pos as u64)
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub fn eat_char(&mut self, expect: char) -> bool {
        if self.peek() == Some(expect) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Case-insensitive keyword match (`@media`, `when`, ...). Consumes on
    /// success only.
    pub fn eat_keyword(&mut self, expect: &str) -> bool {
        if self.rest().len() < expect.len() {
            return false;
        }
        if self.rest()[..expect.len()].eq_ignore_ascii_case(expect) {
            self.pos += expect.len();
            true
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                    skipped = true;
                }
                Some('/') if self.peek_nth(1) == Some('*') => {
                    self.pos += 2;
                    while !(self.peek() == Some('*') && self.peek_nth(1) == Some('/')) {
                        if self.bump().is_none() {
                            break;
                        }
                    }
                    self.bump();
                    self.bump();
                    skipped = true;
                }
                Some('/') if self.peek_nth(1) == Some('/') => {
                    while !matches!(self.peek(), Some('\n') | None) {
                        self.bump();
                    }
                    skipped = true;
                }
                _ => break,
            }
        }
        skipped
    }

    /// A cheap checkpoint for speculative backtracking: the parser saves
    /// this before trying an alternative and restores it on failure
    /// without ever having mutated tree state (spec §4.2, "no-match"
    /// contract).
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint { pos: self.pos }
    }

    pub fn restore(&mut self, cp: Checkpoint) {
        self.pos = cp.pos;
    }

    /// Consume characters while `pred` holds, returning the consumed text.
    pub fn take_while(&mut self, mut pred: impl FnMut(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if pred(c) {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    pos: usize,
}
