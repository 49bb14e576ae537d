//! Source position tracking, shared by the chunker, parser and evaluator.
//!
//! Every AST node carries a `codemap::Span` rather than a bare byte offset
//! so that a `ParseError` (or any later `LessError`) can be rendered with a
//! caret-pointing source extract, the way the reference implementation's
//! errors look.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use codemap::{CodeMap, File, Span};
use codemap_diagnostic::{Diagnostic, Emitter, Level, SpanLabel, SpanStyle};

/// One file's worth of bookkeeping: its `codemap` handle plus the `(reference)`
/// / `(inline)` / root-directory flags the import manager threads through
/// every node parsed from it (spec §3, "common node attributes").
#[derive(Clone, Debug)]
pub struct FileInfo {
    pub filename: PathBuf,
    /// Directory used to resolve further relative `@import`s from this file.
    pub current_directory: PathBuf,
    /// Prepended to rewritten relative URLs (`Options::rootpath`).
    pub rootpath: String,
    /// Set by `@import (reference)`; propagates into every node parsed from
    /// this file (spec §4.4).
    pub reference: bool,
}

impl FileInfo {
    pub fn entry(filename: impl Into<PathBuf>) -> Self {
        let filename = filename.into();
        let current_directory = filename
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        FileInfo {
            filename,
            current_directory,
            rootpath: String::new(),
            reference: false,
        }
    }
}

/// Thread-safe wrapper around `codemap::CodeMap`. One instance is shared for
/// the lifetime of a single compile; every resolved import registers its
/// text and gets back a fresh `Arc<File>` to mint spans from.
#[derive(Clone)]
pub struct SourceMap {
    inner: Arc<Mutex<CodeMap>>,
}

impl Default for SourceMap {
    fn default() -> Self {
        SourceMap {
            inner: Arc::new(Mutex::new(CodeMap::new())),
        }
    }
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, name: String, source: String) -> Arc<File> {
        self.inner.lock().unwrap().add_file(name, source)
    }

    pub fn look_up_span(&self, span: Span) -> codemap::SpanLoc {
        self.inner.lock().unwrap().look_up_span(span)
    }

    /// Render a `(line, column, extracted line text)` triple the way
    /// `ParseError`'s `extract` field is documented to carry.
    pub fn extract(&self, span: Span) -> (u64, u64, String) {
        let map = self.inner.lock().unwrap();
        let loc = map.look_up_span(span);
        let file = map.find_file(span.low());
        let line = file
            .source_line(loc.begin.line)
            .trim_end_matches(['\n', '\r'])
            .to_owned();
        (loc.begin.line as u64 + 1, loc.begin.column as u64 + 1, line)
    }

    /// Render `message` with a caret pointing at `span` through
    /// `codemap_diagnostic::Emitter`, the way the reference's `ParseError`
    /// "extract" field is displayed. Used by [`crate::error::LessError::with_pretty_render`]
    /// to turn a bare message into the reference's multi-line diagnostic text.
    pub fn render_diagnostic(&self, level: Level, message: String, span: Span) -> String {
        let map = self.inner.lock().unwrap();
        let diagnostic = Diagnostic {
            level,
            message,
            code: None,
            spans: vec![SpanLabel {
                span,
                label: None,
                style: SpanStyle::Primary,
            }],
        };
        let mut buf = Vec::new();
        {
            let mut emitter = Emitter::vec(&mut buf, Some(&map));
            emitter.emit(&[diagnostic]);
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl std::fmt::Debug for SourceMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SourceMap(..)")
    }
}
