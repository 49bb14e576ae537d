//! Error taxonomy (spec §7). Six kinds, not six types-per-site: every fallible
//! entry point in the core returns `LessResult<T>`, and no variant is ever
//! swallowed before it reaches the public API boundary.

use codemap::Span;
use codemap_diagnostic::Level;
use thiserror::Error;

use crate::pos::SourceMap;

pub type LessResult<T> = Result<T, LessError>;

#[derive(Debug, Error, Clone)]
pub enum LessError {
    /// Malformed input; the chunker or parser could not make progress.
    #[error("ParseError: {message}")]
    Parse { message: String, span: Option<Span> },

    /// Evaluation-time validity: incompatible units, invalid color literal,
    /// JavaScript not enabled, a non-callable target, etc.
    #[error("SyntaxError: {message}")]
    Syntax { message: String, span: Option<Span> },

    /// Undefined `@var`, recursive variable, unresolved `#ns.mixin`.
    #[error("NameError: {message}")]
    Name { message: String, span: Option<Span> },

    /// No matching mixin definition, recursive import, extend chain too
    /// deep, plugin host failure.
    #[error("RuntimeError: {message}")]
    Runtime { message: String, span: Option<Span> },

    /// Built-in or plugin function called with the wrong arity or types.
    #[error("ArgumentError: {function}: {message}")]
    Argument {
        function: String,
        message: String,
        span: Option<Span>,
    },

    /// Import not found, or an I/O failure while reading one.
    #[error("FileError: {message} ({path})")]
    File { message: String, path: String },
}

impl LessError {
    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        LessError::Parse {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        LessError::Syntax {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn name(message: impl Into<String>, span: Span) -> Self {
        LessError::Name {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        LessError::Runtime {
            message: message.into(),
            span: None,
        }
    }

    pub fn runtime_at(message: impl Into<String>, span: Span) -> Self {
        LessError::Runtime {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        LessError::Argument {
            function: function.into(),
            message: message.into(),
            span: None,
        }
    }

    pub fn file(message: impl Into<String>, path: impl Into<String>) -> Self {
        LessError::File {
            message: message.into(),
            path: path.into(),
        }
    }

    /// If this error has no span yet, attach one. Mirrors the evaluator's
    /// duty (spec §7) of stamping filename/index onto any error that lacks
    /// it before it escapes a node's `eval`.
    pub fn with_span_if_missing(mut self, span: Span) -> Self {
        let slot = match &mut self {
            LessError::Parse { span, .. }
            | LessError::Syntax { span, .. }
            | LessError::Name { span, .. }
            | LessError::Runtime { span, .. }
            | LessError::Argument { span, .. } => Some(span),
            LessError::File { .. } => None,
        };
        if let Some(slot) = slot {
            if slot.is_none() {
                *slot = Some(span);
            }
        }
        self
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            LessError::Parse { span, .. }
            | LessError::Syntax { span, .. }
            | LessError::Name { span, .. }
            | LessError::Runtime { span, .. }
            | LessError::Argument { span, .. } => *span,
            LessError::File { .. } => None,
        }
    }

    /// Replace this error's message with the reference's pretty,
    /// caret-pointing extract (spec §7's `ParseError` "extract" contract),
    /// rendered through `codemap_diagnostic::Emitter`. A no-op for errors
    /// with no span (`FileError`, or any error raised before its file was
    /// registered with `source_map`).
    pub fn with_pretty_render(self, source_map: &SourceMap) -> Self {
        let Some(span) = self.span() else {
            return self;
        };
        let rendered = source_map.render_diagnostic(Level::Error, self.to_string(), span);
        match self {
            LessError::Parse { span, .. } => LessError::Parse {
                message: rendered,
                span,
            },
            LessError::Syntax { span, .. } => LessError::Syntax {
                message: rendered,
                span,
            },
            LessError::Name { span, .. } => LessError::Name {
                message: rendered,
                span,
            },
            LessError::Runtime { span, .. } => LessError::Runtime {
                message: rendered,
                span,
            },
            LessError::Argument { function, span, .. } => LessError::Argument {
                function,
                message: rendered,
                span,
            },
            other @ LessError::File { .. } => other,
        }
    }
}
