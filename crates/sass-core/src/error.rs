//! Error kinds and source spans shared across every stage of the pipeline.
//!
//! A [`Span`] is carried by nearly every AST and value node; it identifies
//! the source text a diagnostic should highlight. [`SassError`] is the one
//! error type every public entry point returns — parse errors, runtime
//! errors, import failures, `@extend` failures, and I/O failures all funnel
//! through here so a host only has to handle one `Result`.

use std::fmt;
use std::sync::Arc;

use url::Url;

/// A loaded source file, kept alive for as long as any span might need to
/// highlight it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// The canonical URL this text was loaded from (or a synthetic one for
    /// in-memory/stdin input).
    pub url: Url,
    /// The full source text.
    pub text: Arc<str>,
}

impl SourceFile {
    /// Wrap a URL and its text for span attribution.
    #[must_use]
    pub fn new(url: Url, text: impl Into<Arc<str>>) -> Self {
        Self {
            url,
            text: text.into(),
        }
    }

    /// Convert a byte offset into a 1-based `(line, column)` pair.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;
        for (i, ch) in self.text.char_indices() {
            if i >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }
}

/// A byte-offset range into a [`SourceFile`], used for diagnostics and
/// source maps. Not part of any node's structural equality.
#[derive(Debug, Clone)]
pub struct Span {
    /// The file this span refers to.
    pub source: Arc<SourceFile>,
    /// Byte offset of the first character covered by this span.
    pub start: usize,
    /// Byte offset one past the last character covered by this span.
    pub end: usize,
}

impl Span {
    /// Construct a span over `[start, end)` in `source`.
    #[must_use]
    pub fn new(source: Arc<SourceFile>, start: usize, end: usize) -> Self {
        Self { source, start, end }
    }

    /// The text this span covers.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.source.text[self.start..self.end]
    }

    /// Merge two spans from the same source into one spanning both.
    #[must_use]
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            source: Arc::clone(&self.source),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl PartialEq for Span {
    fn eq(&self, _other: &Self) -> bool {
        // Spans are positional metadata, not structural content; AST/value
        // equality never depends on where something came from.
        true
    }
}
impl Eq for Span {}

/// One frame of a runtime error's stack trace: the span active when the
/// error propagated through it, and a human label (`"@mixin foo"`, a
/// function name, `"root stylesheet"`).
#[derive(Debug, Clone)]
pub struct StackFrame {
    /// Where execution was when this frame was active.
    pub span: Span,
    /// A label describing what this frame represents.
    pub label: String,
}

/// The single error type returned by every fallible public `sass-core`
/// operation.
#[derive(Debug, thiserror::Error)]
pub enum SassError {
    /// A syntactic violation. Always fatal; parsing stops at the first one.
    #[error("{message}")]
    Parse {
        /// What was wrong.
        message: String,
        /// Where it was wrong.
        span: Span,
    },

    /// A violation discovered while evaluating an otherwise well-formed
    /// tree: type mismatches, incompatible units, undefined names, failed
    /// assertions, `@error` statements.
    #[error("{message}")]
    Runtime {
        /// What went wrong.
        message: String,
        /// The span active when the error was raised.
        span: Span,
        /// The call stack at the point of the error, innermost first.
        trace: Vec<StackFrame>,
    },

    /// A `@use`/`@import`/`@forward` target could not be resolved: not
    /// found, ambiguous between several candidate files, part of an import
    /// cycle, or rejected by the importer itself.
    #[error("{message}")]
    Import {
        /// What went wrong trying to load the URL.
        message: String,
        /// The span of the load directive.
        span: Span,
    },

    /// `@extend` was asked to do something it cannot: cross a media
    /// boundary, or extend something that isn't a simple/compound
    /// selector.
    #[error("{message}")]
    Extend {
        /// What went wrong.
        message: String,
        /// The span of the `@extend` rule.
        span: Span,
    },

    /// A failure from the I/O capability (file not found, permission
    /// denied, and so on), surfaced with the path or URL that failed.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// The path or URL that could not be read.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl SassError {
    /// Construct a [`SassError::Parse`].
    #[must_use]
    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Self::Parse {
            message: message.into(),
            span,
        }
    }

    /// Construct a [`SassError::Runtime`] with an empty trace; callers
    /// append frames as the error propagates outward.
    #[must_use]
    pub fn runtime(message: impl Into<String>, span: Span) -> Self {
        Self::Runtime {
            message: message.into(),
            span,
            trace: Vec::new(),
        }
    }

    /// Push a stack frame onto a runtime error as it propagates through a
    /// mixin/function/import boundary. A no-op for non-runtime errors.
    #[must_use]
    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        if let Self::Runtime { trace, .. } = &mut self {
            trace.push(frame);
        }
        self
    }

    /// Construct a [`SassError::Import`].
    #[must_use]
    pub fn import(message: impl Into<String>, span: Span) -> Self {
        Self::Import {
            message: message.into(),
            span,
        }
    }

    /// Construct a [`SassError::Extend`].
    #[must_use]
    pub fn extend(message: impl Into<String>, span: Span) -> Self {
        Self::Extend {
            message: message.into(),
            span,
        }
    }

    /// The primary span associated with this error, if any (I/O errors have
    /// none — they may originate before any span exists).
    #[must_use]
    pub fn primary_span(&self) -> Option<&Span> {
        match self {
            Self::Parse { span, .. }
            | Self::Runtime { span, .. }
            | Self::Import { span, .. }
            | Self::Extend { span, .. } => Some(span),
            Self::Io { .. } => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type SassResult<T> = Result<T, SassError>;

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.span.source.line_col(self.span.start);
        write!(
            f,
            "{} ({}:{}:{})",
            self.label,
            self.span.source.url,
            line,
            col
        )
    }
}
