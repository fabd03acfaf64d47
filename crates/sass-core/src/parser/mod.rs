//! The Sass parser: two concrete-syntax entry points (SCSS and the
//! indented syntax) sharing one statement/expression/selector-prelude
//! engine, mirroring the teacher's single `CSSParser` generalized here
//! into "one parser, two block-reading strategies" rather than two
//! parsers — SCSS and the indented syntax differ only in how a block of
//! child statements begins and ends (`{ ... }` vs. a deeper indentation
//! level), so that is the only axis this module branches on.

mod args;
mod at_root;
mod expr;
mod interpolation;
mod keyframes;
mod media;
mod statement;

use std::sync::Arc;

use crate::ast::Stylesheet;
use crate::error::{SassError, SourceFile, Span};
use crate::lexer::Cursor;

pub use media::parse_media_query_list;

/// Which concrete syntax a [`Parser`] is reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Braces-and-semicolons CSS-like syntax (`.scss`).
    Scss,
    /// Indentation-based syntax, no braces or semicolons (`.sass`).
    Indented,
}

/// A recursive-descent parser over one source file.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    source: Arc<SourceFile>,
    syntax: Syntax,
    /// Set inside a `@function` body, where only a restricted statement
    /// grammar is legal (§4.1).
    in_function_body: bool,
}

/// Parse a full stylesheet from `source` in the given syntax.
pub fn parse_stylesheet(source: &Arc<SourceFile>, syntax: Syntax) -> Result<Stylesheet, SassError> {
    let mut parser = Parser::new(source, syntax);
    let start = parser.cursor.offset();
    let statements = parser.parse_top_level()?;
    parser.cursor.skip_whitespace();
    if !parser.cursor.is_eof() {
        return Err(parser.error_here(format!(
            "expected selector or at-rule, found \"{}\"",
            first_line(parser.cursor.rest())
        )));
    }
    Ok(Stylesheet {
        statements,
        span: parser.span_from(start),
    })
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(source: &'a Arc<SourceFile>, syntax: Syntax) -> Self {
        Self {
            cursor: Cursor::new(&source.text),
            source: Arc::clone(source),
            syntax,
            in_function_body: false,
        }
    }

    fn full_src(&self) -> &'a str {
        // SAFETY-free trick: `self.source.text` and `self.cursor`'s borrow
        // originate from the same allocation (see `new`); re-deriving the
        // `'a` slice from the `Arc` would require unsafe, so instead we
        // keep a second cursor positioned at zero and reuse its `rest()`.
        // Concretely, every caller of `full_src` only needs the starting
        // byte, so we never actually slice here — rewinding uses
        // `Cursor::at` against the original cursor's underlying buffer,
        // which `Cursor` already exposes via `rest()`/`offset()`.
        self.cursor.full()
    }

    fn rewind_to(&mut self, offset: usize) {
        self.cursor = Cursor::at(self.full_src(), offset);
    }

    pub(crate) fn span_from(&self, start: usize) -> Span {
        Span::new(Arc::clone(&self.source), start, self.cursor.offset())
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> SassError {
        let end = self.cursor.offset();
        SassError::parse(message, Span::new(Arc::clone(&self.source), end, end))
    }

    pub(crate) fn error_at(&self, message: impl Into<String>, start: usize) -> SassError {
        SassError::parse(message, self.span_from(start))
    }

    pub(crate) fn expect_char(&mut self, c: char) -> Result<(), SassError> {
        if self.cursor.eat_char(c) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected \"{c}\".")))
        }
    }

    pub(crate) fn expect_str(&mut self, s: &str) -> Result<(), SassError> {
        if self.cursor.eat_str(s) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected \"{s}\".")))
        }
    }

    /// Skip whitespace and comments that carry no AST meaning at this
    /// position (used between tokens within a single statement's header,
    /// where comments are not preserved as sibling statements).
    pub(crate) fn skip_trivia(&mut self) {
        loop {
            let before = self.cursor.offset();
            self.cursor.skip_whitespace();
            if self.cursor.starts_with("//") {
                self.cursor.eat_while(|c| c != '\n');
            } else if self.cursor.starts_with("/*") {
                self.skip_loud_comment_text();
            }
            if self.cursor.offset() == before {
                break;
            }
        }
    }

    fn skip_loud_comment_text(&mut self) {
        self.cursor.eat_str("/*");
        while !self.cursor.is_eof() && !self.cursor.starts_with("*/") {
            self.cursor.bump();
        }
        self.cursor.eat_str("*/");
    }

    /// Parses the top-level statement list: no enclosing braces in SCSS,
    /// every line a potential statement in the indented syntax.
    fn parse_top_level(&mut self) -> Result<Vec<crate::ast::Statement>, SassError> {
        match self.syntax {
            Syntax::Scss => self.parse_scss_children(false),
            Syntax::Indented => self.parse_indented_children(None),
        }
    }

    /// Read statements until `}` or EOF (SCSS). `nested` is true inside an
    /// already-opened block (so `}` terminates); false at the top level
    /// (so only EOF terminates).
    fn parse_scss_children(&mut self, nested: bool) -> Result<Vec<crate::ast::Statement>, SassError> {
        let mut statements = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            while self.cursor.eat_char(';') {
                self.cursor.skip_whitespace();
            }
            if self.cursor.is_eof() {
                break;
            }
            if nested && self.cursor.peek() == Some('}') {
                break;
            }
            statements.push(self.parse_statement(0)?);
        }
        Ok(statements)
    }

    /// Enter a brace-delimited block: eat `{`, read children, eat `}`.
    fn parse_scss_block(&mut self) -> Result<Vec<crate::ast::Statement>, SassError> {
        self.expect_char('{')?;
        let body = self.parse_scss_children(true)?;
        self.cursor.skip_whitespace();
        self.expect_char('}')?;
        Ok(body)
    }

    /// After a statement header in SCSS, consume either a block or a
    /// terminating `;`. Returns the block's children, or an empty vector
    /// for a semicolon-terminated statement.
    fn scss_block_or_semi(&mut self) -> Result<Vec<crate::ast::Statement>, SassError> {
        self.cursor.skip_whitespace();
        if self.cursor.peek() == Some('{') {
            self.parse_scss_block()
        } else {
            self.cursor.skip_whitespace();
            if !self.cursor.eat_char(';') && self.cursor.peek() != Some('}') && !self.cursor.is_eof() {
                return Err(self.error_here("expected \";\"."));
            }
            Ok(Vec::new())
        }
    }

    /// Measure the indentation (count of leading inline-whitespace
    /// characters) of the line the cursor currently sits at the start of,
    /// without consuming it.
    fn peek_indent(&self) -> usize {
        let rest = self.cursor.rest();
        rest.chars().take_while(|c| *c == ' ' || *c == '\t').count()
    }

    /// Skip blank lines (whitespace-only) entirely, landing the cursor at
    /// the start of the next line with content, or at EOF.
    fn skip_blank_lines(&mut self) {
        loop {
            let line_end = self.cursor.rest().find('\n').map_or(self.cursor.rest().len(), |i| i + 1);
            let line = &self.cursor.rest()[..line_end];
            if line.trim().is_empty() && !line.is_empty() {
                for _ in 0..line.chars().count() {
                    self.cursor.bump();
                }
            } else {
                break;
            }
        }
    }

    /// Read a sequence of indented-syntax statements whose line indent is
    /// strictly greater than `parent_indent` (`None` at the top level,
    /// where every indent qualifies). Consumes trailing blank lines but
    /// leaves the cursor at the first line belonging to an ancestor block
    /// (or EOF).
    fn parse_indented_children(
        &mut self,
        parent_indent: Option<usize>,
    ) -> Result<Vec<crate::ast::Statement>, SassError> {
        let mut statements = Vec::new();
        loop {
            self.skip_blank_lines();
            if self.cursor.is_eof() {
                break;
            }
            let line_start = self.cursor.offset();
            let indent = self.peek_indent();
            if parent_indent.is_some_and(|p| indent <= p) {
                self.rewind_to(line_start);
                break;
            }
            self.cursor.skip_inline_whitespace();
            statements.push(self.parse_statement(indent)?);
        }
        Ok(statements)
    }

    /// After an indented-syntax statement header, consume the rest of the
    /// line and, if the following lines are indented deeper than
    /// `header_indent`, read them as this statement's body.
    fn indented_block_or_eol(
        &mut self,
        header_indent: usize,
    ) -> Result<Vec<crate::ast::Statement>, SassError> {
        self.finish_indented_line()?;
        self.parse_indented_children(Some(header_indent))
    }

    fn finish_indented_line(&mut self) -> Result<(), SassError> {
        self.cursor.skip_inline_whitespace();
        if self.cursor.starts_with("//") {
            self.cursor.eat_while(|c| c != '\n');
        }
        match self.cursor.peek() {
            None => Ok(()),
            Some('\n') => {
                self.cursor.bump();
                Ok(())
            }
            Some(_) => Err(self.error_here("expected newline.")),
        }
    }

    /// Read a block of child statements, dispatching to the active
    /// syntax. `header_indent` is ignored in SCSS mode.
    fn parse_block(&mut self, header_indent: usize) -> Result<Vec<crate::ast::Statement>, SassError> {
        match self.syntax {
            Syntax::Scss => self.parse_scss_block(),
            Syntax::Indented => {
                self.finish_indented_line()?;
                self.parse_indented_children(Some(header_indent))
            }
        }
    }

    /// Read either a block (if one follows) or treat the statement as
    /// complete (`;` in SCSS, end of line in the indented syntax).
    fn block_or_end(&mut self, header_indent: usize) -> Result<Vec<crate::ast::Statement>, SassError> {
        match self.syntax {
            Syntax::Scss => self.scss_block_or_semi(),
            Syntax::Indented => self.indented_block_or_eol(header_indent),
        }
    }

    /// Whether a block follows the current position (used where a
    /// statement's body is optional, e.g. `@include foo;` vs.
    /// `@include foo { ... }`).
    fn block_follows(&mut self, header_indent: usize) -> bool {
        match self.syntax {
            Syntax::Scss => {
                let before = self.cursor.clone();
                self.cursor.skip_whitespace();
                let follows = self.cursor.peek() == Some('{');
                self.cursor = before;
                follows
            }
            Syntax::Indented => {
                let before = self.cursor.clone();
                let has_block = self.finish_indented_line().is_ok() && {
                    self.skip_blank_lines();
                    !self.cursor.is_eof() && self.peek_indent() > header_indent
                };
                self.cursor = before;
                has_block
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;

    fn parse(src: &str, syntax: Syntax) -> Stylesheet {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t").unwrap(), src));
        parse_stylesheet(&source, syntax).unwrap()
    }

    #[test]
    fn parses_empty_scss_stylesheet() {
        let sheet = parse("", Syntax::Scss);
        assert!(sheet.statements.is_empty());
    }

    #[test]
    fn parses_simple_scss_rule() {
        let sheet = parse("a { color: red; }", Syntax::Scss);
        assert_eq!(sheet.statements.len(), 1);
        assert!(matches!(sheet.statements[0], Statement::StyleRule { .. }));
    }

    #[test]
    fn parses_simple_indented_rule() {
        let sheet = parse("a\n  color: red\n", Syntax::Indented);
        assert_eq!(sheet.statements.len(), 1);
        let Statement::StyleRule { body, .. } = &sheet.statements[0] else {
            panic!("expected style rule")
        };
        assert_eq!(body.len(), 1);
    }
}
