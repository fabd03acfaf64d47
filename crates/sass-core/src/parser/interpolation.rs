//! Parsing `#{...}` interpolation, which may appear inside identifiers,
//! selectors, strings, at-rule preludes, and ordinary values (§4.1).

use crate::ast::{Interpolation, InterpolationPart};
use crate::error::SassError;

use super::Parser;

impl<'a> Parser<'a> {
    /// Parse an interpolated identifier: a run of ident characters and
    /// `#{...}` holes, stopping at the first character that is neither.
    pub(crate) fn parse_interpolated_identifier(&mut self) -> Result<Interpolation, SassError> {
        let start = self.cursor.offset();
        let mut parts = Vec::new();
        let mut literal = String::new();
        loop {
            if self.cursor.starts_with("#{") {
                if !literal.is_empty() {
                    parts.push(InterpolationPart::Literal(std::mem::take(&mut literal)));
                }
                parts.push(InterpolationPart::Expr(self.parse_interpolation_hole()?));
                continue;
            }
            match self.cursor.peek() {
                Some('\\') => {
                    if let Some(c) = self.cursor.consume_escape() {
                        literal.push(c);
                    }
                }
                Some(c) if crate::lexer::is_ident_char(c) => {
                    literal.push(c);
                    self.cursor.bump();
                }
                _ => break,
            }
        }
        if !literal.is_empty() {
            parts.push(InterpolationPart::Literal(literal));
        }
        if parts.is_empty() {
            return Err(self.error_here("expected identifier."));
        }
        Ok(Interpolation {
            parts,
            span: Some(self.span_from(start)),
        })
    }

    /// Parse interpolated text up to (but not including) a position where
    /// `stop` holds, treating `#{...}` as holes and everything else as
    /// literal text. Used for selector/media/at-rule preludes, which are
    /// captured as raw interpolation and reparsed after evaluation.
    pub(crate) fn parse_interpolated_text_until(
        &mut self,
        stop: impl Fn(&crate::lexer::Cursor<'_>) -> bool,
    ) -> Result<Interpolation, SassError> {
        let start = self.cursor.offset();
        let mut parts = Vec::new();
        let mut literal = String::new();
        loop {
            if self.cursor.is_eof() || stop(&self.cursor) {
                break;
            }
            if self.cursor.starts_with("#{") {
                if !literal.is_empty() {
                    parts.push(InterpolationPart::Literal(std::mem::take(&mut literal)));
                }
                parts.push(InterpolationPart::Expr(self.parse_interpolation_hole()?));
                continue;
            }
            if self.cursor.starts_with("/*") {
                literal.push_str(&self.consume_loud_comment_raw());
                continue;
            }
            // Quoted strings inside prelude text may themselves contain
            // the stop character (e.g. `,` inside `"a, b"`); consume them
            // wholesale so the stop check doesn't fire mid-string.
            if matches!(self.cursor.peek(), Some('"') | Some('\'')) {
                literal.push_str(&self.consume_raw_quoted_string());
                continue;
            }
            if let Some(c) = self.cursor.bump() {
                literal.push(c);
            } else {
                break;
            }
        }
        if !literal.is_empty() {
            parts.push(InterpolationPart::Literal(literal));
        }
        Ok(Interpolation {
            parts,
            span: Some(self.span_from(start)),
        })
    }

    pub(crate) fn consume_loud_comment_raw(&mut self) -> String {
        let start = self.cursor.offset();
        self.cursor.eat_str("/*");
        while !self.cursor.is_eof() && !self.cursor.starts_with("*/") {
            self.cursor.bump();
        }
        self.cursor.eat_str("*/");
        self.cursor.full()[start..self.cursor.offset()].to_string()
    }

    pub(crate) fn consume_raw_quoted_string(&mut self) -> String {
        let start = self.cursor.offset();
        let quote = self.cursor.bump().expect("checked by caller");
        loop {
            match self.cursor.peek() {
                None => break,
                Some(c) if c == quote => {
                    self.cursor.bump();
                    break;
                }
                Some('\\') => {
                    self.cursor.bump();
                    self.cursor.bump();
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
        self.cursor.full()[start..self.cursor.offset()].to_string()
    }

    fn parse_interpolation_hole(&mut self) -> Result<crate::ast::Expression, SassError> {
        self.expect_str("#{")?;
        self.skip_trivia();
        let expr = self.parse_expression()?;
        self.skip_trivia();
        self.expect_char('}')?;
        Ok(expr)
    }
}
