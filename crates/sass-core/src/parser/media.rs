//! `@media` query lists and `@supports` conditions (§4.1, §4.4).
//!
//! A `@media` prelude is captured by the statement parser as raw
//! interpolation and only turned into a [`MediaQueryList`] here, by the
//! evaluator, once interpolation holes have been substituted with their
//! evaluated text — mirroring how selectors are parsed lazily. `@supports`
//! conditions are structured enough (and rarely interpolated wholesale)
//! that they're parsed directly off the token stream instead.

use crate::ast::{
    Interpolation, MediaFeature, MediaModifier, MediaQuery, MediaQueryList, SupportsCondition, SupportsOp,
};
use crate::error::{SassError, Span};
use crate::lexer::{is_ident_char, Cursor};

use super::Parser;

/// Parse a plain (already-interpolated) media query list, such as
/// `screen and (min-width: 100px), print`.
pub fn parse_media_query_list(text: &str, span: &Span) -> Result<MediaQueryList, SassError> {
    let mut cursor = Cursor::new(text);
    let mut queries = Vec::new();
    loop {
        cursor.skip_whitespace();
        queries.push(parse_one_media_query(&mut cursor, span)?);
        cursor.skip_whitespace();
        if cursor.eat_char(',') {
            continue;
        }
        break;
    }
    Ok(MediaQueryList { queries })
}

fn parse_one_media_query(cursor: &mut Cursor<'_>, span: &Span) -> Result<MediaQuery, SassError> {
    let mut query = MediaQuery::default();
    cursor.skip_whitespace();
    if cursor.peek() == Some('(') {
        query.features.push(parse_media_feature(cursor, span)?);
        parse_and_chain(cursor, &mut query, span)?;
        return Ok(query);
    }
    let first = cursor.consume_ident_sequence();
    if first.is_empty() {
        return Err(SassError::parse("expected media query.", span.clone()));
    }
    if first.eq_ignore_ascii_case("not") {
        query.modifier = Some(MediaModifier::Not);
    } else if first.eq_ignore_ascii_case("only") {
        query.modifier = Some(MediaModifier::Only);
    } else {
        query.media_type = Some(Interpolation::plain(first, span.clone()));
    }
    if query.media_type.is_none() {
        cursor.skip_whitespace();
        let media_type = cursor.consume_ident_sequence();
        if !media_type.is_empty() {
            query.media_type = Some(Interpolation::plain(media_type, span.clone()));
        }
    }
    parse_and_chain(cursor, &mut query, span)?;
    Ok(query)
}

fn parse_and_chain(cursor: &mut Cursor<'_>, query: &mut MediaQuery, span: &Span) -> Result<(), SassError> {
    loop {
        cursor.skip_whitespace();
        if cursor.starts_with_ignore_ascii_case("and") && !cursor.peek_at(3).is_some_and(is_ident_char) {
            for _ in 0..3 {
                cursor.bump();
            }
            cursor.skip_whitespace();
            query.features.push(parse_media_feature(cursor, span)?);
        } else {
            break;
        }
    }
    Ok(())
}

fn parse_media_feature(cursor: &mut Cursor<'_>, span: &Span) -> Result<MediaFeature, SassError> {
    if !cursor.eat_char('(') {
        return Err(SassError::parse("expected \"(\".", span.clone()));
    }
    cursor.skip_whitespace();
    let name = cursor.consume_ident_sequence();
    if name.is_empty() {
        return Err(SassError::parse("expected feature name.", span.clone()));
    }
    cursor.skip_whitespace();
    let value = if cursor.eat_char(':') {
        cursor.skip_whitespace();
        let raw = cursor.eat_while(|c| c != ')').trim_end().to_string();
        Some(Interpolation::plain(raw, span.clone()))
    } else {
        None
    };
    cursor.skip_whitespace();
    if !cursor.eat_char(')') {
        return Err(SassError::parse("expected \")\".", span.clone()));
    }
    Ok(MediaFeature { name: Interpolation::plain(name, span.clone()), value })
}

impl<'a> Parser<'a> {
    /// `SupportsOr := SupportsAnd ('or' SupportsAnd)*`
    pub(crate) fn parse_supports_condition(&mut self) -> Result<SupportsCondition, SassError> {
        let mut left = self.parse_supports_and()?;
        loop {
            self.skip_trivia();
            if self.eat_supports_keyword("or") {
                self.skip_trivia();
                let right = self.parse_supports_and()?;
                left = SupportsCondition::Operation {
                    left: Box::new(left),
                    op: SupportsOp::Or,
                    right: Box::new(right),
                };
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_supports_and(&mut self) -> Result<SupportsCondition, SassError> {
        let mut left = self.parse_supports_not()?;
        loop {
            self.skip_trivia();
            if self.eat_supports_keyword("and") {
                self.skip_trivia();
                let right = self.parse_supports_not()?;
                left = SupportsCondition::Operation {
                    left: Box::new(left),
                    op: SupportsOp::And,
                    right: Box::new(right),
                };
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_supports_not(&mut self) -> Result<SupportsCondition, SassError> {
        if self.eat_supports_keyword("not") {
            self.skip_trivia();
            return Ok(SupportsCondition::Negation(Box::new(self.parse_supports_in_parens()?)));
        }
        self.parse_supports_in_parens()
    }

    fn parse_supports_in_parens(&mut self) -> Result<SupportsCondition, SassError> {
        if self.cursor.starts_with("#{") {
            return Ok(SupportsCondition::Interpolation(self.parse_interpolated_identifier()?));
        }
        if !self.cursor.eat_char('(') {
            return Err(self.error_here("expected \"(\"."));
        }
        self.skip_trivia();
        // A nested condition starts with `not`/`(`/`#{`; anything else at
        // this position is a `(name: value)` declaration check.
        let looks_like_condition = self.cursor.peek() == Some('(')
            || self.cursor.starts_with("#{")
            || self.eat_supports_keyword_peek("not");
        let condition = if looks_like_condition {
            let inner = self.parse_supports_condition()?;
            self.skip_trivia();
            self.expect_char(')')?;
            inner
        } else {
            let name = self.parse_interpolated_text_until(|c| c.peek() == Some(':'))?;
            self.expect_char(':')?;
            self.skip_trivia();
            let value = self.parse_interpolated_text_until(|c| c.peek() == Some(')'))?;
            self.expect_char(')')?;
            SupportsCondition::Declaration { name, value }
        };
        Ok(condition)
    }

    fn eat_supports_keyword(&mut self, kw: &str) -> bool {
        if !self.is_keyword_here(kw) {
            return false;
        }
        for _ in 0..kw.chars().count() {
            self.cursor.bump();
        }
        true
    }

    fn eat_supports_keyword_peek(&self, kw: &str) -> bool {
        self.is_keyword_here(kw)
    }

    fn is_keyword_here(&self, kw: &str) -> bool {
        self.cursor.starts_with_ignore_ascii_case(kw)
            && !self.cursor.peek_at(kw.chars().count()).is_some_and(is_ident_char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use std::sync::Arc;

    fn test_span() -> Span {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t").unwrap(), String::new()));
        Span::new(source, 0, 0)
    }

    #[test]
    fn parses_simple_media_type() {
        let list = parse_media_query_list("screen", &test_span()).unwrap();
        assert_eq!(list.queries.len(), 1);
        assert!(list.queries[0].media_type.is_some());
    }

    #[test]
    fn parses_feature_and_chain() {
        let list = parse_media_query_list("screen and (min-width: 100px)", &test_span()).unwrap();
        assert_eq!(list.queries[0].features.len(), 1);
    }

    #[test]
    fn parses_comma_separated_queries() {
        let list = parse_media_query_list("screen, print", &test_span()).unwrap();
        assert_eq!(list.queries.len(), 2);
    }

    #[test]
    fn parses_supports_and_or_not() {
        let source = Arc::new(SourceFile::new(
            url::Url::parse("file:///t").unwrap(),
            "(display: flex) and (not (display: grid))".to_string(),
        ));
        let mut parser = Parser::new(&source, super::super::Syntax::Scss);
        let condition = parser.parse_supports_condition().unwrap();
        assert!(matches!(condition, SupportsCondition::Operation { op: SupportsOp::And, .. }));
    }
}
