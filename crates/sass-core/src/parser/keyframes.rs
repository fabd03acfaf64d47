//! `@keyframes` bodies: a list of keyframe blocks, each headed by one or
//! more selectors (`from`, `to`, or a percentage) instead of an ordinary
//! selector list.

use crate::ast::KeyframeBlock;
use crate::error::SassError;
use crate::lexer::is_ident_char;

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_keyframe_selectors(&mut self) -> Result<Vec<String>, SassError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_trivia();
            let selector = if self.at_keyword("from") {
                self.cursor.eat_str("from");
                "from".to_string()
            } else if self.at_keyword("to") {
                self.cursor.eat_str("to");
                "to".to_string()
            } else {
                let digits = self.cursor.eat_while(|c| c.is_ascii_digit() || c == '.');
                if digits.is_empty() {
                    return Err(self.error_here("expected \"from\", \"to\", or a percentage."));
                }
                let digits = digits.to_string();
                if !self.cursor.eat_char('%') {
                    return Err(self.error_here("expected \"%\"."));
                }
                format!("{digits}%")
            };
            selectors.push(selector);
            self.skip_trivia();
            if self.cursor.eat_char(',') {
                continue;
            }
            break;
        }
        Ok(selectors)
    }

    fn at_keyword(&self, kw: &str) -> bool {
        self.cursor.starts_with_ignore_ascii_case(kw)
            && !self.cursor.peek_at(kw.chars().count()).is_some_and(is_ident_char)
    }

    pub(crate) fn parse_keyframes_body(
        &mut self,
        header_indent: usize,
    ) -> Result<Vec<KeyframeBlock>, SassError> {
        match self.syntax {
            super::Syntax::Scss => {
                self.expect_char('{')?;
                let mut blocks = Vec::new();
                loop {
                    self.cursor.skip_whitespace();
                    while self.cursor.eat_char(';') {
                        self.cursor.skip_whitespace();
                    }
                    if self.cursor.peek() == Some('}') || self.cursor.is_eof() {
                        break;
                    }
                    blocks.push(self.parse_one_keyframe_block(header_indent)?);
                }
                self.cursor.skip_whitespace();
                self.expect_char('}')?;
                Ok(blocks)
            }
            super::Syntax::Indented => {
                self.finish_indented_line()?;
                let mut blocks = Vec::new();
                loop {
                    self.skip_blank_lines();
                    if self.cursor.is_eof() {
                        break;
                    }
                    let line_start = self.cursor.offset();
                    let indent = self.peek_indent();
                    if indent <= header_indent {
                        self.rewind_to(line_start);
                        break;
                    }
                    self.cursor.skip_inline_whitespace();
                    blocks.push(self.parse_one_keyframe_block(indent)?);
                }
                Ok(blocks)
            }
        }
    }

    fn parse_one_keyframe_block(&mut self, header_indent: usize) -> Result<KeyframeBlock, SassError> {
        let start = self.cursor.offset();
        let selectors = self.parse_keyframe_selectors()?;
        let body = self.parse_block(header_indent)?;
        Ok(KeyframeBlock { selectors, body, span: self.span_from(start) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use std::sync::Arc;

    fn parse_body(src: &str) -> Vec<KeyframeBlock> {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t").unwrap(), src.to_string()));
        let mut parser = Parser::new(&source, super::super::Syntax::Scss);
        parser.parse_keyframes_body(0).unwrap()
    }

    #[test]
    fn parses_from_to_and_percentages() {
        let blocks = parse_body("{ from { opacity: 0; } 50%, 75% { opacity: .5; } to { opacity: 1; } }");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].selectors, vec!["from".to_string()]);
        assert_eq!(blocks[1].selectors, vec!["50%".to_string(), "75%".to_string()]);
        assert_eq!(blocks[2].selectors, vec!["to".to_string()]);
    }
}
