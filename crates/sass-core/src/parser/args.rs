//! Parameter lists for `@mixin`/`@function` headers (argument lists
//! themselves are parsed in `expr.rs`, alongside calls, since they share
//! the same grammar as a function call's arguments).

use crate::ast::{Parameter, ParameterList};
use crate::error::SassError;

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_parameter_list(&mut self) -> Result<ParameterList, SassError> {
        self.expect_char('(')?;
        self.skip_trivia();
        let mut params = Vec::new();
        if self.cursor.peek() != Some(')') {
            loop {
                self.skip_trivia();
                self.expect_char('$')?;
                let name = self.cursor.consume_ident_sequence();
                if name.is_empty() {
                    return Err(self.error_here("expected variable name."));
                }
                self.skip_trivia();
                if self.cursor.eat_str("...") {
                    params.push(Parameter { name, default: None, is_rest: true });
                    self.skip_trivia();
                    break;
                }
                let default = if self.cursor.eat_char(':') {
                    self.skip_trivia();
                    Some(self.parse_space_list()?)
                } else {
                    None
                };
                params.push(Parameter { name, default, is_rest: false });
                self.skip_trivia();
                if self.cursor.eat_char(',') {
                    self.skip_trivia();
                    if self.cursor.peek() == Some(')') {
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        self.skip_trivia();
        self.expect_char(')')?;
        Ok(ParameterList { params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use std::sync::Arc;

    fn parse_params(src: &str) -> ParameterList {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t").unwrap(), src.to_string()));
        let mut parser = Parser::new(&source, super::super::Syntax::Scss);
        parser.parse_parameter_list().unwrap()
    }

    #[test]
    fn parses_defaults_and_rest() {
        let params = parse_params("($a, $b: 1px, $rest...)");
        assert_eq!(params.params.len(), 3);
        assert!(params.params[0].default.is_none());
        assert!(params.params[1].default.is_some());
        assert!(params.params[2].is_rest);
    }
}
