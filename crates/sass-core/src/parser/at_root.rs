//! The `@at-root` query clause: `(with: rule media)` / `(without: all)`.

use crate::ast::AtRootQuery;
use crate::error::SassError;

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_at_root_query(&mut self) -> Result<AtRootQuery, SassError> {
        self.skip_trivia();
        if self.cursor.peek() != Some('(') {
            return Ok(AtRootQuery::Default);
        }
        self.cursor.bump();
        self.skip_trivia();
        let keyword = self.cursor.consume_ident_sequence();
        self.skip_trivia();
        self.expect_char(':')?;
        self.skip_trivia();
        let mut names = Vec::new();
        loop {
            self.skip_trivia();
            let name = self.cursor.consume_ident_sequence();
            if name.is_empty() {
                return Err(self.error_here("expected rule name."));
            }
            names.push(name);
            self.skip_trivia();
            if self.cursor.eat_char(',') {
                continue;
            }
            break;
        }
        self.skip_trivia();
        self.expect_char(')')?;
        if keyword.eq_ignore_ascii_case("with") {
            Ok(AtRootQuery::With(names))
        } else if keyword.eq_ignore_ascii_case("without") {
            Ok(AtRootQuery::Without(names))
        } else {
            Err(self.error_here("expected \"with\" or \"without\"."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use std::sync::Arc;

    fn parse_query(src: &str) -> AtRootQuery {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t").unwrap(), src.to_string()));
        let mut parser = Parser::new(&source, super::super::Syntax::Scss);
        parser.parse_at_root_query().unwrap()
    }

    #[test]
    fn defaults_with_no_query() {
        assert!(matches!(parse_query(""), AtRootQuery::Default));
    }

    #[test]
    fn parses_without_clause() {
        let query = parse_query("(without: media)");
        let AtRootQuery::Without(names) = query else { panic!("expected without") };
        assert_eq!(names, vec!["media".to_string()]);
    }

    #[test]
    fn parses_with_clause_multiple_names() {
        let query = parse_query("(with: rule, media)");
        let AtRootQuery::With(names) = query else { panic!("expected with") };
        assert_eq!(names, vec!["rule".to_string(), "media".to_string()]);
    }
}
