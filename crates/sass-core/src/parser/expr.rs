//! The expression precedence climber (§4.1) and the literal/primary term
//! parsers it bottoms out in: numbers, colors, strings, lists, maps,
//! variables, and calls.

use crate::ast::{Argument, ArgumentInvocation, BinaryOp, Expression, InterpolationPart, UnaryOp};
use crate::error::SassError;
use crate::value::number::SassNumber;
use crate::value::ListSeparator;

use super::Parser;

impl<'a> Parser<'a> {
    /// Top-level expression entry: a comma-separated list (or a single
    /// value, passed through unchanged if there's only one).
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, SassError> {
        let start = self.cursor.offset();
        let mut elements = vec![self.parse_space_list()?];
        let mut saw_comma = false;
        loop {
            self.skip_trivia();
            let before = self.cursor.clone();
            if self.cursor.eat_char(',') {
                self.skip_trivia();
                if self.at_list_terminator() {
                    self.cursor = before;
                    break;
                }
                saw_comma = true;
                elements.push(self.parse_space_list()?);
            } else {
                break;
            }
        }
        if !saw_comma {
            return Ok(elements.pop().expect("at least one element"));
        }
        Ok(Expression::List {
            elements,
            separator: ListSeparator::Comma,
            bracketed: false,
            span: self.span_from(start),
        })
    }

    fn at_list_terminator(&self) -> bool {
        matches!(self.cursor.peek(), None | Some(')') | Some(']') | Some('}') | Some(';'))
    }

    /// A whitespace-separated list of single expressions (each of which
    /// may itself be an `or`/`and`/comparison/arithmetic chain).
    pub(crate) fn parse_space_list(&mut self) -> Result<Expression, SassError> {
        let start = self.cursor.offset();
        let mut elements = vec![self.parse_or()?];
        loop {
            let before = self.cursor.clone();
            self.cursor.skip_inline_whitespace();
            if matches!(self.syntax, super::Syntax::Scss) {
                self.cursor.skip_whitespace();
            }
            if self.starts_single_expression() {
                elements.push(self.parse_or()?);
            } else {
                self.cursor = before;
                break;
            }
        }
        if elements.len() == 1 {
            return Ok(elements.pop().expect("one element"));
        }
        Ok(Expression::List {
            elements,
            separator: ListSeparator::Space,
            bracketed: false,
            span: self.span_from(start),
        })
    }

    fn starts_single_expression(&self) -> bool {
        match self.cursor.peek() {
            None => false,
            Some(',' | ')' | ']' | '}' | ';' | ':') => false,
            Some(c) if crate::lexer::is_ident_start(c) => {
                !self.is_boundary_keyword("and") && !self.is_boundary_keyword("or")
            }
            _ => true,
        }
    }

    /// Whether the cursor sits at exactly `kw` followed by a non-ident
    /// character (so `and` matches but `android` does not).
    fn is_boundary_keyword(&self, kw: &str) -> bool {
        self.cursor.starts_with_ignore_ascii_case(kw)
            && !self.cursor.peek_at(kw.chars().count()).is_some_and(crate::lexer::is_ident_char)
    }

    fn parse_or(&mut self) -> Result<Expression, SassError> {
        let start = self.cursor.offset();
        let mut left = self.parse_and()?;
        loop {
            self.skip_trivia();
            if self.eat_keyword("or") {
                self.skip_trivia();
                let right = self.parse_and()?;
                left = Expression::Binary {
                    op: BinaryOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                    maybe_slash: false,
                    span: self.span_from(start),
                };
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, SassError> {
        let start = self.cursor.offset();
        let mut left = self.parse_equality()?;
        loop {
            self.skip_trivia();
            if self.eat_keyword("and") {
                self.skip_trivia();
                let right = self.parse_equality()?;
                left = Expression::Binary {
                    op: BinaryOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                    maybe_slash: false,
                    span: self.span_from(start),
                };
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression, SassError> {
        let start = self.cursor.offset();
        let mut left = self.parse_relational()?;
        loop {
            self.skip_trivia();
            let op = if self.cursor.starts_with("==") {
                Some(BinaryOp::Eq)
            } else if self.cursor.starts_with("!=") {
                Some(BinaryOp::Neq)
            } else {
                None
            };
            let Some(op) = op else { break };
            self.cursor.bump();
            self.cursor.bump();
            self.skip_trivia();
            let right = self.parse_relational()?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                maybe_slash: false,
                span: self.span_from(start),
            };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expression, SassError> {
        let start = self.cursor.offset();
        let mut left = self.parse_additive()?;
        loop {
            self.skip_trivia();
            let op = if self.cursor.starts_with("<=") {
                Some(BinaryOp::Lte)
            } else if self.cursor.starts_with(">=") {
                Some(BinaryOp::Gte)
            } else if self.cursor.peek() == Some('<') {
                Some(BinaryOp::Lt)
            } else if self.cursor.peek() == Some('>') {
                Some(BinaryOp::Gt)
            } else {
                None
            };
            let Some(op) = op else { break };
            self.cursor.bump();
            if matches!(op, BinaryOp::Lte | BinaryOp::Gte) {
                self.cursor.bump();
            }
            self.skip_trivia();
            let right = self.parse_additive()?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                maybe_slash: false,
                span: self.span_from(start),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, SassError> {
        let start = self.cursor.offset();
        let mut left = self.parse_multiplicative()?;
        loop {
            let before = self.cursor.clone();
            self.cursor.skip_inline_whitespace();
            let op = match self.cursor.peek() {
                Some('+') => Some(BinaryOp::Add),
                // A bare `-` is additive only when followed by
                // whitespace or something that can't continue an
                // identifier (otherwise `$a-b` would split in two).
                Some('-')
                    if self
                        .cursor
                        .peek_at(1)
                        .is_none_or(|c| c.is_whitespace() || c == '$' || c == '(') =>
                {
                    Some(BinaryOp::Sub)
                }
                _ => None,
            };
            let Some(op) = op else {
                self.cursor = before;
                break;
            };
            self.cursor.bump();
            self.skip_trivia();
            let right = self.parse_multiplicative()?;
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                maybe_slash: false,
                span: self.span_from(start),
            };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, SassError> {
        let start = self.cursor.offset();
        let mut left = self.parse_unary()?;
        loop {
            self.skip_trivia();
            let op = match self.cursor.peek() {
                Some('*') => Some(BinaryOp::Mul),
                Some('/') => Some(BinaryOp::Div),
                Some('%') => Some(BinaryOp::Rem),
                _ => None,
            };
            let Some(op) = op else { break };
            self.cursor.bump();
            self.skip_trivia();
            let right = self.parse_unary()?;
            let maybe_slash = op == BinaryOp::Div
                && matches!(left, Expression::Number { .. })
                && matches!(right, Expression::Number { .. });
            left = Expression::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                maybe_slash,
                span: self.span_from(start),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, SassError> {
        let start = self.cursor.offset();
        if self.eat_keyword("not") {
            self.skip_trivia();
            let operand = self.parse_unary()?;
            return Ok(Expression::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span: self.span_from(start),
            });
        }
        match self.cursor.peek() {
            Some('+') => {
                self.cursor.bump();
                let operand = self.parse_unary()?;
                Ok(Expression::Unary {
                    op: UnaryOp::Plus,
                    operand: Box::new(operand),
                    span: self.span_from(start),
                })
            }
            Some('-') => {
                // Negative numeric literal: `-1px`.
                if self.cursor.peek_at(1).is_some_and(|c| c.is_ascii_digit() || c == '.') {
                    return self.parse_number(start, true);
                }
                self.cursor.bump();
                let operand = self.parse_unary()?;
                Ok(Expression::Unary {
                    op: UnaryOp::Minus,
                    operand: Box::new(operand),
                    span: self.span_from(start),
                })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expression, SassError> {
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, SassError> {
        let start = self.cursor.offset();
        match self.cursor.peek() {
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(start, false),
            Some('$') => self.parse_variable(start),
            Some('#') if self.cursor.peek_at(1) == Some('{') => {
                Ok(Expression::Interpolation(self.parse_interpolated_identifier()?))
            }
            Some('#') => self.parse_hash_color(start),
            Some('"') | Some('\'') => self.parse_quoted_string(start),
            Some('(') => self.parse_parenthesized(start),
            Some('[') => self.parse_bracketed_list(start),
            Some('&') => {
                self.cursor.bump();
                Ok(Expression::ParentSelector(self.span_from(start)))
            }
            Some(c) if crate::lexer::is_ident_start(c) || c == '-' || c == '\\' => {
                self.parse_ident_led_expression(start)
            }
            _ => Err(self.error_here(format!(
                "expected expression, found \"{}\".",
                first_char(self.cursor.rest())
            ))),
        }
    }

    fn parse_variable(&mut self, start: usize) -> Result<Expression, SassError> {
        self.cursor.bump();
        let (namespace, name) = self.parse_namespaced_ident()?;
        Ok(Expression::Variable { name, namespace, span: self.span_from(start) })
    }

    /// Parse `ns.ident` or a plain `ident`, where `ns` is only recognized
    /// when followed by `.` and another identifier start (otherwise `.`
    /// belongs to something else, e.g. a following selector).
    fn parse_namespaced_ident(&mut self) -> Result<(Option<String>, String), SassError> {
        let first = self.parse_plain_ident()?;
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_at(1).is_some_and(crate::lexer::is_ident_start)
        {
            self.cursor.bump();
            let second = self.parse_plain_ident()?;
            return Ok((Some(first), second));
        }
        Ok((None, first))
    }

    fn parse_plain_ident(&mut self) -> Result<String, SassError> {
        let ident = self.cursor.consume_ident_sequence();
        if ident.is_empty() {
            return Err(self.error_here("expected identifier."));
        }
        Ok(ident)
    }

    fn parse_hash_color(&mut self, start: usize) -> Result<Expression, SassError> {
        self.cursor.bump();
        let hex = self.cursor.eat_while(|c| c.is_ascii_hexdigit());
        if !matches!(hex.len(), 3 | 4 | 6 | 8) {
            return Err(self.error_at("expected hex digit.", start));
        }
        Ok(Expression::Color { hex_or_name: hex.to_string(), span: self.span_from(start) })
    }

    fn parse_quoted_string(&mut self, start: usize) -> Result<Expression, SassError> {
        let quote = self.cursor.bump().expect("checked by caller");
        let mut parts = Vec::new();
        let mut literal = String::new();
        loop {
            match self.cursor.peek() {
                None => return Err(self.error_at("unterminated string.", start)),
                Some(c) if c == quote => {
                    self.cursor.bump();
                    break;
                }
                Some('#') if self.cursor.peek_at(1) == Some('{') => {
                    if !literal.is_empty() {
                        parts.push(InterpolationPart::Literal(std::mem::take(&mut literal)));
                    }
                    self.expect_str("#{")?;
                    self.skip_trivia();
                    let expr = self.parse_expression()?;
                    self.skip_trivia();
                    self.expect_char('}')?;
                    parts.push(InterpolationPart::Expr(expr));
                }
                Some('\\') => {
                    if let Some(c) = self.cursor.consume_escape() {
                        literal.push(c);
                    }
                }
                Some(c) => {
                    literal.push(c);
                    self.cursor.bump();
                }
            }
        }
        if !literal.is_empty() || parts.is_empty() {
            parts.push(InterpolationPart::Literal(literal));
        }
        let span = self.span_from(start);
        Ok(Expression::String {
            text: crate::ast::Interpolation { parts, span: Some(span.clone()) },
            quoted: true,
            span,
        })
    }

    fn parse_parenthesized(&mut self, start: usize) -> Result<Expression, SassError> {
        self.cursor.bump();
        self.skip_trivia();
        if self.cursor.peek() == Some(')') {
            self.cursor.bump();
            return Ok(Expression::List {
                elements: Vec::new(),
                separator: ListSeparator::Undecided,
                bracketed: false,
                span: self.span_from(start),
            });
        }
        // Try a map first: `(key: value, ...)`.
        let save = self.cursor.clone();
        if let Ok(map) = self.try_parse_map_body(start) {
            return Ok(map);
        }
        self.cursor = save;
        let inner = self.parse_expression()?;
        self.skip_trivia();
        self.expect_char(')')?;
        Ok(Expression::Paren(Box::new(inner)))
    }

    fn try_parse_map_body(&mut self, start: usize) -> Result<Expression, SassError> {
        let mut entries = Vec::new();
        loop {
            let key = self.parse_space_list()?;
            self.skip_trivia();
            if !self.cursor.eat_char(':') {
                return Err(self.error_here("expected \":\"."));
            }
            self.skip_trivia();
            let value = self.parse_space_list()?;
            entries.push((key, value));
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
        self.skip_trivia();
        self.expect_char(')')?;
        Ok(Expression::Map { entries, span: self.span_from(start) })
    }

    fn parse_bracketed_list(&mut self, start: usize) -> Result<Expression, SassError> {
        self.cursor.bump();
        self.skip_trivia();
        if self.cursor.eat_char(']') {
            return Ok(Expression::List {
                elements: Vec::new(),
                separator: ListSeparator::Undecided,
                bracketed: true,
                span: self.span_from(start),
            });
        }
        let inner = self.parse_expression()?;
        self.skip_trivia();
        self.expect_char(']')?;
        let (elements, separator) = match inner {
            Expression::List { elements, separator, .. } => (elements, separator),
            other => (vec![other], ListSeparator::Undecided),
        };
        Ok(Expression::List { elements, separator, bracketed: true, span: self.span_from(start) })
    }

    /// Handles everything that starts with an identifier character:
    /// booleans, `null`, `if(...)`, a plain/namespaced function call, or a
    /// bare identifier string (including interpolation).
    fn parse_ident_led_expression(&mut self, start: usize) -> Result<Expression, SassError> {
        if self.eat_exact_keyword("true") {
            return Ok(Expression::Boolean(true));
        }
        if self.eat_exact_keyword("false") {
            return Ok(Expression::Boolean(false));
        }
        if self.eat_exact_keyword("null") {
            return Ok(Expression::Null);
        }

        let ident = self.parse_interpolated_identifier()?;
        if self.cursor.peek() == Some('.')
            && self.cursor.peek_at(1).is_some_and(crate::lexer::is_ident_start)
            && ident.is_plain()
        {
            self.cursor.bump();
            let member = self.parse_interpolated_identifier()?;
            if self.cursor.peek() == Some('(') {
                let name = member.as_plain_text().unwrap_or_default();
                let args = self.parse_argument_invocation()?;
                return Ok(Expression::Call {
                    name,
                    namespace: ident.as_plain_text(),
                    args,
                    span: self.span_from(start),
                });
            }
            // Namespaced variable-like member access without a call is
            // not valid Sass syntax on its own; fall through treating the
            // dotted text as two adjacent identifiers is incorrect, so we
            // report it plainly.
            return Err(self.error_at("expected \"(\".", start));
        }
        if self.cursor.peek() == Some('(') {
            let name = ident.as_plain_text().unwrap_or_default();
            if name.eq_ignore_ascii_case("if") {
                return self.parse_if_call(start);
            }
            let args = self.parse_argument_invocation()?;
            return Ok(Expression::Call { name, namespace: None, args, span: self.span_from(start) });
        }
        let span = self.span_from(start);
        Ok(Expression::String { text: ident, quoted: false, span })
    }

    fn parse_if_call(&mut self, start: usize) -> Result<Expression, SassError> {
        self.expect_char('(')?;
        self.skip_trivia();
        let condition = self.parse_space_list()?;
        self.skip_trivia();
        self.expect_char(',')?;
        self.skip_trivia();
        let if_true = self.parse_space_list()?;
        self.skip_trivia();
        self.expect_char(',')?;
        self.skip_trivia();
        let if_false = self.parse_space_list()?;
        self.skip_trivia();
        self.cursor.eat_char(',');
        self.skip_trivia();
        self.expect_char(')')?;
        Ok(Expression::If {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            span: self.span_from(start),
        })
    }

    pub(crate) fn parse_argument_invocation(&mut self) -> Result<ArgumentInvocation, SassError> {
        let start = self.cursor.offset();
        self.expect_char('(')?;
        self.skip_trivia();
        let mut positional = Vec::new();
        if self.cursor.peek() != Some(')') {
            loop {
                self.skip_trivia();
                positional.push(self.parse_argument()?);
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
        Ok(ArgumentInvocation { positional, span: self.span_from(start) })
    }

    fn parse_argument(&mut self) -> Result<Argument, SassError> {
        let save = self.cursor.clone();
        if self.cursor.peek() == Some('$') {
            self.cursor.bump();
            let name = self.cursor.consume_ident_sequence();
            self.skip_trivia();
            if !name.is_empty() && self.cursor.peek() == Some(':') {
                self.cursor.bump();
                self.skip_trivia();
                let value = self.parse_space_list()?;
                self.skip_trivia();
                let is_rest = self.eat_ellipsis();
                return Ok(Argument { name: Some(name), value, is_rest });
            }
            self.cursor = save;
        }
        let value = self.parse_space_list()?;
        self.skip_trivia();
        let is_rest = self.eat_ellipsis();
        Ok(Argument { name: None, value, is_rest })
    }

    fn eat_ellipsis(&mut self) -> bool {
        self.cursor.eat_str("...")
    }

    fn parse_number(&mut self, start: usize, negative: bool) -> Result<Expression, SassError> {
        if negative {
            self.cursor.bump();
        }
        let int_part = self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut text = int_part.to_string();
        if self.cursor.peek() == Some('.') && self.cursor.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.cursor.bump();
            text.push_str(self.cursor.eat_while(|c| c.is_ascii_digit()));
        }
        if matches!(self.cursor.peek(), Some('e' | 'E'))
            && self
                .cursor
                .peek_at(1)
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            text.push(self.cursor.bump().expect("peeked"));
            if matches!(self.cursor.peek(), Some('+' | '-')) {
                text.push(self.cursor.bump().expect("peeked"));
            }
            text.push_str(self.cursor.eat_while(|c| c.is_ascii_digit()));
        }
        if text.is_empty() || text == "." {
            return Err(self.error_at("expected number.", start));
        }
        let mut value: f64 = text.parse().map_err(|_| self.error_at("invalid number.", start))?;
        if negative {
            value = -value;
        }
        let unit = if self.cursor.peek() == Some('%') {
            self.cursor.bump();
            Some("%".to_string())
        } else if self.cursor.would_start_ident() {
            Some(self.cursor.consume_ident_sequence())
        } else {
            None
        };
        let number = match unit {
            Some(unit) => SassNumber::with_unit(value, unit),
            None => SassNumber::new(value),
        };
        Ok(Expression::Number { number, span: self.span_from(start) })
    }

    /// Consume `kw` as a keyword only if it is not itself the prefix of a
    /// longer identifier (so `andy` is not mistaken for `and`).
    fn eat_keyword(&mut self, kw: &str) -> bool {
        if !self.cursor.starts_with_ignore_ascii_case(kw) {
            return false;
        }
        let after = self.cursor.peek_at(kw.chars().count());
        if after.is_some_and(crate::lexer::is_ident_char) {
            return false;
        }
        for _ in 0..kw.chars().count() {
            self.cursor.bump();
        }
        true
    }

    fn eat_exact_keyword(&mut self, kw: &str) -> bool {
        self.eat_keyword(kw)
    }
}

fn first_char(s: &str) -> &str {
    match s.chars().next() {
        Some(c) => &s[..c.len_utf8()],
        None => "end of input",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use std::sync::Arc;

    fn parse_expr(src: &str) -> Expression {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t").unwrap(), src.to_string()));
        let mut parser = Parser::new(&source, super::super::Syntax::Scss);
        parser.parse_expression().unwrap()
    }

    #[test]
    fn parses_arithmetic_with_precedence() {
        let expr = parse_expr("1 + 2 * 3");
        let Expression::Binary { op, right, .. } = expr else { panic!("expected binary") };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(*right, Expression::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn parses_comma_list() {
        let expr = parse_expr("1, 2, 3");
        let Expression::List { elements, separator, .. } = expr else { panic!("expected list") };
        assert_eq!(elements.len(), 3);
        assert_eq!(separator, ListSeparator::Comma);
    }

    #[test]
    fn parses_space_list_nested_in_comma_list() {
        let expr = parse_expr("1 2, 3");
        let Expression::List { elements, separator, .. } = expr else { panic!("expected list") };
        assert_eq!(separator, ListSeparator::Comma);
        assert!(matches!(elements[0], Expression::List { separator: ListSeparator::Space, .. }));
    }

    #[test]
    fn parses_function_call_with_named_argument() {
        let expr = parse_expr("rgba($color: red, $alpha: 0.5)");
        let Expression::Call { name, args, .. } = expr else { panic!("expected call") };
        assert_eq!(name, "rgba");
        assert_eq!(args.positional.len(), 2);
        assert_eq!(args.positional[0].name.as_deref(), Some("color"));
    }

    #[test]
    fn records_maybe_slash_for_two_number_literals() {
        let expr = parse_expr("1/2");
        let Expression::Binary { maybe_slash, .. } = expr else { panic!("expected binary") };
        assert!(maybe_slash);
    }

    #[test]
    fn parses_if_expression() {
        let expr = parse_expr("if(true, 1, 2)");
        assert!(matches!(expr, Expression::If { .. }));
    }
}
