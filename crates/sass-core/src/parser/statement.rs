//! Statement-level parsing: the declaration-vs-style-rule disambiguation
//! (§4.1) and every at-rule.

use std::rc::Rc;

use crate::ast::{
    ArgumentInvocation, AtRootQuery, EachVars, ForwardVisibility, IfClause, ImportTarget, Interpolation,
    ParameterList, Statement, UseNamespace,
};
use crate::error::SassError;
use crate::lexer::is_ident_char;

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_statement(&mut self, header_indent: usize) -> Result<Statement, SassError> {
        if self.cursor.starts_with("//") {
            return Ok(self.parse_silent_comment());
        }
        if self.cursor.starts_with("/*") {
            return Ok(self.parse_loud_comment());
        }
        if self.cursor.peek() == Some('$') && self.looks_like_variable_decl() {
            return self.parse_variable_decl();
        }
        if self.cursor.peek() == Some('@') {
            return self.parse_at_rule(header_indent);
        }
        self.parse_selector_or_declaration(header_indent)
    }

    /// `$` only starts a variable declaration when followed by an
    /// identifier and then `:`; otherwise (rare) it's left to the
    /// expression grammar, e.g. inside an already-erroneous context.
    fn looks_like_variable_decl(&self) -> bool {
        let mut probe = self.cursor.clone();
        probe.bump();
        let name = probe.consume_ident_sequence();
        if name.is_empty() {
            return false;
        }
        probe.skip_inline_whitespace();
        probe.peek() == Some(':')
    }

    fn parse_silent_comment(&mut self) -> Statement {
        let start = self.cursor.offset();
        self.cursor.eat_str("//");
        let text = self.cursor.eat_while(|c| c != '\n').to_string();
        Statement::SilentComment { text, span: self.span_from(start) }
    }

    fn parse_loud_comment(&mut self) -> Statement {
        let start = self.cursor.offset();
        let text = self.consume_loud_comment_raw();
        Statement::LoudComment { text, span: self.span_from(start) }
    }

    fn parse_variable_decl(&mut self) -> Result<Statement, SassError> {
        let start = self.cursor.offset();
        self.cursor.bump();
        let name = self.cursor.consume_ident_sequence();
        self.skip_trivia();
        self.expect_char(':')?;
        self.skip_trivia();
        let value = self.parse_expression()?;
        let mut is_default = false;
        let mut is_global = false;
        loop {
            self.cursor.skip_inline_whitespace();
            if self.cursor.peek() == Some('!') {
                let save = self.cursor.clone();
                self.cursor.bump();
                let flag = self.cursor.consume_ident_sequence();
                if flag.eq_ignore_ascii_case("default") {
                    is_default = true;
                } else if flag.eq_ignore_ascii_case("global") {
                    is_global = true;
                } else {
                    self.cursor = save;
                    break;
                }
            } else {
                break;
            }
        }
        self.finish_statement()?;
        Ok(Statement::VariableDecl {
            name,
            namespace: None,
            value,
            is_default,
            is_global,
            span: self.span_from(start),
        })
    }

    /// Terminates a statement that has no block of its own: `;` (or the
    /// implicit end before `}`) in SCSS, end of line in the indented
    /// syntax.
    fn finish_statement(&mut self) -> Result<(), SassError> {
        match self.syntax {
            super::Syntax::Scss => {
                self.cursor.skip_whitespace();
                if self.cursor.eat_char(';') || self.cursor.peek() == Some('}') || self.cursor.is_eof() {
                    Ok(())
                } else {
                    Err(self.error_here("expected \";\"."))
                }
            }
            super::Syntax::Indented => self.finish_indented_line(),
        }
    }

    fn at_keyword(&self, kw: &str) -> bool {
        self.cursor.starts_with_ignore_ascii_case(kw)
            && !self.cursor.peek_at(kw.chars().count()).is_some_and(is_ident_char)
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if !self.at_keyword(kw) {
            return false;
        }
        for _ in 0..kw.chars().count() {
            self.cursor.bump();
        }
        true
    }

    fn parse_at_rule(&mut self, header_indent: usize) -> Result<Statement, SassError> {
        let start = self.cursor.offset();
        self.cursor.bump();
        let name = self.cursor.consume_ident_sequence();
        if name.is_empty() {
            return Err(self.error_here("expected at-rule name."));
        }
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "if" => self.parse_if(start, header_indent),
            "each" => self.parse_each(start, header_indent),
            "for" => self.parse_for(start, header_indent),
            "while" => self.parse_while(start, header_indent),
            "return" => self.parse_simple_value_rule(start, Statement::Return as fn(_, _) -> _),
            "warn" => self.parse_simple_value_rule(start, Statement::Warn as fn(_, _) -> _),
            "debug" => self.parse_simple_value_rule(start, Statement::Debug as fn(_, _) -> _),
            "error" => self.parse_simple_value_rule(start, Statement::Error as fn(_, _) -> _),
            "at-root" => self.parse_at_root(start, header_indent),
            "extend" => self.parse_extend(start),
            "use" => self.parse_use(start),
            "forward" => self.parse_forward(start),
            "import" => self.parse_import(start),
            "include" => self.parse_include(start, header_indent),
            "function" => self.parse_function(start, header_indent),
            "mixin" => self.parse_mixin(start, header_indent),
            "content" => self.parse_content(start),
            "media" => self.parse_media(start, header_indent),
            "supports" => self.parse_supports(start, header_indent),
            _ if lower == "keyframes" || lower.ends_with("-keyframes") => {
                self.parse_keyframes(start, header_indent, &name, &lower)
            }
            _ => self.parse_unknown_at_rule(start, header_indent, name),
        }
    }

    fn parse_if(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        let condition = self.parse_expression()?;
        let body = self.parse_block(header_indent)?;
        let mut clauses = vec![IfClause { condition: Some(condition), body }];
        loop {
            let save = self.cursor.clone();
            self.cursor.skip_whitespace();
            if self.cursor.peek() == Some('@') && self.peek_at_rule_name_is("else") {
                self.cursor.bump();
                self.cursor.consume_ident_sequence();
                self.skip_trivia();
                if self.eat_keyword("if") {
                    self.skip_trivia();
                    let condition = self.parse_expression()?;
                    let body = self.parse_block(header_indent)?;
                    clauses.push(IfClause { condition: Some(condition), body });
                } else {
                    let body = self.parse_block(header_indent)?;
                    clauses.push(IfClause { condition: None, body });
                    break;
                }
            } else {
                self.cursor = save;
                break;
            }
        }
        Ok(Statement::If { clauses, span: self.span_from(start) })
    }

    fn peek_at_rule_name_is(&self, name: &str) -> bool {
        let mut probe = self.cursor.clone();
        probe.bump();
        let ident = probe.consume_ident_sequence();
        ident.eq_ignore_ascii_case(name)
    }

    fn parse_each(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        let mut names = Vec::new();
        loop {
            self.expect_char('$')?;
            let name = self.cursor.consume_ident_sequence();
            if name.is_empty() {
                return Err(self.error_here("expected variable name."));
            }
            names.push(name);
            self.skip_trivia();
            if self.cursor.eat_char(',') {
                self.skip_trivia();
                continue;
            }
            break;
        }
        if !self.eat_keyword("in") {
            return Err(self.error_here("expected \"in\"."));
        }
        self.skip_trivia();
        let list = self.parse_expression()?;
        let body = self.parse_block(header_indent)?;
        Ok(Statement::Each { vars: EachVars { names }, list, body, span: self.span_from(start) })
    }

    fn parse_for(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        self.expect_char('$')?;
        let variable = self.cursor.consume_ident_sequence();
        self.skip_trivia();
        if !self.eat_keyword("from") {
            return Err(self.error_here("expected \"from\"."));
        }
        self.skip_trivia();
        let from = self.parse_space_list()?;
        self.skip_trivia();
        let inclusive = if self.eat_keyword("through") {
            true
        } else if self.eat_keyword("to") {
            false
        } else {
            return Err(self.error_here("expected \"to\" or \"through\"."));
        };
        self.skip_trivia();
        let to = self.parse_space_list()?;
        let body = self.parse_block(header_indent)?;
        Ok(Statement::For { variable, from, to, inclusive, body, span: self.span_from(start) })
    }

    fn parse_while(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        let condition = self.parse_expression()?;
        let body = self.parse_block(header_indent)?;
        Ok(Statement::While { condition, body, span: self.span_from(start) })
    }

    fn parse_simple_value_rule(
        &mut self,
        start: usize,
        ctor: fn(crate::ast::Expression, crate::error::Span) -> Statement,
    ) -> Result<Statement, SassError> {
        self.skip_trivia();
        let value = self.parse_expression()?;
        self.finish_statement()?;
        Ok(ctor(value, self.span_from(start)))
    }

    fn parse_at_root(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        let query = if self.block_follows_at_root_query() {
            self.parse_at_root_query()?
        } else {
            AtRootQuery::Default
        };
        let body = self.parse_block(header_indent)?;
        Ok(Statement::AtRoot { query, body, span: self.span_from(start) })
    }

    fn block_follows_at_root_query(&self) -> bool {
        let mut probe = self.cursor.clone();
        probe.skip_inline_whitespace();
        probe.peek() == Some('(')
    }

    fn parse_extend(&mut self, start: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        let selector = self.parse_interpolated_text_until(|c| {
            c.peek() == Some(';') || c.peek() == Some('\n') || c.peek() == Some('!') || c.is_eof()
        })?;
        self.skip_trivia();
        let is_optional = if self.cursor.eat_char('!') {
            if !self.cursor.consume_ident_sequence().eq_ignore_ascii_case("optional") {
                return Err(self.error_here("expected \"!optional\"."));
            }
            true
        } else {
            false
        };
        self.finish_statement()?;
        Ok(Statement::Extend { selector, is_optional, span: self.span_from(start) })
    }

    fn parse_quoted_url(&mut self) -> Result<String, SassError> {
        self.skip_trivia();
        match self.cursor.peek() {
            Some(q @ ('"' | '\'')) => {
                self.cursor.bump();
                let mut text = String::new();
                loop {
                    match self.cursor.peek() {
                        Some(c) if c == q => {
                            self.cursor.bump();
                            break;
                        }
                        Some('\\') => {
                            if let Some(c) = self.cursor.consume_escape() {
                                text.push(c);
                            }
                        }
                        Some(c) => {
                            text.push(c);
                            self.cursor.bump();
                        }
                        None => return Err(self.error_here("unterminated string.")),
                    }
                }
                Ok(text)
            }
            _ => Err(self.error_here("expected string.")),
        }
    }

    fn parse_configuration(&mut self) -> Result<Vec<(String, crate::ast::Expression)>, SassError> {
        self.expect_char('(')?;
        self.skip_trivia();
        let mut entries = Vec::new();
        if self.cursor.peek() != Some(')') {
            loop {
                self.skip_trivia();
                self.expect_char('$')?;
                let name = self.cursor.consume_ident_sequence();
                self.skip_trivia();
                self.expect_char(':')?;
                self.skip_trivia();
                let value = self.parse_space_list()?;
                entries.push((name, value));
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
        Ok(entries)
    }

    fn parse_use(&mut self, start: usize) -> Result<Statement, SassError> {
        let url = self.parse_quoted_url()?;
        self.skip_trivia();
        let namespace = if self.eat_keyword("as") {
            self.skip_trivia();
            if self.cursor.eat_char('*') {
                Some(UseNamespace::Star)
            } else {
                let name = self.cursor.consume_ident_sequence();
                if name.is_empty() {
                    return Err(self.error_here("expected namespace."));
                }
                Some(UseNamespace::Named(name))
            }
        } else {
            None
        };
        self.skip_trivia();
        let configuration = if self.eat_keyword("with") {
            self.skip_trivia();
            self.parse_configuration()?
        } else {
            Vec::new()
        };
        self.finish_statement()?;
        Ok(Statement::Use { url, namespace, configuration, span: self.span_from(start) })
    }

    fn parse_forward(&mut self, start: usize) -> Result<Statement, SassError> {
        let url = self.parse_quoted_url()?;
        self.skip_trivia();
        let prefix = if self.eat_keyword("as") {
            self.skip_trivia();
            let mut name = self.cursor.consume_ident_sequence();
            if name.is_empty() {
                return Err(self.error_here("expected prefix."));
            }
            if !self.cursor.eat_char('*') {
                return Err(self.error_here("expected \"*\"."));
            }
            if name.ends_with('-') {
                name.pop();
            }
            Some(name)
        } else {
            None
        };
        self.skip_trivia();
        let visibility = if self.eat_keyword("show") {
            self.skip_trivia();
            ForwardVisibility::Show(self.parse_name_list()?)
        } else if self.eat_keyword("hide") {
            self.skip_trivia();
            ForwardVisibility::Hide(self.parse_name_list()?)
        } else {
            ForwardVisibility::All
        };
        self.skip_trivia();
        let configuration = if self.eat_keyword("with") {
            self.skip_trivia();
            self.parse_configuration()?
        } else {
            Vec::new()
        };
        self.finish_statement()?;
        Ok(Statement::Forward { url, prefix, visibility, configuration, span: self.span_from(start) })
    }

    fn parse_name_list(&mut self) -> Result<Vec<String>, SassError> {
        let mut names = Vec::new();
        loop {
            self.skip_trivia();
            self.cursor.eat_char('$');
            let name = self.cursor.consume_ident_sequence();
            if name.is_empty() {
                return Err(self.error_here("expected name."));
            }
            names.push(name);
            self.skip_trivia();
            if self.cursor.eat_char(',') {
                continue;
            }
            break;
        }
        Ok(names)
    }

    fn parse_import(&mut self, start: usize) -> Result<Statement, SassError> {
        let mut targets = Vec::new();
        loop {
            let target_start = self.cursor.offset();
            let url = if matches!(self.cursor.peek(), Some('"') | Some('\'')) {
                self.parse_quoted_url()?
            } else {
                self.parse_interpolated_text_until(|c| {
                    matches!(c.peek(), Some(',') | Some(';') | Some('\n')) || c.is_eof()
                })?
                .as_plain_text()
                .unwrap_or_default()
            };
            targets.push(ImportTarget { url, span: self.span_from(target_start) });
            self.skip_trivia();
            if self.cursor.eat_char(',') {
                self.skip_trivia();
                continue;
            }
            break;
        }
        self.finish_statement()?;
        Ok(Statement::Import { targets, span: self.span_from(start) })
    }

    fn parse_include(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        let (namespace, name) = self.parse_dotted_name()?;
        self.skip_trivia();
        let args = if self.cursor.peek() == Some('(') {
            self.parse_argument_invocation()?
        } else {
            ArgumentInvocation { positional: Vec::new(), span: self.span_from(self.cursor.offset()) }
        };
        self.skip_trivia();
        let content_params = if self.eat_keyword("using") {
            self.skip_trivia();
            Some(self.parse_parameter_list()?)
        } else {
            None
        };
        let content = if self.block_follows(header_indent) {
            Some(Rc::new(self.parse_block(header_indent)?))
        } else {
            self.finish_statement()?;
            None
        };
        Ok(Statement::Include { name, namespace, args, content_params, content, span: self.span_from(start) })
    }

    fn parse_dotted_name(&mut self) -> Result<(Option<String>, String), SassError> {
        let first = self.cursor.consume_ident_sequence();
        if first.is_empty() {
            return Err(self.error_here("expected name."));
        }
        if self.cursor.peek() == Some('.') && self.cursor.peek_at(1).is_some_and(crate::lexer::is_ident_start)
        {
            self.cursor.bump();
            let second = self.cursor.consume_ident_sequence();
            return Ok((Some(first), second));
        }
        Ok((None, first))
    }

    fn parse_function(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        let name = self.cursor.consume_ident_sequence();
        if name.is_empty() {
            return Err(self.error_here("expected function name."));
        }
        self.skip_trivia();
        let params = self.parse_parameter_list()?;
        let was_in_function = self.in_function_body;
        self.in_function_body = true;
        let body = self.parse_block(header_indent);
        self.in_function_body = was_in_function;
        Ok(Statement::Function { name, params, body: body?, span: self.span_from(start) })
    }

    fn parse_mixin(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        let name = self.cursor.consume_ident_sequence();
        if name.is_empty() {
            return Err(self.error_here("expected mixin name."));
        }
        self.skip_trivia();
        let params = if self.cursor.peek() == Some('(') {
            self.parse_parameter_list()?
        } else {
            ParameterList::default()
        };
        let body = self.parse_block(header_indent)?;
        let accepts_content = statements_contain_content(&body);
        Ok(Statement::Mixin { name, params, body, accepts_content, span: self.span_from(start) })
    }

    fn parse_content(&mut self, start: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        let args = if self.cursor.peek() == Some('(') {
            self.parse_argument_invocation()?
        } else {
            ArgumentInvocation { positional: Vec::new(), span: self.span_from(start) }
        };
        self.finish_statement()?;
        Ok(Statement::Content { args, span: self.span_from(start) })
    }

    fn parse_media(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        let query = self.parse_prelude_interpolation()?;
        let body = self.parse_block(header_indent)?;
        Ok(Statement::Media { query, body, span: self.span_from(start) })
    }

    fn parse_supports(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        self.skip_trivia();
        let condition = self.parse_supports_condition()?;
        let body = self.parse_block(header_indent)?;
        Ok(Statement::Supports { condition, body, span: self.span_from(start) })
    }

    fn parse_keyframes(
        &mut self,
        start: usize,
        header_indent: usize,
        original_name: &str,
        lower: &str,
    ) -> Result<Statement, SassError> {
        let vendor_prefix = if lower == "keyframes" {
            None
        } else {
            original_name.strip_suffix("-keyframes").or_else(|| original_name.strip_suffix("-Keyframes")).map(str::to_string).or_else(|| {
                lower.strip_suffix("-keyframes").map(|p| original_name[..p.len()].to_string())
            })
        };
        self.skip_trivia();
        let name = self.parse_interpolated_identifier()?;
        let body = self.parse_keyframes_body(header_indent)?;
        Ok(Statement::Keyframes { name, vendor_prefix, body, span: self.span_from(start) })
    }

    /// Captures an at-rule prelude (media query / unknown at-rule prelude)
    /// as raw interpolation, stopping before the block or statement
    /// terminator.
    fn parse_prelude_interpolation(&mut self) -> Result<Interpolation, SassError> {
        match self.syntax {
            super::Syntax::Scss => {
                self.parse_interpolated_text_until(|c| matches!(c.peek(), Some('{') | Some(';')) || c.is_eof())
            }
            super::Syntax::Indented => {
                self.parse_interpolated_text_until(|c| matches!(c.peek(), Some('\n')) || c.is_eof())
            }
        }
    }

    fn parse_unknown_at_rule(
        &mut self,
        start: usize,
        header_indent: usize,
        name: String,
    ) -> Result<Statement, SassError> {
        self.cursor.skip_inline_whitespace();
        let prelude = self.parse_prelude_interpolation()?;
        let body = if self.block_follows(header_indent) {
            Some(self.parse_block(header_indent)?)
        } else {
            self.finish_statement()?;
            None
        };
        Ok(Statement::UnknownAtRule { name, prelude, body, span: self.span_from(start) })
    }

    // -- Selector-vs-declaration disambiguation (§4.1) --------------------

    fn parse_selector_or_declaration(&mut self, header_indent: usize) -> Result<Statement, SassError> {
        let start = self.cursor.offset();
        if self.cursor.starts_with("--") {
            return self.parse_custom_property(start);
        }
        let checkpoint = self.cursor.clone();
        if let Some(statement) = self.try_parse_declaration(start, header_indent)? {
            return Ok(statement);
        }
        self.cursor = checkpoint;
        self.parse_style_rule(start, header_indent)
    }

    fn parse_custom_property(&mut self, start: usize) -> Result<Statement, SassError> {
        let name = self.parse_interpolated_identifier()?;
        self.cursor.skip_inline_whitespace();
        self.expect_char(':')?;
        let value_start = self.cursor.offset();
        let mut depth = 0i32;
        loop {
            match self.cursor.peek() {
                None => break,
                Some('(' | '[' | '{') => {
                    depth += 1;
                    self.cursor.bump();
                }
                Some(')' | ']' | '}') if depth > 0 => {
                    depth -= 1;
                    self.cursor.bump();
                }
                Some('}') => break,
                Some(';') if depth == 0 && matches!(self.syntax, super::Syntax::Scss) => break,
                Some('\n') if depth == 0 && matches!(self.syntax, super::Syntax::Indented) => break,
                Some('"' | '\'') => {
                    self.consume_raw_quoted_string();
                }
                Some(_) => {
                    self.cursor.bump();
                }
            }
        }
        let raw = self.cursor.full()[value_start..self.cursor.offset()].trim().to_string();
        if raw.is_empty() {
            return Err(self.error_here("custom property value may not be empty."));
        }
        let value = Interpolation::plain(raw, self.span_from(value_start));
        self.finish_statement()?;
        Ok(Statement::CustomProperty { name, value, span: self.span_from(start) })
    }

    /// Attempts the declaration interpretation of the current position;
    /// returns `Ok(None)` (never an error) whenever the input is
    /// recognizably a selector instead, so the caller can backtrack.
    fn try_parse_declaration(
        &mut self,
        start: usize,
        header_indent: usize,
    ) -> Result<Option<Statement>, SassError> {
        let Ok(name) = self.parse_interpolated_identifier() else { return Ok(None) };
        self.cursor.skip_inline_whitespace();
        if self.cursor.peek() != Some(':') {
            return Ok(None);
        }
        self.cursor.bump();
        if self.cursor.peek() == Some(':') {
            return Ok(None);
        }
        self.skip_trivia();

        // `prop: { nested }` — empty value, nested declarations only.
        if self.cursor.peek() == Some('{') {
            let body = self.parse_block(header_indent)?;
            return Ok(Some(Statement::Declaration { name, value: None, body, span: self.span_from(start) }));
        }
        if matches!(self.syntax, super::Syntax::Indented)
            && (self.cursor.peek() == Some('\n') || self.cursor.is_eof())
        {
            let body = self.indented_nested_declaration_body(header_indent)?;
            return Ok(Some(Statement::Declaration { name, value: None, body, span: self.span_from(start) }));
        }

        let value = match self.parse_expression() {
            Ok(value) => value,
            Err(_) => return Ok(None),
        };
        self.cursor.skip_inline_whitespace();
        if matches!(self.syntax, super::Syntax::Scss) && self.cursor.peek() == Some('{') {
            // Rule 5: a value immediately followed by `{` is ambiguous with
            // a compound selector ending in a pseudo-class/element; treat
            // it as a selector rather than a declaration with a body.
            return Ok(None);
        }
        let body = if matches!(self.syntax, super::Syntax::Indented) && self.block_follows(header_indent) {
            self.parse_block(header_indent)?
        } else {
            self.finish_statement()?;
            Vec::new()
        };
        Ok(Some(Statement::Declaration { name, value: Some(value), body, span: self.span_from(start) }))
    }

    fn indented_nested_declaration_body(
        &mut self,
        header_indent: usize,
    ) -> Result<Vec<Statement>, SassError> {
        self.finish_indented_line()?;
        self.parse_indented_children(Some(header_indent))
    }

    fn parse_style_rule(&mut self, start: usize, header_indent: usize) -> Result<Statement, SassError> {
        let selector = match self.syntax {
            super::Syntax::Scss => {
                self.parse_interpolated_text_until(|c| matches!(c.peek(), Some('{') | Some(';')) || c.is_eof())?
            }
            super::Syntax::Indented => {
                self.parse_interpolated_text_until(|c| matches!(c.peek(), Some('\n')) || c.is_eof())?
            }
        };
        if selector.is_plain() && selector.as_plain_text().is_some_and(|t| t.trim().is_empty()) {
            return Err(self.error_here("expected selector."));
        }
        let body = self.parse_block(header_indent)?;
        Ok(Statement::StyleRule { selector, body, span: self.span_from(start) })
    }
}

/// Whether `@content` appears anywhere in `body` at a level this mixin is
/// directly responsible for evaluating (not inside a nested
/// `@mixin`/`@function` definition, which has its own scope).
fn statements_contain_content(body: &[Statement]) -> bool {
    body.iter().any(|statement| match statement {
        Statement::Content { .. } => true,
        Statement::If { clauses, .. } => clauses.iter().any(|c| statements_contain_content(&c.body)),
        Statement::Each { body, .. }
        | Statement::For { body, .. }
        | Statement::While { body, .. }
        | Statement::AtRoot { body, .. }
        | Statement::Media { body, .. }
        | Statement::Supports { body, .. } => statements_contain_content(body),
        Statement::StyleRule { body, .. } | Statement::Declaration { body, .. } => {
            statements_contain_content(body)
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;
    use crate::error::SourceFile;
    use crate::parser::{parse_stylesheet, Syntax};
    use std::sync::Arc;

    fn parse(src: &str, syntax: Syntax) -> Vec<Statement> {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t").unwrap(), src.to_string()));
        parse_stylesheet(&source, syntax).unwrap().statements
    }

    #[test]
    fn disambiguates_pseudo_class_selector_from_declaration() {
        let stmts = parse("a:hover { color: blue; }", Syntax::Scss);
        assert_eq!(stmts.len(), 1);
        assert!(matches!(stmts[0], Statement::StyleRule { .. }));
    }

    #[test]
    fn parses_plain_declaration() {
        let stmts = parse("a { color: red; }", Syntax::Scss);
        let Statement::StyleRule { body, .. } = &stmts[0] else { panic!("expected style rule") };
        assert!(matches!(body[0], Statement::Declaration { .. }));
    }

    #[test]
    fn parses_nested_declaration_with_empty_value() {
        let stmts = parse("a { font: { size: 1em; family: sans-serif; } }", Syntax::Scss);
        let Statement::StyleRule { body, .. } = &stmts[0] else { panic!("expected style rule") };
        let Statement::Declaration { value, body, .. } = &body[0] else { panic!("expected declaration") };
        assert!(value.is_none());
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn parses_custom_property_raw_value() {
        let stmts = parse("a { --gap: 1px  2px; }", Syntax::Scss);
        let Statement::StyleRule { body, .. } = &stmts[0] else { panic!("expected style rule") };
        assert!(matches!(body[0], Statement::CustomProperty { .. }));
    }

    #[test]
    fn parses_variable_declaration_with_default_flag() {
        let stmts = parse("$x: 1 !default;", Syntax::Scss);
        let Statement::VariableDecl { is_default, .. } = &stmts[0] else { panic!("expected var decl") };
        assert!(*is_default);
    }

    #[test]
    fn parses_if_else_if_else_chain() {
        let stmts = parse("@if $a { x: 1; } @else if $b { x: 2; } @else { x: 3; }", Syntax::Scss);
        let Statement::If { clauses, .. } = &stmts[0] else { panic!("expected if") };
        assert_eq!(clauses.len(), 3);
        assert!(clauses[2].condition.is_none());
    }

    #[test]
    fn parses_each_loop() {
        let stmts = parse("@each $k, $v in $map { x: $v; }", Syntax::Scss);
        let Statement::Each { vars, .. } = &stmts[0] else { panic!("expected each") };
        assert_eq!(vars.names, vec!["k".to_string(), "v".to_string()]);
    }

    #[test]
    fn parses_mixin_with_content_detection() {
        let stmts = parse("@mixin foo { @content; }", Syntax::Scss);
        let Statement::Mixin { accepts_content, .. } = &stmts[0] else { panic!("expected mixin") };
        assert!(*accepts_content);
    }

    #[test]
    fn parses_use_with_namespace() {
        let stmts = parse("@use \"sass:math\" as m;", Syntax::Scss);
        let Statement::Use { namespace, .. } = &stmts[0] else { panic!("expected use") };
        assert!(matches!(namespace, Some(UseNamespace::Named(n)) if n == "m"));
    }

    #[test]
    fn parses_forward_with_show() {
        let stmts = parse("@forward \"list\" show munge;", Syntax::Scss);
        let Statement::Forward { visibility, .. } = &stmts[0] else { panic!("expected forward") };
        let ForwardVisibility::Show(names) = visibility else { panic!("expected show") };
        assert_eq!(names, &vec!["munge".to_string()]);
    }

    #[test]
    fn parses_extend_with_optional_flag() {
        let stmts = parse("a { @extend .b !optional; }", Syntax::Scss);
        let Statement::StyleRule { body, .. } = &stmts[0] else { panic!("expected style rule") };
        let Statement::Extend { is_optional, .. } = &body[0] else { panic!("expected extend") };
        assert!(*is_optional);
    }

    #[test]
    fn parses_keyframes_with_vendor_prefix() {
        let stmts = parse("@-webkit-keyframes spin { from { x: 0; } to { x: 1; } }", Syntax::Scss);
        let Statement::Keyframes { vendor_prefix, body, .. } = &stmts[0] else { panic!("expected keyframes") };
        assert_eq!(vendor_prefix.as_deref(), Some("-webkit"));
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn parses_indented_style_rule_with_declarations() {
        let stmts = parse("a\n  color: red\n  font-size: 1em\n", Syntax::Indented);
        let Statement::StyleRule { body, .. } = &stmts[0] else { panic!("expected style rule") };
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn unknown_at_rule_keeps_raw_prelude_and_body() {
        let stmts = parse("@font-face { font-family: \"Foo\"; }", Syntax::Scss);
        assert!(matches!(stmts[0], Statement::UnknownAtRule { .. }));
    }
}
