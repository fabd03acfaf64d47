//! Parses already-interpolated selector text into a [`SelectorList`].
//!
//! Interpolation (`#{...}`) is resolved by the evaluator before this parser
//! ever sees the text, so this module only has to deal with plain selector
//! syntax — generalized from the teacher's char-by-char `parse_selector`
//! into a full Selectors Level 4 grammar: namespaces, placeholders, `&`,
//! attribute flags, and selector-taking pseudo-classes.

use crate::error::{SassError, Span};
use crate::lexer::Cursor;

use super::{
    AttributeOp, AttributeSelector, Combinator, ComplexComponent, ComplexSelector,
    CompoundSelector, PseudoArgument, SelectorList, SimpleSelector,
};

/// Parse a full comma-separated selector list, e.g. `a.foo, b > c`.
pub fn parse_selector_list(text: &str, span: &Span) -> Result<SelectorList, SassError> {
    let mut cursor = Cursor::new(text);
    let list = parse_list(&mut cursor, span)?;
    cursor.skip_whitespace();
    if !cursor.is_eof() {
        return Err(SassError::parse(
            format!("expected selector, found \"{}\"", cursor.rest()),
            span.clone(),
        ));
    }
    Ok(list)
}

fn parse_list(cursor: &mut Cursor<'_>, span: &Span) -> Result<SelectorList, SassError> {
    let mut complexes = Vec::new();
    loop {
        cursor.skip_whitespace();
        complexes.push(parse_complex(cursor, span)?);
        cursor.skip_whitespace();
        if cursor.eat_char(',') {
            continue;
        }
        break;
    }
    Ok(SelectorList { complexes })
}

fn parse_complex(cursor: &mut Cursor<'_>, span: &Span) -> Result<ComplexSelector, SassError> {
    let mut components = Vec::new();
    loop {
        cursor.skip_whitespace();
        if let Some(combinator) = peek_combinator(cursor) {
            consume_combinator_char(cursor, combinator);
            components.push(ComplexComponent::Combinator(combinator));
            cursor.skip_whitespace();
            continue;
        }
        if at_compound_end(cursor) {
            break;
        }
        let compound = parse_compound(cursor, span)?;
        components.push(ComplexComponent::Compound(compound));

        // Whitespace between two compounds with no explicit combinator
        // means the descendant combinator, unless what follows ends the
        // selector (comma, closing paren, or end of input).
        let before = cursor.offset();
        cursor.skip_whitespace();
        let consumed_whitespace = cursor.offset() != before;
        if at_compound_end(cursor) {
            break;
        }
        if consumed_whitespace && peek_combinator(cursor).is_none() {
            components.push(ComplexComponent::Combinator(Combinator::Descendant));
        }
    }
    if components.is_empty() {
        return Err(SassError::parse("expected selector.", span.clone()));
    }
    Ok(ComplexSelector { components })
}

fn at_compound_end(cursor: &Cursor<'_>) -> bool {
    cursor.is_eof() || matches!(cursor.peek(), Some(',') | Some(')'))
}

fn peek_combinator(cursor: &Cursor<'_>) -> Option<Combinator> {
    match cursor.peek() {
        Some('>') => Some(Combinator::Child),
        Some('+') => Some(Combinator::NextSibling),
        Some('~') => Some(Combinator::SubsequentSibling),
        _ => None,
    }
}

fn consume_combinator_char(cursor: &mut Cursor<'_>, combinator: Combinator) {
    debug_assert_ne!(combinator, Combinator::Descendant);
    cursor.bump();
}

fn parse_compound(cursor: &mut Cursor<'_>, span: &Span) -> Result<CompoundSelector, SassError> {
    let mut simple_selectors = Vec::new();
    loop {
        match cursor.peek() {
            Some('&') => {
                cursor.bump();
                simple_selectors.push(SimpleSelector::Parent);
            }
            Some('*') => {
                cursor.bump();
                simple_selectors.push(SimpleSelector::Universal { namespace: None });
            }
            Some('.') => {
                cursor.bump();
                let name = parse_ident(cursor, span)?;
                simple_selectors.push(SimpleSelector::Class(name));
            }
            Some('#') if cursor.peek_at(1) != Some('{') => {
                cursor.bump();
                let name = parse_ident(cursor, span)?;
                simple_selectors.push(SimpleSelector::Id(name));
            }
            Some('%') => {
                cursor.bump();
                let name = parse_ident(cursor, span)?;
                simple_selectors.push(SimpleSelector::Placeholder(name));
            }
            Some('[') => {
                simple_selectors.push(SimpleSelector::Attribute(parse_attribute(cursor, span)?));
            }
            Some(':') => {
                simple_selectors.push(parse_pseudo(cursor, span)?);
            }
            Some(c) if crate::lexer::is_ident_start(c) || c == '-' => {
                let name = parse_ident(cursor, span)?;
                if cursor.eat_char('|') {
                    let local = parse_ident(cursor, span)?;
                    simple_selectors.push(SimpleSelector::Type {
                        namespace: Some(name),
                        name: local,
                    });
                } else {
                    simple_selectors.push(SimpleSelector::Type {
                        namespace: None,
                        name,
                    });
                }
            }
            _ => break,
        }
    }
    if simple_selectors.is_empty() {
        return Err(SassError::parse(
            format!("expected selector, found \"{}\"", cursor.rest()),
            span.clone(),
        ));
    }
    Ok(CompoundSelector { simple_selectors })
}

fn parse_ident(cursor: &mut Cursor<'_>, span: &Span) -> Result<String, SassError> {
    let ident = cursor.consume_ident_sequence();
    if ident.is_empty() {
        return Err(SassError::parse(
            format!("expected identifier, found \"{}\"", cursor.rest()),
            span.clone(),
        ));
    }
    Ok(ident)
}

fn parse_attribute(cursor: &mut Cursor<'_>, span: &Span) -> Result<AttributeSelector, SassError> {
    cursor.eat_char('[');
    cursor.skip_whitespace();
    let mut name = parse_ident(cursor, span)?;
    let mut namespace = None;
    if cursor.eat_char('|') {
        namespace = Some(name);
        name = parse_ident(cursor, span)?;
    }
    cursor.skip_whitespace();
    let op = match cursor.peek() {
        Some(']') => {
            cursor.bump();
            return Ok(AttributeSelector {
                namespace,
                name,
                op: AttributeOp::Exists,
                value: None,
                flag: None,
            });
        }
        Some('=') => {
            cursor.bump();
            AttributeOp::Equals
        }
        Some('~') if cursor.peek_at(1) == Some('=') => {
            cursor.bump();
            cursor.bump();
            AttributeOp::Includes
        }
        Some('|') if cursor.peek_at(1) == Some('=') => {
            cursor.bump();
            cursor.bump();
            AttributeOp::DashMatch
        }
        Some('^') if cursor.peek_at(1) == Some('=') => {
            cursor.bump();
            cursor.bump();
            AttributeOp::Prefix
        }
        Some('$') if cursor.peek_at(1) == Some('=') => {
            cursor.bump();
            cursor.bump();
            AttributeOp::Suffix
        }
        Some('*') if cursor.peek_at(1) == Some('=') => {
            cursor.bump();
            cursor.bump();
            AttributeOp::Substring
        }
        _ => {
            return Err(SassError::parse(
                format!("expected attribute operator, found \"{}\"", cursor.rest()),
                span.clone(),
            ));
        }
    };
    cursor.skip_whitespace();
    let value = parse_attribute_value(cursor, span)?;
    cursor.skip_whitespace();
    let flag = match cursor.peek() {
        Some(c @ ('i' | 'I' | 's' | 'S')) => {
            cursor.bump();
            Some(c.to_ascii_lowercase())
        }
        _ => None,
    };
    cursor.skip_whitespace();
    if !cursor.eat_char(']') {
        return Err(SassError::parse("expected \"]\".", span.clone()));
    }
    Ok(AttributeSelector {
        namespace,
        name,
        op,
        value: Some(value),
        flag,
    })
}

fn parse_attribute_value(cursor: &mut Cursor<'_>, span: &Span) -> Result<String, SassError> {
    match cursor.peek() {
        Some(q @ ('"' | '\'')) => {
            cursor.bump();
            let mut value = String::new();
            loop {
                match cursor.peek() {
                    Some(c) if c == q => {
                        cursor.bump();
                        break;
                    }
                    Some('\\') => {
                        if let Some(c) = cursor.consume_escape() {
                            value.push(c);
                        }
                    }
                    Some(c) => {
                        cursor.bump();
                        value.push(c);
                    }
                    None => {
                        return Err(SassError::parse("unterminated attribute value.", span.clone()));
                    }
                }
            }
            Ok(value)
        }
        _ => parse_ident(cursor, span),
    }
}

fn parse_pseudo(cursor: &mut Cursor<'_>, span: &Span) -> Result<SimpleSelector, SassError> {
    cursor.eat_char(':');
    let is_element = cursor.eat_char(':');
    let name = parse_ident(cursor, span)?;
    let argument = if cursor.eat_char('(') {
        let arg = if is_selector_taking_pseudo(&name) {
            let list = parse_list(cursor, span)?;
            PseudoArgument::Selector(list)
        } else {
            let mut depth = 1usize;
            let mut raw = String::new();
            while depth > 0 {
                match cursor.peek() {
                    Some('(') => {
                        depth += 1;
                        raw.push(cursor.bump().unwrap());
                    }
                    Some(')') => {
                        depth -= 1;
                        if depth > 0 {
                            raw.push(cursor.bump().unwrap());
                        } else {
                            cursor.bump();
                        }
                    }
                    Some(c) => {
                        raw.push(c);
                        cursor.bump();
                    }
                    None => {
                        return Err(SassError::parse("unterminated pseudo-class argument.", span.clone()));
                    }
                }
            }
            PseudoArgument::Raw(raw.trim().to_string())
        };
        cursor.skip_whitespace();
        if matches!(arg, PseudoArgument::Selector(_)) && !cursor.eat_char(')') {
            return Err(SassError::parse("expected \")\".", span.clone()));
        }
        Some(arg)
    } else {
        None
    };
    Ok(if is_element {
        SimpleSelector::PseudoElement { name, argument }
    } else {
        SimpleSelector::PseudoClass { name, argument }
    })
}

fn is_selector_taking_pseudo(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "not" | "is" | "matches" | "where" | "has" | "host" | "host-context" | "current" | "slotted"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use std::sync::Arc;

    fn span() -> Span {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t.scss").unwrap(), ""));
        Span::new(source, 0, 0)
    }

    #[test]
    fn parses_simple_compound() {
        let list = parse_selector_list("div.foo#bar", &span()).unwrap();
        assert_eq!(list.complexes.len(), 1);
        assert_eq!(list.complexes[0].components.len(), 1);
    }

    #[test]
    fn parses_comma_separated_list() {
        let list = parse_selector_list("a, b", &span()).unwrap();
        assert_eq!(list.complexes.len(), 2);
    }

    #[test]
    fn parses_descendant_and_child_combinators() {
        let list = parse_selector_list("a > b c", &span()).unwrap();
        assert_eq!(list.complexes[0].components.len(), 4);
    }

    #[test]
    fn parses_placeholder_and_parent() {
        let list = parse_selector_list("%foo &.bar", &span()).unwrap();
        assert!(list.contains_placeholder());
        assert!(list.contains_parent());
    }

    #[test]
    fn parses_not_with_nested_selector_list() {
        let list = parse_selector_list(":not(.a, .b)", &span()).unwrap();
        let ComplexComponent::Compound(compound) = &list.complexes[0].components[0] else {
            panic!("expected compound selector")
        };
        let SimpleSelector::PseudoClass { argument, .. } = &compound.simple_selectors[0] else {
            panic!("expected pseudo-class")
        };
        match argument {
            Some(PseudoArgument::Selector(inner)) => assert_eq!(inner.complexes.len(), 2),
            _ => panic!("expected selector argument"),
        }
    }
}
