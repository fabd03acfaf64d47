//! Character classes, escape decoding, and a small cursor shared by the
//! SCSS parser, the indented-syntax parser, and every sub-parser
//! (selectors, media queries, expressions).
//!
//! Modeled on the teacher's `CSSTokenizer` consume/peek/reconsume cursor,
//! generalized to track line/column-free byte offsets (spans compute
//! line/column lazily from the offset, see [`crate::error::SourceFile`]).

/// "An ident-start code point is a letter, a non-ASCII code point, or
/// U+005F LOW LINE (_)."
#[must_use]
pub const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// "An ident code point is an ident-start code point, a digit, or U+002D
/// HYPHEN-MINUS (-)."
#[must_use]
pub const fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

/// "A newline, U+0009 CHARACTER TABULATION, or U+0020 SPACE."
#[must_use]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// Whitespace that does not include a newline; used by the indented-syntax
/// parser, which treats newlines as structurally significant.
#[must_use]
pub const fn is_inline_whitespace(c: char) -> bool {
    matches!(c, '\t' | ' ')
}

/// A cursor over `&str` source text with one token of pushback, mirroring
/// the teacher's `consume`/`reconsume`/`peek` triad but operating on byte
/// offsets so spans can reference the original text directly.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    src: &'a str,
    /// Byte offset of the next character to be returned by `peek`.
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Start a cursor at the beginning of `src`.
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Start a cursor at a given byte offset into `src`.
    #[must_use]
    pub fn at(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    /// Current byte offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Whether the cursor has reached the end of input.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// The remaining, unconsumed input.
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// The full source buffer this cursor was created over, regardless of
    /// current position — used to rebuild a cursor at an earlier offset
    /// for backtracking.
    #[must_use]
    pub fn full(&self) -> &'a str {
        self.src
    }

    /// The character at the cursor without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The character `offset` positions ahead without consuming anything.
    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    /// Whether the remaining input starts with `s` (byte-exact).
    #[must_use]
    pub fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Whether the remaining input starts with `s`, ignoring ASCII case —
    /// used for keyword matching (`@Media`, `@MEDIA`, ...).
    #[must_use]
    pub fn starts_with_ignore_ascii_case(&self, s: &str) -> bool {
        let rest = self.rest();
        rest.len() >= s.len() && rest[..s.len()].eq_ignore_ascii_case(s)
    }

    /// Consume and return the next character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `s` if the input starts with it exactly; returns whether it
    /// matched.
    pub fn eat_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Consume `c` if it is next; returns whether it matched.
    pub fn eat_char(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume characters while `pred` holds, returning the consumed slice.
    pub fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if pred(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    /// Consume run-of-the-mill inline whitespace (not newlines).
    pub fn skip_inline_whitespace(&mut self) {
        self.eat_while(is_inline_whitespace);
    }

    /// Consume any whitespace, including newlines — for SCSS mode, where
    /// newlines carry no structural meaning.
    pub fn skip_whitespace(&mut self) {
        self.eat_while(is_whitespace);
    }

    /// "Consume an escaped code point", per the CSS escaping algorithm:
    /// a backslash followed either by 1-6 hex digits (optionally followed
    /// by one whitespace character) or by a single literal character.
    pub fn consume_escape(&mut self) -> Option<char> {
        if !self.eat_char('\\') {
            return None;
        }
        match self.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                let hex = self.eat_while(|c| c.is_ascii_hexdigit());
                let hex = if hex.len() > 6 { &hex[..6] } else { hex };
                // `eat_while` already consumed up to 6+ hex digits; if more
                // than 6 were present the remainder is left as literal text,
                // matching the one-to-six-digit escape grammar.
                if self.peek().is_some_and(is_whitespace) {
                    self.bump();
                }
                let code_point = u32::from_str_radix(hex, 16).unwrap_or(0xFFFD);
                if code_point == 0 || (0xD800..=0xDFFF).contains(&code_point) || code_point > 0x0010_FFFF {
                    Some('\u{FFFD}')
                } else {
                    char::from_u32(code_point)
                }
            }
            Some(_) => self.bump(),
            None => Some('\u{FFFD}'),
        }
    }

    /// Consume an ident sequence (identifier, possibly containing
    /// escapes), returning its decoded text.
    pub fn consume_ident_sequence(&mut self) -> String {
        let mut out = String::new();
        loop {
            match self.peek() {
                Some('\\') => {
                    if let Some(c) = self.consume_escape() {
                        out.push(c);
                    }
                }
                Some(c) if is_ident_char(c) => {
                    out.push(c);
                    self.bump();
                }
                _ => break,
            }
        }
        out
    }

    /// Whether the input at the cursor could begin an ident sequence,
    /// without consuming anything.
    #[must_use]
    pub fn would_start_ident(&self) -> bool {
        match self.peek() {
            Some('-') => {
                let second = self.peek_at(1);
                matches!(second, Some(c) if is_ident_start(c) || c == '-') || second == Some('\\')
            }
            Some(c) => is_ident_start(c) || c == '\\',
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_plain_ident() {
        let mut cursor = Cursor::new("foo-bar2 rest");
        assert_eq!(cursor.consume_ident_sequence(), "foo-bar2");
        assert_eq!(cursor.rest(), " rest");
    }

    #[test]
    fn consumes_hex_escape_with_trailing_space() {
        let mut cursor = Cursor::new(r"\41 BC");
        assert_eq!(cursor.consume_ident_sequence(), "ABC");
    }

    #[test]
    fn would_start_ident_detects_leading_hyphen() {
        assert!(Cursor::new("-foo").would_start_ident());
        assert!(Cursor::new("--foo").would_start_ident());
        assert!(!Cursor::new("-1").would_start_ident());
        assert!(!Cursor::new("123").would_start_ident());
    }

    #[test]
    fn starts_with_ignore_ascii_case_matches_keywords() {
        let cursor = Cursor::new("@MEDIA screen");
        assert!(cursor.starts_with_ignore_ascii_case("@media"));
    }
}
