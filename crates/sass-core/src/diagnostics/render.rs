//! Caret-underlined source excerpts for error and warning output (§4.7).

use crate::error::Span;

/// Render the line(s) a span covers, followed by a line of carets under the
/// exact columns the span highlights. Multi-line spans only underline the
/// first line; that is enough for the single-line constructs (selectors,
/// declarations, expressions) this compiler's errors point at.
#[must_use]
pub fn render(span: &Span) -> String {
    let (line_no, col) = span.source.line_col(span.start);
    let line_text = span
        .source
        .text
        .lines()
        .nth(line_no - 1)
        .unwrap_or_default();
    let underline_len = span.text().lines().next().map_or(1, |first| first.chars().count().max(1));
    let gutter = format!("{line_no} | ");
    let mut out = String::new();
    out.push_str(&format!("  ╷\n{gutter}{line_text}\n", gutter = gutter));
    out.push_str("  ");
    out.push_str(&" ".repeat(gutter.len() - 2));
    out.push('|');
    out.push_str(&" ".repeat(col));
    out.push_str(&"^".repeat(underline_len));
    out.push('\n');
    out.push_str(&format!("  ╵ {}:{}:{}\n", span.source.url, line_no, col));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use std::sync::Arc;

    #[test]
    fn renders_caret_under_the_span() {
        let url = url::Url::parse("file:///input.scss").unwrap();
        let source = Arc::new(SourceFile::new(url, "a { color: red; }"));
        let span = Span::new(source, 4, 9);
        let rendered = render(&span);
        assert!(rendered.contains("color"));
        assert!(rendered.contains('^'));
    }
}
