//! Walks a finished CSS tree into output text plus an optional source map
//! (§4.6). Two output styles are supported: `expanded` (one declaration
//! per line, two-space indent) and `compressed` (no insignificant
//! whitespace at all).
//!
//! The evaluator and `@extend` engine have already done all the Sass-
//! specific work by the time a tree reaches here — this module's only
//! job is turning a [`CssNode`] tree into bytes, which is why it carries
//! no dependency on the evaluator or parser.

pub mod source_map;
mod value;

use crate::css::{CssAtRule, CssComment, CssDeclaration, CssKeyframes, CssNode, CssStyleRule};
use crate::error::Span;

use source_map::SourceMapBuilder;

/// `expanded` (human-readable, the default) or `compressed` (no
/// insignificant whitespace) — §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Expanded,
    Compressed,
}

impl OutputStyle {
    fn is_compressed(self) -> bool {
        matches!(self, Self::Compressed)
    }
}

/// Serialize a finished CSS tree. `build_source_map` enables position
/// tracking; pass `false` to skip the bookkeeping entirely when no map
/// was requested.
#[must_use]
pub fn serialize(nodes: &[CssNode], style: OutputStyle, build_source_map: bool, embed_sources: bool) -> (String, Option<SourceMapBuilder>) {
    let mut printer = Printer {
        out: String::new(),
        style,
        indent: 0,
        line: 0,
        column: 0,
        map: build_source_map.then(|| SourceMapBuilder::new(embed_sources)),
        pending_semicolon: false,
    };
    printer.print_nodes(nodes);
    (printer.out, printer.map)
}

/// Prefix the serialized CSS with `@charset "UTF-8";` (expanded) or a
/// UTF-8 BOM (compressed), but only if the text contains a non-ASCII
/// byte and `enabled` is set — an all-ASCII stylesheet never needs
/// either, per §4.6.
#[must_use]
pub fn apply_charset(css: String, style: OutputStyle, enabled: bool) -> String {
    if !enabled || css.is_ascii() {
        return css;
    }
    match style {
        OutputStyle::Expanded => format!("@charset \"UTF-8\";\n{css}"),
        OutputStyle::Compressed => format!("\u{feff}{css}"),
    }
}

struct Printer {
    out: String,
    style: OutputStyle,
    indent: usize,
    line: usize,
    column: usize,
    map: Option<SourceMapBuilder>,
    /// Compressed mode only: a `;` owed before the next statement, left
    /// unwritten if the block closes first (no trailing `;` before `}`).
    pending_semicolon: bool,
}

impl Printer {
    fn compressed(&self) -> bool {
        self.style.is_compressed()
    }

    fn write(&mut self, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.out.push_str(text);
    }

    fn mark(&mut self, span: &Span) {
        if let Some(map) = &mut self.map {
            map.add(self.line, self.column, span);
        }
    }

    fn newline(&mut self) {
        if !self.compressed() {
            self.write("\n");
        }
    }

    fn write_indent(&mut self) {
        if !self.compressed() {
            for _ in 0..self.indent {
                self.write("  ");
            }
        }
    }

    /// Write a `;` left pending by the previous declaration/import/bare
    /// at-rule, now that another statement follows it in the same block.
    /// Compressed mode only; expanded mode writes its own `;` eagerly
    /// since a trailing one before `}` is harmless there.
    fn flush_pending_semicolon(&mut self) {
        if self.pending_semicolon {
            self.pending_semicolon = false;
            self.write(";");
        }
    }

    fn print_nodes(&mut self, nodes: &[CssNode]) {
        for node in nodes {
            if matches!(node, CssNode::Declaration(d) if d.value.is_none() && d.children.is_empty()) {
                continue;
            }
            self.print_node(node);
        }
    }

    fn print_node(&mut self, node: &CssNode) {
        match node {
            CssNode::StyleRule(rule) => self.print_style_rule(rule),
            CssNode::Media(rule) => self.print_at_rule("media", rule),
            CssNode::Supports(rule) => self.print_at_rule("supports", rule),
            CssNode::UnknownAtRule(rule) => self.print_at_rule(&rule.name, rule),
            CssNode::Keyframes(kf) => self.print_keyframes(kf),
            CssNode::Declaration(decl) => self.print_declaration("", decl),
            CssNode::Import(import) => self.print_import(import),
            CssNode::Comment(comment) => self.print_comment(comment),
        }
    }

    fn print_style_rule(&mut self, rule: &CssStyleRule) {
        if rule.children.is_empty() {
            return;
        }
        self.flush_pending_semicolon();
        self.write_indent();
        self.mark(&rule.span);
        self.write(&rule.selector.to_string());
        self.open_block();
        self.indent += 1;
        self.print_nodes(&rule.children);
        self.indent -= 1;
        self.close_block();
    }

    fn print_at_rule(&mut self, name: &str, rule: &CssAtRule) {
        self.flush_pending_semicolon();
        self.write_indent();
        self.mark(&rule.span);
        self.write("@");
        self.write(name);
        if !rule.prelude.is_empty() {
            self.write(" ");
            self.write(&rule.prelude);
        }
        if rule.children.is_empty() {
            if self.compressed() {
                self.pending_semicolon = true;
            } else {
                self.write(";");
            }
            self.newline();
            return;
        }
        self.open_block();
        self.indent += 1;
        self.print_nodes(&rule.children);
        self.indent -= 1;
        self.close_block();
    }

    fn print_keyframes(&mut self, kf: &CssKeyframes) {
        self.flush_pending_semicolon();
        self.write_indent();
        self.mark(&kf.span);
        self.write("@");
        if let Some(prefix) = &kf.vendor_prefix {
            self.write("-");
            self.write(prefix);
            self.write("-");
        }
        self.write("keyframes ");
        self.write(&kf.name);
        self.open_block();
        self.indent += 1;
        for block in &kf.blocks {
            self.write_indent();
            self.mark(&block.span);
            self.write(&block.selectors.join(if self.compressed() { "," } else { ", " }));
            self.open_block();
            self.indent += 1;
            self.print_nodes(&block.children);
            self.indent -= 1;
            self.close_block();
        }
        self.indent -= 1;
        self.close_block();
    }

    fn open_block(&mut self) {
        if self.compressed() {
            self.write("{");
        } else {
            self.write(" {\n");
        }
    }

    fn close_block(&mut self) {
        if self.compressed() {
            // Drop, don't flush: a `;` pending from the last declaration
            // in this block is a separator between statements, and the
            // last statement before `}` never gets one.
            self.pending_semicolon = false;
            self.write("}");
        } else {
            self.write_indent();
            self.write("}\n");
        }
    }

    fn print_declaration(&mut self, prefix: &str, decl: &CssDeclaration) {
        let name = if prefix.is_empty() { decl.name.clone() } else { format!("{prefix}-{}", decl.name) };
        if let Some(v) = &decl.value {
            self.flush_pending_semicolon();
            self.write_indent();
            self.mark(&decl.span);
            self.write(&name);
            self.write(if self.compressed() { ":" } else { ": " });
            let mut text = String::new();
            value::write_value(&mut text, v, self.compressed());
            self.write(&text);
            if self.compressed() {
                self.pending_semicolon = true;
            } else {
                self.write(";");
            }
            self.newline();
        }
        for child in &decl.children {
            if let CssNode::Declaration(child_decl) = child {
                self.print_declaration(&name, child_decl);
            }
        }
    }

    fn print_import(&mut self, import: &crate::css::CssImport) {
        self.flush_pending_semicolon();
        self.write_indent();
        self.mark(&import.span);
        self.write("@import ");
        self.write(&import.url);
        if self.compressed() {
            self.pending_semicolon = true;
        } else {
            self.write(";");
        }
        self.newline();
    }

    fn print_comment(&mut self, comment: &CssComment) {
        if self.compressed() {
            return;
        }
        self.flush_pending_semicolon();
        self.write_indent();
        self.mark(&comment.span);
        self.write(&comment.text);
        self.write("\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use crate::selector::{CompoundSelector, SimpleSelector};
    use crate::selector::{ComplexSelector, SelectorList};
    use crate::value::SassNumber;
    use std::sync::Arc;
    use url::Url;

    fn span() -> Span {
        let source = Arc::new(SourceFile::new(Url::parse("file:///t.scss").unwrap(), "a { b: 1px; }"));
        Span::new(source, 0, 1)
    }

    fn sample_rule() -> CssNode {
        let selector = SelectorList::single(ComplexSelector::single(CompoundSelector {
            simple_selectors: vec![SimpleSelector::Class("a".to_string())],
        }));
        CssNode::StyleRule(CssStyleRule {
            selector,
            children: vec![CssNode::Declaration(CssDeclaration {
                name: "color".to_string(),
                value: Some(crate::value::Value::Number(SassNumber::new(0.0))),
                children: Vec::new(),
                span: span(),
            })],
            media_context: None,
            span: span(),
        })
    }

    #[test]
    fn expanded_style_indents_and_keeps_zero_unit() {
        let (css, _) = serialize(&[sample_rule()], OutputStyle::Expanded, false, false);
        assert_eq!(css, ".a {\n  color: 0;\n}\n");
    }

    #[test]
    fn compressed_style_has_no_whitespace() {
        let (css, _) = serialize(&[sample_rule()], OutputStyle::Compressed, false, false);
        assert_eq!(css, ".a{color:0}");
    }

    #[test]
    fn empty_style_rule_is_dropped() {
        let selector = SelectorList::single(ComplexSelector::single(CompoundSelector {
            simple_selectors: vec![SimpleSelector::Class("empty".to_string())],
        }));
        let node = CssNode::StyleRule(CssStyleRule { selector, children: Vec::new(), media_context: None, span: span() });
        let (css, _) = serialize(&[node], OutputStyle::Expanded, false, false);
        assert_eq!(css, "");
    }
}
