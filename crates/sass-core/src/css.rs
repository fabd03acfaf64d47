//! The CSS tree: what the evaluator produces and the `@extend` engine and
//! serializer consume.
//!
//! Mirrors the Sass AST's shape (§3.4) but with every Sass-only construct
//! already resolved: selectors are [`SelectorList`]s instead of
//! interpolation, declaration values are [`Value`]s instead of
//! expressions, and style rules never nest — nesting was flattened during
//! evaluation by pushing/popping the parent-selector stack.

use std::rc::Rc;

use crate::error::Span;
use crate::selector::SelectorList;
use crate::value::Value;

/// A fully evaluated stylesheet: a flat list of top-level nodes in source
/// order, ready for `@extend` application and serialization.
#[derive(Debug, Clone, Default)]
pub struct CssStylesheet {
    pub nodes: Vec<CssNode>,
}

/// One node of the CSS tree. `StyleRule` bodies contain only
/// declarations, comments, and nested at-rules — never another style
/// rule, since nesting is flattened by the time the evaluator emits a
/// node.
#[derive(Debug, Clone)]
pub enum CssNode {
    StyleRule(CssStyleRule),
    Media(CssAtRule),
    Supports(CssAtRule),
    Keyframes(CssKeyframes),
    UnknownAtRule(CssAtRule),
    Declaration(CssDeclaration),
    Import(CssImport),
    Comment(CssComment),
}

#[derive(Debug, Clone)]
pub struct CssStyleRule {
    pub selector: SelectorList,
    pub children: Vec<CssNode>,
    /// Identity of the innermost `@media`/`@supports` ancestor this rule
    /// was evaluated under, or `None` at the stylesheet root — used by
    /// the `@extend` engine to enforce the media-boundary rule (§4.3).
    pub media_context: Option<u32>,
    pub span: Span,
}

/// `@media` / `@supports` / an unrecognized at-rule, all sharing the same
/// shape: a resolved prelude string and a nested child list.
#[derive(Debug, Clone)]
pub struct CssAtRule {
    pub name: String,
    pub prelude: String,
    pub children: Vec<CssNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CssKeyframes {
    pub name: String,
    pub vendor_prefix: Option<String>,
    pub blocks: Vec<CssKeyframeBlock>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CssKeyframeBlock {
    pub selectors: Vec<String>,
    pub children: Vec<CssNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CssDeclaration {
    pub name: String,
    pub value: Option<Value>,
    /// Nested declarations, e.g. `font: { size: 1em }` resolves to
    /// `font-size: 1em`; kept structured until serialization so the
    /// dash-joining happens in one place.
    pub children: Vec<CssNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CssImport {
    pub url: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CssComment {
    pub text: String,
    pub span: Span,
}

/// A shared handle to a node list that the evaluator appends into as it
/// walks the tree — style rule bodies, at-rule bodies, and the
/// stylesheet root are all built this way so nested statements can push
/// directly into their nearest CSS-emitting ancestor.
pub type NodeSink = Rc<std::cell::RefCell<Vec<CssNode>>>;

#[must_use]
pub fn new_sink() -> NodeSink {
    Rc::new(std::cell::RefCell::new(Vec::new()))
}
