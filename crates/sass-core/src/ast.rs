//! The Sass abstract syntax tree produced by the parser and consumed by
//! the evaluator.
//!
//! Mirrors the teacher's CSS AST shape (a tree of statement nodes, each
//! carrying a span) generalized with Sass's extra statement and
//! expression variants: variables, control flow, mixins/functions,
//! interpolation. Every node that can anchor a diagnostic or a source-map
//! segment carries a [`Span`].

use std::rc::Rc;

use crate::error::Span;
use crate::value::number::SassNumber;
use crate::value::ListSeparator;

/// A parsed stylesheet: an ordered list of top-level statements plus the
/// syntax it was parsed with (affects nothing at evaluation time beyond
/// having already been resolved into this same tree shape).
#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// One fragment of an interpolated piece of text: either literal source
/// text or an expression hole (`#{...}`).
#[derive(Debug, Clone)]
pub enum InterpolationPart {
    Literal(String),
    Expr(Expression),
}

/// A sequence alternating string fragments and expression holes. "Plain"
/// (per the specification's glossary) when it has no holes at all.
#[derive(Debug, Clone, Default)]
pub struct Interpolation {
    pub parts: Vec<InterpolationPart>,
    pub span: Option<Span>,
}

impl Interpolation {
    #[must_use]
    pub fn plain(text: impl Into<String>, span: Span) -> Self {
        Self {
            parts: vec![InterpolationPart::Literal(text.into())],
            span: Some(span),
        }
    }

    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, InterpolationPart::Literal(_)))
    }

    /// The concatenated literal text, valid only when [`is_plain`] holds.
    #[must_use]
    pub fn as_plain_text(&self) -> Option<String> {
        self.is_plain().then(|| {
            self.parts
                .iter()
                .map(|p| match p {
                    InterpolationPart::Literal(s) => s.as_str(),
                    InterpolationPart::Expr(_) => unreachable!("checked by is_plain"),
                })
                .collect()
        })
    }
}

/// An argument passed positionally or by name in a call or `@include`.
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expression,
    /// `...` spread/rest marker, e.g. `@include foo($args...)`.
    pub is_rest: bool,
}

/// The argument list of a call or `@include`/`@mixin`/`@function` header.
#[derive(Debug, Clone)]
pub struct ArgumentInvocation {
    pub positional: Vec<Argument>,
    pub span: Span,
}

/// One formal parameter in a `@mixin`/`@function` signature:
/// `$name: default` or `$name...`.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Expression>,
    pub is_rest: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterList {
    pub params: Vec<Parameter>,
}

/// An expression, as parsed by the precedence climber in §4.1.
#[derive(Debug, Clone)]
pub enum Expression {
    Number {
        number: SassNumber,
        span: Span,
    },
    Color {
        hex_or_name: String,
        span: Span,
    },
    String {
        text: Interpolation,
        quoted: bool,
        span: Span,
    },
    Boolean(bool),
    Null,
    Interpolation(Interpolation),
    Variable {
        name: String,
        namespace: Option<String>,
        span: Span,
    },
    FunctionRef {
        name: String,
        namespace: Option<String>,
        span: Span,
    },
    Call {
        name: String,
        namespace: Option<String>,
        args: ArgumentInvocation,
        span: Span,
    },
    /// `if(cond, if_true, if_false)` — parsed as a dedicated node because
    /// it lazily evaluates its branches, unlike an ordinary function call.
    If {
        condition: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
        span: Span,
    },
    List {
        elements: Vec<Expression>,
        separator: ListSeparator,
        bracketed: bool,
        span: Span,
    },
    Map {
        entries: Vec<(Expression, Expression)>,
        span: Span,
    },
    Paren(Box<Expression>),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        /// Set when the parser saw two numeric literals on either side of
        /// `/`: the evaluator decides at run time whether this means
        /// division or slash-separation, per §4.1/§4.2.
        maybe_slash: bool,
        span: Span,
    },
    /// `&` — refers to the current parent selector stack.
    ParentSelector(Span),
    /// A first-class selector produced by `selector.nest` etc. is just a
    /// string at the AST level; this variant exists for completeness of
    /// the `&` expression described in §3.1 and is otherwise unused.
    Supports(Box<SupportsCondition>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    /// Slash as a unary, e.g. leading-slash division context markers; kept
    /// distinct from [`BinaryOp::Div`] per §4.2's note that unary and
    /// binary `-`/`/` are resolved by the parser, not the evaluator.
    Slash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// A parsed `@supports` condition tree (`(feature: value)`, `not (...)`,
/// `... and ...`, `... or ...`, and a declaration check).
#[derive(Debug, Clone)]
pub enum SupportsCondition {
    Declaration { name: Interpolation, value: Interpolation },
    Negation(Box<SupportsCondition>),
    Operation {
        left: Box<SupportsCondition>,
        op: SupportsOp,
        right: Box<SupportsCondition>,
    },
    Interpolation(Interpolation),
    Raw(Interpolation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportsOp {
    And,
    Or,
}

/// One `(feature: #{$x})`-style condition or bare type/modifier token
/// within a media query.
#[derive(Debug, Clone)]
pub struct MediaFeature {
    pub name: Interpolation,
    pub value: Option<Interpolation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaModifier {
    Not,
    Only,
}

/// One comma-separated entry of a `@media` prelude.
#[derive(Debug, Clone, Default)]
pub struct MediaQuery {
    pub modifier: Option<MediaModifier>,
    pub media_type: Option<Interpolation>,
    pub features: Vec<MediaFeature>,
}

#[derive(Debug, Clone, Default)]
pub struct MediaQueryList {
    pub queries: Vec<MediaQuery>,
}

/// The `(with: ...)`/`(without: ...)` clause of `@at-root`.
#[derive(Debug, Clone)]
pub enum AtRootQuery {
    /// No query: the default `@at-root`, equivalent to `(without: rule)`.
    Default,
    With(Vec<String>),
    Without(Vec<String>),
}

/// What an `@each` loop destructures its iteration value into.
#[derive(Debug, Clone)]
pub struct EachVars {
    pub names: Vec<String>,
}

/// One `@if`/`@else if`/`@else` arm.
#[derive(Debug, Clone)]
pub struct IfClause {
    /// `None` for a plain trailing `@else`.
    pub condition: Option<Expression>,
    pub body: Vec<Statement>,
}

/// A top-level or nested statement, per §3.1.
#[derive(Debug, Clone)]
pub enum Statement {
    VariableDecl {
        name: String,
        namespace: Option<String>,
        value: Expression,
        is_default: bool,
        is_global: bool,
        span: Span,
    },
    StyleRule {
        selector: Interpolation,
        body: Vec<Statement>,
        span: Span,
    },
    Declaration {
        name: Interpolation,
        /// Present unless this declaration exists only to hold nested
        /// declarations (`font: { size: 1em }`).
        value: Option<Expression>,
        body: Vec<Statement>,
        span: Span,
    },
    /// A `--custom-property` declaration, whose value is a raw token
    /// stream rather than a parsed expression (§4.1 "custom properties").
    CustomProperty {
        name: Interpolation,
        value: Interpolation,
        span: Span,
    },
    If {
        clauses: Vec<IfClause>,
        span: Span,
    },
    Each {
        vars: EachVars,
        list: Expression,
        body: Vec<Statement>,
        span: Span,
    },
    For {
        variable: String,
        from: Expression,
        to: Expression,
        inclusive: bool,
        body: Vec<Statement>,
        span: Span,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
        span: Span,
    },
    Return {
        value: Expression,
        span: Span,
    },
    Warn {
        value: Expression,
        span: Span,
    },
    Debug {
        value: Expression,
        span: Span,
    },
    Error {
        value: Expression,
        span: Span,
    },
    AtRoot {
        query: AtRootQuery,
        body: Vec<Statement>,
        span: Span,
    },
    Extend {
        selector: Interpolation,
        is_optional: bool,
        span: Span,
    },
    Use {
        url: String,
        namespace: Option<UseNamespace>,
        configuration: Vec<(String, Expression)>,
        span: Span,
    },
    Forward {
        url: String,
        prefix: Option<String>,
        visibility: ForwardVisibility,
        configuration: Vec<(String, Expression)>,
        span: Span,
    },
    Import {
        /// One `@import` rule can comma-list several targets.
        targets: Vec<ImportTarget>,
        span: Span,
    },
    Include {
        name: String,
        namespace: Option<String>,
        args: ArgumentInvocation,
        content_params: Option<ParameterList>,
        content: Option<Rc<Vec<Statement>>>,
        span: Span,
    },
    Function {
        name: String,
        params: ParameterList,
        body: Vec<Statement>,
        span: Span,
    },
    Mixin {
        name: String,
        params: ParameterList,
        body: Vec<Statement>,
        accepts_content: bool,
        span: Span,
    },
    Content {
        args: ArgumentInvocation,
        span: Span,
    },
    Media {
        query: Interpolation,
        body: Vec<Statement>,
        span: Span,
    },
    Supports {
        condition: SupportsCondition,
        body: Vec<Statement>,
        span: Span,
    },
    Keyframes {
        name: Interpolation,
        vendor_prefix: Option<String>,
        body: Vec<KeyframeBlock>,
        span: Span,
    },
    /// An at-rule the parser doesn't special-case (`@font-face`, `@page`,
    /// vendor-specific rules, ...): prelude kept as raw interpolation, body
    /// either a nested statement list or absent (bare `;`-terminated).
    UnknownAtRule {
        name: String,
        prelude: Interpolation,
        body: Option<Vec<Statement>>,
        span: Span,
    },
    LoudComment {
        text: String,
        span: Span,
    },
    SilentComment {
        text: String,
        span: Span,
    },
}

#[derive(Debug, Clone)]
pub struct KeyframeBlock {
    /// Raw selector text: `from`, `to`, or a percentage, comma-separated.
    pub selectors: Vec<String>,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum UseNamespace {
    Named(String),
    /// `as *` — members are merged into the using module's global
    /// namespace rather than prefixed.
    Star,
}

#[derive(Debug, Clone)]
pub enum ForwardVisibility {
    All,
    /// `show a, b` — only the listed names are forwarded.
    Show(Vec<String>),
    /// `hide a, b` — everything except the listed names is forwarded.
    Hide(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct ImportTarget {
    pub url: String,
    pub span: Span,
}
