//! The tree-walking evaluator: turns a parsed [`Stylesheet`](crate::ast::Stylesheet)
//! into a [`CssStylesheet`](crate::css::CssStylesheet), resolving variables,
//! control flow, mixins, functions, modules, and `@extend` registrations
//! along the way.
//!
//! Where the teacher's cascade module walks a DOM tree matching selectors
//! against elements, this module walks a syntax tree evaluating
//! expressions against a lexical scope chain — the shared shape is the
//! "stack of frames, emit into the nearest sink" pattern, generalized here
//! from one sink (the computed style map) to many (nested rule bodies,
//! at-rule bodies, keyframe blocks).

pub mod builtins;
pub mod scope;

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use url::Url;

use crate::ast::{
    ArgumentInvocation, AtRootQuery, BinaryOp as AstBinaryOp, EachVars, Expression, ForwardVisibility,
    IfClause, ImportTarget, InterpolationPart, Parameter, ParameterList, Statement, Stylesheet,
    SupportsCondition, UnaryOp, UseNamespace,
};
use crate::ast::Interpolation;
use crate::css::{
    new_sink, CssAtRule, CssComment, CssDeclaration, CssImport, CssKeyframeBlock, CssKeyframes, CssNode,
    CssStyleRule, NodeSink,
};
use crate::diagnostics::{Deprecation, Logger};
use crate::error::{SassError, SassResult, SourceFile, Span, StackFrame};
use crate::importer::Importer;
use crate::parser::{parse_media_query_list, parse_stylesheet, Syntax};
use crate::selector::extend::{ExtendEngine, Extension};
use crate::selector::nest::nest_within;
use crate::selector::parse_selector_list;
use crate::selector::{SelectorList, SimpleSelector};
use crate::value::color::SassColor;
use crate::value::{ListSeparator, SassFunction, SassMap, SassString, Value};

use scope::{ContentBlock, FunctionDef, MixinDef, Scope};

/// What kind of CSS-emitting context a [`Frame`] represents, used to
/// decide what `@at-root` strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Rule,
    Media,
    Supports,
    Other,
}

/// One entry of the evaluator's context stack: where CSS nodes currently
/// emitted land, what the enclosing selector is (for `&`), and which
/// at-rule nesting context is active (for the `@extend` media boundary).
#[derive(Debug, Clone)]
struct Frame {
    sink: NodeSink,
    selector: Option<SelectorList>,
    media: Option<u32>,
    kind: FrameKind,
}

/// A loaded `@use`/`@forward` target: its public scope plus the CSS nodes
/// it produced, evaluated once and cached by canonical URL.
struct LoadedModule {
    scope: Scope,
    nodes: Vec<CssNode>,
}

/// A host-provided callable registered through [`crate::CompileOptions`]
/// (§6 "User function interface"): a name, a Sass-form parameter-list
/// signature, and a handler that receives already-evaluated arguments.
///
/// The handler is plain `Fn`, not `Fn + Send + Sync`: per §5, a
/// compilation is single-threaded and never shared across concurrent
/// compiles, so there is nothing to synchronize.
pub struct UserFunction {
    /// The bare function name, as called from Sass (no namespace).
    pub name: String,
    /// Parameter list in Sass form, e.g. `"$a, $b: 1px, $rest..."`
    /// (parentheses optional).
    pub signature: String,
    /// Invoked with arguments already bound against `signature`, in
    /// parameter order. Returns an error message (not a [`SassError`])
    /// so host code doesn't need to depend on this crate's span types.
    pub handler: Rc<dyn Fn(&[Value]) -> Result<Value, String>>,
}

impl UserFunction {
    /// Build a user function from a name, a signature, and a handler
    /// closure.
    pub fn new(
        name: impl Into<String>,
        signature: impl Into<String>,
        handler: impl Fn(&[Value]) -> Result<Value, String> + 'static,
    ) -> Self {
        Self { name: name.into(), signature: signature.into(), handler: Rc::new(handler) }
    }
}

/// A [`UserFunction`] with its signature already parsed into a
/// [`ParameterList`], so binding a call against it doesn't re-parse the
/// signature text on every invocation.
struct CompiledHostFunction {
    params: ParameterList,
    handler: Rc<dyn Fn(&[Value]) -> Result<Value, String>>,
}

/// Parse every `functions` entry's signature once up front. A malformed
/// signature is a configuration error, reported as a parse error
/// attributed to a synthetic `data:` span since it has no real source
/// file of its own.
pub fn compile_host_functions(functions: &[UserFunction]) -> SassResult<HashMap<String, Rc<CompiledHostFunction>>> {
    let mut out = HashMap::new();
    for func in functions {
        let text = format!("({})", func.signature);
        let source = Arc::new(SourceFile::new(url::Url::parse("data:,").unwrap(), text));
        let mut parser = crate::parser::Parser::new(&source, Syntax::Scss);
        let params = parser.parse_parameter_list().map_err(|e| {
            SassError::runtime(format!("Invalid signature for function \"{}\": {e}", func.name), Span::new(source.clone(), 0, 0))
        })?;
        out.insert(func.name.clone(), Rc::new(CompiledHostFunction { params, handler: func.handler.clone() }));
    }
    Ok(out)
}

/// Whether a block finished normally or hit `@return`. Propagated upward
/// through `@if`/`@each`/`@for`/`@while` bodies until it reaches the
/// `@function` call that can actually use it.
enum Flow {
    Normal,
    Return(Value),
}

/// Drives evaluation of one compile: holds the module cache, the
/// `@extend` registrations (one engine per compile, shared across every
/// module — extensions are global regardless of which file registered
/// them), and the context stack described by [`Frame`].
pub struct Evaluator<'a> {
    importer: &'a dyn Importer,
    logger: &'a dyn Logger,
    extend_engine: ExtendEngine,
    modules: HashMap<String, Scope>,
    module_cache: HashMap<Url, Rc<LoadedModule>>,
    load_stack: Vec<Url>,
    content_stack: Vec<Option<ContentBlock>>,
    call_trace: Vec<StackFrame>,
    frames: Vec<Frame>,
    next_media_id: Cell<u32>,
    host_functions: HashMap<String, Rc<CompiledHostFunction>>,
    quiet_deps: bool,
    /// Whether the stylesheet currently being evaluated is a "dependency"
    /// for `quiet_deps` purposes (§6): one entry per active load-stack
    /// frame, `true` once a `@use`/`@forward`/`@import` has had to leave
    /// relative resolution (a load path or another importer), and
    /// inherited by everything loaded transitively from there.
    dependency_stack: Vec<bool>,
}

impl<'a> Evaluator<'a> {
    #[must_use]
    pub fn new(importer: &'a dyn Importer, logger: &'a dyn Logger) -> Self {
        Self::with_host_functions(importer, logger, HashMap::new())
    }

    /// Like [`Evaluator::new`], additionally registering host-provided
    /// functions compiled by [`compile_host_functions`] (§6 `functions`).
    #[must_use]
    pub fn with_host_functions(
        importer: &'a dyn Importer,
        logger: &'a dyn Logger,
        host_functions: HashMap<String, Rc<CompiledHostFunction>>,
    ) -> Self {
        Self {
            importer,
            logger,
            extend_engine: ExtendEngine::new(),
            modules: HashMap::new(),
            module_cache: HashMap::new(),
            load_stack: Vec::new(),
            content_stack: Vec::new(),
            call_trace: Vec::new(),
            frames: Vec::new(),
            next_media_id: Cell::new(0),
            host_functions,
            quiet_deps: false,
            dependency_stack: Vec::new(),
        }
    }

    /// Suppress `@warn`/`@debug` output from stylesheets loaded as
    /// dependencies rather than relative to the entrypoint (§6
    /// `quiet_deps`).
    #[must_use]
    pub fn quiet_deps(mut self, quiet_deps: bool) -> Self {
        self.quiet_deps = quiet_deps;
        self
    }

    /// Evaluate a fully parsed entry-point stylesheet, returning its CSS
    /// nodes and the `@extend` engine that must be applied to every style
    /// rule afterward.
    pub fn run(mut self, stylesheet: &Stylesheet, url: Url) -> SassResult<(Vec<CssNode>, ExtendEngine)> {
        self.load_stack.push(url);
        self.dependency_stack.push(false);
        let root_sink = new_sink();
        self.frames.push(Frame {
            sink: Rc::clone(&root_sink),
            selector: None,
            media: None,
            kind: FrameKind::Root,
        });
        let scope = Scope::root();
        self.eval_statements(&stylesheet.statements, &scope)?;
        self.frames.pop();
        self.dependency_stack.pop();
        let nodes = take_sink(root_sink);
        Ok((nodes, self.extend_engine))
    }

    /// Whether the stylesheet currently at the top of the load stack is a
    /// dependency, for `quiet_deps` purposes.
    fn in_dependency(&self) -> bool {
        self.dependency_stack.last().copied().unwrap_or(false)
    }

    fn current_frame(&self) -> &Frame {
        self.frames.last().expect("at least the root frame is always present")
    }

    fn emit(&self, node: CssNode) {
        self.current_frame().sink.borrow_mut().push(node);
    }

    fn current_selector(&self) -> Option<SelectorList> {
        self.current_frame().selector.clone()
    }

    fn current_media(&self) -> Option<u32> {
        self.current_frame().media
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    fn eval_statements(&mut self, statements: &[Statement], scope: &Scope) -> SassResult<Flow> {
        for statement in statements {
            match self.eval_statement(statement, scope)? {
                Flow::Normal => {}
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_statement(&mut self, statement: &Statement, scope: &Scope) -> SassResult<Flow> {
        match statement {
            Statement::VariableDecl { name, namespace, value, is_default, is_global, span } => {
                if namespace.is_some() {
                    return Err(SassError::runtime(
                        "Cannot modify variables in other modules.",
                        span.clone(),
                    ));
                }
                let evaluated = self.eval_expression(value, scope)?;
                if *is_global {
                    scope.set_global(name, evaluated);
                } else if *is_default {
                    scope.set_default(name, evaluated);
                } else {
                    scope.set_variable(name, evaluated);
                }
                Ok(Flow::Normal)
            }
            Statement::StyleRule { selector, body, span } => {
                let text = self.eval_interpolation(selector, scope)?;
                let parsed = parse_selector_list(&text, span)?;
                let outer = self.current_selector();
                let resolved = nest_within(outer.as_ref(), &parsed, span)?;
                let media = self.current_media();
                let sink = new_sink();
                self.frames.push(Frame {
                    sink: Rc::clone(&sink),
                    selector: Some(resolved.clone()),
                    media,
                    kind: FrameKind::Rule,
                });
                let flow = self.eval_statements(body, &scope.child());
                self.frames.pop();
                let flow = flow?;
                self.emit(CssNode::StyleRule(CssStyleRule {
                    selector: resolved,
                    children: take_sink(sink),
                    media_context: media,
                    span: span.clone(),
                }));
                Ok(flow)
            }
            Statement::Declaration { name, value, body, span } => {
                let name_text = self.eval_interpolation(name, scope)?;
                let mut value_out = match value {
                    Some(expr) => Some(self.eval_expression(expr, scope)?),
                    None => None,
                };
                if matches!(value_out, Some(Value::Null)) {
                    value_out = None;
                }
                let children = if body.is_empty() {
                    Vec::new()
                } else {
                    let sink = new_sink();
                    self.frames.push(Frame {
                        sink: Rc::clone(&sink),
                        selector: self.current_selector(),
                        media: self.current_media(),
                        kind: FrameKind::Other,
                    });
                    let flow = self.eval_statements(body, &scope.child());
                    self.frames.pop();
                    flow?;
                    take_sink(sink)
                };
                if value_out.is_some() || !children.is_empty() {
                    self.emit(CssNode::Declaration(CssDeclaration {
                        name: name_text,
                        value: value_out,
                        children,
                        span: span.clone(),
                    }));
                }
                Ok(Flow::Normal)
            }
            Statement::CustomProperty { name, value, span } => {
                let name_text = self.eval_interpolation(name, scope)?;
                let value_text = self.eval_interpolation(value, scope)?;
                self.emit(CssNode::Declaration(CssDeclaration {
                    name: name_text,
                    value: Some(Value::unquoted_string(value_text)),
                    children: Vec::new(),
                    span: span.clone(),
                }));
                Ok(Flow::Normal)
            }
            Statement::If { clauses, .. } => self.eval_if(clauses, scope),
            Statement::Each { vars, list, body, .. } => self.eval_each(vars, list, body, scope),
            Statement::For { variable, from, to, inclusive, body, span } => {
                self.eval_for(variable, from, to, *inclusive, body, span, scope)
            }
            Statement::While { condition, body, span } => self.eval_while(condition, body, span, scope),
            Statement::Return { value, .. } => {
                let v = self.eval_expression(value, scope)?;
                Ok(Flow::Return(v))
            }
            Statement::Warn { value, span } => {
                let v = self.eval_expression(value, scope)?;
                if !(self.quiet_deps && self.in_dependency()) {
                    self.logger.warn(&v.to_string(), Some(span), &self.call_trace);
                }
                Ok(Flow::Normal)
            }
            Statement::Debug { value, span } => {
                let v = self.eval_expression(value, scope)?;
                if !(self.quiet_deps && self.in_dependency()) {
                    self.logger.debug(&v.to_string(), span);
                }
                Ok(Flow::Normal)
            }
            Statement::Error { value, span } => {
                let v = self.eval_expression(value, scope)?;
                Err(SassError::runtime(v.to_string(), span.clone()))
            }
            Statement::AtRoot { query, body, span } => self.eval_at_root(query, body, span, scope),
            Statement::Extend { selector, is_optional, span } => {
                self.eval_extend(selector, *is_optional, span, scope)
            }
            Statement::Use { url, namespace, configuration, span } => {
                self.eval_use(url, namespace.as_ref(), configuration, span, scope)
            }
            Statement::Forward { url, prefix, visibility, configuration, span } => {
                self.eval_forward(url, prefix.as_deref(), visibility, configuration, span, scope)
            }
            Statement::Import { targets, .. } => {
                for target in targets {
                    self.eval_import(target, scope)?;
                }
                Ok(Flow::Normal)
            }
            Statement::Include { name, namespace, args, content_params, content, span } => {
                self.eval_include(name, namespace.as_deref(), args, content_params.as_ref(), content.clone(), span, scope)
            }
            Statement::Function { name, params, body, .. } => {
                scope.declare_function(FunctionDef {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                    closure: scope.clone(),
                });
                Ok(Flow::Normal)
            }
            Statement::Mixin { name, params, body, accepts_content, .. } => {
                scope.declare_mixin(MixinDef {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::new(body.clone()),
                    accepts_content: *accepts_content,
                    closure: scope.clone(),
                });
                Ok(Flow::Normal)
            }
            Statement::Content { args, span } => self.eval_content(args, span, scope),
            Statement::Media { query, body, span } => self.eval_media(query, body, span, scope),
            Statement::Supports { condition, body, span } => self.eval_supports(condition, body, span, scope),
            Statement::Keyframes { name, vendor_prefix, body, span } => {
                self.eval_keyframes(name, vendor_prefix.as_deref(), body, span, scope)
            }
            Statement::UnknownAtRule { name, prelude, body, span } => {
                let prelude_text = self.eval_interpolation(prelude, scope)?;
                let children = match body {
                    Some(stmts) => {
                        let sink = new_sink();
                        self.frames.push(Frame {
                            sink: Rc::clone(&sink),
                            selector: self.current_selector(),
                            media: self.current_media(),
                            kind: FrameKind::Other,
                        });
                        let flow = self.eval_statements(stmts, &scope.child());
                        self.frames.pop();
                        flow?;
                        take_sink(sink)
                    }
                    None => Vec::new(),
                };
                self.emit(CssNode::UnknownAtRule(CssAtRule {
                    name: name.clone(),
                    prelude: prelude_text,
                    children,
                    span: span.clone(),
                }));
                Ok(Flow::Normal)
            }
            Statement::LoudComment { text, span } => {
                self.emit(CssNode::Comment(CssComment { text: text.clone(), span: span.clone() }));
                Ok(Flow::Normal)
            }
            Statement::SilentComment { .. } => Ok(Flow::Normal),
        }
    }

    fn eval_if(&mut self, clauses: &[IfClause], scope: &Scope) -> SassResult<Flow> {
        for clause in clauses {
            let matched = match &clause.condition {
                Some(cond) => self.eval_expression(cond, scope)?.is_truthy(),
                None => true,
            };
            if matched {
                return self.eval_statements(&clause.body, &scope.child());
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_each(&mut self, vars: &EachVars, list: &Expression, body: &[Statement], scope: &Scope) -> SassResult<Flow> {
        let list_value = self.eval_expression(list, scope)?;
        for element in list_value.as_list_elements() {
            let iter_scope = scope.child();
            bind_each_vars(vars, &element, &iter_scope);
            match self.eval_statements(body, &iter_scope)? {
                Flow::Normal => {}
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_for(
        &mut self,
        variable: &str,
        from: &Expression,
        to: &Expression,
        inclusive: bool,
        body: &[Statement],
        span: &Span,
        scope: &Scope,
    ) -> SassResult<Flow> {
        let from_v = self.eval_expression(from, scope)?;
        let to_v = self.eval_expression(to, scope)?;
        let (Value::Number(from_n), Value::Number(to_n)) = (&from_v, &to_v) else {
            return Err(SassError::runtime("@for bounds must be numbers.", span.clone()));
        };
        let start = from_n.assert_int(span)?;
        let end = to_n.assert_int(span)?;
        let range: Box<dyn Iterator<Item = i64>> = if start <= end {
            let end = if inclusive { end } else { end - 1 };
            Box::new(start..=end)
        } else {
            let end = if inclusive { end } else { end + 1 };
            Box::new((end..=start).rev())
        };
        for i in range {
            let iter_scope = scope.child();
            iter_scope.declare_local(variable, Value::Number(crate::value::number::SassNumber::new(i as f64)));
            match self.eval_statements(body, &iter_scope)? {
                Flow::Normal => {}
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_while(&mut self, condition: &Expression, body: &[Statement], span: &Span, scope: &Scope) -> SassResult<Flow> {
        const MAX_ITERATIONS: usize = 500_000;
        let mut iterations = 0;
        loop {
            if !self.eval_expression(condition, scope)?.is_truthy() {
                return Ok(Flow::Normal);
            }
            iterations += 1;
            if iterations > MAX_ITERATIONS {
                return Err(SassError::runtime(
                    "@while loop exceeded the maximum iteration count.",
                    span.clone(),
                ));
            }
            match self.eval_statements(body, &scope.child())? {
                Flow::Normal => {}
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
    }

    fn eval_at_root(&mut self, query: &AtRootQuery, body: &[Statement], span: &Span, scope: &Scope) -> SassResult<Flow> {
        let (strip_rule, strip_container) = match query {
            AtRootQuery::Default => (true, false),
            AtRootQuery::With(names) => {
                let names: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
                let all = names.iter().any(|n| n == "all");
                (
                    !(all || names.iter().any(|n| n == "rule")),
                    !(all || names.iter().any(|n| n == "media" || n == "supports")),
                )
            }
            AtRootQuery::Without(names) => {
                let names: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
                let all = names.iter().any(|n| n == "all");
                (
                    all || names.iter().any(|n| n == "rule"),
                    all || names.iter().any(|n| n == "media" || n == "supports"),
                )
            }
        };
        let stripped = |f: &Frame| {
            (strip_rule && f.kind == FrameKind::Rule) || (strip_container && matches!(f.kind, FrameKind::Media | FrameKind::Supports))
        };
        let target_idx = self.frames.iter().rposition(|f| !stripped(f)).unwrap_or(0);
        let target = self.frames[target_idx].clone();
        let _ = span;
        self.frames.push(target);
        let flow = self.eval_statements(body, &scope.child());
        self.frames.pop();
        flow
    }

    fn eval_extend(&mut self, selector: &Interpolation, is_optional: bool, span: &Span, scope: &Scope) -> SassResult<Flow> {
        let text = self.eval_interpolation(selector, scope)?;
        let parsed = parse_selector_list(&text, span)?;
        let Some(current) = self.current_selector() else {
            return Err(SassError::extend("@extend may only be used within a style rule.", span.clone()));
        };
        let media_context = self.current_media();
        for target_complex in &parsed.complexes {
            let Some(compound) = target_complex.subject() else { continue };
            if target_complex.components.len() != 1 {
                return Err(SassError::extend(
                    "complex selectors may not be extended.",
                    span.clone(),
                ));
            }
            for simple in &compound.simple_selectors {
                if matches!(simple, SimpleSelector::Parent) {
                    continue;
                }
                for extender in &current.complexes {
                    self.extend_engine.register(Extension {
                        extender: extender.clone(),
                        target: simple.clone(),
                        span: span.clone(),
                        media_context,
                        optional: is_optional,
                    });
                }
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_media(&mut self, query: &Interpolation, body: &[Statement], span: &Span, scope: &Scope) -> SassResult<Flow> {
        let text = self.eval_interpolation(query, scope)?;
        let _ = parse_media_query_list(&text, span)?;
        let id = self.next_media_id.get();
        self.next_media_id.set(id + 1);
        let sink = new_sink();
        self.frames.push(Frame {
            sink: Rc::clone(&sink),
            selector: self.current_selector(),
            media: Some(id),
            kind: FrameKind::Media,
        });
        let flow = self.eval_statements(body, &scope.child());
        self.frames.pop();
        flow?;
        self.emit(CssNode::Media(CssAtRule {
            name: "media".to_string(),
            prelude: text,
            children: take_sink(sink),
            span: span.clone(),
        }));
        Ok(Flow::Normal)
    }

    fn eval_supports(&mut self, condition: &SupportsCondition, body: &[Statement], span: &Span, scope: &Scope) -> SassResult<Flow> {
        let text = self.eval_supports_condition(condition, scope)?;
        let id = self.next_media_id.get();
        self.next_media_id.set(id + 1);
        let sink = new_sink();
        self.frames.push(Frame {
            sink: Rc::clone(&sink),
            selector: self.current_selector(),
            media: Some(id),
            kind: FrameKind::Supports,
        });
        let flow = self.eval_statements(body, &scope.child());
        self.frames.pop();
        flow?;
        self.emit(CssNode::Supports(CssAtRule {
            name: "supports".to_string(),
            prelude: text,
            children: take_sink(sink),
            span: span.clone(),
        }));
        Ok(Flow::Normal)
    }

    fn eval_supports_condition(&mut self, condition: &SupportsCondition, scope: &Scope) -> SassResult<String> {
        Ok(match condition {
            SupportsCondition::Declaration { name, value } => {
                format!("({}: {})", self.eval_interpolation(name, scope)?, self.eval_interpolation(value, scope)?)
            }
            SupportsCondition::Negation(inner) => format!("not ({})", self.eval_supports_condition(inner, scope)?),
            SupportsCondition::Operation { left, op, right } => {
                let joiner = match op {
                    crate::ast::SupportsOp::And => "and",
                    crate::ast::SupportsOp::Or => "or",
                };
                format!(
                    "{} {joiner} {}",
                    self.eval_supports_condition(left, scope)?,
                    self.eval_supports_condition(right, scope)?
                )
            }
            SupportsCondition::Interpolation(text) | SupportsCondition::Raw(text) => self.eval_interpolation(text, scope)?,
        })
    }

    fn eval_keyframes(
        &mut self,
        name: &Interpolation,
        vendor_prefix: Option<&str>,
        body: &[crate::ast::KeyframeBlock],
        span: &Span,
        scope: &Scope,
    ) -> SassResult<Flow> {
        let name_text = self.eval_interpolation(name, scope)?;
        let mut blocks = Vec::with_capacity(body.len());
        for block in body {
            let sink = new_sink();
            self.frames.push(Frame {
                sink: Rc::clone(&sink),
                selector: None,
                media: self.current_media(),
                kind: FrameKind::Other,
            });
            let flow = self.eval_statements(&block.body, &scope.child());
            self.frames.pop();
            flow?;
            blocks.push(CssKeyframeBlock {
                selectors: block.selectors.clone(),
                children: take_sink(sink),
                span: block.span.clone(),
            });
        }
        self.emit(CssNode::Keyframes(CssKeyframes {
            name: name_text,
            vendor_prefix: vendor_prefix.map(str::to_string),
            blocks,
            span: span.clone(),
        }));
        Ok(Flow::Normal)
    }

    // ---------------------------------------------------------------
    // Modules: @use / @forward / @import
    // ---------------------------------------------------------------

    fn eval_use(
        &mut self,
        url: &str,
        namespace: Option<&UseNamespace>,
        configuration: &[(String, Expression)],
        span: &Span,
        scope: &Scope,
    ) -> SassResult<Flow> {
        if let Some(module_name) = url.strip_prefix("sass:") {
            let builtin_scope = builtins::builtin_module_scope(module_name).ok_or_else(|| {
                SassError::import(format!("Unknown built-in module sass:{module_name}."), span.clone())
            })?;
            match namespace {
                Some(UseNamespace::Star) => copy_all_into(&builtin_scope, scope),
                Some(UseNamespace::Named(name)) => {
                    self.modules.insert(name.clone(), builtin_scope);
                }
                None => {
                    self.modules.insert(module_name.to_string(), builtin_scope);
                }
            }
            return Ok(Flow::Normal);
        }
        let (canonical, is_dependency) = self.resolve_url_with_dependency(url, span, false)?;
        let first_load = !self.module_cache.contains_key(&canonical);
        let config: Vec<(String, Value)> = configuration
            .iter()
            .map(|(n, e)| Ok((n.clone(), self.eval_expression(e, scope)?)))
            .collect::<SassResult<_>>()?;
        let module = self.load_module(&canonical, span, &config, is_dependency)?;
        if first_load {
            self.emit_module_nodes(&module);
        }
        match namespace {
            Some(UseNamespace::Star) => copy_all_into(&module.scope, scope),
            Some(UseNamespace::Named(name)) => {
                self.modules.insert(name.clone(), module.scope.clone());
            }
            None => {
                let ns = default_namespace(&canonical);
                self.modules.insert(ns, module.scope.clone());
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_forward(
        &mut self,
        url: &str,
        prefix: Option<&str>,
        visibility: &ForwardVisibility,
        configuration: &[(String, Expression)],
        span: &Span,
        scope: &Scope,
    ) -> SassResult<Flow> {
        if url.starts_with("sass:") {
            // Built-in modules expose no user-visible function/mixin/variable
            // tables to walk, so there is nothing to forward.
            return Ok(Flow::Normal);
        }
        let (canonical, is_dependency) = self.resolve_url_with_dependency(url, span, false)?;
        let first_load = !self.module_cache.contains_key(&canonical);
        let config: Vec<(String, Value)> = configuration
            .iter()
            .map(|(n, e)| Ok((n.clone(), self.eval_expression(e, scope)?)))
            .collect::<SassResult<_>>()?;
        let module = self.load_module(&canonical, span, &config, is_dependency)?;
        if first_load {
            self.emit_module_nodes(&module);
        }
        let visible = |name: &str| match visibility {
            ForwardVisibility::All => true,
            ForwardVisibility::Show(names) => names.iter().any(|n| n == name),
            ForwardVisibility::Hide(names) => !names.iter().any(|n| n == name),
        };
        let prefixed = |name: &str| match prefix {
            Some(p) => format!("{p}{name}"),
            None => name.to_string(),
        };
        for name in module.scope.own_variable_names() {
            if visible(&name) {
                if let Some(v) = module.scope.get_variable(&name) {
                    scope.declare_local(&prefixed(&name), v);
                }
            }
        }
        for name in module.scope.own_function_names() {
            if visible(&name) {
                if let Some(f) = module.scope.get_function(&name) {
                    scope.declare_function(FunctionDef {
                        name: prefixed(&name),
                        params: f.params.clone(),
                        body: Rc::clone(&f.body),
                        closure: f.closure.clone(),
                    });
                }
            }
        }
        for name in module.scope.own_mixin_names() {
            if visible(&name) {
                if let Some(m) = module.scope.get_mixin(&name) {
                    scope.declare_mixin(MixinDef {
                        name: prefixed(&name),
                        params: m.params.clone(),
                        body: Rc::clone(&m.body),
                        accepts_content: m.accepts_content,
                        closure: m.closure.clone(),
                    });
                }
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_import(&mut self, target: &ImportTarget, scope: &Scope) -> SassResult<Flow> {
        if !(self.quiet_deps && self.in_dependency()) {
            self.logger.warn_deprecated(
                Deprecation::Import,
                "sass:import is deprecated. Use @use and @forward instead.",
                &target.span,
            )?;
        }
        let (canonical, is_dependency) = self.resolve_url_with_dependency(&target.url, &target.span, true)?;
        if self.load_stack.contains(&canonical) {
            return Err(SassError::import(
                format!("Module loop: {canonical} imports itself."),
                target.span.clone(),
            ));
        }
        let (source, syntax) = self.importer.load(&canonical).map_err(|e| match e {
            SassError::Io { path, source } => SassError::import(format!("{path}: {source}"), target.span.clone()),
            other => other,
        })?;
        let parsed = parse_stylesheet(&source, syntax)?;
        self.load_stack.push(canonical);
        self.dependency_stack.push(is_dependency);
        let flow = self.eval_statements(&parsed.statements, scope);
        self.dependency_stack.pop();
        self.load_stack.pop();
        flow
    }

    /// Resolve a `@use`/`@forward`/`@import` target to its canonical URL,
    /// additionally reporting whether this load leaves relative
    /// resolution (or is already inside a dependency), per §6
    /// `quiet_deps`'s "loaded through a load path rather than a relative
    /// path" rule.
    fn resolve_url_with_dependency(&self, url: &str, span: &Span, from_import: bool) -> SassResult<(Url, bool)> {
        let base = self.load_stack.last().cloned().unwrap_or_else(|| span.source.url.clone());
        let canonical = self
            .importer
            .canonicalize(url, &base, from_import)
            .ok_or_else(|| SassError::import(format!("Can't find stylesheet to import: {url}"), span.clone()))?;
        let relative = is_relative_load(url, &base, &canonical);
        Ok((canonical, self.in_dependency() || !relative))
    }

    fn load_module(&mut self, canonical: &Url, span: &Span, config: &[(String, Value)], is_dependency: bool) -> SassResult<Rc<LoadedModule>> {
        if let Some(cached) = self.module_cache.get(canonical) {
            return Ok(Rc::clone(cached));
        }
        if self.load_stack.contains(canonical) {
            return Err(SassError::import(
                format!("Module loop: {canonical} uses itself."),
                span.clone(),
            ));
        }
        let (source, syntax) = self.importer.load(canonical).map_err(|e| match e {
            SassError::Io { path, source } => SassError::import(format!("{path}: {source}"), span.clone()),
            other => other,
        })?;
        let parsed = parse_stylesheet(&source, syntax)?;
        let module_scope = Scope::module_root();
        for (name, value) in config {
            module_scope.set_default(name, value.clone());
        }
        self.load_stack.push(canonical.clone());
        self.dependency_stack.push(is_dependency);
        let sink = new_sink();
        self.frames.push(Frame {
            sink: Rc::clone(&sink),
            selector: None,
            media: None,
            kind: FrameKind::Root,
        });
        let result = self.eval_statements(&parsed.statements, &module_scope);
        self.frames.pop();
        self.dependency_stack.pop();
        self.load_stack.pop();
        result?;
        let loaded = Rc::new(LoadedModule { scope: module_scope, nodes: take_sink(sink) });
        self.module_cache.insert(canonical.clone(), Rc::clone(&loaded));
        Ok(loaded)
    }

    fn emit_module_nodes(&self, module: &LoadedModule) {
        for node in &module.nodes {
            self.emit(node.clone());
        }
    }

    // ---------------------------------------------------------------
    // Mixins / functions / content
    // ---------------------------------------------------------------

    fn eval_include(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        args: &ArgumentInvocation,
        content_params: Option<&ParameterList>,
        content: Option<Rc<Vec<Statement>>>,
        span: &Span,
        scope: &Scope,
    ) -> SassResult<Flow> {
        let mixin = self.lookup_mixin(name, namespace, scope).ok_or_else(|| {
            SassError::runtime(format!("Undefined mixin: \"{name}\"."), span.clone())
        })?;
        let body_scope = mixin.closure.child();
        self.bind_arguments(&mixin.params, args, scope, &body_scope, span)?;
        let content_block = content.map(|body| ContentBlock {
            params: content_params.cloned().unwrap_or_default(),
            body,
            closure: scope.clone(),
        });
        self.content_stack.push(content_block);
        self.call_trace.push(StackFrame { span: span.clone(), label: format!("@include {name}") });
        let result = self.eval_statements(&mixin.body, &body_scope);
        self.call_trace.pop();
        self.content_stack.pop();
        result.map_err(|e| e.with_frame(StackFrame { span: span.clone(), label: format!("@include {name}") }))?;
        Ok(Flow::Normal)
    }

    /// Used by `meta.content-exists()`: whether the innermost `@include`
    /// passed a content block.
    pub(crate) fn content_exists(&self) -> bool {
        matches!(self.content_stack.last(), Some(Some(_)))
    }

    fn eval_content(&mut self, args: &ArgumentInvocation, span: &Span, scope: &Scope) -> SassResult<Flow> {
        let Some(Some(block)) = self.content_stack.last().cloned() else {
            return Ok(Flow::Normal);
        };
        let content_scope = block.closure.child();
        self.bind_arguments(&block.params, args, scope, &content_scope, span)?;
        self.eval_statements(&block.body, &content_scope)
    }

    /// Used by `meta.function-exists()`. Built-in names are recognized by
    /// probing dispatch with an empty argument list: `builtins::call`
    /// returns `None` only when the name is unknown to every built-in
    /// module, regardless of whether the probe call itself errors on
    /// missing arguments.
    pub(crate) fn function_exists(&mut self, name: &str, scope: &Scope) -> bool {
        let (namespace, bare_name) = match name.split_once('.') {
            Some((ns, n)) => (Some(ns), n),
            None => (None, name),
        };
        if self.lookup_function(bare_name, namespace, scope).is_some() {
            return true;
        }
        if namespace.is_none() && self.host_functions.contains_key(bare_name) {
            return true;
        }
        let span = self.probe_span();
        builtins::call(self, namespace, bare_name, Vec::new(), HashMap::new(), &span, scope).is_some()
    }

    /// Used by `meta.mixin-exists()`.
    pub(crate) fn mixin_exists(&self, name: &str, scope: &Scope) -> bool {
        let (namespace, bare_name) = match name.split_once('.') {
            Some((ns, n)) => (Some(ns), n),
            None => (None, name),
        };
        self.lookup_mixin(bare_name, namespace, scope).is_some()
    }

    fn probe_span(&self) -> Span {
        let source = Arc::new(SourceFile::new(url::Url::parse("data:,").unwrap(), ""));
        Span::new(source, 0, 0)
    }

    fn lookup_mixin(&self, name: &str, namespace: Option<&str>, scope: &Scope) -> Option<Rc<MixinDef>> {
        match namespace {
            Some(ns) => self.modules.get(ns)?.get_mixin(name),
            None => scope.get_mixin(name),
        }
    }

    fn lookup_function(&self, name: &str, namespace: Option<&str>, scope: &Scope) -> Option<Rc<FunctionDef>> {
        match namespace {
            Some(ns) => self.modules.get(ns)?.get_function(name),
            None => scope.get_function(name),
        }
    }

    /// Bind `args` (evaluated in `caller_scope`) against `params`,
    /// declaring each formal parameter as a local in `target_scope`.
    fn bind_arguments(
        &mut self,
        params: &ParameterList,
        args: &ArgumentInvocation,
        caller_scope: &Scope,
        target_scope: &Scope,
        span: &Span,
    ) -> SassResult<()> {
        let mut positional: Vec<Value> = Vec::new();
        let mut named: HashMap<String, Value> = HashMap::new();
        for arg in &args.positional {
            let value = self.eval_expression(&arg.value, caller_scope)?;
            if arg.is_rest {
                match value {
                    Value::Map(map) => {
                        for (k, v) in map.entries() {
                            if let Value::String(s) = k {
                                named.insert(s.text.clone(), v.clone());
                            }
                        }
                    }
                    other => positional.extend(other.as_list_elements()),
                }
            } else if let Some(arg_name) = &arg.name {
                named.insert(arg_name.clone(), value);
            } else {
                positional.push(value);
            }
        }

        let mut positional_iter = positional.into_iter();
        for param in &params.params {
            if param.is_rest {
                let rest: Vec<Value> = positional_iter.by_ref().collect();
                target_scope.declare_local(&param.name, Value::list(rest, ListSeparator::Comma, false));
                continue;
            }
            let value = if let Some(v) = positional_iter.next() {
                v
            } else if let Some(v) = named.remove(&param.name) {
                v
            } else if let Some(default) = &param.default {
                self.eval_expression(default, target_scope)?
            } else {
                return Err(SassError::runtime(format!("Missing argument ${}.", param.name), span.clone()));
            };
            target_scope.declare_local(&param.name, value);
        }
        if positional_iter.next().is_some() {
            return Err(SassError::runtime("Too many positional arguments.", span.clone()));
        }
        if let Some((bad_name, _)) = named.into_iter().next() {
            return Err(SassError::runtime(format!("No argument named ${bad_name}."), span.clone()));
        }
        Ok(())
    }

    /// Evaluate a user function call's argument list without a target
    /// scope of its own — used by builtins like `call()` that forward an
    /// already-evaluated argument list.
    fn call_user_function(&mut self, def: &Rc<FunctionDef>, args: &ArgumentInvocation, caller_scope: &Scope, span: &Span) -> SassResult<Value> {
        let body_scope = def.closure.child();
        self.bind_arguments(&def.params, args, caller_scope, &body_scope, span)?;
        self.call_trace.push(StackFrame { span: span.clone(), label: format!("@function {}", def.name) });
        let result = self.eval_function_body(&def.body, &body_scope);
        self.call_trace.pop();
        result.map_err(|e| e.with_frame(StackFrame { span: span.clone(), label: format!("@function {}", def.name) }))
    }

    /// Bind already-evaluated arguments against a host function's
    /// parameter list and invoke its handler. Uses the same
    /// [`synthetic_args`]/[`bind_arguments`] path user-function calls use
    /// so defaults, rest parameters, and keyword matching all behave
    /// identically regardless of which side of the FFI boundary defined
    /// the callable.
    fn call_host_function(
        &mut self,
        host: &Rc<CompiledHostFunction>,
        positional: Vec<Value>,
        named: HashMap<String, Value>,
        span: &Span,
        scope: &Scope,
    ) -> SassResult<Value> {
        let synthetic = synthetic_args(positional, named);
        let target_scope = Scope::root();
        self.bind_arguments(&host.params, &synthetic, scope, &target_scope, span)?;
        let ordered: Vec<Value> = host
            .params
            .params
            .iter()
            .map(|p| target_scope.get_variable(&p.name).unwrap_or(Value::Null))
            .collect();
        (host.handler)(&ordered).map_err(|message| SassError::runtime(message, span.clone()))
    }

    fn eval_function_body(&mut self, body: &[Statement], scope: &Scope) -> SassResult<Value> {
        match self.eval_statements(body, scope)? {
            Flow::Return(v) => Ok(v),
            Flow::Normal => Err(SassError::runtime(
                "Function finished without @return.",
                fallback_span(body),
            )),
        }
    }

    // ---------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------

    fn eval_expression(&mut self, expr: &Expression, scope: &Scope) -> SassResult<Value> {
        match expr {
            Expression::Number { number, .. } => Ok(Value::Number(number.clone())),
            Expression::Color { hex_or_name, span } => SassColor::from_hex(hex_or_name)
                .map(Value::Color)
                .ok_or_else(|| SassError::parse(format!("Invalid color literal #{hex_or_name}."), span.clone())),
            Expression::String { text, quoted, .. } => {
                let rendered = self.eval_interpolation(text, scope)?;
                if *quoted {
                    return Ok(Value::quoted_string(rendered));
                }
                if text.is_plain() {
                    if let Some(color) = SassColor::from_named(&rendered) {
                        return Ok(Value::Color(color.with_format(crate::value::ColorFormat::Named)));
                    }
                }
                Ok(Value::unquoted_string(rendered))
            }
            Expression::Boolean(b) => Ok(Value::Boolean(*b)),
            Expression::Null => Ok(Value::Null),
            Expression::Interpolation(interp) => Ok(Value::unquoted_string(self.eval_interpolation(interp, scope)?)),
            Expression::Variable { name, namespace, span } => self.lookup_variable(name, namespace.as_deref(), scope, span),
            Expression::FunctionRef { name, namespace, .. } => Ok(Value::Function(SassFunction {
                name: qualify(namespace.as_deref(), name),
            })),
            Expression::Call { name, namespace, args, span } => self.eval_call(name, namespace.as_deref(), args, span, scope),
            Expression::If { condition, if_true, if_false, .. } => {
                if self.eval_expression(condition, scope)?.is_truthy() {
                    self.eval_expression(if_true, scope)
                } else {
                    self.eval_expression(if_false, scope)
                }
            }
            Expression::List { elements, separator, bracketed, .. } => {
                let values = elements.iter().map(|e| self.eval_expression(e, scope)).collect::<SassResult<_>>()?;
                Ok(Value::list(values, *separator, *bracketed))
            }
            Expression::Map { entries, .. } => {
                let mut map = SassMap::new();
                for (k, v) in entries {
                    let key = self.eval_expression(k, scope)?;
                    let value = self.eval_expression(v, scope)?;
                    map.insert(key, value);
                }
                Ok(Value::map(map))
            }
            Expression::Paren(inner) => self.eval_expression(inner, scope),
            Expression::Unary { op, operand, span } => self.eval_unary(*op, operand, span, scope),
            Expression::Binary { op, left, right, maybe_slash, span } => {
                self.eval_binary(*op, left, right, *maybe_slash, span, scope)
            }
            Expression::ParentSelector(_) => Ok(match self.current_selector() {
                Some(list) => Value::unquoted_string(list.to_string()),
                None => Value::Null,
            }),
            Expression::Supports(_) => Ok(Value::Null),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expression, span: &Span, scope: &Scope) -> SassResult<Value> {
        let value = self.eval_expression(operand, scope)?;
        Ok(match op {
            UnaryOp::Plus => value,
            UnaryOp::Minus => crate::value::ops::apply_unary_minus(&value, span)?,
            UnaryOp::Not => crate::value::ops::apply_not(&value),
            UnaryOp::Slash => Value::unquoted_string(format!("/{value}")),
        })
    }

    fn eval_binary(
        &mut self,
        op: AstBinaryOp,
        left: &Expression,
        right: &Expression,
        maybe_slash: bool,
        span: &Span,
        scope: &Scope,
    ) -> SassResult<Value> {
        if matches!(op, AstBinaryOp::Or | AstBinaryOp::And) {
            let left_v = self.eval_expression(left, scope)?;
            let short_circuit = matches!(op, AstBinaryOp::Or) == left_v.is_truthy();
            return if short_circuit { Ok(left_v) } else { self.eval_expression(right, scope) };
        }
        let left_v = self.eval_expression(left, scope)?;
        let right_v = self.eval_expression(right, scope)?;
        use crate::value::ops::BinaryOp as Op;
        let mapped = match op {
            AstBinaryOp::Eq => Op::Eq,
            AstBinaryOp::Neq => Op::Neq,
            AstBinaryOp::Lt => Op::Lt,
            AstBinaryOp::Lte => Op::Lte,
            AstBinaryOp::Gt => Op::Gt,
            AstBinaryOp::Gte => Op::Gte,
            AstBinaryOp::Add => Op::Add,
            AstBinaryOp::Sub => Op::Sub,
            AstBinaryOp::Mul => Op::Mul,
            AstBinaryOp::Div => Op::Div,
            AstBinaryOp::Rem => Op::Rem,
            AstBinaryOp::Or | AstBinaryOp::And => unreachable!("handled above"),
        };
        let result = crate::value::ops::apply_binary(mapped, &left_v, &right_v, span)?;
        if maybe_slash {
            if let (Value::Number(result_num), Value::Number(l), Value::Number(r)) = (&result, &left_v, &right_v) {
                return Ok(Value::Number(result_num.clone().as_slash(l.clone(), r.clone())));
            }
        }
        Ok(result)
    }

    fn lookup_variable(&self, name: &str, namespace: Option<&str>, scope: &Scope, span: &Span) -> SassResult<Value> {
        let found = match namespace {
            Some(ns) => self.modules.get(ns).and_then(|m| m.get_variable(name)),
            None => scope.get_variable(name),
        };
        found.ok_or_else(|| SassError::runtime(format!("Undefined variable: \"${name}\"."), span.clone()))
    }

    fn eval_call(&mut self, name: &str, namespace: Option<&str>, args: &ArgumentInvocation, span: &Span, scope: &Scope) -> SassResult<Value> {
        if let Some(def) = self.lookup_function(name, namespace, scope) {
            return self.call_user_function(&def, args, scope, span);
        }
        if namespace.is_none() {
            if let Some(host) = self.host_functions.get(name).cloned() {
                let (positional, named) = self.eval_args_loosely(args, scope)?;
                return self.call_host_function(&host, positional, named, span, scope);
            }
        }
        let (positional, named) = self.eval_args_loosely(args, scope)?;
        if let Some(result) = builtins::call(self, namespace, name, positional.clone(), named.clone(), span, scope) {
            return result;
        }
        if namespace.is_some() {
            return Err(SassError::runtime(format!("Undefined function: \"{name}\"."), span.clone()));
        }
        // Plain CSS passthrough: an unrecognized bare global name is
        // rendered as a literal function call.
        let rendered_args: Vec<String> = positional.iter().map(Value::to_string).chain(
            named.iter().map(|(k, v)| format!("${k}: {v}")),
        ).collect();
        Ok(Value::unquoted_string(format!("{name}({})", rendered_args.join(", "))))
    }

    /// Evaluate an argument list without matching it against a parameter
    /// list yet — used for builtin calls, which bind their own named
    /// parameters internally.
    fn eval_args_loosely(&mut self, args: &ArgumentInvocation, scope: &Scope) -> SassResult<(Vec<Value>, HashMap<String, Value>)> {
        let mut positional = Vec::new();
        let mut named = HashMap::new();
        for arg in &args.positional {
            let value = self.eval_expression(&arg.value, scope)?;
            if arg.is_rest {
                match value {
                    Value::Map(map) => {
                        for (k, v) in map.entries() {
                            if let Value::String(s) = k {
                                named.insert(s.text.clone(), v.clone());
                            }
                        }
                    }
                    other => positional.extend(other.as_list_elements()),
                }
            } else if let Some(arg_name) = &arg.name {
                named.insert(arg_name.clone(), value);
            } else {
                positional.push(value);
            }
        }
        Ok((positional, named))
    }

    /// Used by `meta.call()`: invoke a first-class [`SassFunction`] value
    /// with an already-evaluated argument list.
    pub(crate) fn invoke_dynamic(&mut self, func: &SassFunction, positional: Vec<Value>, named: HashMap<String, Value>, span: &Span, scope: &Scope) -> SassResult<Value> {
        let (namespace, bare_name) = match func.name.split_once('.') {
            Some((ns, n)) => (Some(ns), n),
            None => (None, func.name.as_str()),
        };
        if let Some(def) = self.lookup_function(bare_name, namespace, scope) {
            let synthetic = synthetic_args(positional, named);
            return self.call_user_function(&def, &synthetic, scope, span);
        }
        if namespace.is_none() {
            if let Some(host) = self.host_functions.get(bare_name).cloned() {
                return self.call_host_function(&host, positional, named, span, scope);
            }
        }
        builtins::call(self, namespace, bare_name, positional, named, span, scope)
            .unwrap_or_else(|| Err(SassError::runtime(format!("Undefined function: \"{}\".", func.name), span.clone())))
    }

    // ---------------------------------------------------------------
    // Interpolation
    // ---------------------------------------------------------------

    fn eval_interpolation(&mut self, interpolation: &Interpolation, scope: &Scope) -> SassResult<String> {
        let mut out = String::new();
        for part in &interpolation.parts {
            match part {
                InterpolationPart::Literal(text) => out.push_str(text),
                InterpolationPart::Expr(expr) => {
                    let value = self.eval_expression(expr, scope)?;
                    out.push_str(&interpolated_text(&value));
                }
            }
        }
        Ok(out)
    }
}

fn interpolated_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.text.clone(),
        other => other.to_string(),
    }
}

fn take_sink(sink: NodeSink) -> Vec<CssNode> {
    match Rc::try_unwrap(sink) {
        Ok(cell) => cell.into_inner(),
        Err(rc) => rc.borrow().clone(),
    }
}

fn bind_each_vars(vars: &EachVars, element: &Value, scope: &Scope) {
    if vars.names.len() == 1 {
        scope.declare_local(&vars.names[0], element.clone());
        return;
    }
    let parts = element.as_list_elements();
    for (i, name) in vars.names.iter().enumerate() {
        scope.declare_local(name, parts.get(i).cloned().unwrap_or(Value::Null));
    }
}

fn copy_all_into(module_scope: &Scope, target: &Scope) {
    for name in module_scope.own_variable_names() {
        if let Some(v) = module_scope.get_variable(&name) {
            target.declare_local(&name, v);
        }
    }
    for name in module_scope.own_function_names() {
        if let Some(f) = module_scope.get_function(&name) {
            target.declare_function(FunctionDef {
                name,
                params: f.params.clone(),
                body: Rc::clone(&f.body),
                closure: f.closure.clone(),
            });
        }
    }
    for name in module_scope.own_mixin_names() {
        if let Some(m) = module_scope.get_mixin(&name) {
            target.declare_mixin(MixinDef {
                name,
                params: m.params.clone(),
                body: Rc::clone(&m.body),
                accepts_content: m.accepts_content,
                closure: m.closure.clone(),
            });
        }
    }
}

/// Whether `target` resolves to `canonical` purely by joining it against
/// `from` (the URL standard's relative-resolution algorithm), as opposed
/// to requiring a load path or another configured importer. Used to
/// classify loads for `quiet_deps` (§6): this mirrors "a dependency is any
/// file loaded through a load path rather than a relative import" without
/// requiring the `Importer` trait itself to report which strategy it
/// used.
fn is_relative_load(target: &str, from: &Url, canonical: &Url) -> bool {
    let Some(resolved) = sass_common::url::resolve(target, from) else {
        return false;
    };
    parent_path(&resolved) == parent_path(canonical)
}

fn parent_path(url: &Url) -> Vec<String> {
    let mut segments: Vec<String> =
        url.path_segments().map(|s| s.map(str::to_string).collect()).unwrap_or_default();
    segments.pop();
    segments
}

fn default_namespace(url: &Url) -> String {
    let name = sass_common::url::basename(url).unwrap_or("module");
    let name = name.strip_prefix('_').unwrap_or(name);
    name.split('.').next().unwrap_or(name).to_string()
}

fn qualify(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}.{name}"),
        None => name.to_string(),
    }
}

fn synthetic_args(positional: Vec<Value>, named: HashMap<String, Value>) -> ArgumentInvocation {
    // A dummy span is fine here: these arguments are already evaluated
    // values wrapped back into literal expression nodes purely so
    // `bind_arguments` can reuse its ordinary evaluation path.
    let source = Arc::new(SourceFile::new(url::Url::parse("data:,").unwrap(), ""));
    let span = Span::new(source, 0, 0);
    let mut args: Vec<crate::ast::Argument> = positional
        .into_iter()
        .map(|v| crate::ast::Argument { name: None, value: literal_expr(v, span.clone()), is_rest: false })
        .collect();
    args.extend(named.into_iter().map(|(name, v)| crate::ast::Argument {
        name: Some(name),
        value: literal_expr(v, span.clone()),
        is_rest: false,
    }));
    ArgumentInvocation { positional: args, span }
}

fn literal_expr(value: Value, span: Span) -> Expression {
    Expression::Interpolation(Interpolation {
        parts: vec![InterpolationPart::Literal(interpolated_text(&value))],
        span: Some(span),
    })
}

fn fallback_span(body: &[Statement]) -> Span {
    body.first().map(statement_span).unwrap_or_else(|| {
        let source = Arc::new(SourceFile::new(url::Url::parse("data:,").unwrap(), ""));
        Span::new(source, 0, 0)
    })
}

fn statement_span(statement: &Statement) -> Span {
    match statement {
        Statement::VariableDecl { span, .. }
        | Statement::StyleRule { span, .. }
        | Statement::Declaration { span, .. }
        | Statement::CustomProperty { span, .. }
        | Statement::If { span, .. }
        | Statement::Each { span, .. }
        | Statement::For { span, .. }
        | Statement::While { span, .. }
        | Statement::Return { span, .. }
        | Statement::Warn { span, .. }
        | Statement::Debug { span, .. }
        | Statement::Error { span, .. }
        | Statement::AtRoot { span, .. }
        | Statement::Extend { span, .. }
        | Statement::Use { span, .. }
        | Statement::Forward { span, .. }
        | Statement::Import { span, .. }
        | Statement::Include { span, .. }
        | Statement::Function { span, .. }
        | Statement::Mixin { span, .. }
        | Statement::Content { span, .. }
        | Statement::Media { span, .. }
        | Statement::Supports { span, .. }
        | Statement::Keyframes { span, .. }
        | Statement::UnknownAtRule { span, .. }
        | Statement::LoudComment { span, .. }
        | Statement::SilentComment { span, .. } => span.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_stylesheet;
    use std::cell::RefCell;

    #[derive(Default)]
    struct CapturingLogger {
        warnings: RefCell<Vec<String>>,
    }

    impl Logger for CapturingLogger {
        fn warn(&self, message: &str, _span: Option<&Span>, _trace: &[StackFrame]) {
            self.warnings.borrow_mut().push(message.to_string());
        }

        fn debug(&self, _message: &str, _span: &Span) {}

        fn warn_deprecated(&self, _deprecation: Deprecation, message: &str, _span: &Span) -> SassResult<()> {
            self.warnings.borrow_mut().push(message.to_string());
            Ok(())
        }
    }

    /// Resolves `dep` to a file in an unrelated directory (never reachable
    /// by joining `dep` against the importing file's own URL), so any load
    /// of it is never "relative" — simulating a load-path/package import.
    struct DependencyImporter;

    impl Importer for DependencyImporter {
        fn canonicalize(&self, target: &str, _from: &Url, _from_import: bool) -> Option<Url> {
            (target == "dep").then(|| Url::parse("file:///vendor/dep.scss").unwrap())
        }

        fn load(&self, canonical: &Url) -> SassResult<(Arc<SourceFile>, Syntax)> {
            Ok((Arc::new(SourceFile::new(canonical.clone(), "@warn \"from dep\";")), Syntax::Scss))
        }
    }

    fn run_with(source: &str, quiet_deps: bool) -> Vec<String> {
        let url = Url::parse("file:///entry.scss").unwrap();
        let source_file = Arc::new(SourceFile::new(url.clone(), source.to_string()));
        let stylesheet = parse_stylesheet(&source_file, Syntax::Scss).unwrap();
        let importer = DependencyImporter;
        let logger = CapturingLogger::default();
        let evaluator = Evaluator::new(&importer, &logger).quiet_deps(quiet_deps);
        evaluator.run(&stylesheet, url).unwrap();
        logger.warnings.into_inner()
    }

    #[test]
    fn quiet_deps_suppresses_warnings_from_non_relative_loads() {
        let warnings = run_with("@use \"dep\";\na { b: 1; }\n", true);
        assert!(warnings.is_empty(), "expected no warnings, got {warnings:?}");
    }

    #[test]
    fn warnings_from_dependencies_still_print_by_default() {
        let warnings = run_with("@use \"dep\";\na { b: 1; }\n", false);
        assert_eq!(warnings, vec!["from dep".to_string()]);
    }

    #[test]
    fn quiet_deps_does_not_suppress_warnings_from_the_entrypoint_itself() {
        let warnings = run_with("@warn \"from entry\";\na { b: 1; }\n", true);
        assert_eq!(warnings, vec!["from entry".to_string()]);
    }
}
