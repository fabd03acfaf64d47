//! Built-in Sass functions (§4.4): `sass:math`, `sass:color`, `sass:list`,
//! `sass:map`, `sass:meta`, `sass:string`, `sass:selector`, plus the legacy
//! global names real stylesheets still call unprefixed.
//!
//! Dispatch mirrors `eval_call`'s user-function lookup: the evaluator tries
//! a user-defined function first and only falls back to [`call`] when none
//! is found, so a stylesheet that shadows a built-in with its own
//! `@function` of the same name wins.

mod color;
mod list;
mod map;
mod math;
mod meta;
mod selectors;
mod string;

use std::collections::{HashMap, VecDeque};

use crate::error::{SassError, SassResult, Span};
use crate::evaluator::scope::Scope;
use crate::evaluator::Evaluator;
use crate::value::{SassColor, SassNumber, SassString, Value};

/// Dispatch a (possibly namespaced) function call to the matching built-in
/// module. Returns `None` if `name` (under `namespace`) names no built-in,
/// letting the caller decide between "undefined function" and "plain CSS
/// function passthrough".
pub fn call(
    eval: &mut Evaluator,
    namespace: Option<&str>,
    name: &str,
    positional: Vec<Value>,
    named: HashMap<String, Value>,
    span: &Span,
    scope: &Scope,
) -> Option<SassResult<Value>> {
    match namespace {
        Some("math") => math::call(name, positional, named, span),
        Some("color") => color::call(name, positional, named, span),
        Some("list") => list::call(name, positional, named, span),
        Some("map") => map::call(name, positional, named, span),
        Some("string") => string::call(name, positional, named, span),
        Some("selector") => selectors::call(name, positional, named, span),
        Some("meta") => meta::call(eval, name, positional, named, span, scope),
        Some(_) => None,
        None => global(eval, name, positional, named, span, scope),
    }
}

/// Legacy unprefixed names: every module's functions are reachable without
/// a namespace, the way real Sass keeps `lighten()`/`map-get()`/`nth()`
/// working for stylesheets that predate `@use`.
fn global(
    eval: &mut Evaluator,
    name: &str,
    positional: Vec<Value>,
    named: HashMap<String, Value>,
    span: &Span,
    scope: &Scope,
) -> Option<SassResult<Value>> {
    math::call(name, positional.clone(), named.clone(), span)
        .or_else(|| color::call(name, positional.clone(), named.clone(), span))
        .or_else(|| list::call(name, positional.clone(), named.clone(), span))
        .or_else(|| map::call(name, positional.clone(), named.clone(), span))
        .or_else(|| string::call(name, positional.clone(), named.clone(), span))
        .or_else(|| selectors::call(name, positional.clone(), named.clone(), span))
        .or_else(|| meta::call(eval, name, positional, named, span, scope))
}

/// Construct the synthetic scope bound to `@use "sass:<name>"`. Built-in
/// modules have no `@function`/`@mixin` definitions to walk (those are
/// dispatched through [`call`] directly); only `sass:math`'s two constants
/// live here as ordinary variables.
#[must_use]
pub fn builtin_module_scope(name: &str) -> Option<Scope> {
    match name {
        "math" => {
            let scope = Scope::module_root();
            scope.declare_local("pi", Value::Number(SassNumber::new(std::f64::consts::PI)));
            scope.declare_local("e", Value::Number(SassNumber::new(std::f64::consts::E)));
            scope.declare_local("epsilon", Value::Number(SassNumber::new(f64::EPSILON)));
            Some(scope)
        }
        "color" | "list" | "map" | "meta" | "string" | "selector" => Some(Scope::module_root()),
        _ => None,
    }
}

/// Pulls arguments off a builtin's positional/named argument lists,
/// falling back to named-by-Sass-parameter-name, then to a supplied
/// default, then erroring. Mirrors the way `bind_arguments` resolves
/// user-defined parameter lists, simplified for builtins' fixed shapes.
pub(super) struct ArgReader {
    positional: VecDeque<Value>,
    named: HashMap<String, Value>,
}

impl ArgReader {
    pub(super) fn new(positional: Vec<Value>, named: HashMap<String, Value>) -> Self {
        Self {
            positional: positional.into(),
            named,
        }
    }

    pub(super) fn required(&mut self, name: &str, span: &Span) -> SassResult<Value> {
        if let Some(v) = self.positional.pop_front() {
            return Ok(v);
        }
        if let Some(v) = self.named.remove(name) {
            return Ok(v);
        }
        Err(SassError::runtime(format!("Missing argument ${name}."), span.clone()))
    }

    pub(super) fn optional(&mut self, name: &str, default: Value) -> Value {
        if let Some(v) = self.positional.pop_front() {
            return v;
        }
        self.named.remove(name).unwrap_or(default)
    }

    pub(super) fn optional_opt(&mut self, name: &str) -> Option<Value> {
        if let Some(v) = self.positional.pop_front() {
            return Some(v);
        }
        self.named.remove(name)
    }

    /// Every remaining positional argument, for `$rest`-style parameters.
    pub(super) fn rest(&mut self) -> Vec<Value> {
        self.positional.drain(..).collect()
    }
}

pub(super) fn expect_number<'a>(value: &'a Value, span: &Span) -> SassResult<&'a SassNumber> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(type_error("number", other, span)),
    }
}

pub(super) fn expect_color<'a>(value: &'a Value, span: &Span) -> SassResult<&'a SassColor> {
    match value {
        Value::Color(c) => Ok(c),
        other => Err(type_error("color", other, span)),
    }
}

pub(super) fn expect_string<'a>(value: &'a Value, span: &Span) -> SassResult<&'a SassString> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(type_error("string", other, span)),
    }
}

pub(super) fn expect_bool(value: &Value) -> bool {
    value.is_truthy()
}

fn type_error(expected: &str, got: &Value, span: &Span) -> SassError {
    SassError::runtime(format!("{got} is not a {expected}."), span.clone())
}

pub(super) fn unitless(value: f64) -> SassNumber {
    SassNumber::new(value)
}
