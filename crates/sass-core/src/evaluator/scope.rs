//! Lexical scope chain: a stack of frames holding variable, function, and
//! mixin bindings, each linking to its enclosing frame (§3.5).
//!
//! Functions and mixins close over the frame active at their
//! `@function`/`@mixin` declaration, so a [`Scope`] is reference-counted
//! and mutated through interior mutability rather than owned by a single
//! call frame — the same pattern the teacher uses for its cascading
//! style-attribute lookups, generalized here to three independent
//! namespaces (variables, functions, mixins) instead of one.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{ParameterList, Statement};
use crate::value::Value;

/// A user-defined `@function`, closing over the scope it was declared in.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: ParameterList,
    pub body: Rc<Vec<Statement>>,
    pub closure: Scope,
}

/// A user-defined `@mixin`, closing over the scope it was declared in.
#[derive(Debug, Clone)]
pub struct MixinDef {
    pub name: String,
    pub params: ParameterList,
    pub body: Rc<Vec<Statement>>,
    pub accepts_content: bool,
    pub closure: Scope,
}

/// A captured `@content` block plus the environment it was captured in —
/// `@include`'s content block runs in the scope of the `@include` site,
/// not the mixin body, so it has to travel alongside the block.
#[derive(Debug, Clone)]
pub struct ContentBlock {
    pub params: ParameterList,
    pub body: Rc<Vec<Statement>>,
    pub closure: Scope,
}

#[derive(Debug, Default)]
struct Frame {
    variables: HashMap<String, Value>,
    functions: HashMap<String, Rc<FunctionDef>>,
    mixins: HashMap<String, Rc<MixinDef>>,
    /// `true` for a module root frame: `!global` writes that don't find an
    /// existing binding anywhere land here rather than erroring.
    is_global: bool,
    parent: Option<Scope>,
}

/// A reference-counted, interior-mutable scope frame. Cloning a [`Scope`]
/// shares the same frame (used when a closure captures "the current
/// scope"); [`Scope::child`] creates a genuinely new frame linked to its
/// parent.
#[derive(Debug, Clone)]
pub struct Scope(Rc<RefCell<Frame>>);

impl Scope {
    #[must_use]
    pub fn root() -> Self {
        Self(Rc::new(RefCell::new(Frame {
            is_global: true,
            ..Frame::default()
        })))
    }

    #[must_use]
    pub fn child(&self) -> Self {
        Self(Rc::new(RefCell::new(Frame {
            parent: Some(self.clone()),
            ..Frame::default()
        })))
    }

    /// A new module root: linked to no parent, so lookups inside it never
    /// see the using module's globals (modules are isolated per §3.5).
    #[must_use]
    pub fn module_root() -> Self {
        Self::root()
    }

    #[must_use]
    pub fn get_variable(&self, name: &str) -> Option<Value> {
        let frame = self.0.borrow();
        if let Some(v) = frame.variables.get(name) {
            return Some(v.clone());
        }
        frame.parent.as_ref().and_then(|p| p.get_variable(name))
    }

    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.get_variable(name).is_some()
    }

    /// `$x: v;` — writes to the nearest frame (this one) if a binding
    /// already exists anywhere up the chain (rebinding it there), else
    /// creates a new local binding here.
    pub fn set_variable(&self, name: &str, value: Value) {
        if self.set_variable_if_bound(name, value.clone()) {
            return;
        }
        self.0.borrow_mut().variables.insert(name.to_string(), value);
    }

    fn set_variable_if_bound(&self, name: &str, value: Value) -> bool {
        let mut frame = self.0.borrow_mut();
        if frame.variables.contains_key(name) {
            frame.variables.insert(name.to_string(), value);
            return true;
        }
        let parent = frame.parent.clone();
        drop(frame);
        parent.is_some_and(|p| p.set_variable_if_bound(name, value))
    }

    /// `$x: v !global;` — writes through to the module root frame,
    /// creating the binding there if it doesn't already exist.
    pub fn set_global(&self, name: &str, value: Value) {
        let mut frame = self.0.borrow_mut();
        if frame.is_global {
            frame.variables.insert(name.to_string(), value);
            return;
        }
        let parent = frame.parent.clone();
        drop(frame);
        match parent {
            Some(p) => p.set_global(name, value),
            None => {
                self.0.borrow_mut().variables.insert(name.to_string(), value);
            }
        }
    }

    /// `$x: v !default;` — writes only if `x` is unbound (anywhere in the
    /// chain) or currently null.
    pub fn set_default(&self, name: &str, value: Value) {
        match self.get_variable(name) {
            Some(existing) if !existing.is_null() => {}
            _ => self.set_variable(name, value),
        }
    }

    /// Declare a local binding in exactly this frame, shadowing any outer
    /// one — used to bind a mixin/function's formal parameters and loop
    /// variables, which must never write through to an outer scope.
    pub fn declare_local(&self, name: &str, value: Value) {
        self.0.borrow_mut().variables.insert(name.to_string(), value);
    }

    #[must_use]
    pub fn get_function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        let frame = self.0.borrow();
        if let Some(f) = frame.functions.get(name) {
            return Some(Rc::clone(f));
        }
        frame.parent.as_ref().and_then(|p| p.get_function(name))
    }

    pub fn declare_function(&self, def: FunctionDef) {
        self.0.borrow_mut().functions.insert(def.name.clone(), Rc::new(def));
    }

    #[must_use]
    pub fn get_mixin(&self, name: &str) -> Option<Rc<MixinDef>> {
        let frame = self.0.borrow();
        if let Some(m) = frame.mixins.get(name) {
            return Some(Rc::clone(m));
        }
        frame.parent.as_ref().and_then(|p| p.get_mixin(name))
    }

    pub fn declare_mixin(&self, def: MixinDef) {
        self.0.borrow_mut().mixins.insert(def.name.clone(), Rc::new(def));
    }

    /// Every variable name bound directly in this frame (not ancestors) —
    /// used to build a module's public variable set for `@use`/`@forward`.
    /// `meta.global-variable-exists()`: whether `name` is bound in the
    /// module root frame, regardless of what's shadowing it locally.
    #[must_use]
    pub fn has_global_variable(&self, name: &str) -> bool {
        let frame = self.0.borrow();
        if frame.is_global {
            return frame.variables.contains_key(name);
        }
        frame.parent.as_ref().is_some_and(|p| p.has_global_variable(name))
    }

    #[must_use]
    pub fn own_variable_names(&self) -> Vec<String> {
        self.0.borrow().variables.keys().cloned().collect()
    }

    #[must_use]
    pub fn own_function_names(&self) -> Vec<String> {
        self.0.borrow().functions.keys().cloned().collect()
    }

    #[must_use]
    pub fn own_mixin_names(&self) -> Vec<String> {
        self.0.borrow().mixins.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::number::SassNumber;

    #[test]
    fn child_scope_sees_parent_bindings() {
        let root = Scope::root();
        root.set_variable("x", Value::Number(SassNumber::new(1.0)));
        let child = root.child();
        assert_eq!(child.get_variable("x"), Some(Value::Number(SassNumber::new(1.0))));
    }

    #[test]
    fn local_write_does_not_leak_to_parent_without_global() {
        let root = Scope::root();
        let child = root.child();
        child.set_variable("y", Value::Boolean(true));
        assert!(root.get_variable("y").is_none());
    }

    #[test]
    fn existing_outer_binding_is_rewritten_in_place() {
        let root = Scope::root();
        root.set_variable("x", Value::Boolean(false));
        let child = root.child();
        child.set_variable("x", Value::Boolean(true));
        assert_eq!(root.get_variable("x"), Some(Value::Boolean(true)));
    }

    #[test]
    fn global_flag_writes_through_to_root() {
        let root = Scope::root();
        let child = root.child();
        child.set_global("g", Value::Boolean(true));
        assert_eq!(root.get_variable("g"), Some(Value::Boolean(true)));
    }

    #[test]
    fn default_flag_skips_existing_non_null_binding() {
        let root = Scope::root();
        root.set_variable("x", Value::Boolean(true));
        root.set_default("x", Value::Boolean(false));
        assert_eq!(root.get_variable("x"), Some(Value::Boolean(true)));
    }
}
