//! The Sass value model: the tagged union every expression evaluates to.
//!
//! Where the teacher's CSS value types are a family of small structs
//! (`LengthValue`, `ColorValue`, `BorderValue`, ...) dispatched by the
//! property that uses them, Sass values are dynamically typed — one
//! function can return a number, a color, or a string depending on its
//! arguments — so here they collapse into a single enum with match-based
//! operators instead of per-type structs.

pub mod color;
pub mod list;
pub mod map;
pub mod number;
pub mod ops;

use std::fmt;
use std::rc::Rc;

pub use color::{ColorFormat, SassColor};
pub use list::{ListSeparator, SassList};
pub use map::SassMap;
pub use number::SassNumber;

use crate::selector::SelectorList;

/// A Sass string: a code point sequence plus whether it was written with
/// quotes. Equality ignores quotedness; serialization does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SassString {
    pub text: String,
    pub quoted: bool,
}

impl SassString {
    #[must_use]
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    #[must_use]
    pub fn unquoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }
}

/// A `calc()`-style calculation that could not be resolved to a number at
/// evaluation time (mixed units, percentages, or an unresolved variable).
/// Carried through to the serializer and emitted as `name(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SassCalculation {
    pub name: String,
    pub arguments: Vec<Value>,
}

/// A first-class reference to a user-defined or built-in callable, as
/// returned by `get-function()` and consumed by `call()`.
#[derive(Debug, Clone)]
pub struct SassFunction {
    pub name: String,
}

impl PartialEq for SassFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// The Sass value union. Cloning is cheap for everything except lists,
/// maps, and strings, which are reference-counted so passing a large
/// literal through several function calls does not repeatedly deep-copy
/// it.
#[derive(Debug, Clone)]
pub enum Value {
    Number(SassNumber),
    Color(SassColor),
    String(SassString),
    List(Rc<SassList>),
    Map(Rc<SassMap>),
    Boolean(bool),
    Null,
    Calculation(Rc<SassCalculation>),
    Function(SassFunction),
}

impl Value {
    #[must_use]
    pub fn list(elements: Vec<Value>, separator: ListSeparator, bracketed: bool) -> Self {
        Self::List(Rc::new(SassList::new(elements, separator, bracketed)))
    }

    #[must_use]
    pub fn map(map: SassMap) -> Self {
        Self::Map(Rc::new(map))
    }

    #[must_use]
    pub fn quoted_string(s: impl Into<String>) -> Self {
        Self::String(SassString::quoted(s))
    }

    #[must_use]
    pub fn unquoted_string(s: impl Into<String>) -> Self {
        Self::String(SassString::unquoted(s))
    }

    /// "false and null are falsey; every other value, including 0 and the
    /// empty string, is truthy."
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Boolean(false) | Self::Null)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The Sass type name as reported by `type-of()`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Color(_) => "color",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Boolean(_) => "bool",
            Self::Null => "null",
            Self::Calculation(_) => "calculation",
            Self::Function(_) => "function",
        }
    }

    /// Coerce any value into a list view: non-list, non-map values become
    /// a single-element list; this is how Sass lets a bare value be
    /// passed where a list is expected (`nth($value, 1)` on a scalar).
    #[must_use]
    pub fn as_list_elements(&self) -> Vec<Value> {
        match self {
            Self::List(list) => list.elements().to_vec(),
            Self::Map(map) => map
                .entries()
                .iter()
                .map(|(k, v)| Value::list(vec![k.clone(), v.clone()], ListSeparator::Space, false))
                .collect(),
            Self::Null => Vec::new(),
            other => vec![other.clone()],
        }
    }

    /// Try to interpret this value as a selector list, for
    /// `selector.nest`/`selector.extend`/etc: a string is reparsed, a list
    /// of strings/lists is flattened into a comma-separated selector list.
    #[must_use]
    pub fn as_selector_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.text.clone()),
            Self::List(list) => {
                let parts: Option<Vec<String>> =
                    list.elements().iter().map(Value::as_selector_text).collect();
                parts.map(|parts| {
                    let joiner = match list.separator() {
                        ListSeparator::Comma => ", ",
                        _ => " ",
                    };
                    parts.join(joiner)
                })
            }
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Color(a), Self::Color(b)) => a == b,
            (Self::String(a), Self::String(b)) => a.text == b.text,
            (Self::List(a), Self::List(b)) => {
                let same_separator = matches!(a.separator(), ListSeparator::Undecided)
                    || matches!(b.separator(), ListSeparator::Undecided)
                    || a.separator() == b.separator();
                same_separator && a.is_bracketed() == b.is_bracketed() && a.elements() == b.elements()
            }
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Calculation(a), Self::Calculation(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Color(c) => write!(f, "{c}"),
            Self::String(s) if s.quoted => write!(f, "\"{}\"", s.text.replace('"', "\\\"")),
            Self::String(s) => write!(f, "{}", s.text),
            Self::List(list) => fmt_list(list, f),
            Self::Map(map) => fmt_map(map, f),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Null => write!(f, "null"),
            Self::Calculation(calc) => {
                write!(f, "{}(", calc.name)?;
                for (i, arg) in calc.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Self::Function(func) => write!(f, "get-function(\"{}\")", func.name),
        }
    }
}

fn fmt_list(list: &SassList, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if list.is_bracketed() {
        write!(f, "[")?;
    } else if list.is_empty() {
        return write!(f, "()");
    }
    let sep = match list.separator() {
        ListSeparator::Comma => ", ",
        ListSeparator::Slash => " / ",
        ListSeparator::Space | ListSeparator::Undecided => " ",
    };
    for (i, el) in list.elements().iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{el}")?;
    }
    if list.is_bracketed() {
        write!(f, "]")?;
    }
    Ok(())
}

fn fmt_map(map: &SassMap, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "(")?;
    for (i, (k, v)) in map.entries().iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{k}: {v}")?;
    }
    write!(f, ")")
}

/// Placeholder used during nesting/extend resolution to mark the location
/// of `&` before selector text is finally resolved. Lives here rather
/// than in `selector` because the evaluator threads it through expression
/// evaluation alongside ordinary values.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentSelectorRef {
    pub current: Option<SelectorList>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsey_values_are_false_and_null_only() {
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(Value::Number(SassNumber::new(0.0)).is_truthy());
        assert!(Value::quoted_string("").is_truthy());
    }

    #[test]
    fn string_equality_ignores_quotedness() {
        assert_eq!(Value::quoted_string("a"), Value::unquoted_string("a"));
    }

    #[test]
    fn undecided_separator_lists_compare_equal_to_either() {
        let undecided = Value::list(vec![Value::Number(SassNumber::new(1.0))], ListSeparator::Undecided, false);
        let comma = Value::list(vec![Value::Number(SassNumber::new(1.0))], ListSeparator::Comma, false);
        assert_eq!(undecided, comma);
    }
}
