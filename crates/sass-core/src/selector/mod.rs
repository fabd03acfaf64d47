//! The selector data model: simple, compound, and complex selectors plus
//! specificity, generalized from the teacher's DOM-matching selector
//! types into a pure syntactic model (no element matching — the compiler
//! never sees a DOM, only selector text).

pub mod extend;
pub mod nest;
pub mod parser;
pub mod unify;

pub use parser::parse_selector_list;

/// A single condition within a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// `div`, `span`, with optional namespace (`svg|rect`).
    Type { namespace: Option<String>, name: String },
    /// `*`, with optional namespace.
    Universal { namespace: Option<String> },
    /// `.foo`.
    Class(String),
    /// `#foo`.
    Id(String),
    /// `%foo` — participates in `@extend` but never reaches output.
    Placeholder(String),
    /// `[attr]`, `[attr=val]`, etc.
    Attribute(AttributeSelector),
    /// `:hover`, `:nth-child(2)`, `:not(.a, .b)` — the argument, if any,
    /// is kept as raw text for `:nth-*` or as a nested selector list for
    /// selector-taking pseudos (`:not`, `:is`, `:where`, `:has`).
    PseudoClass { name: String, argument: Option<PseudoArgument> },
    /// `::before`, `::placeholder`.
    PseudoElement { name: String, argument: Option<PseudoArgument> },
    /// `&` — resolved away before the selector reaches the CSS tree; kept
    /// here only transiently during parsing of a nested rule's prelude.
    Parent,
}

/// The argument carried by a functional pseudo-class/element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoArgument {
    /// `:not(.a, .b)`, `:is(...)`, `:where(...)`, `:has(...)` — a nested
    /// selector list.
    Selector(SelectorList),
    /// `:nth-child(2n+1)` and similar — kept as raw text; the compiler
    /// does not evaluate `An+B` arithmetic since it never matches real
    /// elements.
    Raw(String),
}

/// Attribute selector operators, per CSS attribute-selector syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOp {
    Exists,
    Equals,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

/// `[name op "value" flags]`, e.g. `[data-foo~="bar" i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub namespace: Option<String>,
    pub name: String,
    pub op: AttributeOp,
    pub value: Option<String>,
    /// Case-sensitivity flag (`i` or `s`), carried through verbatim.
    pub flag: Option<char>,
}

/// A sequence of simple selectors with no combinator between them —
/// "a sequence of simple selectors that are not separated by a
/// combinator, representing simultaneous conditions on one element."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simple_selectors: Vec<SimpleSelector>,
}

impl CompoundSelector {
    #[must_use]
    pub fn contains_placeholder(&self) -> bool {
        self.simple_selectors
            .iter()
            .any(|s| matches!(s, SimpleSelector::Placeholder(_)))
    }

    #[must_use]
    pub fn contains_parent(&self) -> bool {
        self.simple_selectors
            .iter()
            .any(|s| matches!(s, SimpleSelector::Parent))
    }
}

/// A combinator between two compound selectors in a complex selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

impl Combinator {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Descendant => " ",
            Self::Child => ">",
            Self::NextSibling => "+",
            Self::SubsequentSibling => "~",
        }
    }
}

/// One component of a complex selector: either a compound selector or a
/// standalone combinator (Sass selectors may have a leading combinator
/// when produced by `@extend`/`selector-nest`, e.g. `> .foo`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexComponent {
    Compound(CompoundSelector),
    Combinator(Combinator),
}

/// "A chain of one or more compound selectors separated by combinators."
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub components: Vec<ComplexComponent>,
}

impl ComplexSelector {
    #[must_use]
    pub fn single(compound: CompoundSelector) -> Self {
        Self {
            components: vec![ComplexComponent::Compound(compound)],
        }
    }

    #[must_use]
    pub fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        self.components.iter().filter_map(|c| match c {
            ComplexComponent::Compound(compound) => Some(compound),
            ComplexComponent::Combinator(_) => None,
        })
    }

    #[must_use]
    pub fn contains_parent(&self) -> bool {
        self.compounds().any(CompoundSelector::contains_parent)
    }

    #[must_use]
    pub fn contains_placeholder(&self) -> bool {
        self.compounds().any(CompoundSelector::contains_placeholder)
    }

    /// The rightmost compound selector — "the elements represented by a
    /// complex selector are the elements matched by the last compound
    /// selector in it."
    #[must_use]
    pub fn subject(&self) -> Option<&CompoundSelector> {
        self.components.iter().rev().find_map(|c| match c {
            ComplexComponent::Compound(compound) => Some(compound),
            ComplexComponent::Combinator(_) => None,
        })
    }

    #[must_use]
    pub fn specificity(&self) -> Specificity {
        self.compounds().map(Specificity::of_compound).sum()
    }
}

/// `(ids, classes, elements)` — "count ID selectors (A), class/attribute/
/// pseudo-class selectors (B), and type/pseudo-element selectors (C)."
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Specificity {
    pub ids: u32,
    pub classes: u32,
    pub elements: u32,
}

impl Specificity {
    #[must_use]
    pub fn of_compound(compound: &CompoundSelector) -> Self {
        let mut spec = Self::default();
        for simple in &compound.simple_selectors {
            match simple {
                SimpleSelector::Id(_) => spec.ids += 1,
                SimpleSelector::Class(_)
                | SimpleSelector::Attribute(_)
                | SimpleSelector::PseudoClass { .. }
                | SimpleSelector::Placeholder(_) => spec.classes += 1,
                SimpleSelector::Type { .. } | SimpleSelector::PseudoElement { .. } => {
                    spec.elements += 1;
                }
                SimpleSelector::Universal { .. } | SimpleSelector::Parent => {}
            }
        }
        spec
    }
}

impl std::iter::Sum for Specificity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, s| Self {
            ids: acc.ids + s.ids,
            classes: acc.classes + s.classes,
            elements: acc.elements + s.elements,
        })
    }
}

/// A disjunction of complex selectors — what a style rule's (evaluated,
/// parsed) prelude produces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub complexes: Vec<ComplexSelector>,
}

impl SelectorList {
    #[must_use]
    pub fn single(complex: ComplexSelector) -> Self {
        Self {
            complexes: vec![complex],
        }
    }

    #[must_use]
    pub fn contains_parent(&self) -> bool {
        self.complexes.iter().any(ComplexSelector::contains_parent)
    }

    #[must_use]
    pub fn contains_placeholder(&self) -> bool {
        self.complexes.iter().any(ComplexSelector::contains_placeholder)
    }

    /// Remove any complex selector containing an unextended placeholder —
    /// "unextended placeholders are removed from the final output."
    #[must_use]
    pub fn without_unextended_placeholders(&self) -> Self {
        Self {
            complexes: self
                .complexes
                .iter()
                .filter(|c| !c.contains_placeholder())
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, complex) in self.complexes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{complex}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ComplexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            match component {
                ComplexComponent::Compound(compound) => {
                    if !first {
                        write!(f, " ")?;
                    }
                    write!(f, "{compound}")?;
                }
                ComplexComponent::Combinator(combinator) => {
                    if !first {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", combinator.as_str())?;
                }
            }
            first = false;
        }
        Ok(())
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.simple_selectors.is_empty() {
            return write!(f, "*");
        }
        for simple in &self.simple_selectors {
            write!(f, "{simple}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { namespace, name } => {
                if let Some(ns) = namespace {
                    write!(f, "{ns}|")?;
                }
                write!(f, "{name}")
            }
            Self::Universal { namespace } => {
                if let Some(ns) = namespace {
                    write!(f, "{ns}|")?;
                }
                write!(f, "*")
            }
            Self::Class(name) => write!(f, ".{name}"),
            Self::Id(name) => write!(f, "#{name}"),
            Self::Placeholder(name) => write!(f, "%{name}"),
            Self::Parent => write!(f, "&"),
            Self::Attribute(attr) => write!(f, "{attr}"),
            Self::PseudoClass { name, argument } => fmt_pseudo(f, ":", name, argument),
            Self::PseudoElement { name, argument } => fmt_pseudo(f, "::", name, argument),
        }
    }
}

fn fmt_pseudo(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    name: &str,
    argument: &Option<PseudoArgument>,
) -> fmt::Result {
    write!(f, "{prefix}{name}")?;
    match argument {
        Some(PseudoArgument::Selector(list)) => write!(f, "({list})"),
        Some(PseudoArgument::Raw(text)) => write!(f, "({text})"),
        None => Ok(()),
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}|")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(value) = &self.value {
            let op = match self.op {
                AttributeOp::Exists => "",
                AttributeOp::Equals => "=",
                AttributeOp::Includes => "~=",
                AttributeOp::DashMatch => "|=",
                AttributeOp::Prefix => "^=",
                AttributeOp::Suffix => "$=",
                AttributeOp::Substring => "*=",
            };
            write!(f, "{op}\"{value}\"")?;
            if let Some(flag) = self.flag {
                write!(f, " {flag}")?;
            }
        }
        write!(f, "]")
    }
}

use std::fmt;
