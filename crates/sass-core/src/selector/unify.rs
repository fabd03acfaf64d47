//! Unifying two compound selectors into the single compound selector that
//! matches their intersection.
//!
//! Generalizes the teacher's selector-matching code (which only ever
//! tested one selector against one element) into an operation on two
//! selectors: instead of asking "does this element match", we ask "what
//! selector matches everything both of these match". Used directly by
//! `selector.unify()` and internally by the `@extend` engine.

use super::{AttributeSelector, CompoundSelector, SimpleSelector};

/// Unify two compound selectors, returning `None` if they can never match
/// the same element (e.g. two different type selectors, or two different
/// IDs).
#[must_use]
pub fn unify_compound(a: &CompoundSelector, b: &CompoundSelector) -> Option<CompoundSelector> {
    let mut merged: Vec<SimpleSelector> = Vec::new();

    // Type/universal selectors must agree first, since only one type
    // selector can ever apply to a single element.
    let a_type = a.simple_selectors.iter().find(|s| is_type_like(s));
    let b_type = b.simple_selectors.iter().find(|s| is_type_like(s));
    match (a_type, b_type) {
        (Some(ta), Some(tb)) => merged.push(unify_type_like(ta, tb)?),
        (Some(t), None) | (None, Some(t)) => merged.push(t.clone()),
        (None, None) => {}
    }

    // IDs: at most one distinct ID may apply.
    let a_id = a.simple_selectors.iter().find_map(id_name);
    let b_id = b.simple_selectors.iter().find_map(id_name);
    if let (Some(ia), Some(ib)) = (&a_id, &b_id) {
        if ia != ib {
            return None;
        }
    }

    for simple in a.simple_selectors.iter().chain(b.simple_selectors.iter()) {
        if is_type_like(simple) {
            continue;
        }
        if !merged.contains(simple) {
            merged.push(simple.clone());
        }
    }

    // Pseudo-elements must always sort last, matching CSS syntax
    // requirements ("a compound selector's pseudo-elements come after its
    // other simple selectors").
    merged.sort_by_key(|s| matches!(s, SimpleSelector::PseudoElement { .. }));

    Some(CompoundSelector {
        simple_selectors: merged,
    })
}

fn is_type_like(s: &SimpleSelector) -> bool {
    matches!(s, SimpleSelector::Type { .. } | SimpleSelector::Universal { .. })
}

fn id_name(s: &SimpleSelector) -> Option<&str> {
    match s {
        SimpleSelector::Id(name) => Some(name),
        _ => None,
    }
}

/// Unify two type/universal selectors: a universal selector yields to a
/// more specific type, and two different concrete types never unify.
fn unify_type_like(a: &SimpleSelector, b: &SimpleSelector) -> Option<SimpleSelector> {
    match (a, b) {
        (SimpleSelector::Universal { .. }, other) | (other, SimpleSelector::Universal { .. }) => {
            Some(other.clone())
        }
        (
            SimpleSelector::Type { namespace: na, name: ta },
            SimpleSelector::Type { namespace: nb, name: tb },
        ) => {
            if ta != tb {
                return None;
            }
            match (na, nb) {
                (Some(_), None) => Some(a.clone()),
                (None, Some(_)) => Some(b.clone()),
                (na, nb) if na == nb => Some(a.clone()),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Whether `a` and `b`'s attribute name/namespace match (used by callers
/// that want to detect conflicting `[attr=x][attr=y]` pairs; unification
/// itself keeps both, matching CSS's "all conditions must hold"
/// semantics for attribute selectors).
#[must_use]
pub fn same_attribute_name(a: &AttributeSelector, b: &AttributeSelector) -> bool {
    a.name == b.name && a.namespace == b.namespace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::parse_selector_list;
    use crate::error::{SourceFile, Span};
    use std::sync::Arc;

    fn span() -> Span {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t.scss").unwrap(), ""));
        Span::new(source, 0, 0)
    }

    fn compound(text: &str) -> CompoundSelector {
        let list = parse_selector_list(text, &span()).unwrap();
        list.complexes[0].compounds().next().unwrap().clone()
    }

    #[test]
    fn unifies_class_and_class_into_both() {
        let unified = unify_compound(&compound(".a"), &compound(".b")).unwrap();
        assert_eq!(unified.simple_selectors.len(), 2);
    }

    #[test]
    fn conflicting_types_fail_to_unify() {
        assert!(unify_compound(&compound("div"), &compound("span")).is_none());
    }

    #[test]
    fn universal_yields_to_concrete_type() {
        let unified = unify_compound(&compound("*"), &compound("div")).unwrap();
        assert_eq!(unified.simple_selectors, vec![SimpleSelector::Type { namespace: None, name: "div".into() }]);
    }

    #[test]
    fn unifying_same_compound_is_idempotent_on_specificity() {
        let unified = unify_compound(&compound("div.a"), &compound("div.a")).unwrap();
        assert_eq!(unified.simple_selectors.len(), 2);
    }
}
