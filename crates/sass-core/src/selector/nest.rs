//! Resolving `&` against an enclosing selector list — `nest_within` in the
//! specification's terms. Runs once per style rule, after the rule's
//! prelude interpolation has been evaluated and parsed but before the
//! resulting selector list is pushed as the new "current parent".

use crate::error::{SassError, Span};

use super::{Combinator, ComplexComponent, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector};

/// Resolve every `&` in `inner` against `outer`, producing the cross
/// product described in §4.3: each occurrence of `&` is replaced by each
/// complex selector of `outer` in turn. If `inner` contains no `&` at all,
/// the result is `outer` descendant `inner` for every pair (plain
/// nesting). `outer` is `None` at the stylesheet root, where `&` is
/// invalid.
pub fn nest_within(
    outer: Option<&SelectorList>,
    inner: &SelectorList,
    span: &Span,
) -> Result<SelectorList, SassError> {
    let mut complexes = Vec::new();
    for inner_complex in &inner.complexes {
        complexes.extend(nest_complex(outer, inner_complex, span)?);
    }
    Ok(SelectorList { complexes })
}

fn nest_complex(
    outer: Option<&SelectorList>,
    inner: &ComplexSelector,
    span: &Span,
) -> Result<Vec<ComplexSelector>, SassError> {
    if !inner.contains_parent() {
        let Some(outer) = outer else {
            return Ok(vec![inner.clone()]);
        };
        return Ok(outer
            .complexes
            .iter()
            .map(|o| ComplexSelector {
                components: o
                    .components
                    .iter()
                    .cloned()
                    .chain(std::iter::once(ComplexComponent::Combinator(Combinator::Descendant)))
                    .chain(inner.components.iter().cloned())
                    .collect(),
            })
            .collect());
    }

    let Some(outer) = outer else {
        return Err(SassError::parse(
            "Top-level selectors may not contain the parent selector \"&\".",
            span.clone(),
        ));
    };

    // Cross product: substitute each occurrence of `&` within `inner`
    // with each of `outer`'s complex selectors in turn.
    let mut out = Vec::new();
    for outer_complex in &outer.complexes {
        let mut components = Vec::new();
        for component in &inner.components {
            match component {
                ComplexComponent::Compound(compound) if compound.contains_parent() => {
                    components.extend(substitute_parent_in_compound(compound, outer_complex, span)?);
                }
                other => components.push(other.clone()),
            }
        }
        out.push(ComplexSelector { components });
    }
    Ok(out)
}

/// Substitute `&` within a single compound selector. A bare `&` expands to
/// the whole parent complex selector; `&suffix` (e.g. `&-foo`) attaches
/// `suffix` to the parent's last compound selector, which is only valid
/// when the parent's subject is itself a single compound (attaching a
/// suffix to a combinator chain is meaningless).
fn substitute_parent_in_compound(
    compound: &CompoundSelector,
    parent: &ComplexSelector,
    span: &Span,
) -> Result<Vec<ComplexComponent>, SassError> {
    let is_bare = compound.simple_selectors.len() == 1
        && matches!(compound.simple_selectors[0], SimpleSelector::Parent);
    if is_bare {
        return Ok(parent.components.clone());
    }

    let Some(subject) = parent.subject() else {
        return Err(SassError::parse(
            "Can't extend complex selector with a suffixed parent selector.",
            span.clone(),
        ));
    };
    let mut prefix = parent.components.clone();
    prefix.pop();

    let mut merged = subject.simple_selectors.clone();
    for simple in &compound.simple_selectors {
        if matches!(simple, SimpleSelector::Parent) {
            continue;
        }
        merged.push(simple.clone());
    }
    prefix.push(ComplexComponent::Compound(CompoundSelector { simple_selectors: merged }));
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceFile;
    use crate::selector::parse_selector_list;
    use std::sync::Arc;

    fn span() -> Span {
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t.scss").unwrap(), ""));
        Span::new(source, 0, 0)
    }

    fn list(text: &str) -> SelectorList {
        parse_selector_list(text, &span()).unwrap()
    }

    #[test]
    fn no_ampersand_nests_as_descendant() {
        let outer = list(".a");
        let inner = list(".b");
        let result = nest_within(Some(&outer), &inner, &span()).unwrap();
        assert_eq!(result.to_string(), ".a .b");
    }

    #[test]
    fn bare_ampersand_substitutes_whole_parent() {
        let outer = list(".a, .b");
        let inner = list("&:hover");
        let result = nest_within(Some(&outer), &inner, &span()).unwrap();
        assert_eq!(result.to_string(), ".a:hover, .b:hover");
    }

    #[test]
    fn suffixed_ampersand_attaches_to_last_compound() {
        let outer = list(".btn");
        let inner = list("&-primary");
        let result = nest_within(Some(&outer), &inner, &span()).unwrap();
        assert_eq!(result.to_string(), ".btn-primary");
    }

    #[test]
    fn root_ampersand_is_an_error() {
        let inner = list("&");
        assert!(nest_within(None, &inner, &span()).is_err());
    }
}
