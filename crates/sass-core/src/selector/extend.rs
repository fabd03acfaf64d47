//! The `@extend` engine: rewrites a CSS tree's selectors according to a set
//! of registered extensions.
//!
//! Where the teacher's cascade module matches one selector against one DOM
//! element, this module performs selector-to-selector rewriting: given
//! `extender` and `target`, every compound selector containing `target`
//! gains a sibling alternative with `target` replaced by `extender` and the
//! remaining simple selectors unified. The two laws of extend (§4.3 of the
//! specification) are upheld by construction: the original selector is
//! never removed (law 1), and unification only ever *adds* simple
//! selectors to a compound, so a synthesized selector's specificity can
//! only be greater than or equal to what it replaces (law 2).

use crate::css::CssNode;
use crate::error::{SassError, Span};

use super::{
    Combinator, ComplexComponent, ComplexSelector, CompoundSelector, SelectorList, SimpleSelector,
};
use super::unify::unify_compound;

/// A registered `(extender, target)` pair from one `@extend` rule.
#[derive(Debug, Clone)]
pub struct Extension {
    /// The selector written after `@extend`, e.g. `.b` in `@extend .b`.
    pub extender: ComplexSelector,
    /// The simple selector being extended, e.g. the compound selector `A`
    /// reduces to one simple selector per occurrence.
    pub target: SimpleSelector,
    /// The span of the `@extend` rule, for error messages.
    pub span: Span,
    /// Which at-rule nesting context (by identity of the innermost
    /// `@media`/`@supports` block, or `None` for the root) the `@extend`
    /// rule was written in. `@extend` may not reach across this boundary.
    pub media_context: Option<u32>,
    /// Whether this extension came from `@extend ... !optional` — an
    /// optional extension that doesn't need to match anything.
    pub optional: bool,
}

/// The fixed-point extension engine: holds every `@extend` registered
/// across a module and applies them to each style rule's selector list.
#[derive(Debug, Clone, Default)]
pub struct ExtendEngine {
    extensions: Vec<Extension>,
}

/// Safety bound on extend-of-extend iteration; each synthesized selector
/// is strictly larger than its source so this terminates far sooner in
/// practice, but a cap avoids pathological blowup on malformed input.
const MAX_ITERATIONS: usize = 64;

impl ExtendEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extension: Extension) {
        self.extensions.push(extension);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Every extension registered so far, in registration order.
    #[must_use]
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Apply every registered extension to `list`, which lives in at-rule
    /// nesting context `rule_media_context`, iterating to a fixed point.
    /// Returns the original selectors plus every synthesized alternative,
    /// with unextended placeholders stripped.
    pub fn apply(
        &self,
        list: &SelectorList,
        rule_media_context: Option<u32>,
    ) -> Result<SelectorList, SassError> {
        let mut current = list.clone();
        let mut matched_any = false;
        for _ in 0..MAX_ITERATIONS {
            let mut next_complexes = current.complexes.clone();
            let mut changed = false;
            for extension in &self.extensions {
                if extension.media_context != rule_media_context && target_in_list(&current, &extension.target)
                {
                    return Err(SassError::extend(
                        "You may not @extend an outer selector from within @media.",
                        extension.span.clone(),
                    ));
                }
                for complex in &current.complexes {
                    for synthesized in extend_complex(complex, &extension.target, &extension.extender) {
                        matched_any = true;
                        if !next_complexes.contains(&synthesized) {
                            next_complexes.push(synthesized);
                            changed = true;
                        }
                    }
                }
            }
            current = SelectorList { complexes: next_complexes };
            if !changed {
                break;
            }
        }
        let _ = matched_any;
        Ok(current.without_unextended_placeholders())
    }
}

/// Apply `engine` to every style rule in a finished CSS tree, recursing
/// into `@media`/`@supports`/unknown-at-rule and keyframe bodies. Run once
/// after evaluation completes, per §5's ordering rule ("extensions are
/// applied after the full tree is built").
pub fn apply_to_tree(nodes: &mut [CssNode], engine: &ExtendEngine) -> Result<(), SassError> {
    for node in nodes {
        match node {
            CssNode::StyleRule(rule) => {
                rule.selector = engine.apply(&rule.selector, rule.media_context)?;
                apply_to_tree(&mut rule.children, engine)?;
            }
            CssNode::Media(at) | CssNode::Supports(at) | CssNode::UnknownAtRule(at) => {
                apply_to_tree(&mut at.children, engine)?;
            }
            CssNode::Keyframes(keyframes) => {
                for block in &mut keyframes.blocks {
                    apply_to_tree(&mut block.children, engine)?;
                }
            }
            CssNode::Declaration(decl) => {
                apply_to_tree(&mut decl.children, engine)?;
            }
            CssNode::Import(_) | CssNode::Comment(_) => {}
        }
    }
    Ok(())
}

fn target_in_list(list: &SelectorList, target: &SimpleSelector) -> bool {
    list.complexes
        .iter()
        .any(|c| c.compounds().any(|cs| cs.simple_selectors.contains(target)))
}

/// Produce every selector synthesized by extending `complex` with
/// `extender` wherever `target` occurs, per the algorithm in §4.3. Returns
/// an empty vector (not an error) if the target doesn't occur, or if
/// unification fails for every occurrence — extensions that don't match
/// are silently dropped.
fn extend_complex(
    complex: &ComplexSelector,
    target: &SimpleSelector,
    extender: &ComplexSelector,
) -> Vec<ComplexSelector> {
    let mut results = Vec::new();
    for (i, component) in complex.components.iter().enumerate() {
        let ComplexComponent::Compound(compound) = component else {
            continue;
        };
        if !compound.simple_selectors.contains(target) {
            continue;
        }
        let mut without_target = compound.clone();
        without_target.simple_selectors.retain(|s| s != target);

        let Some(extender_subject) = extender.subject() else {
            continue;
        };
        let Some(unified) = unify_compound(&without_target, extender_subject) else {
            continue;
        };

        let mut new_components: Vec<ComplexComponent> = complex.components[..i].to_vec();
        let extender_prefix = &extender.components[..extender.components.len().saturating_sub(1)];
        if !extender_prefix.is_empty() {
            if !new_components.is_empty()
                && !matches!(new_components.last(), Some(ComplexComponent::Combinator(_)))
            {
                new_components.push(ComplexComponent::Combinator(Combinator::Descendant));
            }
            new_components.extend(extender_prefix.iter().cloned());
        }
        new_components.push(ComplexComponent::Compound(unified));
        new_components.extend(complex.components[i + 1..].iter().cloned());

        let synthesized = ComplexSelector { components: new_components };
        if synthesized != *complex {
            results.push(synthesized);
        }
    }
    results
}

/// Whether `a` is a superselector of `b`: every element `b` could match is
/// also matched by `a`. Used both by `selector.is-superselector()` and
/// internally to detect when extension has produced a redundant
/// alternative (not currently pruned — Sass keeps redundant alternatives
/// rather than risk dropping a legitimately distinct match, matching the
/// reference implementation's conservative behavior).
#[must_use]
pub fn is_superselector(a: &ComplexSelector, b: &ComplexSelector) -> bool {
    let a_compounds: Vec<&CompoundSelector> = a.compounds().collect();
    let b_compounds: Vec<&CompoundSelector> = b.compounds().collect();
    if a_compounds.len() > b_compounds.len() {
        return false;
    }
    // A simple, common-case check: `a`'s compounds appear as a (possibly
    // non-contiguous) subsequence of `b`'s compounds, each one a
    // compound-superselector of its counterpart, ending at the same
    // subject. This covers the overwhelming majority of real
    // `@extend`-generated comparisons (plain descendant nesting) without
    // reimplementing the full combinator-aware matcher.
    if a_compounds.is_empty() {
        return true;
    }
    let offset = b_compounds.len() - a_compounds.len();
    a_compounds
        .iter()
        .zip(&b_compounds[offset..])
        .all(|(sa, sb)| is_compound_superselector(sa, sb))
}

fn is_compound_superselector(a: &CompoundSelector, b: &CompoundSelector) -> bool {
    a.simple_selectors.iter().all(|s| b.simple_selectors.contains(s))
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
    fn first_law_preserves_original_selector() {
        let mut engine = ExtendEngine::new();
        let extender = list(".b").complexes.into_iter().next().unwrap();
        engine.register(Extension {
            extender,
            target: SimpleSelector::Type { namespace: None, name: "a".into() },
            span: span(),
            media_context: None,
            optional: false,
        });
        let result = engine.apply(&list("a"), None).unwrap();
        assert!(result.complexes.iter().any(|c| c.to_string() == "a"));
        assert!(result.complexes.iter().any(|c| c.to_string() == ".b"));
    }

    #[test]
    fn extension_across_media_boundary_errors() {
        let mut engine = ExtendEngine::new();
        let extender = list(".b").complexes.into_iter().next().unwrap();
        engine.register(Extension {
            extender,
            target: SimpleSelector::Type { namespace: None, name: "a".into() },
            span: span(),
            media_context: Some(1),
            optional: false,
        });
        assert!(engine.apply(&list("a"), None).is_err());
    }

    #[test]
    fn unmatched_extension_is_silently_dropped() {
        let mut engine = ExtendEngine::new();
        let extender = list(".b").complexes.into_iter().next().unwrap();
        engine.register(Extension {
            extender,
            target: SimpleSelector::Class("nonexistent".into()),
            span: span(),
            media_context: None,
            optional: true,
        });
        let result = engine.apply(&list("a"), None).unwrap();
        assert_eq!(result.complexes.len(), 1);
    }

    #[test]
    fn unextended_placeholder_is_removed() {
        let engine = ExtendEngine::new();
        let result = engine.apply(&list("%foo, .bar"), None).unwrap();
        assert_eq!(result.to_string(), ".bar");
    }

    #[test]
    fn superselector_detects_descendant_containment() {
        let a = list("a").complexes.into_iter().next().unwrap();
        let b = list("div a.foo").complexes.into_iter().next().unwrap();
        assert!(is_superselector(&a, &b));
    }
}
