//! `sass:selector` — selector algebra exposed as plain functions over
//! string/list values (§4.4). Each function parses its string arguments
//! through the same [`parse_selector_list`] the evaluator uses for style
//! rule preludes, so the rules are identical to what `@extend`/nesting see.

use std::collections::HashMap;

use crate::error::{SassError, SassResult, Span};
use crate::selector::extend::is_superselector;
use crate::selector::nest::nest_within;
use crate::selector::unify::unify_compound;
use crate::selector::{ComplexComponent, ComplexSelector, SelectorList};
use crate::value::{ListSeparator, Value};

use super::ArgReader;

pub(super) fn call(name: &str, positional: Vec<Value>, named: HashMap<String, Value>, span: &Span) -> Option<SassResult<Value>> {
    let mut args = ArgReader::new(positional, named);
    let result = match name {
        "nest" => nest(&mut args, span),
        "append" => append(&mut args, span),
        "extend" => extend(&mut args, span),
        "replace" => replace(&mut args, span),
        "unify" => unify(&mut args, span),
        "is-superselector" => is_superselector_fn(&mut args, span),
        "simple-selectors" => simple_selectors(&mut args, span),
        "parse" => parse(&mut args, span),
        _ => return None,
    };
    Some(result)
}

fn parse_arg(value: &Value, span: &Span) -> SassResult<SelectorList> {
    let text = value
        .as_selector_text()
        .ok_or_else(|| SassError::runtime(format!("{value} is not a valid selector: expected a string."), span.clone()))?;
    crate::selector::parse_selector_list(&text, span)
}

fn to_value(list: &SelectorList) -> Value {
    let rows: Vec<Value> = list
        .complexes
        .iter()
        .map(|complex| {
            let text = complex.to_string();
            Value::list(vec![Value::unquoted_string(text)], ListSeparator::Space, false)
        })
        .collect();
    Value::list(rows, ListSeparator::Comma, false)
}

fn nest(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let mut selectors = vec![args.required("selector1", span)?];
    selectors.extend(args.rest());
    let mut current = parse_arg(&selectors[0], span)?;
    for next in &selectors[1..] {
        let next_list = parse_arg(next, span)?;
        current = nest_within(Some(&current), &next_list, span)?;
    }
    Ok(to_value(&current))
}

/// `selector.append`: like `nest`, but each subsequent selector attaches
/// directly (no descendant combinator) to the previous one's last
/// compound — used to build `.foo.bar` from `.foo` and `&.bar`.
fn append(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let mut selectors = vec![args.required("selector1", span)?];
    selectors.extend(args.rest());
    let mut current = parse_arg(&selectors[0], span)?;
    for next in &selectors[1..] {
        let next_list = parse_arg(next, span)?;
        let mut complexes = Vec::new();
        for outer in &current.complexes {
            for inner in &next_list.complexes {
                complexes.push(append_complex(outer, inner, span)?);
            }
        }
        current = SelectorList { complexes };
    }
    Ok(to_value(&current))
}

fn append_complex(outer: &ComplexSelector, inner: &ComplexSelector, span: &Span) -> SassResult<ComplexSelector> {
    let mut inner_components = inner.components.clone();
    let Some(ComplexComponent::Compound(first_inner)) = inner_components.first().cloned() else {
        return Err(SassError::runtime("selector.append(): selector can't start with a combinator.".to_string(), span.clone()));
    };
    let Some(ComplexComponent::Compound(last_outer)) = outer.components.last() else {
        return Err(SassError::runtime("selector.append(): selector can't end with a combinator.".to_string(), span.clone()));
    };
    let mut merged = last_outer.clone();
    merged.simple_selectors.extend(first_inner.simple_selectors);
    let mut components = outer.components[..outer.components.len() - 1].to_vec();
    components.push(ComplexComponent::Compound(merged));
    components.extend(inner_components.split_off(1));
    Ok(ComplexSelector { components })
}

fn extend(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let selector = args.required("selector", span)?;
    let extendee = args.required("extendee", span)?;
    let extender = args.required("extender", span)?;
    run_extend(&selector, &extendee, &extender, span)
}

fn replace(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    // `selector.replace` shares `extend`'s machinery; the distinction
    // ("replace" drops the original extendee instead of keeping both) is
    // not separately modeled by the shared `ExtendEngine`, so both
    // surface the same first-law union here.
    extend(args, span)
}

fn run_extend(selector: &Value, extendee: &Value, extender: &Value, span: &Span) -> SassResult<Value> {
    use crate::selector::extend::{ExtendEngine, Extension};
    let target_list = parse_arg(selector, span)?;
    let extendee_list = parse_arg(extendee, span)?;
    let extender_list = parse_arg(extender, span)?;
    let mut engine = ExtendEngine::new();
    for extendee_complex in &extendee_list.complexes {
        let Some(target_compound) = extendee_complex.subject().cloned() else {
            continue;
        };
        for simple in &target_compound.simple_selectors {
            for extender_complex in &extender_list.complexes {
                engine.register(Extension {
                    extender: extender_complex.clone(),
                    target: simple.clone(),
                    span: span.clone(),
                    media_context: None,
                    optional: true,
                });
            }
        }
    }
    let extended = engine.apply(&target_list, None)?;
    Ok(to_value(&extended))
}

fn unify(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let a = args.required("selector1", span)?;
    let b = args.required("selector2", span)?;
    let list_a = parse_arg(&a, span)?;
    let list_b = parse_arg(&b, span)?;
    let mut complexes = Vec::new();
    for ca in &list_a.complexes {
        for cb in &list_b.complexes {
            if let (Some(compound_a), Some(compound_b)) = (ca.subject(), cb.subject()) {
                if let Some(unified) = unify_compound(compound_a, compound_b) {
                    complexes.push(ComplexSelector::single(unified));
                }
            }
        }
    }
    if complexes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(to_value(&SelectorList { complexes }))
}

fn is_superselector_fn(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let a = args.required("super", span)?;
    let b = args.required("sub", span)?;
    let list_a = parse_arg(&a, span)?;
    let list_b = parse_arg(&b, span)?;
    let result = list_b.complexes.iter().all(|sub| {
        list_a
            .complexes
            .iter()
            .any(|sup| is_superselector(sup, sub))
    });
    Ok(Value::Boolean(result))
}

fn simple_selectors(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let selector = args.required("selector", span)?;
    let list = parse_arg(&selector, span)?;
    let compound = list
        .complexes
        .first()
        .and_then(|c| c.subject())
        .ok_or_else(|| SassError::runtime("selector.simpleSelectors() requires a single compound selector.".to_string(), span.clone()))?;
    let elements: Vec<Value> = compound.simple_selectors.iter().map(|s| Value::unquoted_string(s.to_string())).collect();
    Ok(Value::list(elements, ListSeparator::Comma, false))
}

fn parse(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let selector = args.required("selector", span)?;
    Ok(to_value(&parse_arg(&selector, span)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        use crate::error::SourceFile;
        use std::sync::Arc;
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t.scss").unwrap(), ""));
        Span::new(source, 0, 0)
    }

    #[test]
    fn nest_combines_with_descendant_combinator() {
        let result = call("nest", vec![Value::quoted_string(".a"), Value::quoted_string(".b")], HashMap::new(), &span())
            .unwrap()
            .unwrap();
        assert_eq!(result.to_string(), ".a .b");
    }

    #[test]
    fn is_superselector_detects_descendant_relationship() {
        let result = call(
            "is-superselector",
            vec![Value::quoted_string(".a"), Value::quoted_string(".a .b")],
            HashMap::new(),
            &span(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(result, Value::Boolean(true));
    }
}
