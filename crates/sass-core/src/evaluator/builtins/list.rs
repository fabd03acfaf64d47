//! `sass:list` — operations over [`SassList`] (§4.4).

use std::collections::HashMap;

use crate::error::{SassError, SassResult, Span};
use crate::value::{ListSeparator, SassList, SassNumber, Value};

use super::{expect_number, ArgReader};

pub(super) fn call(name: &str, positional: Vec<Value>, named: HashMap<String, Value>, span: &Span) -> Option<SassResult<Value>> {
    let mut args = ArgReader::new(positional, named);
    let result = match name {
        "length" => length(&mut args, span),
        "nth" => nth(&mut args, span),
        "set-nth" => set_nth(&mut args, span),
        "join" => join(&mut args, span),
        "append" => append(&mut args, span),
        "zip" => zip(&mut args, span),
        "index" => index(&mut args, span),
        "separator" | "list-separator" => separator(&mut args, span),
        "is-bracketed" => is_bracketed(&mut args, span),
        _ => return None,
    };
    Some(result)
}

fn length(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let v = args.required("list", span)?;
    Ok(Value::Number(SassNumber::new(v.as_list_elements().len() as f64)))
}

fn nth(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let list = args.required("list", span)?;
    let index = args.required("n", span)?;
    let elements = list.as_list_elements();
    let index = expect_number(&index, span)?.assert_int(span)?;
    let resolved = resolve_index(elements.len(), index, span)?;
    Ok(elements[resolved].clone())
}

fn set_nth(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let list = args.required("list", span)?;
    let index = args.required("n", span)?;
    let value = args.required("value", span)?;
    let (separator, bracketed) = list_shape(&list);
    let mut elements = list.as_list_elements();
    let index = expect_number(&index, span)?.assert_int(span)?;
    let resolved = resolve_index(elements.len(), index, span)?;
    elements[resolved] = value;
    Ok(Value::list(elements, separator, bracketed))
}

fn join(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let a = args.required("list1", span)?;
    let b = args.required("list2", span)?;
    let separator = match args.optional("separator", Value::unquoted_string("auto")) {
        Value::String(s) => match s.text.as_str() {
            "comma" => Some(ListSeparator::Comma),
            "space" => Some(ListSeparator::Space),
            "slash" => Some(ListSeparator::Slash),
            _ => None,
        },
        _ => None,
    };
    let bracketed = match args.optional("bracketed", Value::unquoted_string("auto")) {
        Value::String(s) if s.text == "auto" => list_shape(&a).1 || list_shape(&b).1,
        other => other.is_truthy(),
    };
    let list_a = SassList::new(a.as_list_elements(), list_shape(&a).0, false);
    let list_b = SassList::new(b.as_list_elements(), list_shape(&b).0, false);
    let joined = SassList::join(&list_a, &list_b, separator, bracketed);
    Ok(Value::list(joined.into_elements(), joined.separator(), bracketed))
}

fn append(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let list = args.required("list", span)?;
    let value = args.required("val", span)?;
    let separator = match args.optional("separator", Value::unquoted_string("auto")) {
        Value::String(s) => match s.text.as_str() {
            "comma" => ListSeparator::Comma,
            "slash" => ListSeparator::Slash,
            _ => list_shape(&list).0,
        },
        _ => list_shape(&list).0,
    };
    let mut elements = list.as_list_elements();
    elements.push(value);
    Ok(Value::list(elements, separator, list_shape(&list).1))
}

fn zip(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let mut lists = vec![args.required("lists", span)?];
    lists.extend(args.rest());
    let element_lists: Vec<Vec<Value>> = lists.iter().map(Value::as_list_elements).collect();
    let min_len = element_lists.iter().map(Vec::len).min().unwrap_or(0);
    let mut rows = Vec::with_capacity(min_len);
    for i in 0..min_len {
        let row: Vec<Value> = element_lists.iter().map(|l| l[i].clone()).collect();
        rows.push(Value::list(row, ListSeparator::Space, false));
    }
    Ok(Value::list(rows, ListSeparator::Comma, false))
}

fn index(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let list = args.required("list", span)?;
    let value = args.required("value", span)?;
    let elements = list.as_list_elements();
    match elements.iter().position(|e| *e == value) {
        Some(i) => Ok(Value::Number(SassNumber::new((i + 1) as f64))),
        None => Ok(Value::Null),
    }
}

fn separator(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let list = args.required("list", span)?;
    let text = match list_shape(&list).0 {
        ListSeparator::Comma => "comma",
        ListSeparator::Slash => "slash",
        ListSeparator::Space | ListSeparator::Undecided => "space",
    };
    Ok(Value::unquoted_string(text))
}

fn is_bracketed(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let list = args.required("list", span)?;
    Ok(Value::Boolean(list_shape(&list).1))
}

fn list_shape(value: &Value) -> (ListSeparator, bool) {
    match value {
        Value::List(list) => (list.separator(), list.is_bracketed()),
        _ => (ListSeparator::Undecided, false),
    }
}

fn resolve_index(len: usize, index: i64, span: &Span) -> SassResult<usize> {
    if len == 0 {
        return Err(SassError::runtime("List index out of bounds for empty list.".to_string(), span.clone()));
    }
    let len_i = len as i64;
    let resolved = if index > 0 { index - 1 } else { len_i + index };
    if (0..len_i).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(SassError::runtime(format!("Invalid index {index} for a list with {len} elements."), span.clone()))
    }
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
    fn nth_resolves_negative_index_from_end() {
        let list = Value::list(
            vec![Value::Number(SassNumber::new(1.0)), Value::Number(SassNumber::new(2.0)), Value::Number(SassNumber::new(3.0))],
            ListSeparator::Comma,
            false,
        );
        let result = call("nth", vec![list, Value::Number(SassNumber::new(-1.0))], HashMap::new(), &span())
            .unwrap()
            .unwrap();
        assert_eq!(result, Value::Number(SassNumber::new(3.0)));
    }

    #[test]
    fn index_returns_null_when_absent() {
        let list = Value::list(vec![Value::Number(SassNumber::new(1.0))], ListSeparator::Comma, false);
        let result = call("index", vec![list, Value::Number(SassNumber::new(9.0))], HashMap::new(), &span())
            .unwrap()
            .unwrap();
        assert_eq!(result, Value::Null);
    }
}
