//! `sass:string` — operations over [`SassString`] (§4.4). Indices are
//! 1-based and negative-from-end, matching `list.nth`'s convention.

use std::collections::HashMap;

use crate::error::{SassResult, Span};
use crate::value::{SassNumber, SassString, Value};

use super::{expect_number, expect_string, ArgReader};

pub(super) fn call(name: &str, positional: Vec<Value>, named: HashMap<String, Value>, span: &Span) -> Option<SassResult<Value>> {
    let mut args = ArgReader::new(positional, named);
    let result = match name {
        "quote" => quote(&mut args, span),
        "unquote" => unquote(&mut args, span),
        "length" | "str-length" => length(&mut args, span),
        "insert" | "str-insert" => insert(&mut args, span),
        "index" | "str-index" => index(&mut args, span),
        "slice" | "str-slice" => slice(&mut args, span),
        "to-upper-case" => to_upper(&mut args, span),
        "to-lower-case" => to_lower(&mut args, span),
        "unique-id" => unique_id(&mut args, span),
        _ => return None,
    };
    Some(result)
}

fn quote(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let s = args.required("string", span)?;
    Ok(Value::quoted_string(expect_string(&s, span)?.text.clone()))
}

fn unquote(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let s = args.required("string", span)?;
    Ok(Value::unquoted_string(expect_string(&s, span)?.text.clone()))
}

fn length(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let s = args.required("string", span)?;
    Ok(Value::Number(SassNumber::new(expect_string(&s, span)?.text.chars().count() as f64)))
}

fn resolve_index(len: usize, index: i64) -> usize {
    let len_i = len as i64;
    let resolved = if index > 0 { index - 1 } else { len_i + index };
    resolved.clamp(0, len_i.max(0)) as usize
}

fn insert(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let s = args.required("string", span)?;
    let insert = args.required("insert", span)?;
    let index = args.required("index", span)?;
    let original = expect_string(&s, span)?;
    let insert_text = &expect_string(&insert, span)?.text;
    let index = expect_number(&index, span)?.assert_int(span)?;
    let chars: Vec<char> = original.text.chars().collect();
    let at = resolve_index(chars.len() + 1, index).min(chars.len());
    let mut result: String = chars[..at].iter().collect();
    result.push_str(insert_text);
    result.extend(&chars[at..]);
    Ok(Value::String(SassString { text: result, quoted: original.quoted }))
}

fn index(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let s = args.required("string", span)?;
    let substring = args.required("substring", span)?;
    let haystack = &expect_string(&s, span)?.text;
    let needle = &expect_string(&substring, span)?.text;
    match haystack.find(needle.as_str()) {
        Some(byte_idx) => {
            let char_idx = haystack[..byte_idx].chars().count();
            Ok(Value::Number(SassNumber::new((char_idx + 1) as f64)))
        }
        None => Ok(Value::Null),
    }
}

fn slice(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let s = args.required("string", span)?;
    let start = args.required("start-at", span)?;
    let original = expect_string(&s, span)?;
    let chars: Vec<char> = original.text.chars().collect();
    let start_idx = expect_number(&start, span)?.assert_int(span)?;
    let end = match args.optional_opt("end-at") {
        Some(end) => expect_number(&end, span)?.assert_int(span)?,
        None => -1,
    };
    if chars.is_empty() {
        return Ok(Value::String(original.clone()));
    }
    let start = resolve_index(chars.len(), start_idx);
    let end = resolve_index(chars.len(), end).min(chars.len().saturating_sub(1));
    let text = if start > end { String::new() } else { chars[start..=end].iter().collect() };
    Ok(Value::String(SassString { text, quoted: original.quoted }))
}

fn to_upper(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let s = args.required("string", span)?;
    let s = expect_string(&s, span)?;
    Ok(Value::String(SassString { text: s.text.to_uppercase(), quoted: s.quoted }))
}

fn to_lower(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let s = args.required("string", span)?;
    let s = expect_string(&s, span)?;
    Ok(Value::String(SassString { text: s.text.to_lowercase(), quoted: s.quoted }))
}

/// Not cryptographically unique, but unique enough for one compile: a
/// monotonically increasing counter is not observable across processes
/// the way `random()`'s caller can observe repetition, so a thread-local
/// counter avoids pulling in a UUID dependency for one rarely-used helper.
fn unique_id(_args: &mut ArgReader, _span: &Span) -> SassResult<Value> {
    thread_local! {
        static COUNTER: std::cell::Cell<u64> = const { std::cell::Cell::new(0) };
    }
    let n = COUNTER.with(|c| {
        let next = c.get() + 1;
        c.set(next);
        next
    });
    Ok(Value::unquoted_string(format!("u{n:x}")))
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
    fn slice_extracts_inclusive_range() {
        let result = call(
            "slice",
            vec![Value::quoted_string("helloworld"), Value::Number(SassNumber::new(1.0)), Value::Number(SassNumber::new(5.0))],
            HashMap::new(),
            &span(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(result, Value::quoted_string("hello"));
    }

    #[test]
    fn index_is_one_based() {
        let result = call("index", vec![Value::quoted_string("abc"), Value::quoted_string("b")], HashMap::new(), &span())
            .unwrap()
            .unwrap();
        assert_eq!(result, Value::Number(SassNumber::new(2.0)));
    }
}
